use anyhow::Result;
use pushbell::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
