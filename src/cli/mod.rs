use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod decode;
pub mod serve;

use crate::push::Permission;

#[derive(Subcommand)]
enum Command {
    /// Run the API server on the headless platform
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,

        /// How the user answers the notification permission prompt
        #[arg(long, value_enum, default_value = "granted")]
        permission: Permission,

        /// Pretend the page isn't a secure context, so copying falls back
        /// to selection
        #[arg(long, action, default_value = "false")]
        insecure_clipboard: bool,
    },
    /// Decode a VAPID public key and print its bytes
    DecodeKey {
        /// Defaults to PUSHBELL_VAPID_PUBLIC_KEY
        #[arg(long)]
        key: Option<String>,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // Handle each sub command
    match args.command {
        Some(Command::Serve {
            host,
            port,
            permission,
            insecure_clipboard,
        }) => {
            serve::run(host, port, permission, insecure_clipboard).await?;
        }
        Some(Command::DecodeKey { key }) => {
            decode::run(key)?;
        }
        None => {}
    }

    Ok(())
}
