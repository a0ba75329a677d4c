use anyhow::Result;

use crate::api;
use crate::core::AppConfig;
use crate::push::Permission;

pub async fn run(
    host: String,
    port: String,
    permission: Permission,
    insecure_clipboard: bool,
) -> Result<()> {
    let config = AppConfig::from_env()?;
    api::serve(host, port, config, permission, !insecure_clipboard).await
}
