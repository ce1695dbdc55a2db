//! HTTP intake server command: `intake serve`.

use anyhow::Result;
use std::path::PathBuf;

use intake::config::IntakeConfig;
use intake::server;

pub async fn cmd_serve(
    port: Option<u16>,
    data_dir: Option<PathBuf>,
    document_root: Option<PathBuf>,
) -> Result<()> {
    let mut config = IntakeConfig::from_env()?;
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    if let Some(root) = document_root {
        config.document_root = root;
    }

    server::start(config).await
}
