use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;

use cmd::export::ExportFormat;

#[derive(Parser)]
#[command(name = "intake")]
#[command(version, about = "Factory registration intake server")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP intake server
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory holding the submission stores (overrides INTAKE_DATA_DIR)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Directory served as static files (overrides INTAKE_DOCUMENT_ROOT)
        #[arg(long)]
        document_root: Option<PathBuf>,
    },
    /// Create the data directory, document root, and an example .env
    Init {
        #[arg(long)]
        data_dir: Option<PathBuf>,

        #[arg(long)]
        document_root: Option<PathBuf>,
    },
    /// Print a submission store to stdout
    Export {
        /// Which store file to print
        #[arg(long, value_enum, default_value = "jsonl")]
        format: ExportFormat,

        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_filter = if cli.verbose { "intake=debug,info" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    match cli.command {
        Commands::Serve {
            port,
            data_dir,
            document_root,
        } => {
            cmd::cmd_serve(port, data_dir, document_root).await?;
        }
        Commands::Init {
            data_dir,
            document_root,
        } => {
            cmd::cmd_init(data_dir, document_root)?;
        }
        Commands::Export { format, data_dir } => {
            cmd::cmd_export(format, data_dir)?;
        }
    }

    Ok(())
}
