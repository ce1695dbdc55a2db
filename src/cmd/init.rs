//! Workspace scaffolding command: `intake init`.

use anyhow::Result;
use std::path::{Path, PathBuf};

use intake::config::IntakeConfig;
use intake::init::init_workspace;

pub fn cmd_init(data_dir: Option<PathBuf>, document_root: Option<PathBuf>) -> Result<()> {
    let config = IntakeConfig::from_env()?;
    let data_dir = data_dir.unwrap_or(config.data_dir);
    let document_root = document_root.unwrap_or(config.document_root);

    let outcome = init_workspace(Path::new("."), &data_dir, &document_root)?;

    for path in &outcome.created {
        println!("  created {}", path.display());
    }
    for path in &outcome.skipped {
        println!("  exists  {}", path.display());
    }
    println!();

    if outcome.created_anything() {
        println!("Initialized intake workspace");
        println!();
        println!("Next steps:");
        println!("  1. Copy .env.example to .env and fill in your settings");
        println!("  2. Replace {}/index.html with your form", document_root.display());
        println!("  3. Run `intake serve`");
    } else {
        println!("Workspace already initialized");
    }

    Ok(())
}
