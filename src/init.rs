//! Workspace scaffolding for a fresh intake deployment.
//!
//! `init_workspace` creates the layout the server expects:
//!
//! ```text
//! .
//! ├── submissions/          # data directory (JSONL log + CSV mirror)
//! ├── public/
//! │   └── index.html        # placeholder form page
//! └── .env.example          # documented configuration template
//! ```
//!
//! Existing directories and files are left untouched, so running it on a
//! live deployment is safe.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_EXAMPLE_FILE: &str = ".env.example";

const PLACEHOLDER_INDEX: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Factory Registration</title>
  <script>
    const MAPS_API_KEY = "__GOOGLE_MAPS_API_KEY__";
  </script>
</head>
<body>
  <h1>Factory Registration</h1>
  <p>Replace this page with your registration form. Submissions are accepted
  as JSON via POST /v2/factory-registration.</p>
</body>
</html>
"#;

const ENV_EXAMPLE: &str = "\
# Factory intake configuration. Copy to .env and edit.

# HTTP
PORT=5000

# Storage and static files
INTAKE_DATA_DIR=submissions
INTAKE_DOCUMENT_ROOT=public

# Substituted into index.html where __GOOGLE_MAPS_API_KEY__ appears
GOOGLE_MAPS_API_KEY=

# Identity used in notification emails
COMPANY_NAME=Your Company Name
COMPANY_EMAIL=admin@yourcompany.com

# SMTP. Leave MAIL_USERNAME empty to disable email dispatch.
MAIL_SERVER=smtp.gmail.com
MAIL_PORT=587
MAIL_USE_TLS=true
MAIL_USE_SSL=false
MAIL_USERNAME=
MAIL_PASSWORD=
MAIL_DEFAULT_SENDER=noreply@yourcompany.com
";

/// What `init_workspace` touched, for reporting.
pub struct InitOutcome {
    pub created: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

impl InitOutcome {
    pub fn created_anything(&self) -> bool {
        !self.created.is_empty()
    }
}

/// Create the workspace layout under `root`. `data_dir` and
/// `document_root` are used as given, so relative paths land relative to
/// the working directory, matching how the server resolves them.
pub fn init_workspace(
    root: &Path,
    data_dir: &Path,
    document_root: &Path,
) -> Result<InitOutcome> {
    let mut outcome = InitOutcome {
        created: Vec::new(),
        skipped: Vec::new(),
    };

    ensure_dir(data_dir, &mut outcome)?;
    ensure_dir(document_root, &mut outcome)?;
    ensure_file(
        &document_root.join("index.html"),
        PLACEHOLDER_INDEX,
        &mut outcome,
    )?;
    ensure_file(&root.join(ENV_EXAMPLE_FILE), ENV_EXAMPLE, &mut outcome)?;

    Ok(outcome)
}

fn ensure_dir(path: &Path, outcome: &mut InitOutcome) -> Result<()> {
    if path.is_dir() {
        outcome.skipped.push(path.to_path_buf());
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
        outcome.created.push(path.to_path_buf());
    }
    Ok(())
}

fn ensure_file(path: &Path, content: &str, outcome: &mut InitOutcome) -> Result<()> {
    if path.exists() {
        outcome.skipped.push(path.to_path_buf());
    } else {
        fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        outcome.created.push(path.to_path_buf());
    }
    Ok(())
}
