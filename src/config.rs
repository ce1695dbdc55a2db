use anyhow::{Context, Result};
use std::path::PathBuf;

/// Runtime configuration for the intake server.
///
/// Values come from environment variables (a `.env` file is loaded before
/// parsing), with CLI flags applied on top by the command layer. Every
/// variable has a default, so the server starts with no configuration at
/// all and writes to `submissions/` next to the process.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    pub port: u16,
    /// Directory holding the JSONL log and CSV mirror.
    pub data_dir: PathBuf,
    /// Directory served as static files.
    pub document_root: PathBuf,
    /// Substituted for the placeholder token in index.html.
    pub maps_api_key: String,
    pub company_name: String,
    pub company_email: String,
    /// SMTP settings; `None` disables email dispatch entirely.
    pub mail: Option<MailConfig>,
}

/// SMTP connection settings for the notification mailer.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub server: String,
    pub port: u16,
    /// STARTTLS on a plaintext connection.
    pub use_tls: bool,
    /// Implicit TLS from the first byte. Takes precedence over `use_tls`.
    pub use_ssl: bool,
    pub username: String,
    pub password: String,
    pub sender: String,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            data_dir: PathBuf::from("submissions"),
            document_root: PathBuf::from("public"),
            maps_api_key: String::new(),
            company_name: "Your Company Name".to_string(),
            company_email: "admin@yourcompany.com".to_string(),
            mail: None,
        }
    }
}

impl IntakeConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(value) => value
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT value: {value}"))?,
            None => defaults.port,
        };

        let data_dir = get("INTAKE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let document_root = get("INTAKE_DOCUMENT_ROOT")
            .map(PathBuf::from)
            .unwrap_or(defaults.document_root);

        // An empty MAIL_USERNAME means "no mailer"; the server then skips
        // notification dispatch instead of attempting anonymous SMTP.
        let mail_username = get("MAIL_USERNAME").unwrap_or_default();
        let mail = if mail_username.is_empty() {
            None
        } else {
            let mail_port = match get("MAIL_PORT") {
                Some(value) => value
                    .parse::<u16>()
                    .with_context(|| format!("Invalid MAIL_PORT value: {value}"))?,
                None => 587,
            };
            Some(MailConfig {
                server: get("MAIL_SERVER").unwrap_or_else(|| "smtp.gmail.com".to_string()),
                port: mail_port,
                use_tls: get("MAIL_USE_TLS").map(|v| parse_bool(&v)).unwrap_or(true),
                use_ssl: get("MAIL_USE_SSL").map(|v| parse_bool(&v)).unwrap_or(false),
                username: mail_username,
                password: get("MAIL_PASSWORD").unwrap_or_default(),
                sender: get("MAIL_DEFAULT_SENDER")
                    .unwrap_or_else(|| "noreply@yourcompany.com".to_string()),
            })
        };

        Ok(Self {
            port,
            data_dir,
            document_root,
            maps_api_key: get("GOOGLE_MAPS_API_KEY").unwrap_or_default(),
            company_name: get("COMPANY_NAME").unwrap_or(defaults.company_name),
            company_email: get("COMPANY_EMAIL").unwrap_or(defaults.company_email),
            mail,
        })
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}
