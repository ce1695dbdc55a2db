pub mod config;
pub mod init;
pub mod mailer;
pub mod record;
pub mod server;
pub mod store;
