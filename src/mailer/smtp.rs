//! SMTP delivery on lettre's async transport.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{MailError, Mailer, OutboundEmail};
use crate::config::MailConfig;

/// Mailer backed by an SMTP relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: String,
}

impl SmtpMailer {
    /// Build a transport from the mail settings. `use_ssl` selects
    /// implicit TLS, `use_tls` selects STARTTLS; with neither set the
    /// connection is plaintext, which only makes sense for local relays.
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let mut builder = if config.use_ssl {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.server)?
        } else if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.server)
        };
        builder = builder.port(config.port);
        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }
        Ok(Self {
            transport: builder.build(),
            sender: config.sender.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.sender.parse()?)
            .to(email.to.parse()?)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(email.html_body.clone())?;
        self.transport.send(message).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail_config() -> MailConfig {
        MailConfig {
            server: "smtp.example.com".to_string(),
            port: 587,
            use_tls: true,
            use_ssl: false,
            username: "mailer@acme.test".to_string(),
            password: "secret".to_string(),
            sender: "noreply@acme.test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_transport_builds_for_each_security_mode() {
        assert!(SmtpMailer::new(&mail_config()).is_ok());

        let mut ssl = mail_config();
        ssl.use_ssl = true;
        ssl.port = 465;
        assert!(SmtpMailer::new(&ssl).is_ok());

        let mut plain = mail_config();
        plain.use_tls = false;
        plain.username = String::new();
        assert!(SmtpMailer::new(&plain).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_an_address_error() {
        let mailer = SmtpMailer::new(&mail_config()).unwrap();
        let email = OutboundEmail {
            to: "not-an-address".to_string(),
            subject: "hello".to_string(),
            html_body: "<p>hi</p>".to_string(),
        };
        match mailer.send(&email).await {
            Err(MailError::Address(_)) => {}
            other => panic!("expected address error, got {other:?}"),
        }
    }
}
