//! Notification email dispatch.
//!
//! Sending sits behind the [`Mailer`] trait so the HTTP layer works the
//! same with or without SMTP configured. Real implementation:
//! [`SmtpMailer`]. Test double: `MockMailer`.
//!
//! [`dispatch_notifications`] is deliberately infallible: each of the two
//! sends is attempted independently and failures are collected as strings
//! in the outcome, never returned as errors. A broken mail server must not
//! fail a registration that is already on disk.

mod smtp;
mod templates;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::record::Record;

pub use smtp::SmtpMailer;

/// One outbound HTML email.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Abstraction over email delivery.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError>;
}

/// Identity details interpolated into the notification emails.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub company_name: String,
    /// Operator address that receives the internal notification.
    pub company_email: String,
}

/// Result of the per-submission notification attempts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    pub internal_sent: bool,
    pub customer_sent: bool,
    pub errors: Vec<String>,
}

/// Send the internal notification and, when the record carries a
/// `factoryEmail`, the customer confirmation. Both sends are independent;
/// a failure is recorded in the outcome and the other send still runs.
pub async fn dispatch_notifications(
    mailer: &dyn Mailer,
    record: &Record,
    notify: &NotifyConfig,
) -> DispatchOutcome {
    let mut outcome = DispatchOutcome {
        internal_sent: false,
        customer_sent: false,
        errors: Vec::new(),
    };

    let internal = OutboundEmail {
        to: notify.company_email.clone(),
        subject: format!(
            "New Factory Registration: {}",
            record.get_or("factoryName", "Unknown Factory")
        ),
        html_body: templates::company_notification(record, notify),
    };
    match mailer.send(&internal).await {
        Ok(()) => outcome.internal_sent = true,
        Err(e) => {
            tracing::warn!("internal notification email failed: {e}");
            outcome.errors.push(format!("Company email error: {e}"));
        }
    }

    match record.get("factoryEmail").filter(|v| !v.is_empty()) {
        Some(customer_email) => {
            let confirmation = OutboundEmail {
                to: customer_email.to_string(),
                subject: format!(
                    "Factory Registration Confirmation - {}",
                    record.get_or("submissionId", "N/A")
                ),
                html_body: templates::customer_confirmation(record, notify),
            };
            match mailer.send(&confirmation).await {
                Ok(()) => outcome.customer_sent = true,
                Err(e) => {
                    tracing::warn!("customer confirmation email failed: {e}");
                    outcome.errors.push(format!("Customer email error: {e}"));
                }
            }
        }
        None => outcome
            .errors
            .push("No customer email provided".to_string()),
    }

    outcome
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Recording test double. Optionally fails sends to one address so
    /// tests can exercise partial outcomes.
    pub struct MockMailer {
        pub sent: Mutex<Vec<OutboundEmail>>,
        fail_to: Option<String>,
    }

    impl MockMailer {
        pub fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_to: None,
            }
        }

        pub fn failing_for(address: &str) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_to: Some(address.to_string()),
            }
        }

        pub fn sent_to(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|email| email.to.clone())
                .collect()
        }
    }

    #[async_trait]
    impl Mailer for MockMailer {
        async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
            if self.fail_to.as_deref() == Some(email.to.as_str()) {
                let err = "missing-at-sign"
                    .parse::<lettre::Address>()
                    .expect_err("address without @ must not parse");
                return Err(MailError::Address(err));
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MockMailer;
    use super::*;
    use serde_json::{Map, Value, json};

    use crate::record::normalize_payload;

    fn record(fields: &[(&str, &str)]) -> Record {
        let mut map = Map::new();
        for (key, value) in fields {
            map.insert(key.to_string(), Value::String(value.to_string()));
        }
        normalize_payload(&map)
    }

    fn notify() -> NotifyConfig {
        NotifyConfig {
            company_name: "Acme Industrial".to_string(),
            company_email: "ops@acme.test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_both_emails_sent() {
        let mailer = MockMailer::new();
        let outcome = dispatch_notifications(
            &mailer,
            &record(&[
                ("factoryName", "Globex"),
                ("factoryEmail", "owner@globex.test"),
                ("submissionId", "REG-7"),
            ]),
            &notify(),
        )
        .await;

        assert!(outcome.internal_sent);
        assert!(outcome.customer_sent);
        assert!(outcome.errors.is_empty());

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "ops@acme.test");
        assert_eq!(sent[0].subject, "New Factory Registration: Globex");
        assert_eq!(sent[1].to, "owner@globex.test");
        assert_eq!(sent[1].subject, "Factory Registration Confirmation - REG-7");
    }

    #[tokio::test]
    async fn test_missing_customer_email_is_recorded() {
        let mailer = MockMailer::new();
        let outcome =
            dispatch_notifications(&mailer, &record(&[("factoryName", "Globex")]), &notify())
                .await;

        assert!(outcome.internal_sent);
        assert!(!outcome.customer_sent);
        assert_eq!(outcome.errors, vec!["No customer email provided"]);
        assert_eq!(mailer.sent_to(), vec!["ops@acme.test"]);
    }

    #[tokio::test]
    async fn test_empty_customer_email_counts_as_missing() {
        let mailer = MockMailer::new();
        let outcome = dispatch_notifications(
            &mailer,
            &record(&[("factoryName", "Globex"), ("factoryEmail", "")]),
            &notify(),
        )
        .await;

        assert!(!outcome.customer_sent);
        assert_eq!(outcome.errors, vec!["No customer email provided"]);
    }

    #[tokio::test]
    async fn test_internal_failure_does_not_block_customer_send() {
        let mailer = MockMailer::failing_for("ops@acme.test");
        let outcome = dispatch_notifications(
            &mailer,
            &record(&[
                ("factoryName", "Globex"),
                ("factoryEmail", "owner@globex.test"),
            ]),
            &notify(),
        )
        .await;

        assert!(!outcome.internal_sent);
        assert!(outcome.customer_sent);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].starts_with("Company email error:"));
        assert_eq!(mailer.sent_to(), vec!["owner@globex.test"]);
    }

    #[tokio::test]
    async fn test_customer_failure_is_contained() {
        let mailer = MockMailer::failing_for("owner@globex.test");
        let outcome = dispatch_notifications(
            &mailer,
            &record(&[
                ("factoryName", "Globex"),
                ("factoryEmail", "owner@globex.test"),
            ]),
            &notify(),
        )
        .await;

        assert!(outcome.internal_sent);
        assert!(!outcome.customer_sent);
        assert!(outcome.errors[0].starts_with("Customer email error:"));
    }

    #[test]
    fn test_outcome_serializes_with_camel_case_keys() {
        let outcome = DispatchOutcome {
            internal_sent: true,
            customer_sent: false,
            errors: vec!["No customer email provided".to_string()],
        };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "internalSent": true,
                "customerSent": false,
                "errors": ["No customer email provided"],
            })
        );
    }
}
