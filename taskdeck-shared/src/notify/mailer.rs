/// Mail transports
///
/// [`LogMailer`] writes messages to the tracing sink and is the default when
/// no relay is configured. [`HttpMailer`] posts each message as JSON to an
/// HTTP mail relay:
///
/// ```json
/// { "from": "...", "to": "...", "subject": "...", "html": "..." }
/// ```

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// A single outgoing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Mail transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Mail relay rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Mail client configuration error: {0}")]
    Config(String),
}

/// Something that can deliver an [`Email`]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), MailError>;
}

/// Logs messages instead of sending them
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        info!(to = %email.to, subject = %email.subject, "Email (log sink)");
        debug!(html = %email.html, "Email body");
        Ok(())
    }
}

/// Delivers messages through an HTTP mail relay
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for HttpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMailer")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl HttpMailer {
    /// Builds a relay client with a 10 second request timeout
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| MailError::Config(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        let mut request = self.client.post(&self.endpoint).json(email);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(to = %email.to, status = status.as_u16(), "Email accepted by relay");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        let email = Email {
            from: "no-reply@taskdeck.local".to_string(),
            to: "a@b.com".to_string(),
            subject: "Hi".to_string(),
            html: "<p>Hi</p>".to_string(),
        };

        assert!(LogMailer.send(&email).await.is_ok());
    }

    #[test]
    fn test_http_mailer_debug_redacts_key() {
        let mailer = HttpMailer::new("http://localhost:9999/send", Some("sk-live".to_string())).unwrap();
        let debug = format!("{:?}", mailer);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("sk-live"));
    }

    #[test]
    fn test_email_wire_format() {
        let email = Email {
            from: "f".to_string(),
            to: "t".to_string(),
            subject: "s".to_string(),
            html: "h".to_string(),
        };
        let json = serde_json::to_value(&email).unwrap();
        assert_eq!(json, serde_json::json!({"from": "f", "to": "t", "subject": "s", "html": "h"}));
    }
}
