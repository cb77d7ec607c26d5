//! SMTP transport and the process-wide transport slot.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters, TlsVersion};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::sync::OnceCell;
use uuid::Uuid;

use super::config::TransportConfig;
use super::message::OutboundEmail;
use crate::{GuichetError, Result};

/// Delivery receipt returned by the transport on success.
#[derive(Debug, Clone)]
pub struct SendReceipt {
    /// Message-ID assigned to the outbound email.
    pub message_id: String,
    /// Recipients the server accepted the message for.
    pub accepted: Vec<String>,
    /// Recipients the server rejected.
    pub rejected: Vec<String>,
}

/// Outbound mail boundary.
///
/// The production implementation is [`SmtpMailer`]; tests substitute their
/// own implementations to observe or fail sends.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one email. A failed send is terminal; there are no retries.
    async fn send(&self, email: OutboundEmail) -> Result<SendReceipt>;
}

/// Mailer backed by a lettre SMTP transport.
///
/// Sender and destination are fixed at construction from the validated
/// [`TransportConfig`].
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
    hostname: String,
}

impl SmtpMailer {
    /// Build an SMTP mailer from a validated transport configuration.
    ///
    /// Port 465 uses implicit TLS via lettre's relay defaults. Port 587
    /// upgrades with STARTTLS and enforces TLS 1.2 as the minimum protocol
    /// version; certificate validation stays on in both modes.
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let from: Mailbox = config
            .from_address
            .parse()
            .map_err(|e| GuichetError::TransportInit(format!("invalid sender address: {e}")))?;
        let to: Mailbox = config
            .to_address
            .parse()
            .map_err(|e| GuichetError::TransportInit(format!("invalid destination address: {e}")))?;

        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| GuichetError::TransportInit(e.to_string()))?
        } else {
            let tls = TlsParameters::builder(config.host.clone())
                .set_min_tls_version(TlsVersion::Tlsv12)
                .build()
                .map_err(|e| GuichetError::TransportInit(e.to_string()))?;

            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .port(config.port)
                .tls(Tls::Required(tls))
        };

        let transport = builder
            .credentials(Credentials::new(config.user.clone(), config.pass.clone()))
            .build();

        Ok(Self {
            transport,
            from,
            to,
            hostname: config.host.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutboundEmail) -> Result<SendReceipt> {
        let reply_to: Mailbox = email.reply_to.parse().map_err(|e| GuichetError::Send {
            detail: format!("invalid reply-to address: {e}"),
            code: None,
        })?;

        let message_id = format!("<{}@{}>", Uuid::new_v4(), self.hostname);

        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .reply_to(reply_to)
            .subject(email.subject)
            .message_id(Some(message_id.clone()))
            .header(ContentType::TEXT_HTML)
            .body(email.html)
            .map_err(|e| GuichetError::Send {
                detail: format!("failed to build message: {e}"),
                code: None,
            })?;

        match self.transport.send(message).await {
            Ok(response) => {
                tracing::debug!(code = ?response.code(), "SMTP server accepted message");
                Ok(SendReceipt {
                    message_id,
                    accepted: vec![self.to.email.to_string()],
                    rejected: Vec::new(),
                })
            }
            Err(e) => {
                let detail = e.to_string();
                Err(GuichetError::Send {
                    code: smtp_status_code(&detail),
                    detail,
                })
            }
        }
    }
}

/// Extract an SMTP status code (a standalone 2xx-5xx token) from a
/// transport error message, if one is present.
fn smtp_status_code(detail: &str) -> Option<String> {
    detail
        .split(|c: char| !c.is_ascii_digit())
        .find(|tok| tok.len() == 3 && matches!(tok.as_bytes()[0], b'2'..=b'5'))
        .map(str::to_string)
}

/// Process-wide transport slot with single-flight lazy initialization.
///
/// The slot starts empty and is populated at most once per process lifetime
/// by the first submission that needs it; concurrent first users await the
/// leader's result. A failed initialization leaves the slot empty, so the
/// next submission retries. Once populated, the handle is reused for every
/// subsequent send; configuration changes require a process restart.
pub struct TransportManager {
    slot: OnceCell<Arc<dyn Mailer>>,
}

impl TransportManager {
    /// Create an empty transport slot; the SMTP transport is built from the
    /// environment on first use.
    pub fn new() -> Self {
        Self {
            slot: OnceCell::new(),
        }
    }

    /// Create a slot pre-populated with the given mailer, bypassing lazy
    /// initialization. Used by tests to inject doubles.
    pub fn preloaded(mailer: Arc<dyn Mailer>) -> Self {
        Self {
            slot: OnceCell::new_with(Some(mailer)),
        }
    }

    /// Get the cached mailer, initializing it on first use.
    pub async fn get(&self) -> Result<Arc<dyn Mailer>> {
        let mailer = self
            .slot
            .get_or_try_init(|| async {
                let config = TransportConfig::from_env()?;
                let mailer = SmtpMailer::new(&config)?;
                tracing::info!(
                    host = %config.host,
                    port = config.port,
                    secure = config.secure,
                    "SMTP transport initialized"
                );
                Ok::<_, GuichetError>(Arc::new(mailer) as Arc<dyn Mailer>)
            })
            .await?;

        Ok(mailer.clone())
    }
}

impl Default for TransportManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn starttls_config() -> TransportConfig {
        TransportConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            secure: false,
            user: "robot@example.com".to_string(),
            pass: "hunter2".to_string(),
            from_address: "robot@example.com".to_string(),
            to_address: "inbox@example.com".to_string(),
        }
    }

    #[test]
    fn test_smtp_mailer_builds_for_both_ports() {
        assert!(SmtpMailer::new(&starttls_config()).is_ok());

        let mut config = starttls_config();
        config.port = 465;
        config.secure = true;
        assert!(SmtpMailer::new(&config).is_ok());
    }

    #[test]
    fn test_smtp_status_code_extraction() {
        assert_eq!(
            smtp_status_code("permanent error (550): mailbox unavailable"),
            Some("550".to_string())
        );
        assert_eq!(
            smtp_status_code("transient error (421 4.7.0 try later)"),
            Some("421".to_string())
        );
        assert_eq!(smtp_status_code("connection refused"), None);
        // Port numbers and other long digit runs are not status codes
        assert_eq!(smtp_status_code("connect to 127.0.0.1:2525 failed"), None);
    }

    struct CountingMailer {
        calls: AtomicU32,
    }

    #[async_trait]
    impl Mailer for CountingMailer {
        async fn send(&self, _email: OutboundEmail) -> Result<SendReceipt> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(SendReceipt {
                message_id: "<test@localhost>".to_string(),
                accepted: vec!["inbox@example.com".to_string()],
                rejected: Vec::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_preloaded_slot_returns_same_handle() {
        let mailer = Arc::new(CountingMailer {
            calls: AtomicU32::new(0),
        });
        let manager = TransportManager::preloaded(mailer.clone());

        let first = manager.get().await.unwrap();
        let second = manager.get().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_empty_slot_with_no_env_fails_with_config_error() {
        // No SMTP_* variables are set in the test environment, so lazy
        // initialization must surface the loader's error.
        std::env::remove_var("SMTP_HOST");
        let manager = TransportManager::new();
        let result = manager.get().await;
        assert!(matches!(result, Err(GuichetError::Config(_))));
    }
}
