//! Outbound transport configuration.
//!
//! SMTP settings come from environment variables and are validated at first
//! use rather than at startup, so a misconfigured deployment fails with an
//! ordinary error on the first submission instead of crashing on boot.
//!
//! | Variable           | Description                                  |
//! |--------------------|----------------------------------------------|
//! | `SMTP_HOST`        | SMTP server hostname                         |
//! | `SMTP_PORT`        | 587 (STARTTLS) or 465 (implicit TLS)         |
//! | `SMTP_USER`        | Authenticated account address (also sender)  |
//! | `SMTP_PASS`        | Account secret                               |
//! | `CONTACT_TO_EMAIL` | Destination address for submissions          |

use crate::sanitize::is_valid_email;
use crate::{GuichetError, Result};

/// Validated outbound transport configuration.
///
/// The sender address is always the authenticated account address; it is
/// never independently configurable, so the service cannot be made to spoof
/// an identity it does not hold credentials for.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// SMTP server hostname.
    pub host: String,
    /// SMTP port, 587 or 465.
    pub port: u16,
    /// Implicit TLS from the first byte. Derived strictly from the port:
    /// true for 465, false for 587 (which upgrades via STARTTLS).
    pub secure: bool,
    /// Authenticated account address.
    pub user: String,
    /// Account secret.
    pub pass: String,
    /// Sender address, always equal to `user`.
    pub from_address: String,
    /// Destination address for submissions.
    pub to_address: String,
}

impl TransportConfig {
    /// Load and validate the transport configuration from the process
    /// environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load and validate the transport configuration from an arbitrary
    /// key lookup.
    ///
    /// Pure over its inputs; callers must not assume caching.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("SMTP_HOST")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| GuichetError::Config("missing SMTP_HOST".to_string()))?;

        let port: u16 = lookup("SMTP_PORT")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| GuichetError::Config("missing SMTP_PORT".to_string()))?
            .parse()
            .map_err(|_| {
                GuichetError::Config("SMTP_PORT must be 587 (STARTTLS) or 465 (TLS)".to_string())
            })?;

        if port != 587 && port != 465 {
            return Err(GuichetError::Config(
                "SMTP_PORT must be 587 (STARTTLS) or 465 (TLS)".to_string(),
            ));
        }

        let user = lookup("SMTP_USER")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| GuichetError::Config("missing SMTP_USER".to_string()))?;
        if !is_valid_email(&user) {
            return Err(GuichetError::Config(
                "SMTP_USER is not a valid email address".to_string(),
            ));
        }

        let pass = lookup("SMTP_PASS")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| GuichetError::Config("missing SMTP_PASS".to_string()))?;

        let to_address = lookup("CONTACT_TO_EMAIL")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| GuichetError::Config("missing CONTACT_TO_EMAIL".to_string()))?;
        if !is_valid_email(&to_address) {
            return Err(GuichetError::Config(
                "CONTACT_TO_EMAIL is not a valid email address".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            secure: port == 465,
            from_address: user.clone(),
            user,
            pass,
            to_address,
        })
    }
}
