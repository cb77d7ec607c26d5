//! API handlers for the Web API.

pub mod contact;

pub use contact::submit_contact;

use std::sync::Arc;

use crate::config::Config;
use crate::mailer::{Mailer, TransportManager};
use crate::rate_limit::{RateLimitConfig, SubmissionRateLimiter};

/// Shared application state for the Web API.
pub struct AppState {
    /// Include transport failure details in 500 bodies.
    pub verbose_errors: bool,
    /// Per-client submission rate limiter.
    pub rate_limiter: SubmissionRateLimiter,
    /// Process-wide transport slot.
    pub transport: TransportManager,
}

impl AppState {
    /// Create application state from configuration.
    ///
    /// The SMTP transport is initialized lazily from the environment on the
    /// first submission that needs it.
    pub fn new(config: &Config) -> Self {
        Self {
            verbose_errors: config.contact.verbose_errors,
            rate_limiter: SubmissionRateLimiter::new(RateLimitConfig::new(
                config.rate_limit.max_submissions,
                config.rate_limit.window_secs,
            )),
            transport: TransportManager::new(),
        }
    }

    /// Create application state with an injected mailer, bypassing lazy
    /// SMTP initialization. Used by tests.
    pub fn with_mailer(config: &Config, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            verbose_errors: config.contact.verbose_errors,
            rate_limiter: SubmissionRateLimiter::new(RateLimitConfig::new(
                config.rate_limit.max_submissions,
                config.rate_limit.window_secs,
            )),
            transport: TransportManager::preloaded(mailer),
        }
    }
}
