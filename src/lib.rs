//! guichet - Contact form submission gateway.
//!
//! Accepts contact requests over HTTP, defends against abuse with
//! per-client rate limiting, validates and sanitizes content, and relays
//! submissions over SMTP exactly once. Nothing is persisted; a failed send
//! is terminal for that request.

pub mod config;
pub mod error;
pub mod logging;
pub mod mailer;
pub mod rate_limit;
pub mod sanitize;
pub mod web;

pub use config::Config;
pub use error::{GuichetError, Result};
