//! Outbound mail: transport configuration, message rendering, and the
//! process-wide SMTP transport slot.

pub mod config;
pub mod message;
pub mod transport;

pub use config::TransportConfig;
pub use message::{ContactSubmission, OutboundEmail};
pub use transport::{Mailer, SendReceipt, SmtpMailer, TransportManager};
