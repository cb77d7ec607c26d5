//! Response DTOs for the contact API.

use serde::Serialize;

/// Successful submission response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactAccepted {
    /// Always true.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: String,
    /// Message-ID of the outbound email.
    pub message_id: String,
}

impl ContactAccepted {
    /// Create a success response for a delivered submission.
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            success: true,
            message: "Email sent successfully".to_string(),
            message_id: message_id.into(),
        }
    }
}
