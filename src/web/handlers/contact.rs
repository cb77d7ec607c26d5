//! Contact submission handler.
//!
//! One request runs the pipeline: rate-check, parse, presence check,
//! sanitize, email format check, render, acquire transport, send. Every
//! failure is classified into a [`crate::GuichetError`] and translated into
//! its terminal response by [`ApiError::from_error`]; nothing internal
//! reaches the caller outside verbose mode.

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::mailer::{ContactSubmission, OutboundEmail};
use crate::sanitize::{clamp_and_trim, is_valid_email};
use crate::web::dto::ContactAccepted;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::client_identity;
use crate::{GuichetError, Result};

/// Maximum length of the name field, in characters.
pub const MAX_NAME_LENGTH: usize = 100;
/// Maximum length of the subject field, in characters.
pub const MAX_SUBJECT_LENGTH: usize = 200;
/// Maximum length of the message field, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 5000;

/// POST /api/contact - accept a contact form submission.
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> std::result::Result<Json<ContactAccepted>, ApiError> {
    let verbose = state.verbose_errors;
    let identity = client_identity(&headers, connect_info.as_ref());

    process(&state, &identity, body)
        .await
        .map(Json)
        .map_err(|err| ApiError::from_error(err, verbose))
}

/// Run the submission pipeline for one request.
async fn process(
    state: &AppState,
    identity: &str,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<ContactAccepted> {
    // Rate check before touching the body
    let admission = state.rate_limiter.check_and_record(identity);
    if !admission.is_allowed() {
        tracing::warn!(identity = %identity, "submission rate limit exceeded");
        return Err(GuichetError::RateLimited {
            retry_after: admission.retry_after_secs(),
        });
    }

    let Json(value) = body
        .map_err(|_| GuichetError::BadRequest("Invalid request body".to_string()))?;

    let (name_raw, email_raw, subject_raw, message_raw) = extract_fields(&value)?;

    let name = clamp_and_trim(name_raw, MAX_NAME_LENGTH);
    if name.is_empty() {
        return Err(GuichetError::BadRequest("Name cannot be empty".to_string()));
    }

    let subject = clamp_and_trim(subject_raw, MAX_SUBJECT_LENGTH);
    if subject.is_empty() {
        return Err(GuichetError::BadRequest(
            "Subject cannot be empty".to_string(),
        ));
    }

    let message = clamp_and_trim(message_raw, MAX_MESSAGE_LENGTH);
    if message.is_empty() {
        return Err(GuichetError::BadRequest(
            "Message cannot be empty".to_string(),
        ));
    }

    let email = email_raw.trim().to_string();
    if !is_valid_email(&email) {
        return Err(GuichetError::BadRequest(
            "Invalid email address".to_string(),
        ));
    }

    let submission = ContactSubmission {
        name,
        email,
        subject,
        message,
    };

    // Markup escaping happens inside render; the raw address stays the
    // Reply-To protocol field
    let outbound = OutboundEmail::render(&submission);

    let mailer = state.transport.get().await?;
    let receipt = mailer.send(outbound).await?;

    tracing::info!(
        message_id = %receipt.message_id,
        accepted = ?receipt.accepted,
        rejected = ?receipt.rejected,
        "contact submission delivered"
    );

    Ok(ContactAccepted::new(receipt.message_id))
}

/// Pull the four required fields out of the parsed body.
///
/// Missing, null or empty fields fail the presence check; present fields of
/// a non-string type fail the type check. Each failure keeps its own
/// message so the caller can tell them apart.
fn extract_fields(value: &Value) -> Result<(&str, &str, &str, &str)> {
    let object = value
        .as_object()
        .ok_or_else(|| GuichetError::BadRequest("Invalid request body".to_string()))?;

    const FIELDS: [&str; 4] = ["name", "email", "subject", "message"];

    for field in FIELDS {
        match object.get(field) {
            None | Some(Value::Null) => {
                return Err(GuichetError::BadRequest(
                    "All fields are required".to_string(),
                ));
            }
            Some(Value::String(s)) if s.is_empty() => {
                return Err(GuichetError::BadRequest(
                    "All fields are required".to_string(),
                ));
            }
            _ => {}
        }
    }

    let mut strings = FIELDS.iter().map(|field| {
        object
            .get(*field)
            .and_then(Value::as_str)
            .ok_or_else(|| GuichetError::BadRequest("Invalid field types".to_string()))
    });

    // FIELDS has exactly four entries
    let name = strings.next().unwrap()?;
    let email = strings.next().unwrap()?;
    let subject = strings.next().unwrap()?;
    let message = strings.next().unwrap()?;

    Ok((name, email, subject, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_fields_ok() {
        let value = json!({
            "name": "Léa",
            "email": "lea@example.com",
            "subject": "Info",
            "message": "Bonjour"
        });

        let (name, email, subject, message) = extract_fields(&value).unwrap();
        assert_eq!(name, "Léa");
        assert_eq!(email, "lea@example.com");
        assert_eq!(subject, "Info");
        assert_eq!(message, "Bonjour");
    }

    #[test]
    fn test_extract_fields_missing_any_field() {
        for missing in ["name", "email", "subject", "message"] {
            let mut value = json!({
                "name": "a",
                "email": "a@example.com",
                "subject": "b",
                "message": "c"
            });
            value.as_object_mut().unwrap().remove(missing);

            let err = extract_fields(&value).unwrap_err();
            assert!(
                matches!(&err, GuichetError::BadRequest(m) if m == "All fields are required"),
                "missing {missing} should fail the presence check"
            );
        }
    }

    #[test]
    fn test_extract_fields_null_and_empty_are_missing() {
        let value = json!({
            "name": null,
            "email": "a@example.com",
            "subject": "b",
            "message": "c"
        });
        let err = extract_fields(&value).unwrap_err();
        assert!(matches!(&err, GuichetError::BadRequest(m) if m == "All fields are required"));

        let value = json!({
            "name": "",
            "email": "a@example.com",
            "subject": "b",
            "message": "c"
        });
        let err = extract_fields(&value).unwrap_err();
        assert!(matches!(&err, GuichetError::BadRequest(m) if m == "All fields are required"));
    }

    #[test]
    fn test_extract_fields_wrong_type() {
        let value = json!({
            "name": 42,
            "email": "a@example.com",
            "subject": "b",
            "message": "c"
        });

        let err = extract_fields(&value).unwrap_err();
        assert!(matches!(&err, GuichetError::BadRequest(m) if m == "Invalid field types"));
    }

    #[test]
    fn test_extract_fields_non_object_body() {
        let err = extract_fields(&json!(["not", "an", "object"])).unwrap_err();
        assert!(matches!(&err, GuichetError::BadRequest(m) if m == "Invalid request body"));
    }
}
