//! Outbound message construction.

use crate::sanitize::escape_for_markup;

/// A sanitized contact submission, ready to be rendered into an email.
///
/// Fields are trimmed and clamped but not markup-escaped; escaping happens
/// once, at render time. `email` stays raw because it is used as the
/// Reply-To protocol field, not interpolated into markup directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    /// Sender's display name.
    pub name: String,
    /// Sender's address, trimmed but unescaped.
    pub email: String,
    /// Message subject.
    pub subject: String,
    /// Message body.
    pub message: String,
}

/// A rendered email handed to the transport.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    /// Reply-To address: the caller's raw address.
    pub reply_to: String,
    /// Rendered subject line.
    pub subject: String,
    /// Rendered HTML body.
    pub html: String,
}

impl OutboundEmail {
    /// Render a contact submission into an outbound email.
    pub fn render(submission: &ContactSubmission) -> Self {
        let safe_name = escape_for_markup(&submission.name);
        let safe_email = escape_for_markup(&submission.email);
        let safe_subject = escape_for_markup(&submission.subject);
        let safe_message = escape_for_markup(&submission.message);

        let subject = format!(
            "New contact message from {} - {}",
            submission.name, submission.subject
        );

        let html = format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #333;">New message from the contact form</h2>

  <div style="background: #f5f5f5; padding: 20px; border-radius: 5px; margin: 20px 0;">
    <p><strong>Name:</strong> {safe_name}</p>
    <p><strong>Email:</strong> <a href="mailto:{safe_email}">{safe_email}</a></p>
    <p><strong>Subject:</strong> {safe_subject}</p>
  </div>

  <div style="background: #fff; padding: 20px; border: 1px solid #ddd; border-radius: 5px;">
    <p><strong>Message:</strong></p>
    <p style="white-space: pre-wrap;">{safe_message}</p>
  </div>

  <p style="color: #666; font-size: 12px; margin-top: 20px;">
    You can reply directly to this email to reach {safe_name}.
  </p>
</div>"#
        );

        Self {
            reply_to: submission.email.clone(),
            subject,
            html,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> ContactSubmission {
        ContactSubmission {
            name: "Léa".to_string(),
            email: "lea@example.com".to_string(),
            subject: "Info".to_string(),
            message: "Bonjour".to_string(),
        }
    }

    #[test]
    fn test_subject_combines_name_and_subject() {
        let email = OutboundEmail::render(&submission());
        assert_eq!(email.subject, "New contact message from Léa - Info");
    }

    #[test]
    fn test_reply_to_is_raw_address() {
        let mut sub = submission();
        sub.email = "o'brien@example.com".to_string();

        let email = OutboundEmail::render(&sub);
        // Protocol field: never the escaped copy
        assert_eq!(email.reply_to, "o'brien@example.com");
        // Markup interpolation: escaped
        assert!(email.html.contains("o&#39;brien@example.com"));
    }

    #[test]
    fn test_html_escapes_all_fields() {
        let sub = ContactSubmission {
            name: "<b>Mallory</b>".to_string(),
            email: "m@example.com".to_string(),
            subject: "a & b".to_string(),
            message: "<script>alert(1)</script>".to_string(),
        };

        let email = OutboundEmail::render(&sub);
        assert!(email.html.contains("&lt;b&gt;Mallory&lt;/b&gt;"));
        assert!(email.html.contains("a &amp; b"));
        assert!(email.html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!email.html.contains("<script>"));
    }

    #[test]
    fn test_html_embeds_all_four_fields() {
        let email = OutboundEmail::render(&submission());
        assert!(email.html.contains("Léa"));
        assert!(email.html.contains("lea@example.com"));
        assert!(email.html.contains("Info"));
        assert!(email.html.contains("Bonjour"));
    }
}
