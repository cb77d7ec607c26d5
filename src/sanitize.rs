//! Content sanitization for contact submissions.
//!
//! All functions here are pure and total over text input: they never fail,
//! and degenerate input (whitespace-only, control characters only) collapses
//! to an empty string, which the submission handler rejects as invalid.

/// Trim, strip control characters and truncate text to a maximum length.
///
/// Newlines are kept so multi-line message bodies survive; every other
/// control character is dropped. Truncation counts characters, not bytes,
/// so multi-byte input is never split inside a code point.
pub fn clamp_and_trim(text: &str, max_chars: usize) -> String {
    text.trim()
        .chars()
        .filter(|&c| !c.is_control() || c == '\n')
        .take(max_chars)
        .collect()
}

/// Escape markup-significant characters for safe HTML interpolation.
///
/// `&` is escaped first, so entities produced for the other characters are
/// not double-escaped. Applying this twice to text containing markup
/// characters intentionally escapes the `&` of the first pass again; use it
/// exactly once per interpolation.
pub fn escape_for_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Check that an address has a plausible `local@domain.tld` shape.
///
/// This is a shape check, not RFC 5321 validation: exactly one `@`, a
/// non-empty local part without whitespace, and a domain containing an
/// interior dot.
pub fn is_valid_email(address: &str) -> bool {
    let mut parts = address.split('@');

    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };

    if local.is_empty() || local.chars().any(char::is_whitespace) {
        return false;
    }

    if domain.chars().any(char::is_whitespace) {
        return false;
    }

    // Domain needs an interior dot: "example.com" yes, ".com" / "example." no
    match domain.find('.') {
        Some(idx) => idx > 0 && idx < domain.len() - 1 && !domain.ends_with('.'),
        None => false,
    }
}
