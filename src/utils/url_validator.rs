//! Extraction and syntax check of submitted URLs.
//!
//! URLs are checked against the generic WHATWG grammar only: any scheme is
//! accepted and nothing is resolved or fetched.

use serde_json::Value;
use validator::ValidateUrl;

/// Reasons a link payload is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UrlValidationError {
    #[error("URL is required")]
    Missing,

    #[error("Invalid URL format")]
    Malformed,
}

/// Extracts and checks the `url` field of a parsed request body.
///
/// # Rules
///
/// 1. Non-object bodies, an absent key, and the "empty" values `null`,
///    `false`, `0` and `""` count as missing
/// 2. Any other non-string value is malformed
/// 3. Strings must parse as an absolute URL
///
/// The returned string is the submitted value, unmodified.
///
/// # Errors
///
/// Returns [`UrlValidationError::Missing`] or [`UrlValidationError::Malformed`].
pub fn validate_link_payload(body: &Value) -> Result<String, UrlValidationError> {
    let candidate = body.get("url").unwrap_or(&Value::Null);

    if is_empty_value(candidate) {
        return Err(UrlValidationError::Missing);
    }

    let Some(url) = candidate.as_str() else {
        return Err(UrlValidationError::Malformed);
    };

    if !url.validate_url() {
        return Err(UrlValidationError::Malformed);
    }

    Ok(url.to_string())
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
