//! Error types for the two network clients.
//!
//! Both carry a single serialized detail string and nothing else. The
//! detail is what ends up on screen after `Failed:`.

use thiserror::Error;

/// The token endpoint refused us or could not be reached.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{detail}")]
pub struct AuthError {
    pub detail: String,
}

/// The list or decide endpoint failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{detail}")]
pub struct ServiceError {
    pub detail: String,
}

impl AuthError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl ServiceError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        Self::new(transport_detail(&e))
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        Self::new(transport_detail(&e))
    }
}

/// Detail for a failure that never produced a response body.
pub fn transport_detail(e: &dyn std::fmt::Display) -> String {
    serde_json::json!({ "error": e.to_string() }).to_string()
}

/// Detail for a non-success response: the body as the server sent it,
/// or the bare status when the body is empty.
pub fn response_detail(status: u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        serde_json::json!({ "status": status }).to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_detail_keeps_body_verbatim() {
        assert_eq!(
            response_detail(400, "{\"error\":\"invalid_grant\"}\n"),
            r#"{"error":"invalid_grant"}"#
        );
        assert_eq!(response_detail(503, "  "), r#"{"status":503}"#);
    }

    #[test]
    fn test_transport_detail_is_json() {
        let detail = transport_detail(&"connection refused");
        let parsed: serde_json::Value = serde_json::from_str(&detail).unwrap();
        assert_eq!(parsed["error"], "connection refused");
    }

    #[test]
    fn test_display_is_detail() {
        let e = ServiceError::new("boom");
        assert_eq!(e.to_string(), "boom");
    }
}
