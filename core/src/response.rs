//! Normalized result of an API call.

use serde_json::{json, Map, Value};

use crate::error::TransportError;
use crate::http::HttpResponse;

/// Status, decoded payload and success flag of one API call.
///
/// Built either from a completed HTTP exchange or from a transport failure.
/// A transport failure has status `0`, which no real HTTP response carries.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    status: u16,
    data: Value,
    success: bool,
}

impl ApiResponse {
    /// Decodes the body as JSON, falling back to `{"raw": text}` or `{}`.
    pub fn from_http(response: HttpResponse) -> Self {
        let data = serde_json::from_str(&response.body).unwrap_or_else(|_| {
            let text = response.body.trim();
            if text.is_empty() {
                Value::Object(Map::new())
            } else {
                json!({ "raw": text })
            }
        });
        Self {
            status: response.status,
            data,
            success: (200..300).contains(&response.status),
        }
    }

    pub fn from_transport_error(err: &TransportError) -> Self {
        Self {
            status: 0,
            data: json!({
                "error": err.message,
                "type": err.kind.as_str(),
            }),
            success: false,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// True when no HTTP response was received.
    pub fn is_transport_failure(&self) -> bool {
        self.status == 0
    }

    /// String field of an object payload, e.g. `response.str_field("id")`.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportErrorKind;

    #[test]
    fn created_json_is_success() {
        let resp = ApiResponse::from_http(HttpResponse::new(201, r#"{"id":"abc"}"#));
        assert!(resp.is_success());
        assert_eq!(resp.status(), 201);
        assert_eq!(resp.data()["id"], "abc");
        assert_eq!(resp.str_field("id"), Some("abc"));
    }

    #[test]
    fn not_found_keeps_payload() {
        let resp = ApiResponse::from_http(HttpResponse::new(404, r#"{"error":"not found"}"#));
        assert!(!resp.is_success());
        assert_eq!(resp.status(), 404);
        assert_eq!(resp.data(), &json!({"error": "not found"}));
        assert!(!resp.is_transport_failure());
    }

    #[test]
    fn plain_text_falls_back_to_raw() {
        let resp = ApiResponse::from_http(HttpResponse::new(500, "  plain text\n"));
        assert!(!resp.is_success());
        assert_eq!(resp.status(), 500);
        assert_eq!(resp.data(), &json!({"raw": "plain text"}));
    }

    #[test]
    fn blank_body_becomes_empty_object() {
        let resp = ApiResponse::from_http(HttpResponse::new(204, "   "));
        assert!(resp.is_success());
        assert_eq!(resp.data(), &json!({}));
    }

    #[test]
    fn json_array_and_scalars_decode() {
        let resp = ApiResponse::from_http(HttpResponse::new(200, "[1,2]"));
        assert_eq!(resp.data(), &json!([1, 2]));
        let resp = ApiResponse::from_http(HttpResponse::new(200, "\"ok\""));
        assert_eq!(resp.data(), &json!("ok"));
    }

    #[test]
    fn success_range_boundaries() {
        assert!(ApiResponse::from_http(HttpResponse::new(200, "")).is_success());
        assert!(ApiResponse::from_http(HttpResponse::new(299, "")).is_success());
        assert!(!ApiResponse::from_http(HttpResponse::new(300, "")).is_success());
        assert!(!ApiResponse::from_http(HttpResponse::new(199, "")).is_success());
    }

    #[test]
    fn transport_failure_uses_status_zero() {
        let err = TransportError::new(TransportErrorKind::Timeout, "timed out");
        let resp = ApiResponse::from_transport_error(&err);
        assert_eq!(resp.status(), 0);
        assert!(!resp.is_success());
        assert!(resp.is_transport_failure());
        assert_eq!(resp.data()["error"], "timed out");
        assert_eq!(resp.data()["type"], "Timeout");
    }
}
