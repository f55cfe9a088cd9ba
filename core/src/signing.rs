//! Credentials and HMAC-SHA256 request signing.
//!
//! # Design
//! The signed payload depends on the request shape: bodiless requests sign
//! the path with its encoded query string, requests with a body sign the
//! compact JSON body. The caller hands over the exact bytes it transmits, so
//! signature and wire content can never drift apart.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// API key and signing secret of the calling bot.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into(),
        }
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    pub fn sign(&self, payload: &str) -> String {
        sign(&self.secret, payload)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Lowercase hex HMAC-SHA256 of `payload` keyed with `secret`.
///
/// Takes raw bytes as well as text, so a server can check a request body
/// before decoding it.
pub fn sign(secret: &str, payload: impl AsRef<[u8]>) -> String {
    hex::encode(mac(secret, payload).finalize().into_bytes())
}

/// Constant-time check of a hex signature against `payload`.
pub fn verify(secret: &str, payload: impl AsRef<[u8]>, signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };
    mac(secret, payload).verify_slice(&expected).is_ok()
}

fn mac(secret: &str, payload: impl AsRef<[u8]>) -> HmacSha256 {
    // HMAC accepts keys of any length, so this never fails.
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC takes keys of any size"));
    mac.update(payload.as_ref());
    mac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_hmac_sha256_vector() {
        assert_eq!(
            sign("key", "The quick brown fox jumps over the lazy dog"),
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn signs_request_path() {
        assert_eq!(
            sign("test-secret", "/v2/members/me"),
            "cc274241087a29c5b1ef05948eea96e155e1c6392320abe8961d6cd750bb3b6b"
        );
    }

    #[test]
    fn signs_empty_payload() {
        assert_eq!(
            sign("test-secret", ""),
            "a41bc6d81d6413576ae0994995e0ad89a416ec97389515c3604f47722122eeeb"
        );
    }

    #[test]
    fn verify_accepts_own_signature() {
        let sig = sign("s3cret", "/v2/topics?limit=50");
        assert!(verify("s3cret", "/v2/topics?limit=50", &sig));
        assert!(!verify("other", "/v2/topics?limit=50", &sig));
        assert!(!verify("s3cret", "/v2/topics?limit=10", &sig));
    }

    #[test]
    fn byte_and_text_payloads_agree() {
        let body = r#"{"name":"Café ☕"}"#;
        assert_eq!(sign("s3cret", body), sign("s3cret", body.as_bytes()));
        assert!(verify("s3cret", body.as_bytes(), &sign("s3cret", body)));
        assert!(!verify("s3cret", r#"{"name":"Cafe ☕"}"#, &sign("s3cret", body)));
    }

    #[test]
    fn verify_rejects_non_hex() {
        assert!(!verify("s3cret", "payload", "not-hex"));
    }

    #[test]
    fn credentials_debug_hides_secrets() {
        let creds = Credentials::new("key-123", "secret-456");
        let printed = format!("{creds:?}");
        assert!(!printed.contains("key-123"));
        assert!(!printed.contains("secret-456"));
        assert_eq!(creds.bearer(), "Bearer key-123");
    }
}
