//! LINE webhook signature validation.
//!
//! LINE signs every webhook request with HMAC-SHA256 of the raw request body
//! keyed by the channel secret, base64-encoded into the `x-line-signature`
//! header. Validation must run against the exact bytes received, before any
//! JSON parsing.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Result of signature validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the signature is valid.
    pub is_valid: bool,
    /// Error message if validation failed.
    pub error_message: Option<String>,
}

impl ValidationResult {
    /// Creates a successful validation result.
    pub fn valid() -> Self {
        Self { is_valid: true, error_message: None }
    }

    /// Creates a failed validation result with error message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self { is_valid: false, error_message: Some(message.into()) }
    }
}

/// Validates a LINE webhook signature against the raw request body.
///
/// # Example
///
/// ```
/// use relay_line::signature::{sign, validate_signature};
///
/// let body = br#"{"destination":"U0","events":[]}"#;
/// let signature = sign(body, "channel-secret");
///
/// assert!(validate_signature(body, &signature, "channel-secret").is_valid);
/// assert!(!validate_signature(body, &signature, "other-secret").is_valid);
/// ```
pub fn validate_signature(body: &[u8], signature: &str, channel_secret: &str) -> ValidationResult {
    if signature.is_empty() {
        return ValidationResult::invalid("signature header is empty");
    }

    if channel_secret.is_empty() {
        return ValidationResult::invalid("channel secret is empty");
    }

    let Ok(provided) = STANDARD.decode(signature.trim()) else {
        return ValidationResult::invalid("signature is not valid base64");
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(channel_secret.as_bytes()) else {
        return ValidationResult::invalid("invalid channel secret");
    };
    mac.update(body);

    // verify_slice compares in constant time
    match mac.verify_slice(&provided) {
        Ok(()) => ValidationResult::valid(),
        Err(_) => ValidationResult::invalid("signature mismatch"),
    }
}

/// Computes the base64 HMAC-SHA256 signature LINE would send for `body`.
pub fn sign(body: &[u8], channel_secret: &str) -> String {
    // HMAC accepts keys of any length, including empty
    let mut mac = match HmacSha256::new_from_slice(channel_secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}
