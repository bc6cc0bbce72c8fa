//! Webhook signature verification.
//!
//! Deliveries carry `sha256=<hex>` where `<hex>` is the lowercase
//! HMAC-SHA256 of the raw request body keyed by the webhook secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{ApiError, ErrorCode};
use crate::models::WebhookPayload;

type HmacSha256 = Hmac<Sha256>;

/// Prefix of the signature header value.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Computes the signature header value for `payload`.
#[must_use]
pub fn sign_payload(payload: &[u8], secret: &str) -> String {
    keyed_mac(payload, secret)
        .map(|mac| format!("{SIGNATURE_PREFIX}{}", hex::encode(mac.finalize().into_bytes())))
        .unwrap_or_default()
}

/// Returns true if `signature` is the valid signature of `payload`.
///
/// Only the exact `sha256=<lowercase hex>` form is accepted. The digest is
/// checked with [`Mac::verify_slice`], which compares in constant time.
#[must_use]
pub fn verify_signature(payload: &[u8], signature: &str, secret: &str) -> bool {
    let Some(hex_part) = signature.strip_prefix(SIGNATURE_PREFIX) else {
        return false;
    };
    if !hex_part.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return false;
    }
    let Ok(digest) = hex::decode(hex_part) else {
        return false;
    };

    keyed_mac(payload, secret).is_some_and(|mac| mac.verify_slice(&digest).is_ok())
}

/// HMAC-SHA256 over `payload`. HMAC takes keys of any length, so this is
/// always `Some`.
fn keyed_mac(payload: &[u8], secret: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload);
    Some(mac)
}

/// Verifies `signature` and decodes the payload.
///
/// # Errors
///
/// Returns `INVALID_SIGNATURE` without looking at the payload when the
/// signature does not match, and `INVALID_PAYLOAD` when a correctly signed
/// payload is not a valid webhook delivery. Both have status 0.
pub fn parse_and_verify(
    payload: &[u8],
    signature: &str,
    secret: &str,
) -> Result<WebhookPayload, ApiError> {
    if !verify_signature(payload, signature, secret) {
        return Err(ApiError::new(
            "Invalid webhook signature",
            ErrorCode::INVALID_SIGNATURE,
            0,
        ));
    }

    serde_json::from_slice(payload).map_err(|e| {
        ApiError::new("Invalid webhook payload", ErrorCode::INVALID_PAYLOAD, 0).with_source(e)
    })
}
