//! Stateless password-reset tokens.
//!
//! A token is `base64url(payload) + "." + hex(hmac-sha256(payload))` where
//! the payload is `user_id:purpose:expires_at` (unix seconds). Nothing is
//! stored server-side; the signature binds the payload to the application
//! secret and verification is constant-time via the MAC.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use tabledesk_core::UserId;

type HmacSha256 = Hmac<Sha256>;

/// Purpose tag baked into password-reset tokens, so a token minted for one
/// flow can never be replayed in another.
const PURPOSE: &str = "password_reset";

/// How long a reset token stays valid.
pub const TOKEN_TTL_MINUTES: i64 = 15;

/// Errors that can occur when verifying a reset token.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResetTokenError {
    /// The token is malformed or its signature doesn't verify.
    #[error("invalid token")]
    Invalid,

    /// The token's expiry has passed.
    #[error("token expired")]
    Expired,
}

/// Issue a password-reset token for `user_id`, valid for
/// [`TOKEN_TTL_MINUTES`] from `now`.
#[must_use]
pub fn issue(secret: &[u8], user_id: UserId, now: DateTime<Utc>) -> String {
    let expires_at = (now + Duration::minutes(TOKEN_TTL_MINUTES)).timestamp();
    let payload = format!("{}:{PURPOSE}:{expires_at}", user_id.as_i32());
    let signature = sign(secret, payload.as_bytes());
    format!("{}.{}", URL_SAFE_NO_PAD.encode(&payload), hex::encode(signature))
}

/// Verify a reset token and return the user it was issued for.
///
/// # Errors
///
/// Returns `ResetTokenError::Invalid` for malformed or tampered tokens and
/// `ResetTokenError::Expired` for well-signed tokens past their expiry.
pub fn verify(secret: &[u8], token: &str, now: DateTime<Utc>) -> Result<UserId, ResetTokenError> {
    let (encoded_payload, signature_hex) =
        token.split_once('.').ok_or(ResetTokenError::Invalid)?;

    let payload = URL_SAFE_NO_PAD
        .decode(encoded_payload)
        .map_err(|_| ResetTokenError::Invalid)?;
    let signature = hex::decode(signature_hex).map_err(|_| ResetTokenError::Invalid)?;

    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| ResetTokenError::Invalid)?;
    mac.update(&payload);
    mac.verify_slice(&signature)
        .map_err(|_| ResetTokenError::Invalid)?;

    let payload = String::from_utf8(payload).map_err(|_| ResetTokenError::Invalid)?;
    let mut parts = payload.split(':');
    let user_id = parts
        .next()
        .and_then(|raw| raw.parse::<i32>().ok())
        .ok_or(ResetTokenError::Invalid)?;
    let purpose = parts.next().ok_or(ResetTokenError::Invalid)?;
    let expires_at = parts
        .next()
        .and_then(|raw| raw.parse::<i64>().ok())
        .ok_or(ResetTokenError::Invalid)?;
    if purpose != PURPOSE || parts.next().is_some() {
        return Err(ResetTokenError::Invalid);
    }

    if now.timestamp() > expires_at {
        return Err(ResetTokenError::Expired);
    }

    Ok(UserId::new(user_id))
}

fn sign(secret: &[u8], payload: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length, so construction cannot fail.
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-key-for-reset-tokens";

    #[test]
    fn test_round_trip() {
        let now = Utc::now();
        let token = issue(SECRET, UserId::new(42), now);
        assert_eq!(verify(SECRET, &token, now).unwrap(), UserId::new(42));
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now();
        let token = issue(SECRET, UserId::new(42), now);
        let later = now + Duration::minutes(TOKEN_TTL_MINUTES + 1);
        assert_eq!(verify(SECRET, &token, later), Err(ResetTokenError::Expired));
    }

    #[test]
    fn test_valid_just_before_expiry() {
        let now = Utc::now();
        let token = issue(SECRET, UserId::new(7), now);
        let almost = now + Duration::minutes(TOKEN_TTL_MINUTES) - Duration::seconds(1);
        assert!(verify(SECRET, &token, almost).is_ok());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let now = Utc::now();
        let token = issue(SECRET, UserId::new(42), now);
        let (_, signature) = token.split_once('.').unwrap();
        let forged_payload =
            URL_SAFE_NO_PAD.encode(format!("1:password_reset:{}", (now.timestamp()) + 900));
        let forged = format!("{forged_payload}.{signature}");
        assert_eq!(verify(SECRET, &forged, now), Err(ResetTokenError::Invalid));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let now = Utc::now();
        let token = issue(SECRET, UserId::new(42), now);
        assert_eq!(
            verify(b"another-secret", &token, now),
            Err(ResetTokenError::Invalid)
        );
    }

    #[test]
    fn test_empty_secret_still_signs_and_verifies() {
        let now = Utc::now();
        let token = issue(b"", UserId::new(3), now);
        let (_, signature_hex) = token.split_once('.').unwrap();
        assert!(!signature_hex.is_empty());
        assert_eq!(verify(b"", &token, now).unwrap(), UserId::new(3));
    }

    #[test]
    fn test_garbage_rejected() {
        let now = Utc::now();
        for garbage in ["", "no-dot", "a.b", "!!!.zzz"] {
            assert_eq!(verify(SECRET, garbage, now), Err(ResetTokenError::Invalid));
        }
    }
}
