//! Credential and token primitives
//!
//! Pure functions only — no HTTP framework or database dependencies.
//! The service crate wires these into middleware and handlers.
//!
//! - Passwords are stored as `salt$digest` where digest is the SHA-256
//!   of salt bytes followed by the password.
//! - Bearer tokens are `base64url(claims-json).hex(sha256(payload || secret))`
//!   with a 24-hour expiry.
//! - Password-reset tokens are random 32-byte values; only the SHA-256
//!   hex of the raw token is ever persisted.

use crate::{Error, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Bearer token lifetime in seconds (24 hours)
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Password-reset token lifetime in seconds (1 hour)
pub const RESET_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// Claims carried by a bearer token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User id
    pub sub: i64,
    pub email: String,
    pub role: String,
    /// Expiry as Unix timestamp (seconds)
    pub exp: i64,
}

impl Claims {
    /// Claims for a fresh login, expiring TOKEN_TTL_SECS from now
    pub fn new(sub: i64, email: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            sub,
            email: email.into(),
            role: role.into(),
            exp: chrono::Utc::now().timestamp() + TOKEN_TTL_SECS,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{:02x}", b);
    }
    out
}

fn signature(payload: &[u8], secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sign claims into a bearer token string
pub fn sign_token(claims: &Claims, secret: &str) -> Result<String> {
    let payload = serde_json::to_vec(claims)
        .map_err(|e| Error::Internal(format!("claims serialization: {}", e)))?;
    let encoded = URL_SAFE_NO_PAD.encode(&payload);
    let sig = signature(&payload, secret);
    Ok(format!("{}.{}", encoded, sig))
}

/// Verify a bearer token's signature and expiry, returning its claims
pub fn verify_token(token: &str, secret: &str) -> Result<Claims> {
    let (encoded, sig) = token
        .split_once('.')
        .ok_or_else(|| Error::Auth("malformed token".to_string()))?;

    let payload = URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|_| Error::Auth("malformed token".to_string()))?;

    if signature(&payload, secret) != sig {
        return Err(Error::Auth("invalid token signature".to_string()));
    }

    let claims: Claims = serde_json::from_slice(&payload)
        .map_err(|_| Error::Auth("malformed token claims".to_string()))?;

    if claims.exp <= chrono::Utc::now().timestamp() {
        return Err(Error::Auth("token expired".to_string()));
    }

    Ok(claims)
}

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt_hex = hex_encode(&salt);

    let mut hasher = Sha256::new();
    hasher.update(&salt);
    hasher.update(password.as_bytes());
    format!("{}${:x}", salt_hex, hasher.finalize())
}

/// Verify a password against a stored `salt$digest` value
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, digest)) = stored.split_once('$') else {
        return false;
    };
    let Some(salt) = decode_hex(salt_hex) else {
        return false;
    };

    let mut hasher = Sha256::new();
    hasher.update(&salt);
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize()) == digest
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

/// Generate a password-reset token, returning (raw, stored-hash)
///
/// The raw value goes to the user; only the hash is persisted.
pub fn generate_reset_token() -> (String, String) {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let raw = hex_encode(&bytes);
    let hash = hash_reset_token(&raw);
    (raw, hash)
}

/// Hash a raw reset token for storage or lookup
pub fn hash_reset_token(raw: &str) -> String {
    format!("{:x}", Sha256::digest(raw.as_bytes()))
}

/// Generate a random signing secret (used when none is configured)
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex_encode(&bytes)
}
