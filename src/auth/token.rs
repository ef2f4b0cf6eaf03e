// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signed identity tokens.
//!
//! Tokens use the compact JWS layout with HMAC-SHA256:
//!
//! ```text
//! base64url({"alg":"HS256","typ":"JWT"}) . base64url(claims) . base64url(mac)
//! ```
//!
//! [`TokenCodec`] holds the keyed MAC and the token lifetime. It performs no
//! I/O and owns no mutable state, so a single instance is shared by every
//! request behind an `Arc`.
//!
//! ## Verification order
//!
//! 1. Size and segment structure (`Malformed`)
//! 2. Constant-time MAC check over the raw `header.claims` bytes (`BadSignature`)
//! 3. Header and claims decoding, algorithm pinning (`Malformed`)
//! 4. Expiry against the caller-supplied clock (`Expired`)
//!
//! Nothing is decoded before the MAC passes, so any altered byte in an
//! otherwise well-formed token is reported as `BadSignature`.

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::Sha256;

use super::error::TokenError;
use super::roles::RoleSet;

type HmacSha256 = Hmac<Sha256>;

/// The only accepted `alg` header value.
pub const ALGORITHM: &str = "HS256";

/// Minimum signing key length in bytes.
pub const MIN_KEY_LEN: usize = 32;

/// Tokens longer than this are rejected before any work is done.
pub const MAX_TOKEN_LEN: usize = 8 * 1024;

const HEADER_JSON: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// Signing key errors, raised once at startup.
#[derive(Debug, thiserror::Error)]
pub enum SigningKeyError {
    #[error("signing key must be at least {min} bytes, got {len}")]
    TooShort { len: usize, min: usize },
    #[error("signing key rejected by HMAC")]
    Rejected,
}

/// Process-wide symmetric signing key.
///
/// Loaded once from configuration; there is no way to change it afterwards.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, SigningKeyError> {
        let bytes = bytes.into();
        if bytes.len() < MIN_KEY_LEN {
            return Err(SigningKeyError::TooShort {
                len: bytes.len(),
                min: MIN_KEY_LEN,
            });
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKey(<redacted>, {} bytes)", self.0.len())
    }
}

/// Claim set carried by a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identity key
    pub sub: String,
    /// Roles held at issuance (informational only)
    #[serde(default)]
    pub roles: RoleSet,
    /// Issued at, unix seconds
    pub iat: i64,
    /// Expiry, unix seconds
    pub exp: i64,
}

#[derive(Deserialize)]
struct Header {
    alg: String,
}

/// An issued token. Immutable; a new one is issued instead of changing it.
#[derive(Debug, Clone)]
pub struct Token {
    claims: Claims,
    signature: Vec<u8>,
    compact: String,
}

impl Token {
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn subject(&self) -> &str {
        &self.claims.sub
    }

    pub fn roles(&self) -> &RoleSet {
        &self.claims.roles
    }

    pub fn issued_at(&self) -> i64 {
        self.claims.iat
    }

    pub fn expires_at(&self) -> i64 {
        self.claims.exp
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Compact wire form, as carried in the cookie.
    pub fn as_str(&self) -> &str {
        &self.compact
    }
}

/// Issues and verifies tokens with a fixed key and lifetime.
#[derive(Clone)]
pub struct TokenCodec {
    mac: HmacSha256,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(key: &SigningKey, ttl: Duration) -> Result<Self, SigningKeyError> {
        let mac = HmacSha256::new_from_slice(key.as_bytes()).map_err(|_| SigningKeyError::Rejected)?;
        Ok(Self { mac, ttl })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Build and sign a token for `subject`.
    ///
    /// Deterministic: the same inputs and `now` produce the same token.
    pub fn issue(&self, subject: &str, roles: &RoleSet, now: DateTime<Utc>) -> Token {
        let iat = now.timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            roles: roles.clone(),
            iat,
            exp: iat.saturating_add(self.ttl.num_seconds()),
        };

        let payload = serde_json::json!({
            "sub": claims.sub,
            "roles": claims.roles,
            "iat": claims.iat,
            "exp": claims.exp,
        })
        .to_string();

        let signing_input = format!(
            "{}.{}",
            Base64UrlUnpadded::encode_string(HEADER_JSON.as_bytes()),
            Base64UrlUnpadded::encode_string(payload.as_bytes())
        );
        let signature = self.sign(signing_input.as_bytes());
        let compact = format!(
            "{signing_input}.{}",
            Base64UrlUnpadded::encode_string(&signature)
        );

        Token {
            claims,
            signature,
            compact,
        }
    }

    /// Verify `raw` and return its claims if it is authentic and unexpired at `now`.
    pub fn verify(&self, raw: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        if raw.is_empty() || raw.len() > MAX_TOKEN_LEN {
            return Err(TokenError::Malformed);
        }

        let mut segments = raw.split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::Malformed);
        };
        if header.is_empty() || payload.is_empty() || signature.is_empty() {
            return Err(TokenError::Malformed);
        }

        let signing_input = &raw[..header.len() + 1 + payload.len()];
        let signature =
            Base64UrlUnpadded::decode_vec(signature).map_err(|_| TokenError::BadSignature)?;
        let mut mac = self.mac.clone();
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let header: Header = decode_segment(header)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::Malformed);
        }

        let claims: Claims = decode_segment(payload)?;
        if claims.sub.is_empty() {
            return Err(TokenError::Malformed);
        }
        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn sign(&self, input: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(input);
        mac.finalize().into_bytes().to_vec()
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &ALGORITHM)
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish()
    }
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = Base64UrlUnpadded::decode_vec(segment).map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}
