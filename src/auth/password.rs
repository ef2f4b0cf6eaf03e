// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password hashing and verification (Argon2id, PHC string format).

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash as PhcString, SaltString};

/// Salt length in bytes.
const SALT_LEN: usize = 16;

/// Opaque one-way password hash as stored by the user directory.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a PHC string loaded from storage.
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("failed to generate salt: {0}")]
    Salt(String),
    #[error("failed to hash password: {0}")]
    Hash(String),
    #[error("hashing task failed: {0}")]
    Task(String),
}

/// Stateless wrapper around Argon2 with default parameters.
#[derive(Clone, Default)]
pub struct CredentialVerifier {
    argon2: Argon2<'static>,
}

impl CredentialVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash `plaintext` with a fresh random salt.
    ///
    /// Hashing the same input twice yields two different strings that both
    /// verify.
    pub fn hash(&self, plaintext: &str) -> Result<PasswordHash, CredentialError> {
        let mut salt_bytes = [0u8; SALT_LEN];
        getrandom::getrandom(&mut salt_bytes).map_err(|e| CredentialError::Salt(e.to_string()))?;
        let salt =
            SaltString::encode_b64(&salt_bytes).map_err(|e| CredentialError::Salt(e.to_string()))?;
        let phc = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hash(e.to_string()))?;
        Ok(PasswordHash(phc.to_string()))
    }

    /// Check `plaintext` against `stored`.
    ///
    /// The digest comparison is constant-time. A stored value that is not a
    /// parseable PHC string never matches.
    pub fn matches(&self, plaintext: &str, stored: &PasswordHash) -> bool {
        match PhcString::new(stored.as_str()) {
            Ok(parsed) => self
                .argon2
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// [`Self::hash`] on the blocking pool, off the async worker threads.
    pub async fn hash_blocking(&self, plaintext: String) -> Result<PasswordHash, CredentialError> {
        let verifier = self.clone();
        tokio::task::spawn_blocking(move || verifier.hash(&plaintext))
            .await
            .map_err(|e| CredentialError::Task(e.to_string()))?
    }

    /// [`Self::matches`] on the blocking pool. A failed task never matches.
    pub async fn matches_blocking(&self, plaintext: String, stored: PasswordHash) -> bool {
        let verifier = self.clone();
        match tokio::task::spawn_blocking(move || verifier.matches(&plaintext, &stored)).await {
            Ok(matched) => matched,
            Err(e) => {
                tracing::error!(error = %e, "Password verification task failed");
                false
            }
        }
    }

    /// Hash of a random secret nobody knows.
    ///
    /// Login verifies against it when the identity is unknown so that both
    /// failure paths cost one Argon2 evaluation.
    pub fn decoy_hash(&self) -> Result<PasswordHash, CredentialError> {
        let mut secret = [0u8; 32];
        getrandom::getrandom(&mut secret).map_err(|e| CredentialError::Salt(e.to_string()))?;
        let secret: String = secret.iter().map(|b| format!("{b:02x}")).collect();
        self.hash(&secret)
    }
}
