// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential login.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::error::AuthenticationError;
use super::password::{CredentialError, CredentialVerifier, PasswordHash};
use super::token::{Token, TokenCodec};
use crate::store::{normalize_identity, UserDirectory};

/// Exchanges an identity and plaintext secret for a signed token.
#[derive(Clone)]
pub struct LoginService {
    directory: Arc<dyn UserDirectory>,
    verifier: CredentialVerifier,
    codec: Arc<TokenCodec>,
    decoy: PasswordHash,
}

impl LoginService {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        verifier: CredentialVerifier,
        codec: Arc<TokenCodec>,
    ) -> Result<Self, CredentialError> {
        let decoy = verifier.decoy_hash()?;
        Ok(Self {
            directory,
            verifier,
            codec,
            decoy,
        })
    }

    /// Authenticate and issue a token stamped with `now`.
    ///
    /// Unknown identities and wrong secrets both yield
    /// [`AuthenticationError::InvalidCredentials`] after one hash evaluation.
    pub async fn login(
        &self,
        identity_key: &str,
        secret: &str,
        now: DateTime<Utc>,
    ) -> Result<Token, AuthenticationError> {
        let identity_key = normalize_identity(identity_key);

        let Some(credential) = self
            .directory
            .find_credential_by_identity(&identity_key)
            .await?
        else {
            let _ = self
                .verifier
                .matches_blocking(secret.to_string(), self.decoy.clone())
                .await;
            return Err(AuthenticationError::InvalidCredentials);
        };

        if !self
            .verifier
            .matches_blocking(secret.to_string(), credential.secret.clone())
            .await
        {
            return Err(AuthenticationError::InvalidCredentials);
        }

        // Account removed between the two reads.
        let Some(roles) = self
            .directory
            .find_current_roles(&credential.identity_key)
            .await?
        else {
            return Err(AuthenticationError::InvalidCredentials);
        };

        Ok(self.codec.issue(&credential.identity_key, &roles, now))
    }
}
