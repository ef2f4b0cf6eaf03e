// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::password::CredentialError;
use crate::auth::token::SigningKeyError;
use crate::auth::{AuthState, CredentialVerifier, LoginService, TokenCodec};
use crate::config::AppConfig;
use crate::store::InMemoryUserStore;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("signing key rejected: {0}")]
    SigningKey(#[from] SigningKeyError),
    #[error("credential setup failed: {0}")]
    Credential(#[from] CredentialError),
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<InMemoryUserStore>,
    pub codec: Arc<TokenCodec>,
    pub verifier: CredentialVerifier,
    pub login: LoginService,
    pub cookie_name: Arc<str>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Result<Self, StateError> {
        let store = Arc::new(InMemoryUserStore::new());
        let codec = Arc::new(TokenCodec::new(&config.signing_key, config.token_ttl)?);
        let verifier = CredentialVerifier::new();
        let login = LoginService::new(store.clone(), verifier.clone(), codec.clone())?;

        Ok(Self {
            store,
            codec,
            verifier,
            login,
            cookie_name: Arc::from(config.cookie_name.as_str()),
        })
    }

    /// Collaborators for the authentication layer.
    pub fn auth_state(&self) -> AuthState {
        AuthState {
            codec: self.codec.clone(),
            directory: self.store.clone(),
            cookie_name: self.cookie_name.clone(),
        }
    }
}
