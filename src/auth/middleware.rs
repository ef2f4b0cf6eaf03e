// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Runs once per request, before routing:
//!
//! ```text
//! NoToken ─────────────────────────────────────────────▶ anonymous
//! token ─▶ verify ─┬─ TokenError ──────────────────────▶ anonymous
//!                  └─ ok ─▶ role lookup ─┬─ not found ─▶ anonymous
//!                                        └─ found ─────▶ Principal
//! ```
//!
//! The layer never rejects a request. It only decides whether a
//! [`Principal`] is attached to the request extensions; handlers enforce
//! access with [`super::policy`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/protected", get(handler))
//!     .layer(axum::middleware::from_fn_with_state(auth_state, authenticate));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};

use super::cookie::read_cookie;
use super::error::TokenError;
use super::principal::Principal;
use super::token::TokenCodec;
use crate::store::UserDirectory;

/// Shared, read-only collaborators of the authentication layer.
#[derive(Clone)]
pub struct AuthState {
    pub codec: Arc<TokenCodec>,
    pub directory: Arc<dyn UserDirectory>,
    pub cookie_name: Arc<str>,
}

/// How a request was (or was not) authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    NoToken,
    TokenInvalid(TokenError),
    SubjectNotFound,
    LookupFailed(String),
    Authenticated(Principal),
}

impl Resolution {
    pub fn into_principal(self) -> Option<Principal> {
        match self {
            Resolution::Authenticated(principal) => Some(principal),
            _ => None,
        }
    }
}

/// Resolve the principal for a raw token observed at `now`.
///
/// The directory is consulted exactly once when the token verifies and not
/// at all otherwise.
pub async fn resolve_principal(
    raw_token: Option<&str>,
    now: DateTime<Utc>,
    codec: &TokenCodec,
    directory: &dyn UserDirectory,
) -> Resolution {
    let Some(raw_token) = raw_token else {
        return Resolution::NoToken;
    };

    let claims = match codec.verify(raw_token, now) {
        Ok(claims) => claims,
        Err(e) => return Resolution::TokenInvalid(e),
    };

    match directory.find_current_roles(&claims.sub).await {
        Ok(Some(roles)) => Resolution::Authenticated(Principal::from_verified(claims, roles)),
        Ok(None) => Resolution::SubjectNotFound,
        Err(e) => Resolution::LookupFailed(e.to_string()),
    }
}

/// Authentication middleware function.
pub async fn authenticate(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    // Only this layer may place a principal on the request.
    request.extensions_mut().remove::<Principal>();

    let raw_token = read_cookie(request.headers(), &auth.cookie_name);
    let resolution = resolve_principal(
        raw_token.as_deref(),
        Utc::now(),
        &auth.codec,
        auth.directory.as_ref(),
    )
    .await;

    match &resolution {
        Resolution::NoToken => {}
        Resolution::TokenInvalid(e) => {
            tracing::debug!(reason = e.kind(), "Ignoring invalid token, request is anonymous");
        }
        Resolution::SubjectNotFound => {
            tracing::debug!("Token subject no longer exists, request is anonymous");
        }
        Resolution::LookupFailed(e) => {
            tracing::warn!(error = %e, "Role lookup failed, request is anonymous");
        }
        Resolution::Authenticated(principal) => {
            tracing::debug!(identity = %principal.identity_key(), "Request authenticated");
        }
    }

    if let Some(principal) = resolution.into_principal() {
        request.extensions_mut().insert(principal);
    }

    next.run(request).await
}
