// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the request's principal.
//!
//! The extractor never rejects. Handlers receive `Option<Principal>` and pass
//! it to the policy checks, which decide:
//!
//! ```rust,ignore
//! async fn list_users(
//!     CurrentPrincipal(principal): CurrentPrincipal,
//!     State(state): State<AppState>,
//! ) -> Result<Json<Vec<UserView>>, ApiError> {
//!     require_role(principal.as_ref(), ADMIN)?;
//!     // ...
//! }
//! ```

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::principal::Principal;

/// The principal attached by [`super::middleware::authenticate`], if any.
pub struct CurrentPrincipal(pub Option<Principal>);

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentPrincipal(parts.extensions.get::<Principal>().cloned()))
    }
}
