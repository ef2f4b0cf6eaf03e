// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The authenticated identity attached to a single request.

use serde::Serialize;

use super::roles::RoleSet;
use super::token::Claims;

/// Authenticated identity for the duration of one request.
///
/// Built by the authentication layer from a verified token plus the role set
/// read from the user directory while handling that same request. It is never
/// persisted and cannot be modified once built; handlers pass it explicitly to
/// the policy checks in [`super::policy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    identity_key: String,
    roles: RoleSet,
}

impl Principal {
    pub fn new(identity_key: impl Into<String>, roles: RoleSet) -> Self {
        Self {
            identity_key: identity_key.into(),
            roles,
        }
    }

    /// Combine verified claims with the subject's current roles.
    ///
    /// The roles embedded in the token are discarded: a role revoked after
    /// issuance must not survive until the token expires.
    pub fn from_verified(claims: Claims, current_roles: RoleSet) -> Self {
        Self::new(claims.sub, current_roles)
    }

    /// Canonical identity key (the `sub` claim).
    pub fn identity_key(&self) -> &str {
        &self.identity_key
    }

    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    /// Exact, case-sensitive role membership.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}
