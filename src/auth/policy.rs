// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization checks.
//!
//! Business operations call these guards first, passing the request's
//! principal explicitly:
//!
//! ```rust,ignore
//! require_role(principal.as_ref(), ADMIN)?;
//! require_owner_or_role(principal.as_ref(), &OwnershipFact::new(owner), ADMIN)?;
//! ```
//!
//! Both are pure functions of their arguments. An absent principal is always
//! denied with [`AuthzError::Forbidden`]; turning that into `401` for
//! anonymous callers is left to the transport layer.

use super::error::AuthzError;
use super::principal::Principal;

/// Identity that owns the resource an operation targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipFact {
    resource_owner_identity: String,
}

impl OwnershipFact {
    pub fn new(resource_owner_identity: impl Into<String>) -> Self {
        Self {
            resource_owner_identity: resource_owner_identity.into(),
        }
    }

    pub fn resource_owner_identity(&self) -> &str {
        &self.resource_owner_identity
    }
}

/// Allow only principals holding `role`.
pub fn require_role(principal: Option<&Principal>, role: &str) -> Result<(), AuthzError> {
    match principal {
        Some(principal) if principal.has_role(role) => Ok(()),
        _ => Err(AuthzError::Forbidden),
    }
}

/// Allow the resource owner, or any principal holding `admin_role`.
///
/// Identity comparison is exact; keys are canonicalized at registration.
pub fn require_owner_or_role(
    principal: Option<&Principal>,
    ownership: &OwnershipFact,
    admin_role: &str,
) -> Result<(), AuthzError> {
    let Some(principal) = principal else {
        return Err(AuthzError::Forbidden);
    };

    if principal.identity_key() == ownership.resource_owner_identity()
        || principal.has_role(admin_role)
    {
        Ok(())
    } else {
        Err(AuthzError::Forbidden)
    }
}
