// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.
//!
//! Roles are plain strings owned by the user directory, so new roles can be
//! introduced without touching the authorization core. Two are well known:
//!
//! - `ADMIN` - Full access, bypasses ownership checks
//! - `USER` - Normal account, may only modify what it owns

use std::collections::BTreeSet;

/// Administrative role.
pub const ADMIN: &str = "ADMIN";

/// Role granted to every newly registered account.
pub const USER: &str = "USER";

/// Set of role names held by an identity.
///
/// Ordered so that serialized tokens are byte-for-byte reproducible.
pub type RoleSet = BTreeSet<String>;

/// Build a [`RoleSet`] from anything yielding role names.
pub fn role_set<I, S>(roles: I) -> RoleSet
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    roles.into_iter().map(Into::into).collect()
}

/// Role set assigned at registration.
pub fn default_roles() -> RoleSet {
    role_set([USER])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_set_deduplicates_and_orders() {
        let roles = role_set(["USER", "ADMIN", "USER"]);
        assert_eq!(roles.len(), 2);
        assert_eq!(roles.iter().next().map(String::as_str), Some("ADMIN"));
    }

    #[test]
    fn default_roles_is_user_only() {
        assert_eq!(default_roles(), role_set([USER]));
    }

    #[test]
    fn role_names_are_case_sensitive() {
        let roles = role_set(["admin"]);
        assert!(!roles.contains(ADMIN));
    }
}
