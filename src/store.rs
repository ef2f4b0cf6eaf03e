// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User persistence.
//!
//! The authentication core only depends on the [`UserDirectory`] trait. The
//! in-memory implementation here backs the binary and the tests; a relational
//! store plugs in by implementing the same two lookups.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use unicode_normalization::UnicodeNormalization;

use crate::auth::password::PasswordHash;
use crate::auth::roles::RoleSet;

/// Failure to reach the user directory.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DirectoryError {
    #[error("user directory unavailable: {0}")]
    Unavailable(String),
}

/// Errors from account mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("an account already exists for {0}")]
    Duplicate(String),
    #[error("no account for {0}")]
    NotFound(String),
}

/// Identity key plus stored secret, as read during login.
#[derive(Debug, Clone)]
pub struct Credential {
    pub identity_key: String,
    pub secret: PasswordHash,
}

/// A stored account.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub identity_key: String,
    pub full_name: String,
    pub secret: PasswordHash,
    pub roles: RoleSet,
    pub created_at: DateTime<Utc>,
}

/// Lookups the authentication core needs from user persistence.
///
/// Both are point reads by unique identity key. Consistency and locking are
/// the implementation's concern.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Stored credential for `identity_key`, if the account exists.
    async fn find_credential_by_identity(
        &self,
        identity_key: &str,
    ) -> Result<Option<Credential>, DirectoryError>;

    /// Current role set for `identity_key`, or `None` if the account is gone.
    async fn find_current_roles(&self, identity_key: &str)
        -> Result<Option<RoleSet>, DirectoryError>;
}

/// Canonical form of an identity key.
///
/// Trimmed and NFC-normalized; case is preserved, so `A@x.io` and `a@x.io`
/// are different identities. Applied once at registration and to every login
/// attempt.
pub fn normalize_identity(raw: &str) -> String {
    raw.trim().nfc().collect()
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<BTreeMap<String, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new account under its normalized identity key.
    pub async fn register(
        &self,
        identity_key: &str,
        full_name: impl Into<String>,
        secret: PasswordHash,
        roles: RoleSet,
    ) -> Result<UserRecord, StoreError> {
        let identity_key = normalize_identity(identity_key);
        let mut users = self.users.write().await;
        if users.contains_key(&identity_key) {
            return Err(StoreError::Duplicate(identity_key));
        }

        let record = UserRecord {
            identity_key: identity_key.clone(),
            full_name: full_name.into(),
            secret,
            roles,
            created_at: Utc::now(),
        };
        users.insert(identity_key, record.clone());
        Ok(record)
    }

    pub async fn get(&self, identity_key: &str) -> Option<UserRecord> {
        self.users.read().await.get(identity_key).cloned()
    }

    /// All accounts, ordered by identity key.
    pub async fn list(&self) -> Vec<UserRecord> {
        self.users.read().await.values().cloned().collect()
    }

    pub async fn set_roles(
        &self,
        identity_key: &str,
        roles: RoleSet,
    ) -> Result<UserRecord, StoreError> {
        let mut users = self.users.write().await;
        let record = users
            .get_mut(identity_key)
            .ok_or_else(|| StoreError::NotFound(identity_key.to_string()))?;
        record.roles = roles;
        Ok(record.clone())
    }

    pub async fn update_full_name(
        &self,
        identity_key: &str,
        full_name: impl Into<String>,
    ) -> Result<UserRecord, StoreError> {
        let mut users = self.users.write().await;
        let record = users
            .get_mut(identity_key)
            .ok_or_else(|| StoreError::NotFound(identity_key.to_string()))?;
        record.full_name = full_name.into();
        Ok(record.clone())
    }

    pub async fn delete(&self, identity_key: &str) -> Result<(), StoreError> {
        if self.users.write().await.remove(identity_key).is_some() {
            Ok(())
        } else {
            Err(StoreError::NotFound(identity_key.to_string()))
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserStore {
    async fn find_credential_by_identity(
        &self,
        identity_key: &str,
    ) -> Result<Option<Credential>, DirectoryError> {
        Ok(self
            .users
            .read()
            .await
            .get(identity_key)
            .map(|record| Credential {
                identity_key: record.identity_key.clone(),
                secret: record.secret.clone(),
            }))
    }

    async fn find_current_roles(
        &self,
        identity_key: &str,
    ) -> Result<Option<RoleSet>, DirectoryError> {
        Ok(self
            .users
            .read()
            .await
            .get(identity_key)
            .map(|record| record.roles.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::roles::{role_set, ADMIN, USER};

    fn hash() -> PasswordHash {
        PasswordHash::from_phc("$argon2id$placeholder")
    }

    #[test]
    fn normalize_trims_and_keeps_case() {
        assert_eq!(normalize_identity("  Amit@Example.com \n"), "Amit@Example.com");
    }

    #[test]
    fn normalize_composes_unicode() {
        // "e" + combining acute accent vs precomposed "é"
        assert_eq!(normalize_identity("jose\u{0301}@x.io"), "jos\u{00e9}@x.io");
    }

    #[tokio::test]
    async fn register_normalizes_and_rejects_duplicates() {
        let store = InMemoryUserStore::new();
        let record = store
            .register(" u1@example.com ", "User One", hash(), role_set([USER]))
            .await
            .unwrap();
        assert_eq!(record.identity_key, "u1@example.com");

        let duplicate = store
            .register("u1@example.com", "Again", hash(), role_set([USER]))
            .await;
        assert_eq!(
            duplicate.unwrap_err(),
            StoreError::Duplicate("u1@example.com".to_string())
        );
    }

    #[tokio::test]
    async fn case_variants_are_distinct_accounts() {
        let store = InMemoryUserStore::new();
        store.register("u1@x.io", "a", hash(), role_set([USER])).await.unwrap();
        store.register("U1@x.io", "b", hash(), role_set([USER])).await.unwrap();
        assert_eq!(store.list().await.len(), 2);
    }

    #[tokio::test]
    async fn directory_lookups() {
        let store = InMemoryUserStore::new();
        store.register("u1", "User One", hash(), role_set([USER])).await.unwrap();

        let credential = store.find_credential_by_identity("u1").await.unwrap().unwrap();
        assert_eq!(credential.identity_key, "u1");
        assert_eq!(credential.secret, hash());

        let roles = store.find_current_roles("u1").await.unwrap();
        assert_eq!(roles, Some(role_set([USER])));

        assert!(store.find_credential_by_identity("nobody").await.unwrap().is_none());
        assert!(store.find_current_roles("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_roles_is_visible_to_directory() {
        let store = InMemoryUserStore::new();
        store.register("u1", "User One", hash(), role_set([USER])).await.unwrap();
        store.set_roles("u1", role_set([USER, ADMIN])).await.unwrap();
        assert_eq!(
            store.find_current_roles("u1").await.unwrap(),
            Some(role_set([USER, ADMIN]))
        );
        assert_eq!(
            store.set_roles("nobody", role_set([USER])).await.unwrap_err(),
            StoreError::NotFound("nobody".to_string())
        );
    }

    #[tokio::test]
    async fn update_full_name_keeps_roles() {
        let store = InMemoryUserStore::new();
        store.register("u1", "User One", hash(), role_set([USER])).await.unwrap();
        let updated = store.update_full_name("u1", "Renamed").await.unwrap();
        assert_eq!(updated.full_name, "Renamed");
        assert_eq!(updated.roles, role_set([USER]));
        assert!(store.update_full_name("nobody", "x").await.is_err());
    }

    #[tokio::test]
    async fn delete_removes_account() {
        let store = InMemoryUserStore::new();
        store.register("u1", "User One", hash(), role_set([USER])).await.unwrap();
        store.delete("u1").await.unwrap();
        assert!(store.get("u1").await.is_none());
        assert!(store.delete("u1").await.is_err());
    }
}
