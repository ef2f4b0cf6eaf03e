// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.
//!
//! Every handler runs its authorization guard before touching the store, so a
//! denied caller learns nothing about whether the target account exists.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{
        require_owner_or_role, require_role,
        roles::{RoleSet, ADMIN, USER},
        AuthzError, CurrentPrincipal, OwnershipFact, Principal,
    },
    error::ApiError,
    state::AppState,
    store::{normalize_identity, UserRecord},
};

/// Public view of an account. The stored secret is never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub identity_key: String,
    pub full_name: String,
    pub roles: RoleSet,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserView {
    fn from(record: UserRecord) -> Self {
        Self {
            identity_key: record.identity_key,
            full_name: record.full_name,
            roles: record.roles,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetRolesRequest {
    pub roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub full_name: String,
}

fn audited(
    decision: Result<(), AuthzError>,
    principal: Option<&Principal>,
    action: &'static str,
) -> Result<(), AuthzError> {
    if decision.is_err() {
        tracing::warn!(
            identity = principal.map(Principal::identity_key).unwrap_or("anonymous"),
            action,
            "Access denied"
        );
    }
    decision
}

/// GET /v1/api/users/me
///
/// The caller's identity and current roles. Anonymous callers are denied.
pub async fn me(CurrentPrincipal(principal): CurrentPrincipal) -> Result<Json<Principal>, ApiError> {
    match principal {
        Some(principal) => Ok(Json(principal)),
        None => Err(AuthzError::Forbidden.into()),
    }
}

/// GET /v1/api/users/{identity}
///
/// Any authenticated caller may read a profile.
pub async fn get_user(
    CurrentPrincipal(principal): CurrentPrincipal,
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> Result<Json<UserView>, ApiError> {
    if principal.is_none() {
        audited(Err(AuthzError::Forbidden), None, "get_user")?;
    }

    let identity = normalize_identity(&identity);
    let record = state
        .store
        .get(&identity)
        .await
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(record.into()))
}

/// GET /v1/api/users
pub async fn list_users(
    CurrentPrincipal(principal): CurrentPrincipal,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserView>>, ApiError> {
    audited(
        require_role(principal.as_ref(), ADMIN),
        principal.as_ref(),
        "list_users",
    )?;

    let users = state.store.list().await;
    Ok(Json(users.into_iter().map(UserView::from).collect()))
}

/// PUT /v1/api/users/{identity}/roles
pub async fn set_roles(
    CurrentPrincipal(principal): CurrentPrincipal,
    State(state): State<AppState>,
    Path(identity): Path<String>,
    Json(request): Json<SetRolesRequest>,
) -> Result<Json<UserView>, ApiError> {
    audited(
        require_role(principal.as_ref(), ADMIN),
        principal.as_ref(),
        "set_roles",
    )?;

    let roles: RoleSet = request.roles.into_iter().collect();
    if roles.is_empty() {
        return Err(ApiError::bad_request("At least one role is required"));
    }
    if let Some(unknown) = roles.iter().find(|r| r.as_str() != ADMIN && r.as_str() != USER) {
        return Err(ApiError::bad_request(format!("Unknown role: {unknown}")));
    }

    let identity = normalize_identity(&identity);
    let record = state.store.set_roles(&identity, roles).await?;
    tracing::info!(identity = %record.identity_key, roles = ?record.roles, "Roles updated");
    Ok(Json(record.into()))
}

/// PUT /v1/api/users/{identity}
pub async fn update_user(
    CurrentPrincipal(principal): CurrentPrincipal,
    State(state): State<AppState>,
    Path(identity): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserView>, ApiError> {
    let identity = normalize_identity(&identity);
    audited(
        require_owner_or_role(principal.as_ref(), &OwnershipFact::new(identity.as_str()), ADMIN),
        principal.as_ref(),
        "update_user",
    )?;

    let record = state
        .store
        .update_full_name(&identity, request.full_name.trim())
        .await?;
    Ok(Json(record.into()))
}

/// DELETE /v1/api/users/{identity}
pub async fn delete_user(
    CurrentPrincipal(principal): CurrentPrincipal,
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> Result<StatusCode, ApiError> {
    let identity = normalize_identity(&identity);
    audited(
        require_owner_or_role(principal.as_ref(), &OwnershipFact::new(identity.as_str()), ADMIN),
        principal.as_ref(),
        "delete_user",
    )?;

    state.store.delete(&identity).await?;
    tracing::info!(identity = %identity, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{roles::role_set, PasswordHash};
    use crate::config::{AppConfig, JWT_SECRET_ENV};

    fn state() -> AppState {
        let config = AppConfig::from_lookup(|name| {
            (name == JWT_SECRET_ENV).then(|| "k".repeat(32))
        })
        .unwrap();
        AppState::new(&config).unwrap()
    }

    async fn seed(state: &AppState, identity: &str, roles: RoleSet) {
        state
            .store
            .register(identity, "Someone", PasswordHash::from_phc("$argon2id$x"), roles)
            .await
            .unwrap();
    }

    #[test]
    fn user_view_omits_secret() {
        let record = UserRecord {
            identity_key: "u1@example.com".to_string(),
            full_name: "User One".to_string(),
            secret: PasswordHash::from_phc("$argon2id$secret"),
            roles: role_set([USER]),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(UserView::from(record)).unwrap();
        assert_eq!(json["identity_key"], "u1@example.com");
        assert!(json.get("secret").is_none());
    }

    #[tokio::test]
    async fn me_requires_principal() {
        let err = me(CurrentPrincipal(None)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let principal = Principal::new("u1@example.com", role_set([USER]));
        let Json(found) = me(CurrentPrincipal(Some(principal.clone()))).await.unwrap();
        assert_eq!(found, principal);
    }

    #[tokio::test]
    async fn get_user_requires_any_principal() {
        let state = state();
        seed(&state, "u2@example.com", role_set([USER])).await;

        let err = get_user(
            CurrentPrincipal(None),
            State(state.clone()),
            Path("u2@example.com".to_string()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let reader = || CurrentPrincipal(Some(Principal::new("u1@example.com", role_set([USER]))));
        let Json(view) = get_user(reader(), State(state.clone()), Path("u2@example.com".to_string()))
            .await
            .unwrap();
        assert_eq!(view.identity_key, "u2@example.com");

        let err = get_user(reader(), State(state), Path("ghost@example.com".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_users_is_admin_only() {
        let state = state();
        seed(&state, "u1@example.com", role_set([USER])).await;

        let user = Principal::new("u1@example.com", role_set([USER]));
        let err = list_users(CurrentPrincipal(Some(user)), State(state.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let admin = Principal::new("admin@example.com", role_set([ADMIN]));
        let Json(users) = list_users(CurrentPrincipal(Some(admin)), State(state))
            .await
            .unwrap();
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn set_roles_validates_role_names() {
        let state = state();
        seed(&state, "u1@example.com", role_set([USER])).await;
        let admin = || CurrentPrincipal(Some(Principal::new("admin@example.com", role_set([ADMIN]))));

        let err = set_roles(
            admin(),
            State(state.clone()),
            Path("u1@example.com".to_string()),
            Json(SetRolesRequest { roles: vec!["ROOT".to_string()] }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = set_roles(
            admin(),
            State(state.clone()),
            Path("u1@example.com".to_string()),
            Json(SetRolesRequest { roles: vec![] }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let Json(view) = set_roles(
            admin(),
            State(state),
            Path("u1@example.com".to_string()),
            Json(SetRolesRequest {
                roles: vec![USER.to_string(), ADMIN.to_string()],
            }),
        )
        .await
        .unwrap();
        assert_eq!(view.roles, role_set([USER, ADMIN]));
    }

    #[tokio::test]
    async fn denial_precedes_existence_check() {
        let state = state();
        let stranger = Principal::new("u1@example.com", role_set([USER]));

        // Target does not exist, but a non-owner still sees 403 rather than 404.
        let err = delete_user(
            CurrentPrincipal(Some(stranger)),
            State(state.clone()),
            Path("ghost@example.com".to_string()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let admin = Principal::new("admin@example.com", role_set([ADMIN]));
        let err = delete_user(
            CurrentPrincipal(Some(admin)),
            State(state),
            Path("ghost@example.com".to_string()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn owner_updates_own_profile() {
        let state = state();
        seed(&state, "u1@example.com", role_set([USER])).await;
        let owner = Principal::new("u1@example.com", role_set([USER]));

        let Json(view) = update_user(
            CurrentPrincipal(Some(owner)),
            State(state.clone()),
            Path("u1@example.com".to_string()),
            Json(UpdateUserRequest {
                full_name: " New Name ".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(view.full_name, "New Name");

        let other = Principal::new("u2@example.com", role_set([USER]));
        let err = update_user(
            CurrentPrincipal(Some(other)),
            State(state),
            Path("u1@example.com".to_string()),
            Json(UpdateUserRequest {
                full_name: "Hijacked".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }
}
