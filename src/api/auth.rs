// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration, login and logout.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    api::users::UserView,
    auth::{
        cookie::{clear_cookie, token_cookie},
        roles::default_roles,
    },
    error::ApiError,
    state::AppState,
    store::normalize_identity,
};

/// Shortest secret accepted at registration, in characters.
pub const MIN_SECRET_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub identity_key: String,
    #[serde(default)]
    pub full_name: String,
    pub secret: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub identity_key: String,
    pub secret: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub identity_key: String,
    pub expires_at: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

fn validate_registration(identity_key: &str, secret: &str) -> Result<(), ApiError> {
    if identity_key.is_empty() {
        return Err(ApiError::bad_request("identity_key is required"));
    }
    if !identity_key.contains('@') {
        return Err(ApiError::bad_request("identity_key must be an email address"));
    }
    if secret.chars().count() < MIN_SECRET_LEN {
        return Err(ApiError::bad_request(format!(
            "secret must be at least {MIN_SECRET_LEN} characters"
        )));
    }
    Ok(())
}

/// POST /v1/api/auth/register
///
/// New accounts always start with the `USER` role.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserView>), ApiError> {
    let identity_key = normalize_identity(&request.identity_key);
    validate_registration(&identity_key, &request.secret)?;

    let secret = state.verifier.hash_blocking(request.secret).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to hash secret");
        ApiError::internal("Internal server error")
    })?;

    let record = state
        .store
        .register(&identity_key, request.full_name.trim(), secret, default_roles())
        .await?;

    tracing::info!(identity = %record.identity_key, "User registered");
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// POST /v1/api/auth/login
///
/// On success the token is delivered only through `Set-Cookie`.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let token = match state
        .login
        .login(&request.identity_key, &request.secret, Utc::now())
        .await
    {
        Ok(token) => token,
        Err(e) => {
            tracing::info!(error = %e, "Login rejected");
            return Err(e.into());
        }
    };

    let cookie = token_cookie(
        &state.cookie_name,
        token.as_str(),
        state.codec.ttl().num_seconds(),
    )
    .map_err(|e| {
        tracing::error!(error = %e, "Token is not a valid cookie value");
        ApiError::internal("Internal server error")
    })?;

    tracing::info!(identity = %token.subject(), "User logged in");
    Ok((
        [(SET_COOKIE, cookie)],
        Json(LoginResponse {
            identity_key: token.subject().to_string(),
            expires_at: token.expires_at(),
        }),
    ))
}

/// POST /v1/api/auth/logout
///
/// Clears the client's cookie. There is no server-side session to revoke, so
/// a token copied before logout stays valid until it expires.
pub async fn logout(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let cookie = clear_cookie(&state.cookie_name).map_err(|e| {
        tracing::error!(error = %e, "Cookie name is not a valid header value");
        ApiError::internal("Internal server error")
    })?;

    Ok((
        [(SET_COOKIE, cookie)],
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    ))
}
