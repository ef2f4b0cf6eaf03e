// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.
//!
//! Three families, each with its own propagation rule:
//!
//! - [`TokenError`] never leaves the authentication layer; every variant
//!   collapses into an anonymous request.
//! - [`AuthenticationError`] is returned to the login caller. The credential
//!   variant is deliberately non-specific.
//! - [`AuthzError`] is returned by the policy checks and mapped to `403`.

use axum::http::StatusCode;

use crate::store::DirectoryError;

/// Reasons a raw token failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The token could not be parsed into header, claims and signature.
    #[error("token is malformed")]
    Malformed,
    /// The signature does not authenticate the header and claims.
    #[error("token signature is invalid")]
    BadSignature,
    /// The token is past its expiry.
    #[error("token has expired")]
    Expired,
}

impl TokenError {
    /// Short machine-readable label, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed",
            TokenError::BadSignature => "bad_signature",
            TokenError::Expired => "expired",
        }
    }
}

/// Login failures.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    /// Unknown identity or wrong secret. The two cases are indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// The user directory could not be consulted.
    #[error("user directory unavailable: {0}")]
    Directory(#[from] DirectoryError),
}

/// Authorization failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// The caller is anonymous, lacks the role, or does not own the resource.
    #[error("Access denied")]
    Forbidden,
}

impl AuthenticationError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthenticationError::InvalidCredentials => "invalid_credentials",
            AuthenticationError::Directory(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthenticationError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthenticationError::Directory(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl AuthzError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthzError::Forbidden => "forbidden",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthzError::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}
