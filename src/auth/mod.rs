// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Stateless cookie-token authentication and explicit authorization guards
//! for the FitTrack API.
//!
//! ## Auth Flow
//!
//! 1. Client posts `{identity_key, secret}` to `/v1/api/auth/login`
//! 2. Server verifies the Argon2 hash and issues an HS256 token
//! 3. Token travels back in the `JWT_TOKEN` cookie (HttpOnly, Path=/)
//! 4. On every request the middleware:
//!    - verifies signature and expiry
//!    - reads the subject's current roles from the user directory
//!    - attaches a [`Principal`] to the request, or leaves it anonymous
//! 5. Handlers call [`require_role`] / [`require_owner_or_role`] before acting
//!
//! ## Security
//!
//! - No server-side session state; logout only clears the cookie
//! - MAC comparison and password verification are constant-time
//! - Invalid tokens degrade to anonymous, they are never reported to clients
//! - Authorization uses freshly read roles, not the roles in the token

pub mod cookie;
pub mod error;
pub mod extractor;
pub mod login;
pub mod middleware;
pub mod password;
pub mod policy;
pub mod principal;
pub mod roles;
pub mod token;

pub use error::{AuthenticationError, AuthzError, TokenError};
pub use extractor::CurrentPrincipal;
pub use login::LoginService;
pub use middleware::{authenticate, AuthState};
pub use password::{CredentialVerifier, PasswordHash};
pub use policy::{require_owner_or_role, require_role, OwnershipFact};
pub use principal::Principal;
pub use token::{Claims, SigningKey, Token, TokenCodec};
