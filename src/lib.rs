// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! FitTrack Server - Fitness Tracking REST Backend
//!
//! Stateless cookie-token authentication with role and ownership checks in
//! front of an account directory.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token issuance and verification, login, authorization guards
//! - `config` - Environment configuration
//! - `store` - User directory (in-memory)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;
pub mod store;
