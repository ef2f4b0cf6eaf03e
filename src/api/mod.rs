// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{auth::authenticate, state::AppState};

pub mod auth;
pub mod health;
pub mod users;

pub fn router(state: AppState) -> Router {
    let auth_state = state.auth_state();

    let api_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/users", get(users::list_users))
        .route("/users/me", get(users::me))
        .route(
            "/users/{identity}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/{identity}/roles", put(users::set_roles));

    Router::new()
        .nest("/v1/api", api_routes)
        .route("/health", get(health::liveness))
        .layer(from_fn_with_state(auth_state, authenticate))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
