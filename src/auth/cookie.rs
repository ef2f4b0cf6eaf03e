// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token transport over a single named cookie.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};

/// Default cookie name carrying the token.
pub const DEFAULT_COOKIE_NAME: &str = "JWT_TOKEN";

/// Value of cookie `name` from the request headers, if present and non-empty.
///
/// Browsers may split cookies across several `Cookie` headers, so all of them
/// are searched. The first match wins.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value delivering `token` for `max_age_secs` seconds.
pub fn token_cookie(
    name: &str,
    token: &str,
    max_age_secs: i64,
) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{name}={token}; HttpOnly; Path=/; Max-Age={max_age_secs}"
    ))
}

/// `Set-Cookie` value instructing the client to discard the token.
pub fn clear_cookie(name: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!("{name}=; HttpOnly; Path=/; Max-Age=0"))
}

/// Cookie names are RFC 6265 tokens; this is the subset accepted in config.
pub fn is_valid_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}
