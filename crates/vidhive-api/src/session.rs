//! Session validation: resolving a presented access token to a live user
//! identity, plus the middleware and cookie plumbing around it.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use vidhive_types::api::TokenPair;
use vidhive_types::models::Identity;

use crate::error::{ApiError, Result};
use crate::{AppState, AppStateInner};

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Viewer identity for routes that work with or without authentication
/// (channel profiles need the viewer only for the is_subscribed flag).
#[derive(Debug, Clone)]
pub struct MaybeViewer(pub Option<Identity>);

/// Resolves a presented access token to an identity. The user is re-fetched
/// from the store — a deleted account is rejected even with a still-valid
/// signature.
pub fn authenticate(state: &AppStateInner, token: Option<&str>) -> Result<Identity> {
    let token = token.ok_or(ApiError::Unauthorized)?;
    let claims = state.tokens.decode_access(token)?;

    let row = state
        .db
        .get_user_by_id(&claims.sub.to_string())
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::Unauthorized)?;

    Ok(Identity {
        id: claims.sub,
        username: row.username,
        email: row.email,
        full_name: row.full_name,
    })
}

/// Bearer header first, `access_token` cookie as the fallback.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok())
        && let Some(token) = value.strip_prefix("Bearer ")
    {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(ACCESS_COOKIE)
        .map(|c| c.value().to_string())
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let token = token_from_headers(req.headers());
    let identity = authenticate(&state, token.as_deref())?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Like `require_auth` but never rejects: a missing or bad token just means
/// an anonymous viewer.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = token_from_headers(req.headers());
    let viewer = authenticate(&state, token.as_deref()).ok();
    req.extensions_mut().insert(MaybeViewer(viewer));
    next.run(req).await
}

fn secure_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Sets both tokens as HttpOnly SameSite cookies; the JSON body carries the
/// same pair for bearer clients.
pub fn token_cookies(jar: CookieJar, pair: &TokenPair) -> CookieJar {
    jar.add(secure_cookie(ACCESS_COOKIE, pair.access_token.clone()))
        .add(secure_cookie(REFRESH_COOKIE, pair.refresh_token.clone()))
}

pub fn clear_token_cookies(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(ACCESS_COOKIE).path("/").build())
        .remove(Cookie::build(REFRESH_COOKIE).path("/").build())
}
