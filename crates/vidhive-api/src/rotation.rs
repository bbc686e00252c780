//! Refresh rotation: exchange a refresh token for a fresh pair, with
//! single-use enforcement. The stored-token compare-and-swap in the store
//! is the only serialization point; there is no read-then-write window
//! even across server processes.

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use vidhive_types::api::{RefreshRequest, TokenPair};
use vidhive_types::models::Identity;

use crate::error::{ApiError, Result, ok};
use crate::session::{REFRESH_COOKIE, clear_token_cookies, token_cookies};
use crate::{AppState, AppStateInner};

/// Rotates a presented refresh token.
///
/// A presented token that fails the swap no longer matches the stored value:
/// either it was already rotated (replay) or the session was revoked. Both
/// are treated as reuse — the stored token is cleared so the whole session
/// dies and the user must log in again.
pub fn rotate(state: &AppStateInner, presented: Option<&str>) -> Result<TokenPair> {
    let presented = presented.ok_or(ApiError::Unauthorized)?;
    let claims = state.tokens.decode_refresh(presented)?;

    let user = state
        .db
        .get_user_by_id(&claims.sub.to_string())
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::InvalidToken)?;

    let pair = state.tokens.issue(&user)?;

    let swapped = state
        .db
        .swap_refresh_token(&user.id, presented, &pair.refresh_token)
        .map_err(ApiError::Internal)?;

    if !swapped {
        tracing::warn!(user_id = %user.id, "refresh token reuse detected, revoking session");
        state
            .db
            .set_refresh_token(&user.id, None)
            .map_err(ApiError::Internal)?;
        return Err(ApiError::TokenReuseDetected);
    }

    Ok(pair)
}

/// Clears the stored refresh token. Idempotent; used by logout.
pub fn revoke(state: &AppStateInner, user_id: &Uuid) -> Result<()> {
    state
        .db
        .set_refresh_token(&user_id.to_string(), None)
        .map_err(ApiError::Internal)
}

// -- Handlers --

pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<impl IntoResponse> {
    // Cookie first, body fallback for non-cookie clients.
    let presented = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .or_else(|| body.and_then(|Json(req)| req.refresh_token));

    let pair = rotate(&state, presented.as_deref())?;
    let jar = token_cookies(jar, &pair);

    Ok((jar, ok(StatusCode::OK, pair, "access token refreshed")))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse> {
    revoke(&state, &identity.id)?;
    let jar = clear_token_cookies(jar);
    Ok((jar, ok(StatusCode::OK, (), "user logged out successfully")))
}
