//! Credential store: registration, password verification, password change.
//! Hashing happens exactly once, here, before the single insert/update —
//! the store never sees plaintext.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::cookie::CookieJar;
use chrono::NaiveDateTime;
use uuid::Uuid;

use vidhive_db::models::UserRow;
use vidhive_types::api::{ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest};
use vidhive_types::models::{Identity, UserPublic};

use crate::error::{ApiError, Result, ok};
use crate::session::token_cookies;
use crate::{AppState, AppStateInner};

/// Structurally valid Argon2id PHC string that matches no password. Verified
/// against when the login identifier is unknown, so the missing-user and
/// wrong-password paths cost the same.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$AAAAAAAAAAAAAAAAAAAAAA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

// -- Services --

pub fn register_user(state: &AppStateInner, req: &RegisterRequest) -> Result<UserPublic> {
    let username = req.username.trim().to_lowercase();
    let email = req.email.trim().to_lowercase();
    let full_name = req.full_name.trim().to_string();
    let avatar = req.avatar.trim().to_string();
    let cover_image = req
        .cover_image
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    if username.is_empty()
        || email.is_empty()
        || full_name.is_empty()
        || req.password.trim().is_empty()
        || avatar.is_empty()
    {
        return Err(ApiError::Validation("all fields are required".into()));
    }

    // The password is hashed exactly as supplied; trimming it here would
    // make verification of the very same string fail later.
    let password_hash = hash_password(&req.password)?;
    let id = Uuid::new_v4();

    let created = state
        .db
        .create_user(
            &id.to_string(),
            &username,
            &email,
            &full_name,
            &avatar,
            cover_image.as_deref(),
            &password_hash,
        )
        .map_err(ApiError::Internal)?;

    if !created {
        return Err(ApiError::DuplicateIdentity);
    }

    let row = state
        .db
        .get_user_by_id(&id.to_string())
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("user missing after insert")))?;

    user_public(&row)
}

/// Verifies an identifier/password pair. Unknown identifier and wrong
/// password are indistinguishable to the caller.
pub fn verify_credentials(state: &AppStateInner, identifier: &str, password: &str) -> Result<UserRow> {
    let identifier = identifier.trim().to_lowercase();
    if identifier.is_empty() || password.is_empty() {
        return Err(ApiError::Validation("username or email is required".into()));
    }

    let row = state
        .db
        .get_user_by_identifier(&identifier)
        .map_err(ApiError::Internal)?;

    match row {
        Some(row) => {
            verify_password(password, &row.password)?;
            Ok(row)
        }
        None => {
            // Burn a verification anyway; the result is always a mismatch.
            let _ = verify_password(password, DUMMY_HASH);
            Err(ApiError::InvalidCredentials)
        }
    }
}

pub fn change_password(
    state: &AppStateInner,
    user_id: &Uuid,
    current: &str,
    new: &str,
) -> Result<()> {
    if new.trim().is_empty() {
        return Err(ApiError::Validation("new password is required".into()));
    }

    let row = state
        .db
        .get_user_by_id(&user_id.to_string())
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::Unauthorized)?;

    verify_password(current, &row.password)?;

    let password_hash = hash_password(new)?;
    state
        .db
        .update_password(&row.id, &password_hash)
        .map_err(ApiError::Internal)?;
    Ok(())
}

pub fn current_user(state: &AppStateInner, user_id: &Uuid) -> Result<UserPublic> {
    let row = state
        .db
        .get_user_by_id(&user_id.to_string())
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::Unauthorized)?;
    user_public(&row)
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {e}")))
}

fn verify_password(password: &str, stored_hash: &str) -> Result<()> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("stored hash is malformed: {e}")))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| ApiError::InvalidCredentials)
}

/// Projects a row to its public shape, dropping the password hash and
/// refresh token.
pub(crate) fn user_public(row: &UserRow) -> Result<UserPublic> {
    Ok(UserPublic {
        id: parse_id(&row.id)?,
        username: row.username.clone(),
        email: row.email.clone(),
        full_name: row.full_name.clone(),
        avatar: row.avatar.clone(),
        cover_image: row.cover_image.clone(),
        created_at: parse_timestamp(&row.created_at)?,
    })
}

pub(crate) fn parse_id(id: &str) -> Result<Uuid> {
    id.parse()
        .map_err(|_| ApiError::Internal(anyhow::anyhow!("stored id is not a uuid: {id}")))
}

/// SQLite's datetime('now') format.
fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|_| ApiError::Internal(anyhow::anyhow!("unparseable timestamp: {s}")))
}

// -- Handlers --

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let user = register_user(&state, &req)?;
    Ok(ok(
        StatusCode::CREATED,
        user,
        "user registered successfully",
    ))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let row = verify_credentials(&state, &req.identifier, &req.password)?;
    let pair = state.tokens.issue(&row)?;

    // Single active refresh token per user: issuing replaces any prior one.
    state
        .db
        .set_refresh_token(&row.id, Some(&pair.refresh_token))
        .map_err(ApiError::Internal)?;

    let user = user_public(&row)?;
    let jar = token_cookies(jar, &pair);

    Ok((
        jar,
        ok(
            StatusCode::OK,
            LoginResponse {
                user,
                access_token: pair.access_token,
                refresh_token: pair.refresh_token,
            },
            "user logged in successfully",
        ),
    ))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse> {
    let user = current_user(&state, &identity.id)?;
    Ok(ok(StatusCode::OK, user, "current user fetched"))
}

pub async fn change_password_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse> {
    change_password(
        &state,
        &identity.id,
        &req.current_password,
        &req.new_password,
    )?;
    Ok(ok(StatusCode::OK, (), "password changed successfully"))
}
