use std::sync::Arc;

use vidhive_api::tokens::TokenKeys;
use vidhive_api::{AppState, AppStateInner, credentials};
use vidhive_db::Database;
use vidhive_types::api::RegisterRequest;
use vidhive_types::models::UserPublic;

pub const TEST_PASSWORD: &str = "correct horse battery";

/// App state over an in-memory database.
#[allow(dead_code)]
pub fn test_state() -> AppState {
    Arc::new(AppStateInner {
        db: Database::open_in_memory().expect("in-memory db"),
        tokens: TokenKeys::new("test-access-secret", "test-refresh-secret"),
    })
}

#[allow(dead_code)]
pub fn register_request(username: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.into(),
        email: format!("{username}@example.com"),
        full_name: format!("{username} Example"),
        password: TEST_PASSWORD.into(),
        avatar: "avatar.png".into(),
        cover_image: None,
    }
}

/// Registers a user with `TEST_PASSWORD` and a derived email.
#[allow(dead_code)]
pub fn register(state: &AppState, username: &str) -> UserPublic {
    credentials::register_user(state, &register_request(username)).expect("registration")
}

/// Full login flow: verify credentials, mint a pair, persist the refresh
/// token — what the login handler does.
#[allow(dead_code)]
pub fn login(state: &AppState, username: &str) -> vidhive_types::api::TokenPair {
    let row = credentials::verify_credentials(state, username, TEST_PASSWORD).expect("login");
    let pair = state.tokens.issue(&row).expect("token pair");
    state
        .db
        .set_refresh_token(&row.id, Some(&pair.refresh_token))
        .expect("persist refresh token");
    pair
}
