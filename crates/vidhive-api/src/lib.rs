pub mod credentials;
pub mod error;
pub mod profile;
pub mod relations;
pub mod rotation;
pub mod session;
pub mod tokens;

use std::sync::Arc;

use vidhive_db::Database;

use crate::tokens::TokenKeys;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenKeys,
}
