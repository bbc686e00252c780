use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use vidhive_api::tokens::TokenKeys;
use vidhive_api::{AppState, AppStateInner, credentials, profile, relations, rotation, session};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vidhive=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let access_secret =
        std::env::var("VIDHIVE_ACCESS_SECRET").unwrap_or_else(|_| "dev-access-change-me".into());
    let refresh_secret =
        std::env::var("VIDHIVE_REFRESH_SECRET").unwrap_or_else(|_| "dev-refresh-change-me".into());
    let db_path = std::env::var("VIDHIVE_DB_PATH").unwrap_or_else(|_| "vidhive.db".into());
    let host = std::env::var("VIDHIVE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("VIDHIVE_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database
    let db = vidhive_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        db,
        tokens: TokenKeys::new(&access_secret, &refresh_secret),
    });

    // Routes
    let public_routes = Router::new()
        .route("/auth/register", post(credentials::register))
        .route("/auth/login", post(credentials::login))
        .route("/auth/refresh", post(rotation::refresh))
        .with_state(state.clone());

    // Channel profiles are readable anonymously; the viewer identity only
    // feeds the is_subscribed flag.
    let channel_routes = Router::new()
        .route("/channels/{username}", get(profile::get_channel))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::optional_auth,
        ))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/auth/logout", post(rotation::logout))
        .route("/users/me", get(credentials::me))
        .route(
            "/users/change-password",
            post(credentials::change_password_handler),
        )
        .route("/users/me/history", get(profile::get_watch_history))
        .route(
            "/users/me/history/{video_id}",
            post(profile::add_watch_history),
        )
        .route(
            "/subscriptions/{channel_id}/toggle",
            post(relations::toggle_subscription),
        )
        .route(
            "/subscriptions/{channel_id}/subscribers",
            get(profile::get_subscriber_count),
        )
        .route(
            "/subscriptions/me/channels",
            get(profile::get_subscribed_channels),
        )
        .route(
            "/likes/{kind}/{target_id}/toggle",
            post(relations::toggle_like),
        )
        .route("/likes/{kind}", get(relations::liked_targets_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_auth,
        ))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(channel_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("vidhive server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
