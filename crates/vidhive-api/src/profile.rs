//! Social aggregation: counts and viewer-relative flags derived from the
//! relation store. Everything here is computed fresh per read — the toggle
//! engine is the single source of truth and nothing is cached.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use vidhive_types::api::{SubscriberCountResponse, TargetListResponse, WatchHistoryResponse};
use vidhive_types::models::{ChannelProfile, Identity, TargetKind};

use crate::credentials::parse_id;
use crate::error::{ApiError, Result, ok};
use crate::relations::exists;
use crate::session::MaybeViewer;
use crate::{AppState, AppStateInner};

// -- Services --

pub fn channel_profile(
    state: &AppStateInner,
    channel_username: &str,
    viewer: Option<&Identity>,
) -> Result<ChannelProfile> {
    let username = channel_username.trim().to_lowercase();
    let row = state
        .db
        .get_user_by_username(&username)
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::NotFound(format!("channel {username} does not exist")))?;

    let channel_id = parse_id(&row.id)?;

    let subscriber_count = state
        .db
        .count_relations_to(&row.id, TargetKind::Channel.as_str())
        .map_err(ApiError::Internal)?;
    let subscribed_to_count = state
        .db
        .count_relations_from(&row.id, TargetKind::Channel.as_str())
        .map_err(ApiError::Internal)?;

    let is_subscribed = match viewer {
        Some(viewer) => exists(state, &viewer.id, &channel_id, TargetKind::Channel)?,
        None => false,
    };

    Ok(ChannelProfile {
        id: channel_id,
        username: row.username,
        full_name: row.full_name,
        avatar: row.avatar,
        cover_image: row.cover_image,
        subscriber_count,
        subscribed_to_count,
        is_subscribed,
    })
}

/// Targets of `kind` the user has a relation with, newest first.
pub fn liked_targets(state: &AppStateInner, user_id: &Uuid, kind: TargetKind) -> Result<Vec<Uuid>> {
    let targets = state
        .db
        .relation_targets(&user_id.to_string(), kind.as_str())
        .map_err(ApiError::Internal)?;
    targets.iter().map(|id| parse_id(id)).collect()
}

pub fn subscriber_count(state: &AppStateInner, channel_id: &Uuid) -> Result<u64> {
    state
        .db
        .count_relations_to(&channel_id.to_string(), TargetKind::Channel.as_str())
        .map_err(ApiError::Internal)
}

/// Channels the user subscribes to, newest first.
pub fn subscribed_channels(state: &AppStateInner, user_id: &Uuid) -> Result<Vec<Uuid>> {
    liked_targets(state, user_id, TargetKind::Channel)
}

pub fn record_watch(state: &AppStateInner, user_id: &Uuid, video_id: &Uuid) -> Result<()> {
    state
        .db
        .record_watch(&user_id.to_string(), &video_id.to_string())
        .map_err(ApiError::Internal)
}

pub fn watch_history(state: &AppStateInner, user_id: &Uuid) -> Result<Vec<Uuid>> {
    let videos = state
        .db
        .watch_history(&user_id.to_string())
        .map_err(ApiError::Internal)?;
    videos.iter().map(|id| parse_id(id)).collect()
}

// -- Handlers --

pub async fn get_channel(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(MaybeViewer(viewer)): Extension<MaybeViewer>,
) -> Result<impl IntoResponse> {
    let profile = channel_profile(&state, &username, viewer.as_ref())?;
    Ok(ok(StatusCode::OK, profile, "channel profile fetched"))
}

pub async fn get_subscriber_count(
    State(state): State<AppState>,
    Path(channel_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let count = subscriber_count(&state, &channel_id)?;
    Ok(ok(
        StatusCode::OK,
        SubscriberCountResponse {
            subscriber_count: count,
        },
        "subscribers fetched successfully",
    ))
}

pub async fn get_subscribed_channels(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse> {
    let targets = subscribed_channels(&state, &identity.id)?;
    Ok(ok(
        StatusCode::OK,
        TargetListResponse { targets },
        "subscribed channels fetched",
    ))
}

pub async fn get_watch_history(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse> {
    let videos = watch_history(&state, &identity.id)?;
    Ok(ok(
        StatusCode::OK,
        WatchHistoryResponse { videos },
        "watch history fetched",
    ))
}

pub async fn add_watch_history(
    State(state): State<AppState>,
    Path(video_id): Path<Uuid>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse> {
    record_watch(&state, &identity.id, &video_id)?;
    Ok(ok(StatusCode::OK, (), "watch recorded"))
}
