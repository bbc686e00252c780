//! Toggle-relation engine: one idempotent on/off edge per
//! (subject, target, kind) tuple.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use vidhive_types::api::{TargetListResponse, ToggleResponse};
use vidhive_types::models::{Identity, TargetKind};

use crate::error::{ApiError, Result, ok};
use crate::{AppState, AppStateInner};

/// Flips the relation and returns the new active state. The store performs
/// the conditional write; a racing toggler that loses the insert still gets
/// the correct "active" answer.
pub fn toggle(
    state: &AppStateInner,
    subject: &Uuid,
    target: &Uuid,
    kind: TargetKind,
) -> Result<bool> {
    let relation_id = Uuid::new_v4();
    state
        .db
        .toggle_relation(
            &relation_id.to_string(),
            &subject.to_string(),
            &target.to_string(),
            kind.as_str(),
        )
        .map_err(ApiError::Internal)
}

/// Pure read, no side effect.
pub fn exists(
    state: &AppStateInner,
    subject: &Uuid,
    target: &Uuid,
    kind: TargetKind,
) -> Result<bool> {
    state
        .db
        .relation_exists(&subject.to_string(), &target.to_string(), kind.as_str())
        .map_err(ApiError::Internal)
}

// -- Handlers --

pub async fn toggle_subscription(
    State(state): State<AppState>,
    Path(channel_id): Path<Uuid>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse> {
    let active = toggle(&state, &identity.id, &channel_id, TargetKind::Channel)?;
    let message = if active {
        "channel subscribed successfully"
    } else {
        "unsubscribed from the channel successfully"
    };
    Ok(ok(StatusCode::OK, ToggleResponse { active }, message))
}

pub async fn toggle_like(
    State(state): State<AppState>,
    Path((kind, target_id)): Path<(String, Uuid)>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse> {
    let kind: TargetKind = kind.parse()?;
    if kind == TargetKind::Channel {
        // Channels are subscribed to, not liked.
        return Err(ApiError::Validation("cannot like a channel".into()));
    }

    let active = toggle(&state, &identity.id, &target_id, kind)?;
    let message = if active { "liked" } else { "unliked" };
    Ok(ok(StatusCode::OK, ToggleResponse { active }, message))
}

pub async fn liked_targets_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse> {
    let kind: TargetKind = kind.parse()?;
    if kind == TargetKind::Channel {
        return Err(ApiError::Validation(
            "use the subscriptions endpoints for channels".into(),
        ));
    }

    let targets = crate::profile::liked_targets(&state, &identity.id, kind)?;
    Ok(ok(
        StatusCode::OK,
        TargetListResponse { targets },
        "liked targets fetched",
    ))
}
