//! Error taxonomy and the response envelope the boundary layer speaks.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("user with this username or email already exists")]
    DuplicateIdentity,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("authentication required")]
    Unauthorized,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("refresh token reuse detected, session revoked")]
    TokenReuseDetected,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicateIdentity => StatusCode::CONFLICT,
            ApiError::InvalidCredentials
            | ApiError::Unauthorized
            | ApiError::InvalidToken
            | ApiError::TokenReuseDetected => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<vidhive_types::models::UnknownTargetKind> for ApiError {
    fn from(err: vidhive_types::models::UnknownTargetKind) -> Self {
        ApiError::Validation(err.to_string())
    }
}

/// Response envelope: `{statusCode, data, message, success, errors}`.
/// Produced only at this boundary; core services deal in typed values.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    pub status_code: u16,
    pub data: Option<T>,
    pub message: String,
    pub success: bool,
    pub errors: Vec<String>,
}

/// Success envelope with an HTTP status.
pub fn ok<T: Serialize>(status: StatusCode, data: T, message: &str) -> Response {
    let body = ApiEnvelope {
        status_code: status.as_u16(),
        data: Some(data),
        message: message.to_string(),
        success: true,
        errors: Vec::new(),
    };
    (status, Json(body)).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal details are logged, never sent to the client.
        let message = match &self {
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ApiEnvelope::<()> {
            status_code: status.as_u16(),
            data: None,
            message: message.clone(),
            success: false,
            errors: vec![message],
        };
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
