use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::UserPublic;

// -- JWT Claims --

/// Access token claims. Canonical definition lives here so the REST
/// middleware and any future gateway validate the same shape. Claim names
/// are camelCased on the wire so tokens interoperate with other consumers
/// of the `{sub, username, email, fullName, exp}` schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    pub sub: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub iat: usize,
    pub exp: usize,
}

/// Refresh token claims carry the user id only, so rotating survives
/// profile changes. The jti makes every issued token distinct even when
/// two pairs are minted within the same second — rotation compares exact
/// token strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: Uuid,
    pub jti: Uuid,
    pub iat: usize,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub avatar: String,
    #[serde(default)]
    pub cover_image: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    /// Username or email, matched case-insensitively.
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserPublic,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RefreshRequest {
    /// Body fallback for clients that do not send the refresh cookie.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// -- Relations --

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub active: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberCountResponse {
    pub subscriber_count: u64,
}

#[derive(Debug, Serialize)]
pub struct TargetListResponse {
    pub targets: Vec<Uuid>,
}

// -- Watch history --

#[derive(Debug, Serialize)]
pub struct WatchHistoryResponse {
    pub videos: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChannelProfile;

    #[test]
    fn access_claims_serialize_to_the_interop_schema() {
        let claims = AccessClaims {
            sub: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            full_name: "Alice Example".into(),
            iat: 1,
            exp: 2,
        };

        let value = serde_json::to_value(&claims).unwrap();
        let obj = value.as_object().unwrap();
        for key in ["sub", "username", "email", "fullName", "iat", "exp"] {
            assert!(obj.contains_key(key), "missing claim {key}");
        }
        assert!(!obj.contains_key("full_name"));
        assert_eq!(obj.len(), 6);
    }

    #[test]
    fn channel_profile_serializes_camel_case() {
        let profile = ChannelProfile {
            id: Uuid::new_v4(),
            username: "bob".into(),
            full_name: "Bob Example".into(),
            avatar: "b.png".into(),
            cover_image: None,
            subscriber_count: 1,
            subscribed_to_count: 0,
            is_subscribed: true,
        };

        let value = serde_json::to_value(&profile).unwrap();
        let obj = value.as_object().unwrap();
        for key in ["fullName", "coverImage", "subscriberCount", "subscribedToCount", "isSubscribed"] {
            assert!(obj.contains_key(key), "missing camelCase key {key}");
        }
        assert!(!obj.contains_key("subscriber_count"));
    }
}
