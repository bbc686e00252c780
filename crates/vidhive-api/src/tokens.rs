//! Token issuance. Access and refresh tokens use distinct secrets and
//! distinct algorithms so possession of one can never forge the other.

use anyhow::Context;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use vidhive_db::models::UserRow;
use vidhive_types::api::{AccessClaims, RefreshClaims, TokenPair};

use crate::error::{ApiError, Result};

const ACCESS_ALG: Algorithm = Algorithm::HS256;
const REFRESH_ALG: Algorithm = Algorithm::HS384;

pub struct TokenKeys {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenKeys {
    pub fn new(access_secret: &str, refresh_secret: &str) -> Self {
        Self::with_ttls(
            access_secret,
            refresh_secret,
            Duration::minutes(15),
            Duration::days(7),
        )
    }

    pub fn with_ttls(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Mints an access/refresh pair for the user. The caller is responsible
    /// for persisting the refresh value on the user record — one active
    /// refresh token per user.
    pub fn issue(&self, user: &UserRow) -> Result<TokenPair> {
        let user_id: Uuid = user
            .id
            .parse()
            .context("stored user id is not a uuid")
            .map_err(ApiError::Internal)?;

        let now = Utc::now();
        let iat = now.timestamp() as usize;

        let access_claims = AccessClaims {
            sub: user_id,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            iat,
            exp: (now + self.access_ttl).timestamp() as usize,
        };
        let access_token = encode(
            &Header::new(ACCESS_ALG),
            &access_claims,
            &self.access_encoding,
        )
        .context("failed to sign access token")
        .map_err(ApiError::Internal)?;

        let refresh_claims = RefreshClaims {
            sub: user_id,
            jti: Uuid::new_v4(),
            iat,
            exp: (now + self.refresh_ttl).timestamp() as usize,
        };
        let refresh_token = encode(
            &Header::new(REFRESH_ALG),
            &refresh_claims,
            &self.refresh_encoding,
        )
        .context("failed to sign refresh token")
        .map_err(ApiError::Internal)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    pub fn decode_access(&self, token: &str) -> Result<AccessClaims> {
        decode::<AccessClaims>(token, &self.access_decoding, &Validation::new(ACCESS_ALG))
            .map(|data| data.claims)
            .map_err(|_| ApiError::InvalidToken)
    }

    pub fn decode_refresh(&self, token: &str) -> Result<RefreshClaims> {
        decode::<RefreshClaims>(token, &self.refresh_decoding, &Validation::new(REFRESH_ALG))
            .map(|data| data.claims)
            .map_err(|_| ApiError::InvalidToken)
    }
}
