//! Authentication extractors.
//!
//! `AuthUser` reads a bearer token from the `Authorization` header.
//! `WsAuth` additionally accepts `?token=` because browsers cannot set
//! headers on socket upgrades. Both run before the handler body, so an
//! unauthenticated upgrade is refused before any handshake.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};

use social_core::error::AppError;
use social_core::types::principal::Principal;

use crate::dto::request::WsTokenQuery;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller of an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl std::ops::Deref for AuthUser {
    type Target = Principal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .ok_or_else(|| AppError::unauthorized("Missing or malformed Authorization header"))?;

        let principal = state.jwt_decoder.authenticate(bearer.token())?;
        Ok(AuthUser(principal))
    }
}

/// Authenticated principal of a socket upgrade.
#[derive(Debug, Clone)]
pub struct WsAuth(pub Principal);

impl FromRequestParts<AppState> for WsAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let query = Query::<WsTokenQuery>::try_from_uri(&parts.uri)
            .map(|Query(q)| q)
            .unwrap_or_default();
        let bearer = parts.headers.typed_get::<Authorization<Bearer>>();

        let principal = state
            .ws_authenticator
            .authenticate([query.token.as_deref(), bearer.as_ref().map(|b| b.token())])
            .inspect_err(|e| tracing::debug!(error = %e, "Socket upgrade refused"))?;
        Ok(WsAuth(principal))
    }
}
