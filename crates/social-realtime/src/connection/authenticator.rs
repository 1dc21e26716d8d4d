//! Socket authentication: validates the JWT offered at upgrade time.

use std::sync::Arc;

use social_auth::jwt::JwtDecoder;
use social_core::error::AppError;
use social_core::types::principal::Principal;

/// Authenticates socket upgrades using JWT access tokens.
#[derive(Clone)]
pub struct WsAuthenticator {
    decoder: Arc<JwtDecoder>,
}

impl std::fmt::Debug for WsAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsAuthenticator").finish()
    }
}

impl WsAuthenticator {
    /// Creates a new socket authenticator.
    pub fn new(decoder: Arc<JwtDecoder>) -> Self {
        Self { decoder }
    }

    /// Resolves the principal from the first token candidate that is
    /// present, in priority order (query parameter, then bearer header).
    pub fn authenticate<'a>(
        &self,
        candidates: impl IntoIterator<Item = Option<&'a str>>,
    ) -> Result<Principal, AppError> {
        let token = candidates
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

        self.decoder.authenticate(token)
    }
}
