// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for authenticated routes.
//!
//! Validates the `x-auth-token` header against the session store and
//! hands the handler the authenticated user.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use helpdesk_api::AuthenticationService;
use helpdesk_domain::User;

use crate::AppState;

/// Name of the header carrying the session token.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Extractor for the authenticated user behind a session token.
///
/// # Errors
///
/// Rejects with HTTP 401 when the header is missing or malformed, the
/// session is unknown or expired, or the account is no longer active.
pub struct SessionUser(pub User);

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token: &str = parts
            .headers
            .get(AUTH_TOKEN_HEADER)
            .ok_or_else(|| {
                debug!("Missing {AUTH_TOKEN_HEADER} header");
                SessionError::MissingToken
            })?
            .to_str()
            .map_err(|_| {
                warn!("Invalid {AUTH_TOKEN_HEADER} header encoding");
                SessionError::InvalidToken
            })?;

        let mut persistence = state.persistence.lock().await;
        let user: User =
            AuthenticationService::validate_session(&mut persistence, token).map_err(|e| {
                warn!(error = %e, "Session validation failed");
                SessionError::InvalidSession(e.to_string())
            })?;
        drop(persistence);

        debug!(username = %user.username, "Session validated");
        Ok(Self(user))
    }
}

/// Session extraction errors, rendered as HTTP 401 responses.
#[derive(Debug)]
pub enum SessionError {
    /// The token header is missing.
    MissingToken,
    /// The token header is not valid ASCII.
    InvalidToken,
    /// Session validation failed.
    InvalidSession(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let message: String = match self {
            Self::MissingToken => format!("Missing {AUTH_TOKEN_HEADER} header"),
            Self::InvalidToken => format!("Invalid {AUTH_TOKEN_HEADER} header"),
            Self::InvalidSession(reason) => reason,
        };
        (StatusCode::UNAUTHORIZED, message).into_response()
    }
}
