// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session authentication and role gates.
//!
//! Only active accounts may authenticate. Credential failures are
//! reported uniformly so usernames cannot be enumerated through the
//! login endpoint.

use time::{Duration, OffsetDateTime};
use tracing::{debug, info};

use helpdesk_domain::{Role, User, UserStatus, normalize_username};
use helpdesk_persistence::{Persistence, PersistenceError, SessionData};

use crate::error::AuthError;

/// Uniform message for unknown-user and wrong-password failures.
const BAD_CREDENTIALS: &str = "Invalid username or password";

/// Authorization gates for role-restricted operations.
///
/// The auth layer supplies the authenticated user; these gates trust
/// that identity and check only the role.
pub struct AuthorizationService;

impl AuthorizationService {
    fn require_admin(user: &User, action: &str) -> Result<(), AuthError> {
        match user.role {
            Role::Admin => Ok(()),
            _ => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("admin"),
            }),
        }
    }

    fn require_manager_or_admin(user: &User, action: &str) -> Result<(), AuthError> {
        match user.role {
            Role::Admin | Role::Manager => Ok(()),
            _ => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("manager"),
            }),
        }
    }

    /// Checks that the user may create, update, or delete accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is not an admin.
    pub fn authorize_manage_users(user: &User) -> Result<(), AuthError> {
        Self::require_admin(user, "manage_users")
    }

    /// Checks that the user may approve a pending account.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is not an admin.
    pub fn authorize_approve_user(user: &User) -> Result<(), AuthError> {
        Self::require_admin(user, "approve_user")
    }

    /// Checks that the user may deactivate an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is not an admin.
    pub fn authorize_deactivate_user(user: &User) -> Result<(), AuthError> {
        Self::require_admin(user, "deactivate_user")
    }

    /// Checks that the user may create or update departments.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is not an admin.
    pub fn authorize_manage_departments(user: &User) -> Result<(), AuthError> {
        Self::require_admin(user, "manage_departments")
    }

    /// Checks that the user may delete a department.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is not an admin.
    pub fn authorize_delete_department(user: &User) -> Result<(), AuthError> {
        Self::require_admin(user, "delete_department")
    }

    /// Checks that the user may create, update, or delete topics.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is not an admin or manager.
    pub fn authorize_manage_topics(user: &User) -> Result<(), AuthError> {
        Self::require_manager_or_admin(user, "manage_topics")
    }

    /// Checks that the user may approve a ticket escalation.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is not an admin or manager.
    pub fn authorize_approve_escalation(user: &User) -> Result<(), AuthError> {
        Self::require_manager_or_admin(user, "approve_escalation")
    }
}

/// Session-based authentication service.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Session lifetime from creation.
    const SESSION_EXPIRATION: Duration = Duration::hours(24);

    /// Authenticates a user and creates a session.
    ///
    /// Returns the session token and the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns a uniform error for bad credentials, and an error when
    /// the account is not active.
    pub fn login(
        persistence: &mut Persistence,
        username: &str,
        password: &str,
    ) -> Result<(String, User), AuthError> {
        let username: String = normalize_username(username);
        debug!(username, "Login attempt");

        let user: User = persistence
            .get_user_by_username(&username)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from(BAD_CREDENTIALS),
            })?;

        if user.status != UserStatus::Active {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Account is not active"),
            });
        }

        let password_matches: bool =
            bcrypt::verify(password, &user.password_hash).map_err(|e| {
                AuthError::AuthenticationFailed {
                    reason: format!("Failed to verify password: {e}"),
                }
            })?;
        if !password_matches {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from(BAD_CREDENTIALS),
            });
        }

        let session_token: String = Self::generate_session_token();
        let expires_at: OffsetDateTime = OffsetDateTime::now_utc() + Self::SESSION_EXPIRATION;
        let expires_at_str: String = expires_at
            .format(&time::format_description::well_known::Iso8601::DEFAULT)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to format expiration time: {e}"),
            })?;

        persistence
            .create_session(&session_token, user.user_id.unwrap_or_default(), &expires_at_str)
            .map_err(Self::map_persistence_error)?;

        info!(username, "Login successful");
        Ok((session_token, user))
    }

    /// Validates a session token and returns the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown or expired, or the
    /// account is no longer active.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
    ) -> Result<User, AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let expires_at: OffsetDateTime = OffsetDateTime::parse(
            &session.expires_at,
            &time::format_description::well_known::Iso8601::DEFAULT,
        )
        .map_err(|e| AuthError::AuthenticationFailed {
            reason: format!("Failed to parse session expiration: {e}"),
        })?;

        if OffsetDateTime::now_utc() > expires_at {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let user: User = persistence
            .get_user_by_id(session.user_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("User not found"),
            })?;

        if user.status != UserStatus::Active {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Account is not active"),
            });
        }

        persistence
            .update_session_activity(session.session_id)
            .map_err(Self::map_persistence_error)?;

        Ok(user)
    }

    /// Logs out by deleting the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session delete fails.
    pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(Self::map_persistence_error)
    }

    /// Generates a random session token.
    fn generate_session_token() -> String {
        let token: u128 = rand::random();
        format!("{token:032x}")
    }

    fn map_persistence_error(err: PersistenceError) -> AuthError {
        match err {
            PersistenceError::SessionNotFound(msg) => AuthError::AuthenticationFailed {
                reason: msg,
            },
            _ => AuthError::AuthenticationFailed {
                reason: format!("Database error: {err}"),
            },
        }
    }
}
