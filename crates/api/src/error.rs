// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The stable error taxonomy exposed by the API boundary.
//!
//! Lower layers raise their own typed errors (`DomainError`,
//! `CoreError`, `PersistenceError`); the translate functions in this
//! module map them into the taxonomy. Store-native failures never
//! cross the boundary untyped.

use helpdesk_core::CoreError;
use helpdesk_domain::DomainError;
use helpdesk_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed (bad credentials, invalid or expired
    /// session, inactive account). The reason is deliberately uniform
    /// for credential failures.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The authenticated user lacks the role the action requires.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(
                    f,
                    "Unauthorized: action '{action}' requires role '{required_role}'"
                )
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// Errors returned by API operations.
///
/// This is the complete classification; every operation failure is one
/// of these variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Malformed or out-of-range input, caught before any mutation.
    ValidationError {
        /// The field that failed validation.
        field: String,
        /// The validation failure message.
        message: String,
    },
    /// The registrant's birthday violates the age policy.
    AgeRestriction {
        /// The policy failure message.
        message: String,
    },
    /// A referenced entity (department, topic, user) does not exist.
    InvalidReference {
        /// The type of the missing referent.
        resource_type: String,
        /// The reference failure message.
        message: String,
    },
    /// A uniqueness violation or a delete blocked by dependents.
    Conflict {
        /// The conflict message.
        message: String,
    },
    /// The primary entity of the operation does not exist.
    NotFound {
        /// The type of the missing entity.
        resource_type: String,
        /// The lookup failure message.
        message: String,
    },
    /// An email verification token is wrong or already consumed.
    InvalidToken {
        /// The token failure message.
        message: String,
    },
    /// A lifecycle precondition does not hold.
    InvalidState {
        /// The precondition failure message.
        message: String,
    },
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The authenticated user lacks the role the action requires.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// An unclassified internal failure.
    Internal {
        /// The internal failure message.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ValidationError { field, message } => {
                write!(f, "Validation error on '{field}': {message}")
            }
            Self::AgeRestriction { message } => write!(f, "Age restriction: {message}"),
            Self::InvalidReference {
                resource_type,
                message,
            } => {
                write!(f, "Invalid {resource_type} reference: {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::NotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::InvalidToken { message } => write!(f, "Invalid token: {message}"),
            Self::InvalidState { message } => write!(f, "Invalid state: {message}"),
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(
                    f,
                    "Unauthorized: action '{action}' requires role '{required_role}'"
                )
            }
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

/// Translates a domain error into an API error.
///
/// Each variant is mapped explicitly so changes in the domain error
/// taxonomy surface here as compile errors.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    match err {
        DomainError::InvalidRole(_) => ApiError::ValidationError {
            field: String::from("role"),
            message,
        },
        DomainError::InvalidUserStatus(_) | DomainError::InvalidTicketStatus(_) => {
            ApiError::ValidationError {
                field: String::from("status"),
                message,
            }
        }
        DomainError::InvalidPriority(_) => ApiError::ValidationError {
            field: String::from("priority"),
            message,
        },
        DomainError::InvalidCategory(_) => ApiError::ValidationError {
            field: String::from("category"),
            message,
        },
        DomainError::InvalidUsername(_) => ApiError::ValidationError {
            field: String::from("username"),
            message,
        },
        DomainError::InvalidEmail(_) => ApiError::ValidationError {
            field: String::from("email"),
            message,
        },
        DomainError::InvalidTitle(_) => ApiError::ValidationError {
            field: String::from("title"),
            message,
        },
        DomainError::InvalidDescription(_) => ApiError::ValidationError {
            field: String::from("description"),
            message,
        },
        DomainError::EmptyComment => ApiError::ValidationError {
            field: String::from("content"),
            message,
        },
        DomainError::InvalidProgress { .. } => ApiError::ValidationError {
            field: String::from("progress"),
            message,
        },
        DomainError::InvalidBirthdayFormat { .. } | DomainError::BirthdayInFuture { .. } => {
            ApiError::ValidationError {
                field: String::from("birthday"),
                message,
            }
        }
        DomainError::ImplausibleAge { .. } | DomainError::AgeBelowMinimum { .. } => {
            ApiError::AgeRestriction { message }
        }
        DomainError::MissingDepartment { .. } => ApiError::ValidationError {
            field: String::from("department_id"),
            message,
        },
    }
}

/// Translates a core engine error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    let message: String = err.to_string();
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::DepartmentNotEmpty { .. } => ApiError::Conflict { message },
        CoreError::AlreadyVerified => ApiError::InvalidToken { message },
        CoreError::NotAwaitingVerification { .. }
        | CoreError::NotAwaitingApproval { .. }
        | CoreError::NotActive { .. }
        | CoreError::EscalationPending
        | CoreError::NoEscalationPending => ApiError::InvalidState { message },
    }
}

/// Translates a persistence error into an API error.
///
/// `resource_type` names the entity the operation was acting on; it
/// flows into the `InvalidReference`, `Conflict`, and `NotFound`
/// variants.
#[must_use]
pub fn translate_persistence_error(resource_type: &str, err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::Duplicate(message) => ApiError::Conflict { message },
        PersistenceError::ForeignKeyViolation(message) => ApiError::InvalidReference {
            resource_type: resource_type.to_string(),
            message,
        },
        PersistenceError::NotFound(message) => ApiError::NotFound {
            resource_type: resource_type.to_string(),
            message,
        },
        _ => ApiError::Internal {
            message: format!("Persistence failure: {err}"),
        },
    }
}
