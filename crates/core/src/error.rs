// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use helpdesk_domain::{DomainError, UserStatus};

/// Errors produced by the lifecycle engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain validation rule was violated.
    DomainViolation(DomainError),
    /// A department still has members or topics attached and cannot be
    /// deleted.
    DepartmentNotEmpty {
        /// Remaining member count.
        members: i64,
        /// Remaining topic count.
        topics: i64,
    },
    /// The verification token has already been consumed.
    AlreadyVerified,
    /// The user is not awaiting email verification.
    NotAwaitingVerification {
        /// The user's current status.
        status: UserStatus,
    },
    /// The user is not awaiting admin approval.
    NotAwaitingApproval {
        /// The user's current status.
        status: UserStatus,
    },
    /// The user is not active and cannot be deactivated.
    NotActive {
        /// The user's current status.
        status: UserStatus,
    },
    /// The ticket already has a pending escalation.
    EscalationPending,
    /// The ticket has no pending escalation to approve.
    NoEscalationPending,
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "{err}"),
            Self::DepartmentNotEmpty { members, topics } => {
                write!(
                    f,
                    "Cannot delete department: {members} user(s) and {topics} topic(s) are still attached"
                )
            }
            Self::AlreadyVerified => {
                write!(f, "Email address has already been verified")
            }
            Self::NotAwaitingVerification { status } => {
                write!(f, "User is not awaiting email verification (status: {status})")
            }
            Self::NotAwaitingApproval { status } => {
                write!(f, "User is not awaiting admin approval (status: {status})")
            }
            Self::NotActive { status } => {
                write!(f, "User is not active (status: {status})")
            }
            Self::EscalationPending => {
                write!(f, "Ticket already has a pending escalation")
            }
            Self::NoEscalationPending => {
                write!(f, "Ticket has no pending escalation")
            }
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
