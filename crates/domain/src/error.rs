// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Role string is not a recognized role.
    InvalidRole(String),
    /// User status string is not a recognized lifecycle status.
    InvalidUserStatus(String),
    /// Ticket status string is not a recognized status.
    InvalidTicketStatus(String),
    /// Ticket priority string is not a recognized priority.
    InvalidPriority(String),
    /// Topic category string is not a recognized category.
    InvalidCategory(String),
    /// Username is empty or malformed.
    InvalidUsername(String),
    /// Email address is empty or malformed.
    InvalidEmail(String),
    /// Ticket title is empty or exceeds the length bound.
    InvalidTitle(String),
    /// Ticket description is empty or exceeds the length bound.
    InvalidDescription(String),
    /// Comment content is empty.
    EmptyComment,
    /// Ticket progress is outside the permitted range.
    InvalidProgress {
        /// The out-of-range progress value.
        value: i32,
    },
    /// Birthday string does not match the `dd.mm.yyyy` format.
    InvalidBirthdayFormat {
        /// The unparseable birthday string.
        value: String,
    },
    /// Birthday lies in the future.
    BirthdayInFuture {
        /// The future birthday string.
        value: String,
    },
    /// Birthday yields an implausibly low age (under 5 years).
    ImplausibleAge {
        /// The computed age in years.
        age: u32,
    },
    /// Birthday yields an age below the minimum (13 years).
    AgeBelowMinimum {
        /// The computed age in years.
        age: u32,
    },
    /// A non-admin user was created without a department.
    MissingDepartment {
        /// The role that requires a department.
        role: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRole(value) => write!(f, "Invalid role: '{value}'"),
            Self::InvalidUserStatus(value) => write!(f, "Invalid user status: '{value}'"),
            Self::InvalidTicketStatus(value) => write!(f, "Invalid ticket status: '{value}'"),
            Self::InvalidPriority(value) => write!(f, "Invalid ticket priority: '{value}'"),
            Self::InvalidCategory(value) => write!(f, "Invalid topic category: '{value}'"),
            Self::InvalidUsername(msg) => write!(f, "Invalid username: {msg}"),
            Self::InvalidEmail(msg) => write!(f, "Invalid email: {msg}"),
            Self::InvalidTitle(msg) => write!(f, "Invalid title: {msg}"),
            Self::InvalidDescription(msg) => write!(f, "Invalid description: {msg}"),
            Self::EmptyComment => write!(f, "Comment content must not be empty"),
            Self::InvalidProgress { value } => {
                write!(f, "Invalid progress: {value}. Must be between 0 and 100")
            }
            Self::InvalidBirthdayFormat { value } => {
                write!(f, "Invalid birthday '{value}': expected dd.mm.yyyy")
            }
            Self::BirthdayInFuture { value } => {
                write!(f, "Invalid birthday '{value}': date is in the future")
            }
            Self::ImplausibleAge { age } => {
                write!(
                    f,
                    "Birthday appears invalid: computed age of {age} year(s) is not plausible for a helpdesk account"
                )
            }
            Self::AgeBelowMinimum { age } => {
                write!(
                    f,
                    "Registration requires a minimum age of 13 years; computed age is {age}"
                )
            }
            Self::MissingDepartment { role } => {
                write!(f, "Role '{role}' requires a department assignment")
            }
        }
    }
}

impl std::error::Error for DomainError {}
