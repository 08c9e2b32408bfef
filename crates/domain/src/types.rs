// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Represents the role of a user account.
///
/// Roles gate administrative operations; they are a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    /// System administrator. The only role permitted to omit a department.
    #[serde(rename = "admin")]
    Admin,
    /// Department manager.
    #[serde(rename = "manager")]
    Manager,
    /// Department supervisor.
    #[serde(rename = "supervisor")]
    Supervisor,
    /// Support agent.
    #[default]
    #[serde(rename = "agent")]
    Agent,
}

impl Role {
    /// Parses a role from its string representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the string does not name a valid role.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "supervisor" => Ok(Self::Supervisor),
            "agent" => Ok(Self::Agent),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }

    /// Converts this role to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Supervisor => "supervisor",
            Self::Agent => "agent",
        }
    }

    /// Returns whether accounts with this role may exist without a department.
    #[must_use]
    pub const fn allows_missing_department(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents the lifecycle status of a user account.
///
/// The onboarding state machine is strictly linear:
/// `PendingEmail` → `PendingAdmin` → `Active`, with `Inactive`
/// reachable from `Active` by administrative action only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UserStatus {
    /// Awaiting email verification. Initial state after registration.
    #[default]
    #[serde(rename = "pending_email")]
    PendingEmail,
    /// Email verified; awaiting admin approval.
    #[serde(rename = "pending_admin")]
    PendingAdmin,
    /// Fully onboarded; may authenticate.
    #[serde(rename = "active")]
    Active,
    /// Deactivated by an administrator.
    #[serde(rename = "inactive")]
    Inactive,
}

impl FromStr for UserStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_email" => Ok(Self::PendingEmail),
            "pending_admin" => Ok(Self::PendingAdmin),
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(DomainError::InvalidUserStatus(s.to_string())),
        }
    }
}

impl UserStatus {
    /// Converts this status to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PendingEmail => "pending_email",
            Self::PendingAdmin => "pending_admin",
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// Checks if a transition from this status to another is valid.
    ///
    /// Valid transitions are:
    /// - `PendingEmail` → `PendingAdmin`
    /// - `PendingAdmin` → `Active`
    /// - `Active` → `Inactive`
    ///
    /// No transition may skip a state.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::PendingEmail, Self::PendingAdmin)
                | (Self::PendingAdmin, Self::Active)
                | (Self::Active, Self::Inactive)
        )
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents the workflow status of a ticket.
///
/// Transitions are intentionally permissive: any change between valid
/// statuses is accepted and audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TicketStatus {
    /// Newly filed, not yet worked.
    #[default]
    #[serde(rename = "open")]
    Open,
    /// Being worked by an agent.
    #[serde(rename = "in progress")]
    InProgress,
    /// Work complete, awaiting confirmation.
    #[serde(rename = "resolved")]
    Resolved,
    /// Closed out.
    #[serde(rename = "closed")]
    Closed,
}

impl TicketStatus {
    /// Parses a ticket status from its string representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the string does not name a valid status.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "open" => Ok(Self::Open),
            "in progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            _ => Err(DomainError::InvalidTicketStatus(s.to_string())),
        }
    }

    /// Converts this status to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents the priority of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TicketPriority {
    /// Low priority.
    #[serde(rename = "low")]
    Low,
    /// Default priority.
    #[default]
    #[serde(rename = "medium")]
    Medium,
    /// High priority.
    #[serde(rename = "high")]
    High,
    /// Urgent; escalation candidate.
    #[serde(rename = "urgent")]
    Urgent,
}

impl TicketPriority {
    /// Parses a priority from its string representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the string does not name a valid priority.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(DomainError::InvalidPriority(s.to_string())),
        }
    }

    /// Converts this priority to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents the category classification of a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TopicCategory {
    #[serde(rename = "software")]
    Software,
    #[serde(rename = "hardware")]
    Hardware,
    #[serde(rename = "finance")]
    Finance,
    #[serde(rename = "sales")]
    Sales,
    #[serde(rename = "operation")]
    Operation,
    #[serde(rename = "server")]
    Server,
    #[serde(rename = "category")]
    Category,
    #[default]
    #[serde(rename = "other")]
    Other,
}

impl TopicCategory {
    /// Parses a category from its string representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the string does not name a valid category.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "software" => Ok(Self::Software),
            "hardware" => Ok(Self::Hardware),
            "finance" => Ok(Self::Finance),
            "sales" => Ok(Self::Sales),
            "operation" => Ok(Self::Operation),
            "server" => Ok(Self::Server),
            "category" => Ok(Self::Category),
            "other" => Ok(Self::Other),
            _ => Err(DomainError::InvalidCategory(s.to_string())),
        }
    }

    /// Converts this category to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Software => "software",
            Self::Hardware => "hardware",
            Self::Finance => "finance",
            Self::Sales => "sales",
            Self::Operation => "operation",
            Self::Server => "server",
            Self::Category => "category",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for TopicCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a user account.
///
/// `user_id` is the canonical internal identifier; `None` indicates the
/// user has not been persisted yet. Username and email are globally
/// unique (store-enforced).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Canonical internal identifier (opaque, stable, immutable).
    pub user_id: Option<i64>,
    /// The user's first name.
    pub first_name: String,
    /// The user's last name.
    pub last_name: String,
    /// Unique login name (normalized to lowercase).
    pub username: String,
    /// Unique email address (normalized to lowercase).
    pub email: String,
    /// Optional birthday (ISO 8601 date string once validated).
    pub birthday: Option<String>,
    /// Bcrypt password hash. Never exposed through the API.
    pub password_hash: String,
    /// The user's role.
    pub role: Role,
    /// The department this user belongs to. Required unless role is admin.
    pub department_id: Option<i64>,
    /// Role-assigned default department, if any.
    pub default_department_id: Option<i64>,
    /// Onboarding lifecycle status.
    pub status: UserStatus,
    /// Whether the email address has been verified.
    pub email_verified: bool,
    /// Single-use verification token. Cleared on successful verification.
    pub email_verification_token: Option<String>,
}

/// Represents a department.
///
/// A department owns the membership ledger for its members and topics
/// but not the referenced entities themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Canonical internal identifier.
    pub department_id: Option<i64>,
    /// Unique department name.
    pub name: String,
    /// Optional short code.
    pub code: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Supervising user, if assigned.
    pub supervisor_id: Option<i64>,
    /// Managing user, if assigned.
    pub manager_id: Option<i64>,
    /// Optional parent department.
    pub parent_department_id: Option<i64>,
}

/// Represents a support topic.
///
/// Topics are created standalone and then enrolled in their owning
/// department's topic set via the membership ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Canonical internal identifier.
    pub topic_id: Option<i64>,
    /// Unique topic name.
    pub name: String,
    /// Category classification.
    pub category: TopicCategory,
    /// Optional subcategory.
    pub subcategory: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// The owning department.
    pub department_id: i64,
    /// Version counter, incremented on every update.
    pub version: i32,
}

/// A comment on a ticket.
///
/// Comments are embedded in the ticket aggregate and are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Identifier within the store.
    pub comment_id: Option<i64>,
    /// The commenting user.
    pub author_id: i64,
    /// The comment text.
    pub content: String,
    /// Creation timestamp (ISO 8601 text).
    pub created_at: String,
}

/// An immutable audit record of a single field change on a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The tracked field that changed (e.g. "status", "priority").
    pub field: String,
    /// The value before the change, if any.
    pub old_value: Option<String>,
    /// The value after the change, if any.
    pub new_value: Option<String>,
    /// The user who made the change.
    pub actor_id: i64,
    /// When the change occurred (ISO 8601 text).
    pub created_at: String,
}

/// File metadata attached to a ticket.
///
/// The core persists metadata only; physical storage lifecycle is
/// managed externally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// The stored filename.
    pub filename: String,
    /// The storage path supplied by the file store.
    pub storage_path: String,
    /// MIME type, if known.
    pub mime_type: Option<String>,
    /// Size in bytes.
    pub size_bytes: i64,
    /// The uploading user.
    pub uploaded_by: i64,
}

/// Represents a support ticket.
///
/// The ticket exclusively owns its comments, history, and attachments;
/// they are only addressable through the ticket. `ticket_number` is
/// assigned exactly once, at creation, and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Canonical internal identifier.
    pub ticket_id: Option<i64>,
    /// Unique generated number, `TKT-YYYYMMDD-NNNN`.
    pub ticket_number: String,
    /// Short summary.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Workflow status.
    pub status: TicketStatus,
    /// Completion progress, 0-100.
    pub progress: i32,
    /// Priority.
    pub priority: TicketPriority,
    /// The filing user.
    pub author_id: i64,
    /// The assigned agent, if any.
    pub assigned_to_id: Option<i64>,
    /// The owning department.
    pub department_id: i64,
    /// The topic this ticket is filed under.
    pub topic_id: i64,
    /// Pending escalation target, if any.
    pub escalated_to_department_id: Option<i64>,
    /// The user who approved the escalation, if approved.
    pub escalation_approved_by: Option<i64>,
    /// Ordered append-only comments.
    pub comments: Vec<Comment>,
    /// Ordered append-only audit log.
    pub history: Vec<HistoryEntry>,
    /// Ordered attachment metadata.
    pub attachments: Vec<Attachment>,
    /// Creation timestamp (ISO 8601 text).
    pub created_at: String,
    /// Last-update timestamp (ISO 8601 text).
    pub updated_at: String,
}
