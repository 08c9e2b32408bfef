// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Responses never carry password hashes or verification tokens.

use helpdesk_domain::{Department, Ticket, Topic, User};

/// Deserializes a field that distinguishes "absent" from "null".
///
/// An absent field stays `None`; an explicit `null` becomes
/// `Some(None)`. Used for nullable reference fields in patch requests.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// A user as exposed through the API.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserInfo {
    /// The canonical user identifier.
    pub user_id: i64,
    /// The user's first name.
    pub first_name: String,
    /// The user's last name.
    pub last_name: String,
    /// The unique login name.
    pub username: String,
    /// The unique email address.
    pub email: String,
    /// Optional birthday (`dd.mm.yyyy` as supplied).
    pub birthday: Option<String>,
    /// The user's role.
    pub role: String,
    /// The department the user belongs to, if any.
    pub department_id: Option<i64>,
    /// The role-assigned default department, if any.
    pub default_department_id: Option<i64>,
    /// The onboarding lifecycle status.
    pub status: String,
    /// Whether the email address has been verified.
    pub email_verified: bool,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id.unwrap_or_default(),
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            email: user.email,
            birthday: user.birthday,
            role: user.role.as_str().to_string(),
            department_id: user.department_id,
            default_department_id: user.default_department_id,
            status: user.status.as_str().to_string(),
            email_verified: user.email_verified,
        }
    }
}

/// API request to register a new user account.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RegisterRequest {
    /// The user's first name.
    pub first_name: String,
    /// The user's last name.
    pub last_name: String,
    /// The desired login name.
    pub username: String,
    /// The user's email address.
    pub email: String,
    /// The plaintext password (hashed before storage).
    pub password: String,
    /// Optional birthday in `dd.mm.yyyy` format.
    pub birthday: Option<String>,
    /// The requested role.
    pub role: String,
    /// The department to join. Required unless the role supplies a
    /// default or permits omission.
    pub department_id: Option<i64>,
}

/// API response for a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RegisterResponse {
    /// The created user.
    pub user: UserInfo,
    /// A success message.
    pub message: String,
}

/// API request to verify an email address.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VerifyEmailRequest {
    /// The email address being verified.
    pub email: String,
    /// The single-use verification token.
    pub token: String,
}

/// API request to update an existing user.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UpdateUserRequest {
    /// The user's first name.
    pub first_name: String,
    /// The user's last name.
    pub last_name: String,
    /// The user's email address.
    pub email: String,
    /// Optional birthday in `dd.mm.yyyy` format.
    pub birthday: Option<String>,
    /// A new role, when the role changes.
    pub role: Option<String>,
    /// A new department, when the user moves.
    pub department_id: Option<i64>,
}

/// API request to authenticate.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoginRequest {
    /// The login name.
    pub username: String,
    /// The plaintext password.
    pub password: String,
}

/// API response for a successful login.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoginResponse {
    /// The session token for subsequent requests.
    pub session_token: String,
    /// The authenticated user.
    pub user: UserInfo,
}

/// Generic success response.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MessageResponse {
    /// A success message.
    pub message: String,
}

/// A department as exposed through the API.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DepartmentInfo {
    /// The canonical department identifier.
    pub department_id: i64,
    /// The unique department name.
    pub name: String,
    /// Optional short code.
    pub code: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// The supervising user, if assigned.
    pub supervisor_id: Option<i64>,
    /// The managing user, if assigned.
    pub manager_id: Option<i64>,
    /// The parent department, if any.
    pub parent_department_id: Option<i64>,
}

impl From<Department> for DepartmentInfo {
    fn from(department: Department) -> Self {
        Self {
            department_id: department.department_id.unwrap_or_default(),
            name: department.name,
            code: department.code,
            description: department.description,
            supervisor_id: department.supervisor_id,
            manager_id: department.manager_id,
            parent_department_id: department.parent_department_id,
        }
    }
}

/// API request to create a department.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateDepartmentRequest {
    /// The unique department name.
    pub name: String,
    /// Optional short code.
    pub code: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// The supervising user, if assigned.
    pub supervisor_id: Option<i64>,
    /// The managing user, if assigned.
    pub manager_id: Option<i64>,
    /// The parent department, if any.
    pub parent_department_id: Option<i64>,
}

/// API request to update a department.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UpdateDepartmentRequest {
    /// The unique department name.
    pub name: String,
    /// Optional short code.
    pub code: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// The supervising user, if assigned.
    pub supervisor_id: Option<i64>,
    /// The managing user, if assigned.
    pub manager_id: Option<i64>,
    /// The parent department, if any.
    pub parent_department_id: Option<i64>,
}

/// A topic as exposed through the API.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TopicInfo {
    /// The canonical topic identifier.
    pub topic_id: i64,
    /// The unique topic name.
    pub name: String,
    /// The category classification.
    pub category: String,
    /// Optional subcategory.
    pub subcategory: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// The owning department.
    pub department_id: i64,
    /// The version counter.
    pub version: i32,
}

impl From<Topic> for TopicInfo {
    fn from(topic: Topic) -> Self {
        Self {
            topic_id: topic.topic_id.unwrap_or_default(),
            name: topic.name,
            category: topic.category.as_str().to_string(),
            subcategory: topic.subcategory,
            description: topic.description,
            department_id: topic.department_id,
            version: topic.version,
        }
    }
}

/// API request to create a topic.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateTopicRequest {
    /// The unique topic name.
    pub name: String,
    /// The category classification.
    pub category: String,
    /// Optional subcategory.
    pub subcategory: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// The owning department.
    pub department_id: i64,
}

/// API request to update a topic.
///
/// A changed `department_id` moves the topic between departments
/// through the ledger.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UpdateTopicRequest {
    /// The unique topic name.
    pub name: String,
    /// The category classification.
    pub category: String,
    /// Optional subcategory.
    pub subcategory: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// The owning department.
    pub department_id: i64,
}

/// Attachment metadata supplied by the file store.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AttachmentUpload {
    /// The stored filename.
    pub filename: String,
    /// The storage path assigned by the file store.
    pub storage_path: String,
    /// MIME type, if known.
    pub mime_type: Option<String>,
    /// Size in bytes.
    pub size_bytes: i64,
}

/// API request to create a ticket.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateTicketRequest {
    /// Short summary.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Priority; defaults to medium when omitted.
    pub priority: Option<String>,
    /// The owning department; defaults to the topic's department.
    pub department_id: Option<i64>,
    /// The topic to file under.
    pub topic_id: i64,
    /// An initial assignee, if any.
    pub assigned_to_id: Option<i64>,
    /// Attachment metadata from the file store.
    #[serde(default)]
    pub attachments: Vec<AttachmentUpload>,
}

/// API request to update a ticket.
///
/// Absent fields are untouched. `assigned_to_id` distinguishes absent
/// (unchanged) from `null` (unassign).
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct UpdateTicketRequest {
    /// A new title.
    pub title: Option<String>,
    /// A new description.
    pub description: Option<String>,
    /// A new workflow status.
    pub status: Option<String>,
    /// A new priority.
    pub priority: Option<String>,
    /// A new progress value, 0-100.
    pub progress: Option<i32>,
    /// A new assignee, or `null` to unassign.
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_to_id: Option<Option<i64>>,
    /// A new owning department.
    pub department_id: Option<i64>,
    /// A new topic.
    pub topic_id: Option<i64>,
}

/// API request to add a comment to a ticket.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CommentRequest {
    /// The comment text.
    pub content: String,
}

/// API request to assign or unassign a ticket.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AssignTicketRequest {
    /// The assignee, or `null` to unassign.
    pub assigned_to_id: Option<i64>,
}

/// API request to change a ticket's status.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UpdateStatusRequest {
    /// The new workflow status.
    pub status: String,
}

/// API request to change a ticket's priority.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UpdatePriorityRequest {
    /// The new priority.
    pub priority: String,
}

/// API request to escalate a ticket to another department.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EscalateTicketRequest {
    /// The escalation target department.
    pub department_id: i64,
}

/// A ticket comment as exposed through the API.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CommentInfo {
    /// The comment identifier.
    pub comment_id: i64,
    /// The commenting user.
    pub author_id: i64,
    /// The comment text.
    pub content: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// A ticket history entry as exposed through the API.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HistoryEntryInfo {
    /// The tracked field that changed.
    pub field: String,
    /// The value before the change.
    pub old_value: Option<String>,
    /// The value after the change.
    pub new_value: Option<String>,
    /// The user who made the change.
    pub actor_id: i64,
    /// When the change occurred.
    pub created_at: String,
}

/// Ticket attachment metadata as exposed through the API.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AttachmentInfo {
    /// The stored filename.
    pub filename: String,
    /// The storage path.
    pub storage_path: String,
    /// MIME type, if known.
    pub mime_type: Option<String>,
    /// Size in bytes.
    pub size_bytes: i64,
    /// The uploading user.
    pub uploaded_by: i64,
}

/// A ticket as exposed through the API, with its sub-collections.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TicketInfo {
    /// The canonical ticket identifier.
    pub ticket_id: i64,
    /// The unique generated number, `TKT-YYYYMMDD-NNNN`.
    pub ticket_number: String,
    /// Short summary.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Workflow status.
    pub status: String,
    /// Completion progress, 0-100.
    pub progress: i32,
    /// Priority.
    pub priority: String,
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
    /// Ordered comments.
    pub comments: Vec<CommentInfo>,
    /// Ordered audit log.
    pub history: Vec<HistoryEntryInfo>,
    /// Ordered attachment metadata.
    pub attachments: Vec<AttachmentInfo>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last-update timestamp.
    pub updated_at: String,
}

impl From<Ticket> for TicketInfo {
    fn from(ticket: Ticket) -> Self {
        Self {
            ticket_id: ticket.ticket_id.unwrap_or_default(),
            ticket_number: ticket.ticket_number,
            title: ticket.title,
            description: ticket.description,
            status: ticket.status.as_str().to_string(),
            progress: ticket.progress,
            priority: ticket.priority.as_str().to_string(),
            author_id: ticket.author_id,
            assigned_to_id: ticket.assigned_to_id,
            department_id: ticket.department_id,
            topic_id: ticket.topic_id,
            escalated_to_department_id: ticket.escalated_to_department_id,
            escalation_approved_by: ticket.escalation_approved_by,
            comments: ticket
                .comments
                .into_iter()
                .map(|comment| CommentInfo {
                    comment_id: comment.comment_id.unwrap_or_default(),
                    author_id: comment.author_id,
                    content: comment.content,
                    created_at: comment.created_at,
                })
                .collect(),
            history: ticket
                .history
                .into_iter()
                .map(|entry| HistoryEntryInfo {
                    field: entry.field,
                    old_value: entry.old_value,
                    new_value: entry.new_value,
                    actor_id: entry.actor_id,
                    created_at: entry.created_at,
                })
                .collect(),
            attachments: ticket
                .attachments
                .into_iter()
                .map(|attachment| AttachmentInfo {
                    filename: attachment.filename,
                    storage_path: attachment.storage_path,
                    mime_type: attachment.mime_type,
                    size_bytes: attachment.size_bytes,
                    uploaded_by: attachment.uploaded_by,
                })
                .collect(),
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
        }
    }
}
