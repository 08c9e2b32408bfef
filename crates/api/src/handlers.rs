// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Handlers validate input, enforce role gates, run the core engines,
//! and translate every lower-layer error into the [`ApiError`]
//! taxonomy. Notifications fire only after the primary mutation has
//! committed and never alter its outcome.

use chrono::Local;
use tracing::info;

use helpdesk_core::{
    FieldChange, RoleDefaults, TicketPatch, assignment_change, compute_ticket_changes,
    guard_approval, guard_deactivation, guard_department_delete, guard_verification,
    resolve_department,
};
use helpdesk_core::CoreError;
use helpdesk_domain::{
    Attachment, Department, Role, Ticket, TicketPriority, TicketStatus, Topic, TopicCategory,
    User, UserStatus, day_key, normalize_email, normalize_username, validate_birthday,
    validate_comment_content, validate_description, validate_email, validate_title,
    validate_username,
};
use helpdesk_notify::{Notification, NotificationSender, dispatch};
use helpdesk_persistence::{NewTicket, Persistence, PersistenceError};

use crate::auth::{AuthenticationService, AuthorizationService};
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::password_policy::PasswordPolicy;
use crate::request_response::{
    AssignTicketRequest, AttachmentUpload, CommentRequest, CreateDepartmentRequest,
    CreateTicketRequest, CreateTopicRequest, DepartmentInfo, EscalateTicketRequest, LoginRequest,
    LoginResponse, MessageResponse, RegisterRequest, RegisterResponse, TicketInfo, TopicInfo,
    UpdateDepartmentRequest, UpdatePriorityRequest, UpdateStatusRequest, UpdateTicketRequest,
    UpdateTopicRequest, UpdateUserRequest, UserInfo, VerifyEmailRequest,
};

/// Uniform message for failed email verification attempts.
const INVALID_VERIFICATION: &str = "Invalid email or verification token";

fn actor_id(user: &User) -> i64 {
    user.user_id.unwrap_or_default()
}

fn generate_verification_token() -> String {
    let token: u128 = rand::random();
    format!("{token:032x}")
}

// Reference checks: the referent is not the operation's primary
// entity, so a miss is InvalidReference, not NotFound.

fn require_department(
    persistence: &mut Persistence,
    department_id: i64,
) -> Result<Department, ApiError> {
    persistence
        .get_department(department_id)
        .map_err(|e| translate_persistence_error("department", e))?
        .ok_or_else(|| ApiError::InvalidReference {
            resource_type: String::from("department"),
            message: format!("Department with ID {department_id} does not exist"),
        })
}

fn require_user(persistence: &mut Persistence, user_id: i64) -> Result<User, ApiError> {
    persistence
        .get_user_by_id(user_id)
        .map_err(|e| translate_persistence_error("user", e))?
        .ok_or_else(|| ApiError::InvalidReference {
            resource_type: String::from("user"),
            message: format!("User with ID {user_id} does not exist"),
        })
}

fn require_topic(persistence: &mut Persistence, topic_id: i64) -> Result<Topic, ApiError> {
    persistence
        .get_topic(topic_id)
        .map_err(|e| translate_persistence_error("topic", e))?
        .ok_or_else(|| ApiError::InvalidReference {
            resource_type: String::from("topic"),
            message: format!("Topic with ID {topic_id} does not exist"),
        })
}

// Primary-entity lookups: a miss is NotFound.

fn fetch_user(persistence: &mut Persistence, user_id: i64) -> Result<User, ApiError> {
    persistence
        .get_user_by_id(user_id)
        .map_err(|e| translate_persistence_error("user", e))?
        .ok_or_else(|| ApiError::NotFound {
            resource_type: String::from("user"),
            message: format!("User with ID {user_id} not found"),
        })
}

fn fetch_department(
    persistence: &mut Persistence,
    department_id: i64,
) -> Result<Department, ApiError> {
    persistence
        .get_department(department_id)
        .map_err(|e| translate_persistence_error("department", e))?
        .ok_or_else(|| ApiError::NotFound {
            resource_type: String::from("department"),
            message: format!("Department with ID {department_id} not found"),
        })
}

fn fetch_topic(persistence: &mut Persistence, topic_id: i64) -> Result<Topic, ApiError> {
    persistence
        .get_topic(topic_id)
        .map_err(|e| translate_persistence_error("topic", e))?
        .ok_or_else(|| ApiError::NotFound {
            resource_type: String::from("topic"),
            message: format!("Topic with ID {topic_id} not found"),
        })
}

fn fetch_ticket(persistence: &mut Persistence, ticket_id: i64) -> Result<Ticket, ApiError> {
    persistence
        .get_ticket(ticket_id)
        .map_err(|e| translate_persistence_error("ticket", e))?
        .ok_or_else(|| ApiError::NotFound {
            resource_type: String::from("ticket"),
            message: format!("Ticket with ID {ticket_id} not found"),
        })
}

/// Validated registration input, ready to become a stored user.
struct ValidatedRegistration {
    role: Role,
    username: String,
    email: String,
    department_id: Option<i64>,
    default_department_id: Option<i64>,
    password_hash: String,
}

fn validate_registration(
    persistence: &mut Persistence,
    defaults: &RoleDefaults,
    request: &RegisterRequest,
) -> Result<ValidatedRegistration, ApiError> {
    let role: Role = Role::parse(&request.role).map_err(translate_domain_error)?;

    let username: String = normalize_username(&request.username);
    validate_username(&username).map_err(translate_domain_error)?;

    let email: String = normalize_email(&request.email);
    validate_email(&email).map_err(translate_domain_error)?;

    if let Some(birthday) = request.birthday.as_deref() {
        validate_birthday(birthday, Local::now().date_naive()).map_err(translate_domain_error)?;
    }

    PasswordPolicy::default()
        .validate(&request.password, &username)
        .map_err(|e| ApiError::ValidationError {
            field: String::from("password"),
            message: e.to_string(),
        })?;

    let department_id: Option<i64> =
        resolve_department(role, request.department_id, defaults).map_err(translate_core_error)?;
    if let Some(id) = department_id {
        require_department(persistence, id)?;
    }

    let password_hash: String =
        bcrypt::hash(&request.password, bcrypt::DEFAULT_COST).map_err(|e| ApiError::Internal {
            message: format!("Failed to hash password: {e}"),
        })?;

    Ok(ValidatedRegistration {
        role,
        username,
        email,
        department_id,
        default_department_id: defaults.for_role(role),
        password_hash,
    })
}

// ============================================================================
// Identity & onboarding
// ============================================================================

/// Registers a new user account.
///
/// The account starts in `pending_email` with a single-use
/// verification token; the verification email is sent best-effort.
///
/// # Errors
///
/// Returns a validation, age-restriction, reference, or conflict error
/// per the taxonomy.
pub fn register_user(
    persistence: &mut Persistence,
    defaults: &RoleDefaults,
    sender: &dyn NotificationSender,
    request: &RegisterRequest,
) -> Result<RegisterResponse, ApiError> {
    let validated: ValidatedRegistration = validate_registration(persistence, defaults, request)?;
    let token: String = generate_verification_token();

    let user = User {
        user_id: None,
        first_name: request.first_name.clone(),
        last_name: request.last_name.clone(),
        username: validated.username.clone(),
        email: validated.email.clone(),
        birthday: request.birthday.clone(),
        password_hash: validated.password_hash,
        role: validated.role,
        department_id: validated.department_id,
        default_department_id: validated.default_department_id,
        status: UserStatus::PendingEmail,
        email_verified: false,
        email_verification_token: Some(token.clone()),
    };

    let user_id: i64 = persistence
        .create_user(&user)
        .map_err(|e| translate_persistence_error("user", e))?;

    info!(user_id, username = %validated.username, "User registered");

    dispatch(
        sender,
        &Notification::VerificationRequested {
            email: validated.email,
            first_name: request.first_name.clone(),
            token,
        },
    );

    let created: User = fetch_user(persistence, user_id)?;
    Ok(RegisterResponse {
        user: created.into(),
        message: format!(
            "User '{}' registered; a verification email has been sent",
            validated.username
        ),
    })
}

/// Verifies an email address with a single-use token.
///
/// Advances the account from `pending_email` to `pending_admin` and
/// notifies active admins that an approval is waiting.
///
/// # Errors
///
/// Returns `InvalidToken` for a wrong or consumed token and
/// `InvalidState` when the account is past verification.
pub fn verify_email(
    persistence: &mut Persistence,
    sender: &dyn NotificationSender,
    request: &VerifyEmailRequest,
) -> Result<MessageResponse, ApiError> {
    let email: String = normalize_email(&request.email);

    let user: User = persistence
        .get_user_by_email(&email)
        .map_err(|e| translate_persistence_error("user", e))?
        .ok_or_else(|| ApiError::InvalidToken {
            message: String::from(INVALID_VERIFICATION),
        })?;

    guard_verification(&user).map_err(translate_core_error)?;

    if user.email_verification_token.as_deref() != Some(request.token.as_str()) {
        return Err(ApiError::InvalidToken {
            message: String::from(INVALID_VERIFICATION),
        });
    }

    persistence
        .consume_verification_token(actor_id(&user))
        .map_err(|e| translate_persistence_error("user", e))?;

    info!(username = %user.username, "Email verified");

    let admin_emails: Vec<String> = persistence
        .list_active_admin_emails()
        .map_err(|e| translate_persistence_error("user", e))?;
    for admin_email in admin_emails {
        dispatch(
            sender,
            &Notification::ApprovalPending {
                admin_email,
                username: user.username.clone(),
            },
        );
    }

    Ok(MessageResponse {
        message: String::from("Email verified; the account now awaits admin approval"),
    })
}

/// Approves a pending account, activating it.
///
/// # Errors
///
/// Returns `Unauthorized` for non-admins, `NotFound` for a missing
/// user, and `InvalidState` unless the account is `pending_admin`.
pub fn approve_user(
    persistence: &mut Persistence,
    sender: &dyn NotificationSender,
    actor: &User,
    user_id: i64,
) -> Result<UserInfo, ApiError> {
    AuthorizationService::authorize_approve_user(actor)?;

    let user: User = fetch_user(persistence, user_id)?;
    guard_approval(&user).map_err(translate_core_error)?;

    persistence
        .set_user_status(user_id, UserStatus::Active)
        .map_err(|e| translate_persistence_error("user", e))?;

    info!(user_id, "User approved");

    dispatch(
        sender,
        &Notification::AccountApproved {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
        },
    );

    let updated: User = fetch_user(persistence, user_id)?;
    Ok(updated.into())
}

/// Deactivates an active account and revokes its sessions.
///
/// # Errors
///
/// Returns `Unauthorized` for non-admins, `NotFound` for a missing
/// user, and `InvalidState` unless the account is `active`.
pub fn deactivate_user(
    persistence: &mut Persistence,
    actor: &User,
    user_id: i64,
) -> Result<UserInfo, ApiError> {
    AuthorizationService::authorize_deactivate_user(actor)?;

    let user: User = fetch_user(persistence, user_id)?;
    guard_deactivation(&user).map_err(translate_core_error)?;

    persistence
        .set_user_status(user_id, UserStatus::Inactive)
        .map_err(|e| translate_persistence_error("user", e))?;
    persistence
        .delete_sessions_for_user(user_id)
        .map_err(|e| translate_persistence_error("user", e))?;

    info!(user_id, "User deactivated");

    let updated: User = fetch_user(persistence, user_id)?;
    Ok(updated.into())
}

/// Authenticates a user and opens a session.
///
/// # Errors
///
/// Returns `AuthenticationFailed` for bad credentials or an inactive
/// account.
pub fn login(
    persistence: &mut Persistence,
    request: &LoginRequest,
) -> Result<LoginResponse, ApiError> {
    let (session_token, user) =
        AuthenticationService::login(persistence, &request.username, &request.password)?;
    Ok(LoginResponse {
        session_token,
        user: user.into(),
    })
}

/// Closes the session behind a token.
///
/// # Errors
///
/// Returns an error if the session delete fails.
pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<MessageResponse, ApiError> {
    AuthenticationService::logout(persistence, session_token)?;
    Ok(MessageResponse {
        message: String::from("Logged out"),
    })
}

/// Returns the profile behind a session token.
///
/// # Errors
///
/// Returns `AuthenticationFailed` for an unknown or expired session.
pub fn current_user(
    persistence: &mut Persistence,
    session_token: &str,
) -> Result<UserInfo, ApiError> {
    let user: User = AuthenticationService::validate_session(persistence, session_token)?;
    Ok(user.into())
}

/// Lists all user accounts.
///
/// # Errors
///
/// Returns `Unauthorized` for non-admins.
pub fn list_users(persistence: &mut Persistence, actor: &User) -> Result<Vec<UserInfo>, ApiError> {
    AuthorizationService::authorize_manage_users(actor)?;
    let users: Vec<User> = persistence
        .list_users()
        .map_err(|e| translate_persistence_error("user", e))?;
    Ok(users.into_iter().map(UserInfo::from).collect())
}

/// Retrieves a single user account.
///
/// # Errors
///
/// Returns `Unauthorized` for non-admins and `NotFound` for a missing
/// user.
pub fn get_user(
    persistence: &mut Persistence,
    actor: &User,
    user_id: i64,
) -> Result<UserInfo, ApiError> {
    AuthorizationService::authorize_manage_users(actor)?;
    let user: User = fetch_user(persistence, user_id)?;
    Ok(user.into())
}

/// Creates a user directly as an active, verified account.
///
/// Administrative bypass of the onboarding state machine; no
/// verification or approval emails fire.
///
/// # Errors
///
/// Returns `Unauthorized` for non-admins and validation, reference, or
/// conflict errors per the taxonomy.
pub fn create_user(
    persistence: &mut Persistence,
    defaults: &RoleDefaults,
    actor: &User,
    request: &RegisterRequest,
) -> Result<UserInfo, ApiError> {
    AuthorizationService::authorize_manage_users(actor)?;

    let validated: ValidatedRegistration = validate_registration(persistence, defaults, request)?;

    let user = User {
        user_id: None,
        first_name: request.first_name.clone(),
        last_name: request.last_name.clone(),
        username: validated.username,
        email: validated.email,
        birthday: request.birthday.clone(),
        password_hash: validated.password_hash,
        role: validated.role,
        department_id: validated.department_id,
        default_department_id: validated.default_department_id,
        status: UserStatus::Active,
        email_verified: true,
        email_verification_token: None,
    };

    let user_id: i64 = persistence
        .create_user(&user)
        .map_err(|e| translate_persistence_error("user", e))?;

    info!(user_id, "User created by admin");

    let created: User = fetch_user(persistence, user_id)?;
    Ok(created.into())
}

/// Updates a user's profile, role, and department.
///
/// A department change is routed through the membership ledger.
///
/// # Errors
///
/// Returns `Unauthorized` for non-admins, `NotFound` for a missing
/// user, and validation or reference errors per the taxonomy.
pub fn update_user(
    persistence: &mut Persistence,
    actor: &User,
    user_id: i64,
    request: &UpdateUserRequest,
) -> Result<UserInfo, ApiError> {
    AuthorizationService::authorize_manage_users(actor)?;

    let user: User = fetch_user(persistence, user_id)?;

    let email: String = normalize_email(&request.email);
    validate_email(&email).map_err(translate_domain_error)?;
    if let Some(birthday) = request.birthday.as_deref() {
        validate_birthday(birthday, Local::now().date_naive()).map_err(translate_domain_error)?;
    }
    let role: Option<Role> = request
        .role
        .as_deref()
        .map(Role::parse)
        .transpose()
        .map_err(translate_domain_error)?;

    persistence
        .update_user_profile(
            user_id,
            &request.first_name,
            &request.last_name,
            &email,
            request.birthday.as_deref(),
        )
        .map_err(|e| translate_persistence_error("user", e))?;

    if let Some(role) = role {
        persistence
            .set_user_role(user_id, role.as_str())
            .map_err(|e| translate_persistence_error("user", e))?;
    }

    if let Some(new_department_id) = request.department_id
        && user.department_id != Some(new_department_id)
    {
        require_department(persistence, new_department_id)?;
        persistence
            .reassign_user_department(user_id, user.department_id, new_department_id)
            .map_err(|e| translate_persistence_error("department", e))?;
    }

    let updated: User = fetch_user(persistence, user_id)?;
    Ok(updated.into())
}

/// Deletes a user account.
///
/// # Errors
///
/// Returns `Unauthorized` for non-admins, `NotFound` for a missing
/// user, and `Conflict` when tickets still reference the account.
pub fn delete_user(
    persistence: &mut Persistence,
    actor: &User,
    user_id: i64,
) -> Result<MessageResponse, ApiError> {
    AuthorizationService::authorize_manage_users(actor)?;

    persistence.delete_user(user_id).map_err(|e| match e {
        PersistenceError::ForeignKeyViolation(_) => ApiError::Conflict {
            message: format!("Cannot delete user {user_id}: tickets still reference this account"),
        },
        other => translate_persistence_error("user", other),
    })?;

    info!(user_id, "User deleted");
    Ok(MessageResponse {
        message: format!("User {user_id} deleted"),
    })
}

// ============================================================================
// Departments
// ============================================================================

fn validate_department_references(
    persistence: &mut Persistence,
    supervisor_id: Option<i64>,
    manager_id: Option<i64>,
    parent_department_id: Option<i64>,
) -> Result<(), ApiError> {
    if let Some(id) = supervisor_id {
        require_user(persistence, id)?;
    }
    if let Some(id) = manager_id {
        require_user(persistence, id)?;
    }
    if let Some(id) = parent_department_id {
        require_department(persistence, id)?;
    }
    Ok(())
}

/// Creates a department.
///
/// # Errors
///
/// Returns `Unauthorized` for non-admins, `Conflict` for a duplicate
/// name, and reference errors for missing supervisor, manager, or
/// parent.
pub fn create_department(
    persistence: &mut Persistence,
    actor: &User,
    request: &CreateDepartmentRequest,
) -> Result<DepartmentInfo, ApiError> {
    AuthorizationService::authorize_manage_departments(actor)?;

    if request.name.trim().is_empty() {
        return Err(ApiError::ValidationError {
            field: String::from("name"),
            message: String::from("name must not be empty"),
        });
    }
    validate_department_references(
        persistence,
        request.supervisor_id,
        request.manager_id,
        request.parent_department_id,
    )?;

    let department = Department {
        department_id: None,
        name: request.name.clone(),
        code: request.code.clone(),
        description: request.description.clone(),
        supervisor_id: request.supervisor_id,
        manager_id: request.manager_id,
        parent_department_id: request.parent_department_id,
    };
    let department_id: i64 = persistence
        .create_department(&department)
        .map_err(|e| translate_persistence_error("department", e))?;

    info!(department_id, name = %request.name, "Department created");

    let created: Department = fetch_department(persistence, department_id)?;
    Ok(created.into())
}

/// Updates a department's metadata.
///
/// # Errors
///
/// Returns `Unauthorized` for non-admins, `NotFound` for a missing
/// department, and reference or conflict errors per the taxonomy.
pub fn update_department(
    persistence: &mut Persistence,
    actor: &User,
    department_id: i64,
    request: &UpdateDepartmentRequest,
) -> Result<DepartmentInfo, ApiError> {
    AuthorizationService::authorize_manage_departments(actor)?;

    fetch_department(persistence, department_id)?;

    if request.name.trim().is_empty() {
        return Err(ApiError::ValidationError {
            field: String::from("name"),
            message: String::from("name must not be empty"),
        });
    }
    validate_department_references(
        persistence,
        request.supervisor_id,
        request.manager_id,
        request.parent_department_id,
    )?;

    let department = Department {
        department_id: Some(department_id),
        name: request.name.clone(),
        code: request.code.clone(),
        description: request.description.clone(),
        supervisor_id: request.supervisor_id,
        manager_id: request.manager_id,
        parent_department_id: request.parent_department_id,
    };
    persistence
        .update_department(department_id, &department)
        .map_err(|e| translate_persistence_error("department", e))?;

    let updated: Department = fetch_department(persistence, department_id)?;
    Ok(updated.into())
}

/// Deletes an empty department.
///
/// The delete refuses rather than cascades: remaining members or
/// topics make it a `Conflict`.
///
/// # Errors
///
/// Returns `Unauthorized` for non-admins, `NotFound` for a missing
/// department, and `Conflict` while dependents remain.
pub fn delete_department(
    persistence: &mut Persistence,
    actor: &User,
    department_id: i64,
) -> Result<MessageResponse, ApiError> {
    AuthorizationService::authorize_delete_department(actor)?;

    fetch_department(persistence, department_id)?;

    let members: i64 = persistence
        .count_department_members(department_id)
        .map_err(|e| translate_persistence_error("department", e))?;
    let topics: i64 = persistence
        .count_department_topics(department_id)
        .map_err(|e| translate_persistence_error("department", e))?;
    guard_department_delete(members, topics).map_err(translate_core_error)?;

    persistence
        .delete_department(department_id)
        .map_err(|e| translate_persistence_error("department", e))?;

    info!(department_id, "Department deleted");
    Ok(MessageResponse {
        message: format!("Department {department_id} deleted"),
    })
}

/// Lists all departments.
///
/// # Errors
///
/// Returns an error if the lookup fails.
pub fn list_departments(persistence: &mut Persistence) -> Result<Vec<DepartmentInfo>, ApiError> {
    let departments: Vec<Department> = persistence
        .list_departments()
        .map_err(|e| translate_persistence_error("department", e))?;
    Ok(departments.into_iter().map(DepartmentInfo::from).collect())
}

/// Retrieves a single department.
///
/// # Errors
///
/// Returns `NotFound` for a missing department.
pub fn get_department(
    persistence: &mut Persistence,
    department_id: i64,
) -> Result<DepartmentInfo, ApiError> {
    let department: Department = fetch_department(persistence, department_id)?;
    Ok(department.into())
}

// ============================================================================
// Topics
// ============================================================================

/// Creates a topic owned by a department.
///
/// # Errors
///
/// Returns `Unauthorized` below manager, `Conflict` for a duplicate
/// name, and a reference error for a missing department.
pub fn create_topic(
    persistence: &mut Persistence,
    actor: &User,
    request: &CreateTopicRequest,
) -> Result<TopicInfo, ApiError> {
    AuthorizationService::authorize_manage_topics(actor)?;

    if request.name.trim().is_empty() {
        return Err(ApiError::ValidationError {
            field: String::from("name"),
            message: String::from("name must not be empty"),
        });
    }
    let category: TopicCategory =
        TopicCategory::parse(&request.category).map_err(translate_domain_error)?;
    require_department(persistence, request.department_id)?;

    let topic = Topic {
        topic_id: None,
        name: request.name.clone(),
        category,
        subcategory: request.subcategory.clone(),
        description: request.description.clone(),
        department_id: request.department_id,
        version: 1,
    };
    let topic_id: i64 = persistence
        .create_topic(&topic)
        .map_err(|e| translate_persistence_error("topic", e))?;

    info!(topic_id, name = %request.name, "Topic created");

    let created: Topic = fetch_topic(persistence, topic_id)?;
    Ok(created.into())
}

/// Updates a topic, moving it between departments when the owner
/// changes.
///
/// # Errors
///
/// Returns `Unauthorized` below manager, `NotFound` for a missing
/// topic, and validation or reference errors per the taxonomy.
pub fn update_topic(
    persistence: &mut Persistence,
    actor: &User,
    topic_id: i64,
    request: &UpdateTopicRequest,
) -> Result<TopicInfo, ApiError> {
    AuthorizationService::authorize_manage_topics(actor)?;

    let topic: Topic = fetch_topic(persistence, topic_id)?;

    if request.name.trim().is_empty() {
        return Err(ApiError::ValidationError {
            field: String::from("name"),
            message: String::from("name must not be empty"),
        });
    }
    let category: TopicCategory =
        TopicCategory::parse(&request.category).map_err(translate_domain_error)?;
    if request.department_id != topic.department_id {
        require_department(persistence, request.department_id)?;
    }

    let updated = Topic {
        topic_id: Some(topic_id),
        name: request.name.clone(),
        category,
        subcategory: request.subcategory.clone(),
        description: request.description.clone(),
        department_id: request.department_id,
        version: topic.version,
    };
    persistence
        .update_topic(topic_id, topic.department_id, &updated)
        .map_err(|e| translate_persistence_error("topic", e))?;

    let stored: Topic = fetch_topic(persistence, topic_id)?;
    Ok(stored.into())
}

/// Deletes a topic and its ledger row.
///
/// # Errors
///
/// Returns `Unauthorized` below manager and `NotFound` for a missing
/// topic.
pub fn delete_topic(
    persistence: &mut Persistence,
    actor: &User,
    topic_id: i64,
) -> Result<MessageResponse, ApiError> {
    AuthorizationService::authorize_manage_topics(actor)?;

    let topic: Topic = fetch_topic(persistence, topic_id)?;
    persistence
        .delete_topic(topic_id, topic.department_id)
        .map_err(|e| translate_persistence_error("topic", e))?;

    info!(topic_id, "Topic deleted");
    Ok(MessageResponse {
        message: format!("Topic {topic_id} deleted"),
    })
}

/// Lists all topics.
///
/// # Errors
///
/// Returns an error if the lookup fails.
pub fn list_topics(persistence: &mut Persistence) -> Result<Vec<TopicInfo>, ApiError> {
    let topics: Vec<Topic> = persistence
        .list_topics()
        .map_err(|e| translate_persistence_error("topic", e))?;
    Ok(topics.into_iter().map(TopicInfo::from).collect())
}

/// Lists the topics owned by a department.
///
/// # Errors
///
/// Returns `NotFound` for a missing department.
pub fn list_topics_for_department(
    persistence: &mut Persistence,
    department_id: i64,
) -> Result<Vec<TopicInfo>, ApiError> {
    fetch_department(persistence, department_id)?;
    let topics: Vec<Topic> = persistence
        .list_topics_for_department(department_id)
        .map_err(|e| translate_persistence_error("topic", e))?;
    Ok(topics.into_iter().map(TopicInfo::from).collect())
}

/// Lists the topics filed under a category.
///
/// # Errors
///
/// Returns `ValidationError` for an unknown category.
pub fn list_topics_by_category(
    persistence: &mut Persistence,
    category: &str,
) -> Result<Vec<TopicInfo>, ApiError> {
    let category: TopicCategory = TopicCategory::parse(category).map_err(translate_domain_error)?;
    let topics: Vec<Topic> = persistence
        .list_topics_by_category(category)
        .map_err(|e| translate_persistence_error("topic", e))?;
    Ok(topics.into_iter().map(TopicInfo::from).collect())
}

/// Retrieves a single topic.
///
/// # Errors
///
/// Returns `NotFound` for a missing topic.
pub fn get_topic(persistence: &mut Persistence, topic_id: i64) -> Result<TopicInfo, ApiError> {
    let topic: Topic = fetch_topic(persistence, topic_id)?;
    Ok(topic.into())
}

// ============================================================================
// Tickets
// ============================================================================

/// Creates a ticket with a day-scoped generated number.
///
/// Attachment metadata is persisted verbatim. The department
/// supervisor and the initial assignee, when present, are notified
/// best-effort after the insert commits.
///
/// # Errors
///
/// Returns validation errors for the title, description, or priority
/// and reference errors for the topic, department, or assignee.
pub fn create_ticket(
    persistence: &mut Persistence,
    sender: &dyn NotificationSender,
    actor: &User,
    request: &CreateTicketRequest,
) -> Result<TicketInfo, ApiError> {
    validate_title(&request.title).map_err(translate_domain_error)?;
    validate_description(&request.description).map_err(translate_domain_error)?;
    let priority: TicketPriority = match request.priority.as_deref() {
        Some(value) => TicketPriority::parse(value).map_err(translate_domain_error)?,
        None => TicketPriority::default(),
    };

    let topic: Topic = require_topic(persistence, request.topic_id)?;
    let department_id: i64 = request.department_id.unwrap_or(topic.department_id);
    let department: Department = require_department(persistence, department_id)?;
    if let Some(assignee_id) = request.assigned_to_id {
        require_user(persistence, assignee_id)?;
    }

    let created_day: String = day_key(Local::now().date_naive());
    let (ticket_id, ticket_number) = persistence
        .create_ticket(&NewTicket {
            title: request.title.clone(),
            description: request.description.clone(),
            priority: priority.as_str().to_string(),
            author_id: actor_id(actor),
            department_id,
            topic_id: request.topic_id,
            created_day,
        })
        .map_err(|e| translate_persistence_error("ticket", e))?;

    for upload in &request.attachments {
        persistence
            .add_attachment(
                ticket_id,
                &Attachment {
                    filename: upload.filename.clone(),
                    storage_path: upload.storage_path.clone(),
                    mime_type: upload.mime_type.clone(),
                    size_bytes: upload.size_bytes,
                    uploaded_by: actor_id(actor),
                },
            )
            .map_err(|e| translate_persistence_error("ticket", e))?;
    }

    if let Some(assignee_id) = request.assigned_to_id
        && let Some(change) = assignment_change(None, Some(assignee_id))
    {
        let patch = TicketPatch {
            assigned_to_id: Some(Some(assignee_id)),
            ..TicketPatch::default()
        };
        persistence
            .apply_ticket_update(ticket_id, &patch, &[change], actor_id(actor))
            .map_err(|e| translate_persistence_error("ticket", e))?;
    }

    info!(ticket_id, ticket_number = %ticket_number, "Ticket created");

    if let Some(supervisor_id) = department.supervisor_id
        && let Ok(Some(supervisor)) = persistence.get_user_by_id(supervisor_id)
    {
        dispatch(
            sender,
            &Notification::TicketCreated {
                supervisor_email: supervisor.email,
                ticket_number: ticket_number.clone(),
                title: request.title.clone(),
            },
        );
    }
    if let Some(assignee_id) = request.assigned_to_id
        && let Ok(Some(assignee)) = persistence.get_user_by_id(assignee_id)
    {
        dispatch(
            sender,
            &Notification::TicketAssigned {
                assignee_email: assignee.email,
                ticket_number,
                title: request.title.clone(),
            },
        );
    }

    let ticket: Ticket = fetch_ticket(persistence, ticket_id)?;
    Ok(ticket.into())
}

/// Sends the notifications a committed ticket update warrants.
///
/// Lookup failures are silently skipped; the mutation has already
/// committed.
fn notify_ticket_changes(
    persistence: &mut Persistence,
    sender: &dyn NotificationSender,
    ticket: &Ticket,
    changes: &[FieldChange],
) {
    for change in changes {
        match change.field {
            "status" => {
                if let Ok(Some(author)) = persistence.get_user_by_id(ticket.author_id) {
                    dispatch(
                        sender,
                        &Notification::StatusChanged {
                            author_email: author.email,
                            ticket_number: ticket.ticket_number.clone(),
                            old_status: change.old_value.clone().unwrap_or_default(),
                            new_status: change.new_value.clone().unwrap_or_default(),
                        },
                    );
                }
            }
            "assigned_to_id" => {
                if let Some(new_value) = &change.new_value
                    && let Ok(assignee_id) = new_value.parse::<i64>()
                    && let Ok(Some(assignee)) = persistence.get_user_by_id(assignee_id)
                {
                    dispatch(
                        sender,
                        &Notification::TicketAssigned {
                            assignee_email: assignee.email,
                            ticket_number: ticket.ticket_number.clone(),
                            title: ticket.title.clone(),
                        },
                    );
                }
            }
            _ => {}
        }
    }
}

/// Applies a patch to a ticket through the field-diff engine.
///
/// One history row is written per recognized field whose value
/// actually changed; a patch that changes nothing writes none.
///
/// # Errors
///
/// Returns `NotFound` for a missing ticket and validation or reference
/// errors per the taxonomy.
pub fn update_ticket(
    persistence: &mut Persistence,
    sender: &dyn NotificationSender,
    actor: &User,
    ticket_id: i64,
    request: &UpdateTicketRequest,
) -> Result<TicketInfo, ApiError> {
    let ticket: Ticket = fetch_ticket(persistence, ticket_id)?;

    let status: Option<TicketStatus> = request
        .status
        .as_deref()
        .map(TicketStatus::parse)
        .transpose()
        .map_err(translate_domain_error)?;
    let priority: Option<TicketPriority> = request
        .priority
        .as_deref()
        .map(TicketPriority::parse)
        .transpose()
        .map_err(translate_domain_error)?;

    if let Some(Some(assignee_id)) = request.assigned_to_id {
        require_user(persistence, assignee_id)?;
    }
    if let Some(department_id) = request.department_id
        && department_id != ticket.department_id
    {
        require_department(persistence, department_id)?;
    }
    if let Some(topic_id) = request.topic_id
        && topic_id != ticket.topic_id
    {
        require_topic(persistence, topic_id)?;
    }

    let patch = TicketPatch {
        title: request.title.clone(),
        description: request.description.clone(),
        status,
        priority,
        progress: request.progress,
        assigned_to_id: request.assigned_to_id,
        department_id: request.department_id,
        topic_id: request.topic_id,
    };
    let changes: Vec<FieldChange> =
        compute_ticket_changes(&ticket, &patch).map_err(translate_core_error)?;

    persistence
        .apply_ticket_update(ticket_id, &patch, &changes, actor_id(actor))
        .map_err(|e| translate_persistence_error("ticket", e))?;

    notify_ticket_changes(persistence, sender, &ticket, &changes);

    let updated: Ticket = fetch_ticket(persistence, ticket_id)?;
    Ok(updated.into())
}

/// Changes a ticket's workflow status.
///
/// # Errors
///
/// Returns the same errors as [`update_ticket`].
pub fn update_ticket_status(
    persistence: &mut Persistence,
    sender: &dyn NotificationSender,
    actor: &User,
    ticket_id: i64,
    request: &UpdateStatusRequest,
) -> Result<TicketInfo, ApiError> {
    let patch = UpdateTicketRequest {
        status: Some(request.status.clone()),
        ..UpdateTicketRequest::default()
    };
    update_ticket(persistence, sender, actor, ticket_id, &patch)
}

/// Changes a ticket's priority.
///
/// # Errors
///
/// Returns the same errors as [`update_ticket`].
pub fn update_ticket_priority(
    persistence: &mut Persistence,
    sender: &dyn NotificationSender,
    actor: &User,
    ticket_id: i64,
    request: &UpdatePriorityRequest,
) -> Result<TicketInfo, ApiError> {
    let patch = UpdateTicketRequest {
        priority: Some(request.priority.clone()),
        ..UpdateTicketRequest::default()
    };
    update_ticket(persistence, sender, actor, ticket_id, &patch)
}

/// Assigns or unassigns a ticket.
///
/// # Errors
///
/// Returns the same errors as [`update_ticket`].
pub fn assign_ticket(
    persistence: &mut Persistence,
    sender: &dyn NotificationSender,
    actor: &User,
    ticket_id: i64,
    request: &AssignTicketRequest,
) -> Result<TicketInfo, ApiError> {
    let patch = UpdateTicketRequest {
        assigned_to_id: Some(request.assigned_to_id),
        ..UpdateTicketRequest::default()
    };
    update_ticket(persistence, sender, actor, ticket_id, &patch)
}

/// Appends a comment and its synthetic history row to a ticket.
///
/// # Errors
///
/// Returns `NotFound` for a missing ticket and a validation error for
/// empty content.
pub fn add_comment(
    persistence: &mut Persistence,
    sender: &dyn NotificationSender,
    actor: &User,
    ticket_id: i64,
    request: &CommentRequest,
) -> Result<TicketInfo, ApiError> {
    validate_comment_content(&request.content).map_err(translate_domain_error)?;

    let ticket: Ticket = fetch_ticket(persistence, ticket_id)?;

    persistence
        .add_comment(ticket_id, actor_id(actor), &request.content)
        .map_err(|e| translate_persistence_error("ticket", e))?;

    if let Ok(Some(author)) = persistence.get_user_by_id(ticket.author_id) {
        dispatch(
            sender,
            &Notification::CommentAdded {
                author_email: author.email,
                ticket_number: ticket.ticket_number.clone(),
                commenter: actor.username.clone(),
            },
        );
    }

    let updated: Ticket = fetch_ticket(persistence, ticket_id)?;
    Ok(updated.into())
}

/// Records attachment metadata against an existing ticket.
///
/// # Errors
///
/// Returns `NotFound` for a missing ticket.
pub fn add_attachment(
    persistence: &mut Persistence,
    actor: &User,
    ticket_id: i64,
    upload: &AttachmentUpload,
) -> Result<TicketInfo, ApiError> {
    fetch_ticket(persistence, ticket_id)?;

    persistence
        .add_attachment(
            ticket_id,
            &Attachment {
                filename: upload.filename.clone(),
                storage_path: upload.storage_path.clone(),
                mime_type: upload.mime_type.clone(),
                size_bytes: upload.size_bytes,
                uploaded_by: actor_id(actor),
            },
        )
        .map_err(|e| translate_persistence_error("ticket", e))?;

    let updated: Ticket = fetch_ticket(persistence, ticket_id)?;
    Ok(updated.into())
}

/// Marks a ticket for escalation to another department.
///
/// # Errors
///
/// Returns `NotFound` for a missing ticket, `InvalidState` when an
/// escalation is already pending, and a reference error for a missing
/// target department.
pub fn escalate_ticket(
    persistence: &mut Persistence,
    actor: &User,
    ticket_id: i64,
    request: &EscalateTicketRequest,
) -> Result<TicketInfo, ApiError> {
    let ticket: Ticket = fetch_ticket(persistence, ticket_id)?;

    if ticket.escalated_to_department_id.is_some() {
        return Err(translate_core_error(CoreError::EscalationPending));
    }
    require_department(persistence, request.department_id)?;

    persistence
        .escalate_ticket(ticket_id, request.department_id, actor_id(actor))
        .map_err(|e| translate_persistence_error("ticket", e))?;

    info!(
        ticket_id,
        target_department_id = request.department_id,
        "Ticket escalated"
    );

    let updated: Ticket = fetch_ticket(persistence, ticket_id)?;
    Ok(updated.into())
}

/// Approves a pending escalation, moving the ticket's department.
///
/// # Errors
///
/// Returns `Unauthorized` below manager, `NotFound` for a missing
/// ticket, and `InvalidState` when no escalation is pending.
pub fn approve_escalation(
    persistence: &mut Persistence,
    actor: &User,
    ticket_id: i64,
) -> Result<TicketInfo, ApiError> {
    AuthorizationService::authorize_approve_escalation(actor)?;

    let ticket: Ticket = fetch_ticket(persistence, ticket_id)?;
    let target_department_id: i64 = ticket
        .escalated_to_department_id
        .ok_or_else(|| translate_core_error(CoreError::NoEscalationPending))?;

    persistence
        .approve_escalation(
            ticket_id,
            ticket.department_id,
            target_department_id,
            actor_id(actor),
        )
        .map_err(|e| translate_persistence_error("ticket", e))?;

    info!(ticket_id, target_department_id, "Escalation approved");

    let updated: Ticket = fetch_ticket(persistence, ticket_id)?;
    Ok(updated.into())
}

/// Retrieves a ticket with its comments, history, and attachments.
///
/// # Errors
///
/// Returns `NotFound` for a missing ticket.
pub fn get_ticket(persistence: &mut Persistence, ticket_id: i64) -> Result<TicketInfo, ApiError> {
    let ticket: Ticket = fetch_ticket(persistence, ticket_id)?;
    Ok(ticket.into())
}

/// Retrieves a ticket by its human-facing number.
///
/// # Errors
///
/// Returns `NotFound` for an unknown number.
pub fn get_ticket_by_number(
    persistence: &mut Persistence,
    ticket_number: &str,
) -> Result<TicketInfo, ApiError> {
    let ticket: Ticket = persistence
        .get_ticket_by_number(ticket_number)
        .map_err(|e| translate_persistence_error("ticket", e))?
        .ok_or_else(|| ApiError::NotFound {
            resource_type: String::from("ticket"),
            message: format!("Ticket {ticket_number} not found"),
        })?;
    Ok(ticket.into())
}

/// Lists all tickets, newest first.
///
/// # Errors
///
/// Returns an error if the lookup fails.
pub fn list_tickets(persistence: &mut Persistence) -> Result<Vec<TicketInfo>, ApiError> {
    let tickets: Vec<Ticket> = persistence
        .list_tickets()
        .map_err(|e| translate_persistence_error("ticket", e))?;
    Ok(tickets.into_iter().map(TicketInfo::from).collect())
}

/// Lists the tickets owned by a department, newest first.
///
/// # Errors
///
/// Returns `NotFound` for a missing department.
pub fn list_tickets_for_department(
    persistence: &mut Persistence,
    department_id: i64,
) -> Result<Vec<TicketInfo>, ApiError> {
    fetch_department(persistence, department_id)?;
    let tickets: Vec<Ticket> = persistence
        .list_tickets_for_department(department_id)
        .map_err(|e| translate_persistence_error("ticket", e))?;
    Ok(tickets.into_iter().map(TicketInfo::from).collect())
}

/// Lists the tickets the actor authored or is assigned to.
///
/// # Errors
///
/// Returns an error if the lookup fails.
pub fn list_my_tickets(
    persistence: &mut Persistence,
    actor: &User,
) -> Result<Vec<TicketInfo>, ApiError> {
    let tickets: Vec<Ticket> = persistence
        .list_tickets_for_user(actor_id(actor))
        .map_err(|e| translate_persistence_error("ticket", e))?;
    Ok(tickets.into_iter().map(TicketInfo::from).collect())
}
