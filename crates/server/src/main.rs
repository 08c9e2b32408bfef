// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod session;

use axum::{
    Json, Router,
    extract::{Path, State as AxumState},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use helpdesk_api::{
    ApiError, AssignTicketRequest, AttachmentUpload, CommentRequest, CreateDepartmentRequest,
    CreateTicketRequest, CreateTopicRequest, DepartmentInfo, EscalateTicketRequest, LoginRequest,
    LoginResponse, MessageResponse, RegisterRequest, RegisterResponse, TicketInfo, TopicInfo,
    UpdateDepartmentRequest, UpdatePriorityRequest, UpdateStatusRequest, UpdateTicketRequest,
    UpdateTopicRequest, UpdateUserRequest, UserInfo, VerifyEmailRequest, handlers,
};
use helpdesk_core::RoleDefaults;
use helpdesk_domain::{Department, Role, User, UserStatus};
use helpdesk_notify::{LoggingSender, NotificationSender};
use helpdesk_persistence::{Persistence, PersistenceError};

use crate::session::SessionUser;

/// Helpdesk Server - HTTP server for the helpdesk backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Name of the fallback department for admins registering without one.
    /// Created at startup if it does not exist.
    #[arg(long)]
    admin_department: Option<String>,

    /// Name of the fallback department for managers registering without one.
    /// Created at startup if it does not exist.
    #[arg(long)]
    manager_department: Option<String>,

    /// Username for a bootstrap admin account, created active at startup
    /// when the username is not yet taken.
    #[arg(long, requires = "bootstrap_admin_email", requires = "bootstrap_admin_password")]
    bootstrap_admin_username: Option<String>,

    /// Email for the bootstrap admin account.
    #[arg(long)]
    bootstrap_admin_email: Option<String>,

    /// Password for the bootstrap admin account.
    #[arg(long)]
    bootstrap_admin_password: Option<String>,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The store, serialized behind a mutex.
    persistence: Arc<Mutex<Persistence>>,
    /// Fallback departments for privileged roles, resolved at startup.
    defaults: Arc<RoleDefaults>,
    /// The notification transport.
    sender: Arc<dyn NotificationSender>,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::ValidationError { .. }
            | ApiError::AgeRestriction { .. }
            | ApiError::InvalidToken { .. } => StatusCode::BAD_REQUEST,
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } | ApiError::InvalidState { .. } => StatusCode::CONFLICT,
            ApiError::InvalidReference { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Identity & onboarding
// ============================================================================

async fn handle_register(
    AxumState(app_state): AxumState<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RegisterResponse = handlers::register_user(
        &mut persistence,
        &app_state.defaults,
        app_state.sender.as_ref(),
        &request,
    )?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_verify_email(
    AxumState(app_state): AxumState<AppState>,
    Json(request): Json<VerifyEmailRequest>,
) -> Result<Json<MessageResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: MessageResponse =
        handlers::verify_email(&mut persistence, app_state.sender.as_ref(), &request)?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: LoginResponse = handlers::login(&mut persistence, &request)?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, HttpError> {
    let token: String = headers
        .get(session::AUTH_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
        .ok_or_else(|| HttpError {
            status: StatusCode::UNAUTHORIZED,
            message: format!("Missing {} header", session::AUTH_TOKEN_HEADER),
        })?;
    let mut persistence = app_state.persistence.lock().await;
    let response: MessageResponse = handlers::logout(&mut persistence, &token)?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_me(SessionUser(user): SessionUser) -> Json<UserInfo> {
    Json(user.into())
}

async fn handle_list_users(
    SessionUser(actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<Vec<UserInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: Vec<UserInfo> = handlers::list_users(&mut persistence, &actor)?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_create_user(
    SessionUser(actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<UserInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: UserInfo =
        handlers::create_user(&mut persistence, &app_state.defaults, &actor, &request)?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_get_user(
    SessionUser(actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: UserInfo = handlers::get_user(&mut persistence, &actor, user_id)?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_update_user(
    SessionUser(actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Path(user_id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: UserInfo = handlers::update_user(&mut persistence, &actor, user_id, &request)?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_delete_user(
    SessionUser(actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<MessageResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: MessageResponse = handlers::delete_user(&mut persistence, &actor, user_id)?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_approve_user(
    SessionUser(actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: UserInfo = handlers::approve_user(
        &mut persistence,
        app_state.sender.as_ref(),
        &actor,
        user_id,
    )?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_deactivate_user(
    SessionUser(actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: UserInfo = handlers::deactivate_user(&mut persistence, &actor, user_id)?;
    drop(persistence);
    Ok(Json(response))
}

// ============================================================================
// Departments
// ============================================================================

async fn handle_create_department(
    SessionUser(actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Json(request): Json<CreateDepartmentRequest>,
) -> Result<Json<DepartmentInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: DepartmentInfo =
        handlers::create_department(&mut persistence, &actor, &request)?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_list_departments(
    SessionUser(_actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<Vec<DepartmentInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: Vec<DepartmentInfo> = handlers::list_departments(&mut persistence)?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_get_department(
    SessionUser(_actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Path(department_id): Path<i64>,
) -> Result<Json<DepartmentInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: DepartmentInfo = handlers::get_department(&mut persistence, department_id)?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_update_department(
    SessionUser(actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Path(department_id): Path<i64>,
    Json(request): Json<UpdateDepartmentRequest>,
) -> Result<Json<DepartmentInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: DepartmentInfo =
        handlers::update_department(&mut persistence, &actor, department_id, &request)?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_delete_department(
    SessionUser(actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Path(department_id): Path<i64>,
) -> Result<Json<MessageResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: MessageResponse =
        handlers::delete_department(&mut persistence, &actor, department_id)?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_list_department_topics(
    SessionUser(_actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Path(department_id): Path<i64>,
) -> Result<Json<Vec<TopicInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: Vec<TopicInfo> =
        handlers::list_topics_for_department(&mut persistence, department_id)?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_list_department_tickets(
    SessionUser(_actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Path(department_id): Path<i64>,
) -> Result<Json<Vec<TicketInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: Vec<TicketInfo> =
        handlers::list_tickets_for_department(&mut persistence, department_id)?;
    drop(persistence);
    Ok(Json(response))
}

// ============================================================================
// Topics
// ============================================================================

async fn handle_create_topic(
    SessionUser(actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Json(request): Json<CreateTopicRequest>,
) -> Result<Json<TopicInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: TopicInfo = handlers::create_topic(&mut persistence, &actor, &request)?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_list_topics(
    SessionUser(_actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<Vec<TopicInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: Vec<TopicInfo> = handlers::list_topics(&mut persistence)?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_list_topics_by_category(
    SessionUser(_actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<TopicInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: Vec<TopicInfo> =
        handlers::list_topics_by_category(&mut persistence, &category)?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_get_topic(
    SessionUser(_actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Path(topic_id): Path<i64>,
) -> Result<Json<TopicInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: TopicInfo = handlers::get_topic(&mut persistence, topic_id)?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_update_topic(
    SessionUser(actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Path(topic_id): Path<i64>,
    Json(request): Json<UpdateTopicRequest>,
) -> Result<Json<TopicInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: TopicInfo = handlers::update_topic(&mut persistence, &actor, topic_id, &request)?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_delete_topic(
    SessionUser(actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Path(topic_id): Path<i64>,
) -> Result<Json<MessageResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: MessageResponse = handlers::delete_topic(&mut persistence, &actor, topic_id)?;
    drop(persistence);
    Ok(Json(response))
}

// ============================================================================
// Tickets
// ============================================================================

async fn handle_create_ticket(
    SessionUser(actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Json(request): Json<CreateTicketRequest>,
) -> Result<Json<TicketInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: TicketInfo = handlers::create_ticket(
        &mut persistence,
        app_state.sender.as_ref(),
        &actor,
        &request,
    )?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_list_tickets(
    SessionUser(_actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<Vec<TicketInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: Vec<TicketInfo> = handlers::list_tickets(&mut persistence)?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_list_my_tickets(
    SessionUser(actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<Vec<TicketInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: Vec<TicketInfo> = handlers::list_my_tickets(&mut persistence, &actor)?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_get_ticket(
    SessionUser(_actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Path(ticket_id): Path<i64>,
) -> Result<Json<TicketInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: TicketInfo = handlers::get_ticket(&mut persistence, ticket_id)?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_get_ticket_by_number(
    SessionUser(_actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Path(ticket_number): Path<String>,
) -> Result<Json<TicketInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: TicketInfo = handlers::get_ticket_by_number(&mut persistence, &ticket_number)?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_update_ticket(
    SessionUser(actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Path(ticket_id): Path<i64>,
    Json(request): Json<UpdateTicketRequest>,
) -> Result<Json<TicketInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: TicketInfo = handlers::update_ticket(
        &mut persistence,
        app_state.sender.as_ref(),
        &actor,
        ticket_id,
        &request,
    )?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_update_ticket_status(
    SessionUser(actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Path(ticket_id): Path<i64>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<TicketInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: TicketInfo = handlers::update_ticket_status(
        &mut persistence,
        app_state.sender.as_ref(),
        &actor,
        ticket_id,
        &request,
    )?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_update_ticket_priority(
    SessionUser(actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Path(ticket_id): Path<i64>,
    Json(request): Json<UpdatePriorityRequest>,
) -> Result<Json<TicketInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: TicketInfo = handlers::update_ticket_priority(
        &mut persistence,
        app_state.sender.as_ref(),
        &actor,
        ticket_id,
        &request,
    )?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_assign_ticket(
    SessionUser(actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Path(ticket_id): Path<i64>,
    Json(request): Json<AssignTicketRequest>,
) -> Result<Json<TicketInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: TicketInfo = handlers::assign_ticket(
        &mut persistence,
        app_state.sender.as_ref(),
        &actor,
        ticket_id,
        &request,
    )?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_add_comment(
    SessionUser(actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Path(ticket_id): Path<i64>,
    Json(request): Json<CommentRequest>,
) -> Result<Json<TicketInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: TicketInfo = handlers::add_comment(
        &mut persistence,
        app_state.sender.as_ref(),
        &actor,
        ticket_id,
        &request,
    )?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_add_attachment(
    SessionUser(actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Path(ticket_id): Path<i64>,
    Json(request): Json<AttachmentUpload>,
) -> Result<Json<TicketInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: TicketInfo =
        handlers::add_attachment(&mut persistence, &actor, ticket_id, &request)?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_escalate_ticket(
    SessionUser(actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Path(ticket_id): Path<i64>,
    Json(request): Json<EscalateTicketRequest>,
) -> Result<Json<TicketInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: TicketInfo =
        handlers::escalate_ticket(&mut persistence, &actor, ticket_id, &request)?;
    drop(persistence);
    Ok(Json(response))
}

async fn handle_approve_escalation(
    SessionUser(actor): SessionUser,
    AxumState(app_state): AxumState<AppState>,
    Path(ticket_id): Path<i64>,
) -> Result<Json<TicketInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: TicketInfo =
        handlers::approve_escalation(&mut persistence, &actor, ticket_id)?;
    drop(persistence);
    Ok(Json(response))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/register", post(handle_register))
        .route("/verify_email", post(handle_verify_email))
        .route("/login", post(handle_login))
        .route("/logout", post(handle_logout))
        .route("/me", get(handle_me))
        .route("/users", get(handle_list_users).post(handle_create_user))
        .route(
            "/users/{user_id}",
            get(handle_get_user)
                .put(handle_update_user)
                .delete(handle_delete_user),
        )
        .route("/users/{user_id}/approve", post(handle_approve_user))
        .route("/users/{user_id}/deactivate", post(handle_deactivate_user))
        .route(
            "/departments",
            get(handle_list_departments).post(handle_create_department),
        )
        .route(
            "/departments/{department_id}",
            get(handle_get_department)
                .put(handle_update_department)
                .delete(handle_delete_department),
        )
        .route(
            "/departments/{department_id}/topics",
            get(handle_list_department_topics),
        )
        .route(
            "/departments/{department_id}/tickets",
            get(handle_list_department_tickets),
        )
        .route("/topics", get(handle_list_topics).post(handle_create_topic))
        .route(
            "/topics/category/{category}",
            get(handle_list_topics_by_category),
        )
        .route(
            "/topics/{topic_id}",
            get(handle_get_topic)
                .put(handle_update_topic)
                .delete(handle_delete_topic),
        )
        .route("/tickets", get(handle_list_tickets).post(handle_create_ticket))
        .route("/tickets/my", get(handle_list_my_tickets))
        .route(
            "/tickets/number/{ticket_number}",
            get(handle_get_ticket_by_number),
        )
        .route(
            "/tickets/{ticket_id}",
            get(handle_get_ticket).put(handle_update_ticket),
        )
        .route("/tickets/{ticket_id}/status", put(handle_update_ticket_status))
        .route(
            "/tickets/{ticket_id}/priority",
            put(handle_update_ticket_priority),
        )
        .route("/tickets/{ticket_id}/assign", put(handle_assign_ticket))
        .route("/tickets/{ticket_id}/comments", post(handle_add_comment))
        .route("/tickets/{ticket_id}/attachments", post(handle_add_attachment))
        .route("/tickets/{ticket_id}/escalate", post(handle_escalate_ticket))
        .route(
            "/tickets/{ticket_id}/approve_escalation",
            post(handle_approve_escalation),
        )
        .with_state(app_state)
}

/// Resolves a configured default department name to an id, creating
/// the department when it does not exist yet.
fn resolve_default_department(
    persistence: &mut Persistence,
    name: &str,
) -> Result<i64, PersistenceError> {
    if let Some(department) = persistence.get_department_by_name(name)? {
        return Ok(department.department_id.unwrap_or_default());
    }
    info!(name, "Creating configured default department");
    persistence.create_department(&Department {
        department_id: None,
        name: name.to_string(),
        code: None,
        description: None,
        supervisor_id: None,
        manager_id: None,
        parent_department_id: None,
    })
}

/// Resolves the role default departments named on the command line.
fn resolve_role_defaults(
    persistence: &mut Persistence,
    args: &Args,
) -> Result<RoleDefaults, PersistenceError> {
    let admin_department_id: Option<i64> = args
        .admin_department
        .as_deref()
        .map(|name| resolve_default_department(persistence, name))
        .transpose()?;
    let manager_department_id: Option<i64> = args
        .manager_department
        .as_deref()
        .map(|name| resolve_default_department(persistence, name))
        .transpose()?;
    Ok(RoleDefaults {
        admin_department_id,
        manager_department_id,
    })
}

/// Creates the bootstrap admin account unless the username is taken.
fn bootstrap_admin(
    persistence: &mut Persistence,
    username: &str,
    email: &str,
    password: &str,
    department_id: Option<i64>,
) -> Result<(), Box<dyn std::error::Error>> {
    if persistence.get_user_by_username(username)?.is_some() {
        info!(username, "Bootstrap admin already exists");
        return Ok(());
    }

    let password_hash: String = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
    let user_id: i64 = persistence.create_user(&User {
        user_id: None,
        first_name: String::from("System"),
        last_name: String::from("Administrator"),
        username: username.to_string(),
        email: email.to_string(),
        birthday: None,
        password_hash,
        role: Role::Admin,
        department_id,
        default_department_id: department_id,
        status: UserStatus::Active,
        email_verified: true,
        email_verification_token: None,
    })?;
    info!(user_id, username, "Bootstrap admin created");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Helpdesk Server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        warn!("Using in-memory database; data is lost on shutdown");
        Persistence::new_in_memory()?
    };

    let defaults: RoleDefaults = resolve_role_defaults(&mut persistence, &args)?;

    if let (Some(username), Some(email), Some(password)) = (
        args.bootstrap_admin_username.as_deref(),
        args.bootstrap_admin_email.as_deref(),
        args.bootstrap_admin_password.as_deref(),
    ) {
        bootstrap_admin(
            &mut persistence,
            username,
            email,
            password,
            defaults.admin_department_id,
        )?;
    }

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        defaults: Arc::new(defaults),
        sender: Arc::new(LoggingSender),
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode as HttpStatusCode},
    };
    use helpdesk_domain::{Topic, TopicCategory};
    use tower::ServiceExt;

    const TEST_PASSWORD: &str = "Sw0rdfish!";

    /// Helper to create test app state with in-memory persistence.
    fn create_test_app_state() -> AppState {
        let persistence: Persistence =
            Persistence::new_in_memory().expect("Failed to create in-memory persistence");
        AppState {
            persistence: Arc::new(Mutex::new(persistence)),
            defaults: Arc::new(RoleDefaults::default()),
            sender: Arc::new(LoggingSender),
        }
    }

    async fn seed_department(app_state: &AppState, name: &str) -> i64 {
        let mut persistence = app_state.persistence.lock().await;
        persistence
            .create_department(&Department {
                department_id: None,
                name: name.to_string(),
                code: None,
                description: None,
                supervisor_id: None,
                manager_id: None,
                parent_department_id: None,
            })
            .expect("department created")
    }

    async fn seed_topic(app_state: &AppState, name: &str, department_id: i64) -> i64 {
        let mut persistence = app_state.persistence.lock().await;
        persistence
            .create_topic(&Topic {
                topic_id: None,
                name: name.to_string(),
                category: TopicCategory::Software,
                subcategory: None,
                description: None,
                department_id,
                version: 1,
            })
            .expect("topic created")
    }

    async fn seed_account(
        app_state: &AppState,
        username: &str,
        role: Role,
        department_id: Option<i64>,
    ) -> i64 {
        let password_hash: String = bcrypt::hash(TEST_PASSWORD, 4).expect("password hashed");
        let mut persistence = app_state.persistence.lock().await;
        persistence
            .create_user(&User {
                user_id: None,
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
                username: username.to_string(),
                email: format!("{username}@example.com"),
                birthday: Some("15.03.1990".to_string()),
                password_hash,
                role,
                department_id,
                default_department_id: None,
                status: UserStatus::Active,
                email_verified: true,
                email_verification_token: None,
            })
            .expect("user created")
    }

    async fn login(app: &Router, username: &str) -> String {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/login")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "username": username,
                            "password": TEST_PASSWORD,
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::OK);
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let login_response: LoginResponse = serde_json::from_slice(&body_bytes).unwrap();
        login_response.session_token
    }

    #[tokio::test]
    async fn test_register_endpoint_creates_pending_account() {
        let app_state: AppState = create_test_app_state();
        let department_id: i64 = seed_department(&app_state, "Support").await;
        let app: Router = build_router(app_state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/register")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "first_name": "Jane",
                            "last_name": "Doe",
                            "username": "jane",
                            "email": "jane@example.com",
                            "password": "CorrectHorse7!",
                            "birthday": "15.03.1990",
                            "role": "agent",
                            "department_id": department_id,
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::OK);
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let register_response: RegisterResponse = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(register_response.user.username, "jane");
        assert_eq!(register_response.user.status, "pending_email");
    }

    #[tokio::test]
    async fn test_register_underage_is_bad_request() {
        let app_state: AppState = create_test_app_state();
        let department_id: i64 = seed_department(&app_state, "Support").await;
        let app: Router = build_router(app_state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/register")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "first_name": "Kid",
                            "last_name": "Doe",
                            "username": "kid",
                            "email": "kid@example.com",
                            "password": "CorrectHorse7!",
                            "birthday": "01.01.2020",
                            "role": "agent",
                            "department_id": department_id,
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_unknown_department_is_unprocessable() {
        let app_state: AppState = create_test_app_state();
        let app: Router = build_router(app_state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/register")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "first_name": "Jane",
                            "last_name": "Doe",
                            "username": "jane",
                            "email": "jane@example.com",
                            "password": "CorrectHorse7!",
                            "birthday": "15.03.1990",
                            "role": "agent",
                            "department_id": 999,
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_login_bad_credentials_is_unauthorized() {
        let app_state: AppState = create_test_app_state();
        let department_id: i64 = seed_department(&app_state, "Support").await;
        seed_account(&app_state, "jane", Role::Agent, Some(department_id)).await;
        let app: Router = build_router(app_state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/login")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "username": "jane",
                            "password": "wrong",
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_me_requires_session_token() {
        let app_state: AppState = create_test_app_state();
        let app: Router = build_router(app_state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_me_returns_session_user() {
        let app_state: AppState = create_test_app_state();
        let department_id: i64 = seed_department(&app_state, "Support").await;
        seed_account(&app_state, "jane", Role::Agent, Some(department_id)).await;
        let app: Router = build_router(app_state);
        let token: String = login(&app, "jane").await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/me")
                    .header(session::AUTH_TOKEN_HEADER, &token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::OK);
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let user: UserInfo = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(user.username, "jane");
    }

    #[tokio::test]
    async fn test_list_users_forbidden_for_agent() {
        let app_state: AppState = create_test_app_state();
        let department_id: i64 = seed_department(&app_state, "Support").await;
        seed_account(&app_state, "jane", Role::Agent, Some(department_id)).await;
        let app: Router = build_router(app_state);
        let token: String = login(&app, "jane").await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/users")
                    .header(session::AUTH_TOKEN_HEADER, &token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_delete_occupied_department_is_conflict() {
        let app_state: AppState = create_test_app_state();
        let department_id: i64 = seed_department(&app_state, "Support").await;
        seed_account(&app_state, "jane", Role::Agent, Some(department_id)).await;
        seed_account(&app_state, "root", Role::Admin, None).await;
        let app: Router = build_router(app_state);
        let token: String = login(&app, "root").await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/departments/{department_id}"))
                    .header(session::AUTH_TOKEN_HEADER, &token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::CONFLICT);
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error_response: ErrorResponse = serde_json::from_slice(&body_bytes).unwrap();
        assert!(error_response.error);
        assert!(error_response.message.contains("1 user(s)"));
    }

    #[tokio::test]
    async fn test_ticket_lifecycle_over_http() {
        let app_state: AppState = create_test_app_state();
        let department_id: i64 = seed_department(&app_state, "Support").await;
        let topic_id: i64 = seed_topic(&app_state, "Email", department_id).await;
        seed_account(&app_state, "jane", Role::Agent, Some(department_id)).await;
        let app: Router = build_router(app_state);
        let token: String = login(&app, "jane").await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/tickets")
                    .header("content-type", "application/json")
                    .header(session::AUTH_TOKEN_HEADER, &token)
                    .body(Body::from(
                        serde_json::json!({
                            "title": "Printer on fire",
                            "description": "Smoke is coming out of the office printer.",
                            "topic_id": topic_id,
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::OK);
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let ticket: TicketInfo = serde_json::from_slice(&body_bytes).unwrap();
        assert!(ticket.ticket_number.starts_with("TKT-"));
        assert_eq!(ticket.status, "open");
        assert_eq!(ticket.history.len(), 1);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(format!("/tickets/{}/priority", ticket.ticket_id))
                    .header("content-type", "application/json")
                    .header(session::AUTH_TOKEN_HEADER, &token)
                    .body(Body::from(
                        serde_json::json!({ "priority": "urgent" }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::OK);
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let updated: TicketInfo = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(updated.priority, "urgent");
        assert_eq!(updated.history.len(), 2);

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(format!("/tickets/number/{}", ticket.ticket_number))
                    .header(session::AUTH_TOKEN_HEADER, &token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_ticket_is_not_found() {
        let app_state: AppState = create_test_app_state();
        let department_id: i64 = seed_department(&app_state, "Support").await;
        seed_account(&app_state, "jane", Role::Agent, Some(department_id)).await;
        let app: Router = build_router(app_state);
        let token: String = login(&app, "jane").await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/tickets/999")
                    .header(session::AUTH_TOKEN_HEADER, &token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::NOT_FOUND);
    }
}
