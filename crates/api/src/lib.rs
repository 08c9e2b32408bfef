// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The API boundary of the helpdesk.
//!
//! Handlers in this crate validate input, enforce role gates, drive the
//! core engines against the store, and translate every lower-layer
//! error into the stable [`ApiError`] taxonomy. Request and response
//! DTOs are distinct from domain types and carry the wire contract.

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

pub mod auth;
pub mod error;
pub mod handlers;
pub mod password_policy;
pub mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticationService, AuthorizationService};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use handlers::{
    add_attachment, add_comment, approve_escalation, approve_user, assign_ticket, create_department,
    create_ticket, create_topic, create_user, current_user, deactivate_user, delete_department,
    delete_topic, delete_user, escalate_ticket, get_department, get_ticket, get_ticket_by_number,
    get_topic, get_user, list_departments, list_my_tickets, list_tickets,
    list_tickets_for_department, list_topics, list_topics_by_category,
    list_topics_for_department, list_users, login, logout,
    register_user, update_department, update_ticket, update_ticket_priority, update_ticket_status,
    update_topic, update_user, verify_email,
};
pub use password_policy::{PasswordPolicy, PasswordPolicyError};
pub use request_response::{
    AssignTicketRequest, AttachmentInfo, AttachmentUpload, CommentInfo, CommentRequest,
    CreateDepartmentRequest, CreateTicketRequest, CreateTopicRequest, DepartmentInfo,
    EscalateTicketRequest, HistoryEntryInfo, LoginRequest, LoginResponse, MessageResponse,
    RegisterRequest, RegisterResponse, TicketInfo, TopicInfo, UpdateDepartmentRequest,
    UpdatePriorityRequest, UpdateStatusRequest, UpdateTicketRequest, UpdateTopicRequest,
    UpdateUserRequest, UserInfo, VerifyEmailRequest,
};
