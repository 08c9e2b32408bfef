// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the Helpdesk System.
//!
//! This crate provides `SQLite` persistence via Diesel for users,
//! departments, topics, tickets, and sessions.
//!
//! ## Backend
//!
//! `SQLite` is the only backend:
//! - File-based databases (with WAL) for deployments
//! - Unique shared in-memory databases for fast, deterministic tests
//!
//! Foreign key enforcement is verified at startup; the membership
//! ledger and ticket history rely on it.
//!
//! ## Testing Philosophy
//!
//! - Standard tests (`cargo test`) run against in-memory `SQLite`
//! - Each test database gets a unique name via an atomic counter
//! - Tests fail fast if foreign key enforcement is not active

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

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use helpdesk_core::{FieldChange, LedgerOp, TicketPatch};
use helpdesk_domain::{Attachment, Department, Ticket, Topic, TopicCategory, User, UserStatus};

/// Atomic counter for generating unique in-memory database names.
///
/// This ensures deterministic test isolation by eliminating time-based
/// collisions. Each call to `new_in_memory()` receives a unique
/// sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod sqlite;

#[cfg(test)]
mod tests;

pub use data_models::{NewTicket, SessionData};
pub use error::PersistenceError;

/// Persistence adapter for the helpdesk store.
///
/// Owns the Diesel connection; every operation borrows it mutably so
/// one adapter serves one sequential unit of work at a time.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite`
    /// database.
    ///
    /// Each call receives a unique database instance via atomic
    /// counter, ensuring deterministic test isolation without
    /// time-based collisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        // Create a unique shared in-memory database name per call so tests are isolated.
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("memdb_test_{db_id}");
        let shared_memory_url = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = sqlite::initialize_database(&shared_memory_url)?;
        sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite`
    /// database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or
    /// initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = sqlite::initialize_database(path_str)?;
        sqlite::enable_wal_mode(&mut conn)?;
        sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Creates a new user (and their membership-ledger row, when a
    /// department is set).
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the username or email already exists.
    pub fn create_user(&mut self, user: &User) -> Result<i64, PersistenceError> {
        mutations::users::create_user(&mut self.conn, user)
    }

    /// Retrieves a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_user_by_id(&mut self, user_id: i64) -> Result<Option<User>, PersistenceError> {
        queries::users::get_user_by_id(&mut self.conn, user_id)
    }

    /// Retrieves a user by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_user_by_username(
        &mut self,
        username: &str,
    ) -> Result<Option<User>, PersistenceError> {
        queries::users::get_user_by_username(&mut self.conn, username)
    }

    /// Retrieves a user by email address.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_user_by_email(&mut self, email: &str) -> Result<Option<User>, PersistenceError> {
        queries::users::get_user_by_email(&mut self.conn, email)
    }

    /// Retrieves a user by their email verification token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_user_by_verification_token(
        &mut self,
        token: &str,
    ) -> Result<Option<User>, PersistenceError> {
        queries::users::get_user_by_verification_token(&mut self.conn, token)
    }

    /// Lists all users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_users(&mut self) -> Result<Vec<User>, PersistenceError> {
        queries::users::list_users(&mut self.conn)
    }

    /// Lists the email addresses of active admins.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_active_admin_emails(&mut self) -> Result<Vec<String>, PersistenceError> {
        queries::users::list_active_admin_emails(&mut self.conn)
    }

    /// Updates a user's profile fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the user doesn't exist or the update fails.
    pub fn update_user_profile(
        &mut self,
        user_id: i64,
        first_name: &str,
        last_name: &str,
        email: &str,
        birthday: Option<&str>,
    ) -> Result<(), PersistenceError> {
        mutations::users::update_user_profile(
            &mut self.conn,
            user_id,
            first_name,
            last_name,
            email,
            birthday,
        )
    }

    /// Updates a user's role.
    ///
    /// # Errors
    ///
    /// Returns an error if the user doesn't exist or the update fails.
    pub fn set_user_role(&mut self, user_id: i64, role: &str) -> Result<(), PersistenceError> {
        mutations::users::set_user_role(&mut self.conn, user_id, role)
    }

    /// Updates a user's lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns an error if the user doesn't exist or the update fails.
    pub fn set_user_status(
        &mut self,
        user_id: i64,
        status: UserStatus,
    ) -> Result<(), PersistenceError> {
        mutations::users::set_user_status(&mut self.conn, user_id, status)
    }

    /// Consumes a user's email verification token, advancing them to
    /// `pending_admin`.
    ///
    /// # Errors
    ///
    /// Returns an error if the user doesn't exist or the update fails.
    pub fn consume_verification_token(&mut self, user_id: i64) -> Result<(), PersistenceError> {
        mutations::users::consume_verification_token(&mut self.conn, user_id)
    }

    /// Moves a user to a new department through the membership ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the user or department doesn't exist.
    pub fn reassign_user_department(
        &mut self,
        user_id: i64,
        old_department_id: Option<i64>,
        new_department_id: i64,
    ) -> Result<(), PersistenceError> {
        mutations::users::reassign_user_department(
            &mut self.conn,
            user_id,
            old_department_id,
            new_department_id,
        )
    }

    /// Deletes a user along with their ledger rows and sessions.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user doesn't exist and
    /// `ForeignKeyViolation` if tickets still reference them.
    pub fn delete_user(&mut self, user_id: i64) -> Result<(), PersistenceError> {
        mutations::users::delete_user(&mut self.conn, user_id)
    }

    /// Applies a planned sequence of ledger operations.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails.
    pub fn apply_ledger_ops(&mut self, ops: &[LedgerOp]) -> Result<(), PersistenceError> {
        mutations::ledger::apply_ledger_ops(&mut self.conn, ops)
    }

    // ========================================================================
    // Departments
    // ========================================================================

    /// Creates a new department.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if a department with the same name exists.
    pub fn create_department(
        &mut self,
        department: &Department,
    ) -> Result<i64, PersistenceError> {
        mutations::departments::create_department(&mut self.conn, department)
    }

    /// Retrieves a department by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_department(
        &mut self,
        department_id: i64,
    ) -> Result<Option<Department>, PersistenceError> {
        queries::departments::get_department(&mut self.conn, department_id)
    }

    /// Retrieves a department by its unique name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_department_by_name(
        &mut self,
        name: &str,
    ) -> Result<Option<Department>, PersistenceError> {
        queries::departments::get_department_by_name(&mut self.conn, name)
    }

    /// Lists all departments.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_departments(&mut self) -> Result<Vec<Department>, PersistenceError> {
        queries::departments::list_departments(&mut self.conn)
    }

    /// Updates a department's metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the department doesn't exist.
    pub fn update_department(
        &mut self,
        department_id: i64,
        department: &Department,
    ) -> Result<(), PersistenceError> {
        mutations::departments::update_department(&mut self.conn, department_id, department)
    }

    /// Deletes a department. The emptiness guard runs in the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the department doesn't exist.
    pub fn delete_department(&mut self, department_id: i64) -> Result<(), PersistenceError> {
        mutations::departments::delete_department(&mut self.conn, department_id)
    }

    /// Counts ledger members of a department.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_department_members(
        &mut self,
        department_id: i64,
    ) -> Result<i64, PersistenceError> {
        queries::departments::count_members(&mut self.conn, department_id)
    }

    /// Counts ledger topics of a department.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_department_topics(
        &mut self,
        department_id: i64,
    ) -> Result<i64, PersistenceError> {
        queries::departments::count_topics(&mut self.conn, department_id)
    }

    /// Lists the user IDs recorded as members of a department.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_department_member_ids(
        &mut self,
        department_id: i64,
    ) -> Result<Vec<i64>, PersistenceError> {
        queries::departments::list_member_ids(&mut self.conn, department_id)
    }

    /// Checks whether a membership row exists for a pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn is_department_member(
        &mut self,
        department_id: i64,
        user_id: i64,
    ) -> Result<bool, PersistenceError> {
        queries::departments::is_member(&mut self.conn, department_id, user_id)
    }

    // ========================================================================
    // Topics
    // ========================================================================

    /// Creates a new topic and its ledger row.
    ///
    /// # Errors
    ///
    /// Returns `ForeignKeyViolation` if the department does not exist.
    pub fn create_topic(&mut self, topic: &Topic) -> Result<i64, PersistenceError> {
        mutations::topics::create_topic(&mut self.conn, topic)
    }

    /// Retrieves a topic by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_topic(&mut self, topic_id: i64) -> Result<Option<Topic>, PersistenceError> {
        queries::topics::get_topic(&mut self.conn, topic_id)
    }

    /// Lists all topics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_topics(&mut self) -> Result<Vec<Topic>, PersistenceError> {
        queries::topics::list_topics(&mut self.conn)
    }

    /// Lists the topics filed under a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_topics_by_category(
        &mut self,
        category: TopicCategory,
    ) -> Result<Vec<Topic>, PersistenceError> {
        queries::topics::list_topics_by_category(&mut self.conn, category)
    }

    /// Lists the topics owned by a department.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_topics_for_department(
        &mut self,
        department_id: i64,
    ) -> Result<Vec<Topic>, PersistenceError> {
        queries::topics::list_topics_for_department(&mut self.conn, department_id)
    }

    /// Updates a topic, routing any department move through the
    /// ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the topic doesn't exist.
    pub fn update_topic(
        &mut self,
        topic_id: i64,
        old_department_id: i64,
        topic: &Topic,
    ) -> Result<(), PersistenceError> {
        mutations::topics::update_topic(&mut self.conn, topic_id, old_department_id, topic)
    }

    /// Deletes a topic and its ledger row.
    ///
    /// # Errors
    ///
    /// Returns an error if the topic doesn't exist.
    pub fn delete_topic(
        &mut self,
        topic_id: i64,
        department_id: i64,
    ) -> Result<(), PersistenceError> {
        mutations::topics::delete_topic(&mut self.conn, topic_id, department_id)
    }

    // ========================================================================
    // Tickets
    // ========================================================================

    /// Creates a ticket, deriving its day-scoped number atomically.
    ///
    /// Returns the new ticket's ID and number.
    ///
    /// # Errors
    ///
    /// Returns `ForeignKeyViolation` if a referenced row is missing.
    pub fn create_ticket(
        &mut self,
        ticket: &NewTicket,
    ) -> Result<(i64, String), PersistenceError> {
        mutations::tickets::create_ticket(&mut self.conn, ticket)
    }

    /// Retrieves a ticket by ID with comments, history, and
    /// attachments.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_ticket(&mut self, ticket_id: i64) -> Result<Option<Ticket>, PersistenceError> {
        queries::tickets::get_ticket(&mut self.conn, ticket_id)
    }

    /// Retrieves a ticket by its human-facing number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_ticket_by_number(
        &mut self,
        ticket_number: &str,
    ) -> Result<Option<Ticket>, PersistenceError> {
        queries::tickets::get_ticket_by_number(&mut self.conn, ticket_number)
    }

    /// Lists all tickets, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_tickets(&mut self) -> Result<Vec<Ticket>, PersistenceError> {
        queries::tickets::list_tickets(&mut self.conn)
    }

    /// Lists the tickets owned by a department.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_tickets_for_department(
        &mut self,
        department_id: i64,
    ) -> Result<Vec<Ticket>, PersistenceError> {
        queries::tickets::list_tickets_for_department(&mut self.conn, department_id)
    }

    /// Lists the tickets a user authored or is assigned to.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_tickets_for_user(
        &mut self,
        user_id: i64,
    ) -> Result<Vec<Ticket>, PersistenceError> {
        queries::tickets::list_tickets_for_user(&mut self.conn, user_id)
    }

    /// Applies a validated patch and its audited changes to a ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if the ticket doesn't exist or any write
    /// fails.
    pub fn apply_ticket_update(
        &mut self,
        ticket_id: i64,
        patch: &TicketPatch,
        changes: &[FieldChange],
        actor_id: i64,
    ) -> Result<(), PersistenceError> {
        mutations::tickets::apply_ticket_update(&mut self.conn, ticket_id, patch, changes, actor_id)
    }

    /// Adds a comment to a ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if the ticket doesn't exist or any write
    /// fails.
    pub fn add_comment(
        &mut self,
        ticket_id: i64,
        author_id: i64,
        content: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::tickets::add_comment(&mut self.conn, ticket_id, author_id, content)
    }

    /// Records an attachment against a ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if the ticket doesn't exist or the write
    /// fails.
    pub fn add_attachment(
        &mut self,
        ticket_id: i64,
        attachment: &Attachment,
    ) -> Result<i64, PersistenceError> {
        mutations::tickets::add_attachment(&mut self.conn, ticket_id, attachment)
    }

    /// Marks a ticket as escalated to a target department.
    ///
    /// # Errors
    ///
    /// Returns an error if the ticket doesn't exist.
    pub fn escalate_ticket(
        &mut self,
        ticket_id: i64,
        target_department_id: i64,
        actor_id: i64,
    ) -> Result<(), PersistenceError> {
        mutations::tickets::escalate_ticket(&mut self.conn, ticket_id, target_department_id, actor_id)
    }

    /// Approves a pending escalation.
    ///
    /// # Errors
    ///
    /// Returns an error if the ticket doesn't exist.
    pub fn approve_escalation(
        &mut self,
        ticket_id: i64,
        old_department_id: i64,
        target_department_id: i64,
        approver_id: i64,
    ) -> Result<(), PersistenceError> {
        mutations::tickets::approve_escalation(
            &mut self.conn,
            ticket_id,
            old_department_id,
            target_department_id,
            approver_id,
        )
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Creates a new session for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be created.
    pub fn create_session(
        &mut self,
        session_token: &str,
        user_id: i64,
        expires_at: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::sessions::create_session(&mut self.conn, session_token, user_id, expires_at)
    }

    /// Retrieves a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_session_by_token(
        &mut self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::sessions::get_session_by_token(&mut self.conn, session_token)
    }

    /// Updates the last activity timestamp for a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn update_session_activity(&mut self, session_id: i64) -> Result<(), PersistenceError> {
        mutations::sessions::update_session_activity(&mut self.conn, session_id)
    }

    /// Deletes a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<(), PersistenceError> {
        mutations::sessions::delete_session(&mut self.conn, session_token)
    }

    /// Deletes all expired sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_expired_sessions(&mut self) -> Result<usize, PersistenceError> {
        mutations::sessions::delete_expired_sessions(&mut self.conn)
    }

    /// Deletes all sessions for a specific user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn delete_sessions_for_user(&mut self, user_id: i64) -> Result<usize, PersistenceError> {
        mutations::sessions::delete_sessions_for_user(&mut self.conn, user_id)
    }
}
