// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;

use helpdesk_domain::{Role, User, UserStatus, normalize_email, normalize_username};

use crate::diesel_schema::users;
use crate::error::PersistenceError;

/// Diesel Queryable struct for user rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
pub(crate) struct UserRow {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub birthday: Option<String>,
    pub password_hash: String,
    pub role: String,
    pub department_id: Option<i64>,
    pub default_department_id: Option<i64>,
    pub status: String,
    pub email_verified: i32,
    pub email_verification_token: Option<String>,
}

pub(crate) fn row_to_user(row: UserRow) -> Result<User, PersistenceError> {
    let role = Role::parse(&row.role)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;
    let status: UserStatus = row
        .status
        .parse()
        .map_err(|e: helpdesk_domain::DomainError| {
            PersistenceError::SerializationError(e.to_string())
        })?;
    Ok(User {
        user_id: Some(row.user_id),
        first_name: row.first_name,
        last_name: row.last_name,
        username: row.username,
        email: row.email,
        birthday: row.birthday,
        password_hash: row.password_hash,
        role,
        department_id: row.department_id,
        default_department_id: row.default_department_id,
        status,
        email_verified: row.email_verified != 0,
        email_verification_token: row.email_verification_token,
    })
}

fn first_user_row(
    result: Result<UserRow, diesel::result::Error>,
) -> Result<Option<User>, PersistenceError> {
    match result {
        Ok(row) => Ok(Some(row_to_user(row)?)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Retrieves a user by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the user is not found.
pub fn get_user_by_id(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<User>, PersistenceError> {
    debug!("Looking up user by ID: {}", user_id);

    first_user_row(
        users::table
            .filter(users::user_id.eq(user_id))
            .select(UserRow::as_select())
            .first(conn),
    )
}

/// Retrieves a user by username (normalized before lookup).
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the user is not found.
pub fn get_user_by_username(
    conn: &mut SqliteConnection,
    username: &str,
) -> Result<Option<User>, PersistenceError> {
    let normalized: String = normalize_username(username);

    debug!("Looking up user by username: {}", normalized);

    first_user_row(
        users::table
            .filter(users::username.eq(&normalized))
            .select(UserRow::as_select())
            .first(conn),
    )
}

/// Retrieves a user by email address (normalized before lookup).
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the user is not found.
pub fn get_user_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<User>, PersistenceError> {
    let normalized: String = normalize_email(email);

    debug!("Looking up user by email");

    first_user_row(
        users::table
            .filter(users::email.eq(&normalized))
            .select(UserRow::as_select())
            .first(conn),
    )
}

/// Retrieves a user by their email verification token.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if no user carries the token.
pub fn get_user_by_verification_token(
    conn: &mut SqliteConnection,
    token: &str,
) -> Result<Option<User>, PersistenceError> {
    debug!("Looking up user by verification token");

    first_user_row(
        users::table
            .filter(users::email_verification_token.eq(token))
            .select(UserRow::as_select())
            .first(conn),
    )
}

/// Lists all users ordered by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_users(conn: &mut SqliteConnection) -> Result<Vec<User>, PersistenceError> {
    let rows: Vec<UserRow> = users::table
        .order(users::user_id.asc())
        .select(UserRow::as_select())
        .load(conn)?;

    rows.into_iter().map(row_to_user).collect()
}

/// Lists the email addresses of active admins.
///
/// Used to pick approval-notification recipients.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_active_admin_emails(
    conn: &mut SqliteConnection,
) -> Result<Vec<String>, PersistenceError> {
    Ok(users::table
        .filter(users::role.eq("admin"))
        .filter(users::status.eq("active"))
        .select(users::email)
        .load(conn)?)
}
