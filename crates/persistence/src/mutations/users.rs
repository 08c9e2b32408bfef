// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User mutations.

use diesel::prelude::*;
use diesel::{Connection, SqliteConnection};
use tracing::{debug, info};

use helpdesk_core::plan_member_reassignment;
use helpdesk_domain::{User, UserStatus, normalize_email, normalize_username};

use crate::diesel_schema::{department_members, sessions, users};
use crate::error::PersistenceError;
use crate::mutations::ledger::apply_ledger_ops;
use crate::sqlite::get_last_insert_rowid;

/// Creates a new user.
///
/// Username and email are normalized before insertion. When the user
/// carries a department, the matching membership-ledger row is written
/// in the same transaction.
///
/// # Errors
///
/// Returns `Duplicate` if the username or email already exists, and
/// `ForeignKeyViolation` if the department does not exist.
pub fn create_user(conn: &mut SqliteConnection, user: &User) -> Result<i64, PersistenceError> {
    let username: String = normalize_username(&user.username);
    let email: String = normalize_email(&user.email);

    info!(
        "Creating user with username: {}, role: {}",
        username,
        user.role.as_str()
    );

    conn.transaction(|conn| {
        diesel::insert_into(users::table)
            .values((
                users::first_name.eq(&user.first_name),
                users::last_name.eq(&user.last_name),
                users::username.eq(&username),
                users::email.eq(&email),
                users::birthday.eq(user.birthday.as_deref()),
                users::password_hash.eq(&user.password_hash),
                users::role.eq(user.role.as_str()),
                users::department_id.eq(user.department_id),
                users::default_department_id.eq(user.default_department_id),
                users::status.eq(user.status.as_str()),
                users::email_verified.eq(i32::from(user.email_verified)),
                users::email_verification_token.eq(user.email_verification_token.as_deref()),
            ))
            .execute(conn)?;

        let user_id: i64 = get_last_insert_rowid(conn)?;

        if let Some(department_id) = user.department_id {
            apply_ledger_ops(conn, &plan_member_reassignment(user_id, None, department_id))?;
        }

        info!(user_id, "User created successfully");
        Ok(user_id)
    })
}

/// Updates a user's profile fields.
///
/// # Errors
///
/// Returns an error if the user doesn't exist or the update fails.
pub fn update_user_profile(
    conn: &mut SqliteConnection,
    user_id: i64,
    first_name: &str,
    last_name: &str,
    email: &str,
    birthday: Option<&str>,
) -> Result<(), PersistenceError> {
    debug!("Updating profile for user ID: {}", user_id);

    let rows_affected: usize = diesel::update(users::table)
        .filter(users::user_id.eq(user_id))
        .set((
            users::first_name.eq(first_name),
            users::last_name.eq(last_name),
            users::email.eq(normalize_email(email)),
            users::birthday.eq(birthday),
            users::updated_at.eq(diesel::dsl::sql::<diesel::sql_types::Text>("CURRENT_TIMESTAMP")),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "User with ID {user_id} not found"
        )));
    }
    Ok(())
}

/// Updates a user's role.
///
/// # Errors
///
/// Returns an error if the user doesn't exist or the update fails.
pub fn set_user_role(
    conn: &mut SqliteConnection,
    user_id: i64,
    role: &str,
) -> Result<(), PersistenceError> {
    info!("Setting role {} for user ID: {}", role, user_id);

    let rows_affected: usize = diesel::update(users::table)
        .filter(users::user_id.eq(user_id))
        .set((
            users::role.eq(role),
            users::updated_at.eq(diesel::dsl::sql::<diesel::sql_types::Text>("CURRENT_TIMESTAMP")),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "User with ID {user_id} not found"
        )));
    }
    Ok(())
}

/// Updates a user's lifecycle status.
///
/// # Errors
///
/// Returns an error if the user doesn't exist or the update fails.
pub fn set_user_status(
    conn: &mut SqliteConnection,
    user_id: i64,
    status: UserStatus,
) -> Result<(), PersistenceError> {
    info!("Setting status {} for user ID: {}", status.as_str(), user_id);

    let rows_affected: usize = diesel::update(users::table)
        .filter(users::user_id.eq(user_id))
        .set((
            users::status.eq(status.as_str()),
            users::updated_at.eq(diesel::dsl::sql::<diesel::sql_types::Text>("CURRENT_TIMESTAMP")),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "User with ID {user_id} not found"
        )));
    }
    Ok(())
}

/// Consumes a user's email verification token.
///
/// Marks the email verified, clears the single-use token, and advances
/// the status to `pending_admin`, all in one update.
///
/// # Errors
///
/// Returns an error if the user doesn't exist or the update fails.
pub fn consume_verification_token(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<(), PersistenceError> {
    info!("Consuming verification token for user ID: {}", user_id);

    let rows_affected: usize = diesel::update(users::table)
        .filter(users::user_id.eq(user_id))
        .set((
            users::email_verified.eq(1),
            users::email_verification_token.eq(None::<String>),
            users::status.eq(UserStatus::PendingAdmin.as_str()),
            users::updated_at.eq(diesel::dsl::sql::<diesel::sql_types::Text>("CURRENT_TIMESTAMP")),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "User with ID {user_id} not found"
        )));
    }
    Ok(())
}

/// Moves a user to a new department, keeping the ledger consistent.
///
/// The reference column and the ledger pair are updated in one
/// transaction; inside it the new membership is added before the old
/// one is removed.
///
/// # Errors
///
/// Returns an error if the user or department doesn't exist or any
/// write fails.
pub fn reassign_user_department(
    conn: &mut SqliteConnection,
    user_id: i64,
    old_department_id: Option<i64>,
    new_department_id: i64,
) -> Result<(), PersistenceError> {
    info!(
        user_id,
        new_department_id, "Reassigning user to new department"
    );

    conn.transaction(|conn| {
        let rows_affected: usize = diesel::update(users::table)
            .filter(users::user_id.eq(user_id))
            .set((
                users::department_id.eq(Some(new_department_id)),
                users::updated_at
                    .eq(diesel::dsl::sql::<diesel::sql_types::Text>("CURRENT_TIMESTAMP")),
            ))
            .execute(conn)?;

        if rows_affected == 0 {
            return Err(PersistenceError::NotFound(format!(
                "User with ID {user_id} not found"
            )));
        }

        apply_ledger_ops(
            conn,
            &plan_member_reassignment(user_id, old_department_id, new_department_id),
        )
    })
}

/// Deletes a user, their ledger rows, and their sessions.
///
/// Tickets are never cascaded: a user who authored tickets cannot be
/// deleted while those rows reference them.
///
/// # Errors
///
/// Returns `NotFound` if the user doesn't exist and
/// `ForeignKeyViolation` if tickets still reference them.
pub fn delete_user(conn: &mut SqliteConnection, user_id: i64) -> Result<(), PersistenceError> {
    info!("Deleting user with ID: {}", user_id);

    conn.transaction(|conn| {
        diesel::delete(department_members::table)
            .filter(department_members::user_id.eq(user_id))
            .execute(conn)?;
        diesel::delete(sessions::table)
            .filter(sessions::user_id.eq(user_id))
            .execute(conn)?;

        let rows_affected: usize = diesel::delete(users::table)
            .filter(users::user_id.eq(user_id))
            .execute(conn)?;

        if rows_affected == 0 {
            return Err(PersistenceError::NotFound(format!(
                "User with ID {user_id} not found"
            )));
        }
        Ok(())
    })
}
