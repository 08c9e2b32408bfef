// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Department queries, including membership-ledger counts.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;

use helpdesk_domain::Department;

use crate::diesel_schema::{department_members, department_topics, departments};
use crate::error::PersistenceError;

/// Diesel Queryable struct for department rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = departments)]
pub(crate) struct DepartmentRow {
    pub department_id: i64,
    pub name: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub supervisor_id: Option<i64>,
    pub manager_id: Option<i64>,
    pub parent_department_id: Option<i64>,
}

pub(crate) fn row_to_department(row: DepartmentRow) -> Department {
    Department {
        department_id: Some(row.department_id),
        name: row.name,
        code: row.code,
        description: row.description,
        supervisor_id: row.supervisor_id,
        manager_id: row.manager_id,
        parent_department_id: row.parent_department_id,
    }
}

/// Retrieves a department by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the department is not found.
pub fn get_department(
    conn: &mut SqliteConnection,
    department_id: i64,
) -> Result<Option<Department>, PersistenceError> {
    debug!("Looking up department by ID: {}", department_id);

    let result: Result<DepartmentRow, diesel::result::Error> = departments::table
        .filter(departments::department_id.eq(department_id))
        .select(DepartmentRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(row_to_department(row))),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Retrieves a department by its unique name.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the department is not found.
pub fn get_department_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Option<Department>, PersistenceError> {
    debug!("Looking up department by name: {}", name);

    let result: Result<DepartmentRow, diesel::result::Error> = departments::table
        .filter(departments::name.eq(name))
        .select(DepartmentRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(row_to_department(row))),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Lists all departments ordered by name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_departments(conn: &mut SqliteConnection) -> Result<Vec<Department>, PersistenceError> {
    let rows: Vec<DepartmentRow> = departments::table
        .order(departments::name.asc())
        .select(DepartmentRow::as_select())
        .load(conn)?;

    Ok(rows.into_iter().map(row_to_department).collect())
}

/// Counts ledger members of a department.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_members(
    conn: &mut SqliteConnection,
    department_id: i64,
) -> Result<i64, PersistenceError> {
    Ok(department_members::table
        .filter(department_members::department_id.eq(department_id))
        .count()
        .get_result(conn)?)
}

/// Counts ledger topics of a department.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_topics(
    conn: &mut SqliteConnection,
    department_id: i64,
) -> Result<i64, PersistenceError> {
    Ok(department_topics::table
        .filter(department_topics::department_id.eq(department_id))
        .count()
        .get_result(conn)?)
}

/// Lists the user IDs recorded as members of a department.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_member_ids(
    conn: &mut SqliteConnection,
    department_id: i64,
) -> Result<Vec<i64>, PersistenceError> {
    Ok(department_members::table
        .filter(department_members::department_id.eq(department_id))
        .order(department_members::user_id.asc())
        .select(department_members::user_id)
        .load(conn)?)
}

/// Checks whether a membership row exists for a `(department, user)` pair.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn is_member(
    conn: &mut SqliteConnection,
    department_id: i64,
    user_id: i64,
) -> Result<bool, PersistenceError> {
    let count: i64 = department_members::table
        .filter(department_members::department_id.eq(department_id))
        .filter(department_members::user_id.eq(user_id))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}
