// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Department mutations.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::info;

use helpdesk_domain::Department;

use crate::diesel_schema::departments;
use crate::error::PersistenceError;
use crate::sqlite::get_last_insert_rowid;

/// Creates a new department.
///
/// # Errors
///
/// Returns `Duplicate` if a department with the same name exists.
pub fn create_department(
    conn: &mut SqliteConnection,
    department: &Department,
) -> Result<i64, PersistenceError> {
    info!("Creating department: {}", department.name);

    diesel::insert_into(departments::table)
        .values((
            departments::name.eq(&department.name),
            departments::code.eq(department.code.as_deref()),
            departments::description.eq(department.description.as_deref()),
            departments::supervisor_id.eq(department.supervisor_id),
            departments::manager_id.eq(department.manager_id),
            departments::parent_department_id.eq(department.parent_department_id),
        ))
        .execute(conn)?;

    let department_id: i64 = get_last_insert_rowid(conn)?;

    info!(department_id, "Department created successfully");
    Ok(department_id)
}

/// Updates a department's metadata.
///
/// # Errors
///
/// Returns an error if the department doesn't exist or the update
/// fails.
pub fn update_department(
    conn: &mut SqliteConnection,
    department_id: i64,
    department: &Department,
) -> Result<(), PersistenceError> {
    info!("Updating department ID: {}", department_id);

    let rows_affected: usize = diesel::update(departments::table)
        .filter(departments::department_id.eq(department_id))
        .set((
            departments::name.eq(&department.name),
            departments::code.eq(department.code.as_deref()),
            departments::description.eq(department.description.as_deref()),
            departments::supervisor_id.eq(department.supervisor_id),
            departments::manager_id.eq(department.manager_id),
            departments::parent_department_id.eq(department.parent_department_id),
            departments::updated_at
                .eq(diesel::dsl::sql::<diesel::sql_types::Text>("CURRENT_TIMESTAMP")),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Department with ID {department_id} not found"
        )));
    }
    Ok(())
}

/// Deletes a department.
///
/// The emptiness guard runs before this in the caller; this function
/// only performs the delete.
///
/// # Errors
///
/// Returns an error if the department doesn't exist or the delete
/// fails.
pub fn delete_department(
    conn: &mut SqliteConnection,
    department_id: i64,
) -> Result<(), PersistenceError> {
    info!("Deleting department ID: {}", department_id);

    let rows_affected: usize = diesel::delete(departments::table)
        .filter(departments::department_id.eq(department_id))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Department with ID {department_id} not found"
        )));
    }
    Ok(())
}
