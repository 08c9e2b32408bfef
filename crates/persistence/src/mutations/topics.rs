// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Topic mutations.

use diesel::prelude::*;
use diesel::{Connection, SqliteConnection};
use tracing::info;

use helpdesk_core::{LedgerOp, plan_topic_reassignment};
use helpdesk_domain::Topic;

use crate::diesel_schema::topics;
use crate::error::PersistenceError;
use crate::mutations::ledger::{apply_ledger_op, apply_ledger_ops};
use crate::sqlite::get_last_insert_rowid;

/// Creates a new topic and its ledger row in one transaction.
///
/// # Errors
///
/// Returns `Duplicate` if a topic with the same name exists and
/// `ForeignKeyViolation` if the department does not exist.
pub fn create_topic(conn: &mut SqliteConnection, topic: &Topic) -> Result<i64, PersistenceError> {
    info!(
        "Creating topic: {} in department {}",
        topic.name, topic.department_id
    );

    conn.transaction(|conn| {
        diesel::insert_into(topics::table)
            .values((
                topics::name.eq(&topic.name),
                topics::category.eq(topic.category.as_str()),
                topics::subcategory.eq(topic.subcategory.as_deref()),
                topics::description.eq(topic.description.as_deref()),
                topics::department_id.eq(topic.department_id),
                topics::version.eq(topic.version),
            ))
            .execute(conn)?;

        let topic_id: i64 = get_last_insert_rowid(conn)?;

        apply_ledger_op(
            conn,
            &LedgerOp::AddTopic {
                department_id: topic.department_id,
                topic_id,
            },
        )?;

        info!(topic_id, "Topic created successfully");
        Ok(topic_id)
    })
}

/// Updates a topic, routing any department move through the ledger.
///
/// The reference column and both ledger rows change in one
/// transaction; the new ledger row is added before the old one is
/// removed. The version counter increments on every update.
///
/// # Errors
///
/// Returns `Duplicate` if the new name is taken by another topic and
/// an error if the topic doesn't exist or any write fails.
pub fn update_topic(
    conn: &mut SqliteConnection,
    topic_id: i64,
    old_department_id: i64,
    topic: &Topic,
) -> Result<(), PersistenceError> {
    info!("Updating topic ID: {}", topic_id);

    conn.transaction(|conn| {
        let rows_affected: usize = diesel::update(topics::table)
            .filter(topics::topic_id.eq(topic_id))
            .set((
                topics::name.eq(&topic.name),
                topics::category.eq(topic.category.as_str()),
                topics::subcategory.eq(topic.subcategory.as_deref()),
                topics::description.eq(topic.description.as_deref()),
                topics::department_id.eq(topic.department_id),
                topics::version.eq(topics::version + 1),
                topics::updated_at
                    .eq(diesel::dsl::sql::<diesel::sql_types::Text>("CURRENT_TIMESTAMP")),
            ))
            .execute(conn)?;

        if rows_affected == 0 {
            return Err(PersistenceError::NotFound(format!(
                "Topic with ID {topic_id} not found"
            )));
        }

        apply_ledger_ops(
            conn,
            &plan_topic_reassignment(topic_id, old_department_id, topic.department_id),
        )
    })
}

/// Deletes a topic and its ledger row.
///
/// # Errors
///
/// Returns an error if the topic doesn't exist or the delete fails.
pub fn delete_topic(
    conn: &mut SqliteConnection,
    topic_id: i64,
    department_id: i64,
) -> Result<(), PersistenceError> {
    info!("Deleting topic ID: {}", topic_id);

    conn.transaction(|conn| {
        apply_ledger_op(
            conn,
            &LedgerOp::RemoveTopic {
                department_id,
                topic_id,
            },
        )?;

        let rows_affected: usize = diesel::delete(topics::table)
            .filter(topics::topic_id.eq(topic_id))
            .execute(conn)?;

        if rows_affected == 0 {
            return Err(PersistenceError::NotFound(format!(
                "Topic with ID {topic_id} not found"
            )));
        }
        Ok(())
    })
}
