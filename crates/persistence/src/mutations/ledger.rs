// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Membership-ledger writes.
//!
//! Adds use `INSERT OR IGNORE` so replaying an operation cannot create
//! a second row for the same pair. Removes delete at most one pair.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;

use helpdesk_core::LedgerOp;

use crate::diesel_schema::{department_members, department_topics};
use crate::error::PersistenceError;

/// Applies one planned ledger operation.
///
/// # Errors
///
/// Returns an error if the database write fails.
pub fn apply_ledger_op(
    conn: &mut SqliteConnection,
    op: &LedgerOp,
) -> Result<(), PersistenceError> {
    match *op {
        LedgerOp::AddMember {
            department_id,
            user_id,
        } => {
            debug!(department_id, user_id, "Ledger: add member");
            diesel::insert_or_ignore_into(department_members::table)
                .values((
                    department_members::department_id.eq(department_id),
                    department_members::user_id.eq(user_id),
                ))
                .execute(conn)?;
        }
        LedgerOp::RemoveMember {
            department_id,
            user_id,
        } => {
            debug!(department_id, user_id, "Ledger: remove member");
            diesel::delete(department_members::table)
                .filter(department_members::department_id.eq(department_id))
                .filter(department_members::user_id.eq(user_id))
                .execute(conn)?;
        }
        LedgerOp::AddTopic {
            department_id,
            topic_id,
        } => {
            debug!(department_id, topic_id, "Ledger: add topic");
            diesel::insert_or_ignore_into(department_topics::table)
                .values((
                    department_topics::department_id.eq(department_id),
                    department_topics::topic_id.eq(topic_id),
                ))
                .execute(conn)?;
        }
        LedgerOp::RemoveTopic {
            department_id,
            topic_id,
        } => {
            debug!(department_id, topic_id, "Ledger: remove topic");
            diesel::delete(department_topics::table)
                .filter(department_topics::department_id.eq(department_id))
                .filter(department_topics::topic_id.eq(topic_id))
                .execute(conn)?;
        }
    }
    Ok(())
}

/// Applies a planned sequence of ledger operations in order.
///
/// The caller is responsible for wrapping this in a transaction when
/// the sequence must be atomic with other writes.
///
/// # Errors
///
/// Returns an error if any write fails; earlier operations in the
/// sequence are not rolled back here.
pub fn apply_ledger_ops(
    conn: &mut SqliteConnection,
    ops: &[LedgerOp],
) -> Result<(), PersistenceError> {
    for op in ops {
        apply_ledger_op(conn, op)?;
    }
    Ok(())
}
