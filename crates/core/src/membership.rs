// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Membership-ledger planning.
//!
//! Department membership and topic ownership are kept in ledger tables
//! alongside the reference column on the owning row. Reassignments are
//! planned add-new-first so an interrupted apply can leave a duplicate
//! membership (harmless, inserts are idempotent) but never an orphaned
//! user or topic.

use crate::error::CoreError;

/// A single idempotent ledger write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOp {
    /// Ensure a user is recorded as a member of a department.
    AddMember {
        /// The department gaining the member.
        department_id: i64,
        /// The member.
        user_id: i64,
    },
    /// Remove a user's membership row for a department, if present.
    RemoveMember {
        /// The department losing the member.
        department_id: i64,
        /// The member.
        user_id: i64,
    },
    /// Ensure a topic is recorded under a department.
    AddTopic {
        /// The department gaining the topic.
        department_id: i64,
        /// The topic.
        topic_id: i64,
    },
    /// Remove a topic's ledger row for a department, if present.
    RemoveTopic {
        /// The department losing the topic.
        department_id: i64,
        /// The topic.
        topic_id: i64,
    },
}

/// Plans the ledger writes for moving a user between departments.
///
/// The new membership is added before the old one is removed. Moving a
/// user to the department they are already in yields no operations.
#[must_use]
pub fn plan_member_reassignment(user_id: i64, old: Option<i64>, new: i64) -> Vec<LedgerOp> {
    if old == Some(new) {
        return Vec::new();
    }
    let mut ops = vec![LedgerOp::AddMember {
        department_id: new,
        user_id,
    }];
    if let Some(old) = old {
        ops.push(LedgerOp::RemoveMember {
            department_id: old,
            user_id,
        });
    }
    ops
}

/// Plans the ledger writes for moving a topic between departments.
#[must_use]
pub fn plan_topic_reassignment(topic_id: i64, old: i64, new: i64) -> Vec<LedgerOp> {
    if old == new {
        return Vec::new();
    }
    vec![
        LedgerOp::AddTopic {
            department_id: new,
            topic_id,
        },
        LedgerOp::RemoveTopic {
            department_id: old,
            topic_id,
        },
    ]
}

/// Refuses to delete a department that still has members or topics.
///
/// # Errors
///
/// Returns `DepartmentNotEmpty` when either count is nonzero.
pub const fn guard_department_delete(members: i64, topics: i64) -> Result<(), CoreError> {
    if members > 0 || topics > 0 {
        return Err(CoreError::DepartmentNotEmpty { members, topics });
    }
    Ok(())
}
