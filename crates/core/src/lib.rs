// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Pure lifecycle engines for the Helpdesk System.
//!
//! This crate holds the logic that decides *what* changes, independent
//! of the store that applies them:
//!
//! - the ticket field-diff engine, which turns a patch into staged
//!   writes plus exactly one history entry per changed tracked field
//! - the onboarding state-machine guards
//!   (`pending_email` → `pending_admin` → `active`)
//! - membership-ledger planning, which orders cross-entity updates so
//!   a failure can duplicate a membership but never orphan one

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

mod diff;
mod error;
mod membership;
mod onboarding;

#[cfg(test)]
mod tests;

pub use diff::{FieldChange, TicketPatch, assignment_change, compute_ticket_changes};
pub use error::CoreError;
pub use membership::{
    LedgerOp, guard_department_delete, plan_member_reassignment, plan_topic_reassignment,
};
pub use onboarding::{
    RoleDefaults, guard_approval, guard_deactivation, guard_verification, resolve_department,
};
