// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ticket field-diff engine.
//!
//! Every mutation to a tracked field must produce exactly one history
//! entry. The engine validates the patch first, then diffs each
//! recognized field against the current ticket; unchanged and absent
//! fields are silently ignored.

use crate::error::CoreError;
use helpdesk_domain::{
    Ticket, TicketPriority, TicketStatus, validate_description, validate_progress, validate_title,
};

/// A staged set of ticket field updates.
///
/// `None` means "field absent from the patch". For `assigned_to_id`
/// the outer option is presence and the inner option distinguishes
/// assignment from unassignment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TicketPatch {
    /// New title, if present.
    pub title: Option<String>,
    /// New description, if present.
    pub description: Option<String>,
    /// New status, if present.
    pub status: Option<TicketStatus>,
    /// New priority, if present.
    pub priority: Option<TicketPriority>,
    /// New progress, if present.
    pub progress: Option<i32>,
    /// New assignee, if present (`Some(None)` unassigns).
    pub assigned_to_id: Option<Option<i64>>,
    /// New owning department, if present.
    pub department_id: Option<i64>,
    /// New topic, if present.
    pub topic_id: Option<i64>,
}

impl TicketPatch {
    /// Returns whether the patch carries no recognized fields at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.progress.is_none()
            && self.assigned_to_id.is_none()
            && self.department_id.is_none()
            && self.topic_id.is_none()
    }
}

/// A single audited field change, ready to become a history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    /// The tracked field name as recorded in history.
    pub field: &'static str,
    /// The stored value before the change.
    pub old_value: Option<String>,
    /// The stored value after the change.
    pub new_value: Option<String>,
}

/// Computes the audited changes a patch would make to a ticket.
///
/// Validation happens before diffing: a patch carrying an out-of-range
/// progress or an invalid title/description fails without staging
/// anything. The returned list contains exactly one entry per
/// recognized field whose value actually differs from the stored one;
/// a patch that changes nothing yields an empty list.
///
/// # Errors
///
/// Returns a `DomainViolation` if any present field fails validation.
pub fn compute_ticket_changes(
    ticket: &Ticket,
    patch: &TicketPatch,
) -> Result<Vec<FieldChange>, CoreError> {
    // Validate the full patch before computing any diff.
    if let Some(title) = &patch.title {
        validate_title(title)?;
    }
    if let Some(description) = &patch.description {
        validate_description(description)?;
    }
    if let Some(progress) = patch.progress {
        validate_progress(progress)?;
    }

    let mut changes: Vec<FieldChange> = Vec::new();

    if let Some(title) = &patch.title
        && *title != ticket.title
    {
        changes.push(FieldChange {
            field: "title",
            old_value: Some(ticket.title.clone()),
            new_value: Some(title.clone()),
        });
    }

    if let Some(description) = &patch.description
        && *description != ticket.description
    {
        changes.push(FieldChange {
            field: "description",
            old_value: Some(ticket.description.clone()),
            new_value: Some(description.clone()),
        });
    }

    if let Some(status) = patch.status
        && status != ticket.status
    {
        changes.push(FieldChange {
            field: "status",
            old_value: Some(ticket.status.as_str().to_string()),
            new_value: Some(status.as_str().to_string()),
        });
    }

    if let Some(priority) = patch.priority
        && priority != ticket.priority
    {
        changes.push(FieldChange {
            field: "priority",
            old_value: Some(ticket.priority.as_str().to_string()),
            new_value: Some(priority.as_str().to_string()),
        });
    }

    if let Some(progress) = patch.progress
        && progress != ticket.progress
    {
        changes.push(FieldChange {
            field: "progress",
            old_value: Some(ticket.progress.to_string()),
            new_value: Some(progress.to_string()),
        });
    }

    if let Some(assigned_to_id) = patch.assigned_to_id
        && let Some(change) = assignment_change(ticket.assigned_to_id, assigned_to_id)
    {
        changes.push(change);
    }

    if let Some(department_id) = patch.department_id
        && department_id != ticket.department_id
    {
        changes.push(FieldChange {
            field: "department_id",
            old_value: Some(ticket.department_id.to_string()),
            new_value: Some(department_id.to_string()),
        });
    }

    if let Some(topic_id) = patch.topic_id
        && topic_id != ticket.topic_id
    {
        changes.push(FieldChange {
            field: "topic_id",
            old_value: Some(ticket.topic_id.to_string()),
            new_value: Some(topic_id.to_string()),
        });
    }

    Ok(changes)
}

/// Computes the audited change for an assignment, comparing by user
/// identity so re-assigning the same user produces no audit noise.
#[must_use]
pub fn assignment_change(current: Option<i64>, requested: Option<i64>) -> Option<FieldChange> {
    if current == requested {
        return None;
    }
    Some(FieldChange {
        field: "assigned_to_id",
        old_value: current.map(|id| id.to_string()),
        new_value: requested.map(|id| id.to_string()),
    })
}
