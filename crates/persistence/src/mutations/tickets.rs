// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ticket mutations.
//!
//! The ticket number is derived inside the insert transaction so the
//! day-scoped sequence cannot race with a concurrent insert. Field
//! updates write the staged columns and their history rows in one
//! transaction.

use diesel::prelude::*;
use diesel::{Connection, SqliteConnection};
use tracing::{debug, info};

use helpdesk_core::{FieldChange, TicketPatch};
use helpdesk_domain::{Attachment, format_ticket_number};

use crate::data_models::NewTicket;
use crate::diesel_schema::{ticket_attachments, ticket_comments, ticket_history, tickets};
use crate::error::PersistenceError;
use crate::queries::tickets::count_tickets_for_day;
use crate::sqlite::get_last_insert_rowid;

fn touch_ticket(conn: &mut SqliteConnection, ticket_id: i64) -> Result<(), PersistenceError> {
    diesel::update(tickets::table)
        .filter(tickets::ticket_id.eq(ticket_id))
        .set(tickets::updated_at.eq(diesel::dsl::sql::<diesel::sql_types::Text>(
            "CURRENT_TIMESTAMP",
        )))
        .execute(conn)?;
    Ok(())
}

fn insert_history_row(
    conn: &mut SqliteConnection,
    ticket_id: i64,
    field: &str,
    old_value: Option<&str>,
    new_value: Option<&str>,
    actor_id: i64,
) -> Result<(), PersistenceError> {
    diesel::insert_into(ticket_history::table)
        .values((
            ticket_history::ticket_id.eq(ticket_id),
            ticket_history::field.eq(field),
            ticket_history::old_value.eq(old_value),
            ticket_history::new_value.eq(new_value),
            ticket_history::actor_id.eq(actor_id),
        ))
        .execute(conn)?;
    Ok(())
}

/// Creates a ticket, deriving its day-scoped number in the same
/// transaction.
///
/// # Errors
///
/// Returns `ForeignKeyViolation` if the author, department, or topic
/// does not exist.
pub fn create_ticket(
    conn: &mut SqliteConnection,
    ticket: &NewTicket,
) -> Result<(i64, String), PersistenceError> {
    conn.transaction(|conn| {
        let sequence: i64 = count_tickets_for_day(conn, &ticket.created_day)? + 1;
        let ticket_number: String = format_ticket_number(&ticket.created_day, sequence);

        info!("Creating ticket {}", ticket_number);

        diesel::insert_into(tickets::table)
            .values((
                tickets::ticket_number.eq(&ticket_number),
                tickets::title.eq(&ticket.title),
                tickets::description.eq(&ticket.description),
                tickets::priority.eq(&ticket.priority),
                tickets::author_id.eq(ticket.author_id),
                tickets::department_id.eq(ticket.department_id),
                tickets::topic_id.eq(ticket.topic_id),
                tickets::created_day.eq(&ticket.created_day),
            ))
            .execute(conn)?;

        let ticket_id: i64 = get_last_insert_rowid(conn)?;

        // Every ticket opens its audit log with the initial status.
        insert_history_row(conn, ticket_id, "status", None, Some("open"), ticket.author_id)?;

        info!(ticket_id, "Ticket created successfully");
        Ok((ticket_id, ticket_number))
    })
}

/// Applies a validated patch and its audited changes to a ticket.
///
/// Columns present in the patch are written and one history row is
/// inserted per change, all in one transaction. A patch that stages no
/// changes only bumps `updated_at`.
///
/// # Errors
///
/// Returns an error if the ticket doesn't exist or any write fails.
pub fn apply_ticket_update(
    conn: &mut SqliteConnection,
    ticket_id: i64,
    patch: &TicketPatch,
    changes: &[FieldChange],
    actor_id: i64,
) -> Result<(), PersistenceError> {
    debug!(
        ticket_id,
        change_count = changes.len(),
        "Applying ticket update"
    );

    conn.transaction(|conn| {
        if let Some(title) = &patch.title {
            diesel::update(tickets::table)
                .filter(tickets::ticket_id.eq(ticket_id))
                .set(tickets::title.eq(title))
                .execute(conn)?;
        }
        if let Some(description) = &patch.description {
            diesel::update(tickets::table)
                .filter(tickets::ticket_id.eq(ticket_id))
                .set(tickets::description.eq(description))
                .execute(conn)?;
        }
        if let Some(status) = patch.status {
            diesel::update(tickets::table)
                .filter(tickets::ticket_id.eq(ticket_id))
                .set(tickets::status.eq(status.as_str()))
                .execute(conn)?;
        }
        if let Some(priority) = patch.priority {
            diesel::update(tickets::table)
                .filter(tickets::ticket_id.eq(ticket_id))
                .set(tickets::priority.eq(priority.as_str()))
                .execute(conn)?;
        }
        if let Some(progress) = patch.progress {
            diesel::update(tickets::table)
                .filter(tickets::ticket_id.eq(ticket_id))
                .set(tickets::progress.eq(progress))
                .execute(conn)?;
        }
        if let Some(assigned_to_id) = patch.assigned_to_id {
            diesel::update(tickets::table)
                .filter(tickets::ticket_id.eq(ticket_id))
                .set(tickets::assigned_to_id.eq(assigned_to_id))
                .execute(conn)?;
        }
        if let Some(department_id) = patch.department_id {
            diesel::update(tickets::table)
                .filter(tickets::ticket_id.eq(ticket_id))
                .set(tickets::department_id.eq(department_id))
                .execute(conn)?;
        }
        if let Some(topic_id) = patch.topic_id {
            diesel::update(tickets::table)
                .filter(tickets::ticket_id.eq(ticket_id))
                .set(tickets::topic_id.eq(topic_id))
                .execute(conn)?;
        }

        for change in changes {
            insert_history_row(
                conn,
                ticket_id,
                change.field,
                change.old_value.as_deref(),
                change.new_value.as_deref(),
                actor_id,
            )?;
        }

        touch_ticket(conn, ticket_id)
    })
}

/// Adds a comment to a ticket and records it in the history.
///
/// # Errors
///
/// Returns an error if the ticket doesn't exist or any write fails.
pub fn add_comment(
    conn: &mut SqliteConnection,
    ticket_id: i64,
    author_id: i64,
    content: &str,
) -> Result<i64, PersistenceError> {
    debug!(ticket_id, author_id, "Adding comment");

    conn.transaction(|conn| {
        diesel::insert_into(ticket_comments::table)
            .values((
                ticket_comments::ticket_id.eq(ticket_id),
                ticket_comments::author_id.eq(author_id),
                ticket_comments::content.eq(content),
            ))
            .execute(conn)?;

        let comment_id: i64 = get_last_insert_rowid(conn)?;

        insert_history_row(
            conn,
            ticket_id,
            "comment",
            None,
            Some("Comment added"),
            author_id,
        )?;
        touch_ticket(conn, ticket_id)?;

        Ok(comment_id)
    })
}

/// Records an attachment against a ticket.
///
/// # Errors
///
/// Returns an error if the ticket doesn't exist or the write fails.
pub fn add_attachment(
    conn: &mut SqliteConnection,
    ticket_id: i64,
    attachment: &Attachment,
) -> Result<i64, PersistenceError> {
    debug!(ticket_id, "Adding attachment: {}", attachment.filename);

    conn.transaction(|conn| {
        diesel::insert_into(ticket_attachments::table)
            .values((
                ticket_attachments::ticket_id.eq(ticket_id),
                ticket_attachments::filename.eq(&attachment.filename),
                ticket_attachments::storage_path.eq(&attachment.storage_path),
                ticket_attachments::mime_type.eq(attachment.mime_type.as_deref()),
                ticket_attachments::size_bytes.eq(attachment.size_bytes),
                ticket_attachments::uploaded_by.eq(attachment.uploaded_by),
            ))
            .execute(conn)?;

        let attachment_id: i64 = get_last_insert_rowid(conn)?;
        touch_ticket(conn, ticket_id)?;
        Ok(attachment_id)
    })
}

/// Marks a ticket as escalated to a target department.
///
/// # Errors
///
/// Returns an error if the ticket doesn't exist or any write fails.
pub fn escalate_ticket(
    conn: &mut SqliteConnection,
    ticket_id: i64,
    target_department_id: i64,
    actor_id: i64,
) -> Result<(), PersistenceError> {
    info!(ticket_id, target_department_id, "Escalating ticket");

    conn.transaction(|conn| {
        let rows_affected: usize = diesel::update(tickets::table)
            .filter(tickets::ticket_id.eq(ticket_id))
            .set(tickets::escalated_to_department_id.eq(Some(target_department_id)))
            .execute(conn)?;

        if rows_affected == 0 {
            return Err(PersistenceError::NotFound(format!(
                "Ticket with ID {ticket_id} not found"
            )));
        }

        insert_history_row(
            conn,
            ticket_id,
            "escalated_to_department_id",
            None,
            Some(&target_department_id.to_string()),
            actor_id,
        )?;
        touch_ticket(conn, ticket_id)
    })
}

/// Approves a pending escalation.
///
/// Moves the ticket to the target department, records the approver,
/// and clears the escalation marker, with history rows for the
/// department move and the approval.
///
/// # Errors
///
/// Returns an error if the ticket doesn't exist or any write fails.
pub fn approve_escalation(
    conn: &mut SqliteConnection,
    ticket_id: i64,
    old_department_id: i64,
    target_department_id: i64,
    approver_id: i64,
) -> Result<(), PersistenceError> {
    info!(ticket_id, approver_id, "Approving ticket escalation");

    conn.transaction(|conn| {
        let rows_affected: usize = diesel::update(tickets::table)
            .filter(tickets::ticket_id.eq(ticket_id))
            .set((
                tickets::department_id.eq(target_department_id),
                tickets::escalated_to_department_id.eq(None::<i64>),
                tickets::escalation_approved_by.eq(Some(approver_id)),
            ))
            .execute(conn)?;

        if rows_affected == 0 {
            return Err(PersistenceError::NotFound(format!(
                "Ticket with ID {ticket_id} not found"
            )));
        }

        insert_history_row(
            conn,
            ticket_id,
            "department_id",
            Some(&old_department_id.to_string()),
            Some(&target_department_id.to_string()),
            approver_id,
        )?;
        insert_history_row(
            conn,
            ticket_id,
            "escalation_approved_by",
            None,
            Some(&approver_id.to_string()),
            approver_id,
        )?;
        touch_ticket(conn, ticket_id)
    })
}
