// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ticket queries, including sub-collection assembly.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;

use helpdesk_domain::{
    Attachment, Comment, HistoryEntry, Ticket, TicketPriority, TicketStatus,
};

use crate::diesel_schema::{ticket_attachments, ticket_comments, ticket_history, tickets};
use crate::error::PersistenceError;

/// Diesel Queryable struct for ticket rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = tickets)]
pub(crate) struct TicketRow {
    pub ticket_id: i64,
    pub ticket_number: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub progress: i32,
    pub priority: String,
    pub author_id: i64,
    pub assigned_to_id: Option<i64>,
    pub department_id: i64,
    pub topic_id: i64,
    pub escalated_to_department_id: Option<i64>,
    pub escalation_approved_by: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

fn assemble_ticket(
    conn: &mut SqliteConnection,
    row: TicketRow,
) -> Result<Ticket, PersistenceError> {
    let status = TicketStatus::parse(&row.status)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;
    let priority = TicketPriority::parse(&row.priority)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;

    let comments: Vec<Comment> = ticket_comments::table
        .filter(ticket_comments::ticket_id.eq(row.ticket_id))
        .order(ticket_comments::comment_id.asc())
        .select((
            ticket_comments::comment_id,
            ticket_comments::author_id,
            ticket_comments::content,
            ticket_comments::created_at,
        ))
        .load::<(i64, i64, String, String)>(conn)?
        .into_iter()
        .map(|(comment_id, author_id, content, created_at)| Comment {
            comment_id: Some(comment_id),
            author_id,
            content,
            created_at,
        })
        .collect();

    let history: Vec<HistoryEntry> = ticket_history::table
        .filter(ticket_history::ticket_id.eq(row.ticket_id))
        .order(ticket_history::history_id.asc())
        .select((
            ticket_history::field,
            ticket_history::old_value,
            ticket_history::new_value,
            ticket_history::actor_id,
            ticket_history::created_at,
        ))
        .load::<(String, Option<String>, Option<String>, i64, String)>(conn)?
        .into_iter()
        .map(
            |(field, old_value, new_value, actor_id, created_at)| HistoryEntry {
                field,
                old_value,
                new_value,
                actor_id,
                created_at,
            },
        )
        .collect();

    let attachments: Vec<Attachment> = ticket_attachments::table
        .filter(ticket_attachments::ticket_id.eq(row.ticket_id))
        .order(ticket_attachments::attachment_id.asc())
        .select((
            ticket_attachments::filename,
            ticket_attachments::storage_path,
            ticket_attachments::mime_type,
            ticket_attachments::size_bytes,
            ticket_attachments::uploaded_by,
        ))
        .load::<(String, String, Option<String>, i64, i64)>(conn)?
        .into_iter()
        .map(
            |(filename, storage_path, mime_type, size_bytes, uploaded_by)| Attachment {
                filename,
                storage_path,
                mime_type,
                size_bytes,
                uploaded_by,
            },
        )
        .collect();

    Ok(Ticket {
        ticket_id: Some(row.ticket_id),
        ticket_number: row.ticket_number,
        title: row.title,
        description: row.description,
        status,
        progress: row.progress,
        priority,
        author_id: row.author_id,
        assigned_to_id: row.assigned_to_id,
        department_id: row.department_id,
        topic_id: row.topic_id,
        escalated_to_department_id: row.escalated_to_department_id,
        escalation_approved_by: row.escalation_approved_by,
        comments,
        history,
        attachments,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn first_ticket_row(
    conn: &mut SqliteConnection,
    result: Result<TicketRow, diesel::result::Error>,
) -> Result<Option<Ticket>, PersistenceError> {
    match result {
        Ok(row) => Ok(Some(assemble_ticket(conn, row)?)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Retrieves a ticket by ID, with comments, history, and attachments.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the ticket is not found.
pub fn get_ticket(
    conn: &mut SqliteConnection,
    ticket_id: i64,
) -> Result<Option<Ticket>, PersistenceError> {
    debug!("Looking up ticket by ID: {}", ticket_id);

    let result: Result<TicketRow, diesel::result::Error> = tickets::table
        .filter(tickets::ticket_id.eq(ticket_id))
        .select(TicketRow::as_select())
        .first(conn);

    first_ticket_row(conn, result)
}

/// Retrieves a ticket by its human-facing number.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the ticket is not found.
pub fn get_ticket_by_number(
    conn: &mut SqliteConnection,
    ticket_number: &str,
) -> Result<Option<Ticket>, PersistenceError> {
    debug!("Looking up ticket by number: {}", ticket_number);

    let result: Result<TicketRow, diesel::result::Error> = tickets::table
        .filter(tickets::ticket_number.eq(ticket_number))
        .select(TicketRow::as_select())
        .first(conn);

    first_ticket_row(conn, result)
}

/// Lists all tickets, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_tickets(conn: &mut SqliteConnection) -> Result<Vec<Ticket>, PersistenceError> {
    let rows: Vec<TicketRow> = tickets::table
        .order(tickets::ticket_id.desc())
        .select(TicketRow::as_select())
        .load(conn)?;

    rows.into_iter()
        .map(|row| assemble_ticket(conn, row))
        .collect()
}

/// Lists the tickets owned by a department, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_tickets_for_department(
    conn: &mut SqliteConnection,
    department_id: i64,
) -> Result<Vec<Ticket>, PersistenceError> {
    let rows: Vec<TicketRow> = tickets::table
        .filter(tickets::department_id.eq(department_id))
        .order(tickets::ticket_id.desc())
        .select(TicketRow::as_select())
        .load(conn)?;

    rows.into_iter()
        .map(|row| assemble_ticket(conn, row))
        .collect()
}

/// Lists the tickets a user authored or is assigned to, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_tickets_for_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Vec<Ticket>, PersistenceError> {
    let rows: Vec<TicketRow> = tickets::table
        .filter(
            tickets::author_id
                .eq(user_id)
                .or(tickets::assigned_to_id.eq(user_id)),
        )
        .order(tickets::ticket_id.desc())
        .select(TicketRow::as_select())
        .load(conn)?;

    rows.into_iter()
        .map(|row| assemble_ticket(conn, row))
        .collect()
}

/// Counts the tickets created on a given day key.
///
/// The day key scopes the sequential part of the ticket number.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_tickets_for_day(
    conn: &mut SqliteConnection,
    day: &str,
) -> Result<i64, PersistenceError> {
    Ok(tickets::table
        .filter(tickets::created_day.eq(day))
        .count()
        .get_result(conn)?)
}
