// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use helpdesk_domain::Department;
use helpdesk_notify::RecordingSender;

use super::{seed_admin, seed_agent, seed_department, seed_topic, test_persistence, ticket_request};
use crate::error::ApiError;
use crate::handlers;
use crate::request_response::{
    AssignTicketRequest, AttachmentUpload, CommentRequest, CreateTicketRequest,
    EscalateTicketRequest, TicketInfo, UpdatePriorityRequest, UpdateStatusRequest,
    UpdateTicketRequest,
};

#[test]
fn test_create_ticket_generates_number_and_initial_history() {
    let mut persistence = test_persistence();
    let sender = RecordingSender::new();
    let department_id: i64 = seed_department(&mut persistence, "Support");
    let topic_id: i64 = seed_topic(&mut persistence, "Email", department_id);
    let agent = seed_agent(&mut persistence, "jane", department_id);

    let ticket = handlers::create_ticket(
        &mut persistence,
        &sender,
        &agent,
        &ticket_request(topic_id),
    )
    .expect("creation succeeds");

    assert!(ticket.ticket_number.starts_with("TKT-"));
    assert_eq!(ticket.status, "open");
    assert_eq!(ticket.priority, "medium");
    assert_eq!(ticket.progress, 0);
    assert_eq!(ticket.department_id, department_id);

    // The audit log opens with the initial status.
    assert_eq!(ticket.history.len(), 1);
    assert_eq!(ticket.history[0].field, "status");
    assert_eq!(ticket.history[0].old_value, None);
    assert_eq!(ticket.history[0].new_value.as_deref(), Some("open"));
}

#[test]
fn test_create_ticket_defaults_department_from_topic() {
    let mut persistence = test_persistence();
    let sender = RecordingSender::new();
    let d1: i64 = seed_department(&mut persistence, "Support");
    let d2: i64 = seed_department(&mut persistence, "IT");
    let topic_id: i64 = seed_topic(&mut persistence, "Hardware", d2);
    let agent = seed_agent(&mut persistence, "jane", d1);

    let ticket = handlers::create_ticket(
        &mut persistence,
        &sender,
        &agent,
        &ticket_request(topic_id),
    )
    .expect("creation succeeds");

    assert_eq!(ticket.department_id, d2);
}

#[test]
fn test_create_ticket_notifies_supervisor_and_assignee() {
    let mut persistence = test_persistence();
    let sender = RecordingSender::new();
    let department_id: i64 = seed_department(&mut persistence, "Support");
    let topic_id: i64 = seed_topic(&mut persistence, "Email", department_id);
    let agent = seed_agent(&mut persistence, "jane", department_id);
    let supervisor = seed_agent(&mut persistence, "sup", department_id);
    let assignee = seed_agent(&mut persistence, "bob", department_id);
    persistence
        .update_department(
            department_id,
            &Department {
                department_id: Some(department_id),
                name: "Support".to_string(),
                code: None,
                description: None,
                supervisor_id: supervisor.user_id,
                manager_id: None,
                parent_department_id: None,
            },
        )
        .expect("supervisor assigned");

    let ticket = handlers::create_ticket(
        &mut persistence,
        &sender,
        &agent,
        &CreateTicketRequest {
            assigned_to_id: assignee.user_id,
            ..ticket_request(topic_id)
        },
    )
    .expect("creation succeeds");

    let sent = sender.sent();
    assert!(
        sent.iter().any(|(to, subject)| to == "sup@example.com"
            && *subject == format!("New ticket {}", ticket.ticket_number))
    );
    assert!(
        sent.iter().any(|(to, subject)| to == "bob@example.com"
            && *subject == format!("Ticket {} assigned to you", ticket.ticket_number))
    );
    assert_eq!(ticket.assigned_to_id, assignee.user_id);
}

#[test]
fn test_create_ticket_unknown_topic_is_invalid_reference() {
    let mut persistence = test_persistence();
    let sender = RecordingSender::new();
    let department_id: i64 = seed_department(&mut persistence, "Support");
    let agent = seed_agent(&mut persistence, "jane", department_id);

    let err = handlers::create_ticket(&mut persistence, &sender, &agent, &ticket_request(999))
        .expect_err("unknown topic rejected");
    assert!(matches!(err, ApiError::InvalidReference { .. }));
}

#[test]
fn test_create_ticket_empty_title_is_rejected() {
    let mut persistence = test_persistence();
    let sender = RecordingSender::new();
    let department_id: i64 = seed_department(&mut persistence, "Support");
    let topic_id: i64 = seed_topic(&mut persistence, "Email", department_id);
    let agent = seed_agent(&mut persistence, "jane", department_id);

    let err = handlers::create_ticket(
        &mut persistence,
        &sender,
        &agent,
        &CreateTicketRequest {
            title: "   ".to_string(),
            ..ticket_request(topic_id)
        },
    )
    .expect_err("blank title rejected");
    assert!(matches!(
        err,
        ApiError::ValidationError { ref field, .. } if field == "title"
    ));
}

#[test]
fn test_priority_update_appends_one_history_row() {
    let mut persistence = test_persistence();
    let sender = RecordingSender::new();
    let department_id: i64 = seed_department(&mut persistence, "Support");
    let topic_id: i64 = seed_topic(&mut persistence, "Email", department_id);
    let agent = seed_agent(&mut persistence, "jane", department_id);

    let ticket = handlers::create_ticket(
        &mut persistence,
        &sender,
        &agent,
        &ticket_request(topic_id),
    )
    .expect("creation succeeds");

    let updated = handlers::update_ticket_priority(
        &mut persistence,
        &sender,
        &agent,
        ticket.ticket_id,
        &UpdatePriorityRequest {
            priority: "urgent".to_string(),
        },
    )
    .expect("update succeeds");

    assert_eq!(updated.priority, "urgent");
    assert_eq!(updated.history.len(), 2);
    let entry = &updated.history[1];
    assert_eq!(entry.field, "priority");
    assert_eq!(entry.old_value.as_deref(), Some("medium"));
    assert_eq!(entry.new_value.as_deref(), Some("urgent"));
}

#[test]
fn test_noop_update_writes_no_history() {
    let mut persistence = test_persistence();
    let sender = RecordingSender::new();
    let department_id: i64 = seed_department(&mut persistence, "Support");
    let topic_id: i64 = seed_topic(&mut persistence, "Email", department_id);
    let agent = seed_agent(&mut persistence, "jane", department_id);

    let ticket = handlers::create_ticket(
        &mut persistence,
        &sender,
        &agent,
        &ticket_request(topic_id),
    )
    .expect("creation succeeds");

    let updated = handlers::update_ticket(
        &mut persistence,
        &sender,
        &agent,
        ticket.ticket_id,
        &UpdateTicketRequest {
            priority: Some("medium".to_string()),
            ..UpdateTicketRequest::default()
        },
    )
    .expect("no-op update succeeds");

    assert_eq!(updated.history.len(), 1);
}

#[test]
fn test_out_of_range_progress_is_rejected() {
    let mut persistence = test_persistence();
    let sender = RecordingSender::new();
    let department_id: i64 = seed_department(&mut persistence, "Support");
    let topic_id: i64 = seed_topic(&mut persistence, "Email", department_id);
    let agent = seed_agent(&mut persistence, "jane", department_id);

    let ticket = handlers::create_ticket(
        &mut persistence,
        &sender,
        &agent,
        &ticket_request(topic_id),
    )
    .expect("creation succeeds");

    let err = handlers::update_ticket(
        &mut persistence,
        &sender,
        &agent,
        ticket.ticket_id,
        &UpdateTicketRequest {
            progress: Some(150),
            ..UpdateTicketRequest::default()
        },
    )
    .expect_err("out-of-range progress rejected");
    assert!(matches!(
        err,
        ApiError::ValidationError { ref field, .. } if field == "progress"
    ));
}

#[test]
fn test_status_change_notifies_author() {
    let mut persistence = test_persistence();
    let sender = RecordingSender::new();
    let department_id: i64 = seed_department(&mut persistence, "Support");
    let topic_id: i64 = seed_topic(&mut persistence, "Email", department_id);
    let agent = seed_agent(&mut persistence, "jane", department_id);

    let ticket = handlers::create_ticket(
        &mut persistence,
        &sender,
        &agent,
        &ticket_request(topic_id),
    )
    .expect("creation succeeds");

    let updated = handlers::update_ticket_status(
        &mut persistence,
        &sender,
        &agent,
        ticket.ticket_id,
        &UpdateStatusRequest {
            status: "in progress".to_string(),
        },
    )
    .expect("status change succeeds");

    assert_eq!(updated.status, "in progress");
    let sent = sender.sent();
    assert!(
        sent.iter().any(|(to, subject)| to == "jane@example.com"
            && *subject == format!("Ticket {} status changed", ticket.ticket_number))
    );
}

#[test]
fn test_assign_then_unassign() {
    let mut persistence = test_persistence();
    let sender = RecordingSender::new();
    let department_id: i64 = seed_department(&mut persistence, "Support");
    let topic_id: i64 = seed_topic(&mut persistence, "Email", department_id);
    let agent = seed_agent(&mut persistence, "jane", department_id);
    let assignee = seed_agent(&mut persistence, "bob", department_id);

    let ticket = handlers::create_ticket(
        &mut persistence,
        &sender,
        &agent,
        &ticket_request(topic_id),
    )
    .expect("creation succeeds");

    let assigned = handlers::assign_ticket(
        &mut persistence,
        &sender,
        &agent,
        ticket.ticket_id,
        &AssignTicketRequest {
            assigned_to_id: assignee.user_id,
        },
    )
    .expect("assignment succeeds");
    assert_eq!(assigned.assigned_to_id, assignee.user_id);
    assert!(
        sender
            .sent()
            .iter()
            .any(|(to, _)| to == "bob@example.com")
    );

    let unassigned = handlers::assign_ticket(
        &mut persistence,
        &sender,
        &agent,
        ticket.ticket_id,
        &AssignTicketRequest {
            assigned_to_id: None,
        },
    )
    .expect("unassignment succeeds");
    assert_eq!(unassigned.assigned_to_id, None);
    // Initial status, the assignment, and the unassignment.
    assert_eq!(unassigned.history.len(), 3);
}

#[test]
fn test_update_unknown_assignee_is_invalid_reference() {
    let mut persistence = test_persistence();
    let sender = RecordingSender::new();
    let department_id: i64 = seed_department(&mut persistence, "Support");
    let topic_id: i64 = seed_topic(&mut persistence, "Email", department_id);
    let agent = seed_agent(&mut persistence, "jane", department_id);

    let ticket = handlers::create_ticket(
        &mut persistence,
        &sender,
        &agent,
        &ticket_request(topic_id),
    )
    .expect("creation succeeds");

    let err = handlers::assign_ticket(
        &mut persistence,
        &sender,
        &agent,
        ticket.ticket_id,
        &AssignTicketRequest {
            assigned_to_id: Some(999),
        },
    )
    .expect_err("unknown assignee rejected");
    assert!(matches!(err, ApiError::InvalidReference { .. }));
}

#[test]
fn test_add_comment_writes_synthetic_history_and_notifies_author() {
    let mut persistence = test_persistence();
    let sender = RecordingSender::new();
    let department_id: i64 = seed_department(&mut persistence, "Support");
    let topic_id: i64 = seed_topic(&mut persistence, "Email", department_id);
    let author = seed_agent(&mut persistence, "jane", department_id);
    let commenter = seed_agent(&mut persistence, "bob", department_id);

    let ticket = handlers::create_ticket(
        &mut persistence,
        &sender,
        &author,
        &ticket_request(topic_id),
    )
    .expect("creation succeeds");

    let updated = handlers::add_comment(
        &mut persistence,
        &sender,
        &commenter,
        ticket.ticket_id,
        &CommentRequest {
            content: "Restarting the print spooler helped.".to_string(),
        },
    )
    .expect("comment succeeds");

    assert_eq!(updated.comments.len(), 1);
    assert_eq!(
        updated.comments[0].content,
        "Restarting the print spooler helped."
    );
    assert_eq!(updated.history.len(), 2);
    assert_eq!(updated.history[1].field, "comment");
    assert_eq!(
        updated.history[1].new_value.as_deref(),
        Some("Comment added")
    );

    let sent = sender.sent();
    assert!(
        sent.iter().any(|(to, subject)| to == "jane@example.com"
            && *subject == format!("New comment on ticket {}", ticket.ticket_number))
    );
}

#[test]
fn test_empty_comment_is_rejected() {
    let mut persistence = test_persistence();
    let sender = RecordingSender::new();
    let department_id: i64 = seed_department(&mut persistence, "Support");
    let topic_id: i64 = seed_topic(&mut persistence, "Email", department_id);
    let agent = seed_agent(&mut persistence, "jane", department_id);

    let ticket = handlers::create_ticket(
        &mut persistence,
        &sender,
        &agent,
        &ticket_request(topic_id),
    )
    .expect("creation succeeds");

    let err = handlers::add_comment(
        &mut persistence,
        &sender,
        &agent,
        ticket.ticket_id,
        &CommentRequest {
            content: "   ".to_string(),
        },
    )
    .expect_err("blank comment rejected");
    assert!(matches!(
        err,
        ApiError::ValidationError { ref field, .. } if field == "content"
    ));
}

#[test]
fn test_add_attachment() {
    let mut persistence = test_persistence();
    let sender = RecordingSender::new();
    let department_id: i64 = seed_department(&mut persistence, "Support");
    let topic_id: i64 = seed_topic(&mut persistence, "Email", department_id);
    let agent = seed_agent(&mut persistence, "jane", department_id);

    let ticket = handlers::create_ticket(
        &mut persistence,
        &sender,
        &agent,
        &ticket_request(topic_id),
    )
    .expect("creation succeeds");

    let updated = handlers::add_attachment(
        &mut persistence,
        &agent,
        ticket.ticket_id,
        &AttachmentUpload {
            filename: "screenshot.png".to_string(),
            storage_path: "uploads/2026/screenshot.png".to_string(),
            mime_type: Some("image/png".to_string()),
            size_bytes: 20_480,
        },
    )
    .expect("attachment succeeds");

    assert_eq!(updated.attachments.len(), 1);
    assert_eq!(updated.attachments[0].filename, "screenshot.png");
    assert_eq!(updated.attachments[0].uploaded_by, agent.user_id.unwrap());
}

#[test]
fn test_escalation_flow() {
    let mut persistence = test_persistence();
    let sender = RecordingSender::new();
    let d1: i64 = seed_department(&mut persistence, "Support");
    let d2: i64 = seed_department(&mut persistence, "IT");
    let topic_id: i64 = seed_topic(&mut persistence, "Email", d1);
    let agent = seed_agent(&mut persistence, "jane", d1);
    let admin = seed_admin(&mut persistence);

    let ticket = handlers::create_ticket(
        &mut persistence,
        &sender,
        &agent,
        &ticket_request(topic_id),
    )
    .expect("creation succeeds");

    let escalated = handlers::escalate_ticket(
        &mut persistence,
        &agent,
        ticket.ticket_id,
        &EscalateTicketRequest { department_id: d2 },
    )
    .expect("escalation succeeds");
    assert_eq!(escalated.escalated_to_department_id, Some(d2));
    assert_eq!(escalated.department_id, d1);

    // A second escalation while one is pending is refused.
    let err = handlers::escalate_ticket(
        &mut persistence,
        &agent,
        ticket.ticket_id,
        &EscalateTicketRequest { department_id: d2 },
    )
    .expect_err("pending escalation blocks another");
    assert!(matches!(err, ApiError::InvalidState { .. }));

    let approved = handlers::approve_escalation(&mut persistence, &admin, ticket.ticket_id)
        .expect("approval succeeds");
    assert_eq!(approved.department_id, d2);
    assert_eq!(approved.escalated_to_department_id, None);
    assert_eq!(approved.escalation_approved_by, admin.user_id);
}

#[test]
fn test_approve_escalation_requires_manager() {
    let mut persistence = test_persistence();
    let sender = RecordingSender::new();
    let d1: i64 = seed_department(&mut persistence, "Support");
    let d2: i64 = seed_department(&mut persistence, "IT");
    let topic_id: i64 = seed_topic(&mut persistence, "Email", d1);
    let agent = seed_agent(&mut persistence, "jane", d1);

    let ticket = handlers::create_ticket(
        &mut persistence,
        &sender,
        &agent,
        &ticket_request(topic_id),
    )
    .expect("creation succeeds");
    handlers::escalate_ticket(
        &mut persistence,
        &agent,
        ticket.ticket_id,
        &EscalateTicketRequest { department_id: d2 },
    )
    .expect("escalation succeeds");

    let err = handlers::approve_escalation(&mut persistence, &agent, ticket.ticket_id)
        .expect_err("agent cannot approve");
    assert!(matches!(err, ApiError::Unauthorized { .. }));
}

#[test]
fn test_approve_escalation_without_pending_is_invalid_state() {
    let mut persistence = test_persistence();
    let sender = RecordingSender::new();
    let department_id: i64 = seed_department(&mut persistence, "Support");
    let topic_id: i64 = seed_topic(&mut persistence, "Email", department_id);
    let agent = seed_agent(&mut persistence, "jane", department_id);
    let admin = seed_admin(&mut persistence);

    let ticket = handlers::create_ticket(
        &mut persistence,
        &sender,
        &agent,
        &ticket_request(topic_id),
    )
    .expect("creation succeeds");

    let err = handlers::approve_escalation(&mut persistence, &admin, ticket.ticket_id)
        .expect_err("nothing to approve");
    assert!(matches!(err, ApiError::InvalidState { .. }));
}

#[test]
fn test_get_ticket_by_number() {
    let mut persistence = test_persistence();
    let sender = RecordingSender::new();
    let department_id: i64 = seed_department(&mut persistence, "Support");
    let topic_id: i64 = seed_topic(&mut persistence, "Email", department_id);
    let agent = seed_agent(&mut persistence, "jane", department_id);

    let ticket = handlers::create_ticket(
        &mut persistence,
        &sender,
        &agent,
        &ticket_request(topic_id),
    )
    .expect("creation succeeds");

    let found: TicketInfo = handlers::get_ticket_by_number(&mut persistence, &ticket.ticket_number)
        .expect("lookup succeeds");
    assert_eq!(found.ticket_id, ticket.ticket_id);

    let err = handlers::get_ticket_by_number(&mut persistence, "TKT-19700101-0001")
        .expect_err("unknown number rejected");
    assert!(matches!(err, ApiError::NotFound { .. }));
}

#[test]
fn test_list_my_tickets_includes_assigned() {
    let mut persistence = test_persistence();
    let sender = RecordingSender::new();
    let department_id: i64 = seed_department(&mut persistence, "Support");
    let topic_id: i64 = seed_topic(&mut persistence, "Email", department_id);
    let author = seed_agent(&mut persistence, "jane", department_id);
    let assignee = seed_agent(&mut persistence, "bob", department_id);

    let authored = handlers::create_ticket(
        &mut persistence,
        &sender,
        &author,
        &ticket_request(topic_id),
    )
    .expect("creation succeeds");
    let assigned = handlers::create_ticket(
        &mut persistence,
        &sender,
        &author,
        &CreateTicketRequest {
            title: "Keyboard missing keys".to_string(),
            assigned_to_id: assignee.user_id,
            ..ticket_request(topic_id)
        },
    )
    .expect("creation succeeds");

    let mine = handlers::list_my_tickets(&mut persistence, &assignee).expect("listing succeeds");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].ticket_id, assigned.ticket_id);

    let theirs = handlers::list_my_tickets(&mut persistence, &author).expect("listing succeeds");
    assert_eq!(theirs.len(), 2);
    assert!(theirs.iter().any(|t| t.ticket_id == authored.ticket_id));
}

#[test]
fn test_ticket_mutations_survive_notification_failure() {
    let mut persistence = test_persistence();
    let sender = RecordingSender::new();
    sender.fail_sends();
    let department_id: i64 = seed_department(&mut persistence, "Support");
    let topic_id: i64 = seed_topic(&mut persistence, "Email", department_id);
    let agent = seed_agent(&mut persistence, "jane", department_id);

    let ticket = handlers::create_ticket(
        &mut persistence,
        &sender,
        &agent,
        &ticket_request(topic_id),
    )
    .expect("creation commits despite the failed send");

    let updated = handlers::update_ticket_status(
        &mut persistence,
        &sender,
        &agent,
        ticket.ticket_id,
        &UpdateStatusRequest {
            status: "closed".to_string(),
        },
    )
    .expect("status change commits despite the failed send");

    assert_eq!(updated.status, "closed");
    assert!(sender.sent().is_empty());
}
