// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use helpdesk_domain::{Role, Ticket, TicketPriority, TicketStatus, User, UserStatus};

pub fn sample_ticket() -> Ticket {
    Ticket {
        ticket_id: Some(1),
        ticket_number: "TKT-20260830-0001".to_string(),
        title: "Printer on fire".to_string(),
        description: "Smoke is coming out of the office printer.".to_string(),
        status: TicketStatus::Open,
        progress: 0,
        priority: TicketPriority::Medium,
        author_id: 7,
        assigned_to_id: None,
        department_id: 2,
        topic_id: 3,
        escalated_to_department_id: None,
        escalation_approved_by: None,
        comments: Vec::new(),
        history: Vec::new(),
        attachments: Vec::new(),
        created_at: "2026-08-30T08:00:00Z".to_string(),
        updated_at: "2026-08-30T08:00:00Z".to_string(),
    }
}

pub fn sample_user(status: UserStatus) -> User {
    User {
        user_id: Some(7),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        username: "jdoe".to_string(),
        email: "jdoe@example.com".to_string(),
        birthday: Some("15.03.1990".to_string()),
        password_hash: "$2b$12$abcdefghijklmnopqrstuv".to_string(),
        role: Role::Agent,
        department_id: Some(2),
        default_department_id: Some(2),
        status,
        email_verified: !matches!(status, UserStatus::PendingEmail),
        email_verification_token: match status {
            UserStatus::PendingEmail => Some("token".to_string()),
            _ => None,
        },
    }
}
