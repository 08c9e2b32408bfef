// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod session_tests;

use helpdesk_domain::{Department, Role, Topic, TopicCategory, User, UserStatus};

use crate::{NewTicket, Persistence};

pub fn test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

pub fn seed_department(persistence: &mut Persistence, name: &str) -> i64 {
    persistence
        .create_department(&Department {
            department_id: None,
            name: name.to_string(),
            code: None,
            description: None,
            supervisor_id: None,
            manager_id: None,
            parent_department_id: None,
        })
        .expect("department created")
}

pub fn test_user(username: &str, department_id: Option<i64>) -> User {
    User {
        user_id: None,
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        birthday: Some("15.03.1990".to_string()),
        password_hash: "$2b$12$abcdefghijklmnopqrstuv".to_string(),
        role: Role::Agent,
        department_id,
        default_department_id: department_id,
        status: UserStatus::PendingEmail,
        email_verified: false,
        email_verification_token: Some(format!("token-{username}")),
    }
}

pub fn seed_user(persistence: &mut Persistence, username: &str, department_id: Option<i64>) -> i64 {
    persistence
        .create_user(&test_user(username, department_id))
        .expect("user created")
}

pub fn seed_topic(persistence: &mut Persistence, name: &str, department_id: i64) -> i64 {
    persistence
        .create_topic(&Topic {
            topic_id: None,
            name: name.to_string(),
            category: TopicCategory::Software,
            subcategory: None,
            description: None,
            department_id,
            version: 1,
        })
        .expect("topic created")
}

pub fn seed_ticket(
    persistence: &mut Persistence,
    author_id: i64,
    department_id: i64,
    topic_id: i64,
    day: &str,
) -> (i64, String) {
    persistence
        .create_ticket(&NewTicket {
            title: "Printer on fire".to_string(),
            description: "Smoke is coming out of the office printer.".to_string(),
            priority: "medium".to_string(),
            author_id,
            department_id,
            topic_id,
            created_day: day.to_string(),
        })
        .expect("ticket created")
}
