// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod department_tests;
mod ticket_tests;

use helpdesk_core::RoleDefaults;
use helpdesk_domain::{Department, Role, Topic, TopicCategory, User, UserStatus};
use helpdesk_persistence::Persistence;

use crate::request_response::{CreateTicketRequest, RegisterRequest};

/// The plaintext password behind every seeded account.
pub const TEST_PASSWORD: &str = "Sw0rdfish!";

pub fn test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

pub fn no_defaults() -> RoleDefaults {
    RoleDefaults::default()
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

/// Seeds an account directly in the store, bypassing onboarding.
///
/// The bcrypt cost is the minimum to keep the suite fast.
pub fn seed_account(
    persistence: &mut Persistence,
    username: &str,
    role: Role,
    department_id: Option<i64>,
    status: UserStatus,
) -> User {
    let password_hash: String = bcrypt::hash(TEST_PASSWORD, 4).expect("password hashed");
    let user_id: i64 = persistence
        .create_user(&User {
            user_id: None,
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            birthday: Some("15.03.1990".to_string()),
            password_hash,
            role,
            department_id,
            default_department_id: None,
            status,
            email_verified: status == UserStatus::Active,
            email_verification_token: None,
        })
        .expect("user created");
    persistence
        .get_user_by_id(user_id)
        .expect("user lookup")
        .expect("seeded user exists")
}

pub fn seed_admin(persistence: &mut Persistence) -> User {
    seed_account(persistence, "root", Role::Admin, None, UserStatus::Active)
}

pub fn seed_agent(persistence: &mut Persistence, username: &str, department_id: i64) -> User {
    seed_account(
        persistence,
        username,
        Role::Agent,
        Some(department_id),
        UserStatus::Active,
    )
}

pub fn register_request(username: &str, department_id: Option<i64>) -> RegisterRequest {
    RegisterRequest {
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password: "CorrectHorse7!".to_string(),
        birthday: Some("15.03.1990".to_string()),
        role: "agent".to_string(),
        department_id,
    }
}

pub fn ticket_request(topic_id: i64) -> CreateTicketRequest {
    CreateTicketRequest {
        title: "Printer on fire".to_string(),
        description: "Smoke is coming out of the office printer.".to_string(),
        priority: None,
        department_id: None,
        topic_id,
        assigned_to_id: None,
        attachments: Vec::new(),
    }
}
