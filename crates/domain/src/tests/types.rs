// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, Role, TicketPriority, TicketStatus, TopicCategory, UserStatus};
use std::str::FromStr;

#[test]
fn test_role_parse_round_trips() {
    for role in [Role::Admin, Role::Manager, Role::Supervisor, Role::Agent] {
        assert_eq!(Role::parse(role.as_str()).unwrap(), role);
    }
}

#[test]
fn test_role_parse_rejects_unknown_value() {
    let result: Result<Role, DomainError> = Role::parse("customer");
    assert!(matches!(result, Err(DomainError::InvalidRole(_))));
}

#[test]
fn test_only_admin_allows_missing_department() {
    assert!(Role::Admin.allows_missing_department());
    assert!(!Role::Manager.allows_missing_department());
    assert!(!Role::Supervisor.allows_missing_department());
    assert!(!Role::Agent.allows_missing_department());
}

#[test]
fn test_user_status_parse_round_trips() {
    for status in [
        UserStatus::PendingEmail,
        UserStatus::PendingAdmin,
        UserStatus::Active,
        UserStatus::Inactive,
    ] {
        assert_eq!(UserStatus::from_str(status.as_str()).unwrap(), status);
    }
}

#[test]
fn test_user_status_rejects_value_outside_closed_enum() {
    let result: Result<UserStatus, DomainError> = UserStatus::from_str("suspended");
    assert!(matches!(result, Err(DomainError::InvalidUserStatus(_))));
}

#[test]
fn test_onboarding_transitions_are_strictly_linear() {
    assert!(UserStatus::PendingEmail.can_transition_to(UserStatus::PendingAdmin));
    assert!(UserStatus::PendingAdmin.can_transition_to(UserStatus::Active));
    assert!(UserStatus::Active.can_transition_to(UserStatus::Inactive));

    // No state may be skipped.
    assert!(!UserStatus::PendingEmail.can_transition_to(UserStatus::Active));
    assert!(!UserStatus::PendingEmail.can_transition_to(UserStatus::Inactive));
    assert!(!UserStatus::PendingAdmin.can_transition_to(UserStatus::Inactive));

    // No backward transitions.
    assert!(!UserStatus::Active.can_transition_to(UserStatus::PendingAdmin));
    assert!(!UserStatus::Inactive.can_transition_to(UserStatus::Active));
}

#[test]
fn test_ticket_status_parse_round_trips() {
    for status in [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
        TicketStatus::Closed,
    ] {
        assert_eq!(TicketStatus::parse(status.as_str()).unwrap(), status);
    }
}

#[test]
fn test_ticket_status_in_progress_uses_spaced_form() {
    assert_eq!(TicketStatus::InProgress.as_str(), "in progress");
    assert_eq!(
        TicketStatus::parse("in progress").unwrap(),
        TicketStatus::InProgress
    );
}

#[test]
fn test_ticket_priority_defaults_to_medium() {
    assert_eq!(TicketPriority::default(), TicketPriority::Medium);
}

#[test]
fn test_ticket_priority_rejects_unknown_value() {
    let result: Result<TicketPriority, DomainError> = TicketPriority::parse("critical");
    assert!(matches!(result, Err(DomainError::InvalidPriority(_))));
}

#[test]
fn test_topic_category_parse_round_trips() {
    for category in [
        TopicCategory::Software,
        TopicCategory::Hardware,
        TopicCategory::Finance,
        TopicCategory::Sales,
        TopicCategory::Operation,
        TopicCategory::Server,
        TopicCategory::Category,
        TopicCategory::Other,
    ] {
        assert_eq!(TopicCategory::parse(category.as_str()).unwrap(), category);
    }
}
