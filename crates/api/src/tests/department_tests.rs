// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{seed_admin, seed_agent, seed_department, seed_topic, test_persistence};
use crate::error::ApiError;
use crate::handlers;
use crate::request_response::{CreateDepartmentRequest, UpdateDepartmentRequest};

fn department_request(name: &str) -> CreateDepartmentRequest {
    CreateDepartmentRequest {
        name: name.to_string(),
        code: None,
        description: None,
        supervisor_id: None,
        manager_id: None,
        parent_department_id: None,
    }
}

#[test]
fn test_create_department() {
    let mut persistence = test_persistence();
    let admin = seed_admin(&mut persistence);

    let created = handlers::create_department(
        &mut persistence,
        &admin,
        &CreateDepartmentRequest {
            code: Some("SUP".to_string()),
            description: Some("First-line support".to_string()),
            ..department_request("Support")
        },
    )
    .expect("creation succeeds");

    assert_eq!(created.name, "Support");
    assert_eq!(created.code.as_deref(), Some("SUP"));
}

#[test]
fn test_create_department_requires_admin() {
    let mut persistence = test_persistence();
    let department_id: i64 = seed_department(&mut persistence, "Support");
    let agent = seed_agent(&mut persistence, "jane", department_id);

    let err = handlers::create_department(&mut persistence, &agent, &department_request("IT"))
        .expect_err("agent cannot create departments");
    assert!(matches!(err, ApiError::Unauthorized { .. }));
}

#[test]
fn test_create_department_empty_name_is_rejected() {
    let mut persistence = test_persistence();
    let admin = seed_admin(&mut persistence);

    let err = handlers::create_department(&mut persistence, &admin, &department_request("  "))
        .expect_err("blank name rejected");
    assert!(matches!(
        err,
        ApiError::ValidationError { ref field, .. } if field == "name"
    ));
}

#[test]
fn test_create_department_duplicate_name_is_conflict() {
    let mut persistence = test_persistence();
    let admin = seed_admin(&mut persistence);

    handlers::create_department(&mut persistence, &admin, &department_request("Support"))
        .expect("first creation succeeds");
    let err = handlers::create_department(&mut persistence, &admin, &department_request("Support"))
        .expect_err("duplicate name rejected");
    assert!(matches!(err, ApiError::Conflict { .. }));
}

#[test]
fn test_create_department_unknown_supervisor_is_invalid_reference() {
    let mut persistence = test_persistence();
    let admin = seed_admin(&mut persistence);

    let err = handlers::create_department(
        &mut persistence,
        &admin,
        &CreateDepartmentRequest {
            supervisor_id: Some(999),
            ..department_request("Support")
        },
    )
    .expect_err("unknown supervisor rejected");
    assert!(matches!(err, ApiError::InvalidReference { .. }));
}

#[test]
fn test_update_department() {
    let mut persistence = test_persistence();
    let admin = seed_admin(&mut persistence);
    let department_id: i64 = seed_department(&mut persistence, "Support");
    let supervisor = seed_agent(&mut persistence, "sup", department_id);

    let updated = handlers::update_department(
        &mut persistence,
        &admin,
        department_id,
        &UpdateDepartmentRequest {
            name: "Customer Support".to_string(),
            code: Some("CS".to_string()),
            description: None,
            supervisor_id: supervisor.user_id,
            manager_id: None,
            parent_department_id: None,
        },
    )
    .expect("update succeeds");

    assert_eq!(updated.name, "Customer Support");
    assert_eq!(updated.supervisor_id, supervisor.user_id);
}

#[test]
fn test_delete_empty_department() {
    let mut persistence = test_persistence();
    let admin = seed_admin(&mut persistence);
    let department_id: i64 = seed_department(&mut persistence, "Support");

    handlers::delete_department(&mut persistence, &admin, department_id)
        .expect("delete succeeds");
    assert!(
        handlers::get_department(&mut persistence, department_id).is_err()
    );
}

#[test]
fn test_delete_department_with_member_is_conflict() {
    let mut persistence = test_persistence();
    let admin = seed_admin(&mut persistence);
    let department_id: i64 = seed_department(&mut persistence, "Support");
    seed_agent(&mut persistence, "jane", department_id);

    let err = handlers::delete_department(&mut persistence, &admin, department_id)
        .expect_err("occupied department cannot be deleted");
    assert!(matches!(
        err,
        ApiError::Conflict { ref message }
            if message.contains("1 user(s)") && message.contains("0 topic(s)")
    ));
}

#[test]
fn test_delete_department_with_topic_is_conflict() {
    let mut persistence = test_persistence();
    let admin = seed_admin(&mut persistence);
    let department_id: i64 = seed_department(&mut persistence, "Support");
    seed_topic(&mut persistence, "Email", department_id);

    let err = handlers::delete_department(&mut persistence, &admin, department_id)
        .expect_err("department with topics cannot be deleted");
    assert!(matches!(
        err,
        ApiError::Conflict { ref message } if message.contains("1 topic(s)")
    ));
}

#[test]
fn test_delete_unknown_department_is_not_found() {
    let mut persistence = test_persistence();
    let admin = seed_admin(&mut persistence);

    let err = handlers::delete_department(&mut persistence, &admin, 999)
        .expect_err("unknown department rejected");
    assert!(matches!(err, ApiError::NotFound { .. }));
}

#[test]
fn test_list_departments_needs_no_role() {
    let mut persistence = test_persistence();
    seed_department(&mut persistence, "Support");
    seed_department(&mut persistence, "IT");

    let departments = handlers::list_departments(&mut persistence).expect("listing succeeds");
    assert_eq!(departments.len(), 2);
}
