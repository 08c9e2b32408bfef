// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{seed_department, seed_user, test_persistence};

#[test]
fn test_session_round_trip() {
    let mut persistence = test_persistence();
    let department_id = seed_department(&mut persistence, "IT");
    let user_id = seed_user(&mut persistence, "jdoe", Some(department_id));

    persistence
        .create_session("token-abc", user_id, "2099-01-01T00:00:00Z")
        .unwrap();

    let session = persistence
        .get_session_by_token("token-abc")
        .unwrap()
        .unwrap();
    assert_eq!(session.user_id, user_id);

    persistence.delete_session("token-abc").unwrap();
    assert!(
        persistence
            .get_session_by_token("token-abc")
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_expired_sessions_are_swept() {
    let mut persistence = test_persistence();
    let department_id = seed_department(&mut persistence, "IT");
    let user_id = seed_user(&mut persistence, "jdoe", Some(department_id));

    persistence
        .create_session("stale", user_id, "2000-01-01 00:00:00")
        .unwrap();
    persistence
        .create_session("fresh", user_id, "2099-01-01 00:00:00")
        .unwrap();

    let swept = persistence.delete_expired_sessions().unwrap();
    assert_eq!(swept, 1);
    assert!(persistence.get_session_by_token("stale").unwrap().is_none());
    assert!(persistence.get_session_by_token("fresh").unwrap().is_some());
}

#[test]
fn test_deactivation_sweeps_all_user_sessions() {
    let mut persistence = test_persistence();
    let department_id = seed_department(&mut persistence, "IT");
    let user_id = seed_user(&mut persistence, "jdoe", Some(department_id));
    let other_id = seed_user(&mut persistence, "asmith", Some(department_id));

    persistence
        .create_session("one", user_id, "2099-01-01 00:00:00")
        .unwrap();
    persistence
        .create_session("two", user_id, "2099-01-01 00:00:00")
        .unwrap();
    persistence
        .create_session("other", other_id, "2099-01-01 00:00:00")
        .unwrap();

    let deleted = persistence.delete_sessions_for_user(user_id).unwrap();
    assert_eq!(deleted, 2);
    assert!(persistence.get_session_by_token("other").unwrap().is_some());
}
