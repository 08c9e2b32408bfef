// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    DESCRIPTION_MAX_LENGTH, DomainError, TITLE_MAX_LENGTH, day_key, format_ticket_number,
    normalize_email, normalize_username, validate_birthday, validate_description,
    validate_progress, validate_title,
};
use chrono::NaiveDate;

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
}

#[test]
fn test_validate_birthday_accepts_adult() {
    let result = validate_birthday("15.03.1990", reference_date());
    assert_eq!(result.unwrap(), NaiveDate::from_ymd_opt(1990, 3, 15).unwrap());
}

#[test]
fn test_validate_birthday_rejects_bad_format() {
    let result = validate_birthday("1990-03-15", reference_date());
    assert!(matches!(
        result,
        Err(DomainError::InvalidBirthdayFormat { .. })
    ));
}

#[test]
fn test_validate_birthday_rejects_future_date() {
    let result = validate_birthday("01.01.2030", reference_date());
    assert!(matches!(result, Err(DomainError::BirthdayInFuture { .. })));
}

#[test]
fn test_validate_birthday_under_five_is_implausible() {
    // Age 2 relative to the reference date.
    let result = validate_birthday("01.01.2024", reference_date());
    assert!(matches!(result, Err(DomainError::ImplausibleAge { age: 2 })));
}

#[test]
fn test_validate_birthday_under_thirteen_is_policy_violation() {
    // Age 6 relative to the reference date: plausible input, but below
    // the minimum registration age.
    let result = validate_birthday("01.01.2020", reference_date());
    assert!(matches!(result, Err(DomainError::AgeBelowMinimum { age: 6 })));
}

#[test]
fn test_validate_birthday_exactly_thirteen_is_accepted() {
    let result = validate_birthday("30.08.2013", reference_date());
    assert!(result.is_ok());
}

#[test]
fn test_validate_progress_bounds() {
    assert!(validate_progress(0).is_ok());
    assert!(validate_progress(100).is_ok());
    assert!(matches!(
        validate_progress(-1),
        Err(DomainError::InvalidProgress { value: -1 })
    ));
    assert!(matches!(
        validate_progress(101),
        Err(DomainError::InvalidProgress { value: 101 })
    ));
}

#[test]
fn test_validate_title_rejects_empty_and_oversized() {
    assert!(validate_title("Printer on fire").is_ok());
    assert!(matches!(
        validate_title("   "),
        Err(DomainError::InvalidTitle(_))
    ));
    let oversized: String = "x".repeat(TITLE_MAX_LENGTH + 1);
    assert!(matches!(
        validate_title(&oversized),
        Err(DomainError::InvalidTitle(_))
    ));
}

#[test]
fn test_validate_description_rejects_oversized() {
    let oversized: String = "x".repeat(DESCRIPTION_MAX_LENGTH + 1);
    assert!(matches!(
        validate_description(&oversized),
        Err(DomainError::InvalidDescription(_))
    ));
}

#[test]
fn test_normalization_lowercases_and_trims() {
    assert_eq!(normalize_username("  JDoe "), "jdoe");
    assert_eq!(normalize_email(" JDoe@Example.COM "), "jdoe@example.com");
}

#[test]
fn test_ticket_number_format_is_zero_padded() {
    let day: String = day_key(reference_date());
    assert_eq!(day, "20260830");
    assert_eq!(format_ticket_number(&day, 1), "TKT-20260830-0001");
    assert_eq!(format_ticket_number(&day, 42), "TKT-20260830-0042");
    assert_eq!(format_ticket_number(&day, 9999), "TKT-20260830-9999");
}
