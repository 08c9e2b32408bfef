// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use chrono::NaiveDate;

/// Maximum length of a ticket title.
pub const TITLE_MAX_LENGTH: usize = 200;

/// Maximum length of a ticket description.
pub const DESCRIPTION_MAX_LENGTH: usize = 5000;

/// Minimum age, in years, for a registered account.
pub const MINIMUM_AGE_YEARS: u32 = 13;

/// Ages below this are treated as implausible input rather than a
/// policy violation, and messaged separately.
const IMPLAUSIBLE_AGE_YEARS: u32 = 5;

/// Normalizes a username: trimmed and lowercased.
#[must_use]
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Normalizes an email address: trimmed and lowercased.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates a normalized username.
///
/// # Errors
///
/// Returns an error if the username is empty or contains whitespace.
pub fn validate_username(username: &str) -> Result<(), DomainError> {
    if username.is_empty() {
        return Err(DomainError::InvalidUsername(String::from(
            "username must not be empty",
        )));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(DomainError::InvalidUsername(String::from(
            "username must not contain whitespace",
        )));
    }
    Ok(())
}

/// Validates a normalized email address.
///
/// Full RFC validation belongs to the HTTP boundary; this guards the
/// invariants the core relies on.
///
/// # Errors
///
/// Returns an error if the email is empty or lacks an `@`.
pub fn validate_email(email: &str) -> Result<(), DomainError> {
    if email.is_empty() {
        return Err(DomainError::InvalidEmail(String::from(
            "email must not be empty",
        )));
    }
    if !email.contains('@') {
        return Err(DomainError::InvalidEmail(String::from(
            "email must contain '@'",
        )));
    }
    Ok(())
}

/// Validates a ticket title against the length bound.
///
/// # Errors
///
/// Returns an error if the title is empty or too long.
pub fn validate_title(title: &str) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::InvalidTitle(String::from(
            "title must not be empty",
        )));
    }
    if title.len() > TITLE_MAX_LENGTH {
        return Err(DomainError::InvalidTitle(format!(
            "title exceeds {TITLE_MAX_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validates a ticket description against the length bound.
///
/// # Errors
///
/// Returns an error if the description is empty or too long.
pub fn validate_description(description: &str) -> Result<(), DomainError> {
    if description.trim().is_empty() {
        return Err(DomainError::InvalidDescription(String::from(
            "description must not be empty",
        )));
    }
    if description.len() > DESCRIPTION_MAX_LENGTH {
        return Err(DomainError::InvalidDescription(format!(
            "description exceeds {DESCRIPTION_MAX_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validates comment content.
///
/// # Errors
///
/// Returns an error if the content is empty.
pub fn validate_comment_content(content: &str) -> Result<(), DomainError> {
    if content.trim().is_empty() {
        return Err(DomainError::EmptyComment);
    }
    Ok(())
}

/// Validates a ticket progress value.
///
/// Out-of-range values are an error; progress is never clamped
/// silently.
///
/// # Errors
///
/// Returns an error if the value lies outside 0-100.
pub const fn validate_progress(value: i32) -> Result<(), DomainError> {
    if value < 0 || value > 100 {
        return Err(DomainError::InvalidProgress { value });
    }
    Ok(())
}

/// Validates a birthday string in `dd.mm.yyyy` format against a
/// reference date (normally today) and the registration age policy.
///
/// Returns the parsed date on success.
///
/// # Errors
///
/// - `InvalidBirthdayFormat` if the string does not parse.
/// - `BirthdayInFuture` if the date lies after `today`.
/// - `ImplausibleAge` for ages under 5 (obviously-invalid input).
/// - `AgeBelowMinimum` for ages 5-12 (policy violation).
pub fn validate_birthday(value: &str, today: NaiveDate) -> Result<NaiveDate, DomainError> {
    let birthday: NaiveDate = NaiveDate::parse_from_str(value, "%d.%m.%Y").map_err(|_| {
        DomainError::InvalidBirthdayFormat {
            value: value.to_string(),
        }
    })?;

    if birthday > today {
        return Err(DomainError::BirthdayInFuture {
            value: value.to_string(),
        });
    }

    let age: u32 = today.years_since(birthday).unwrap_or(0);
    if age < IMPLAUSIBLE_AGE_YEARS {
        return Err(DomainError::ImplausibleAge { age });
    }
    if age < MINIMUM_AGE_YEARS {
        return Err(DomainError::AgeBelowMinimum { age });
    }

    Ok(birthday)
}
