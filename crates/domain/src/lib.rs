// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod error;
mod ticket_number;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use error::DomainError;
pub use ticket_number::{TICKET_NUMBER_PREFIX, day_key, format_ticket_number};
pub use types::{
    Attachment, Comment, Department, HistoryEntry, Role, Ticket, TicketPriority, TicketStatus,
    Topic, TopicCategory, User, UserStatus,
};
pub use validation::{
    DESCRIPTION_MAX_LENGTH, MINIMUM_AGE_YEARS, TITLE_MAX_LENGTH, normalize_email,
    normalize_username, validate_birthday, validate_comment_content, validate_description,
    validate_email, validate_progress, validate_title, validate_username,
};
