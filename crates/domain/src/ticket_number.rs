// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::NaiveDate;

/// Prefix for all generated ticket numbers.
pub const TICKET_NUMBER_PREFIX: &str = "TKT";

/// Formats the day-scoped numbering key for a calendar date.
///
/// The key is `YYYYMMDD`. The caller decides which clock supplies the
/// date; the day boundary is the server's local midnight.
#[must_use]
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Formats a ticket number from a day key and a within-day sequence.
///
/// The sequence is 1-based and zero-padded to four digits, resetting
/// each calendar day: `TKT-YYYYMMDD-NNNN`.
#[must_use]
pub fn format_ticket_number(day: &str, seq: i64) -> String {
    format!("{TICKET_NUMBER_PREFIX}-{day}-{seq:04}")
}
