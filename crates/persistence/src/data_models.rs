// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

/// An authenticated session row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub user_id: i64,
    pub created_at: String,
    pub last_activity_at: String,
    pub expires_at: String,
}

/// The fields needed to insert a ticket.
///
/// The ticket number is not part of this struct: it is derived inside
/// the insert transaction from `created_day` and the per-day sequence.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub priority: String,
    pub author_id: i64,
    pub department_id: i64,
    pub topic_id: i64,
    pub created_day: String,
}
