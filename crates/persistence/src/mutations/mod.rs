// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write-side database access.
//!
//! All mutations are free functions taking a `&mut SqliteConnection`.
//! Multi-row mutations (ticket update + history, ledger pairs) run in
//! a transaction with the add-new-before-remove-old ordering preserved
//! inside it.

pub mod departments;
pub mod ledger;
pub mod sessions;
pub mod tickets;
pub mod topics;
pub mod users;
