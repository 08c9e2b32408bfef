// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-side database access.
//!
//! All queries are free functions taking a `&mut SqliteConnection` and
//! use Diesel DSL exclusively.

pub mod departments;
pub mod sessions;
pub mod tickets;
pub mod topics;
pub mod users;
