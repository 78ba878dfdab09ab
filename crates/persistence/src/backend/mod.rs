// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-specific connection handling.
//!
//! Queries and mutations use Diesel DSL. Only connection setup, PRAGMA
//! handling and `last_insert_rowid()` live here.

pub mod sqlite;
