// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `SQLite` persistence for the Clark lifecycle engine.
//!
//! [`Persistence`] implements every repository trait of the core crate on top
//! of Diesel. One connection is shared behind a mutex; each state-changing
//! call opens an immediate transaction in which the compare-and-set check,
//! the update and the audit insert commit together.
//!
//! ## Layout
//!
//! - `backend::sqlite`: connection setup, PRAGMAs, migrations
//! - `queries/`: read-side Diesel DSL, one module per aggregate
//! - `mutations/`: write-side Diesel DSL
//! - `repositories`: the trait implementations tying both together
//!
//! ## Storage conventions
//!
//! - Enumerations are stored by their `as_str` form
//! - Timestamps are RFC 3339 strings in UTC
//! - String maps (interaction metadata, notification payloads) are JSON objects
//!
//! ## Testing
//!
//! Tests run against a fresh shared-cache in-memory database per
//! [`Persistence::new_in_memory`] call.

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
#![allow(clippy::multiple_crate_versions)]

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod repositories;

#[cfg(test)]
mod tests;

use diesel::{Connection, SqliteConnection};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

pub use error::PersistenceError;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Diesel-backed implementation of the core repository traits.
pub struct Persistence {
    conn: Mutex<SqliteConnection>,
}

impl Persistence {
    /// Creates a persistence adapter with an isolated in-memory `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String =
            format!("file:clark_memdb_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates a persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError(String::from("Invalid database path"))
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, SqliteConnection>, PersistenceError> {
        self.conn.lock().map_err(|_| PersistenceError::LockPoisoned)
    }

    /// Runs read-only work on the shared connection.
    fn read<T>(
        &self,
        work: impl FnOnce(&mut SqliteConnection) -> Result<T, PersistenceError>,
    ) -> Result<T, PersistenceError> {
        let mut conn: MutexGuard<'_, SqliteConnection> = self.connection()?;
        work(&mut *conn)
    }

    /// Runs `work` in an immediate transaction; any error rolls it back.
    fn write<T>(
        &self,
        work: impl FnOnce(&mut SqliteConnection) -> Result<T, PersistenceError>,
    ) -> Result<T, PersistenceError> {
        let mut conn: MutexGuard<'_, SqliteConnection> = self.connection()?;
        conn.immediate_transaction(work)
    }
}
