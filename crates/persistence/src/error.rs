// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clark::RepositoryError;
use clark_domain::EntityRef;

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// Serialization/deserialization error.
    SerializationError(String),
    /// Initialization error.
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// A stored row could not be turned back into a domain value.
    CorruptRow {
        /// The table the row came from.
        table: &'static str,
        /// What was wrong with it.
        reason: String,
    },
    /// Diesel reported a missing row without further context.
    RecordNotFound,
    /// The addressed row does not exist.
    NotFound {
        /// The kind of resource that was looked up.
        resource: &'static str,
        /// The identifier that was looked up.
        id: i64,
    },
    /// A compare-and-set update found a different stored state.
    StaleState(EntityRef),
    /// A constraint on a single field was violated.
    Validation {
        /// The offending field.
        field: String,
        /// Why it was rejected.
        message: String,
    },
    /// An error raised by caller-supplied work inside a transaction.
    Repository(RepositoryError),
    /// The connection mutex was poisoned by a panicking holder.
    LockPoisoned,
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::CorruptRow { table, reason } => {
                write!(f, "Corrupt row in {table}: {reason}")
            }
            Self::RecordNotFound => write!(f, "Record not found"),
            Self::NotFound { resource, id } => write!(f, "Not found: {resource} {id}"),
            Self::StaleState(entity) => write!(f, "Stale state: {entity} changed concurrently"),
            Self::Validation { field, message } => write!(f, "{field} {message}"),
            Self::Repository(err) => write!(f, "{err}"),
            Self::LockPoisoned => write!(f, "Database connection lock poisoned"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::RecordNotFound,
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<PersistenceError> for RepositoryError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound { resource, id } => Self::NotFound { resource, id },
            PersistenceError::StaleState(entity) => Self::StaleState { entity },
            PersistenceError::Validation { field, message } => Self::Validation { field, message },
            PersistenceError::Repository(inner) => inner,
            other => Self::Backend(other.to_string()),
        }
    }
}
