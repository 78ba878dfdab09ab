// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clark_domain::{DomainError, EntityRef, InvalidTransition};

/// Errors raised by repository implementations.
///
/// Backends translate their native failures into one of these variants at
/// the trait seam, so interactors never see a storage-specific error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// The requested row does not exist.
    #[error("{resource} {id} not found")]
    NotFound {
        /// The kind of resource that was looked up.
        resource: &'static str,
        /// The identifier that was looked up.
        id: i64,
    },
    /// The store rejected a field-level constraint.
    #[error("{field} {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// Why it was rejected.
        message: String,
    },
    /// A compare-and-set write found the entity in a different state than
    /// the one the transition was planned from.
    #[error("{entity} was modified concurrently")]
    StaleState {
        /// The entity whose pre-image no longer matched.
        entity: EntityRef,
    },
    /// The backing store failed.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Errors that escape an interactor.
///
/// Expected domain failures are reported through a failed `Outcome`; only
/// infrastructure failures, and the single documented invalid-transition
/// path of `MoveToSuccess`, surface as `CoreError`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// The entity does not exist or is not visible to the caller.
    #[error("not found")]
    NotFound,
    /// The guard rejected the event.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    /// Input failed domain validation.
    #[error(transparent)]
    Validation(#[from] DomainError),
    /// A collaborator failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
