// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use std::collections::BTreeMap;

use clark::{CoreError, Outcome, RepositoryError};
use clark_domain::DomainError;

use crate::jobs::JobError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A lifecycle rule rejected the request.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// An interactor returned a failed outcome.
    OperationFailed {
        /// The outcome's error messages.
        errors: Vec<String>,
        /// The outcome's errors keyed by field.
        fields: BTreeMap<String, String>,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Errors keyed by field, as rendered in the error envelope's `meta.data`.
    #[must_use]
    pub fn field_errors(&self) -> BTreeMap<String, String> {
        match self {
            Self::InvalidInput { field, message } => {
                BTreeMap::from([(field.clone(), message.clone())])
            }
            Self::OperationFailed { fields, .. } => fields.clone(),
            Self::DomainRuleViolation { rule, message } => {
                BTreeMap::from([(rule.clone(), message.clone())])
            }
            Self::AuthenticationFailed { .. }
            | Self::Unauthorized { .. }
            | Self::ResourceNotFound { .. }
            | Self::Internal { .. } => BTreeMap::new(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::OperationFailed { errors, .. } => {
                write!(f, "Operation failed: {}", errors.join(", "))
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    let field: &str = match &err {
        DomainError::UnknownState { .. } => "state",
        DomainError::UnknownEvent { .. } => "event",
        DomainError::UnknownEntityKind(_) => "entity_kind",
        DomainError::UnknownDocumentType(_) => "document_type",
        DomainError::UnknownChannel(_) => "channel",
        DomainError::UnknownNotificationStatus(_) => "status",
        DomainError::UnknownInteractionKind(_) | DomainError::UnknownPaybackValue(_) => "kind",
        DomainError::InvalidTimezone(_) => "timezone",
        DomainError::InvalidInteraction { field, .. } => *field,
        DomainError::InvalidPaybackNumber(_) => "payback_number",
        DomainError::InvalidPoints(_) | DomainError::BalanceOverflow { .. } => "points",
        DomainError::InvalidPagination { .. } => "page",
        DomainError::DateArithmeticOverflow { .. } => "date",
    };
    ApiError::InvalidInput {
        field: field.to_string(),
        message,
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::NotFound => ApiError::ResourceNotFound {
            resource_type: String::from("Resource"),
            message: String::from("not found"),
        },
        CoreError::InvalidTransition(rejection) => ApiError::DomainRuleViolation {
            rule: String::from("transition"),
            message: rejection.to_string(),
        },
        CoreError::Validation(domain_err) => translate_domain_error(domain_err),
        CoreError::Repository(RepositoryError::NotFound { resource, id }) => {
            ApiError::ResourceNotFound {
                resource_type: resource.to_string(),
                message: format!("{resource} {id} does not exist"),
            }
        }
        CoreError::Repository(RepositoryError::Validation { field, message }) => {
            ApiError::InvalidInput { field, message }
        }
        CoreError::Repository(repository_err) => ApiError::Internal {
            message: repository_err.to_string(),
        },
    }
}

/// Unwraps a successful outcome, translating a failed one.
///
/// A not-found outcome becomes `ResourceNotFound` for `resource_type`; every
/// other failure becomes `OperationFailed` carrying the outcome's errors.
///
/// # Errors
///
/// Returns an error if the outcome failed.
pub fn outcome_payload<P>(outcome: Outcome<P>, resource_type: &str) -> Result<P, ApiError> {
    if outcome.is_not_found() {
        return Err(ApiError::ResourceNotFound {
            resource_type: resource_type.to_string(),
            message: format!("{resource_type} not found"),
        });
    }
    let errors: Vec<String> = outcome.errors().to_vec();
    let fields: BTreeMap<String, String> = outcome.error_fields().clone();
    outcome
        .into_payload()
        .ok_or(ApiError::OperationFailed { errors, fields })
}

impl From<JobError> for ApiError {
    fn from(err: JobError) -> Self {
        Self::Internal {
            message: err.to_string(),
        }
    }
}
