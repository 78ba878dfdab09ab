// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::ids::EntityKind;
use crate::payback::MAX_TRANSACTION_POINTS;

/// Errors that can occur during domain parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A persisted or requested state name is not part of the entity's state set.
    UnknownState {
        /// The entity whose state set was consulted.
        entity: EntityKind,
        /// The offending value.
        value: String,
    },
    /// A requested event name is not declared for the entity.
    UnknownEvent {
        /// The entity whose event set was consulted.
        entity: EntityKind,
        /// The offending value.
        value: String,
    },
    /// Entity kind string is not recognised.
    UnknownEntityKind(String),
    /// Document type string is not recognised.
    UnknownDocumentType(String),
    /// Notification channel string is not recognised.
    UnknownChannel(String),
    /// Notification status string is not recognised.
    UnknownNotificationStatus(String),
    /// Interaction kind string is not recognised.
    UnknownInteractionKind(String),
    /// Payback transaction kind or state string is not recognised.
    UnknownPaybackValue(String),
    /// Timezone name could not be resolved.
    InvalidTimezone(String),
    /// An interaction record is structurally incomplete.
    InvalidInteraction {
        /// The field that failed validation.
        field: &'static str,
        /// Why the field was rejected.
        reason: String,
    },
    /// Payback number is malformed.
    InvalidPaybackNumber(String),
    /// Point amounts must be positive and at most `MAX_TRANSACTION_POINTS`.
    InvalidPoints(i64),
    /// A customer's balance no longer fits the point type.
    BalanceOverflow {
        /// The customer whose entries overflowed.
        customer_id: i64,
    },
    /// Pagination parameters are out of range.
    InvalidPagination {
        /// Description of the violation.
        reason: String,
    },
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownState { entity, value } => {
                write!(f, "Unknown {entity} state '{value}'")
            }
            Self::UnknownEvent { entity, value } => {
                write!(f, "Unknown {entity} event '{value}'")
            }
            Self::UnknownEntityKind(value) => write!(f, "Unknown entity kind '{value}'"),
            Self::UnknownDocumentType(value) => write!(f, "Unknown document type '{value}'"),
            Self::UnknownChannel(value) => write!(f, "Unknown notification channel '{value}'"),
            Self::UnknownNotificationStatus(value) => {
                write!(f, "Unknown notification status '{value}'")
            }
            Self::UnknownInteractionKind(value) => {
                write!(f, "Unknown interaction kind '{value}'")
            }
            Self::UnknownPaybackValue(value) => write!(f, "Unknown payback value '{value}'"),
            Self::InvalidTimezone(tz) => write!(f, "Invalid timezone '{tz}'"),
            Self::InvalidInteraction { field, reason } => {
                write!(f, "Invalid interaction field '{field}': {reason}")
            }
            Self::InvalidPaybackNumber(number) => {
                write!(
                    f,
                    "Invalid payback number '{number}'. Must be exactly 10 digits"
                )
            }
            Self::InvalidPoints(points) => {
                write!(
                    f,
                    "Invalid point amount: {points}. Must be between 1 and {MAX_TRANSACTION_POINTS}"
                )
            }
            Self::BalanceOverflow { customer_id } => {
                write!(f, "Payback balance of customer {customer_id} overflows")
            }
            Self::InvalidPagination { reason } => write!(f, "Invalid pagination: {reason}"),
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
