// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The uniform result every interactor returns.

use serde::Serialize;
use std::collections::BTreeMap;

/// Error string used for missing entities and entities owned by someone else.
pub const NOT_FOUND: &str = "not found";

/// Field key used for errors that do not belong to a specific input field.
pub const BASE_FIELD: &str = "base";

/// The immutable result of one interactor call.
///
/// An outcome is either successful with a payload, or failed with at least
/// one error message. It is built once by [`Outcome::success`] or one of the
/// failure constructors and cannot be changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome<P> {
    payload: Option<P>,
    errors: Vec<String>,
    error_fields: BTreeMap<String, String>,
}

impl<P> Outcome<P> {
    /// A successful outcome carrying `payload`.
    #[must_use]
    pub const fn success(payload: P) -> Self {
        Self {
            payload: Some(payload),
            errors: Vec::new(),
            error_fields: BTreeMap::new(),
        }
    }

    /// A failed outcome with general errors.
    ///
    /// An empty error list is replaced by a single generic message so a failed
    /// outcome always explains itself.
    #[must_use]
    pub fn failure(errors: Vec<String>) -> Self {
        let errors: Vec<String> = if errors.is_empty() {
            vec![String::from("operation failed")]
        } else {
            errors
        };
        let error_fields: BTreeMap<String, String> =
            BTreeMap::from([(String::from(BASE_FIELD), errors.join(", "))]);
        Self {
            payload: None,
            errors,
            error_fields,
        }
    }

    /// A failed outcome for a missing or foreign entity.
    #[must_use]
    pub fn not_found() -> Self {
        Self::failure(vec![String::from(NOT_FOUND)])
    }

    /// A failed outcome attributed to one input field.
    #[must_use]
    pub fn invalid(field: &str, message: &str) -> Self {
        Self {
            payload: None,
            errors: vec![format!("{field} {message}")],
            error_fields: BTreeMap::from([(field.to_string(), message.to_string())]),
        }
    }

    /// Returns true if the call succeeded.
    #[must_use]
    pub const fn successful(&self) -> bool {
        self.payload.is_some()
    }

    /// Human-readable error messages; empty on success.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Error messages keyed by the input field they concern.
    #[must_use]
    pub const fn error_fields(&self) -> &BTreeMap<String, String> {
        &self.error_fields
    }

    /// Returns true if the failure is the not-found case.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.errors.iter().any(|e| e == NOT_FOUND)
    }

    /// The payload; `None` on failure.
    #[must_use]
    pub const fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    /// Consumes the outcome, returning the payload.
    #[must_use]
    pub fn into_payload(self) -> Option<P> {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_has_no_errors() {
        let outcome: Outcome<u8> = Outcome::success(3);
        assert!(outcome.successful());
        assert!(outcome.errors().is_empty());
        assert_eq!(outcome.payload(), Some(&3));
    }

    #[test]
    fn test_not_found_uses_fixed_string() {
        let outcome: Outcome<u8> = Outcome::not_found();
        assert!(!outcome.successful());
        assert_eq!(outcome.errors(), [String::from("not found")]);
        assert!(outcome.is_not_found());
    }

    #[test]
    fn test_empty_failure_still_explains_itself() {
        let outcome: Outcome<u8> = Outcome::failure(Vec::new());
        assert_eq!(outcome.errors().len(), 1);
        assert_eq!(outcome.error_fields().len(), 1);
    }

    #[test]
    fn test_invalid_keeps_field() {
        let outcome: Outcome<u8> = Outcome::invalid("payback_number", "has already been taken");
        assert_eq!(
            outcome.error_fields().get("payback_number").map(String::as_str),
            Some("has already been taken")
        );
        assert!(!outcome.is_not_found());
    }
}
