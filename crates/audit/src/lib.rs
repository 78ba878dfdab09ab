// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use clark_domain::{AdminId, CustomerId, EntityRef};
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

/// Actor type recorded for customer-initiated changes.
pub const ACTOR_CUSTOMER: &str = "customer";
/// Actor type recorded for back-office changes.
pub const ACTOR_ADMIN: &str = "admin";
/// Actor type recorded for jobs and other automated triggers.
pub const ACTOR_SYSTEM: &str = "system";

/// Represents the entity performing an action.
///
/// An actor is a customer, an admin, or a system process such as a
/// background job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (`customer`, `admin` or `system`).
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `actor_type` - The type of actor
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }

    /// The customer acting on their own behalf.
    #[must_use]
    pub fn customer(id: CustomerId) -> Self {
        Self::new(id.to_string(), String::from(ACTOR_CUSTOMER))
    }

    /// A back-office admin.
    #[must_use]
    pub fn admin(id: AdminId) -> Self {
        Self::new(id.to_string(), String::from(ACTOR_ADMIN))
    }

    /// An automated process, identified by name.
    #[must_use]
    pub fn system(name: &str) -> Self {
        Self::new(name.to_string(), String::from(ACTOR_SYSTEM))
    }
}

/// Represents the reason or trigger for an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., request ID, job ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this cause
    /// * `description` - A description of what triggered this action
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the specific action performed.
///
/// For lifecycle transitions the name is the fired event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The name of the action (e.g., "`request_analysis`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the action
    /// * `details` - Optional additional details
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// The lifecycle state of an entity at one side of a transition.
///
/// `state` is `None` when the entity had no state (for example a contract
/// that never entered analysis).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// The persisted state name.
    pub state: Option<String>,
}

impl StateSnapshot {
    /// Creates a new `StateSnapshot`.
    ///
    /// # Arguments
    ///
    /// * `state` - The persisted state name, if any
    #[must_use]
    pub const fn new(state: Option<String>) -> Self {
        Self { state }
    }

    /// Captures a state value through its `Display` form.
    #[must_use]
    pub fn of<S: std::fmt::Display>(state: Option<S>) -> Self {
        Self::new(state.map(|s| s.to_string()))
    }
}

/// An immutable audit event representing a state transition.
///
/// Every successful transition produces exactly one audit event, written in
/// the same unit of work as the state change. Audit events capture:
/// - Who performed the action (actor)
/// - Why it was performed (cause)
/// - What action was performed (action)
/// - Which entity changed (entity)
/// - The state before and after the transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The cause or reason for this state change.
    pub cause: Cause,
    /// The action that was performed.
    pub action: Action,
    /// The entity whose state changed.
    pub entity: EntityRef,
    /// The state before the transition.
    pub before: StateSnapshot,
    /// The state after the transition.
    pub after: StateSnapshot,
}

impl AuditEvent {
    /// Creates a new `AuditEvent`.
    ///
    /// # Arguments
    ///
    /// * `actor` - The actor who initiated the change
    /// * `cause` - The reason for the change
    /// * `action` - The action that was performed
    /// * `entity` - The entity that changed
    /// * `before` - The state before the transition
    /// * `after` - The state after the transition
    #[must_use]
    pub const fn new(
        actor: Actor,
        cause: Cause,
        action: Action,
        entity: EntityRef,
        before: StateSnapshot,
        after: StateSnapshot,
    ) -> Self {
        Self {
            actor,
            cause,
            action,
            entity,
            before,
            after,
        }
    }

    /// Builds the audit event for a fired lifecycle event.
    #[must_use]
    pub fn transition<S: std::fmt::Display, E: std::fmt::Display>(
        actor: Actor,
        cause: Cause,
        entity: EntityRef,
        event: E,
        before: Option<S>,
        after: S,
    ) -> Self {
        Self::new(
            actor,
            cause,
            Action::new(event.to_string(), None),
            entity,
            StateSnapshot::of(before),
            StateSnapshot::of(Some(after)),
        )
    }
}
