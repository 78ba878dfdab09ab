// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The state registry shared by every lifecycle entity.
//!
//! Each entity type declares a static table of `(from, event) -> to`
//! transitions. The table is the single source of truth: a pair that is not
//! listed is not a transition, and looking it up yields nothing.

use crate::ids::EntityKind;

/// A single registered transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<S, E> {
    /// The state the entity must be in.
    pub from: S,
    /// The event being fired.
    pub event: E,
    /// The state the entity moves to.
    pub to: S,
}

impl<S, E> Transition<S, E> {
    /// Declares a transition.
    pub const fn new(from: S, event: E, to: S) -> Self {
        Self { from, event, to }
    }
}

/// A lifecycle state machine described by a static transition table.
///
/// Implementors are zero-sized marker types; the trait carries no runtime
/// state and every method is a pure lookup.
pub trait StateMachine {
    /// The entity's state set.
    type State: Copy + Eq + std::fmt::Display + 'static;
    /// The entity's declared events.
    type Event: Copy + Eq + std::fmt::Display + 'static;

    /// The entity kind this machine drives.
    const ENTITY: EntityKind;

    /// Every state of the entity.
    const STATES: &'static [Self::State];

    /// Every event declared for the entity.
    const EVENTS: &'static [Self::Event];

    /// All registered transitions.
    const TRANSITIONS: &'static [Transition<Self::State, Self::Event>];

    /// Looks up the registered next state for `(current, event)`.
    #[must_use]
    fn next_state(current: Self::State, event: Self::Event) -> Option<Self::State> {
        Self::TRANSITIONS
            .iter()
            .find(|t| t.from == current && t.event == event)
            .map(|t| t.to)
    }

    /// Returns true if `event` is declared from `current`.
    #[must_use]
    fn permits(current: Self::State, event: Self::Event) -> bool {
        Self::next_state(current, event).is_some()
    }

    /// Returns every event that may be fired from `current`, in table order.
    #[must_use]
    fn events_from(current: Self::State) -> Vec<Self::Event> {
        Self::TRANSITIONS
            .iter()
            .filter(|t| t.from == current)
            .map(|t| t.event)
            .collect()
    }
}

/// A rejected `(state, event)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTransition {
    /// The entity kind whose registry rejected the event.
    pub entity: EntityKind,
    /// The current state, or `None` if the entity had no state.
    pub from: Option<String>,
    /// The event that was fired.
    pub event: String,
}

impl InvalidTransition {
    /// Builds a rejection for the given machine.
    #[must_use]
    pub fn new<M: StateMachine>(from: Option<M::State>, event: M::Event) -> Self {
        Self {
            entity: M::ENTITY,
            from: from.map(|s| s.to_string()),
            event: event.to_string(),
        }
    }
}

impl std::fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cannot fire '{}' on {} in state '{}'",
            self.event,
            self.entity,
            self.from.as_deref().unwrap_or("nil")
        )
    }
}

impl std::error::Error for InvalidTransition {}
