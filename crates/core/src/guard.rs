// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clark_domain::{InvalidTransition, StateMachine};
use tracing::debug;

/// Fires `event` against `current` using the registry of `M`.
///
/// # Arguments
///
/// * `current` - The entity's current state; `None` for an entity with no state
/// * `event` - The event to fire
///
/// # Returns
///
/// The registered next state.
///
/// # Errors
///
/// Returns `InvalidTransition` if `current` is `None` or the pair is not registered.
pub fn fire_event<M: StateMachine>(
    current: Option<M::State>,
    event: M::Event,
) -> Result<M::State, InvalidTransition> {
    let next: Option<M::State> = current.and_then(|state| M::next_state(state, event));

    next.ok_or_else(|| {
        let rejected: InvalidTransition = InvalidTransition::new::<M>(current, event);
        debug!(
            entity = %rejected.entity,
            from = rejected.from.as_deref().unwrap_or("nil"),
            event = %rejected.event,
            "transition rejected"
        );
        rejected
    })
}
