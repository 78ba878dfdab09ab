// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::ids::{AdminId, CustomerId, EntityKind, OfferId, OpportunityId};
use crate::lifecycle::{StateMachine, Transition};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Sales-opportunity states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityState {
    /// Opportunity exists but no admin owns it yet.
    Created,
    /// An admin is gathering requirements.
    InitiationPhase,
    /// An offer has been sent.
    OfferPhase,
    /// Customer bought.
    Completed,
    /// Customer did not buy.
    Lost,
}

impl OpportunityState {
    /// Every state, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Created,
        Self::InitiationPhase,
        Self::OfferPhase,
        Self::Completed,
        Self::Lost,
    ];

    /// Returns the persisted string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::InitiationPhase => "initiation_phase",
            Self::OfferPhase => "offer_phase",
            Self::Completed => "completed",
            Self::Lost => "lost",
        }
    }

    /// Returns true if no further events are declared from this state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Lost)
    }
}

impl FromStr for OpportunityState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "initiation_phase" => Ok(Self::InitiationPhase),
            "offer_phase" => Ok(Self::OfferPhase),
            "completed" => Ok(Self::Completed),
            "lost" => Ok(Self::Lost),
            _ => Err(DomainError::UnknownState {
                entity: EntityKind::Opportunity,
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for OpportunityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sales-opportunity events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityEvent {
    Assign,
    SendOffer,
    Complete,
    Lose,
}

impl OpportunityEvent {
    /// Every declared event, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Assign,
        Self::SendOffer,
        Self::Complete,
        Self::Lose,
    ];

    /// Returns the event name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Assign => "assign",
            Self::SendOffer => "send_offer",
            Self::Complete => "complete",
            Self::Lose => "lose",
        }
    }
}

impl std::fmt::Display for OpportunityEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Registry for the opportunity lifecycle.
#[derive(Debug, Clone, Copy)]
pub struct OpportunityLifecycle;

impl StateMachine for OpportunityLifecycle {
    type State = OpportunityState;
    type Event = OpportunityEvent;

    const ENTITY: EntityKind = EntityKind::Opportunity;

    const STATES: &'static [OpportunityState] = &OpportunityState::ALL;
    const EVENTS: &'static [OpportunityEvent] = &OpportunityEvent::ALL;

    const TRANSITIONS: &'static [Transition<OpportunityState, OpportunityEvent>] = &[
        Transition::new(
            OpportunityState::Created,
            OpportunityEvent::Assign,
            OpportunityState::InitiationPhase,
        ),
        Transition::new(
            OpportunityState::InitiationPhase,
            OpportunityEvent::SendOffer,
            OpportunityState::OfferPhase,
        ),
        Transition::new(
            OpportunityState::InitiationPhase,
            OpportunityEvent::Complete,
            OpportunityState::Completed,
        ),
        Transition::new(
            OpportunityState::OfferPhase,
            OpportunityEvent::Complete,
            OpportunityState::Completed,
        ),
        Transition::new(
            OpportunityState::Created,
            OpportunityEvent::Lose,
            OpportunityState::Lost,
        ),
        Transition::new(
            OpportunityState::InitiationPhase,
            OpportunityEvent::Lose,
            OpportunityState::Lost,
        ),
        Transition::new(
            OpportunityState::OfferPhase,
            OpportunityEvent::Lose,
            OpportunityState::Lost,
        ),
    ];
}

/// A sales opportunity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: OpportunityId,
    pub customer_id: CustomerId,
    pub admin_id: Option<AdminId>,
    pub state: OpportunityState,
    pub offer_id: Option<OfferId>,
}

/// Attributes of an opportunity to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOpportunity {
    pub customer_id: CustomerId,
    pub admin_id: Option<AdminId>,
    pub state: OpportunityState,
}
