// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Offers and their options.

use crate::error::DomainError;
use crate::ids::{ContractId, CustomerId, EntityKind, OfferId, OfferOptionId, OpportunityId};
use crate::lifecycle::{StateMachine, Transition};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// Offer states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferState {
    /// Offer is being prepared by an admin.
    InCreation,
    /// Offer is visible to the customer and may be accepted.
    Active,
    /// Customer accepted one of the options.
    Accepted,
    /// Offer passed its validity date without being accepted.
    Expired,
    /// Offer was withdrawn.
    Canceled,
}

impl OfferState {
    /// Every state, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::InCreation,
        Self::Active,
        Self::Accepted,
        Self::Expired,
        Self::Canceled,
    ];

    /// Returns the persisted string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InCreation => "in_creation",
            Self::Active => "active",
            Self::Accepted => "accepted",
            Self::Expired => "expired",
            Self::Canceled => "canceled",
        }
    }
}

impl FromStr for OfferState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_creation" => Ok(Self::InCreation),
            "active" => Ok(Self::Active),
            "accepted" => Ok(Self::Accepted),
            "expired" => Ok(Self::Expired),
            "canceled" => Ok(Self::Canceled),
            _ => Err(DomainError::UnknownState {
                entity: EntityKind::Offer,
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for OfferState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Offer events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferEvent {
    Activate,
    Accept,
    Expire,
    Cancel,
}

impl OfferEvent {
    /// Every declared event, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Activate,
        Self::Accept,
        Self::Expire,
        Self::Cancel,
    ];

    /// Returns the event name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::Accept => "accept",
            Self::Expire => "expire",
            Self::Cancel => "cancel",
        }
    }
}

impl std::fmt::Display for OfferEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Registry for the offer lifecycle.
#[derive(Debug, Clone, Copy)]
pub struct OfferLifecycle;

impl StateMachine for OfferLifecycle {
    type State = OfferState;
    type Event = OfferEvent;

    const ENTITY: EntityKind = EntityKind::Offer;

    const STATES: &'static [OfferState] = &OfferState::ALL;
    const EVENTS: &'static [OfferEvent] = &OfferEvent::ALL;

    const TRANSITIONS: &'static [Transition<OfferState, OfferEvent>] = &[
        Transition::new(OfferState::InCreation, OfferEvent::Activate, OfferState::Active),
        Transition::new(OfferState::Active, OfferEvent::Accept, OfferState::Accepted),
        Transition::new(OfferState::Active, OfferEvent::Expire, OfferState::Expired),
        Transition::new(OfferState::InCreation, OfferEvent::Cancel, OfferState::Canceled),
        Transition::new(OfferState::Active, OfferEvent::Cancel, OfferState::Canceled),
    ];
}

/// One offered product within an offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferOption {
    pub id: OfferOptionId,
    pub offer_id: OfferId,
    /// The offered product; a contract in state `offered` until accepted.
    pub contract_id: ContractId,
    pub recommended: bool,
}

/// An offer presented to a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub customer_id: CustomerId,
    pub opportunity_id: OpportunityId,
    pub state: OfferState,
    #[serde(with = "time::serde::rfc3339")]
    pub valid_until: OffsetDateTime,
    pub options: Vec<OfferOption>,
}

impl Offer {
    /// Finds the option with the given id.
    #[must_use]
    pub fn option(&self, option_id: OfferOptionId) -> Option<&OfferOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    /// Returns true if the offer is active and its validity has lapsed at `now`.
    #[must_use]
    pub fn is_due_for_expiry(&self, now: OffsetDateTime) -> bool {
        self.state == OfferState::Active && self.valid_until <= now
    }
}

/// Attributes of an offer to be created, with its offered products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOffer {
    pub customer_id: CustomerId,
    pub opportunity_id: OpportunityId,
    pub state: OfferState,
    pub valid_until: OffsetDateTime,
    /// `(offered contract, recommended)` pairs.
    pub options: Vec<(ContractId, bool)>,
}
