// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Contract lifecycle and the document-analysis sub-lifecycle.
//!
//! A contract carries two independent states: its top-level `state`
//! (offered product through management and termination) and its
//! `analysis_state`, which tracks the review of customer documents.
//! The analysis state may be absent on contracts that never entered review;
//! no event can be fired from an absent analysis state.

use crate::error::DomainError;
use crate::ids::{ContractId, CustomerId, EntityKind, SubcompanyId};
use crate::lifecycle::{StateMachine, Transition};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// Top-level contract states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractState {
    /// Product offered to the customer as part of an offer.
    Offered,
    /// Customer accepted the offer; order not yet confirmed by the insurer.
    OrderPending,
    /// Insurer confirmed the order.
    Ordered,
    /// Existing contract whose details were supplied by the customer.
    DetailsAvailable,
    /// Contract is actively managed.
    UnderManagement,
    /// Offered product was not taken.
    Canceled,
    /// Managed contract ended.
    Terminated,
}

impl ContractState {
    /// Every state, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Offered,
        Self::OrderPending,
        Self::Ordered,
        Self::DetailsAvailable,
        Self::UnderManagement,
        Self::Canceled,
        Self::Terminated,
    ];

    /// Returns the persisted string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Offered => "offered",
            Self::OrderPending => "order_pending",
            Self::Ordered => "ordered",
            Self::DetailsAvailable => "details_available",
            Self::UnderManagement => "under_management",
            Self::Canceled => "canceled",
            Self::Terminated => "terminated",
        }
    }
}

impl FromStr for ContractState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "offered" => Ok(Self::Offered),
            "order_pending" => Ok(Self::OrderPending),
            "ordered" => Ok(Self::Ordered),
            "details_available" => Ok(Self::DetailsAvailable),
            "under_management" => Ok(Self::UnderManagement),
            "canceled" => Ok(Self::Canceled),
            "terminated" => Ok(Self::Terminated),
            _ => Err(DomainError::UnknownState {
                entity: EntityKind::Contract,
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ContractState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Events declared for the top-level contract lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractEvent {
    /// Customer ordered the offered product.
    Order,
    /// Insurer confirmed the order.
    ConfirmOrder,
    /// Contract enters management.
    TakeUnderManagement,
    /// Offered or pending product is dropped.
    Cancel,
    /// Managed contract ends.
    Terminate,
}

impl ContractEvent {
    /// Every declared event, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Order,
        Self::ConfirmOrder,
        Self::TakeUnderManagement,
        Self::Cancel,
        Self::Terminate,
    ];

    /// Returns the event name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::ConfirmOrder => "confirm_order",
            Self::TakeUnderManagement => "take_under_management",
            Self::Cancel => "cancel",
            Self::Terminate => "terminate",
        }
    }
}

impl std::fmt::Display for ContractEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Registry for the top-level contract lifecycle.
#[derive(Debug, Clone, Copy)]
pub struct ContractLifecycle;

impl StateMachine for ContractLifecycle {
    type State = ContractState;
    type Event = ContractEvent;

    const ENTITY: EntityKind = EntityKind::Contract;

    const STATES: &'static [ContractState] = &ContractState::ALL;
    const EVENTS: &'static [ContractEvent] = &ContractEvent::ALL;

    const TRANSITIONS: &'static [Transition<ContractState, ContractEvent>] = &[
        Transition::new(
            ContractState::Offered,
            ContractEvent::Order,
            ContractState::OrderPending,
        ),
        Transition::new(
            ContractState::OrderPending,
            ContractEvent::ConfirmOrder,
            ContractState::Ordered,
        ),
        Transition::new(
            ContractState::Ordered,
            ContractEvent::TakeUnderManagement,
            ContractState::UnderManagement,
        ),
        Transition::new(
            ContractState::DetailsAvailable,
            ContractEvent::TakeUnderManagement,
            ContractState::UnderManagement,
        ),
        Transition::new(
            ContractState::Offered,
            ContractEvent::Cancel,
            ContractState::Canceled,
        ),
        Transition::new(
            ContractState::OrderPending,
            ContractEvent::Cancel,
            ContractState::Canceled,
        ),
        Transition::new(
            ContractState::UnderManagement,
            ContractEvent::Terminate,
            ContractState::Terminated,
        ),
    ];
}

/// Document-analysis states of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisState {
    /// Customer has not yet supplied the documents needed for review.
    DetailsMissing,
    /// Documents are being reviewed.
    UnderAnalysis,
    /// Review found problems; the customer must correct them.
    AnalysisFailed,
    /// Review completed.
    #[serde(alias = "details_completed")]
    DetailsComplete,
    /// Customer withdrew the contract from review.
    CustomerCanceledAnalysis,
}

impl AnalysisState {
    /// Every state, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::DetailsMissing,
        Self::UnderAnalysis,
        Self::AnalysisFailed,
        Self::DetailsComplete,
        Self::CustomerCanceledAnalysis,
    ];

    /// Returns the persisted string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DetailsMissing => "details_missing",
            Self::UnderAnalysis => "under_analysis",
            Self::AnalysisFailed => "analysis_failed",
            Self::DetailsComplete => "details_complete",
            Self::CustomerCanceledAnalysis => "customer_canceled_analysis",
        }
    }
}

impl FromStr for AnalysisState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "details_missing" => Ok(Self::DetailsMissing),
            "under_analysis" => Ok(Self::UnderAnalysis),
            "analysis_failed" => Ok(Self::AnalysisFailed),
            // Older rows were written with the past-tense spelling.
            "details_complete" | "details_completed" => Ok(Self::DetailsComplete),
            "customer_canceled_analysis" => Ok(Self::CustomerCanceledAnalysis),
            _ => Err(DomainError::UnknownState {
                entity: EntityKind::ContractAnalysis,
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for AnalysisState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Events declared for the analysis sub-lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisEvent {
    /// New documents arrived; review should start.
    RequestAnalysis,
    /// Customer entered the missing details directly.
    CustomerProvidesDetails,
    /// Reviewer finished the analysis.
    CompleteAnalysis,
    /// Reviewer rejected the documents and requested a correction.
    FailAnalysis,
    /// Customer withdrew from the review.
    CustomerCancelsAnalysis,
}

impl AnalysisEvent {
    /// Every declared event, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::RequestAnalysis,
        Self::CustomerProvidesDetails,
        Self::CompleteAnalysis,
        Self::FailAnalysis,
        Self::CustomerCancelsAnalysis,
    ];

    /// Returns the event name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RequestAnalysis => "request_analysis",
            Self::CustomerProvidesDetails => "customer_provides_details",
            Self::CompleteAnalysis => "complete_analysis",
            Self::FailAnalysis => "fail_analysis",
            Self::CustomerCancelsAnalysis => "customer_cancels_analysis",
        }
    }
}

impl FromStr for AnalysisEvent {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "request_analysis" => Ok(Self::RequestAnalysis),
            "customer_provides_details" => Ok(Self::CustomerProvidesDetails),
            "complete_analysis" => Ok(Self::CompleteAnalysis),
            "fail_analysis" => Ok(Self::FailAnalysis),
            "customer_cancels_analysis" => Ok(Self::CustomerCancelsAnalysis),
            _ => Err(DomainError::UnknownEvent {
                entity: EntityKind::ContractAnalysis,
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for AnalysisEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Registry for the analysis sub-lifecycle.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisLifecycle;

impl StateMachine for AnalysisLifecycle {
    type State = AnalysisState;
    type Event = AnalysisEvent;

    const ENTITY: EntityKind = EntityKind::ContractAnalysis;

    const STATES: &'static [AnalysisState] = &AnalysisState::ALL;
    const EVENTS: &'static [AnalysisEvent] = &AnalysisEvent::ALL;

    const TRANSITIONS: &'static [Transition<AnalysisState, AnalysisEvent>] = &[
        Transition::new(
            AnalysisState::DetailsMissing,
            AnalysisEvent::RequestAnalysis,
            AnalysisState::UnderAnalysis,
        ),
        Transition::new(
            AnalysisState::AnalysisFailed,
            AnalysisEvent::RequestAnalysis,
            AnalysisState::UnderAnalysis,
        ),
        Transition::new(
            AnalysisState::DetailsMissing,
            AnalysisEvent::CustomerProvidesDetails,
            AnalysisState::DetailsComplete,
        ),
        Transition::new(
            AnalysisState::UnderAnalysis,
            AnalysisEvent::CompleteAnalysis,
            AnalysisState::DetailsComplete,
        ),
        Transition::new(
            AnalysisState::UnderAnalysis,
            AnalysisEvent::FailAnalysis,
            AnalysisState::AnalysisFailed,
        ),
        Transition::new(
            AnalysisState::DetailsComplete,
            AnalysisEvent::FailAnalysis,
            AnalysisState::AnalysisFailed,
        ),
        Transition::new(
            AnalysisState::DetailsMissing,
            AnalysisEvent::CustomerCancelsAnalysis,
            AnalysisState::CustomerCanceledAnalysis,
        ),
        Transition::new(
            AnalysisState::AnalysisFailed,
            AnalysisEvent::CustomerCancelsAnalysis,
            AnalysisState::CustomerCanceledAnalysis,
        ),
    ];
}

/// A contract as loaded from a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    /// The contract identifier.
    pub id: ContractId,
    /// The owning customer.
    pub customer_id: CustomerId,
    /// Top-level lifecycle state.
    pub state: ContractState,
    /// Document-analysis state; `None` if the contract never entered review.
    pub analysis_state: Option<AnalysisState>,
    /// Insurance category identifier (e.g. `"private_liability"`).
    pub category_ident: String,
    /// The insurer subcompany, if known.
    pub subcompany_id: Option<SubcompanyId>,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Timestamp of the last state change.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Contract {
    /// Returns true if the contract belongs to `customer_id`.
    #[must_use]
    pub fn is_owned_by(&self, customer_id: CustomerId) -> bool {
        self.customer_id == customer_id
    }
}

/// Attributes of a contract to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContract {
    /// The owning customer.
    pub customer_id: CustomerId,
    /// Initial top-level state.
    pub state: ContractState,
    /// Initial analysis state.
    pub analysis_state: Option<AnalysisState>,
    /// Insurance category identifier.
    pub category_ident: String,
    /// The insurer subcompany, if known.
    pub subcompany_id: Option<SubcompanyId>,
}
