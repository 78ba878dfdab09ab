// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Inquiries to insurers and their per-category lines.
//!
//! An inquiry asks one insurer subcompany about one or more insurance
//! categories. Each category is resolved on its own; once every category is
//! terminal the inquiry itself can be finalized (see [`finalization_event`]).

use crate::error::DomainError;
use crate::ids::{CustomerId, EntityKind, InquiryCategoryId, InquiryId, SubcompanyId};
use crate::lifecycle::{StateMachine, Transition};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// Inquiry states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryState {
    Pending,
    Contacted,
    Completed,
    Canceled,
}

impl InquiryState {
    /// Every state, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Contacted,
        Self::Completed,
        Self::Canceled,
    ];

    /// Returns the persisted string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Contacted => "contacted",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        }
    }

    /// Returns true while the inquiry still awaits an insurer outcome.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Contacted)
    }
}

impl FromStr for InquiryState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "contacted" => Ok(Self::Contacted),
            "completed" => Ok(Self::Completed),
            "canceled" => Ok(Self::Canceled),
            _ => Err(DomainError::UnknownState {
                entity: EntityKind::Inquiry,
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for InquiryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inquiry events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryEvent {
    Contact,
    Complete,
    Cancel,
}

impl InquiryEvent {
    /// Every declared event, in declaration order.
    pub const ALL: [Self; 3] = [
        Self::Contact,
        Self::Complete,
        Self::Cancel,
    ];

    /// Returns the event name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
        }
    }
}

impl FromStr for InquiryEvent {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contact" => Ok(Self::Contact),
            "complete" => Ok(Self::Complete),
            "cancel" => Ok(Self::Cancel),
            _ => Err(DomainError::UnknownEvent {
                entity: EntityKind::Inquiry,
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for InquiryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Registry for the inquiry lifecycle.
#[derive(Debug, Clone, Copy)]
pub struct InquiryLifecycle;

impl StateMachine for InquiryLifecycle {
    type State = InquiryState;
    type Event = InquiryEvent;

    const ENTITY: EntityKind = EntityKind::Inquiry;

    const STATES: &'static [InquiryState] = &InquiryState::ALL;
    const EVENTS: &'static [InquiryEvent] = &InquiryEvent::ALL;

    const TRANSITIONS: &'static [Transition<InquiryState, InquiryEvent>] = &[
        Transition::new(InquiryState::Pending, InquiryEvent::Contact, InquiryState::Contacted),
        Transition::new(InquiryState::Pending, InquiryEvent::Complete, InquiryState::Completed),
        Transition::new(
            InquiryState::Contacted,
            InquiryEvent::Complete,
            InquiryState::Completed,
        ),
        Transition::new(InquiryState::Pending, InquiryEvent::Cancel, InquiryState::Canceled),
        Transition::new(InquiryState::Contacted, InquiryEvent::Cancel, InquiryState::Canceled),
    ];
}

/// Inquiry-category states.
///
/// Note the British spelling of `cancelled`, which differs from the other
/// entities' `canceled`. Both are persisted as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryCategoryState {
    InProgress,
    Completed,
    Cancelled,
}

impl InquiryCategoryState {
    /// Every state, in declaration order.
    pub const ALL: [Self; 3] = [
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Returns the persisted string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns true once the category has an outcome.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl FromStr for InquiryCategoryState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::UnknownState {
                entity: EntityKind::InquiryCategory,
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for InquiryCategoryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inquiry-category events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryCategoryEvent {
    Complete,
    Cancel,
}

impl InquiryCategoryEvent {
    /// Every declared event, in declaration order.
    pub const ALL: [Self; 2] = [
        Self::Complete,
        Self::Cancel,
    ];

    /// Returns the event name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Cancel => "cancel",
        }
    }
}

impl FromStr for InquiryCategoryEvent {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "complete" => Ok(Self::Complete),
            "cancel" => Ok(Self::Cancel),
            _ => Err(DomainError::UnknownEvent {
                entity: EntityKind::InquiryCategory,
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for InquiryCategoryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Registry for the inquiry-category lifecycle.
#[derive(Debug, Clone, Copy)]
pub struct InquiryCategoryLifecycle;

impl StateMachine for InquiryCategoryLifecycle {
    type State = InquiryCategoryState;
    type Event = InquiryCategoryEvent;

    const ENTITY: EntityKind = EntityKind::InquiryCategory;

    const STATES: &'static [InquiryCategoryState] = &InquiryCategoryState::ALL;
    const EVENTS: &'static [InquiryCategoryEvent] = &InquiryCategoryEvent::ALL;

    const TRANSITIONS: &'static [Transition<InquiryCategoryState, InquiryCategoryEvent>] = &[
        Transition::new(
            InquiryCategoryState::InProgress,
            InquiryCategoryEvent::Complete,
            InquiryCategoryState::Completed,
        ),
        Transition::new(
            InquiryCategoryState::InProgress,
            InquiryCategoryEvent::Cancel,
            InquiryCategoryState::Cancelled,
        ),
    ];
}

/// One insurance category within an inquiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquiryCategory {
    pub id: InquiryCategoryId,
    pub inquiry_id: InquiryId,
    pub category_ident: String,
    pub state: InquiryCategoryState,
    /// Why the insurer declined; set only for `cancelled` categories.
    pub cancellation_cause: Option<String>,
}

/// An inquiry to an insurer subcompany.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inquiry {
    pub id: InquiryId,
    pub customer_id: CustomerId,
    pub subcompany_id: SubcompanyId,
    pub state: InquiryState,
    pub categories: Vec<InquiryCategory>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Inquiry {
    /// Finds the category with the given id.
    #[must_use]
    pub fn category(&self, category_id: InquiryCategoryId) -> Option<&InquiryCategory> {
        self.categories.iter().find(|c| c.id == category_id)
    }

    /// Category idents that are still `in_progress`.
    #[must_use]
    pub fn open_category_idents(&self) -> Vec<String> {
        self.categories
            .iter()
            .filter(|c| !c.state.is_terminal())
            .map(|c| c.category_ident.clone())
            .collect()
    }
}

/// Attributes of an inquiry to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInquiry {
    pub customer_id: CustomerId,
    pub subcompany_id: SubcompanyId,
    pub state: InquiryState,
    pub category_idents: Vec<String>,
}

/// Decides the inquiry event implied by its categories' outcomes.
///
/// Returns `None` while any category is still in progress, or when the
/// inquiry has no categories at all. Otherwise a single `completed` category
/// completes the inquiry, and an all-`cancelled` set cancels it.
///
/// # Arguments
///
/// * `categories` - The inquiry's categories
#[must_use]
pub fn finalization_event(categories: &[InquiryCategory]) -> Option<InquiryEvent> {
    if categories.is_empty() || categories.iter().any(|c| !c.state.is_terminal()) {
        return None;
    }
    if categories
        .iter()
        .any(|c| c.state == InquiryCategoryState::Completed)
    {
        Some(InquiryEvent::Complete)
    } else {
        Some(InquiryEvent::Cancel)
    }
}
