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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod contract;
mod document;
mod error;
mod ids;
mod inquiry;
mod interaction;
mod lifecycle;
mod notification;
mod offer;
mod opportunity;
mod page;
mod payback;

#[cfg(test)]
mod tests;

pub use contract::{
    AnalysisEvent, AnalysisLifecycle, AnalysisState, Contract, ContractEvent, ContractLifecycle,
    ContractState, NewContract,
};
pub use document::{
    AnalysisEstimateConfig, Document, DocumentType, DocumentUpload, estimate_analysis_completion,
};
pub use error::DomainError;
pub use ids::{
    AdminId, ContractId, CustomerId, DocumentId, EntityKind, EntityRef, InquiryCategoryId,
    InquiryId, InteractionId, NotificationId, OfferId, OfferOptionId, OpportunityId,
    PaybackTransactionId, SubcompanyId,
};
pub use inquiry::{
    Inquiry, InquiryCategory, InquiryCategoryEvent, InquiryCategoryLifecycle,
    InquiryCategoryState, InquiryEvent, InquiryLifecycle, InquiryState, NewInquiry,
    finalization_event,
};
pub use interaction::{Interaction, InteractionKind, NewInteraction, REASONS_METADATA_KEY};
pub use lifecycle::{InvalidTransition, StateMachine, Transition};
pub use notification::{Channel, Message, NewNotification, Notification, NotificationStatus};
pub use offer::{NewOffer, Offer, OfferEvent, OfferLifecycle, OfferOption, OfferState};
pub use opportunity::{
    NewOpportunity, Opportunity, OpportunityEvent, OpportunityLifecycle, OpportunityState,
};
pub use page::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, Page};
pub use payback::{
    MAX_TRANSACTION_POINTS, NewPaybackTransaction, PAYBACK_NUMBER_LENGTH, PaybackAccount,
    PaybackBalance, PaybackNumber, PaybackTransaction, PaybackTransactionKind,
    PaybackTransactionState, compute_balance,
};
