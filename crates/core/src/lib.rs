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

//! Lifecycle interactors for the Clark backend.
//!
//! Interactors resolve an entity through the collaborator traits in
//! [`repository`], ask the [`guard`] whether the requested event is allowed,
//! persist the transition together with its audit event, and then run any
//! best-effort side effects such as customer notifications.

mod error;
pub mod guard;
mod interactors;
mod memory;
mod notify;
mod outcome;
pub mod repository;

#[cfg(test)]
mod tests;

pub use error::{CoreError, RepositoryError};
pub use guard::fire_event;
pub use interactors::{
    AcceptOffer, AcceptOfferPayload, ContractDetailsPayload, ContractPayload, ContractSummary,
    ContractsUnderAnalysisPayload, CreditPaybackPoints, CreditPaybackPointsPayload,
    CustomerCancelsAnalysis, CustomerProvidesDetails, DEFAULT_LOCK_DAYS, EnrollPayback,
    EnrollPaybackPayload, ExpireOffers, ExpireOffersPayload, Finalization, FinalizationPayload,
    FindContractDetails, FindContractsUnderAnalysis, InquiryCategoryPayload, InquiryPayload,
    MoveToSuccess, OpportunityPayload, PaybackConfig, RecalculatePaybackPoints,
    RecalculationPayload, RequestCorrection, RequestCorrectionPayload, SubCompanyGrouping,
    SubCompanyGroupingPayload, SubcompanyGroup, UpdateContractAnalysisState,
    UpdateInquiryCategoryState, UpdateInquiryState, UploadDocuments, UploadDocumentsPayload,
};
pub use memory::InMemoryStore;
pub use notify::{
    CustomerNotifier, DeliveryError, DispatchingNotifier, ErrorReporter, LogMailer,
    NotificationChannel, NotificationDispatcher, NotifyError, TracingErrorReporter, templates,
};
pub use outcome::{BASE_FIELD, NOT_FOUND, Outcome};
pub use repository::{
    AcceptancePlan, AsyncJobLog, AuditLog, ContractRepository, InquiryRepository,
    InteractionRepository, JobLogRepository, NewAsyncJobLog, NotificationLog, OfferRepository,
    OpportunityRepository, PaybackLedger, PaybackStore, RepositoryResult, StateChange,
};
