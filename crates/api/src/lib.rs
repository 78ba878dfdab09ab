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
    clippy::unwrap_used,
    clippy::expect_used
)]

//! The API boundary of the Clark lifecycle engine.
//!
//! Handlers here know nothing about HTTP. They take an authenticated actor
//! and a request DTO, run one interactor and return a response DTO or an
//! [`ApiError`]. The server crate maps both onto the wire.

mod auth;
mod error;
mod handlers;
mod jobs;
mod request_response;
mod services;

#[cfg(test)]
mod tests;

pub use auth::{ACTOR_ID_HEADER, AuthenticatedActor, AuthorizationService, Role, SCOPE_HEADER};
pub use error::{
    ApiError, AuthError, outcome_payload, translate_core_error, translate_domain_error,
};
pub use handlers::{
    accept_offer, cancel_analysis, credit_payback_points, enqueue_finalize_inquiry,
    enqueue_offer_expiry, enqueue_payback_recalculation, enroll_payback, get_contract_details,
    grouped_inquiries, list_contracts_under_analysis, list_notifications, move_to_success,
    provide_details, request_correction, update_analysis_state, update_inquiry_category,
    upload_documents,
};
pub use jobs::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL, JobConfig, JobError, JobPayload, JobQueue,
    JobReport, JobRunner, QueuedJob, retry_delay,
};
pub use request_response::{
    AcceptOfferRequest, AcceptOfferResponse, ContractDetailsResponse, ContractTransitionResponse,
    ContractsUnderAnalysisResponse, CreditPaybackPointsRequest, CreditPaybackPointsResponse,
    EnqueueJobResponse, EnrollPaybackRequest, EnrollPaybackResponse, GroupedInquiriesResponse,
    InquiryCategoryResponse, ListContractsUnderAnalysisRequest, ListNotificationsRequest,
    ListNotificationsResponse, OpportunityResponse, RequestCorrectionRequest,
    RequestCorrectionResponse, UpdateAnalysisStateRequest, UpdateInquiryCategoryRequest,
    UploadDocumentsRequest, UploadDocumentsResponse,
};
pub use services::{ClarkConfig, Services};
