// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use clark::{ContractSummary, SubcompanyGroup};
use clark_domain::{
    Contract, ContractId, Document, DocumentUpload, Inquiry, InquiryCategory, Notification, Offer,
    Opportunity, PaybackAccount, PaybackTransaction,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Paging parameters for the contracts-under-analysis listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ListContractsUnderAnalysisRequest {
    /// Page size; defaults to the domain default.
    pub limit: Option<u32>,
    /// Rows to skip.
    pub offset: Option<u64>,
}

/// One page of contracts under analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractsUnderAnalysisResponse {
    pub contracts: Vec<ContractSummary>,
    /// Matching contracts across all pages.
    pub total_count: u64,
    pub limit: u32,
    pub offset: u64,
}

/// A contract with its documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractDetailsResponse {
    pub contract: Contract,
    pub documents: Vec<Document>,
    /// Present only while the contract is under analysis.
    #[serde(with = "time::serde::rfc3339::option")]
    pub estimated_time_to_finish_analysis: Option<OffsetDateTime>,
}

/// Response for a contract transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractTransitionResponse {
    pub contract: Contract,
    /// A success message.
    pub message: String,
}

/// API request to attach documents to a contract.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadDocumentsRequest {
    pub documents: Vec<DocumentUpload>,
}

/// API response for a document upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadDocumentsResponse {
    pub contract: Contract,
    /// Only the documents this upload created.
    pub documents: Vec<Document>,
    pub analysis_requested: bool,
}

/// API request to accept an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AcceptOfferRequest {
    /// The chosen offer option.
    pub option_id: i64,
}

/// API response for an accepted offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptOfferResponse {
    pub offer: Offer,
    pub opportunity: Opportunity,
    pub ordered_contract_id: ContractId,
    pub canceled_contract_ids: Vec<ContractId>,
    /// A success message.
    pub message: String,
}

/// A customer's open inquiries grouped by insurer subcompany.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupedInquiriesResponse {
    pub groups: Vec<SubcompanyGroup>,
}

/// API request to enroll in payback.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnrollPaybackRequest {
    pub payback_number: String,
}

/// API response for a payback enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrollPaybackResponse {
    pub account: PaybackAccount,
    /// False when the identical enrollment already existed.
    pub created: bool,
}

/// API request to fire an analysis event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateAnalysisStateRequest {
    /// The analysis event name, e.g. `complete_analysis`.
    pub event: String,
}

/// API request to ask the customer for corrected documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RequestCorrectionRequest {
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub free_text: String,
}

/// API response for a correction request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestCorrectionResponse {
    pub contract: Contract,
    pub interaction_recorded: bool,
    pub customer_notified: bool,
}

/// API response for an opportunity transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpportunityResponse {
    pub opportunity: Opportunity,
    /// A success message.
    pub message: String,
}

/// API request to record an insurer's answer for one inquiry category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateInquiryCategoryRequest {
    /// `complete` or `cancel`.
    pub event: String,
    /// Stored with a cancellation.
    pub cancellation_cause: Option<String>,
}

/// API response for an inquiry category update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InquiryCategoryResponse {
    pub category: InquiryCategory,
    pub inquiry: Inquiry,
    pub finalized: bool,
}

/// API request to book payback points for a customer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreditPaybackPointsRequest {
    /// `credit` or `refund`.
    pub kind: String,
    pub points: i64,
}

/// API response for a booked payback entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreditPaybackPointsResponse {
    pub transaction: PaybackTransaction,
    pub account: PaybackAccount,
}

/// API response for a job submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnqueueJobResponse {
    /// The job name.
    pub job: String,
    /// False when an identical job was already pending.
    pub enqueued: bool,
}

/// Selects the entity whose notification attempts are listed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListNotificationsRequest {
    pub entity_kind: String,
    pub entity_id: i64,
}

/// Notification attempts for one entity, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListNotificationsResponse {
    pub notifications: Vec<Notification>,
}
