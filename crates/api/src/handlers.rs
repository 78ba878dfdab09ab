// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Each handler authorizes the actor, translates the request into domain
//! values, runs one interactor and translates its outcome into a response.

use clark::{
    AcceptOffer, AcceptOfferPayload, ContractDetailsPayload, ContractPayload,
    ContractsUnderAnalysisPayload, CoreError, CreditPaybackPoints, CreditPaybackPointsPayload,
    CustomerCancelsAnalysis, CustomerProvidesDetails, EnrollPayback, EnrollPaybackPayload,
    FindContractDetails, FindContractsUnderAnalysis, InquiryCategoryPayload, MoveToSuccess,
    OpportunityPayload, RequestCorrection, RequestCorrectionPayload, SubCompanyGrouping,
    SubCompanyGroupingPayload, UpdateContractAnalysisState, UpdateInquiryCategoryState,
    UploadDocuments, UploadDocumentsPayload,
};
use clark_audit::{Actor, Cause};
use clark_domain::{
    AdminId, AnalysisEvent, ContractId, CustomerId, EntityKind, EntityRef, InquiryCategoryEvent,
    InquiryCategoryId, InquiryId, Notification, OfferId, OfferOptionId, OpportunityId, Page,
    PaybackTransactionKind,
};
use time::OffsetDateTime;

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, outcome_payload, translate_core_error, translate_domain_error};
use crate::jobs::JobPayload;
use crate::request_response::{
    AcceptOfferRequest, AcceptOfferResponse, ContractDetailsResponse, ContractTransitionResponse,
    ContractsUnderAnalysisResponse, CreditPaybackPointsRequest, CreditPaybackPointsResponse,
    EnqueueJobResponse, EnrollPaybackRequest, EnrollPaybackResponse, GroupedInquiriesResponse,
    InquiryCategoryResponse, ListContractsUnderAnalysisRequest, ListNotificationsRequest,
    ListNotificationsResponse, OpportunityResponse, RequestCorrectionRequest,
    RequestCorrectionResponse, UpdateAnalysisStateRequest, UpdateInquiryCategoryRequest,
    UploadDocumentsRequest, UploadDocumentsResponse,
};
use crate::services::Services;

// ============================================================================
// Customer operations
// ============================================================================

/// Lists one page of the customer's contracts under analysis.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not a lead or user
/// - The paging parameters are out of range
/// - The backend fails
pub fn list_contracts_under_analysis(
    services: &Services,
    authenticated_actor: &AuthenticatedActor,
    request: &ListContractsUnderAnalysisRequest,
) -> Result<ContractsUnderAnalysisResponse, ApiError> {
    let customer_id: CustomerId = AuthorizationService::authorize_customer_action(
        authenticated_actor,
        "list_contracts_under_analysis",
    )?;
    let page: Page =
        Page::from_query(request.limit, request.offset).map_err(translate_domain_error)?;

    let payload: ContractsUnderAnalysisPayload = outcome_payload(
        FindContractsUnderAnalysis::new(services.contracts.as_ref(), services.config.analysis)
            .call(customer_id, page)
            .map_err(translate_core_error)?,
        "Contract",
    )?;

    Ok(ContractsUnderAnalysisResponse {
        contracts: payload.contracts,
        total_count: payload.total_count,
        limit: page.limit(),
        offset: page.offset(),
    })
}

/// Shows one of the customer's contracts with its documents.
///
/// # Errors
///
/// Returns an error if the actor is not a customer, the contract does not
/// belong to them, or the backend fails.
pub fn get_contract_details(
    services: &Services,
    authenticated_actor: &AuthenticatedActor,
    contract_id: i64,
) -> Result<ContractDetailsResponse, ApiError> {
    let customer_id: CustomerId =
        AuthorizationService::authorize_customer_action(authenticated_actor, "show_contract")?;

    let payload: ContractDetailsPayload = outcome_payload(
        FindContractDetails::new(services.contracts.as_ref(), services.config.analysis)
            .call(customer_id, ContractId::new(contract_id))
            .map_err(translate_core_error)?,
        "Contract",
    )?;

    Ok(ContractDetailsResponse {
        contract: payload.contract,
        documents: payload.documents,
        estimated_time_to_finish_analysis: payload.estimated_time_to_finish_analysis,
    })
}

/// The customer reports that they entered the missing contract details.
///
/// # Errors
///
/// Returns an error if the actor is not a customer, the contract is not
/// theirs, or the analysis state does not allow the event.
pub fn provide_details(
    services: &Services,
    authenticated_actor: &AuthenticatedActor,
    contract_id: i64,
    cause: Cause,
) -> Result<ContractTransitionResponse, ApiError> {
    let customer_id: CustomerId =
        AuthorizationService::authorize_customer_action(authenticated_actor, "provide_details")?;

    let payload: ContractPayload = outcome_payload(
        CustomerProvidesDetails::new(services.contracts.as_ref())
            .call(customer_id, ContractId::new(contract_id), cause)
            .map_err(translate_core_error)?,
        "Contract",
    )?;

    Ok(ContractTransitionResponse {
        message: format!("Contract {} details provided", payload.contract.id),
        contract: payload.contract,
    })
}

/// The customer withdraws a contract from analysis.
///
/// # Errors
///
/// Returns an error if the actor is not a customer, the contract is not
/// theirs, or the analysis state does not allow cancelling.
pub fn cancel_analysis(
    services: &Services,
    authenticated_actor: &AuthenticatedActor,
    contract_id: i64,
    cause: Cause,
) -> Result<ContractTransitionResponse, ApiError> {
    let customer_id: CustomerId =
        AuthorizationService::authorize_customer_action(authenticated_actor, "cancel_analysis")?;

    let payload: ContractPayload = outcome_payload(
        CustomerCancelsAnalysis::new(services.contracts.as_ref())
            .call(customer_id, ContractId::new(contract_id), cause)
            .map_err(translate_core_error)?,
        "Contract",
    )?;

    Ok(ContractTransitionResponse {
        message: format!("Analysis of contract {} cancelled", payload.contract.id),
        contract: payload.contract,
    })
}

/// Attaches documents to one of the customer's contracts.
///
/// This function:
/// - Verifies the actor is a lead or user
/// - Stores the documents, skipping checksums the contract already has
/// - Requests analysis when at least one document is new
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not authorized
/// - No documents were sent
/// - The contract is not the customer's
/// - The backend fails
pub fn upload_documents(
    services: &Services,
    authenticated_actor: &AuthenticatedActor,
    contract_id: i64,
    request: &UploadDocumentsRequest,
    cause: Cause,
) -> Result<UploadDocumentsResponse, ApiError> {
    let customer_id: CustomerId =
        AuthorizationService::authorize_customer_action(authenticated_actor, "upload_documents")?;
    if request.documents.is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("documents"),
            message: String::from("at least one document is required"),
        });
    }

    let payload: UploadDocumentsPayload = outcome_payload(
        UploadDocuments::new(services.contracts.as_ref())
            .call(
                customer_id,
                ContractId::new(contract_id),
                &request.documents,
                cause,
            )
            .map_err(translate_core_error)?,
        "Contract",
    )?;

    Ok(UploadDocumentsResponse {
        contract: payload.contract,
        documents: payload.documents,
        analysis_requested: payload.analysis_requested,
    })
}

/// Accepts one option of the customer's offer.
///
/// # Errors
///
/// Returns an error if the actor is not a customer, the offer is not theirs,
/// the option does not belong to the offer, the offer's validity has lapsed
/// at `now`, or any planned transition is rejected. Nothing is changed in the
/// rejected cases.
pub fn accept_offer(
    services: &Services,
    authenticated_actor: &AuthenticatedActor,
    offer_id: i64,
    request: &AcceptOfferRequest,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<AcceptOfferResponse, ApiError> {
    let customer_id: CustomerId =
        AuthorizationService::authorize_customer_action(authenticated_actor, "accept_offer")?;

    let payload: AcceptOfferPayload = outcome_payload(
        AcceptOffer::new(
            services.offers.as_ref(),
            services.opportunities.as_ref(),
            services.contracts.as_ref(),
            services.notifier.as_ref(),
            services.reporter.as_ref(),
        )
        .call(
            customer_id,
            OfferId::new(offer_id),
            OfferOptionId::new(request.option_id),
            cause,
            now,
        )
        .map_err(translate_core_error)?,
        "Offer",
    )?;

    Ok(AcceptOfferResponse {
        message: format!("Offer {} accepted", payload.offer.id),
        offer: payload.offer,
        opportunity: payload.opportunity,
        ordered_contract_id: payload.ordered_contract,
        canceled_contract_ids: payload.canceled_contracts,
    })
}

/// Groups the customer's open inquiries by insurer subcompany.
///
/// # Errors
///
/// Returns an error if the actor is not a customer or the backend fails.
pub fn grouped_inquiries(
    services: &Services,
    authenticated_actor: &AuthenticatedActor,
) -> Result<GroupedInquiriesResponse, ApiError> {
    let customer_id: CustomerId =
        AuthorizationService::authorize_customer_action(authenticated_actor, "grouped_inquiries")?;

    let payload: SubCompanyGroupingPayload = outcome_payload(
        SubCompanyGrouping::new(services.inquiries.as_ref())
            .call(customer_id)
            .map_err(translate_core_error)?,
        "Inquiry",
    )?;

    Ok(GroupedInquiriesResponse {
        groups: payload.groups,
    })
}

/// Enrolls the user in payback.
///
/// Repeating an enrollment with the same number succeeds with
/// `created = false`.
///
/// # Errors
///
/// Returns an error if the actor is not a registered user, the number is
/// malformed, the number belongs to someone else, or the user is enrolled
/// with a different number.
pub fn enroll_payback(
    services: &Services,
    authenticated_actor: &AuthenticatedActor,
    request: &EnrollPaybackRequest,
) -> Result<EnrollPaybackResponse, ApiError> {
    let customer_id: CustomerId =
        AuthorizationService::authorize_payback_enrollment(authenticated_actor)?;

    let payload: EnrollPaybackPayload = outcome_payload(
        EnrollPayback::new(services.payback.as_ref())
            .call(customer_id, request.payback_number.trim())
            .map_err(translate_core_error)?,
        "Payback account",
    )?;

    Ok(EnrollPaybackResponse {
        account: payload.account,
        created: payload.created,
    })
}

// ============================================================================
// Admin operations
// ============================================================================

/// Fires an analysis event on a contract.
///
/// # Arguments
///
/// * `services` - The engine collaborators
/// * `authenticated_actor` - Must be an admin
/// * `contract_id` - The contract under review
/// * `request` - Carries the event name
/// * `cause` - The request that triggered the change
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the event name is unknown,
/// the contract does not exist, or the event is not allowed from the
/// contract's analysis state.
pub fn update_analysis_state(
    services: &Services,
    authenticated_actor: &AuthenticatedActor,
    contract_id: i64,
    request: &UpdateAnalysisStateRequest,
    cause: Cause,
) -> Result<ContractTransitionResponse, ApiError> {
    AuthorizationService::authorize_admin_action(authenticated_actor, "update_analysis_state")?;
    let event: AnalysisEvent = request
        .event
        .trim()
        .parse()
        .map_err(translate_domain_error)?;
    let actor: Actor = authenticated_actor.to_audit_actor();

    let payload: ContractPayload = outcome_payload(
        UpdateContractAnalysisState::new(
            services.contracts.as_ref(),
            services.notifier.as_ref(),
            services.reporter.as_ref(),
        )
        .call(ContractId::new(contract_id), event, actor, cause)
        .map_err(translate_core_error)?,
        "Contract",
    )?;

    Ok(ContractTransitionResponse {
        message: format!("Contract {} received {event}", payload.contract.id),
        contract: payload.contract,
    })
}

/// Rejects a contract's documents and asks the customer for a correction.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, neither reasons nor text
/// were given, the contract does not exist, or it cannot fail analysis from
/// its current state.
pub fn request_correction(
    services: &Services,
    authenticated_actor: &AuthenticatedActor,
    contract_id: i64,
    request: &RequestCorrectionRequest,
    cause: Cause,
) -> Result<RequestCorrectionResponse, ApiError> {
    let admin_id: AdminId =
        AuthorizationService::authorize_admin_action(authenticated_actor, "request_correction")?;

    let payload: RequestCorrectionPayload = outcome_payload(
        RequestCorrection::new(
            services.contracts.as_ref(),
            services.interactions.as_ref(),
            services.notifier.as_ref(),
            services.reporter.as_ref(),
        )
        .call(
            admin_id,
            ContractId::new(contract_id),
            &request.reasons,
            &request.free_text,
            cause,
        )
        .map_err(translate_core_error)?,
        "Contract",
    )?;

    Ok(RequestCorrectionResponse {
        contract: payload.contract,
        interaction_recorded: payload.interaction_recorded,
        customer_notified: payload.customer_notified,
    })
}

/// Marks an opportunity as won.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the opportunity does not
/// exist. A rejected transition surfaces as `DomainRuleViolation`.
pub fn move_to_success(
    services: &Services,
    authenticated_actor: &AuthenticatedActor,
    opportunity_id: i64,
    cause: Cause,
) -> Result<OpportunityResponse, ApiError> {
    AuthorizationService::authorize_admin_action(authenticated_actor, "move_to_success")?;
    let actor: Actor = authenticated_actor.to_audit_actor();

    let payload: OpportunityPayload = outcome_payload(
        MoveToSuccess::new(services.opportunities.as_ref())
            .call(OpportunityId::new(opportunity_id), actor, cause)
            .map_err(translate_core_error)?,
        "Opportunity",
    )?;

    Ok(OpportunityResponse {
        message: format!("Opportunity {} completed", payload.opportunity.id),
        opportunity: payload.opportunity,
    })
}

/// Records an insurer's answer for one category of an inquiry.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the event is unknown, the
/// category is not part of the inquiry, or it already has an outcome.
pub fn update_inquiry_category(
    services: &Services,
    authenticated_actor: &AuthenticatedActor,
    inquiry_id: i64,
    category_id: i64,
    request: &UpdateInquiryCategoryRequest,
    cause: Cause,
) -> Result<InquiryCategoryResponse, ApiError> {
    AuthorizationService::authorize_admin_action(authenticated_actor, "update_inquiry_category")?;
    let event: InquiryCategoryEvent = request
        .event
        .trim()
        .parse()
        .map_err(translate_domain_error)?;

    let payload: InquiryCategoryPayload = outcome_payload(
        UpdateInquiryCategoryState::new(
            services.inquiries.as_ref(),
            services.notifier.as_ref(),
            services.reporter.as_ref(),
        )
        .call(
            InquiryId::new(inquiry_id),
            InquiryCategoryId::new(category_id),
            event,
            request.cancellation_cause.as_deref(),
            authenticated_actor.to_audit_actor(),
            cause,
        )
        .map_err(translate_core_error)?,
        "Inquiry category",
    )?;

    Ok(InquiryCategoryResponse {
        category: payload.category,
        inquiry: payload.inquiry,
        finalized: payload.finalized,
    })
}

/// Books a locked payback credit or refund for a customer.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the kind is unknown, the
/// points are not positive, or the customer is not enrolled.
pub fn credit_payback_points(
    services: &Services,
    authenticated_actor: &AuthenticatedActor,
    customer_id: i64,
    request: &CreditPaybackPointsRequest,
    now: OffsetDateTime,
) -> Result<CreditPaybackPointsResponse, ApiError> {
    AuthorizationService::authorize_admin_action(authenticated_actor, "credit_payback_points")?;
    let kind: PaybackTransactionKind = request
        .kind
        .trim()
        .parse()
        .map_err(translate_domain_error)?;

    let payload: CreditPaybackPointsPayload = outcome_payload(
        CreditPaybackPoints::new(services.payback.as_ref(), services.config.payback)
            .call(CustomerId::new(customer_id), kind, request.points, now)
            .map_err(translate_core_error)?,
        "Payback account",
    )?;

    Ok(CreditPaybackPointsResponse {
        transaction: payload.transaction,
        account: payload.account,
    })
}

/// Lists the notification attempts recorded for an entity.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the entity kind is
/// unknown, or the backend fails.
pub fn list_notifications(
    services: &Services,
    authenticated_actor: &AuthenticatedActor,
    request: &ListNotificationsRequest,
) -> Result<ListNotificationsResponse, ApiError> {
    AuthorizationService::authorize_admin_action(authenticated_actor, "list_notifications")?;
    let kind: EntityKind = request
        .entity_kind
        .trim()
        .parse()
        .map_err(translate_domain_error)?;

    let notifications: Vec<Notification> = services
        .notifications
        .notifications_for(EntityRef::new(kind, request.entity_id))
        .map_err(|err| translate_core_error(CoreError::Repository(err)))?;

    Ok(ListNotificationsResponse { notifications })
}

// ============================================================================
// Jobs
// ============================================================================

fn enqueue(
    services: &Services,
    authenticated_actor: &AuthenticatedActor,
    payload: JobPayload,
    now: OffsetDateTime,
) -> Result<EnqueueJobResponse, ApiError> {
    AuthorizationService::authorize_admin_action(authenticated_actor, payload.name())?;
    let job: String = payload.name().to_string();
    let enqueued: bool = services.jobs.enqueue(payload, now)?;
    Ok(EnqueueJobResponse { job, enqueued })
}

/// Schedules finalization of an inquiry.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the queue is unusable.
pub fn enqueue_finalize_inquiry(
    services: &Services,
    authenticated_actor: &AuthenticatedActor,
    inquiry_id: i64,
    now: OffsetDateTime,
) -> Result<EnqueueJobResponse, ApiError> {
    enqueue(
        services,
        authenticated_actor,
        JobPayload::FinalizeInquiry { inquiry_id },
        now,
    )
}

/// Schedules a payback recalculation.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the queue is unusable.
pub fn enqueue_payback_recalculation(
    services: &Services,
    authenticated_actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<EnqueueJobResponse, ApiError> {
    enqueue(
        services,
        authenticated_actor,
        JobPayload::RecalculatePaybackPoints,
        now,
    )
}

/// Schedules expiry of offers past their validity.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the queue is unusable.
pub fn enqueue_offer_expiry(
    services: &Services,
    authenticated_actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<EnqueueJobResponse, ApiError> {
    enqueue(services, authenticated_actor, JobPayload::ExpireOffers, now)
}
