// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Collaborator interfaces consumed by the interactors.
//!
//! Every trait takes `&self` and is `Send + Sync`; implementations provide
//! their own interior mutability. State-changing methods receive the entity as
//! loaded (the pre-image) and must only write if the stored state still equals
//! the pre-image state, returning `RepositoryError::StaleState` otherwise. The
//! audit event passed alongside is written in the same unit of work.

use crate::error::RepositoryError;
use clark_audit::AuditEvent;
use clark_domain::{
    AdminId, AnalysisState, Contract, ContractId, ContractState, CustomerId, Document,
    DocumentUpload, EntityRef, Inquiry, InquiryCategory, InquiryCategoryState, InquiryId,
    InquiryState, Interaction, NewContract, NewInquiry, NewInteraction, NewNotification, NewOffer,
    NewOpportunity, NewPaybackTransaction, Notification, Offer, OfferId, OfferState, Opportunity,
    OpportunityId, OpportunityState, Page, PaybackAccount, PaybackBalance, PaybackNumber,
    PaybackTransaction, PaybackTransactionId,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Result alias used across repository traits.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Contracts and their documents.
pub trait ContractRepository: Send + Sync {
    /// Inserts a contract.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the row.
    fn create_contract(&self, contract: NewContract) -> RepositoryResult<Contract>;

    /// Loads a contract by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find_contract(&self, id: ContractId) -> RepositoryResult<Option<Contract>>;

    /// Loads a contract only if it belongs to `customer_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find_customer_contract(
        &self,
        customer_id: CustomerId,
        id: ContractId,
    ) -> RepositoryResult<Option<Contract>> {
        Ok(self
            .find_contract(id)?
            .filter(|contract| contract.is_owned_by(customer_id)))
    }

    /// Lists the customer's contracts in `analysis_state`, ordered by id.
    ///
    /// # Returns
    ///
    /// The requested page and the total number of matching contracts.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn contracts_in_analysis_state(
        &self,
        customer_id: CustomerId,
        analysis_state: AnalysisState,
        page: Page,
    ) -> RepositoryResult<(Vec<Contract>, u64)>;

    /// Moves the contract's analysis state from `contract.analysis_state` to `next`.
    ///
    /// # Errors
    ///
    /// Returns `StaleState` if the stored analysis state changed since `contract`
    /// was loaded, or another error if the backend fails.
    fn update_analysis_state(
        &self,
        contract: &Contract,
        next: AnalysisState,
        audit: &AuditEvent,
    ) -> RepositoryResult<Contract>;

    /// Moves the contract's top-level state from `contract.state` to `next`.
    ///
    /// # Errors
    ///
    /// Returns `StaleState` if the stored state changed since `contract` was
    /// loaded, or another error if the backend fails.
    fn update_state(
        &self,
        contract: &Contract,
        next: ContractState,
        audit: &AuditEvent,
    ) -> RepositoryResult<Contract>;

    /// Attaches uploads to a contract.
    ///
    /// Uploads whose checksum is already stored for the contract are skipped.
    ///
    /// # Returns
    ///
    /// Only the documents created by this call.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the contract does not exist, or another error if
    /// the backend fails.
    fn add_documents(
        &self,
        contract_id: ContractId,
        uploads: &[DocumentUpload],
    ) -> RepositoryResult<Vec<Document>>;

    /// Lists the contract's documents, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn documents_for(&self, contract_id: ContractId) -> RepositoryResult<Vec<Document>>;
}

/// Inquiries and their categories.
pub trait InquiryRepository: Send + Sync {
    /// Inserts an inquiry with `in_progress` categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the rows.
    fn create_inquiry(&self, inquiry: NewInquiry) -> RepositoryResult<Inquiry>;

    /// Loads an inquiry with its categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find_inquiry(&self, id: InquiryId) -> RepositoryResult<Option<Inquiry>>;

    /// Lists the customer's `pending` or `contacted` inquiries, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn open_inquiries_for(&self, customer_id: CustomerId) -> RepositoryResult<Vec<Inquiry>>;

    /// Moves the inquiry from `inquiry.state` to `next`.
    ///
    /// # Errors
    ///
    /// Returns `StaleState` on a concurrent change, or another error if the
    /// backend fails.
    fn update_inquiry_state(
        &self,
        inquiry: &Inquiry,
        next: InquiryState,
        audit: &AuditEvent,
    ) -> RepositoryResult<Inquiry>;

    /// Moves a category from `category.state` to `next`.
    ///
    /// # Errors
    ///
    /// Returns `StaleState` on a concurrent change, or another error if the
    /// backend fails.
    fn update_category_state(
        &self,
        category: &InquiryCategory,
        next: InquiryCategoryState,
        cancellation_cause: Option<&str>,
        audit: &AuditEvent,
    ) -> RepositoryResult<InquiryCategory>;
}

/// Offers.
pub trait OfferRepository: Send + Sync {
    /// Inserts an offer with its options and links it to its opportunity.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the rows.
    fn create_offer(&self, offer: NewOffer) -> RepositoryResult<Offer>;

    /// Loads an offer with its options.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find_offer(&self, id: OfferId) -> RepositoryResult<Option<Offer>>;

    /// Lists `active` offers whose validity ended at or before `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn offers_due_for_expiry(&self, now: OffsetDateTime) -> RepositoryResult<Vec<Offer>>;

    /// Moves the offer from `offer.state` to `next`.
    ///
    /// # Errors
    ///
    /// Returns `StaleState` on a concurrent change, or another error if the
    /// backend fails.
    fn update_offer_state(
        &self,
        offer: &Offer,
        next: OfferState,
        audit: &AuditEvent,
    ) -> RepositoryResult<Offer>;
}

/// A planned compare-and-set state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange<I, S> {
    /// The entity to change.
    pub id: I,
    /// The state the entity must still be in.
    pub from: S,
    /// The state to write.
    pub to: S,
    /// The audit event recorded with the write.
    pub audit: AuditEvent,
}

/// Every transition implied by a customer accepting one offer option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptancePlan {
    /// `active -> accepted` on the offer.
    pub offer: StateChange<OfferId, OfferState>,
    /// `-> completed` on the offer's opportunity.
    pub opportunity: StateChange<OpportunityId, OpportunityState>,
    /// `offered -> order_pending` on the chosen product, `offered -> canceled`
    /// on every other product of the offer.
    pub contracts: Vec<StateChange<ContractId, ContractState>>,
}

/// Opportunities.
pub trait OpportunityRepository: Send + Sync {
    /// Inserts an opportunity.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the row.
    fn create_opportunity(&self, opportunity: NewOpportunity) -> RepositoryResult<Opportunity>;

    /// Loads an opportunity.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find_opportunity(&self, id: OpportunityId) -> RepositoryResult<Option<Opportunity>>;

    /// Moves the opportunity from `opportunity.state` to `next`.
    ///
    /// # Errors
    ///
    /// Returns `StaleState` on a concurrent change, or another error if the
    /// backend fails.
    fn update_opportunity_state(
        &self,
        opportunity: &Opportunity,
        next: OpportunityState,
        audit: &AuditEvent,
    ) -> RepositoryResult<Opportunity>;

    /// Applies every change of `plan` in one unit of work.
    ///
    /// Either all changes are written or none are.
    ///
    /// # Errors
    ///
    /// Returns `StaleState` if any entity left its planned `from` state, or
    /// another error if the backend fails.
    fn accept_offer(&self, plan: &AcceptancePlan) -> RepositoryResult<()>;
}

/// Admin/customer interaction records.
pub trait InteractionRepository: Send + Sync {
    /// Records an interaction.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the record is incomplete, or another error if
    /// the backend fails.
    fn create_interaction(&self, interaction: NewInteraction) -> RepositoryResult<Interaction>;

    /// Records that an email was sent for a contract.
    ///
    /// # Errors
    ///
    /// See [`InteractionRepository::create_interaction`].
    fn register_sent_email(
        &self,
        admin_id: AdminId,
        contract: &Contract,
        template: &str,
    ) -> RepositoryResult<Interaction> {
        self.create_interaction(NewInteraction::sent_email(
            admin_id,
            contract.id,
            contract.customer_id,
            template,
        ))
    }

    /// Lists a contract's interactions, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn interactions_for(&self, contract_id: ContractId) -> RepositoryResult<Vec<Interaction>>;
}

/// Queryable record of notification attempts.
pub trait NotificationLog: Send + Sync {
    /// Records one delivery attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn record_notification(&self, notification: NewNotification) -> RepositoryResult<Notification>;

    /// Lists attempts concerning `entity`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn notifications_for(&self, entity: EntityRef) -> RepositoryResult<Vec<Notification>>;
}

/// Read access to audit events written by the state-changing methods.
pub trait AuditLog: Send + Sync {
    /// Lists audit events for `entity`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn events_for(&self, entity: EntityRef) -> RepositoryResult<Vec<AuditEvent>>;
}

/// Payback operations available inside an exclusive ledger section.
pub trait PaybackStore {
    /// Loads a customer's enrollment.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find_account(&mut self, customer_id: CustomerId) -> RepositoryResult<Option<PaybackAccount>>;

    /// Enrolls a customer with zero balances.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the number is already used by another customer,
    /// or another error if the backend fails.
    fn create_account(
        &mut self,
        customer_id: CustomerId,
        payback_number: &PaybackNumber,
    ) -> RepositoryResult<PaybackAccount>;

    /// Lists every enrollment, ordered by customer id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn accounts(&mut self) -> RepositoryResult<Vec<PaybackAccount>>;

    /// Appends a locked ledger entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn append_transaction(
        &mut self,
        transaction: NewPaybackTransaction,
    ) -> RepositoryResult<PaybackTransaction>;

    /// Lists locked entries whose lock ended at or before `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn locked_transactions_due(
        &mut self,
        now: OffsetDateTime,
    ) -> RepositoryResult<Vec<PaybackTransaction>>;

    /// Marks a locked entry released.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the entry does not exist, or another error if the
    /// backend fails.
    fn release_transaction(&mut self, id: PaybackTransactionId) -> RepositoryResult<()>;

    /// Lists a customer's entries, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn transactions_for(
        &mut self,
        customer_id: CustomerId,
    ) -> RepositoryResult<Vec<PaybackTransaction>>;

    /// Overwrites a customer's cached balances.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the customer is not enrolled, or another error if
    /// the backend fails.
    fn update_balance(
        &mut self,
        customer_id: CustomerId,
        balance: PaybackBalance,
    ) -> RepositoryResult<PaybackAccount>;
}

/// The payback ledger.
///
/// All ledger access goes through [`PaybackLedger::exclusive`], which runs the
/// given work as the only writer: no other exclusive section can interleave
/// with it, and if the work fails nothing it wrote is kept.
pub trait PaybackLedger: Send + Sync {
    /// Runs `work` as the ledger's single writer.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `work`, or a backend error if the
    /// exclusive section cannot be opened or committed.
    fn exclusive(
        &self,
        work: &mut dyn FnMut(&mut dyn PaybackStore) -> RepositoryResult<()>,
    ) -> RepositoryResult<()>;
}

/// A failed background job execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsyncJobLog {
    /// Log row id.
    pub id: i64,
    /// The job's name (e.g. `finalize_inquiry`).
    pub job_name: String,
    /// The job's primitive arguments, as JSON.
    pub arguments: String,
    /// The attempt that failed (1-based).
    pub attempt: u32,
    /// The error message.
    pub error: String,
    /// When the failure was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A job failure to be recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAsyncJobLog {
    pub job_name: String,
    pub arguments: String,
    pub attempt: u32,
    pub error: String,
}

/// Persistent record of background job failures.
pub trait JobLogRepository: Send + Sync {
    /// Records a job failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn record_job_failure(&self, log: NewAsyncJobLog) -> RepositoryResult<AsyncJobLog>;

    /// Lists recorded failures, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn job_failures(&self) -> RepositoryResult<Vec<AsyncJobLog>>;
}
