// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Repository trait implementations for [`Persistence`].

use clark::{
    AcceptancePlan, AsyncJobLog, AuditLog, ContractRepository, InquiryRepository,
    InteractionRepository, JobLogRepository, NewAsyncJobLog, NotificationLog, OfferRepository,
    OpportunityRepository, PaybackLedger, PaybackStore, RepositoryResult,
};
use clark_audit::AuditEvent;
use clark_domain::{
    AnalysisState, Contract, ContractId, ContractState, CustomerId, Document, DocumentUpload,
    EntityRef, Inquiry, InquiryCategory, InquiryCategoryState, InquiryId, InquiryState,
    Interaction, NewContract, NewInquiry, NewInteraction, NewNotification, NewOffer,
    NewOpportunity, NewPaybackTransaction, Notification, Offer, OfferId, OfferState, Opportunity,
    OpportunityId, OpportunityState, Page, PaybackAccount, PaybackBalance, PaybackNumber,
    PaybackTransaction, PaybackTransactionId,
};
use diesel::SqliteConnection;
use time::OffsetDateTime;

use crate::error::PersistenceError;
use crate::{Persistence, mutations, queries};

impl ContractRepository for Persistence {
    fn create_contract(&self, contract: NewContract) -> RepositoryResult<Contract> {
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        Ok(self.write(|conn| mutations::contracts::insert_contract(conn, &contract, now))?)
    }

    fn find_contract(&self, id: ContractId) -> RepositoryResult<Option<Contract>> {
        Ok(self.read(|conn| queries::contracts::find_contract(conn, id))?)
    }

    fn contracts_in_analysis_state(
        &self,
        customer_id: CustomerId,
        analysis_state: AnalysisState,
        page: Page,
    ) -> RepositoryResult<(Vec<Contract>, u64)> {
        Ok(self.read(|conn| {
            queries::contracts::contracts_in_analysis_state(conn, customer_id, analysis_state, page)
        })?)
    }

    fn update_analysis_state(
        &self,
        contract: &Contract,
        next: AnalysisState,
        audit: &AuditEvent,
    ) -> RepositoryResult<Contract> {
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        Ok(self.write(|conn| {
            mutations::contracts::update_analysis_state(
                conn,
                contract.id,
                contract.analysis_state,
                next,
                audit,
                now,
            )
        })?)
    }

    fn update_state(
        &self,
        contract: &Contract,
        next: ContractState,
        audit: &AuditEvent,
    ) -> RepositoryResult<Contract> {
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        Ok(self.write(|conn| {
            mutations::contracts::update_contract_state(
                conn,
                contract.id,
                contract.state,
                next,
                audit,
                now,
            )
        })?)
    }

    fn add_documents(
        &self,
        contract_id: ContractId,
        uploads: &[DocumentUpload],
    ) -> RepositoryResult<Vec<Document>> {
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        Ok(self.write(|conn| {
            mutations::contracts::insert_documents(conn, contract_id, uploads, now)
        })?)
    }

    fn documents_for(&self, contract_id: ContractId) -> RepositoryResult<Vec<Document>> {
        Ok(self.read(|conn| queries::contracts::documents_for(conn, contract_id))?)
    }
}

impl InquiryRepository for Persistence {
    fn create_inquiry(&self, inquiry: NewInquiry) -> RepositoryResult<Inquiry> {
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        Ok(self.write(|conn| mutations::inquiries::insert_inquiry(conn, &inquiry, now))?)
    }

    fn find_inquiry(&self, id: InquiryId) -> RepositoryResult<Option<Inquiry>> {
        Ok(self.read(|conn| queries::inquiries::find_inquiry(conn, id))?)
    }

    fn open_inquiries_for(&self, customer_id: CustomerId) -> RepositoryResult<Vec<Inquiry>> {
        Ok(self.read(|conn| queries::inquiries::open_inquiries_for(conn, customer_id))?)
    }

    fn update_inquiry_state(
        &self,
        inquiry: &Inquiry,
        next: InquiryState,
        audit: &AuditEvent,
    ) -> RepositoryResult<Inquiry> {
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        Ok(self.write(|conn| {
            mutations::inquiries::update_inquiry_state(
                conn,
                inquiry.id,
                inquiry.state,
                next,
                audit,
                now,
            )
        })?)
    }

    fn update_category_state(
        &self,
        category: &InquiryCategory,
        next: InquiryCategoryState,
        cancellation_cause: Option<&str>,
        audit: &AuditEvent,
    ) -> RepositoryResult<InquiryCategory> {
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        Ok(self.write(|conn| {
            mutations::inquiries::update_category_state(
                conn,
                category.id,
                category.state,
                next,
                cancellation_cause,
                audit,
                now,
            )
        })?)
    }
}

impl OfferRepository for Persistence {
    fn create_offer(&self, offer: NewOffer) -> RepositoryResult<Offer> {
        Ok(self.write(|conn| mutations::offers::insert_offer(conn, &offer))?)
    }

    fn find_offer(&self, id: OfferId) -> RepositoryResult<Option<Offer>> {
        Ok(self.read(|conn| queries::offers::find_offer(conn, id))?)
    }

    fn offers_due_for_expiry(&self, now: OffsetDateTime) -> RepositoryResult<Vec<Offer>> {
        Ok(self.read(|conn| queries::offers::offers_due_for_expiry(conn, now))?)
    }

    fn update_offer_state(
        &self,
        offer: &Offer,
        next: OfferState,
        audit: &AuditEvent,
    ) -> RepositoryResult<Offer> {
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        Ok(self.write(|conn| {
            mutations::offers::update_offer_state(conn, offer.id, offer.state, next, audit, now)
        })?)
    }
}

impl OpportunityRepository for Persistence {
    fn create_opportunity(&self, opportunity: NewOpportunity) -> RepositoryResult<Opportunity> {
        Ok(self.write(|conn| mutations::offers::insert_opportunity(conn, &opportunity))?)
    }

    fn find_opportunity(&self, id: OpportunityId) -> RepositoryResult<Option<Opportunity>> {
        Ok(self.read(|conn| queries::opportunities::find_opportunity(conn, id))?)
    }

    fn update_opportunity_state(
        &self,
        opportunity: &Opportunity,
        next: OpportunityState,
        audit: &AuditEvent,
    ) -> RepositoryResult<Opportunity> {
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        Ok(self.write(|conn| {
            mutations::offers::update_opportunity_state(
                conn,
                opportunity.id,
                opportunity.state,
                next,
                audit,
                now,
            )
        })?)
    }

    fn accept_offer(&self, plan: &AcceptancePlan) -> RepositoryResult<()> {
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        Ok(self.write(|conn| mutations::offers::apply_acceptance_plan(conn, plan, now))?)
    }
}

impl InteractionRepository for Persistence {
    fn create_interaction(&self, interaction: NewInteraction) -> RepositoryResult<Interaction> {
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        Ok(self.write(|conn| mutations::records::insert_interaction(conn, &interaction, now))?)
    }

    fn interactions_for(&self, contract_id: ContractId) -> RepositoryResult<Vec<Interaction>> {
        Ok(self.read(|conn| queries::records::interactions_for(conn, contract_id))?)
    }
}

impl NotificationLog for Persistence {
    fn record_notification(&self, notification: NewNotification) -> RepositoryResult<Notification> {
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        Ok(self.write(|conn| mutations::records::insert_notification(conn, &notification, now))?)
    }

    fn notifications_for(&self, entity: EntityRef) -> RepositoryResult<Vec<Notification>> {
        Ok(self.read(|conn| queries::records::notifications_for(conn, entity))?)
    }
}

impl AuditLog for Persistence {
    fn events_for(&self, entity: EntityRef) -> RepositoryResult<Vec<AuditEvent>> {
        Ok(self.read(|conn| queries::audit::events_for(conn, entity))?)
    }
}

impl JobLogRepository for Persistence {
    fn record_job_failure(&self, log: NewAsyncJobLog) -> RepositoryResult<AsyncJobLog> {
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        Ok(self.write(|conn| mutations::records::insert_job_failure(conn, &log, now))?)
    }

    fn job_failures(&self) -> RepositoryResult<Vec<AsyncJobLog>> {
        Ok(self.read(queries::records::job_failures)?)
    }
}

/// The payback store handed to work running inside [`PaybackLedger::exclusive`].
struct SqlitePaybackStore<'a> {
    conn: &'a mut SqliteConnection,
}

impl PaybackStore for SqlitePaybackStore<'_> {
    fn find_account(
        &mut self,
        customer_id: CustomerId,
    ) -> RepositoryResult<Option<PaybackAccount>> {
        Ok(queries::payback::find_account(self.conn, customer_id)?)
    }

    fn create_account(
        &mut self,
        customer_id: CustomerId,
        payback_number: &PaybackNumber,
    ) -> RepositoryResult<PaybackAccount> {
        Ok(mutations::payback::insert_account(
            self.conn,
            customer_id,
            payback_number,
        )?)
    }

    fn accounts(&mut self) -> RepositoryResult<Vec<PaybackAccount>> {
        Ok(queries::payback::accounts(self.conn)?)
    }

    fn append_transaction(
        &mut self,
        transaction: NewPaybackTransaction,
    ) -> RepositoryResult<PaybackTransaction> {
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        Ok(mutations::payback::insert_transaction(
            self.conn,
            &transaction,
            now,
        )?)
    }

    fn locked_transactions_due(
        &mut self,
        now: OffsetDateTime,
    ) -> RepositoryResult<Vec<PaybackTransaction>> {
        Ok(queries::payback::locked_transactions_due(self.conn, now)?)
    }

    fn release_transaction(&mut self, id: PaybackTransactionId) -> RepositoryResult<()> {
        Ok(mutations::payback::release_transaction(self.conn, id)?)
    }

    fn transactions_for(
        &mut self,
        customer_id: CustomerId,
    ) -> RepositoryResult<Vec<PaybackTransaction>> {
        Ok(queries::payback::transactions_for(self.conn, customer_id)?)
    }

    fn update_balance(
        &mut self,
        customer_id: CustomerId,
        balance: PaybackBalance,
    ) -> RepositoryResult<PaybackAccount> {
        Ok(mutations::payback::update_balance(
            self.conn,
            customer_id,
            balance,
        )?)
    }
}

impl PaybackLedger for Persistence {
    fn exclusive(
        &self,
        work: &mut dyn FnMut(&mut dyn PaybackStore) -> RepositoryResult<()>,
    ) -> RepositoryResult<()> {
        self.write(|conn| {
            let mut store: SqlitePaybackStore<'_> = SqlitePaybackStore { conn };
            work(&mut store).map_err(PersistenceError::Repository)
        })?;
        Ok(())
    }
}
