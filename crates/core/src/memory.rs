// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! A process-local implementation of every repository trait.
//!
//! All data lives behind one mutex, so each method is atomic with respect to
//! the others. Used by tests and by the server when no database is configured.

use crate::error::RepositoryError;
use crate::repository::{
    AcceptancePlan, AsyncJobLog, AuditLog, ContractRepository, InquiryRepository,
    InteractionRepository, JobLogRepository, NewAsyncJobLog, NotificationLog, OfferRepository,
    OpportunityRepository, PaybackLedger, PaybackStore, RepositoryResult,
};
use clark_audit::AuditEvent;
use clark_domain::{
    AnalysisState, Contract, ContractId, ContractState, CustomerId, Document, DocumentId,
    DocumentUpload, EntityKind, EntityRef, Inquiry, InquiryCategory, InquiryCategoryId,
    InquiryCategoryState, InquiryId, InquiryState, Interaction, InteractionId, NewContract,
    NewInquiry, NewInteraction, NewNotification, NewOffer, NewOpportunity, NewPaybackTransaction,
    Notification, NotificationId, Offer, OfferId, OfferOption, OfferOptionId, OfferState,
    Opportunity, OpportunityId, OpportunityState, Page, PaybackAccount, PaybackBalance,
    PaybackNumber, PaybackTransaction, PaybackTransactionId, PaybackTransactionState,
};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use time::OffsetDateTime;

#[derive(Debug, Default, Clone)]
struct PaybackTables {
    accounts: BTreeMap<CustomerId, PaybackAccount>,
    transactions: Vec<PaybackTransaction>,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i64,
    contracts: BTreeMap<ContractId, Contract>,
    documents: Vec<Document>,
    inquiries: BTreeMap<InquiryId, Inquiry>,
    offers: BTreeMap<OfferId, Offer>,
    opportunities: BTreeMap<OpportunityId, Opportunity>,
    interactions: Vec<Interaction>,
    notifications: Vec<Notification>,
    audit_events: Vec<AuditEvent>,
    payback: PaybackTables,
    job_logs: Vec<AsyncJobLog>,
}

impl MemoryState {
    const fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

/// In-memory store implementing every repository trait.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Backend(String::from("in-memory store lock poisoned")))
    }

    /// Stores a fully-formed document, keeping its id and timestamp.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the contract does not exist.
    pub fn insert_document(&self, document: Document) -> RepositoryResult<Document> {
        let mut state = self.lock()?;
        if !state.contracts.contains_key(&document.contract_id) {
            return Err(RepositoryError::NotFound {
                resource: "contract",
                id: document.contract_id.value(),
            });
        }
        state.last_id = state.last_id.max(document.id.value());
        state.documents.push(document.clone());
        Ok(document)
    }
}

fn stale(kind: EntityKind, id: i64) -> RepositoryError {
    RepositoryError::StaleState {
        entity: EntityRef::new(kind, id),
    }
}

const fn not_found(resource: &'static str, id: i64) -> RepositoryError {
    RepositoryError::NotFound { resource, id }
}

impl ContractRepository for InMemoryStore {
    fn create_contract(&self, contract: NewContract) -> RepositoryResult<Contract> {
        let mut state = self.lock()?;
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        let created: Contract = Contract {
            id: ContractId::new(state.next_id()),
            customer_id: contract.customer_id,
            state: contract.state,
            analysis_state: contract.analysis_state,
            category_ident: contract.category_ident,
            subcompany_id: contract.subcompany_id,
            created_at: now,
            updated_at: now,
        };
        state.contracts.insert(created.id, created.clone());
        Ok(created)
    }

    fn find_contract(&self, id: ContractId) -> RepositoryResult<Option<Contract>> {
        Ok(self.lock()?.contracts.get(&id).cloned())
    }

    fn contracts_in_analysis_state(
        &self,
        customer_id: CustomerId,
        analysis_state: AnalysisState,
        page: Page,
    ) -> RepositoryResult<(Vec<Contract>, u64)> {
        let state = self.lock()?;
        let matching: Vec<&Contract> = state
            .contracts
            .values()
            .filter(|c| c.customer_id == customer_id && c.analysis_state == Some(analysis_state))
            .collect();
        let total: u64 = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let offset: usize = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit: usize = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        let contracts: Vec<Contract> = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok((contracts, total))
    }

    fn update_analysis_state(
        &self,
        contract: &Contract,
        next: AnalysisState,
        audit: &AuditEvent,
    ) -> RepositoryResult<Contract> {
        let mut state = self.lock()?;
        let stored: &mut Contract = state
            .contracts
            .get_mut(&contract.id)
            .ok_or_else(|| not_found("contract", contract.id.value()))?;
        if stored.analysis_state != contract.analysis_state {
            return Err(stale(EntityKind::ContractAnalysis, contract.id.value()));
        }
        stored.analysis_state = Some(next);
        stored.updated_at = OffsetDateTime::now_utc();
        let updated: Contract = stored.clone();
        state.audit_events.push(audit.clone());
        Ok(updated)
    }

    fn update_state(
        &self,
        contract: &Contract,
        next: ContractState,
        audit: &AuditEvent,
    ) -> RepositoryResult<Contract> {
        let mut state = self.lock()?;
        let stored: &mut Contract = state
            .contracts
            .get_mut(&contract.id)
            .ok_or_else(|| not_found("contract", contract.id.value()))?;
        if stored.state != contract.state {
            return Err(stale(EntityKind::Contract, contract.id.value()));
        }
        stored.state = next;
        stored.updated_at = OffsetDateTime::now_utc();
        let updated: Contract = stored.clone();
        state.audit_events.push(audit.clone());
        Ok(updated)
    }

    fn add_documents(
        &self,
        contract_id: ContractId,
        uploads: &[DocumentUpload],
    ) -> RepositoryResult<Vec<Document>> {
        let mut state = self.lock()?;
        if !state.contracts.contains_key(&contract_id) {
            return Err(not_found("contract", contract_id.value()));
        }
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        let mut created: Vec<Document> = Vec::new();
        for upload in uploads {
            let known: bool = state
                .documents
                .iter()
                .any(|d| d.contract_id == contract_id && d.checksum == upload.checksum);
            if known {
                continue;
            }
            let document: Document = Document {
                id: DocumentId::new(state.next_id()),
                contract_id,
                document_type: upload.document_type,
                file_name: upload.file_name.clone(),
                checksum: upload.checksum.clone(),
                visible_to_customer: upload.visible_to_customer,
                created_at: now,
            };
            state.documents.push(document.clone());
            created.push(document);
        }
        Ok(created)
    }

    fn documents_for(&self, contract_id: ContractId) -> RepositoryResult<Vec<Document>> {
        let state = self.lock()?;
        let mut documents: Vec<Document> = state
            .documents
            .iter()
            .filter(|d| d.contract_id == contract_id)
            .cloned()
            .collect();
        documents.sort_by_key(|d| (d.created_at, d.id));
        Ok(documents)
    }
}

impl InquiryRepository for InMemoryStore {
    fn create_inquiry(&self, inquiry: NewInquiry) -> RepositoryResult<Inquiry> {
        let mut state = self.lock()?;
        let id: InquiryId = InquiryId::new(state.next_id());
        let mut categories: Vec<InquiryCategory> = Vec::new();
        for ident in inquiry.category_idents {
            categories.push(InquiryCategory {
                id: InquiryCategoryId::new(state.next_id()),
                inquiry_id: id,
                category_ident: ident,
                state: InquiryCategoryState::InProgress,
                cancellation_cause: None,
            });
        }
        let created: Inquiry = Inquiry {
            id,
            customer_id: inquiry.customer_id,
            subcompany_id: inquiry.subcompany_id,
            state: inquiry.state,
            categories,
            created_at: OffsetDateTime::now_utc(),
        };
        state.inquiries.insert(id, created.clone());
        Ok(created)
    }

    fn find_inquiry(&self, id: InquiryId) -> RepositoryResult<Option<Inquiry>> {
        Ok(self.lock()?.inquiries.get(&id).cloned())
    }

    fn open_inquiries_for(&self, customer_id: CustomerId) -> RepositoryResult<Vec<Inquiry>> {
        Ok(self
            .lock()?
            .inquiries
            .values()
            .filter(|i| i.customer_id == customer_id && i.state.is_open())
            .cloned()
            .collect())
    }

    fn update_inquiry_state(
        &self,
        inquiry: &Inquiry,
        next: InquiryState,
        audit: &AuditEvent,
    ) -> RepositoryResult<Inquiry> {
        let mut state = self.lock()?;
        let stored: &mut Inquiry = state
            .inquiries
            .get_mut(&inquiry.id)
            .ok_or_else(|| not_found("inquiry", inquiry.id.value()))?;
        if stored.state != inquiry.state {
            return Err(stale(EntityKind::Inquiry, inquiry.id.value()));
        }
        stored.state = next;
        let updated: Inquiry = stored.clone();
        state.audit_events.push(audit.clone());
        Ok(updated)
    }

    fn update_category_state(
        &self,
        category: &InquiryCategory,
        next: InquiryCategoryState,
        cancellation_cause: Option<&str>,
        audit: &AuditEvent,
    ) -> RepositoryResult<InquiryCategory> {
        let mut state = self.lock()?;
        let stored: &mut InquiryCategory = state
            .inquiries
            .get_mut(&category.inquiry_id)
            .and_then(|i| i.categories.iter_mut().find(|c| c.id == category.id))
            .ok_or_else(|| not_found("inquiry_category", category.id.value()))?;
        if stored.state != category.state {
            return Err(stale(EntityKind::InquiryCategory, category.id.value()));
        }
        stored.state = next;
        stored.cancellation_cause = cancellation_cause.map(str::to_string);
        let updated: InquiryCategory = stored.clone();
        state.audit_events.push(audit.clone());
        Ok(updated)
    }
}

impl OfferRepository for InMemoryStore {
    fn create_offer(&self, offer: NewOffer) -> RepositoryResult<Offer> {
        let mut state = self.lock()?;
        if !state.opportunities.contains_key(&offer.opportunity_id) {
            return Err(not_found("opportunity", offer.opportunity_id.value()));
        }
        let id: OfferId = OfferId::new(state.next_id());
        let mut options: Vec<OfferOption> = Vec::new();
        for (contract_id, recommended) in offer.options {
            if !state.contracts.contains_key(&contract_id) {
                return Err(not_found("contract", contract_id.value()));
            }
            options.push(OfferOption {
                id: OfferOptionId::new(state.next_id()),
                offer_id: id,
                contract_id,
                recommended,
            });
        }
        let created: Offer = Offer {
            id,
            customer_id: offer.customer_id,
            opportunity_id: offer.opportunity_id,
            state: offer.state,
            valid_until: offer.valid_until,
            options,
        };
        if let Some(opportunity) = state.opportunities.get_mut(&offer.opportunity_id) {
            opportunity.offer_id = Some(id);
        }
        state.offers.insert(id, created.clone());
        Ok(created)
    }

    fn find_offer(&self, id: OfferId) -> RepositoryResult<Option<Offer>> {
        Ok(self.lock()?.offers.get(&id).cloned())
    }

    fn offers_due_for_expiry(&self, now: OffsetDateTime) -> RepositoryResult<Vec<Offer>> {
        Ok(self
            .lock()?
            .offers
            .values()
            .filter(|o| o.is_due_for_expiry(now))
            .cloned()
            .collect())
    }

    fn update_offer_state(
        &self,
        offer: &Offer,
        next: OfferState,
        audit: &AuditEvent,
    ) -> RepositoryResult<Offer> {
        let mut state = self.lock()?;
        let stored: &mut Offer = state
            .offers
            .get_mut(&offer.id)
            .ok_or_else(|| not_found("offer", offer.id.value()))?;
        if stored.state != offer.state {
            return Err(stale(EntityKind::Offer, offer.id.value()));
        }
        stored.state = next;
        let updated: Offer = stored.clone();
        state.audit_events.push(audit.clone());
        Ok(updated)
    }
}

impl OpportunityRepository for InMemoryStore {
    fn create_opportunity(&self, opportunity: NewOpportunity) -> RepositoryResult<Opportunity> {
        let mut state = self.lock()?;
        let created: Opportunity = Opportunity {
            id: OpportunityId::new(state.next_id()),
            customer_id: opportunity.customer_id,
            admin_id: opportunity.admin_id,
            state: opportunity.state,
            offer_id: None,
        };
        state.opportunities.insert(created.id, created.clone());
        Ok(created)
    }

    fn find_opportunity(&self, id: OpportunityId) -> RepositoryResult<Option<Opportunity>> {
        Ok(self.lock()?.opportunities.get(&id).cloned())
    }

    fn update_opportunity_state(
        &self,
        opportunity: &Opportunity,
        next: OpportunityState,
        audit: &AuditEvent,
    ) -> RepositoryResult<Opportunity> {
        let mut state = self.lock()?;
        let stored: &mut Opportunity = state
            .opportunities
            .get_mut(&opportunity.id)
            .ok_or_else(|| not_found("opportunity", opportunity.id.value()))?;
        if stored.state != opportunity.state {
            return Err(stale(EntityKind::Opportunity, opportunity.id.value()));
        }
        stored.state = next;
        let updated: Opportunity = stored.clone();
        state.audit_events.push(audit.clone());
        Ok(updated)
    }

    fn accept_offer(&self, plan: &AcceptancePlan) -> RepositoryResult<()> {
        let mut state = self.lock()?;

        // Check every pre-image before touching anything.
        let offer_state: OfferState = state
            .offers
            .get(&plan.offer.id)
            .map(|o| o.state)
            .ok_or_else(|| not_found("offer", plan.offer.id.value()))?;
        if offer_state != plan.offer.from {
            return Err(stale(EntityKind::Offer, plan.offer.id.value()));
        }
        let opportunity_state: OpportunityState = state
            .opportunities
            .get(&plan.opportunity.id)
            .map(|o| o.state)
            .ok_or_else(|| not_found("opportunity", plan.opportunity.id.value()))?;
        if opportunity_state != plan.opportunity.from {
            return Err(stale(
                EntityKind::Opportunity,
                plan.opportunity.id.value(),
            ));
        }
        for change in &plan.contracts {
            let current: ContractState = state
                .contracts
                .get(&change.id)
                .map(|c| c.state)
                .ok_or_else(|| not_found("contract", change.id.value()))?;
            if current != change.from {
                return Err(stale(EntityKind::Contract, change.id.value()));
            }
        }

        let now: OffsetDateTime = OffsetDateTime::now_utc();
        if let Some(offer) = state.offers.get_mut(&plan.offer.id) {
            offer.state = plan.offer.to;
        }
        if let Some(opportunity) = state.opportunities.get_mut(&plan.opportunity.id) {
            opportunity.state = plan.opportunity.to;
        }
        for change in &plan.contracts {
            if let Some(contract) = state.contracts.get_mut(&change.id) {
                contract.state = change.to;
                contract.updated_at = now;
            }
        }
        state.audit_events.push(plan.offer.audit.clone());
        state.audit_events.push(plan.opportunity.audit.clone());
        state
            .audit_events
            .extend(plan.contracts.iter().map(|c| c.audit.clone()));
        Ok(())
    }
}

impl InteractionRepository for InMemoryStore {
    fn create_interaction(&self, interaction: NewInteraction) -> RepositoryResult<Interaction> {
        interaction
            .validate()
            .map_err(|err| RepositoryError::Validation {
                field: String::from("interaction"),
                message: err.to_string(),
            })?;
        let mut state = self.lock()?;
        if !state.contracts.contains_key(&interaction.contract_id) {
            return Err(not_found("contract", interaction.contract_id.value()));
        }
        let created: Interaction = Interaction {
            id: InteractionId::new(state.next_id()),
            admin_id: interaction.admin_id,
            contract_id: interaction.contract_id,
            customer_id: interaction.customer_id,
            kind: interaction.kind,
            content: interaction.content,
            metadata: interaction.metadata,
            created_at: OffsetDateTime::now_utc(),
        };
        state.interactions.push(created.clone());
        Ok(created)
    }

    fn interactions_for(&self, contract_id: ContractId) -> RepositoryResult<Vec<Interaction>> {
        Ok(self
            .lock()?
            .interactions
            .iter()
            .filter(|i| i.contract_id == contract_id)
            .cloned()
            .collect())
    }
}

impl NotificationLog for InMemoryStore {
    fn record_notification(&self, notification: NewNotification) -> RepositoryResult<Notification> {
        let mut state = self.lock()?;
        let recorded: Notification = Notification {
            id: NotificationId::new(state.next_id()),
            entity: notification.message.entity,
            customer_id: notification.message.customer_id,
            channel: notification.channel,
            template: notification.message.template,
            payload: notification.message.payload,
            status: notification.status,
            error: notification.error,
            created_at: OffsetDateTime::now_utc(),
        };
        state.notifications.push(recorded.clone());
        Ok(recorded)
    }

    fn notifications_for(&self, entity: EntityRef) -> RepositoryResult<Vec<Notification>> {
        Ok(self
            .lock()?
            .notifications
            .iter()
            .filter(|n| n.entity == entity)
            .cloned()
            .collect())
    }
}

impl AuditLog for InMemoryStore {
    fn events_for(&self, entity: EntityRef) -> RepositoryResult<Vec<AuditEvent>> {
        Ok(self
            .lock()?
            .audit_events
            .iter()
            .filter(|e| e.entity == entity)
            .cloned()
            .collect())
    }
}

struct MemoryPaybackStore<'a> {
    last_id: &'a mut i64,
    tables: &'a mut PaybackTables,
}

impl PaybackStore for MemoryPaybackStore<'_> {
    fn find_account(
        &mut self,
        customer_id: CustomerId,
    ) -> RepositoryResult<Option<PaybackAccount>> {
        Ok(self.tables.accounts.get(&customer_id).cloned())
    }

    fn create_account(
        &mut self,
        customer_id: CustomerId,
        payback_number: &PaybackNumber,
    ) -> RepositoryResult<PaybackAccount> {
        let taken: bool = self
            .tables
            .accounts
            .values()
            .any(|a| a.payback_number == *payback_number || a.customer_id == customer_id);
        if taken {
            return Err(RepositoryError::Validation {
                field: String::from("payback_number"),
                message: String::from("has already been taken"),
            });
        }
        let account: PaybackAccount = PaybackAccount {
            customer_id,
            payback_number: payback_number.clone(),
            points_locked: 0,
            points_unlocked: 0,
        };
        self.tables.accounts.insert(customer_id, account.clone());
        Ok(account)
    }

    fn accounts(&mut self) -> RepositoryResult<Vec<PaybackAccount>> {
        Ok(self.tables.accounts.values().cloned().collect())
    }

    fn append_transaction(
        &mut self,
        transaction: NewPaybackTransaction,
    ) -> RepositoryResult<PaybackTransaction> {
        *self.last_id += 1;
        let created: PaybackTransaction = PaybackTransaction {
            id: PaybackTransactionId::new(*self.last_id),
            customer_id: transaction.customer_id,
            kind: transaction.kind,
            points: transaction.points,
            state: PaybackTransactionState::Locked,
            locked_until: transaction.locked_until,
            created_at: OffsetDateTime::now_utc(),
        };
        self.tables.transactions.push(created.clone());
        Ok(created)
    }

    fn locked_transactions_due(
        &mut self,
        now: OffsetDateTime,
    ) -> RepositoryResult<Vec<PaybackTransaction>> {
        Ok(self
            .tables
            .transactions
            .iter()
            .filter(|t| t.is_release_due(now))
            .cloned()
            .collect())
    }

    fn release_transaction(&mut self, id: PaybackTransactionId) -> RepositoryResult<()> {
        let transaction: &mut PaybackTransaction = self
            .tables
            .transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found("payback_transaction", id.value()))?;
        transaction.state = PaybackTransactionState::Released;
        Ok(())
    }

    fn transactions_for(
        &mut self,
        customer_id: CustomerId,
    ) -> RepositoryResult<Vec<PaybackTransaction>> {
        Ok(self
            .tables
            .transactions
            .iter()
            .filter(|t| t.customer_id == customer_id)
            .cloned()
            .collect())
    }

    fn update_balance(
        &mut self,
        customer_id: CustomerId,
        balance: PaybackBalance,
    ) -> RepositoryResult<PaybackAccount> {
        let account: &mut PaybackAccount = self
            .tables
            .accounts
            .get_mut(&customer_id)
            .ok_or_else(|| not_found("payback_account", customer_id.value()))?;
        account.points_locked = balance.points_locked;
        account.points_unlocked = balance.points_unlocked;
        Ok(account.clone())
    }
}

impl PaybackLedger for InMemoryStore {
    fn exclusive(
        &self,
        work: &mut dyn FnMut(&mut dyn PaybackStore) -> RepositoryResult<()>,
    ) -> RepositoryResult<()> {
        let mut guard = self.lock()?;
        let state: &mut MemoryState = &mut guard;
        let rollback: (i64, PaybackTables) = (state.last_id, state.payback.clone());

        let result: RepositoryResult<()> = {
            let mut store: MemoryPaybackStore<'_> = MemoryPaybackStore {
                last_id: &mut state.last_id,
                tables: &mut state.payback,
            };
            work(&mut store)
        };

        if result.is_err() {
            (state.last_id, state.payback) = rollback;
        }
        result
    }
}

impl JobLogRepository for InMemoryStore {
    fn record_job_failure(&self, log: NewAsyncJobLog) -> RepositoryResult<AsyncJobLog> {
        let mut state = self.lock()?;
        let recorded: AsyncJobLog = AsyncJobLog {
            id: state.next_id(),
            job_name: log.job_name,
            arguments: log.arguments,
            attempt: log.attempt,
            error: log.error,
            created_at: OffsetDateTime::now_utc(),
        };
        state.job_logs.push(recorded.clone());
        Ok(recorded)
    }

    fn job_failures(&self) -> RepositoryResult<Vec<AsyncJobLog>> {
        Ok(self.lock()?.job_logs.clone())
    }
}
