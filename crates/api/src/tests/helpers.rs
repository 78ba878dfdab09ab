// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::sync::Arc;

use clark::{
    ContractRepository, DispatchingNotifier, ErrorReporter, InMemoryStore, InquiryRepository,
    LogMailer, NotificationChannel, NotificationDispatcher, NotificationLog, OfferRepository,
    OpportunityRepository, TracingErrorReporter,
};
use clark_audit::Cause;
use clark_domain::{
    AdminId, AnalysisState, Channel, Contract, ContractState, CustomerId, DocumentType,
    DocumentUpload, Inquiry, InquiryState, NewContract, NewInquiry, NewOffer, NewOpportunity,
    Offer, OfferState, Opportunity, OpportunityState, SubcompanyId,
};
use time::OffsetDateTime;
use time::macros::datetime;

use crate::auth::{AuthenticatedActor, Role};
use crate::services::{ClarkConfig, Services};

pub const CUSTOMER: CustomerId = CustomerId::new(7);
pub const OTHER_CUSTOMER: CustomerId = CustomerId::new(8);
pub const ADMIN: AdminId = AdminId::new(3);

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-789"), String::from("API test request"))
}

pub fn fixed_now() -> OffsetDateTime {
    datetime!(2026-03-04 10:00 UTC)
}

pub const fn create_test_user() -> AuthenticatedActor {
    AuthenticatedActor::new(CUSTOMER.value(), Role::User)
}

pub const fn create_test_lead() -> AuthenticatedActor {
    AuthenticatedActor::new(CUSTOMER.value(), Role::Lead)
}

pub const fn create_test_admin() -> AuthenticatedActor {
    AuthenticatedActor::new(ADMIN.value(), Role::Admin)
}

/// An in-memory store with the services built on top of it.
pub struct TestContext {
    pub store: Arc<InMemoryStore>,
    pub services: Services,
}

impl TestContext {
    pub fn new() -> Self {
        let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
        let reporter: Arc<dyn ErrorReporter> = Arc::new(TracingErrorReporter);
        let dispatcher: NotificationDispatcher = NotificationDispatcher::new(
            vec![Arc::new(LogMailer) as Arc<dyn NotificationChannel>],
            Arc::clone(&store) as Arc<dyn NotificationLog>,
            Arc::clone(&reporter),
        );
        let notifier: DispatchingNotifier =
            DispatchingNotifier::new(Arc::new(dispatcher), vec![Channel::Email]);
        let services: Services = Services::from_store(
            &store,
            Arc::new(notifier),
            reporter,
            ClarkConfig::default(),
        );
        Self { store, services }
    }
}

pub fn create_contract(
    store: &InMemoryStore,
    customer_id: CustomerId,
    state: ContractState,
    analysis_state: Option<AnalysisState>,
) -> Contract {
    store
        .create_contract(NewContract {
            customer_id,
            state,
            analysis_state,
            category_ident: String::from("household"),
            subcompany_id: Some(SubcompanyId::new(21)),
        })
        .unwrap()
}

pub fn create_analysis_contract(store: &InMemoryStore, analysis_state: AnalysisState) -> Contract {
    create_contract(
        store,
        CUSTOMER,
        ContractState::DetailsAvailable,
        Some(analysis_state),
    )
}

pub fn create_upload(checksum: &str) -> DocumentUpload {
    DocumentUpload {
        document_type: DocumentType::CustomerUpload,
        file_name: format!("{checksum}.pdf"),
        checksum: checksum.to_string(),
        visible_to_customer: true,
    }
}

/// An opportunity in `offer_phase` with an active two-product offer.
pub fn create_active_offer(store: &InMemoryStore) -> (Opportunity, Offer, Vec<Contract>) {
    let opportunity: Opportunity = store
        .create_opportunity(NewOpportunity {
            customer_id: CUSTOMER,
            admin_id: Some(ADMIN),
            state: OpportunityState::OfferPhase,
        })
        .unwrap();
    let contracts: Vec<Contract> = (0..2)
        .map(|_| create_contract(store, CUSTOMER, ContractState::Offered, None))
        .collect();
    let offer: Offer = store
        .create_offer(NewOffer {
            customer_id: CUSTOMER,
            opportunity_id: opportunity.id,
            state: OfferState::Active,
            valid_until: datetime!(2026-04-01 00:00 UTC),
            options: contracts
                .iter()
                .enumerate()
                .map(|(index, contract)| (contract.id, index == 0))
                .collect(),
        })
        .unwrap();
    (opportunity, offer, contracts)
}

pub fn create_inquiry(
    store: &InMemoryStore,
    subcompany: i64,
    state: InquiryState,
    idents: &[&str],
) -> Inquiry {
    store
        .create_inquiry(NewInquiry {
            customer_id: CUSTOMER,
            subcompany_id: SubcompanyId::new(subcompany),
            state,
            category_idents: idents.iter().map(|s| (*s).to_string()).collect(),
        })
        .unwrap()
}
