// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::RepositoryError;
use crate::memory::InMemoryStore;
use crate::notify::{
    DeliveryError, DispatchingNotifier, ErrorReporter, LogMailer, NotificationChannel,
    NotificationDispatcher,
};
use crate::repository::{
    ContractRepository, InquiryRepository, InteractionRepository, NotificationLog,
    OfferRepository, OpportunityRepository, RepositoryResult,
};
use clark_audit::{Actor, Cause};
use clark_domain::{
    AdminId, AnalysisState, Channel, Contract, ContractId, ContractState, CustomerId, Inquiry,
    InquiryState, Interaction, Message, NewContract, NewInquiry, NewInteraction, NewOffer,
    NewOpportunity, Offer, OfferState, Opportunity, OpportunityState, SubcompanyId,
};
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;
use time::macros::datetime;

pub const CUSTOMER: CustomerId = CustomerId::new(7);
pub const OTHER_CUSTOMER: CustomerId = CustomerId::new(8);
pub const ADMIN: AdminId = AdminId::new(3);

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Test request"))
}

pub fn create_admin_actor() -> Actor {
    Actor::admin(ADMIN)
}

pub fn fixed_now() -> OffsetDateTime {
    datetime!(2026-03-04 10:00 UTC)
}

/// A transport that records what it was asked to deliver.
pub struct RecordingChannel {
    channel: Channel,
    fail: bool,
    delivered: Mutex<Vec<Message>>,
}

impl RecordingChannel {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            fail: false,
            delivered: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(channel: Channel) -> Self {
        Self {
            fail: true,
            ..Self::new(channel)
        }
    }

    pub fn delivered(&self) -> Vec<Message> {
        self.delivered.lock().unwrap().clone()
    }
}

impl NotificationChannel for RecordingChannel {
    fn channel(&self) -> Channel {
        self.channel
    }

    fn deliver(&self, message: &Message) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError {
                channel: self.channel,
                reason: String::from("socket closed"),
            });
        }
        self.delivered.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Collects the contexts of captured errors.
#[derive(Default)]
pub struct CountingReporter {
    captured: Mutex<Vec<String>>,
}

impl CountingReporter {
    pub fn captured(&self) -> Vec<String> {
        self.captured.lock().unwrap().clone()
    }
}

impl ErrorReporter for CountingReporter {
    fn capture(&self, context: &str, _error: &dyn std::error::Error) {
        self.captured.lock().unwrap().push(context.to_string());
    }
}

/// An interaction store whose backend is always down.
pub struct BrokenInteractions;

impl InteractionRepository for BrokenInteractions {
    fn create_interaction(&self, _interaction: NewInteraction) -> RepositoryResult<Interaction> {
        Err(RepositoryError::Backend(String::from("connection refused")))
    }

    fn interactions_for(&self, _contract_id: ContractId) -> RepositoryResult<Vec<Interaction>> {
        Err(RepositoryError::Backend(String::from("connection refused")))
    }
}

/// Store, notifier and reporter wired the way the server wires them.
pub struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub messenger: Arc<RecordingChannel>,
    pub reporter: Arc<CountingReporter>,
    pub notifier: DispatchingNotifier,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_messenger(RecordingChannel::new(Channel::Messenger))
    }

    pub fn with_messenger(messenger: RecordingChannel) -> Self {
        let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
        let messenger: Arc<RecordingChannel> = Arc::new(messenger);
        let reporter: Arc<CountingReporter> = Arc::new(CountingReporter::default());
        let dispatcher: NotificationDispatcher = NotificationDispatcher::new(
            vec![
                Arc::new(LogMailer) as Arc<dyn NotificationChannel>,
                Arc::clone(&messenger) as Arc<dyn NotificationChannel>,
            ],
            Arc::clone(&store) as Arc<dyn NotificationLog>,
            Arc::clone(&reporter) as Arc<dyn ErrorReporter>,
        );
        let notifier: DispatchingNotifier =
            DispatchingNotifier::new(Arc::new(dispatcher), vec![Channel::Messenger]);
        Self {
            store,
            messenger,
            reporter,
            notifier,
        }
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
            category_ident: String::from("liability"),
            subcompany_id: Some(SubcompanyId::new(11)),
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

/// An opportunity in `offer_phase` with an active offer over `products` offered contracts.
pub fn create_active_offer(
    store: &InMemoryStore,
    products: usize,
) -> (Opportunity, Offer, Vec<Contract>) {
    let opportunity: Opportunity = store
        .create_opportunity(NewOpportunity {
            customer_id: CUSTOMER,
            admin_id: Some(ADMIN),
            state: OpportunityState::OfferPhase,
        })
        .unwrap();
    let contracts: Vec<Contract> = (0..products)
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
