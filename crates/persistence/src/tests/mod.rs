// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod contract_tests;
mod payback_tests;
mod record_tests;

use std::sync::Arc;

use clark::{
    ContractRepository, DispatchingNotifier, ErrorReporter, InquiryRepository, LogMailer,
    NotificationChannel, NotificationDispatcher, NotificationLog, OfferRepository,
    OpportunityRepository, TracingErrorReporter,
};
use clark_audit::{Actor, AuditEvent, Cause};
use clark_domain::{
    AdminId, AnalysisState, Channel, Contract, ContractState, CustomerId, EntityRef, Inquiry,
    InquiryState, NewContract, NewInquiry, NewOffer, NewOpportunity, Offer, OfferState,
    Opportunity, OpportunityState, SubcompanyId,
};
use time::macros::datetime;

use crate::Persistence;

pub const CUSTOMER: CustomerId = CustomerId::new(7);
pub const ADMIN: AdminId = AdminId::new(3);

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("test-cause"), String::from("Test operation"))
}

pub fn create_test_actor() -> Actor {
    Actor::admin(ADMIN)
}

pub fn create_test_persistence() -> Arc<Persistence> {
    Arc::new(Persistence::new_in_memory().expect("in-memory database"))
}

/// An audit event for a transition the test performs by hand.
pub fn create_test_audit<S: std::fmt::Display>(
    entity: EntityRef,
    event: &str,
    before: Option<S>,
    after: S,
) -> AuditEvent {
    AuditEvent::transition(
        create_test_actor(),
        create_test_cause(),
        entity,
        event,
        before,
        after,
    )
}

/// A notifier that logs through the mailer and records attempts in `persistence`.
pub fn create_test_notifier(persistence: &Arc<Persistence>) -> DispatchingNotifier {
    let dispatcher: NotificationDispatcher = NotificationDispatcher::new(
        vec![Arc::new(LogMailer) as Arc<dyn NotificationChannel>],
        Arc::clone(persistence) as Arc<dyn NotificationLog>,
        Arc::new(TracingErrorReporter) as Arc<dyn ErrorReporter>,
    );
    DispatchingNotifier::new(Arc::new(dispatcher), vec![Channel::Email])
}

pub fn create_test_contract(
    persistence: &Persistence,
    state: ContractState,
    analysis_state: Option<AnalysisState>,
) -> Contract {
    persistence
        .create_contract(NewContract {
            customer_id: CUSTOMER,
            state,
            analysis_state,
            category_ident: String::from("household"),
            subcompany_id: Some(SubcompanyId::new(21)),
        })
        .unwrap()
}

pub fn create_test_inquiry(persistence: &Persistence, subcompany: i64, idents: &[&str]) -> Inquiry {
    persistence
        .create_inquiry(NewInquiry {
            customer_id: CUSTOMER,
            subcompany_id: SubcompanyId::new(subcompany),
            state: InquiryState::Contacted,
            category_idents: idents.iter().map(|s| (*s).to_string()).collect(),
        })
        .unwrap()
}

/// An opportunity in `offer_phase` with an active offer over `products` offered contracts.
pub fn create_test_offer(
    persistence: &Persistence,
    products: usize,
) -> (Opportunity, Offer, Vec<Contract>) {
    let opportunity: Opportunity = persistence
        .create_opportunity(NewOpportunity {
            customer_id: CUSTOMER,
            admin_id: Some(ADMIN),
            state: OpportunityState::OfferPhase,
        })
        .unwrap();
    let contracts: Vec<Contract> = (0..products)
        .map(|_| create_test_contract(persistence, ContractState::Offered, None))
        .collect();
    let offer: Offer = persistence
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
