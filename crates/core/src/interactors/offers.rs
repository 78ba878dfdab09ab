// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Offer acceptance, offer expiry and opportunity completion.

use super::{Failure, best_effort, found};
use crate::error::CoreError;
use crate::guard::fire_event;
use crate::notify::{CustomerNotifier, ErrorReporter};
use crate::outcome::Outcome;
use crate::repository::{
    AcceptancePlan, ContractRepository, OfferRepository, OpportunityRepository, StateChange,
};
use clark_audit::{Actor, AuditEvent, Cause};
use clark_domain::{
    Contract, ContractEvent, ContractId, ContractLifecycle, ContractState, CustomerId, EntityRef,
    Offer, OfferEvent, OfferId, OfferLifecycle, OfferOption, OfferOptionId, OfferState,
    Opportunity, OpportunityEvent, OpportunityId, OpportunityLifecycle, OpportunityState,
};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, warn};

/// Payload of [`MoveToSuccess`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpportunityPayload {
    pub opportunity: Opportunity,
}

/// An admin marks an opportunity as won.
pub struct MoveToSuccess<'a> {
    opportunities: &'a dyn OpportunityRepository,
}

impl<'a> MoveToSuccess<'a> {
    #[must_use]
    pub const fn new(opportunities: &'a dyn OpportunityRepository) -> Self {
        Self { opportunities }
    }

    /// Fires `complete` on the opportunity.
    ///
    /// Unlike the other interactors, a rejected transition is not folded into
    /// the outcome: it is returned as `CoreError::InvalidTransition`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` if the opportunity cannot be
    /// completed from its current state, or `CoreError::Repository` if the
    /// backend fails.
    pub fn call(
        &self,
        opportunity_id: OpportunityId,
        actor: Actor,
        cause: Cause,
    ) -> Result<Outcome<OpportunityPayload>, CoreError> {
        self.run(opportunity_id, actor, cause)
            .or_else(Failure::into_result)
    }

    fn run(
        &self,
        opportunity_id: OpportunityId,
        actor: Actor,
        cause: Cause,
    ) -> Result<Outcome<OpportunityPayload>, Failure> {
        let opportunity: Opportunity =
            found(self.opportunities.find_opportunity(opportunity_id)?)?;
        let next: OpportunityState = fire_event::<OpportunityLifecycle>(
            Some(opportunity.state),
            OpportunityEvent::Complete,
        )
        .map_err(|err| Failure::Core(CoreError::InvalidTransition(err)))?;

        let audit: AuditEvent = AuditEvent::transition(
            actor,
            cause,
            EntityRef::opportunity(opportunity.id),
            OpportunityEvent::Complete,
            Some(opportunity.state),
            next,
        );
        let updated: Opportunity = self
            .opportunities
            .update_opportunity_state(&opportunity, next, &audit)?;
        info!(opportunity_id = %updated.id, "opportunity completed");
        Ok(Outcome::success(OpportunityPayload {
            opportunity: updated,
        }))
    }
}

/// Payload of [`AcceptOffer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptOfferPayload {
    pub offer: Offer,
    pub opportunity: Opportunity,
    /// The product the customer chose, now `order_pending`.
    pub ordered_contract: ContractId,
    /// The offer's other products, now `canceled`.
    pub canceled_contracts: Vec<ContractId>,
}

/// A customer accepts one option of an offer.
pub struct AcceptOffer<'a> {
    offers: &'a dyn OfferRepository,
    opportunities: &'a dyn OpportunityRepository,
    contracts: &'a dyn ContractRepository,
    notifier: &'a dyn CustomerNotifier,
    reporter: &'a dyn ErrorReporter,
}

impl<'a> AcceptOffer<'a> {
    #[must_use]
    pub const fn new(
        offers: &'a dyn OfferRepository,
        opportunities: &'a dyn OpportunityRepository,
        contracts: &'a dyn ContractRepository,
        notifier: &'a dyn CustomerNotifier,
        reporter: &'a dyn ErrorReporter,
    ) -> Self {
        Self {
            offers,
            opportunities,
            contracts,
            notifier,
            reporter,
        }
    }

    /// Accepts `option_id` of the customer's offer.
    ///
    /// Every transition is planned through the guard before anything is
    /// written: the offer is accepted, its opportunity completed, the chosen
    /// product ordered and every other still-offered product canceled. The plan
    /// is then committed in one write. If any guard rejects, nothing changes.
    /// An offer whose validity has lapsed at `now` is rejected even while it
    /// is still `active`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Repository` if the backend fails.
    pub fn call(
        &self,
        customer_id: CustomerId,
        offer_id: OfferId,
        option_id: OfferOptionId,
        cause: Cause,
        now: OffsetDateTime,
    ) -> Result<Outcome<AcceptOfferPayload>, CoreError> {
        self.run(customer_id, offer_id, option_id, cause, now)
            .or_else(Failure::into_result)
    }

    fn run(
        &self,
        customer_id: CustomerId,
        offer_id: OfferId,
        option_id: OfferOptionId,
        cause: Cause,
        now: OffsetDateTime,
    ) -> Result<Outcome<AcceptOfferPayload>, Failure> {
        let offer: Offer = found(
            self.offers
                .find_offer(offer_id)?
                .filter(|o| o.customer_id == customer_id),
        )?;
        if offer.is_due_for_expiry(now) {
            return Err(Failure::Rejected(format!(
                "Offer {} expired at {}",
                offer.id, offer.valid_until
            )));
        }
        let chosen: &OfferOption = offer.option(option_id).ok_or_else(|| Failure::Invalid {
            field: String::from("option_id"),
            message: String::from("is not an option of this offer"),
        })?;
        let opportunity: Opportunity =
            found(self.opportunities.find_opportunity(offer.opportunity_id)?)?;
        let actor: Actor = Actor::customer(customer_id);

        let offer_next: OfferState =
            fire_event::<OfferLifecycle>(Some(offer.state), OfferEvent::Accept)?;
        let opportunity_next: OpportunityState = fire_event::<OpportunityLifecycle>(
            Some(opportunity.state),
            OpportunityEvent::Complete,
        )?;

        let mut contract_changes: Vec<StateChange<ContractId, ContractState>> = Vec::new();
        let mut canceled_contracts: Vec<ContractId> = Vec::new();
        for option in &offer.options {
            let contract: Contract = found(self.contracts.find_contract(option.contract_id)?)?;
            let event: ContractEvent = if option.id == chosen.id {
                ContractEvent::Order
            } else if contract.state == ContractState::Offered {
                canceled_contracts.push(contract.id);
                ContractEvent::Cancel
            } else {
                continue;
            };
            let next: ContractState = fire_event::<ContractLifecycle>(Some(contract.state), event)?;
            contract_changes.push(StateChange {
                id: contract.id,
                from: contract.state,
                to: next,
                audit: AuditEvent::transition(
                    actor.clone(),
                    cause.clone(),
                    EntityRef::contract(contract.id),
                    event,
                    Some(contract.state),
                    next,
                ),
            });
        }

        let plan: AcceptancePlan = AcceptancePlan {
            offer: StateChange {
                id: offer.id,
                from: offer.state,
                to: offer_next,
                audit: AuditEvent::transition(
                    actor.clone(),
                    cause.clone(),
                    EntityRef::offer(offer.id),
                    OfferEvent::Accept,
                    Some(offer.state),
                    offer_next,
                ),
            },
            opportunity: StateChange {
                id: opportunity.id,
                from: opportunity.state,
                to: opportunity_next,
                audit: AuditEvent::transition(
                    actor,
                    cause,
                    EntityRef::opportunity(opportunity.id),
                    OpportunityEvent::Complete,
                    Some(opportunity.state),
                    opportunity_next,
                ),
            },
            contracts: contract_changes,
        };
        self.opportunities.accept_offer(&plan)?;

        let ordered_contract: ContractId = chosen.contract_id;
        let accepted: Offer = Offer {
            state: offer_next,
            ..offer
        };
        let completed: Opportunity = Opportunity {
            state: opportunity_next,
            ..opportunity
        };
        info!(
            offer_id = %accepted.id,
            option_id = %option_id,
            contract_id = %ordered_contract,
            "offer accepted"
        );

        best_effort(
            self.reporter,
            "offer_accepted notification",
            self.notifier.offer_accepted(&accepted, option_id),
        );

        Ok(Outcome::success(AcceptOfferPayload {
            offer: accepted,
            opportunity: completed,
            ordered_contract,
            canceled_contracts,
        }))
    }
}

/// Payload of [`ExpireOffers`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpireOffersPayload {
    /// Offers moved to `expired`.
    pub expired: Vec<OfferId>,
    /// Offers that changed concurrently and were left alone.
    pub skipped: Vec<OfferId>,
}

/// Expires active offers whose validity has passed.
pub struct ExpireOffers<'a> {
    offers: &'a dyn OfferRepository,
}

impl<'a> ExpireOffers<'a> {
    #[must_use]
    pub const fn new(offers: &'a dyn OfferRepository) -> Self {
        Self { offers }
    }

    /// Fires `expire` on every active offer with `valid_until <= now`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Repository` if the backend fails.
    pub fn call(
        &self,
        now: OffsetDateTime,
        cause: Cause,
    ) -> Result<Outcome<ExpireOffersPayload>, CoreError> {
        self.run(now, cause).or_else(Failure::into_result)
    }

    fn run(
        &self,
        now: OffsetDateTime,
        cause: Cause,
    ) -> Result<Outcome<ExpireOffersPayload>, Failure> {
        let mut payload: ExpireOffersPayload = ExpireOffersPayload::default();
        for offer in self.offers.offers_due_for_expiry(now)? {
            let next: OfferState =
                match fire_event::<OfferLifecycle>(Some(offer.state), OfferEvent::Expire) {
                    Ok(next) => next,
                    Err(_) => {
                        payload.skipped.push(offer.id);
                        continue;
                    }
                };
            let audit: AuditEvent = AuditEvent::transition(
                Actor::system("offer_expiry"),
                cause.clone(),
                EntityRef::offer(offer.id),
                OfferEvent::Expire,
                Some(offer.state),
                next,
            );
            match self.offers.update_offer_state(&offer, next, &audit) {
                Ok(_) => payload.expired.push(offer.id),
                Err(err) => match Failure::from(err) {
                    Failure::Core(core) => return Err(Failure::Core(core)),
                    other => {
                        warn!(offer_id = %offer.id, failure = ?other, "offer not expired");
                        payload.skipped.push(offer.id);
                    }
                },
            }
        }
        info!(
            expired = payload.expired.len(),
            skipped = payload.skipped.len(),
            "offer expiry finished"
        );
        Ok(Outcome::success(payload))
    }
}
