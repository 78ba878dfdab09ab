// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Offer and opportunity mutations.

use clark::AcceptancePlan;
use clark_audit::AuditEvent;
use clark_domain::{
    EntityRef, NewOffer, NewOpportunity, Offer, OfferId, OfferState, Opportunity, OpportunityId,
    OpportunityState,
};
use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{flag, format_timestamp};
use crate::diesel_schema::{offer_options, offers, opportunities};
use crate::error::PersistenceError;
use crate::mutations::audit::insert_audit_event;
use crate::mutations::contracts::update_contract_state;
use crate::queries::contracts::require_contract;
use crate::queries::offers::require_offer;
use crate::queries::opportunities::require_opportunity;

/// Inserts an opportunity.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_opportunity(
    conn: &mut SqliteConnection,
    opportunity: &NewOpportunity,
) -> Result<Opportunity, PersistenceError> {
    diesel::insert_into(opportunities::table)
        .values((
            opportunities::customer_id.eq(opportunity.customer_id.value()),
            opportunities::admin_id.eq(opportunity.admin_id.map(|id| id.value())),
            opportunities::state.eq(opportunity.state.as_str()),
        ))
        .execute(conn)?;
    let opportunity_id: OpportunityId = OpportunityId::new(get_last_insert_rowid(conn)?);
    info!(opportunity_id = %opportunity_id, "Opportunity created");
    require_opportunity(conn, opportunity_id)
}

/// Inserts an offer with its options and links it to its opportunity.
///
/// # Errors
///
/// Returns `NotFound` if the opportunity or an offered contract does not
/// exist, or an error if an insert fails.
pub fn insert_offer(
    conn: &mut SqliteConnection,
    offer: &NewOffer,
) -> Result<Offer, PersistenceError> {
    require_opportunity(conn, offer.opportunity_id)?;
    for (contract_id, _) in &offer.options {
        require_contract(conn, *contract_id)?;
    }

    diesel::insert_into(offers::table)
        .values((
            offers::customer_id.eq(offer.customer_id.value()),
            offers::opportunity_id.eq(offer.opportunity_id.value()),
            offers::state.eq(offer.state.as_str()),
            offers::valid_until.eq(format_timestamp(offer.valid_until)?),
        ))
        .execute(conn)?;
    let offer_id: OfferId = OfferId::new(get_last_insert_rowid(conn)?);

    for (contract_id, recommended) in &offer.options {
        diesel::insert_into(offer_options::table)
            .values((
                offer_options::offer_id.eq(offer_id.value()),
                offer_options::contract_id.eq(contract_id.value()),
                offer_options::recommended.eq(flag(*recommended)),
            ))
            .execute(conn)?;
    }

    diesel::update(opportunities::table)
        .filter(opportunities::opportunity_id.eq(offer.opportunity_id.value()))
        .set(opportunities::offer_id.eq(Some(offer_id.value())))
        .execute(conn)?;

    info!(
        offer_id = %offer_id,
        opportunity_id = %offer.opportunity_id,
        options = offer.options.len(),
        "Offer created"
    );
    require_offer(conn, offer_id)
}

/// Moves an offer from `expected` to `next` and records `audit`.
///
/// # Errors
///
/// Returns `NotFound`, `StaleState`, or an error if a write fails.
pub fn update_offer_state(
    conn: &mut SqliteConnection,
    offer_id: OfferId,
    expected: OfferState,
    next: OfferState,
    audit: &AuditEvent,
    now: OffsetDateTime,
) -> Result<Offer, PersistenceError> {
    let stored: Offer = require_offer(conn, offer_id)?;
    if stored.state != expected {
        return Err(PersistenceError::StaleState(EntityRef::offer(offer_id)));
    }

    diesel::update(offers::table)
        .filter(offers::offer_id.eq(offer_id.value()))
        .set(offers::state.eq(next.as_str()))
        .execute(conn)?;
    insert_audit_event(conn, audit, now)?;

    debug!(offer_id = %offer_id, to = %next, "Offer state persisted");
    require_offer(conn, offer_id)
}

/// Moves an opportunity from `expected` to `next` and records `audit`.
///
/// # Errors
///
/// Returns `NotFound`, `StaleState`, or an error if a write fails.
pub fn update_opportunity_state(
    conn: &mut SqliteConnection,
    opportunity_id: OpportunityId,
    expected: OpportunityState,
    next: OpportunityState,
    audit: &AuditEvent,
    now: OffsetDateTime,
) -> Result<Opportunity, PersistenceError> {
    let stored: Opportunity = require_opportunity(conn, opportunity_id)?;
    if stored.state != expected {
        return Err(PersistenceError::StaleState(EntityRef::opportunity(
            opportunity_id,
        )));
    }

    diesel::update(opportunities::table)
        .filter(opportunities::opportunity_id.eq(opportunity_id.value()))
        .set(opportunities::state.eq(next.as_str()))
        .execute(conn)?;
    insert_audit_event(conn, audit, now)?;

    debug!(opportunity_id = %opportunity_id, to = %next, "Opportunity state persisted");
    require_opportunity(conn, opportunity_id)
}

/// Applies every change of an acceptance plan.
///
/// Must run inside a transaction: the first stale pre-image aborts the plan
/// and the caller's rollback discards the changes already written.
///
/// # Errors
///
/// Returns `StaleState` or `NotFound` for the first entity that fails its
/// check, or an error if a write fails.
pub fn apply_acceptance_plan(
    conn: &mut SqliteConnection,
    plan: &AcceptancePlan,
    now: OffsetDateTime,
) -> Result<(), PersistenceError> {
    update_offer_state(
        conn,
        plan.offer.id,
        plan.offer.from,
        plan.offer.to,
        &plan.offer.audit,
        now,
    )?;
    update_opportunity_state(
        conn,
        plan.opportunity.id,
        plan.opportunity.from,
        plan.opportunity.to,
        &plan.opportunity.audit,
        now,
    )?;
    for change in &plan.contracts {
        update_contract_state(conn, change.id, change.from, change.to, &change.audit, now)?;
    }

    info!(
        offer_id = %plan.offer.id,
        contracts = plan.contracts.len(),
        "Acceptance plan applied"
    );
    Ok(())
}
