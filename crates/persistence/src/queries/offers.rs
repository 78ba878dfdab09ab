// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Offer queries.

use clark_domain::{
    ContractId, CustomerId, Offer, OfferId, OfferOption, OfferOptionId, OfferState, OpportunityId,
};
use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;
use tracing::debug;

use crate::data_models::{parse_column, parse_timestamp};
use crate::diesel_schema::{offer_options, offers};
use crate::error::PersistenceError;

/// Diesel Queryable struct for offer rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = offers)]
struct OfferRow {
    offer_id: i64,
    customer_id: i64,
    opportunity_id: i64,
    state: String,
    valid_until: String,
}

/// Diesel Queryable struct for offer option rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = offer_options)]
struct OptionRow {
    offer_option_id: i64,
    offer_id: i64,
    contract_id: i64,
    recommended: i32,
}

fn assemble(conn: &mut SqliteConnection, row: OfferRow) -> Result<Offer, PersistenceError> {
    let options: Vec<OfferOption> = offer_options::table
        .filter(offer_options::offer_id.eq(row.offer_id))
        .order(offer_options::offer_option_id.asc())
        .select(OptionRow::as_select())
        .load::<OptionRow>(conn)?
        .into_iter()
        .map(|option| OfferOption {
            id: OfferOptionId::new(option.offer_option_id),
            offer_id: OfferId::new(option.offer_id),
            contract_id: ContractId::new(option.contract_id),
            recommended: option.recommended != 0,
        })
        .collect();

    Ok(Offer {
        id: OfferId::new(row.offer_id),
        customer_id: CustomerId::new(row.customer_id),
        opportunity_id: OpportunityId::new(row.opportunity_id),
        state: parse_column("offers", &row.state)?,
        valid_until: parse_timestamp("offers", &row.valid_until)?,
        options,
    })
}

/// Loads an offer with its options.
///
/// # Errors
///
/// Returns an error if a query fails or a row cannot be decoded.
pub fn find_offer(
    conn: &mut SqliteConnection,
    offer_id: OfferId,
) -> Result<Option<Offer>, PersistenceError> {
    let row: Option<OfferRow> = offers::table
        .filter(offers::offer_id.eq(offer_id.value()))
        .select(OfferRow::as_select())
        .first::<OfferRow>(conn)
        .optional()?;
    row.map(|row| assemble(conn, row)).transpose()
}

/// Loads an offer, failing with `NotFound` when it does not exist.
///
/// # Errors
///
/// Returns `NotFound` for a missing offer, or an error if a query fails.
pub fn require_offer(
    conn: &mut SqliteConnection,
    offer_id: OfferId,
) -> Result<Offer, PersistenceError> {
    find_offer(conn, offer_id)?.ok_or(PersistenceError::NotFound {
        resource: "offer",
        id: offer_id.value(),
    })
}

/// Lists `active` offers whose validity ended at or before `now`.
///
/// Validity is compared on the decoded timestamps rather than on the stored
/// strings.
///
/// # Errors
///
/// Returns an error if a query fails or a row cannot be decoded.
pub fn offers_due_for_expiry(
    conn: &mut SqliteConnection,
    now: OffsetDateTime,
) -> Result<Vec<Offer>, PersistenceError> {
    let rows: Vec<OfferRow> = offers::table
        .filter(offers::state.eq(OfferState::Active.as_str()))
        .order(offers::offer_id.asc())
        .select(OfferRow::as_select())
        .load(conn)?;

    let mut due: Vec<Offer> = Vec::new();
    for row in rows {
        let offer: Offer = assemble(conn, row)?;
        if offer.is_due_for_expiry(now) {
            due.push(offer);
        }
    }
    debug!(due = due.len(), "Offers due for expiry");
    Ok(due)
}
