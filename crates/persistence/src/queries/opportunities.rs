// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clark_domain::{AdminId, CustomerId, OfferId, Opportunity, OpportunityId};
use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::parse_column;
use crate::diesel_schema::opportunities;
use crate::error::PersistenceError;

/// Diesel Queryable struct for opportunity rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = opportunities)]
struct OpportunityRow {
    opportunity_id: i64,
    customer_id: i64,
    admin_id: Option<i64>,
    state: String,
    offer_id: Option<i64>,
}

impl OpportunityRow {
    fn into_opportunity(self) -> Result<Opportunity, PersistenceError> {
        Ok(Opportunity {
            id: OpportunityId::new(self.opportunity_id),
            customer_id: CustomerId::new(self.customer_id),
            admin_id: self.admin_id.map(AdminId::new),
            state: parse_column("opportunities", &self.state)?,
            offer_id: self.offer_id.map(OfferId::new),
        })
    }
}

/// Loads an opportunity.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_opportunity(
    conn: &mut SqliteConnection,
    opportunity_id: OpportunityId,
) -> Result<Option<Opportunity>, PersistenceError> {
    opportunities::table
        .filter(opportunities::opportunity_id.eq(opportunity_id.value()))
        .select(OpportunityRow::as_select())
        .first::<OpportunityRow>(conn)
        .optional()?
        .map(OpportunityRow::into_opportunity)
        .transpose()
}

/// Loads an opportunity, failing with `NotFound` when it does not exist.
///
/// # Errors
///
/// Returns `NotFound` for a missing opportunity, or an error if the query fails.
pub fn require_opportunity(
    conn: &mut SqliteConnection,
    opportunity_id: OpportunityId,
) -> Result<Opportunity, PersistenceError> {
    find_opportunity(conn, opportunity_id)?.ok_or(PersistenceError::NotFound {
        resource: "opportunity",
        id: opportunity_id.value(),
    })
}
