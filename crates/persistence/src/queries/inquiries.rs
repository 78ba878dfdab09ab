// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Inquiry queries.
//!
//! An inquiry is always loaded together with its categories, ordered by
//! category id.

use clark_domain::{
    CustomerId, Inquiry, InquiryCategory, InquiryCategoryId, InquiryId, InquiryState, SubcompanyId,
};
use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::{parse_column, parse_timestamp};
use crate::diesel_schema::{inquiries, inquiry_categories};
use crate::error::PersistenceError;

/// Diesel Queryable struct for inquiry rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = inquiries)]
struct InquiryRow {
    inquiry_id: i64,
    customer_id: i64,
    subcompany_id: i64,
    state: String,
    created_at: String,
}

/// Diesel Queryable struct for inquiry category rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = inquiry_categories)]
struct CategoryRow {
    inquiry_category_id: i64,
    inquiry_id: i64,
    category_ident: String,
    state: String,
    cancellation_cause: Option<String>,
}

impl CategoryRow {
    fn into_category(self) -> Result<InquiryCategory, PersistenceError> {
        Ok(InquiryCategory {
            id: InquiryCategoryId::new(self.inquiry_category_id),
            inquiry_id: InquiryId::new(self.inquiry_id),
            category_ident: self.category_ident,
            state: parse_column("inquiry_categories", &self.state)?,
            cancellation_cause: self.cancellation_cause,
        })
    }
}

fn load_categories(
    conn: &mut SqliteConnection,
    inquiry_id: InquiryId,
) -> Result<Vec<InquiryCategory>, PersistenceError> {
    inquiry_categories::table
        .filter(inquiry_categories::inquiry_id.eq(inquiry_id.value()))
        .order(inquiry_categories::inquiry_category_id.asc())
        .select(CategoryRow::as_select())
        .load::<CategoryRow>(conn)?
        .into_iter()
        .map(CategoryRow::into_category)
        .collect()
}

fn assemble(conn: &mut SqliteConnection, row: InquiryRow) -> Result<Inquiry, PersistenceError> {
    let id: InquiryId = InquiryId::new(row.inquiry_id);
    Ok(Inquiry {
        id,
        customer_id: CustomerId::new(row.customer_id),
        subcompany_id: SubcompanyId::new(row.subcompany_id),
        state: parse_column("inquiries", &row.state)?,
        categories: load_categories(conn, id)?,
        created_at: parse_timestamp("inquiries", &row.created_at)?,
    })
}

/// Loads an inquiry with its categories.
///
/// # Errors
///
/// Returns an error if a query fails or a row cannot be decoded.
pub fn find_inquiry(
    conn: &mut SqliteConnection,
    inquiry_id: InquiryId,
) -> Result<Option<Inquiry>, PersistenceError> {
    let row: Option<InquiryRow> = inquiries::table
        .filter(inquiries::inquiry_id.eq(inquiry_id.value()))
        .select(InquiryRow::as_select())
        .first::<InquiryRow>(conn)
        .optional()?;
    row.map(|row| assemble(conn, row)).transpose()
}

/// Loads an inquiry, failing with `NotFound` when it does not exist.
///
/// # Errors
///
/// Returns `NotFound` for a missing inquiry, or an error if a query fails.
pub fn require_inquiry(
    conn: &mut SqliteConnection,
    inquiry_id: InquiryId,
) -> Result<Inquiry, PersistenceError> {
    find_inquiry(conn, inquiry_id)?.ok_or(PersistenceError::NotFound {
        resource: "inquiry",
        id: inquiry_id.value(),
    })
}

/// Loads one category.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_category(
    conn: &mut SqliteConnection,
    category_id: InquiryCategoryId,
) -> Result<Option<InquiryCategory>, PersistenceError> {
    inquiry_categories::table
        .filter(inquiry_categories::inquiry_category_id.eq(category_id.value()))
        .select(CategoryRow::as_select())
        .first::<CategoryRow>(conn)
        .optional()?
        .map(CategoryRow::into_category)
        .transpose()
}

/// Lists a customer's `pending` and `contacted` inquiries, ordered by id.
///
/// # Errors
///
/// Returns an error if a query fails or a row cannot be decoded.
pub fn open_inquiries_for(
    conn: &mut SqliteConnection,
    customer_id: CustomerId,
) -> Result<Vec<Inquiry>, PersistenceError> {
    let open_states: [&str; 2] = [
        InquiryState::Pending.as_str(),
        InquiryState::Contacted.as_str(),
    ];
    let rows: Vec<InquiryRow> = inquiries::table
        .filter(inquiries::customer_id.eq(customer_id.value()))
        .filter(inquiries::state.eq_any(open_states))
        .order(inquiries::inquiry_id.asc())
        .select(InquiryRow::as_select())
        .load(conn)?;
    rows.into_iter().map(|row| assemble(conn, row)).collect()
}
