// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Inquiry mutations.

use clark_audit::AuditEvent;
use clark_domain::{
    EntityRef, Inquiry, InquiryCategory, InquiryCategoryId, InquiryCategoryState, InquiryId,
    InquiryState, NewInquiry,
};
use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::format_timestamp;
use crate::diesel_schema::{inquiries, inquiry_categories};
use crate::error::PersistenceError;
use crate::mutations::audit::insert_audit_event;
use crate::queries::inquiries::{find_category, require_inquiry};

/// Inserts an inquiry and one `in_progress` row per category ident.
///
/// # Errors
///
/// Returns an error if an insert fails.
pub fn insert_inquiry(
    conn: &mut SqliteConnection,
    inquiry: &NewInquiry,
    now: OffsetDateTime,
) -> Result<Inquiry, PersistenceError> {
    diesel::insert_into(inquiries::table)
        .values((
            inquiries::customer_id.eq(inquiry.customer_id.value()),
            inquiries::subcompany_id.eq(inquiry.subcompany_id.value()),
            inquiries::state.eq(inquiry.state.as_str()),
            inquiries::created_at.eq(format_timestamp(now)?),
        ))
        .execute(conn)?;
    let inquiry_id: InquiryId = InquiryId::new(get_last_insert_rowid(conn)?);

    for ident in &inquiry.category_idents {
        diesel::insert_into(inquiry_categories::table)
            .values((
                inquiry_categories::inquiry_id.eq(inquiry_id.value()),
                inquiry_categories::category_ident.eq(ident),
                inquiry_categories::state.eq(InquiryCategoryState::InProgress.as_str()),
            ))
            .execute(conn)?;
    }

    info!(
        inquiry_id = %inquiry_id,
        categories = inquiry.category_idents.len(),
        "Inquiry created"
    );
    require_inquiry(conn, inquiry_id)
}

/// Moves an inquiry from `expected` to `next` and records `audit`.
///
/// # Errors
///
/// Returns `NotFound`, `StaleState`, or an error if a write fails.
pub fn update_inquiry_state(
    conn: &mut SqliteConnection,
    inquiry_id: InquiryId,
    expected: InquiryState,
    next: InquiryState,
    audit: &AuditEvent,
    now: OffsetDateTime,
) -> Result<Inquiry, PersistenceError> {
    let stored: Inquiry = require_inquiry(conn, inquiry_id)?;
    if stored.state != expected {
        return Err(PersistenceError::StaleState(EntityRef::inquiry(inquiry_id)));
    }

    diesel::update(inquiries::table)
        .filter(inquiries::inquiry_id.eq(inquiry_id.value()))
        .set(inquiries::state.eq(next.as_str()))
        .execute(conn)?;
    insert_audit_event(conn, audit, now)?;

    debug!(inquiry_id = %inquiry_id, to = %next, "Inquiry state persisted");
    require_inquiry(conn, inquiry_id)
}

/// Moves a category from `expected` to `next`, stores its cancellation cause
/// and records `audit`.
///
/// # Errors
///
/// Returns `NotFound`, `StaleState`, or an error if a write fails.
pub fn update_category_state(
    conn: &mut SqliteConnection,
    category_id: InquiryCategoryId,
    expected: InquiryCategoryState,
    next: InquiryCategoryState,
    cancellation_cause: Option<&str>,
    audit: &AuditEvent,
    now: OffsetDateTime,
) -> Result<InquiryCategory, PersistenceError> {
    let not_found = || PersistenceError::NotFound {
        resource: "inquiry_category",
        id: category_id.value(),
    };
    let stored: InquiryCategory = find_category(conn, category_id)?.ok_or_else(not_found)?;
    if stored.state != expected {
        return Err(PersistenceError::StaleState(EntityRef::inquiry_category(
            category_id,
        )));
    }

    diesel::update(inquiry_categories::table)
        .filter(inquiry_categories::inquiry_category_id.eq(category_id.value()))
        .set((
            inquiry_categories::state.eq(next.as_str()),
            inquiry_categories::cancellation_cause.eq(cancellation_cause),
        ))
        .execute(conn)?;
    insert_audit_event(conn, audit, now)?;

    debug!(category_id = %category_id, to = %next, "Inquiry category state persisted");
    find_category(conn, category_id)?.ok_or_else(not_found)
}
