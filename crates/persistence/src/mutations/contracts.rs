// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Contract and document mutations.
//!
//! State updates are compare-and-set: the stored state is read and compared
//! with the expected pre-image inside the caller's transaction, and the update
//! is only issued when they match.

use clark_audit::AuditEvent;
use clark_domain::{
    AnalysisState, Contract, ContractId, ContractState, Document, DocumentId, DocumentUpload,
    EntityKind, EntityRef, NewContract,
};
use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{flag, format_timestamp};
use crate::diesel_schema::{contracts, documents};
use crate::error::PersistenceError;
use crate::mutations::audit::insert_audit_event;
use crate::queries::contracts::{has_checksum, require_contract};

/// Inserts a contract.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_contract(
    conn: &mut SqliteConnection,
    contract: &NewContract,
    now: OffsetDateTime,
) -> Result<Contract, PersistenceError> {
    let timestamp: String = format_timestamp(now)?;
    diesel::insert_into(contracts::table)
        .values((
            contracts::customer_id.eq(contract.customer_id.value()),
            contracts::state.eq(contract.state.as_str()),
            contracts::analysis_state.eq(contract.analysis_state.map(|s| s.as_str())),
            contracts::category_ident.eq(&contract.category_ident),
            contracts::subcompany_id.eq(contract.subcompany_id.map(|id| id.value())),
            contracts::created_at.eq(&timestamp),
            contracts::updated_at.eq(&timestamp),
        ))
        .execute(conn)?;

    let contract_id: ContractId = ContractId::new(get_last_insert_rowid(conn)?);
    info!(contract_id = %contract_id, customer_id = %contract.customer_id, "Contract created");
    require_contract(conn, contract_id)
}

/// Moves a contract's analysis state from `expected` to `next` and records `audit`.
///
/// # Errors
///
/// Returns `NotFound` if the contract does not exist, `StaleState` if its
/// analysis state is no longer `expected`, or an error if a write fails.
pub fn update_analysis_state(
    conn: &mut SqliteConnection,
    contract_id: ContractId,
    expected: Option<AnalysisState>,
    next: AnalysisState,
    audit: &AuditEvent,
    now: OffsetDateTime,
) -> Result<Contract, PersistenceError> {
    let stored: Contract = require_contract(conn, contract_id)?;
    if stored.analysis_state != expected {
        return Err(PersistenceError::StaleState(EntityRef::new(
            EntityKind::ContractAnalysis,
            contract_id.value(),
        )));
    }

    diesel::update(contracts::table)
        .filter(contracts::contract_id.eq(contract_id.value()))
        .set((
            contracts::analysis_state.eq(next.as_str()),
            contracts::updated_at.eq(format_timestamp(now)?),
        ))
        .execute(conn)?;
    insert_audit_event(conn, audit, now)?;

    debug!(contract_id = %contract_id, to = %next, "Analysis state persisted");
    require_contract(conn, contract_id)
}

/// Moves a contract's top-level state from `expected` to `next` and records `audit`.
///
/// # Errors
///
/// Returns `NotFound` if the contract does not exist, `StaleState` if its
/// state is no longer `expected`, or an error if a write fails.
pub fn update_contract_state(
    conn: &mut SqliteConnection,
    contract_id: ContractId,
    expected: ContractState,
    next: ContractState,
    audit: &AuditEvent,
    now: OffsetDateTime,
) -> Result<Contract, PersistenceError> {
    let stored: Contract = require_contract(conn, contract_id)?;
    if stored.state != expected {
        return Err(PersistenceError::StaleState(EntityRef::contract(contract_id)));
    }

    diesel::update(contracts::table)
        .filter(contracts::contract_id.eq(contract_id.value()))
        .set((
            contracts::state.eq(next.as_str()),
            contracts::updated_at.eq(format_timestamp(now)?),
        ))
        .execute(conn)?;
    insert_audit_event(conn, audit, now)?;

    debug!(contract_id = %contract_id, to = %next, "Contract state persisted");
    require_contract(conn, contract_id)
}

/// Stores uploads whose checksum is new for the contract.
///
/// # Returns
///
/// Only the documents inserted by this call.
///
/// # Errors
///
/// Returns `NotFound` if the contract does not exist, or an error if an
/// insert fails.
pub fn insert_documents(
    conn: &mut SqliteConnection,
    contract_id: ContractId,
    uploads: &[DocumentUpload],
    now: OffsetDateTime,
) -> Result<Vec<Document>, PersistenceError> {
    require_contract(conn, contract_id)?;
    let timestamp: String = format_timestamp(now)?;

    let mut created: Vec<Document> = Vec::new();
    for upload in uploads {
        if has_checksum(conn, contract_id, &upload.checksum)? {
            debug!(contract_id = %contract_id, checksum = %upload.checksum, "Skipping known document");
            continue;
        }
        diesel::insert_into(documents::table)
            .values((
                documents::contract_id.eq(contract_id.value()),
                documents::document_type.eq(upload.document_type.as_str()),
                documents::file_name.eq(&upload.file_name),
                documents::checksum.eq(&upload.checksum),
                documents::visible_to_customer.eq(flag(upload.visible_to_customer)),
                documents::created_at.eq(&timestamp),
            ))
            .execute(conn)?;
        created.push(Document {
            id: DocumentId::new(get_last_insert_rowid(conn)?),
            contract_id,
            document_type: upload.document_type,
            file_name: upload.file_name.clone(),
            checksum: upload.checksum.clone(),
            visible_to_customer: upload.visible_to_customer,
            created_at: now,
        });
    }

    info!(contract_id = %contract_id, created = created.len(), "Documents stored");
    Ok(created)
}
