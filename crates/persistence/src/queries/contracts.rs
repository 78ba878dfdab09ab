// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Contract and document queries.

use clark_domain::{
    AnalysisState, Contract, ContractId, CustomerId, Document, DocumentId, Page, SubcompanyId,
};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::data_models::{count_to_u64, parse_column, parse_timestamp};
use crate::diesel_schema::{contracts, documents};
use crate::error::PersistenceError;

/// Diesel Queryable struct for contract rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = contracts)]
struct ContractRow {
    contract_id: i64,
    customer_id: i64,
    state: String,
    analysis_state: Option<String>,
    category_ident: String,
    subcompany_id: Option<i64>,
    created_at: String,
    updated_at: String,
}

impl ContractRow {
    fn into_contract(self) -> Result<Contract, PersistenceError> {
        Ok(Contract {
            id: ContractId::new(self.contract_id),
            customer_id: CustomerId::new(self.customer_id),
            state: parse_column("contracts", &self.state)?,
            analysis_state: self
                .analysis_state
                .as_deref()
                .map(|value| parse_column("contracts", value))
                .transpose()?,
            category_ident: self.category_ident,
            subcompany_id: self.subcompany_id.map(SubcompanyId::new),
            created_at: parse_timestamp("contracts", &self.created_at)?,
            updated_at: parse_timestamp("contracts", &self.updated_at)?,
        })
    }
}

/// Diesel Queryable struct for document rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = documents)]
struct DocumentRow {
    document_id: i64,
    contract_id: i64,
    document_type: String,
    file_name: String,
    checksum: String,
    visible_to_customer: i32,
    created_at: String,
}

impl DocumentRow {
    fn into_document(self) -> Result<Document, PersistenceError> {
        Ok(Document {
            id: DocumentId::new(self.document_id),
            contract_id: ContractId::new(self.contract_id),
            document_type: parse_column("documents", &self.document_type)?,
            file_name: self.file_name,
            checksum: self.checksum,
            visible_to_customer: self.visible_to_customer != 0,
            created_at: parse_timestamp("documents", &self.created_at)?,
        })
    }
}

/// Loads a contract by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_contract(
    conn: &mut SqliteConnection,
    contract_id: ContractId,
) -> Result<Option<Contract>, PersistenceError> {
    contracts::table
        .filter(contracts::contract_id.eq(contract_id.value()))
        .select(ContractRow::as_select())
        .first::<ContractRow>(conn)
        .optional()?
        .map(ContractRow::into_contract)
        .transpose()
}

/// Loads a contract, failing with `NotFound` when it does not exist.
///
/// # Errors
///
/// Returns `NotFound` for a missing contract, or an error if the query fails.
pub fn require_contract(
    conn: &mut SqliteConnection,
    contract_id: ContractId,
) -> Result<Contract, PersistenceError> {
    find_contract(conn, contract_id)?.ok_or(PersistenceError::NotFound {
        resource: "contract",
        id: contract_id.value(),
    })
}

/// Lists a customer's contracts in one analysis state, ordered by id.
///
/// # Returns
///
/// The requested page and the total number of matching contracts.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn contracts_in_analysis_state(
    conn: &mut SqliteConnection,
    customer_id: CustomerId,
    analysis_state: AnalysisState,
    page: Page,
) -> Result<(Vec<Contract>, u64), PersistenceError> {
    debug!(
        customer_id = %customer_id,
        analysis_state = %analysis_state,
        limit = page.limit(),
        offset = page.offset(),
        "Listing contracts by analysis state"
    );

    let total: i64 = contracts::table
        .filter(contracts::customer_id.eq(customer_id.value()))
        .filter(contracts::analysis_state.eq(analysis_state.as_str()))
        .count()
        .get_result(conn)?;

    let offset: i64 = i64::try_from(page.offset()).unwrap_or(i64::MAX);
    let rows: Vec<ContractRow> = contracts::table
        .filter(contracts::customer_id.eq(customer_id.value()))
        .filter(contracts::analysis_state.eq(analysis_state.as_str()))
        .order(contracts::contract_id.asc())
        .limit(i64::from(page.limit()))
        .offset(offset)
        .select(ContractRow::as_select())
        .load(conn)?;

    let contracts: Vec<Contract> = rows
        .into_iter()
        .map(ContractRow::into_contract)
        .collect::<Result<_, _>>()?;
    Ok((contracts, count_to_u64(total)))
}

/// Lists a contract's documents, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn documents_for(
    conn: &mut SqliteConnection,
    contract_id: ContractId,
) -> Result<Vec<Document>, PersistenceError> {
    documents::table
        .filter(documents::contract_id.eq(contract_id.value()))
        .order(documents::document_id.asc())
        .select(DocumentRow::as_select())
        .load::<DocumentRow>(conn)?
        .into_iter()
        .map(DocumentRow::into_document)
        .collect()
}

/// Returns true if the contract already holds a document with `checksum`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn has_checksum(
    conn: &mut SqliteConnection,
    contract_id: ContractId,
    checksum: &str,
) -> Result<bool, PersistenceError> {
    let count: i64 = documents::table
        .filter(documents::contract_id.eq(contract_id.value()))
        .filter(documents::checksum.eq(checksum))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}
