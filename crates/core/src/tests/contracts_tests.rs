// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{CUSTOMER, OTHER_CUSTOMER, create_analysis_contract, create_contract};
use crate::memory::InMemoryStore;
use crate::{FindContractDetails, FindContractsUnderAnalysis};
use clark_domain::{
    AnalysisEstimateConfig, AnalysisState, Contract, ContractState, Document, DocumentId,
    DocumentType, Page,
};
use time::OffsetDateTime;
use time::macros::datetime;

fn seed_document(
    store: &InMemoryStore,
    contract: &Contract,
    id: i64,
    document_type: DocumentType,
    created_at: OffsetDateTime,
) {
    store
        .insert_document(Document {
            id: DocumentId::new(id),
            contract_id: contract.id,
            document_type,
            file_name: format!("doc-{id}.pdf"),
            checksum: format!("sum-{id}"),
            visible_to_customer: true,
            created_at,
        })
        .unwrap();
}

#[test]
fn test_under_analysis_lists_only_the_customers_contracts() {
    let store = InMemoryStore::new();
    let first = create_analysis_contract(&store, AnalysisState::UnderAnalysis);
    create_analysis_contract(&store, AnalysisState::DetailsMissing);
    let second = create_analysis_contract(&store, AnalysisState::UnderAnalysis);
    create_contract(
        &store,
        OTHER_CUSTOMER,
        ContractState::DetailsAvailable,
        Some(AnalysisState::UnderAnalysis),
    );

    let outcome = FindContractsUnderAnalysis::new(&store, AnalysisEstimateConfig::default())
        .call(CUSTOMER, Page::default())
        .unwrap();

    let payload = outcome.into_payload().unwrap();
    assert_eq!(payload.total_count, 2);
    let ids: Vec<_> = payload.contracts.iter().map(|s| s.contract.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[test]
fn test_under_analysis_pages_with_total_count() {
    let store = InMemoryStore::new();
    let contracts: Vec<Contract> = (0..5)
        .map(|_| create_analysis_contract(&store, AnalysisState::UnderAnalysis))
        .collect();

    let outcome = FindContractsUnderAnalysis::new(&store, AnalysisEstimateConfig::default())
        .call(CUSTOMER, Page::new(2, 2).unwrap())
        .unwrap();

    let payload = outcome.into_payload().unwrap();
    assert_eq!(payload.total_count, 5);
    let ids: Vec<_> = payload.contracts.iter().map(|s| s.contract.id).collect();
    assert_eq!(ids, vec![contracts[2].id, contracts[3].id]);
}

#[test]
fn test_under_analysis_includes_weekday_estimate() {
    let store = InMemoryStore::new();
    let contract = create_analysis_contract(&store, AnalysisState::UnderAnalysis);
    // Wednesday in Berlin.
    seed_document(
        &store,
        &contract,
        100,
        DocumentType::CustomerUpload,
        datetime!(2026-03-04 10:00 UTC),
    );

    let outcome = FindContractsUnderAnalysis::new(&store, AnalysisEstimateConfig::default())
        .call(CUSTOMER, Page::default())
        .unwrap();

    let payload = outcome.into_payload().unwrap();
    assert_eq!(
        payload.contracts[0].estimated_time_to_finish_analysis,
        Some(datetime!(2026-03-05 10:00 UTC))
    );
}

#[test]
fn test_details_include_documents_and_weekend_estimate() {
    let store = InMemoryStore::new();
    let contract = create_analysis_contract(&store, AnalysisState::UnderAnalysis);
    seed_document(
        &store,
        &contract,
        100,
        DocumentType::Policy,
        datetime!(2026-03-02 09:00 UTC),
    );
    // Saturday in Berlin.
    seed_document(
        &store,
        &contract,
        101,
        DocumentType::CustomerUpload,
        datetime!(2026-03-07 12:00 UTC),
    );

    let outcome = FindContractDetails::new(&store, AnalysisEstimateConfig::default())
        .call(CUSTOMER, contract.id)
        .unwrap();

    let payload = outcome.into_payload().unwrap();
    assert_eq!(payload.documents.len(), 2);
    assert_eq!(
        payload.estimated_time_to_finish_analysis,
        Some(datetime!(2026-03-10 16:00 UTC))
    );
}

#[test]
fn test_details_have_no_estimate_outside_analysis() {
    let store = InMemoryStore::new();
    let contract = create_analysis_contract(&store, AnalysisState::DetailsComplete);
    seed_document(
        &store,
        &contract,
        100,
        DocumentType::CustomerUpload,
        datetime!(2026-03-04 10:00 UTC),
    );

    let outcome = FindContractDetails::new(&store, AnalysisEstimateConfig::default())
        .call(CUSTOMER, contract.id)
        .unwrap();

    assert_eq!(
        outcome.into_payload().unwrap().estimated_time_to_finish_analysis,
        None
    );
}

#[test]
fn test_details_of_foreign_contract_are_not_found() {
    let store = InMemoryStore::new();
    let contract = create_analysis_contract(&store, AnalysisState::UnderAnalysis);

    let outcome = FindContractDetails::new(&store, AnalysisEstimateConfig::default())
        .call(OTHER_CUSTOMER, contract.id)
        .unwrap();

    assert!(outcome.is_not_found());
}

#[test]
fn test_details_omit_documents_hidden_from_the_customer() {
    let store = InMemoryStore::new();
    let contract = create_analysis_contract(&store, AnalysisState::UnderAnalysis);
    seed_document(
        &store,
        &contract,
        100,
        DocumentType::CustomerUpload,
        datetime!(2026-03-04 10:00 UTC),
    );
    store
        .insert_document(Document {
            id: DocumentId::new(101),
            contract_id: contract.id,
            document_type: DocumentType::CustomerUpload,
            file_name: String::from("internal-note.pdf"),
            checksum: String::from("sum-101"),
            visible_to_customer: false,
            created_at: datetime!(2026-03-06 10:00 UTC),
        })
        .unwrap();

    let outcome = FindContractDetails::new(&store, AnalysisEstimateConfig::default())
        .call(CUSTOMER, contract.id)
        .unwrap();

    let payload = outcome.into_payload().unwrap();
    let names: Vec<&str> = payload
        .documents
        .iter()
        .map(|d| d.file_name.as_str())
        .collect();
    assert_eq!(names, vec!["doc-100.pdf"]);
    // Only the visible upload drives the estimate.
    assert_eq!(
        payload.estimated_time_to_finish_analysis,
        Some(datetime!(2026-03-05 10:00 UTC))
    );
}
