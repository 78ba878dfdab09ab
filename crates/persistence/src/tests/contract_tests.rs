// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clark::{
    AuditLog, ContractRepository, CustomerCancelsAnalysis, NotificationLog, RepositoryError,
    TracingErrorReporter, UpdateContractAnalysisState, UploadDocuments,
};
use clark_domain::{
    AnalysisEvent, AnalysisState, ContractState, DocumentType, DocumentUpload, EntityKind,
    EntityRef, Page,
};

use super::{
    CUSTOMER, create_test_actor, create_test_audit, create_test_cause, create_test_contract,
    create_test_notifier, create_test_persistence,
};

fn upload(checksum: &str) -> DocumentUpload {
    DocumentUpload {
        document_type: DocumentType::CustomerUpload,
        file_name: format!("{checksum}.pdf"),
        checksum: checksum.to_string(),
        visible_to_customer: true,
    }
}

// ============================================================================
// Reads
// ============================================================================

#[test]
fn test_created_contract_round_trips() {
    let persistence = create_test_persistence();

    let created = create_test_contract(
        &persistence,
        ContractState::DetailsAvailable,
        Some(AnalysisState::DetailsMissing),
    );
    let loaded = persistence.find_contract(created.id).unwrap().unwrap();

    assert_eq!(loaded, created);
    assert_eq!(loaded.analysis_state, Some(AnalysisState::DetailsMissing));
    assert_eq!(loaded.category_ident, "household");
}

#[test]
fn test_contracts_in_analysis_state_pages_by_id() {
    let persistence = create_test_persistence();
    let ids: Vec<_> = (0..5)
        .map(|_| {
            create_test_contract(
                &persistence,
                ContractState::DetailsAvailable,
                Some(AnalysisState::UnderAnalysis),
            )
            .id
        })
        .collect();
    create_test_contract(
        &persistence,
        ContractState::DetailsAvailable,
        Some(AnalysisState::DetailsComplete),
    );

    let (page, total) = persistence
        .contracts_in_analysis_state(
            CUSTOMER,
            AnalysisState::UnderAnalysis,
            Page::new(2, 2).unwrap(),
        )
        .unwrap();

    assert_eq!(total, 5);
    assert_eq!(
        page.iter().map(|c| c.id).collect::<Vec<_>>(),
        vec![ids[2], ids[3]]
    );
}

// ============================================================================
// Compare-and-set writes
// ============================================================================

#[test]
fn test_analysis_update_writes_state_and_audit_together() {
    let persistence = create_test_persistence();
    let contract = create_test_contract(
        &persistence,
        ContractState::DetailsAvailable,
        Some(AnalysisState::UnderAnalysis),
    );
    let audit = create_test_audit(
        EntityRef::contract(contract.id),
        "complete_analysis",
        Some(AnalysisState::UnderAnalysis),
        AnalysisState::DetailsComplete,
    );

    let updated = persistence
        .update_analysis_state(&contract, AnalysisState::DetailsComplete, &audit)
        .unwrap();

    assert_eq!(updated.analysis_state, Some(AnalysisState::DetailsComplete));
    let events = persistence.events_for(EntityRef::contract(contract.id)).unwrap();
    assert_eq!(events, vec![audit]);
}

#[test]
fn test_stale_analysis_update_is_rejected_without_audit() {
    let persistence = create_test_persistence();
    let contract = create_test_contract(
        &persistence,
        ContractState::DetailsAvailable,
        Some(AnalysisState::UnderAnalysis),
    );
    let first = create_test_audit(
        EntityRef::contract(contract.id),
        "fail_analysis",
        Some(AnalysisState::UnderAnalysis),
        AnalysisState::AnalysisFailed,
    );
    persistence
        .update_analysis_state(&contract, AnalysisState::AnalysisFailed, &first)
        .unwrap();

    // `contract` still carries the `under_analysis` pre-image.
    let second = create_test_audit(
        EntityRef::contract(contract.id),
        "complete_analysis",
        Some(AnalysisState::UnderAnalysis),
        AnalysisState::DetailsComplete,
    );
    let result =
        persistence.update_analysis_state(&contract, AnalysisState::DetailsComplete, &second);

    assert_eq!(
        result,
        Err(RepositoryError::StaleState {
            entity: EntityRef::new(EntityKind::ContractAnalysis, contract.id.value())
        })
    );
    let stored = persistence.find_contract(contract.id).unwrap().unwrap();
    assert_eq!(stored.analysis_state, Some(AnalysisState::AnalysisFailed));
    assert_eq!(
        persistence
            .events_for(EntityRef::contract(contract.id))
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_stale_contract_state_update_is_rejected() {
    let persistence = create_test_persistence();
    let contract = create_test_contract(&persistence, ContractState::Offered, None);
    let audit = create_test_audit(
        EntityRef::contract(contract.id),
        "order",
        Some(ContractState::Offered),
        ContractState::OrderPending,
    );
    persistence
        .update_state(&contract, ContractState::OrderPending, &audit)
        .unwrap();

    let result = persistence.update_state(&contract, ContractState::Canceled, &audit);

    assert!(matches!(result, Err(RepositoryError::StaleState { .. })));
}

// ============================================================================
// Documents
// ============================================================================

#[test]
fn test_known_checksums_are_skipped() {
    let persistence = create_test_persistence();
    let contract = create_test_contract(&persistence, ContractState::DetailsAvailable, None);

    let first = persistence
        .add_documents(contract.id, &[upload("aaa"), upload("bbb")])
        .unwrap();
    let second = persistence
        .add_documents(contract.id, &[upload("bbb"), upload("ccc")])
        .unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].checksum, "ccc");
    let stored = persistence.documents_for(contract.id).unwrap();
    assert_eq!(
        stored.iter().map(|d| d.checksum.as_str()).collect::<Vec<_>>(),
        vec!["aaa", "bbb", "ccc"]
    );
}

// ============================================================================
// Interactors against SQLite
// ============================================================================

#[test]
fn test_upload_requests_analysis() {
    let persistence = create_test_persistence();
    let contract = create_test_contract(
        &persistence,
        ContractState::DetailsAvailable,
        Some(AnalysisState::DetailsMissing),
    );

    let payload = UploadDocuments::new(persistence.as_ref())
        .call(CUSTOMER, contract.id, &[upload("aaa")], create_test_cause())
        .unwrap()
        .into_payload()
        .unwrap();

    assert!(payload.analysis_requested);
    assert_eq!(payload.contract.analysis_state, Some(AnalysisState::UnderAnalysis));
    let events = persistence.events_for(EntityRef::contract(contract.id)).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action.name, "request_analysis");
    assert_eq!(events[0].actor.actor_type, "customer");
}

#[test]
fn test_admin_event_records_notification_attempt() {
    let persistence = create_test_persistence();
    let notifier = create_test_notifier(&persistence);
    let contract = create_test_contract(
        &persistence,
        ContractState::DetailsAvailable,
        Some(AnalysisState::UnderAnalysis),
    );

    let outcome = UpdateContractAnalysisState::new(
        persistence.as_ref(),
        &notifier,
        &TracingErrorReporter,
    )
    .call(
        contract.id,
        AnalysisEvent::CompleteAnalysis,
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();

    assert!(outcome.successful());
    let notifications = persistence
        .notifications_for(EntityRef::contract(contract.id))
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].is_delivered());
}

#[test]
fn test_cancel_from_terminal_state_changes_nothing() {
    let persistence = create_test_persistence();
    let contract = create_test_contract(
        &persistence,
        ContractState::DetailsAvailable,
        Some(AnalysisState::DetailsComplete),
    );

    let outcome = CustomerCancelsAnalysis::new(persistence.as_ref())
        .call(CUSTOMER, contract.id, create_test_cause())
        .unwrap();

    assert!(!outcome.successful());
    let stored = persistence.find_contract(contract.id).unwrap().unwrap();
    assert_eq!(stored.analysis_state, Some(AnalysisState::DetailsComplete));
    assert!(
        persistence
            .events_for(EntityRef::contract(contract.id))
            .unwrap()
            .is_empty()
    );
}
