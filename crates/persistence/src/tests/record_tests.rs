// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeMap;

use clark::{
    InteractionRepository, JobLogRepository, NewAsyncJobLog, NotificationLog, RepositoryError,
    RequestCorrection, TracingErrorReporter,
};
use clark_domain::{
    AnalysisState, Channel, ContractId, ContractState, EntityRef, InteractionKind, Message,
    NewInteraction, NewNotification, NotificationStatus, REASONS_METADATA_KEY,
};

use super::{
    ADMIN, CUSTOMER, create_test_cause, create_test_contract, create_test_notifier,
    create_test_persistence,
};

// ============================================================================
// Interactions
// ============================================================================

#[test]
fn test_interaction_metadata_round_trips() {
    let persistence = create_test_persistence();
    let contract = create_test_contract(&persistence, ContractState::DetailsAvailable, None);
    let reasons: Vec<String> = vec![String::from("blurry"), String::from("wrong_document")];
    let interaction = NewInteraction::correction_request(
        ADMIN,
        contract.id,
        CUSTOMER,
        &reasons,
        "Please upload page two again",
    )
    .unwrap();

    let stored = persistence.create_interaction(interaction).unwrap();
    let listed = persistence.interactions_for(contract.id).unwrap();

    assert_eq!(listed, vec![stored.clone()]);
    assert_eq!(stored.kind, InteractionKind::RequestCorrection);
    assert_eq!(
        stored.metadata.get(REASONS_METADATA_KEY).map(String::as_str),
        Some("blurry,wrong_document")
    );
}

#[test]
fn test_incomplete_interaction_is_rejected() {
    let persistence = create_test_persistence();
    let contract = create_test_contract(&persistence, ContractState::DetailsAvailable, None);

    let result = persistence.create_interaction(NewInteraction {
        admin_id: ADMIN,
        contract_id: contract.id,
        customer_id: CUSTOMER,
        kind: InteractionKind::Message,
        content: String::from("   "),
        metadata: BTreeMap::new(),
    });

    assert!(matches!(result, Err(RepositoryError::Validation { .. })));
    assert!(persistence.interactions_for(contract.id).unwrap().is_empty());
}

#[test]
fn test_sent_email_is_registered_as_interaction() {
    let persistence = create_test_persistence();
    let contract = create_test_contract(&persistence, ContractState::DetailsAvailable, None);

    let stored = persistence
        .register_sent_email(ADMIN, &contract, "welcome")
        .unwrap();

    assert_eq!(stored.kind, InteractionKind::SentEmail);
    assert_eq!(stored.content, "welcome");
}

#[test]
fn test_request_correction_fails_analysis_and_records_side_effects() {
    let persistence = create_test_persistence();
    let notifier = create_test_notifier(&persistence);
    let contract = create_test_contract(
        &persistence,
        ContractState::DetailsAvailable,
        Some(AnalysisState::UnderAnalysis),
    );

    let payload = RequestCorrection::new(
        persistence.as_ref(),
        persistence.as_ref(),
        &notifier,
        &TracingErrorReporter,
    )
    .call(
        ADMIN,
        contract.id,
        &[String::from("blurry")],
        "  Please rescan  ",
        create_test_cause(),
    )
    .unwrap()
    .into_payload()
    .unwrap();

    assert_eq!(payload.contract.analysis_state, Some(AnalysisState::AnalysisFailed));
    assert!(payload.interaction_recorded);
    assert!(payload.customer_notified);
    let interactions = persistence.interactions_for(contract.id).unwrap();
    assert_eq!(interactions.len(), 1);
    assert_eq!(interactions[0].content, "Please rescan");
    let notifications = persistence
        .notifications_for(EntityRef::contract(contract.id))
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].template, clark::templates::REQUEST_CORRECTION);
}

#[test]
fn test_empty_correction_request_changes_nothing() {
    let persistence = create_test_persistence();
    let notifier = create_test_notifier(&persistence);
    let contract = create_test_contract(
        &persistence,
        ContractState::DetailsAvailable,
        Some(AnalysisState::UnderAnalysis),
    );

    let outcome = RequestCorrection::new(
        persistence.as_ref(),
        persistence.as_ref(),
        &notifier,
        &TracingErrorReporter,
    )
    .call(ADMIN, contract.id, &[], "  ", create_test_cause())
    .unwrap();

    assert!(!outcome.successful());
    assert!(outcome.error_fields().contains_key("content"));
    assert!(persistence.interactions_for(contract.id).unwrap().is_empty());
}

// ============================================================================
// Notifications and job failures
// ============================================================================

#[test]
fn test_notifications_are_listed_per_entity() {
    let persistence = create_test_persistence();
    let contract = create_test_contract(&persistence, ContractState::DetailsAvailable, None);
    let mut payload = BTreeMap::new();
    payload.insert(String::from("state"), String::from("under_analysis"));
    let message = Message {
        entity: EntityRef::contract(contract.id),
        customer_id: CUSTOMER,
        template: String::from("contract_analysis_state_changed"),
        payload,
    };

    persistence
        .record_notification(NewNotification {
            message: message.clone(),
            channel: Channel::Email,
            status: NotificationStatus::Delivered,
            error: None,
        })
        .unwrap();
    persistence
        .record_notification(NewNotification {
            message,
            channel: Channel::Messenger,
            status: NotificationStatus::Failed,
            error: Some(String::from("no open session")),
        })
        .unwrap();
    let listed = persistence
        .notifications_for(EntityRef::contract(contract.id))
        .unwrap();
    let other = persistence
        .notifications_for(EntityRef::contract(ContractId::new(contract.id.value() + 1)))
        .unwrap();

    assert_eq!(listed.len(), 2);
    assert!(listed[0].is_delivered());
    assert_eq!(listed[1].error.as_deref(), Some("no open session"));
    assert_eq!(listed[0].payload.get("state").map(String::as_str), Some("under_analysis"));
    assert!(other.is_empty());
}

#[test]
fn test_job_failures_are_listed_oldest_first() {
    let persistence = create_test_persistence();
    for attempt in 1..=2 {
        persistence
            .record_job_failure(NewAsyncJobLog {
                job_name: String::from("finalize_inquiry"),
                arguments: String::from("{\"inquiry_id\":4}"),
                attempt,
                error: format!("attempt {attempt} failed"),
            })
            .unwrap();
    }

    let failures = persistence.job_failures().unwrap();

    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].attempt, 1);
    assert_eq!(failures[1].error, "attempt 2 failed");
}
