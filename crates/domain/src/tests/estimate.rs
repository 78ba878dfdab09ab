// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    AnalysisEstimateConfig, ContractId, Document, DocumentId, DocumentType,
    estimate_analysis_completion,
};
use time::OffsetDateTime;
use time::macros::datetime;

fn create_test_document(
    id: i64,
    document_type: DocumentType,
    created_at: OffsetDateTime,
    visible: bool,
) -> Document {
    Document {
        id: DocumentId::new(id),
        contract_id: ContractId::new(1),
        document_type,
        file_name: format!("doc-{id}.pdf"),
        checksum: format!("sha-{id}"),
        visible_to_customer: visible,
        created_at,
    }
}

#[test]
fn test_weekday_upload_adds_24_hours() {
    // Wednesday
    let uploaded: OffsetDateTime = datetime!(2026-10-14 10:00 UTC);
    let docs: Vec<Document> = vec![create_test_document(
        1,
        DocumentType::CustomerUpload,
        uploaded,
        true,
    )];

    let estimate = estimate_analysis_completion(&docs, &AnalysisEstimateConfig::default()).unwrap();

    assert_eq!(estimate, Some(datetime!(2026-10-15 10:00 UTC)));
}

#[test]
fn test_saturday_upload_adds_76_hours() {
    let uploaded: OffsetDateTime = datetime!(2026-10-10 12:00 UTC);
    let docs: Vec<Document> = vec![create_test_document(
        1,
        DocumentType::CustomerUpload,
        uploaded,
        true,
    )];

    let estimate = estimate_analysis_completion(&docs, &AnalysisEstimateConfig::default()).unwrap();

    assert_eq!(estimate, Some(datetime!(2026-10-13 16:00 UTC)));
}

#[test]
fn test_friday_night_utc_is_saturday_in_berlin() {
    // 23:30 UTC on Friday is 01:30 on Saturday in Europe/Berlin (CEST).
    let uploaded: OffsetDateTime = datetime!(2026-10-09 23:30 UTC);
    let docs: Vec<Document> = vec![create_test_document(
        1,
        DocumentType::CustomerUpload,
        uploaded,
        true,
    )];

    let estimate = estimate_analysis_completion(&docs, &AnalysisEstimateConfig::default()).unwrap();

    assert_eq!(estimate, Some(datetime!(2026-10-13 03:30 UTC)));
}

#[test]
fn test_sunday_night_utc_is_monday_in_berlin() {
    let uploaded: OffsetDateTime = datetime!(2026-10-11 22:30 UTC);
    let docs: Vec<Document> = vec![create_test_document(
        1,
        DocumentType::CustomerUpload,
        uploaded,
        true,
    )];

    let estimate = estimate_analysis_completion(&docs, &AnalysisEstimateConfig::default()).unwrap();

    assert_eq!(estimate, Some(datetime!(2026-10-12 22:30 UTC)));
}

#[test]
fn test_latest_visible_document_of_other_type_yields_none() {
    let docs: Vec<Document> = vec![
        create_test_document(
            1,
            DocumentType::CustomerUpload,
            datetime!(2026-10-12 09:00 UTC),
            true,
        ),
        create_test_document(2, DocumentType::Policy, datetime!(2026-10-13 09:00 UTC), true),
    ];

    let estimate = estimate_analysis_completion(&docs, &AnalysisEstimateConfig::default()).unwrap();

    assert_eq!(estimate, None);
}

#[test]
fn test_hidden_documents_are_ignored() {
    let docs: Vec<Document> = vec![
        create_test_document(
            1,
            DocumentType::CustomerUpload,
            datetime!(2026-10-12 09:00 UTC),
            true,
        ),
        create_test_document(2, DocumentType::Policy, datetime!(2026-10-13 09:00 UTC), false),
    ];

    let estimate = estimate_analysis_completion(&docs, &AnalysisEstimateConfig::default()).unwrap();

    assert_eq!(estimate, Some(datetime!(2026-10-13 09:00 UTC)));
}

#[test]
fn test_no_documents_yields_none() {
    let estimate = estimate_analysis_completion(&[], &AnalysisEstimateConfig::default()).unwrap();
    assert_eq!(estimate, None);
}

#[test]
fn test_configured_timezone_and_offsets() {
    // 23:30 UTC Friday is still Friday in New York.
    let config: AnalysisEstimateConfig =
        AnalysisEstimateConfig::from_parts("America/New_York", DocumentType::CustomerUpload, 48, 96)
            .unwrap();
    let docs: Vec<Document> = vec![create_test_document(
        1,
        DocumentType::CustomerUpload,
        datetime!(2026-10-09 23:30 UTC),
        true,
    )];

    let estimate = estimate_analysis_completion(&docs, &config).unwrap();

    assert_eq!(estimate, Some(datetime!(2026-10-11 23:30 UTC)));
}

#[test]
fn test_unknown_timezone_is_rejected() {
    let result = AnalysisEstimateConfig::from_parts(
        "Mars/Olympus_Mons",
        DocumentType::CustomerUpload,
        24,
        76,
    );
    assert!(result.is_err());
}
