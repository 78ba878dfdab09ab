// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    AdminId, ContractId, CustomerId, DomainError, InteractionKind, NewInteraction,
    REASONS_METADATA_KEY,
};

#[test]
fn test_correction_request_joins_reasons() {
    let reasons: Vec<String> = vec![
        String::from("blurry_scan"),
        String::from("  "),
        String::from("missing_page"),
    ];
    let interaction: NewInteraction = NewInteraction::correction_request(
        AdminId::new(7),
        ContractId::new(3),
        CustomerId::new(11),
        &reasons,
        "  Please upload page two.  ",
    )
    .unwrap();

    assert_eq!(interaction.kind, InteractionKind::RequestCorrection);
    assert_eq!(interaction.content, "Please upload page two.");
    assert_eq!(
        interaction.metadata.get(REASONS_METADATA_KEY).map(String::as_str),
        Some("blurry_scan,missing_page")
    );
}

#[test]
fn test_correction_request_with_only_free_text() {
    let interaction: NewInteraction = NewInteraction::correction_request(
        AdminId::new(7),
        ContractId::new(3),
        CustomerId::new(11),
        &[],
        "Wrong contract uploaded",
    )
    .unwrap();

    assert!(interaction.metadata.is_empty());
}

#[test]
fn test_correction_request_needs_reason_or_text() {
    let result = NewInteraction::correction_request(
        AdminId::new(7),
        ContractId::new(3),
        CustomerId::new(11),
        &[String::from(" ")],
        "   ",
    );

    assert!(matches!(
        result,
        Err(DomainError::InvalidInteraction {
            field: "content",
            ..
        })
    ));
}
