// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    InquiryCategory, InquiryCategoryId, InquiryCategoryState, InquiryEvent, InquiryId,
    finalization_event,
};

fn create_test_category(id: i64, state: InquiryCategoryState) -> InquiryCategory {
    InquiryCategory {
        id: InquiryCategoryId::new(id),
        inquiry_id: InquiryId::new(1),
        category_ident: format!("category_{id}"),
        state,
        cancellation_cause: None,
    }
}

#[test]
fn test_open_category_blocks_finalization() {
    let categories: Vec<InquiryCategory> = vec![
        create_test_category(1, InquiryCategoryState::Completed),
        create_test_category(2, InquiryCategoryState::InProgress),
    ];
    assert_eq!(finalization_event(&categories), None);
}

#[test]
fn test_any_completed_category_completes_inquiry() {
    let categories: Vec<InquiryCategory> = vec![
        create_test_category(1, InquiryCategoryState::Cancelled),
        create_test_category(2, InquiryCategoryState::Completed),
    ];
    assert_eq!(finalization_event(&categories), Some(InquiryEvent::Complete));
}

#[test]
fn test_all_cancelled_categories_cancel_inquiry() {
    let categories: Vec<InquiryCategory> = vec![
        create_test_category(1, InquiryCategoryState::Cancelled),
        create_test_category(2, InquiryCategoryState::Cancelled),
    ];
    assert_eq!(finalization_event(&categories), Some(InquiryEvent::Cancel));
}

#[test]
fn test_inquiry_without_categories_is_not_finalized() {
    assert_eq!(finalization_event(&[]), None);
}
