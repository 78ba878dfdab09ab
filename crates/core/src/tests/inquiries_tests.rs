// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{CUSTOMER, Fixture, create_admin_actor, create_inquiry, create_test_cause};
use crate::notify::templates;
use crate::repository::InquiryRepository;
use crate::{Finalization, SubCompanyGrouping, UpdateInquiryCategoryState, UpdateInquiryState};
use clark_domain::{
    InquiryCategoryEvent, InquiryCategoryState, InquiryEvent, InquiryState, SubcompanyId,
};

fn update_category(fixture: &Fixture) -> UpdateInquiryCategoryState<'_> {
    UpdateInquiryCategoryState::new(
        fixture.store.as_ref(),
        &fixture.notifier,
        fixture.reporter.as_ref(),
    )
}

#[test]
fn test_update_inquiry_state_contacts_pending_inquiry() {
    let fixture = Fixture::new();
    let inquiry = create_inquiry(&fixture.store, 1, InquiryState::Pending, &["legal"]);

    let outcome = UpdateInquiryState::new(fixture.store.as_ref())
        .call(
            inquiry.id,
            InquiryEvent::Contact,
            create_admin_actor(),
            create_test_cause(),
        )
        .unwrap();

    assert_eq!(
        outcome.into_payload().unwrap().inquiry.state,
        InquiryState::Contacted
    );
}

#[test]
fn test_update_inquiry_state_rejects_closed_inquiry() {
    let fixture = Fixture::new();
    let inquiry = create_inquiry(&fixture.store, 1, InquiryState::Completed, &["legal"]);

    let outcome = UpdateInquiryState::new(fixture.store.as_ref())
        .call(
            inquiry.id,
            InquiryEvent::Cancel,
            create_admin_actor(),
            create_test_cause(),
        )
        .unwrap();

    assert!(!outcome.successful());
}

#[test]
fn test_category_answer_waits_for_remaining_categories() {
    let fixture = Fixture::new();
    let inquiry = create_inquiry(
        &fixture.store,
        1,
        InquiryState::Contacted,
        &["legal", "household"],
    );

    let outcome = update_category(&fixture)
        .call(
            inquiry.id,
            inquiry.categories[0].id,
            InquiryCategoryEvent::Complete,
            None,
            create_admin_actor(),
            create_test_cause(),
        )
        .unwrap();

    let payload = outcome.into_payload().unwrap();
    assert_eq!(payload.category.state, InquiryCategoryState::Completed);
    assert!(!payload.finalized);
    assert_eq!(payload.inquiry.state, InquiryState::Contacted);
}

#[test]
fn test_any_completed_category_completes_inquiry() {
    let fixture = Fixture::new();
    let inquiry = create_inquiry(
        &fixture.store,
        1,
        InquiryState::Contacted,
        &["legal", "household"],
    );
    let interactor = update_category(&fixture);

    interactor
        .call(
            inquiry.id,
            inquiry.categories[0].id,
            InquiryCategoryEvent::Cancel,
            Some("insurer declined"),
            create_admin_actor(),
            create_test_cause(),
        )
        .unwrap();
    let outcome = interactor
        .call(
            inquiry.id,
            inquiry.categories[1].id,
            InquiryCategoryEvent::Complete,
            Some("ignored"),
            create_admin_actor(),
            create_test_cause(),
        )
        .unwrap();

    let payload = outcome.into_payload().unwrap();
    assert!(payload.finalized);
    assert_eq!(payload.inquiry.state, InquiryState::Completed);
    assert_eq!(payload.category.cancellation_cause, None);
    assert!(fixture.messenger.delivered().is_empty());
}

#[test]
fn test_all_cancelled_categories_cancel_inquiry_and_notify() {
    let fixture = Fixture::new();
    let inquiry = create_inquiry(&fixture.store, 4, InquiryState::Pending, &["legal"]);

    let outcome = update_category(&fixture)
        .call(
            inquiry.id,
            inquiry.categories[0].id,
            InquiryCategoryEvent::Cancel,
            Some("no contract found"),
            create_admin_actor(),
            create_test_cause(),
        )
        .unwrap();

    let payload = outcome.into_payload().unwrap();
    assert!(payload.finalized);
    assert_eq!(payload.inquiry.state, InquiryState::Canceled);
    assert_eq!(
        payload.category.cancellation_cause.as_deref(),
        Some("no contract found")
    );
    let delivered = fixture.messenger.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].template, templates::INQUIRY_CATEGORIES_CANCELLED);
    assert_eq!(
        delivered[0].payload.get("cancellation_causes").map(String::as_str),
        Some("no contract found")
    );
}

#[test]
fn test_finalization_is_a_no_op_for_closed_inquiry() {
    let fixture = Fixture::new();
    let inquiry = create_inquiry(&fixture.store, 1, InquiryState::Pending, &["legal"]);
    update_category(&fixture)
        .call(
            inquiry.id,
            inquiry.categories[0].id,
            InquiryCategoryEvent::Complete,
            None,
            create_admin_actor(),
            create_test_cause(),
        )
        .unwrap();

    let outcome = Finalization::new(
        fixture.store.as_ref(),
        &fixture.notifier,
        fixture.reporter.as_ref(),
    )
    .call(inquiry.id, create_test_cause())
    .unwrap();

    let payload = outcome.into_payload().unwrap();
    assert!(!payload.finalized);
    assert_eq!(payload.inquiry.state, InquiryState::Completed);
}

#[test]
fn test_finalization_of_inquiry_without_categories_does_nothing() {
    let fixture = Fixture::new();
    let inquiry = create_inquiry(&fixture.store, 1, InquiryState::Pending, &[]);

    let outcome = Finalization::new(
        fixture.store.as_ref(),
        &fixture.notifier,
        fixture.reporter.as_ref(),
    )
    .call(inquiry.id, create_test_cause())
    .unwrap();

    assert!(!outcome.into_payload().unwrap().finalized);
    assert_eq!(
        fixture.store.find_inquiry(inquiry.id).unwrap().unwrap().state,
        InquiryState::Pending
    );
}

#[test]
fn test_answering_a_category_twice_is_rejected() {
    let fixture = Fixture::new();
    let inquiry = create_inquiry(
        &fixture.store,
        1,
        InquiryState::Pending,
        &["legal", "household"],
    );
    let interactor = update_category(&fixture);
    interactor
        .call(
            inquiry.id,
            inquiry.categories[0].id,
            InquiryCategoryEvent::Complete,
            None,
            create_admin_actor(),
            create_test_cause(),
        )
        .unwrap();

    let outcome = interactor
        .call(
            inquiry.id,
            inquiry.categories[0].id,
            InquiryCategoryEvent::Cancel,
            Some("late"),
            create_admin_actor(),
            create_test_cause(),
        )
        .unwrap();

    assert!(!outcome.successful());
}

#[test]
fn test_grouping_by_subcompany() {
    let fixture = Fixture::new();
    let late = create_inquiry(&fixture.store, 20, InquiryState::Pending, &["legal"]);
    let early_one = create_inquiry(
        &fixture.store,
        10,
        InquiryState::Contacted,
        &["household", "liability"],
    );
    let early_two = create_inquiry(&fixture.store, 10, InquiryState::Pending, &["car"]);
    create_inquiry(&fixture.store, 30, InquiryState::Completed, &["travel"]);
    update_category(&fixture)
        .call(
            early_one.id,
            early_one.categories[1].id,
            InquiryCategoryEvent::Complete,
            None,
            create_admin_actor(),
            create_test_cause(),
        )
        .unwrap();

    let outcome = SubCompanyGrouping::new(fixture.store.as_ref())
        .call(CUSTOMER)
        .unwrap();

    let groups = outcome.into_payload().unwrap().groups;
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].subcompany_id, SubcompanyId::new(10));
    assert_eq!(groups[0].inquiry_ids, vec![early_one.id, early_two.id]);
    assert_eq!(
        groups[0].category_idents,
        vec![String::from("household"), String::from("car")]
    );
    assert_eq!(groups[1].subcompany_id, SubcompanyId::new(20));
    assert_eq!(groups[1].inquiry_ids, vec![late.id]);
}
