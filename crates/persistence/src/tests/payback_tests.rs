// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clark::{
    CreditPaybackPoints, EnrollPayback, PaybackConfig, PaybackLedger, PaybackStore,
    RecalculatePaybackPoints, RepositoryError,
};
use clark_domain::{
    CustomerId, NewPaybackTransaction, PaybackTransaction, PaybackTransactionKind,
    PaybackTransactionState,
};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

use super::{CUSTOMER, create_test_persistence};
use crate::Persistence;

const NUMBER: &str = "3083640123";
const NOW: OffsetDateTime = datetime!(2026-02-01 12:00 UTC);

fn enroll(persistence: &Persistence) {
    let outcome = EnrollPayback::new(persistence).call(CUSTOMER, NUMBER).unwrap();
    assert!(outcome.successful());
}

fn credit(persistence: &Persistence, kind: PaybackTransactionKind, points: i64) {
    let outcome = CreditPaybackPoints::new(persistence, PaybackConfig::default())
        .call(CUSTOMER, kind, points, NOW)
        .unwrap();
    assert!(outcome.successful());
}

fn stored_transactions(persistence: &Persistence) -> Vec<PaybackTransaction> {
    let mut transactions = Vec::new();
    persistence
        .exclusive(&mut |store| {
            transactions = store.transactions_for(CUSTOMER)?;
            Ok(())
        })
        .unwrap();
    transactions
}

// ============================================================================
// Enrollment
// ============================================================================

#[test]
fn test_enrollment_is_idempotent_for_the_same_number() {
    let persistence = create_test_persistence();

    let first = EnrollPayback::new(persistence.as_ref())
        .call(CUSTOMER, NUMBER)
        .unwrap()
        .into_payload()
        .unwrap();
    let second = EnrollPayback::new(persistence.as_ref())
        .call(CUSTOMER, NUMBER)
        .unwrap()
        .into_payload()
        .unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.account, second.account);
    assert_eq!(first.account.points_locked, 0);
}

#[test]
fn test_enrollment_rejects_a_number_taken_by_another_customer() {
    let persistence = create_test_persistence();
    enroll(&persistence);

    let outcome = EnrollPayback::new(persistence.as_ref())
        .call(CustomerId::new(CUSTOMER.value() + 1), NUMBER)
        .unwrap();

    assert!(!outcome.successful());
    assert!(outcome.error_fields().contains_key("payback_number"));
}

#[test]
fn test_enrollment_rejects_a_malformed_number() {
    let persistence = create_test_persistence();

    let outcome = EnrollPayback::new(persistence.as_ref())
        .call(CUSTOMER, "12ab")
        .unwrap();

    assert!(outcome.error_fields().contains_key("payback_number"));
}

// ============================================================================
// Ledger
// ============================================================================

#[test]
fn test_credit_and_refund_are_booked_locked() {
    let persistence = create_test_persistence();
    enroll(&persistence);

    credit(&persistence, PaybackTransactionKind::Credit, 100);
    let payload = CreditPaybackPoints::new(persistence.as_ref(), PaybackConfig::default())
        .call(CUSTOMER, PaybackTransactionKind::Refund, 30, NOW)
        .unwrap()
        .into_payload()
        .unwrap();

    assert_eq!(payload.transaction.state, PaybackTransactionState::Locked);
    assert_eq!(payload.transaction.locked_until, NOW + Duration::days(30));
    assert_eq!(payload.account.points_locked, 70);
    assert_eq!(payload.account.points_unlocked, 0);
}

#[test]
fn test_credit_without_enrollment_is_not_found() {
    let persistence = create_test_persistence();

    let outcome = CreditPaybackPoints::new(persistence.as_ref(), PaybackConfig::default())
        .call(CUSTOMER, PaybackTransactionKind::Credit, 10, NOW)
        .unwrap();

    assert!(outcome.is_not_found());
}

#[test]
fn test_recalculation_releases_due_entries_only() {
    let persistence = create_test_persistence();
    enroll(&persistence);
    credit(&persistence, PaybackTransactionKind::Credit, 100);
    let long_lock = CreditPaybackPoints::new(persistence.as_ref(), PaybackConfig { lock_days: 60 })
        .call(CUSTOMER, PaybackTransactionKind::Credit, 40, NOW)
        .unwrap();
    assert!(long_lock.successful());

    let payload = RecalculatePaybackPoints::new(persistence.as_ref())
        .call(NOW + Duration::days(31))
        .unwrap()
        .into_payload()
        .unwrap();
    let repeat = RecalculatePaybackPoints::new(persistence.as_ref())
        .call(NOW + Duration::days(31))
        .unwrap()
        .into_payload()
        .unwrap();

    assert_eq!(payload.released_count, 1);
    assert_eq!(payload.accounts_updated, 1);
    assert_eq!(repeat.released_count, 0);
    assert_eq!(repeat.accounts_updated, 0);
    let states: Vec<_> = stored_transactions(&persistence)
        .iter()
        .map(|t| t.state)
        .collect();
    assert_eq!(
        states,
        vec![
            PaybackTransactionState::Released,
            PaybackTransactionState::Locked,
        ]
    );
}

#[test]
fn test_failed_exclusive_section_keeps_nothing() {
    let persistence = create_test_persistence();
    enroll(&persistence);

    let result = persistence.exclusive(&mut |store| {
        let entry = NewPaybackTransaction::locked_for(
            CUSTOMER,
            PaybackTransactionKind::Credit,
            25,
            NOW,
            30,
        )
        .expect("valid entry");
        store.append_transaction(entry)?;
        Err(RepositoryError::Backend(String::from("forced failure")))
    });

    assert!(matches!(result, Err(RepositoryError::Backend(_))));
    assert!(stored_transactions(&persistence).is_empty());
}
