// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    CustomerId, DomainError, MAX_TRANSACTION_POINTS, NewPaybackTransaction, PaybackBalance,
    PaybackNumber, PaybackTransaction, PaybackTransactionId, PaybackTransactionKind,
    PaybackTransactionState, compute_balance,
};
use time::OffsetDateTime;
use time::macros::datetime;

fn create_test_transaction(
    id: i64,
    kind: PaybackTransactionKind,
    points: i64,
    state: PaybackTransactionState,
    locked_until: OffsetDateTime,
) -> PaybackTransaction {
    PaybackTransaction {
        id: PaybackTransactionId::new(id),
        customer_id: CustomerId::new(1),
        kind,
        points,
        state,
        locked_until,
        created_at: datetime!(2026-09-01 00:00 UTC),
    }
}

#[test]
fn test_payback_number_requires_ten_digits() {
    assert!(PaybackNumber::parse("1234567890").is_ok());
    assert_eq!(
        PaybackNumber::parse("123456789"),
        Err(DomainError::InvalidPaybackNumber(String::from("123456789")))
    );
    assert!(PaybackNumber::parse("12345678901").is_err());
    assert!(PaybackNumber::parse("12345abcde").is_err());
}

#[test]
fn test_payback_number_deserialization_validates() {
    let ok: Result<PaybackNumber, _> = serde_json::from_str("\"0123456789\"");
    assert!(ok.is_ok());
    let bad: Result<PaybackNumber, _> = serde_json::from_str("\"01234\"");
    assert!(bad.is_err());
}

#[test]
fn test_balance_splits_locked_and_released() {
    let until: OffsetDateTime = datetime!(2026-10-01 00:00 UTC);
    let txs: Vec<PaybackTransaction> = vec![
        create_test_transaction(
            1,
            PaybackTransactionKind::Credit,
            500,
            PaybackTransactionState::Released,
            until,
        ),
        create_test_transaction(
            2,
            PaybackTransactionKind::Credit,
            200,
            PaybackTransactionState::Locked,
            until,
        ),
        create_test_transaction(
            3,
            PaybackTransactionKind::Refund,
            120,
            PaybackTransactionState::Released,
            until,
        ),
        create_test_transaction(
            4,
            PaybackTransactionKind::Refund,
            50,
            PaybackTransactionState::Locked,
            until,
        ),
    ];

    assert_eq!(
        compute_balance(&txs).unwrap(),
        PaybackBalance {
            points_locked: 150,
            points_unlocked: 380,
        }
    );
}

#[test]
fn test_release_due_only_for_expired_locks() {
    let now: OffsetDateTime = datetime!(2026-10-14 12:00 UTC);
    let due: PaybackTransaction = create_test_transaction(
        1,
        PaybackTransactionKind::Credit,
        10,
        PaybackTransactionState::Locked,
        now,
    );
    let later: PaybackTransaction = create_test_transaction(
        2,
        PaybackTransactionKind::Credit,
        10,
        PaybackTransactionState::Locked,
        datetime!(2026-10-15 12:00 UTC),
    );
    let released: PaybackTransaction = create_test_transaction(
        3,
        PaybackTransactionKind::Credit,
        10,
        PaybackTransactionState::Released,
        datetime!(2026-10-01 12:00 UTC),
    );

    assert!(due.is_release_due(now));
    assert!(!later.is_release_due(now));
    assert!(!released.is_release_due(now));
}

#[test]
fn test_new_transaction_rejects_non_positive_points() {
    let now: OffsetDateTime = datetime!(2026-10-14 12:00 UTC);
    assert_eq!(
        NewPaybackTransaction::locked_for(
            CustomerId::new(1),
            PaybackTransactionKind::Credit,
            0,
            now,
            30
        ),
        Err(DomainError::InvalidPoints(0))
    );

    let tx: NewPaybackTransaction = NewPaybackTransaction::locked_for(
        CustomerId::new(1),
        PaybackTransactionKind::Refund,
        40,
        now,
        30,
    )
    .unwrap();
    assert_eq!(tx.locked_until, datetime!(2026-11-13 12:00 UTC));
}

#[test]
fn test_new_transaction_rejects_points_above_the_cap() {
    let now: OffsetDateTime = datetime!(2026-10-14 12:00 UTC);
    assert_eq!(
        NewPaybackTransaction::locked_for(
            CustomerId::new(1),
            PaybackTransactionKind::Credit,
            i64::MAX,
            now,
            30
        ),
        Err(DomainError::InvalidPoints(i64::MAX))
    );
    assert!(
        NewPaybackTransaction::locked_for(
            CustomerId::new(1),
            PaybackTransactionKind::Credit,
            MAX_TRANSACTION_POINTS,
            now,
            30
        )
        .is_ok()
    );
}

#[test]
fn test_balance_overflow_is_an_error() {
    let until: OffsetDateTime = datetime!(2026-10-01 00:00 UTC);
    let txs: Vec<PaybackTransaction> = vec![
        create_test_transaction(
            1,
            PaybackTransactionKind::Credit,
            i64::MAX,
            PaybackTransactionState::Locked,
            until,
        ),
        create_test_transaction(
            2,
            PaybackTransactionKind::Credit,
            1,
            PaybackTransactionState::Locked,
            until,
        ),
    ];

    assert_eq!(
        compute_balance(&txs),
        Err(DomainError::BalanceOverflow { customer_id: 1 })
    );
}
