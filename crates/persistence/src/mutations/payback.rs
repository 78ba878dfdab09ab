// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Payback ledger mutations.
//!
//! These run inside the exclusive section opened by `PaybackLedger::exclusive`.

use clark_domain::{
    CustomerId, NewPaybackTransaction, PaybackAccount, PaybackBalance, PaybackNumber,
    PaybackTransaction, PaybackTransactionId, PaybackTransactionState,
};
use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;
use tracing::debug;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::format_timestamp;
use crate::diesel_schema::{payback_accounts, payback_transactions};
use crate::error::PersistenceError;
use crate::queries::payback::{find_account, find_transaction, is_number_taken};

fn missing_account(customer_id: CustomerId) -> PersistenceError {
    PersistenceError::NotFound {
        resource: "payback_account",
        id: customer_id.value(),
    }
}

/// Enrolls a customer with zero balances.
///
/// # Errors
///
/// Returns `Validation` on `payback_number` if the customer is already
/// enrolled or the number is used by another customer, or an error if the
/// insert fails.
pub fn insert_account(
    conn: &mut SqliteConnection,
    customer_id: CustomerId,
    payback_number: &PaybackNumber,
) -> Result<PaybackAccount, PersistenceError> {
    if find_account(conn, customer_id)?.is_some() || is_number_taken(conn, payback_number)? {
        return Err(PersistenceError::Validation {
            field: String::from("payback_number"),
            message: String::from("has already been taken"),
        });
    }

    diesel::insert_into(payback_accounts::table)
        .values((
            payback_accounts::customer_id.eq(customer_id.value()),
            payback_accounts::payback_number.eq(payback_number.as_str()),
            payback_accounts::points_locked.eq(0_i64),
            payback_accounts::points_unlocked.eq(0_i64),
        ))
        .execute(conn)?;

    debug!(customer_id = %customer_id, "Payback account created");
    find_account(conn, customer_id)?.ok_or_else(|| missing_account(customer_id))
}

/// Appends a locked ledger entry.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_transaction(
    conn: &mut SqliteConnection,
    transaction: &NewPaybackTransaction,
    now: OffsetDateTime,
) -> Result<PaybackTransaction, PersistenceError> {
    diesel::insert_into(payback_transactions::table)
        .values((
            payback_transactions::customer_id.eq(transaction.customer_id.value()),
            payback_transactions::kind.eq(transaction.kind.as_str()),
            payback_transactions::points.eq(transaction.points),
            payback_transactions::state.eq(PaybackTransactionState::Locked.as_str()),
            payback_transactions::locked_until.eq(format_timestamp(transaction.locked_until)?),
            payback_transactions::created_at.eq(format_timestamp(now)?),
        ))
        .execute(conn)?;

    let transaction_id: PaybackTransactionId =
        PaybackTransactionId::new(get_last_insert_rowid(conn)?);
    find_transaction(conn, transaction_id)?.ok_or(PersistenceError::NotFound {
        resource: "payback_transaction",
        id: transaction_id.value(),
    })
}

/// Marks an entry released.
///
/// # Errors
///
/// Returns `NotFound` if no entry has `transaction_id`, or an error if the
/// update fails.
pub fn release_transaction(
    conn: &mut SqliteConnection,
    transaction_id: PaybackTransactionId,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(payback_transactions::table)
        .filter(payback_transactions::transaction_id.eq(transaction_id.value()))
        .set(payback_transactions::state.eq(PaybackTransactionState::Released.as_str()))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound {
            resource: "payback_transaction",
            id: transaction_id.value(),
        });
    }
    Ok(())
}

/// Overwrites a customer's cached balances.
///
/// # Errors
///
/// Returns `NotFound` if the customer is not enrolled, or an error if the
/// update fails.
pub fn update_balance(
    conn: &mut SqliteConnection,
    customer_id: CustomerId,
    balance: PaybackBalance,
) -> Result<PaybackAccount, PersistenceError> {
    let updated: usize = diesel::update(payback_accounts::table)
        .filter(payback_accounts::customer_id.eq(customer_id.value()))
        .set((
            payback_accounts::points_locked.eq(balance.points_locked),
            payback_accounts::points_unlocked.eq(balance.points_unlocked),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(missing_account(customer_id));
    }
    find_account(conn, customer_id)?.ok_or_else(|| missing_account(customer_id))
}
