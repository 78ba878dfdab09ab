// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Payback ledger queries.

use clark_domain::{
    CustomerId, PaybackAccount, PaybackNumber, PaybackTransaction, PaybackTransactionId,
    PaybackTransactionState,
};
use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;

use crate::data_models::{parse_column, parse_timestamp};
use crate::diesel_schema::{payback_accounts, payback_transactions};
use crate::error::PersistenceError;

/// Diesel Queryable struct for payback account rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = payback_accounts)]
struct AccountRow {
    customer_id: i64,
    payback_number: String,
    points_locked: i64,
    points_unlocked: i64,
}

impl AccountRow {
    fn into_account(self) -> Result<PaybackAccount, PersistenceError> {
        let payback_number: PaybackNumber =
            PaybackNumber::parse(&self.payback_number).map_err(|e| {
                PersistenceError::CorruptRow {
                    table: "payback_accounts",
                    reason: e.to_string(),
                }
            })?;
        Ok(PaybackAccount {
            customer_id: CustomerId::new(self.customer_id),
            payback_number,
            points_locked: self.points_locked,
            points_unlocked: self.points_unlocked,
        })
    }
}

/// Diesel Queryable struct for payback transaction rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = payback_transactions)]
struct TransactionRow {
    transaction_id: i64,
    customer_id: i64,
    kind: String,
    points: i64,
    state: String,
    locked_until: String,
    created_at: String,
}

impl TransactionRow {
    fn into_transaction(self) -> Result<PaybackTransaction, PersistenceError> {
        Ok(PaybackTransaction {
            id: PaybackTransactionId::new(self.transaction_id),
            customer_id: CustomerId::new(self.customer_id),
            kind: parse_column("payback_transactions", &self.kind)?,
            points: self.points,
            state: parse_column("payback_transactions", &self.state)?,
            locked_until: parse_timestamp("payback_transactions", &self.locked_until)?,
            created_at: parse_timestamp("payback_transactions", &self.created_at)?,
        })
    }
}

/// Loads a customer's enrollment.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_account(
    conn: &mut SqliteConnection,
    customer_id: CustomerId,
) -> Result<Option<PaybackAccount>, PersistenceError> {
    payback_accounts::table
        .filter(payback_accounts::customer_id.eq(customer_id.value()))
        .select(AccountRow::as_select())
        .first::<AccountRow>(conn)
        .optional()?
        .map(AccountRow::into_account)
        .transpose()
}

/// Returns true if any account uses `payback_number`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn is_number_taken(
    conn: &mut SqliteConnection,
    payback_number: &PaybackNumber,
) -> Result<bool, PersistenceError> {
    let count: i64 = payback_accounts::table
        .filter(payback_accounts::payback_number.eq(payback_number.as_str()))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

/// Lists every enrollment, ordered by customer id.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn accounts(conn: &mut SqliteConnection) -> Result<Vec<PaybackAccount>, PersistenceError> {
    payback_accounts::table
        .order(payback_accounts::customer_id.asc())
        .select(AccountRow::as_select())
        .load::<AccountRow>(conn)?
        .into_iter()
        .map(AccountRow::into_account)
        .collect()
}

/// Loads one ledger entry.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_transaction(
    conn: &mut SqliteConnection,
    transaction_id: PaybackTransactionId,
) -> Result<Option<PaybackTransaction>, PersistenceError> {
    payback_transactions::table
        .filter(payback_transactions::transaction_id.eq(transaction_id.value()))
        .select(TransactionRow::as_select())
        .first::<TransactionRow>(conn)
        .optional()?
        .map(TransactionRow::into_transaction)
        .transpose()
}

/// Lists a customer's entries, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn transactions_for(
    conn: &mut SqliteConnection,
    customer_id: CustomerId,
) -> Result<Vec<PaybackTransaction>, PersistenceError> {
    payback_transactions::table
        .filter(payback_transactions::customer_id.eq(customer_id.value()))
        .order(payback_transactions::transaction_id.asc())
        .select(TransactionRow::as_select())
        .load::<TransactionRow>(conn)?
        .into_iter()
        .map(TransactionRow::into_transaction)
        .collect()
}

/// Lists locked entries whose lock ended at or before `now`.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn locked_transactions_due(
    conn: &mut SqliteConnection,
    now: OffsetDateTime,
) -> Result<Vec<PaybackTransaction>, PersistenceError> {
    let locked: Vec<PaybackTransaction> = payback_transactions::table
        .filter(payback_transactions::state.eq(PaybackTransactionState::Locked.as_str()))
        .order(payback_transactions::transaction_id.asc())
        .select(TransactionRow::as_select())
        .load::<TransactionRow>(conn)?
        .into_iter()
        .map(TransactionRow::into_transaction)
        .collect::<Result<_, _>>()?;
    Ok(locked
        .into_iter()
        .filter(|transaction| transaction.is_release_due(now))
        .collect())
}
