// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Payback enrollment, crediting and balance recalculation.
//!
//! Every ledger access runs inside [`PaybackLedger::exclusive`]. A
//! recalculation therefore never interleaves with a credit or with another
//! recalculation, and a failure part-way leaves the ledger as it was.

use super::Failure;
use crate::error::{CoreError, RepositoryError};
use crate::outcome::Outcome;
use crate::repository::{PaybackLedger, PaybackStore, RepositoryResult};
use clark_domain::{
    CustomerId, NewPaybackTransaction, PaybackAccount, PaybackBalance, PaybackNumber,
    PaybackTransaction, PaybackTransactionKind, compute_balance,
};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info};

/// Days a fresh credit stays locked when not configured.
pub const DEFAULT_LOCK_DAYS: i64 = 30;

/// Ledger behaviour configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaybackConfig {
    /// Days a new entry stays locked before it may be released.
    pub lock_days: i64,
}

impl Default for PaybackConfig {
    fn default() -> Self {
        Self {
            lock_days: DEFAULT_LOCK_DAYS,
        }
    }
}

/// Sums a customer's entries, reporting an overflow against `points`.
fn balance_of(transactions: &[PaybackTransaction]) -> RepositoryResult<PaybackBalance> {
    compute_balance(transactions).map_err(|err| RepositoryError::Validation {
        field: String::from("points"),
        message: err.to_string(),
    })
}

/// Recomputes a customer's cached balances from their entries.
fn refresh_balance(
    store: &mut dyn PaybackStore,
    customer_id: CustomerId,
) -> RepositoryResult<PaybackAccount> {
    let transactions: Vec<PaybackTransaction> = store.transactions_for(customer_id)?;
    store.update_balance(customer_id, balance_of(&transactions)?)
}

/// Payload of [`EnrollPayback`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrollPaybackPayload {
    pub account: PaybackAccount,
    /// False when the customer was already enrolled with the same number.
    pub created: bool,
}

/// Enrolls a customer in payback.
pub struct EnrollPayback<'a> {
    ledger: &'a dyn PaybackLedger,
}

impl<'a> EnrollPayback<'a> {
    #[must_use]
    pub const fn new(ledger: &'a dyn PaybackLedger) -> Self {
        Self { ledger }
    }

    /// Enrolls `customer_id` with `payback_number`.
    ///
    /// Repeating an enrollment with the same number returns the existing
    /// account. A different number for an enrolled customer, or a number
    /// already used by someone else, fails on `payback_number`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Repository` if the backend fails.
    pub fn call(
        &self,
        customer_id: CustomerId,
        payback_number: &str,
    ) -> Result<Outcome<EnrollPaybackPayload>, CoreError> {
        self.run(customer_id, payback_number)
            .or_else(Failure::into_result)
    }

    fn run(
        &self,
        customer_id: CustomerId,
        payback_number: &str,
    ) -> Result<Outcome<EnrollPaybackPayload>, Failure> {
        let number: PaybackNumber = PaybackNumber::parse(payback_number)?;
        let mut enrolled: Option<EnrollPaybackPayload> = None;

        self.ledger.exclusive(&mut |store| {
            let payload: EnrollPaybackPayload = match store.find_account(customer_id)? {
                Some(account) if account.payback_number == number => EnrollPaybackPayload {
                    account,
                    created: false,
                },
                Some(_) => {
                    return Err(RepositoryError::Validation {
                        field: String::from("payback_number"),
                        message: String::from("does not match the enrolled number"),
                    });
                }
                None => EnrollPaybackPayload {
                    account: store.create_account(customer_id, &number)?,
                    created: true,
                },
            };
            enrolled = Some(payload);
            Ok(())
        })?;

        let payload: EnrollPaybackPayload = enrolled.ok_or_else(|| {
            Failure::Core(CoreError::Repository(RepositoryError::Backend(
                String::from("enrollment finished without a result"),
            )))
        })?;
        info!(
            customer_id = %customer_id,
            created = payload.created,
            "payback enrollment"
        );
        Ok(Outcome::success(payload))
    }
}

/// Payload of [`CreditPaybackPoints`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreditPaybackPointsPayload {
    pub transaction: PaybackTransaction,
    pub account: PaybackAccount,
}

/// Books a locked credit or refund for an enrolled customer.
pub struct CreditPaybackPoints<'a> {
    ledger: &'a dyn PaybackLedger,
    config: PaybackConfig,
}

impl<'a> CreditPaybackPoints<'a> {
    #[must_use]
    pub const fn new(ledger: &'a dyn PaybackLedger, config: PaybackConfig) -> Self {
        Self { ledger, config }
    }

    /// Appends a locked entry and refreshes the customer's balances.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Repository` if the backend fails.
    pub fn call(
        &self,
        customer_id: CustomerId,
        kind: PaybackTransactionKind,
        points: i64,
        now: OffsetDateTime,
    ) -> Result<Outcome<CreditPaybackPointsPayload>, CoreError> {
        self.run(customer_id, kind, points, now)
            .or_else(Failure::into_result)
    }

    fn run(
        &self,
        customer_id: CustomerId,
        kind: PaybackTransactionKind,
        points: i64,
        now: OffsetDateTime,
    ) -> Result<Outcome<CreditPaybackPointsPayload>, Failure> {
        let entry: NewPaybackTransaction = NewPaybackTransaction::locked_for(
            customer_id,
            kind,
            points,
            now,
            self.config.lock_days,
        )?;
        let mut booked: Option<CreditPaybackPointsPayload> = None;

        self.ledger.exclusive(&mut |store| {
            if store.find_account(customer_id)?.is_none() {
                return Err(RepositoryError::NotFound {
                    resource: "payback account",
                    id: customer_id.value(),
                });
            }
            let transaction: PaybackTransaction = store.append_transaction(entry.clone())?;
            let account: PaybackAccount = refresh_balance(store, customer_id)?;
            booked = Some(CreditPaybackPointsPayload {
                transaction,
                account,
            });
            Ok(())
        })?;

        let payload: CreditPaybackPointsPayload = booked.ok_or_else(|| {
            Failure::Core(CoreError::Repository(RepositoryError::Backend(
                String::from("credit finished without a result"),
            )))
        })?;
        info!(
            customer_id = %customer_id,
            kind = %kind,
            points,
            locked_until = %payload.transaction.locked_until,
            "payback entry booked"
        );
        Ok(Outcome::success(payload))
    }
}

/// Payload of [`RecalculatePaybackPoints`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecalculationPayload {
    /// Entries released by this run.
    pub released_count: usize,
    /// Accounts whose cached balances changed.
    pub accounts_updated: usize,
}

/// Releases due entries and recomputes every account's balances.
pub struct RecalculatePaybackPoints<'a> {
    ledger: &'a dyn PaybackLedger,
}

impl<'a> RecalculatePaybackPoints<'a> {
    #[must_use]
    pub const fn new(ledger: &'a dyn PaybackLedger) -> Self {
        Self { ledger }
    }

    /// Releases every locked entry with `locked_until <= now`, then rewrites
    /// the cached balances of each account whose balances changed.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Repository` if the backend fails. Nothing is kept
    /// in that case.
    pub fn call(&self, now: OffsetDateTime) -> Result<Outcome<RecalculationPayload>, CoreError> {
        self.run(now).or_else(Failure::into_result)
    }

    fn run(&self, now: OffsetDateTime) -> Result<Outcome<RecalculationPayload>, Failure> {
        let mut payload: RecalculationPayload = RecalculationPayload::default();

        self.ledger.exclusive(&mut |store| {
            let mut totals: RecalculationPayload = RecalculationPayload::default();
            for transaction in store.locked_transactions_due(now)? {
                store.release_transaction(transaction.id)?;
                totals.released_count += 1;
            }
            for account in store.accounts()? {
                let transactions: Vec<PaybackTransaction> =
                    store.transactions_for(account.customer_id)?;
                let balance: PaybackBalance = balance_of(&transactions)?;
                if balance.points_locked == account.points_locked
                    && balance.points_unlocked == account.points_unlocked
                {
                    continue;
                }
                store.update_balance(account.customer_id, balance)?;
                debug!(
                    customer_id = %account.customer_id,
                    points_locked = balance.points_locked,
                    points_unlocked = balance.points_unlocked,
                    "payback balance updated"
                );
                totals.accounts_updated += 1;
            }
            payload = totals;
            Ok(())
        })?;

        info!(
            released = payload.released_count,
            accounts_updated = payload.accounts_updated,
            "payback recalculation finished"
        );
        Ok(Outcome::success(payload))
    }
}
