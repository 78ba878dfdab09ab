// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Payback loyalty-point ledger.
//!
//! Points are credited in a `locked` state and become spendable once their
//! lock period has passed and a recalculation releases them. Refunds are
//! recorded as their own (positive) transactions and subtract from whichever
//! bucket they sit in.

use crate::error::DomainError;
use crate::ids::{CustomerId, PaybackTransactionId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Duration, OffsetDateTime};

/// Number of digits in a payback card number.
pub const PAYBACK_NUMBER_LENGTH: usize = 10;

/// Largest point amount a single ledger entry may carry.
pub const MAX_TRANSACTION_POINTS: i64 = 1_000_000_000;

/// A validated payback card number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PaybackNumber(String);

impl PaybackNumber {
    /// Validates and wraps a payback number.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPaybackNumber` unless the input is exactly
    /// ten ASCII digits.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        if value.len() == PAYBACK_NUMBER_LENGTH && value.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(value.to_string()))
        } else {
            Err(DomainError::InvalidPaybackNumber(value.to_string()))
        }
    }

    /// Returns the number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PaybackNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PaybackNumber> for String {
    fn from(value: PaybackNumber) -> Self {
        value.0
    }
}

impl std::fmt::Display for PaybackNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaybackTransactionKind {
    Credit,
    Refund,
}

impl PaybackTransactionKind {
    /// Returns the persisted string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Refund => "refund",
        }
    }
}

impl FromStr for PaybackTransactionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(Self::Credit),
            "refund" => Ok(Self::Refund),
            _ => Err(DomainError::UnknownPaybackValue(s.to_string())),
        }
    }
}

impl std::fmt::Display for PaybackTransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lock state of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaybackTransactionState {
    Locked,
    Released,
}

impl PaybackTransactionState {
    /// Returns the persisted string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::Released => "released",
        }
    }
}

impl FromStr for PaybackTransactionState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "locked" => Ok(Self::Locked),
            "released" => Ok(Self::Released),
            _ => Err(DomainError::UnknownPaybackValue(s.to_string())),
        }
    }
}

impl std::fmt::Display for PaybackTransactionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaybackTransaction {
    pub id: PaybackTransactionId,
    pub customer_id: CustomerId,
    pub kind: PaybackTransactionKind,
    /// Always strictly positive; the sign comes from `kind`.
    pub points: i64,
    pub state: PaybackTransactionState,
    #[serde(with = "time::serde::rfc3339")]
    pub locked_until: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl PaybackTransaction {
    /// Points with the sign implied by the kind.
    #[must_use]
    pub const fn signed_points(&self) -> i64 {
        match self.kind {
            PaybackTransactionKind::Credit => self.points,
            PaybackTransactionKind::Refund => -self.points,
        }
    }

    /// Returns true if the entry is still locked but its lock has expired at `now`.
    #[must_use]
    pub fn is_release_due(&self, now: OffsetDateTime) -> bool {
        self.state == PaybackTransactionState::Locked && self.locked_until <= now
    }
}

/// A ledger entry to be appended. Always starts `locked`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaybackTransaction {
    pub customer_id: CustomerId,
    pub kind: PaybackTransactionKind,
    pub points: i64,
    pub locked_until: OffsetDateTime,
}

impl NewPaybackTransaction {
    /// Builds an entry locked for `lock_days` days from `now`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPoints` if `points` is not in
    /// `1..=MAX_TRANSACTION_POINTS`, or
    /// `DomainError::DateArithmeticOverflow` if the lock end is unrepresentable.
    pub fn locked_for(
        customer_id: CustomerId,
        kind: PaybackTransactionKind,
        points: i64,
        now: OffsetDateTime,
        lock_days: i64,
    ) -> Result<Self, DomainError> {
        if !(1..=MAX_TRANSACTION_POINTS).contains(&points) {
            return Err(DomainError::InvalidPoints(points));
        }
        let locked_until: OffsetDateTime =
            now.checked_add(Duration::days(lock_days))
                .ok_or_else(|| DomainError::DateArithmeticOverflow {
                    operation: format!("locking points for {lock_days} days from {now}"),
                })?;
        Ok(Self {
            customer_id,
            kind,
            points,
            locked_until,
        })
    }
}

/// A customer's enrollment and cached balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaybackAccount {
    pub customer_id: CustomerId,
    pub payback_number: PaybackNumber,
    pub points_locked: i64,
    pub points_unlocked: i64,
}

/// Balances derived from a set of ledger entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaybackBalance {
    pub points_locked: i64,
    pub points_unlocked: i64,
}

/// Recomputes the locked and unlocked balances from a customer's entries.
///
/// Credits add to their bucket and refunds subtract from theirs. Buckets may go
/// negative when a released refund outweighs released credits.
///
/// # Errors
///
/// Returns `DomainError::BalanceOverflow` if a bucket leaves the `i64` range.
pub fn compute_balance(transactions: &[PaybackTransaction]) -> Result<PaybackBalance, DomainError> {
    transactions
        .iter()
        .try_fold(PaybackBalance::default(), |mut balance, tx| {
            let bucket: &mut i64 = match tx.state {
                PaybackTransactionState::Locked => &mut balance.points_locked,
                PaybackTransactionState::Released => &mut balance.points_unlocked,
            };
            *bucket = bucket
                .checked_add(tx.signed_points())
                .ok_or(DomainError::BalanceOverflow {
                    customer_id: tx.customer_id.value(),
                })?;
            Ok(balance)
        })
}
