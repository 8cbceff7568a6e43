//! Exact monetary amounts.
//!
//! Amounts are held as a whole number of cents so that sums, both in SQL and
//! in Rust, never pick up floating point error. User input is parsed with
//! [Decimal], which is also used wherever an amount has to be divided.

use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Sub},
    str::FromStr,
};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::Error;

/// An amount of money in cents.
///
/// Values parsed from user input are never negative, but differences such as a
/// monthly balance can be.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Money(i64);

impl Money {
    /// No money at all.
    pub const ZERO: Money = Money(0);

    /// Create an amount from a whole number of cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The amount as a whole number of cents.
    pub fn cents(self) -> i64 {
        self.0
    }

    /// Parse a user-entered amount such as "12", "12.3" or "12,30".
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if `raw` is not a number, is negative,
    /// or has more than two decimal places.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let trimmed = raw.trim();
        let invalid = || Error::InvalidAmount(trimmed.to_owned());

        let value = Decimal::from_str(&trimmed.replace(',', ".")).map_err(|_| invalid())?;

        if value < Decimal::ZERO || value.normalize().scale() > 2 {
            return Err(invalid());
        }

        Self::from_decimal(value).ok_or_else(invalid)
    }

    /// Convert a decimal amount to cents, rounding half away from zero.
    ///
    /// Returns `None` if the amount does not fit in the supported range.
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        value
            .checked_mul(Decimal::ONE_HUNDRED)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .map(Self)
    }

    /// The amount as a decimal number of dollars with two decimal places.
    pub fn as_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Approximate value for display formatting only.
    pub fn as_f64(self) -> f64 {
        self.as_decimal().to_f64().unwrap_or_default()
    }

    /// Multiply the amount by a whole number, e.g. price times quantity.
    pub fn checked_mul(self, factor: i64) -> Option<Self> {
        self.0.checked_mul(factor).map(Self)
    }

    /// Whether the amount is exactly zero.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl FromStr for Money {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_decimal().fmt(f)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |total, amount| total + amount)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl ToSql for Money {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for Money {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Money)
    }
}
