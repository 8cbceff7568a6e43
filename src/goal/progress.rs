//! How far along a goal is.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::money::Money;

/// The saved amount of a goal relative to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalProgress {
    current: Money,
    target: Money,
}

impl GoalProgress {
    /// Compare `current` against `target`.
    pub fn new(current: Money, target: Money) -> Self {
        Self { current, target }
    }

    /// `current / target`, which may be greater than one.
    ///
    /// A zero target gives zero.
    pub fn ratio(&self) -> Decimal {
        if self.target.is_zero() {
            return Decimal::ZERO;
        }

        self.current.as_decimal() / self.target.as_decimal()
    }

    /// The progress as a whole percentage between 0 and 100.
    pub fn display_percent(&self) -> u32 {
        (self.ratio().clamp(Decimal::ZERO, Decimal::ONE) * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
            .unwrap_or(0)
    }

    /// Whether the target has been reached.
    pub fn is_complete(&self) -> bool {
        self.target > Money::ZERO && self.current >= self.target
    }
}
