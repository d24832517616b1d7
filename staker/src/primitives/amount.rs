use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::staker_error::StakerError;

/// Number of nano-units in one coin.
pub const NANO_PER_COIN: i64 = 1_000_000_000;

/// Fixed-point money: an integer count of nano-units.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_nano(nano: i64) -> Self {
        Amount(nano)
    }

    pub const fn from_whole_coins(coins: i64) -> Self {
        Amount(coins * NANO_PER_COIN)
    }

    /// Converts a decimal coin value (as written in configuration) into an
    /// exact amount, rounding to the nearest nano-unit.
    pub fn from_coins(coins: f64) -> Result<Self, StakerError> {
        if !coins.is_finite() {
            return Err(StakerError::InvalidAmount(coins.to_string()));
        }
        let nano = (coins * NANO_PER_COIN as f64).round();
        if nano > i64::MAX as f64 || nano < i64::MIN as f64 {
            return Err(StakerError::InvalidAmount(coins.to_string()));
        }
        Ok(Amount(nano as i64))
    }

    pub const fn nano(self) -> i64 {
        self.0
    }

    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / NANO_PER_COIN as u64;
        let frac = abs % NANO_PER_COIN as u64;
        if frac == 0 {
            return write!(f, "{}{} PAC", sign, whole);
        }
        let frac = format!("{:09}", frac);
        write!(f, "{}{}.{} PAC", sign, whole, frac.trim_end_matches('0'))
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Amount) {
        self.0 -= rhs.0;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, |acc, a| acc + a)
    }
}
