//! Integer amount and commission-rate arithmetic
//!
//! All asset quantities are whole integer units (`u128`) and every
//! operation that could wrap uses checked arithmetic. Commission rates are
//! basis points (1/10000) with a hard ceiling, and commission amounts round
//! down so the pool can never overdraw the quote leg.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Basis-point denominator: 10_000 bps = 100%
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Hard ceiling on the commission rate: 1_000 bps = 10%
pub const MAX_COMMISSION_BPS: u16 = 1_000;

/// An integer quantity of a fungible asset
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Amount(u128);

impl Amount {
    /// The zero amount
    pub const ZERO: Amount = Amount(0);

    /// Create an amount from raw units
    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Get the raw unit count
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Check whether the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition; None on overflow
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction; None on underflow
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }
}

impl From<u128> for Amount {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A commission rate in basis points, capped at [`MAX_COMMISSION_BPS`]
///
/// The rate is captured at fill time; changing it never affects orders
/// already filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct CommissionRate(u16);

impl CommissionRate {
    /// The zero rate (no commission)
    pub const ZERO: CommissionRate = CommissionRate(0);

    /// Try to create a rate; None if above the ceiling
    pub fn try_new(bps: u16) -> Option<Self> {
        if bps > MAX_COMMISSION_BPS {
            None
        } else {
            Some(Self(bps))
        }
    }

    /// Get the rate in basis points
    pub fn bps(&self) -> u16 {
        self.0
    }

    /// Commission skimmed from `quote`: `floor(quote * bps / 10000)`
    ///
    /// Returns None only if the intermediate product overflows `u128`.
    /// Because the rate is capped below 10_000 bps, the commission is
    /// always strictly less than `quote` for any non-zero `quote`.
    pub fn commission_on(&self, quote: Amount) -> Option<Amount> {
        quote
            .value()
            .checked_mul(self.0 as u128)
            .map(|product| Amount::new(product / BPS_DENOMINATOR))
    }
}

impl fmt::Display for CommissionRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bps", self.0)
    }
}
