//! Conversion between node amounts and gateway minor units.
//!
//! The node speaks in decimal coins, the gateway in integer minor units.
//! Both directions round half to even.

use num_traits::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::core::config::GatewayConfig;
use crate::error::{Error, Result};
use crate::utils::constants::{DEFAULT_COIN_FACTOR, DEFAULT_ROUND_PRECISION, MAX_ROUND_PRECISION};

/// Scales decimal coin amounts to integer minor units and back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerConverter {
    factor: u64,
    round_precision: u32,
}

impl Default for IntegerConverter {
    fn default() -> Self {
        Self {
            factor: DEFAULT_COIN_FACTOR,
            round_precision: DEFAULT_ROUND_PRECISION,
        }
    }
}

impl IntegerConverter {
    /// Create a converter with `factor` minor units per coin
    pub fn new(factor: u64, round_precision: u32) -> Result<Self> {
        if factor == 0 {
            return Err(Error::InvalidParameter {
                name: "factor".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if round_precision > MAX_ROUND_PRECISION {
            return Err(Error::InvalidParameter {
                name: "round_precision".into(),
                reason: format!("must not exceed {}", MAX_ROUND_PRECISION),
            });
        }

        Ok(Self {
            factor,
            round_precision,
        })
    }

    /// Create a converter from gateway configuration
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        Self::new(config.factor, config.round_precision)
    }

    /// Minor units per coin
    pub fn factor(&self) -> u64 {
        self.factor
    }

    /// Decimal places kept by [`Self::to_decimal`]
    pub fn round_precision(&self) -> u32 {
        self.round_precision
    }

    /// Convert a coin amount to minor units
    pub fn to_integer(&self, amount: Decimal) -> Result<i64> {
        let scaled = amount
            .checked_mul(Decimal::from(self.factor))
            .ok_or_else(|| Error::Overflow {
                operation: "to_integer".into(),
            })?;

        scaled
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
            .to_i64()
            .ok_or_else(|| Error::Overflow {
                operation: "to_integer".into(),
            })
    }

    /// Convert minor units to a coin amount.
    ///
    /// `to_decimal(to_integer(x))` equals `x` rounded to `round_precision`
    /// places only when `factor` is `10^round_precision`. With a coarser
    /// precision the amount is rounded twice, once to minor units and once
    /// to display places, and half-even ties can land differently.
    pub fn to_decimal(&self, amount: i64) -> Decimal {
        (Decimal::from(amount) / Decimal::from(self.factor))
            .round_dp_with_strategy(self.round_precision, RoundingStrategy::MidpointNearestEven)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
