use alloy::primitives::U256;
use alloy::primitives::utils::{ParseUnits, format_ether, parse_units};
use rand::Rng;
use std::fmt;

use crate::error::ConfigError;

/// Decimal places of the native currency and of every token this bot sends.
pub const DECIMALS: u8 = 18;

/// Resolution of the uniform fraction used when sampling. 2^64 steps gives
/// better than 18 significant decimal digits.
const FRACTION_BITS: usize = 64;

/// A transfer amount held in the smallest unit (wei, or token base units).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(U256);

impl Amount {
    pub fn from_wei(wei: U256) -> Self {
        Self(wei)
    }

    pub fn wei(self) -> U256 {
        self.0
    }
}

impl fmt::Display for Amount {
    /// Four decimal places, truncated.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = format_ether(self.0);
        match text.split_once('.') {
            Some((int, frac)) => {
                let frac = &frac[..frac.len().min(4)];
                write!(f, "{int}.{frac:0<4}")
            }
            None => write!(f, "{text}.0000"),
        }
    }
}

/// Parses human readable decimal text (`"0.25"`, `"3"`) into base units.
pub fn parse_decimal(field: &'static str, text: &str) -> Result<U256, ConfigError> {
    let err = |reason: String| ConfigError::Decimal {
        field,
        value: text.to_string(),
        reason,
    };

    match parse_units(text.trim(), DECIMALS).map_err(|e| err(e.to_string()))? {
        ParseUnits::U256(value) => Ok(value),
        ParseUnits::I256(_) => Err(err("value must not be negative".to_string())),
    }
}

/// Inclusive range of transfer amounts in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountRange {
    min: U256,
    max: U256,
}

impl AmountRange {
    pub fn new(min: U256, max: U256) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::AmountRange {
                min: Amount(min).to_string(),
                max: Amount(max).to_string(),
            });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> Amount {
        Amount::from_wei(self.min)
    }

    pub fn max(&self) -> Amount {
        Amount::from_wei(self.max)
    }

    /// Draws an amount uniformly from `[min, max]`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Amount {
        let span = self.max - self.min;
        if span.is_zero() {
            return Amount(self.min);
        }
        let fraction = rng.gen_range(0..=(1u128 << FRACTION_BITS));
        let offset = (span * U256::from(fraction)) >> FRACTION_BITS;
        Amount(self.min + offset)
    }
}
