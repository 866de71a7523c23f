use alloy::primitives::U256;

use crate::amount::{DECIMALS, parse_decimal};
use crate::error::ConfigError;

/// Static multiplier applied to the network gas price, kept as an 18-decimal
/// fixed-point value so the product can be floored exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasMultiplier {
    scaled: U256,
}

impl GasMultiplier {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let scaled = parse_decimal("gas", text)?;
        if scaled.is_zero() {
            return Err(ConfigError::GasMultiplier);
        }
        Ok(Self { scaled })
    }

    /// `floor(price * multiplier)`, saturating at `u128::MAX`.
    pub fn apply(&self, price: u128) -> u128 {
        let one = U256::from(10u64.pow(u32::from(DECIMALS)));
        let product = U256::from(price) * self.scaled / one;
        product.saturating_to::<u128>()
    }
}
