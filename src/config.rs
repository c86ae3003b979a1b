//! The small set of tunables a deployer is allowed to configure, grounded on
//! the teacher's `AmmConfig` account minus its PDA/authority fields.

use crate::error::CoreError;
use crate::state::pool::FEE_RATE_DENOMINATOR_VALUE;

#[derive(Clone, Debug)]
pub struct PoolConfig {
    pub allowed_tick_spacings: Vec<u16>,
    pub max_fee_rate: u32,
    pub max_protocol_fee_rate: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            allowed_tick_spacings: vec![1, 8, 64, 128],
            max_fee_rate: FEE_RATE_DENOMINATOR_VALUE / 10, // 10%
            max_protocol_fee_rate: FEE_RATE_DENOMINATOR_VALUE / 3,
        }
    }
}

impl PoolConfig {
    pub fn validate_tick_spacing(&self, tick_spacing: u16) -> Result<(), CoreError> {
        if self.allowed_tick_spacings.contains(&tick_spacing) {
            Ok(())
        } else {
            Err(CoreError::TickNotSpaced)
        }
    }

    pub fn validate_fee_rate(&self, fee_rate: u32, protocol_fee_rate: u32) -> Result<(), CoreError> {
        if fee_rate > self.max_fee_rate {
            return Err(CoreError::TokenMaxExceeded);
        }
        if protocol_fee_rate > self.max_protocol_fee_rate {
            return Err(CoreError::TokenMaxExceeded);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allows_common_spacings() {
        let cfg = PoolConfig::default();
        assert!(cfg.validate_tick_spacing(64).is_ok());
        assert_eq!(cfg.validate_tick_spacing(3), Err(CoreError::TickNotSpaced));
    }

    #[test]
    fn rejects_fee_rate_above_max() {
        let cfg = PoolConfig::default();
        assert!(cfg.validate_fee_rate(cfg.max_fee_rate + 1, 0).is_err());
    }
}
