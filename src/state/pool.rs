//! Pool-level state: price, active liquidity, and global fee/reward accumulators.

use crate::config::PoolConfig;
use crate::error::CoreError;
use crate::libraries::big_num::U256;
use crate::libraries::fixed_point;
use crate::libraries::full_math::MulDiv;
use crate::libraries::{liquidity_math, tick_math};

/// Number of simultaneous reward streams a pool may run.
pub const NUM_REWARDS: usize = 3;

/// Trade fee denominator: `fee_rate` and `protocol_fee_rate` are hundredths of
/// a basis point (10^-6) of this value.
pub const FEE_RATE_DENOMINATOR_VALUE: u32 = 1_000_000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RewardInfo {
    /// Q64.64: tokens emitted per second per unit of active liquidity.
    pub emissions_per_second_x64: u128,
    /// Q64.64: all-time growth per unit of active liquidity.
    pub growth_global_x64: u128,
    pub last_updated_timestamp: u64,
    initialized: bool,
}

impl RewardInfo {
    pub fn new(emissions_per_second_x64: u128, now: u64) -> Self {
        RewardInfo {
            emissions_per_second_x64,
            growth_global_x64: 0,
            last_updated_timestamp: now,
            initialized: true,
        }
    }

    pub fn initialized(&self) -> bool {
        self.initialized
    }
}

#[derive(Clone, Debug)]
pub struct Pool {
    pub tick_spacing: u16,
    pub sqrt_price_x64: u128,
    pub tick_current: i32,
    pub liquidity: u128,
    /// Hundredths of a basis point (10^-6) of the traded amount.
    pub fee_rate: u32,
    /// Fraction of `fee_rate` retained by the protocol, same units.
    pub protocol_fee_rate: u32,
    pub fee_growth_global_a_x64: u128,
    pub fee_growth_global_b_x64: u128,
    pub protocol_fee_owed_a: u64,
    pub protocol_fee_owed_b: u64,
    pub reward_infos: [RewardInfo; NUM_REWARDS],
}

impl Pool {
    pub fn new(
        config: &PoolConfig,
        tick_spacing: u16,
        sqrt_price_x64: u128,
        fee_rate: u32,
        protocol_fee_rate: u32,
    ) -> Result<Self, CoreError> {
        config.validate_tick_spacing(tick_spacing)?;
        config.validate_fee_rate(fee_rate, protocol_fee_rate)?;
        if !(tick_math::MIN_SQRT_PRICE_X64..tick_math::MAX_SQRT_PRICE_X64).contains(&sqrt_price_x64) {
            return Err(CoreError::SqrtPriceOutOfRange);
        }
        let tick_current = tick_math::get_tick_at_sqrt_price(sqrt_price_x64)?;
        Ok(Pool {
            tick_spacing,
            sqrt_price_x64,
            tick_current,
            liquidity: 0,
            fee_rate,
            protocol_fee_rate,
            fee_growth_global_a_x64: 0,
            fee_growth_global_b_x64: 0,
            protocol_fee_owed_a: 0,
            protocol_fee_owed_b: 0,
            reward_infos: [RewardInfo::default(); NUM_REWARDS],
        })
    }

    /// Whether `tick_current` falls within a position's active range.
    pub fn in_range(&self, tick_lower: i32, tick_upper: i32) -> bool {
        self.tick_current >= tick_lower && self.tick_current < tick_upper
    }

    /// Advances every initialized reward's global growth accumulator to `now`,
    /// clamping backward clock movement to a no-op. Returns the updated
    /// snapshot, which callers write back once the surrounding operation commits.
    pub fn update_reward_infos(&self, now: u64) -> Result<[RewardInfo; NUM_REWARDS], CoreError> {
        let mut next = self.reward_infos;
        for info in next.iter_mut() {
            if !info.initialized() {
                continue;
            }
            if now < info.last_updated_timestamp {
                #[cfg(feature = "enable-log")]
                log::warn!(
                    "reward clock regression clamped: now={} last_updated={}",
                    now,
                    info.last_updated_timestamp,
                );
                continue;
            }
            if now == info.last_updated_timestamp {
                continue;
            }
            if self.liquidity != 0 {
                let elapsed = now - info.last_updated_timestamp;
                let growth_delta = U256::from(elapsed)
                    .mul_div_floor(U256::from(info.emissions_per_second_x64), U256::from(self.liquidity))?
                    .as_u128();
                info.growth_global_x64 = info
                    .growth_global_x64
                    .checked_add(growth_delta)
                    .ok_or(CoreError::MultiplicationOverflow)?;
                #[cfg(feature = "enable-log")]
                log::debug!(
                    "reward growth updated: elapsed={} growth_delta={} growth_global={}",
                    elapsed,
                    growth_delta,
                    info.growth_global_x64,
                );
            }
            info.last_updated_timestamp = now;
        }
        Ok(next)
    }

    pub fn apply_liquidity_delta(&mut self, delta: i128) -> Result<(), CoreError> {
        self.liquidity = liquidity_math::add_delta(self.liquidity, delta)?;
        Ok(())
    }
}

/// Splits the fee taken on a swap step between the LPs (global growth) and the
/// protocol, in Q64.64-per-unit-liquidity terms for the LP share.
pub fn split_fee_and_accrue(
    fee_amount: u64,
    protocol_fee_rate: u32,
    liquidity: u128,
) -> Result<(u64, u128), CoreError> {
    let protocol_fee = if protocol_fee_rate == 0 {
        0
    } else {
        U256::from(fee_amount)
            .mul_div_floor(
                U256::from(protocol_fee_rate),
                U256::from(FEE_RATE_DENOMINATOR_VALUE),
            )?
            .to_underflow_u64()
    };
    let lp_fee = fee_amount - protocol_fee;
    let growth_delta = if liquidity == 0 || lp_fee == 0 {
        0
    } else {
        U256::from(lp_fee)
            .mul_div_floor(U256::from(fixed_point::Q64), U256::from(liquidity))?
            .as_u128()
    };
    Ok((protocol_fee, growth_delta))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_pool_derives_tick_from_price() {
        let p = Pool::new(&PoolConfig::default(), 64, fixed_point::Q64, 3000, 120_000).unwrap();
        assert_eq!(p.tick_current, 0);
        assert_eq!(p.liquidity, 0);
    }

    #[test]
    fn reward_growth_does_not_advance_without_liquidity() {
        let mut p = Pool::new(&PoolConfig::default(), 64, fixed_point::Q64, 3000, 120_000).unwrap();
        p.reward_infos[0] = RewardInfo::new(1 << 64, 0);
        let next = p.update_reward_infos(100).unwrap();
        assert_eq!(next[0].growth_global_x64, 0);
        assert_eq!(next[0].last_updated_timestamp, 100);
    }

    #[test]
    fn reward_growth_advances_with_liquidity() {
        let mut p = Pool::new(&PoolConfig::default(), 64, fixed_point::Q64, 3000, 120_000).unwrap();
        p.liquidity = fixed_point::Q64;
        p.reward_infos[0] = RewardInfo::new(fixed_point::Q64, 0);
        let next = p.update_reward_infos(10).unwrap();
        assert_eq!(next[0].growth_global_x64, 10);
    }

    #[test]
    fn clock_regression_is_clamped() {
        let mut p = Pool::new(&PoolConfig::default(), 64, fixed_point::Q64, 3000, 120_000).unwrap();
        p.liquidity = fixed_point::Q64;
        p.reward_infos[0] = RewardInfo::new(fixed_point::Q64, 100);
        let next = p.update_reward_infos(50).unwrap();
        assert_eq!(next[0].last_updated_timestamp, 100);
        assert_eq!(next[0].growth_global_x64, 0);
    }

    #[test]
    fn fee_split_routes_protocol_share() {
        let (protocol, growth) = split_fee_and_accrue(1000, 200_000, fixed_point::Q64).unwrap();
        assert_eq!(protocol, 200);
        assert_eq!(growth, 800);
    }
}
