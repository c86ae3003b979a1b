//! Per-position liquidity, fee, and reward bookkeeping.

use crate::error::CoreError;
use crate::libraries::big_num::U256;
use crate::libraries::fixed_point;
use crate::libraries::full_math::MulDiv;
use crate::state::pool::NUM_REWARDS;
use crate::state::tick::{check_tick_boundary, get_fee_growth_inside, get_reward_growths_inside, Tick};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PositionRewardInfo {
    pub growth_inside_last_x64: u128,
    pub amount_owed: u64,
}

#[derive(Clone, Debug)]
pub struct Position {
    pub tick_lower_index: i32,
    pub tick_upper_index: i32,
    pub liquidity: u128,
    pub fee_growth_inside_a_last_x64: u128,
    pub fee_growth_inside_b_last_x64: u128,
    pub fee_owed_a: u64,
    pub fee_owed_b: u64,
    pub reward_infos: [PositionRewardInfo; NUM_REWARDS],
}

impl Position {
    pub fn open(tick_lower_index: i32, tick_upper_index: i32, tick_spacing: u16) -> Result<Self, CoreError> {
        if tick_lower_index >= tick_upper_index {
            return Err(CoreError::InvalidPositionBounds);
        }
        check_tick_boundary(tick_lower_index, tick_spacing)?;
        check_tick_boundary(tick_upper_index, tick_spacing)?;
        Ok(Position {
            tick_lower_index,
            tick_upper_index,
            liquidity: 0,
            fee_growth_inside_a_last_x64: 0,
            fee_growth_inside_b_last_x64: 0,
            fee_owed_a: 0,
            fee_owed_b: 0,
            reward_infos: [PositionRewardInfo::default(); NUM_REWARDS],
        })
    }

    pub fn closable(&self) -> bool {
        self.liquidity == 0
            && self.fee_owed_a == 0
            && self.fee_owed_b == 0
            && self.reward_infos.iter().all(|r| r.amount_owed == 0)
    }

    /// Settles fee and reward growth into `fee_owed_*`/`reward_infos[*].amount_owed`
    /// at the given tick bounds and pool state, then advances the checkpoints.
    pub fn settle_fees_and_rewards(
        &mut self,
        tick_lower: &Tick,
        tick_upper: &Tick,
        tick_current: i32,
        fee_growth_global_a_x64: u128,
        fee_growth_global_b_x64: u128,
        reward_infos: &[crate::state::pool::RewardInfo; NUM_REWARDS],
    ) -> Result<(), CoreError> {
        let (fee_growth_inside_a, fee_growth_inside_b) = get_fee_growth_inside(
            tick_lower,
            tick_upper,
            tick_current,
            fee_growth_global_a_x64,
            fee_growth_global_b_x64,
        );

        let fee_delta_a = fee_growth_inside_a.wrapping_sub(self.fee_growth_inside_a_last_x64);
        let fee_delta_b = fee_growth_inside_b.wrapping_sub(self.fee_growth_inside_b_last_x64);

        let owed_delta_a = U256::from(fee_delta_a)
            .mul_div_floor(U256::from(self.liquidity), U256::from(fixed_point::Q64))?
            .to_underflow_u64();
        let owed_delta_b = U256::from(fee_delta_b)
            .mul_div_floor(U256::from(self.liquidity), U256::from(fixed_point::Q64))?
            .to_underflow_u64();

        self.fee_owed_a = self.fee_owed_a.checked_add(owed_delta_a).ok_or(CoreError::TokenMaxExceeded)?;
        self.fee_owed_b = self.fee_owed_b.checked_add(owed_delta_b).ok_or(CoreError::TokenMaxExceeded)?;
        self.fee_growth_inside_a_last_x64 = fee_growth_inside_a;
        self.fee_growth_inside_b_last_x64 = fee_growth_inside_b;

        let reward_growths_inside =
            get_reward_growths_inside(tick_lower, tick_upper, tick_current, reward_infos);

        for i in 0..NUM_REWARDS {
            let growth_inside = reward_growths_inside[i];
            let delta = growth_inside.wrapping_sub(self.reward_infos[i].growth_inside_last_x64);
            let amount_owed_delta = U256::from(delta)
                .mul_div_floor(U256::from(self.liquidity), U256::from(fixed_point::Q64))?
                .to_underflow_u64();
            self.reward_infos[i].amount_owed = self.reward_infos[i]
                .amount_owed
                .checked_add(amount_owed_delta)
                .ok_or(CoreError::TokenMaxExceeded)?;
            self.reward_infos[i].growth_inside_last_x64 = growth_inside;
        }

        Ok(())
    }

    pub fn collect_fees(&mut self) -> (u64, u64) {
        let (a, b) = (self.fee_owed_a, self.fee_owed_b);
        self.fee_owed_a = 0;
        self.fee_owed_b = 0;
        (a, b)
    }

    pub fn collect_reward(&mut self, reward_index: usize) -> Result<u64, CoreError> {
        let info = self.reward_infos.get_mut(reward_index).ok_or(CoreError::InvalidRewardIndex)?;
        let amount = info.amount_owed;
        info.amount_owed = 0;
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::pool::RewardInfo;

    #[test]
    fn open_rejects_inverted_bounds() {
        assert_eq!(
            Position::open(100, 0, 1).unwrap_err(),
            CoreError::InvalidPositionBounds
        );
    }

    #[test]
    fn open_rejects_unspaced_ticks() {
        assert_eq!(
            Position::open(0, 65, 64).unwrap_err(),
            CoreError::TickNotSpaced
        );
    }

    #[test]
    fn fresh_position_is_closable() {
        let p = Position::open(-64, 64, 64).unwrap();
        assert!(p.closable());
    }

    #[test]
    fn settle_accrues_fee_owed() {
        let mut p = Position::open(-10, 10, 1).unwrap();
        p.liquidity = fixed_point::Q64;
        let lower = Tick { tick: -10, ..Default::default() };
        let upper = Tick { tick: 10, ..Default::default() };
        let rewards = [RewardInfo::default(); NUM_REWARDS];
        p.settle_fees_and_rewards(&lower, &upper, 0, 100, 0, &rewards).unwrap();
        assert_eq!(p.fee_owed_a, 100);
        let (a, _) = p.collect_fees();
        assert_eq!(a, 100);
        assert_eq!(p.fee_owed_a, 0);
    }
}
