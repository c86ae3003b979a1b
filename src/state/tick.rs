//! Per-tick liquidity and growth-outside bookkeeping.

use crate::error::CoreError;
use crate::libraries::{liquidity_math, tick_math};
use crate::state::pool::{RewardInfo, NUM_REWARDS};

/// One slot of a [`super::tick_array::TickArray`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tick {
    pub tick: i32,
    /// Net liquidity added when this tick is crossed upward (left to right).
    pub liquidity_net: i128,
    /// Sum of absolute liquidity contributions; zero iff uninitialized.
    pub liquidity_gross: u128,
    pub fee_growth_outside_a_x64: u128,
    pub fee_growth_outside_b_x64: u128,
    pub reward_growths_outside_x64: [u128; NUM_REWARDS],
}

impl Tick {
    pub fn is_initialized(&self) -> bool {
        self.liquidity_gross != 0
    }

    /// Updates gross/net liquidity for a liquidity change at this tick and
    /// seeds the growth-outside snapshot on first initialization.
    ///
    /// Returns whether the tick flipped between initialized and uninitialized.
    pub fn update(
        &mut self,
        tick_current: i32,
        liquidity_delta: i128,
        fee_growth_global_a_x64: u128,
        fee_growth_global_b_x64: u128,
        upper: bool,
        reward_growths_outside_x64: [u128; NUM_REWARDS],
    ) -> Result<bool, CoreError> {
        let liquidity_gross_before = self.liquidity_gross;
        let liquidity_gross_after = liquidity_math::add_delta(liquidity_gross_before, liquidity_delta)?;

        let flipped = (liquidity_gross_after == 0) != (liquidity_gross_before == 0);

        if liquidity_gross_before == 0 {
            // By convention, all growth before a tick is initialized is assumed to
            // have happened below the tick.
            if self.tick <= tick_current {
                self.fee_growth_outside_a_x64 = fee_growth_global_a_x64;
                self.fee_growth_outside_b_x64 = fee_growth_global_b_x64;
                self.reward_growths_outside_x64 = reward_growths_outside_x64;
            }
        }

        self.liquidity_gross = liquidity_gross_after;

        // When the lower (upper) tick is crossed left to right, liquidity must be
        // added (removed).
        self.liquidity_net = if upper {
            self.liquidity_net
                .checked_sub(liquidity_delta)
                .ok_or(CoreError::LiquidityNetError)?
        } else {
            self.liquidity_net
                .checked_add(liquidity_delta)
                .ok_or(CoreError::LiquidityNetError)?
        };

        Ok(flipped)
    }

    /// Flips the growth-outside accumulators on a crossing; returns the net
    /// liquidity to apply to the pool's active liquidity.
    pub fn cross(
        &mut self,
        fee_growth_global_a_x64: u128,
        fee_growth_global_b_x64: u128,
        reward_infos: &[RewardInfo; NUM_REWARDS],
    ) -> i128 {
        self.fee_growth_outside_a_x64 =
            fee_growth_global_a_x64.wrapping_sub(self.fee_growth_outside_a_x64);
        self.fee_growth_outside_b_x64 =
            fee_growth_global_b_x64.wrapping_sub(self.fee_growth_outside_b_x64);

        for i in 0..NUM_REWARDS {
            if !reward_infos[i].initialized() {
                continue;
            }
            self.reward_growths_outside_x64[i] =
                reward_infos[i].growth_global_x64.wrapping_sub(self.reward_growths_outside_x64[i]);
        }

        self.liquidity_net
    }

    /// Resets everything but the tick index; used once a tick is fully uninitialized.
    pub fn clear(&mut self) {
        self.liquidity_net = 0;
        self.liquidity_gross = 0;
        self.fee_growth_outside_a_x64 = 0;
        self.fee_growth_outside_b_x64 = 0;
        self.reward_growths_outside_x64 = [0; NUM_REWARDS];
    }
}

/// Fee growth accrued inside `[tick_lower, tick_upper)` since the pool began,
/// derived from the global accumulator and each bound's growth-outside snapshot.
pub fn get_fee_growth_inside(
    tick_lower: &Tick,
    tick_upper: &Tick,
    tick_current: i32,
    fee_growth_global_a_x64: u128,
    fee_growth_global_b_x64: u128,
) -> (u128, u128) {
    let (fee_growth_below_a, fee_growth_below_b) = if tick_current >= tick_lower.tick {
        (tick_lower.fee_growth_outside_a_x64, tick_lower.fee_growth_outside_b_x64)
    } else {
        (
            fee_growth_global_a_x64.wrapping_sub(tick_lower.fee_growth_outside_a_x64),
            fee_growth_global_b_x64.wrapping_sub(tick_lower.fee_growth_outside_b_x64),
        )
    };

    let (fee_growth_above_a, fee_growth_above_b) = if tick_current < tick_upper.tick {
        (tick_upper.fee_growth_outside_a_x64, tick_upper.fee_growth_outside_b_x64)
    } else {
        (
            fee_growth_global_a_x64.wrapping_sub(tick_upper.fee_growth_outside_a_x64),
            fee_growth_global_b_x64.wrapping_sub(tick_upper.fee_growth_outside_b_x64),
        )
    };

    let fee_growth_inside_a = fee_growth_global_a_x64
        .wrapping_sub(fee_growth_below_a)
        .wrapping_sub(fee_growth_above_a);
    let fee_growth_inside_b = fee_growth_global_b_x64
        .wrapping_sub(fee_growth_below_b)
        .wrapping_sub(fee_growth_above_b);

    (fee_growth_inside_a, fee_growth_inside_b)
}

/// Reward growth accrued inside `[tick_lower, tick_upper)` per reward index.
/// An uninitialized reward always reports zero growth.
pub fn get_reward_growths_inside(
    tick_lower: &Tick,
    tick_upper: &Tick,
    tick_current_index: i32,
    reward_infos: &[RewardInfo; NUM_REWARDS],
) -> [u128; NUM_REWARDS] {
    let mut inside = [0u128; NUM_REWARDS];

    for i in 0..NUM_REWARDS {
        if !reward_infos[i].initialized() {
            continue;
        }

        let below = if tick_lower.liquidity_gross == 0 {
            reward_infos[i].growth_global_x64
        } else if tick_current_index < tick_lower.tick {
            reward_infos[i].growth_global_x64.wrapping_sub(tick_lower.reward_growths_outside_x64[i])
        } else {
            tick_lower.reward_growths_outside_x64[i]
        };

        let above = if tick_upper.liquidity_gross == 0 {
            0
        } else if tick_current_index < tick_upper.tick {
            tick_upper.reward_growths_outside_x64[i]
        } else {
            reward_infos[i].growth_global_x64.wrapping_sub(tick_upper.reward_growths_outside_x64[i])
        };

        inside[i] = reward_infos[i].growth_global_x64.wrapping_sub(below).wrapping_sub(above);
    }

    inside
}

/// A tick is valid iff it lies within the admissible range and is a multiple
/// of the pool's tick spacing.
pub fn check_tick_boundary(tick: i32, tick_spacing: u16) -> Result<(), CoreError> {
    if tick < tick_math::MIN_TICK {
        return Err(CoreError::InvalidTickIndex);
    }
    if tick > tick_math::MAX_TICK {
        return Err(CoreError::InvalidTickIndex);
    }
    if tick % tick_spacing as i32 != 0 {
        return Err(CoreError::TickNotSpaced);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reward_infos() -> [RewardInfo; NUM_REWARDS] {
        [RewardInfo::default(); NUM_REWARDS]
    }

    #[test]
    fn first_initialization_flips() {
        let mut t = Tick { tick: 0, ..Default::default() };
        let flipped = t.update(0, 100, 0, 0, false, [0; NUM_REWARDS]).unwrap();
        assert!(flipped);
        assert_eq!(t.liquidity_gross, 100);
        assert_eq!(t.liquidity_net, 100);
    }

    #[test]
    fn upper_tick_net_is_negated() {
        let mut t = Tick { tick: 100, ..Default::default() };
        t.update(0, 500, 0, 0, true, [0; NUM_REWARDS]).unwrap();
        assert_eq!(t.liquidity_net, -500);
    }

    #[test]
    fn full_deposit_withdraw_uninitializes() {
        let mut t = Tick { tick: 0, ..Default::default() };
        t.update(0, 100, 0, 0, false, [0; NUM_REWARDS]).unwrap();
        let flipped = t.update(0, -100, 0, 0, false, [0; NUM_REWARDS]).unwrap();
        assert!(flipped);
        assert!(!t.is_initialized());
    }

    #[test]
    fn fee_growth_inside_when_current_within_range() {
        let lower = Tick { tick: -10, fee_growth_outside_a_x64: 5, ..Default::default() };
        let upper = Tick { tick: 10, fee_growth_outside_a_x64: 3, ..Default::default() };
        let (inside_a, _) = get_fee_growth_inside(&lower, &upper, 0, 100, 0);
        assert_eq!(inside_a, 100u128.wrapping_sub(5).wrapping_sub(3));
    }

    #[test]
    fn reward_growths_inside_skips_uninitialized() {
        let lower = Tick::default();
        let upper = Tick::default();
        let infos = reward_infos();
        let inside = get_reward_growths_inside(&lower, &upper, 0, &infos);
        assert_eq!(inside, [0; NUM_REWARDS]);
    }
}
