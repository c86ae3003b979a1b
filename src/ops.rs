//! The public surface: free functions over `&mut Pool`/`&mut Tick`/`&mut Position`.
//! No trait objects, no dynamic dispatch — callers own account validity and
//! token movement; these functions only compute and apply state transitions.

use crate::error::CoreError;
use crate::libraries::{liquidity_amounts, liquidity_math, tick_math};
use crate::state::pool::{Pool, NUM_REWARDS};
use crate::state::position::Position;
use crate::state::tick::Tick;

/// Opens a position over `[tick_lower_index, tick_upper_index)`, with zero
/// liquidity and zero owed amounts. Deposit with [`modify_liquidity`].
pub fn open_position(pool: &Pool, tick_lower_index: i32, tick_upper_index: i32) -> Result<Position, CoreError> {
    Position::open(tick_lower_index, tick_upper_index, pool.tick_spacing)
}

/// Closes an empty position. Fails if liquidity or any owed amount remains.
pub fn close_position(position: &Position) -> Result<(), CoreError> {
    if position.closable() {
        Ok(())
    } else {
        Err(CoreError::ClosePositionNotEmpty)
    }
}

/// Deposits (`liquidity_delta > 0`) or withdraws (`liquidity_delta < 0`)
/// liquidity from a position, settling accrued fees/rewards against the old
/// liquidity basis first. Returns the token A/B amounts moved.
///
/// Deposits are rejected if either amount would exceed `token_max_{a,b}`;
/// withdrawals are rejected if either amount would fall below
/// `token_min_{a,b}`. On rejection, no state is touched.
#[allow(clippy::too_many_arguments)]
pub fn modify_liquidity(
    pool: &mut Pool,
    position: &mut Position,
    tick_lower: &mut Tick,
    tick_upper: &mut Tick,
    liquidity_delta: i128,
    token_max_a: u64,
    token_max_b: u64,
    token_min_a: u64,
    token_min_b: u64,
    now: u64,
) -> Result<(u64, u64), CoreError> {
    if liquidity_delta == 0 {
        return Err(CoreError::LiquidityZero);
    }
    if tick_lower.tick != position.tick_lower_index || tick_upper.tick != position.tick_upper_index {
        return Err(CoreError::TickNotFound);
    }

    let sqrt_lower = tick_math::get_sqrt_price_at_tick(position.tick_lower_index)?;
    let sqrt_upper = tick_math::get_sqrt_price_at_tick(position.tick_upper_index)?;
    let is_deposit = liquidity_delta > 0;
    let (amount_a, amount_b) = liquidity_amounts::get_amounts_for_liquidity(
        pool.sqrt_price_x64,
        sqrt_lower,
        sqrt_upper,
        liquidity_delta.unsigned_abs(),
        is_deposit,
    )?;

    if is_deposit {
        if amount_a > token_max_a || amount_b > token_max_b {
            return Err(CoreError::TokenMaxExceeded);
        }
    } else if amount_a < token_min_a || amount_b < token_min_b {
        return Err(CoreError::TokenMinSubceeded);
    }

    // Everything from here on is fallible; stage it on scratch copies and only
    // write into the caller's state once every step below has succeeded.
    let updated_rewards = pool.update_reward_infos(now)?;
    let mut reward_growths = [0u128; NUM_REWARDS];
    for (i, info) in updated_rewards.iter().enumerate() {
        reward_growths[i] = info.growth_global_x64;
    }

    let mut next_tick_lower = *tick_lower;
    let mut next_tick_upper = *tick_upper;
    next_tick_lower.update(
        pool.tick_current,
        liquidity_delta,
        pool.fee_growth_global_a_x64,
        pool.fee_growth_global_b_x64,
        false,
        reward_growths,
    )?;
    next_tick_upper.update(
        pool.tick_current,
        liquidity_delta,
        pool.fee_growth_global_a_x64,
        pool.fee_growth_global_b_x64,
        true,
        reward_growths,
    )?;

    let mut next_position = position.clone();
    next_position.settle_fees_and_rewards(
        &next_tick_lower,
        &next_tick_upper,
        pool.tick_current,
        pool.fee_growth_global_a_x64,
        pool.fee_growth_global_b_x64,
        &updated_rewards,
    )?;
    next_position.liquidity = liquidity_math::add_delta(next_position.liquidity, liquidity_delta)?;

    let mut next_pool_liquidity = pool.liquidity;
    if pool.in_range(position.tick_lower_index, position.tick_upper_index) {
        next_pool_liquidity = liquidity_math::add_delta(next_pool_liquidity, liquidity_delta)?;
    }

    *tick_lower = next_tick_lower;
    *tick_upper = next_tick_upper;
    *position = next_position;
    pool.reward_infos = updated_rewards;
    pool.liquidity = next_pool_liquidity;

    Ok((amount_a, amount_b))
}

/// Advances reward accumulators to `now` and settles accrued fees/rewards
/// into the position's owed balances. Idempotent: calling it twice in a row
/// with the same `now` accrues nothing the second time.
pub fn update_fees_and_rewards(
    pool: &mut Pool,
    position: &mut Position,
    tick_lower: &Tick,
    tick_upper: &Tick,
    now: u64,
) -> Result<(), CoreError> {
    let updated_rewards = pool.update_reward_infos(now)?;
    position.settle_fees_and_rewards(
        tick_lower,
        tick_upper,
        pool.tick_current,
        pool.fee_growth_global_a_x64,
        pool.fee_growth_global_b_x64,
        &updated_rewards,
    )?;
    pool.reward_infos = updated_rewards;
    Ok(())
}

/// Collects and zeroes a position's owed fees.
pub fn collect_fees(position: &mut Position) -> (u64, u64) {
    position.collect_fees()
}

/// Collects and zeroes a position's owed amount for one reward stream.
pub fn collect_reward(pool: &Pool, position: &mut Position, reward_index: usize) -> Result<u64, CoreError> {
    let info = pool.reward_infos.get(reward_index).ok_or(CoreError::InvalidRewardIndex)?;
    if !info.initialized() {
        return Err(CoreError::RewardNotInitialized);
    }
    position.collect_reward(reward_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use crate::libraries::fixed_point;
    use crate::state::pool::RewardInfo;

    fn fresh_pool() -> Pool {
        Pool::new(&PoolConfig::default(), 64, fixed_point::Q64, 3000, 0).unwrap()
    }

    #[test]
    fn deposit_then_full_withdraw_round_trips_liquidity() {
        let mut pool = fresh_pool();
        let mut position = open_position(&pool, -1280, 1280).unwrap();
        let mut tick_lower = Tick { tick: -1280, ..Default::default() };
        let mut tick_upper = Tick { tick: 1280, ..Default::default() };

        let l = liquidity_amounts::get_liquidity_for_amounts(
            pool.sqrt_price_x64,
            tick_math::get_sqrt_price_at_tick(-1280).unwrap(),
            tick_math::get_sqrt_price_at_tick(1280).unwrap(),
            167_000,
            167_000,
        )
        .unwrap();

        let (a_in, b_in) = modify_liquidity(
            &mut pool,
            &mut position,
            &mut tick_lower,
            &mut tick_upper,
            l as i128,
            u64::MAX,
            u64::MAX,
            0,
            0,
            0,
        )
        .unwrap();
        assert_eq!(pool.liquidity, l);
        assert!(a_in <= 167_000 && b_in <= 167_000);

        let (a_out, b_out) = modify_liquidity(
            &mut pool,
            &mut position,
            &mut tick_lower,
            &mut tick_upper,
            -(l as i128),
            0,
            0,
            0,
            0,
            0,
        )
        .unwrap();
        assert_eq!(pool.liquidity, 0);
        assert!(a_out <= a_in && b_out <= b_in);
        assert!(a_in - a_out <= 1 && b_in - b_out <= 1);
    }

    #[test]
    fn deposit_rejects_when_token_max_too_low() {
        let mut pool = fresh_pool();
        let mut position = open_position(&pool, -1280, 1280).unwrap();
        let mut tick_lower = Tick { tick: -1280, ..Default::default() };
        let mut tick_upper = Tick { tick: 1280, ..Default::default() };

        let before = pool.liquidity;
        let result = modify_liquidity(
            &mut pool,
            &mut position,
            &mut tick_lower,
            &mut tick_upper,
            1_000_000,
            1,
            1,
            0,
            0,
            0,
        );
        assert_eq!(result, Err(CoreError::TokenMaxExceeded));
        assert_eq!(pool.liquidity, before);
        assert_eq!(position.liquidity, 0);
    }

    #[test]
    fn close_rejects_nonempty_position() {
        let pool = fresh_pool();
        let mut position = open_position(&pool, -1280, 1280).unwrap();
        position.liquidity = 1;
        assert_eq!(close_position(&position), Err(CoreError::ClosePositionNotEmpty));
        position.liquidity = 0;
        assert!(close_position(&position).is_ok());
    }

    #[test]
    fn collect_reward_rejects_uninitialized_stream() {
        let pool = fresh_pool();
        let mut position = open_position(&pool, -1280, 1280).unwrap();
        assert_eq!(collect_reward(&pool, &mut position, 0), Err(CoreError::RewardNotInitialized));
    }

    #[test]
    fn collect_reward_rejects_out_of_range_index() {
        let mut pool = fresh_pool();
        pool.reward_infos[0] = RewardInfo::new(1, 0);
        let mut position = open_position(&pool, -1280, 1280).unwrap();
        assert_eq!(collect_reward(&pool, &mut position, NUM_REWARDS), Err(CoreError::InvalidRewardIndex));
    }
}
