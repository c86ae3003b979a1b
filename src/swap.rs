//! Multi-tick-array swap driver: loops [`crate::libraries::swap_math::compute_swap_step`]
//! across the supplied tick arrays, crossing ticks and updating pool global state.

use crate::error::CoreError;
use crate::libraries::{swap_math, tick_math};
use crate::state::pool::{split_fee_and_accrue, Pool};
use crate::state::tick_array::TickArray;

#[derive(Clone, Copy, Debug)]
pub struct SwapParams {
    pub amount_specified: u64,
    pub sqrt_price_limit_x64: u128,
    pub a_to_b: bool,
    pub amount_specified_is_input: bool,
}

/// Pool-relative token deltas: positive means the pool receives, negative
/// means the pool pays out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SwapResult {
    pub amount_a: i64,
    pub amount_b: i64,
}

struct SwapState {
    amount_specified_remaining: i64,
    amount_calculated: u64,
    sqrt_price_x64: u128,
    tick_current: i32,
    liquidity: u128,
    fee_growth_global_x64: u128,
    protocol_fee: u64,
}

/// Runs a swap to completion across `tick_arrays`, which must be supplied in
/// traversal order for the swap direction and must be contiguous (each
/// array's `start_tick_index` must equal the previous array's
/// `next_array_start_index`).
pub fn swap(
    pool: &mut Pool,
    tick_arrays: &mut [TickArray],
    params: SwapParams,
    now: u64,
) -> Result<SwapResult, CoreError> {
    if params.amount_specified == 0 {
        return Err(CoreError::ZeroTradableAmount);
    }
    if params.a_to_b {
        if !(tick_math::MIN_SQRT_PRICE_X64..pool.sqrt_price_x64).contains(&params.sqrt_price_limit_x64) {
            return Err(CoreError::SqrtPriceLimitOutOfBounds);
        }
    } else if !(pool.sqrt_price_x64 + 1..tick_math::MAX_SQRT_PRICE_X64).contains(&params.sqrt_price_limit_x64) {
        return Err(CoreError::SqrtPriceLimitOutOfBounds);
    }

    // Held locally and written back only once the whole swap succeeds, so a
    // later failure (bad tick array sequence, overflow) leaves `pool`
    // untouched rather than advancing reward growth on a swap that never happened.
    let updated_rewards = pool.update_reward_infos(now)?;

    let mut state = SwapState {
        amount_specified_remaining: if params.amount_specified_is_input {
            params.amount_specified as i64
        } else {
            -(params.amount_specified as i64)
        },
        amount_calculated: 0,
        sqrt_price_x64: pool.sqrt_price_x64,
        tick_current: pool.tick_current,
        liquidity: pool.liquidity,
        fee_growth_global_x64: if params.a_to_b {
            pool.fee_growth_global_a_x64
        } else {
            pool.fee_growth_global_b_x64
        },
        protocol_fee: 0,
    };

    let mut array_index = 0usize;
    if tick_arrays.is_empty() {
        return Err(CoreError::TickArraySequenceInvalid);
    }

    while state.amount_specified_remaining != 0 && state.sqrt_price_x64 != params.sqrt_price_limit_x64 {
        let sqrt_price_start = state.sqrt_price_x64;

        #[cfg(feature = "enable-log")]
        log::trace!(
            "swap step begin: a_to_b={}, sqrt_price={}, tick={}, liquidity={}, remaining={}",
            params.a_to_b,
            state.sqrt_price_x64,
            state.tick_current,
            state.liquidity,
            state.amount_specified_remaining,
        );

        // Advance to the array that houses the current tick, following the
        // caller-supplied contiguous ordering.
        while TickArray::start_index_containing(state.tick_current, pool.tick_spacing)
            != tick_arrays[array_index].start_tick_index
        {
            let expected_next = tick_arrays[array_index].next_array_start_index(pool.tick_spacing, params.a_to_b);
            array_index += 1;
            if array_index >= tick_arrays.len() || tick_arrays[array_index].start_tick_index != expected_next {
                return Err(CoreError::TickArraySequenceInvalid);
            }
        }

        let mut next_tick = tick_arrays[array_index]
            .next_initialized_tick(state.tick_current, pool.tick_spacing, params.a_to_b)?
            .copied();

        // Sitting exactly on this array's floor with nothing initialized below it
        // tells us nothing about the neighboring array; hop into it and let its
        // own (mismatched-tick) fallback scan cover it in full.
        while next_tick.is_none()
            && params.a_to_b
            && state.tick_current == tick_arrays[array_index].start_tick_index
        {
            let expected_next = tick_arrays[array_index].next_array_start_index(pool.tick_spacing, true);
            array_index += 1;
            if array_index >= tick_arrays.len() || tick_arrays[array_index].start_tick_index != expected_next {
                return Err(CoreError::TickArraySequenceInvalid);
            }
            next_tick = tick_arrays[array_index]
                .next_initialized_tick(state.tick_current, pool.tick_spacing, params.a_to_b)?
                .copied();
        }

        let (mut tick_next, initialized) = match next_tick {
            Some(t) => (t.tick, true),
            None => {
                // Nothing left initialized in this array; stop at its edge and
                // let the next loop iteration hand off to the neighboring array.
                let boundary = if params.a_to_b {
                    tick_arrays[array_index].start_tick_index
                } else {
                    tick_arrays[array_index].next_array_start_index(pool.tick_spacing, false)
                };
                (boundary, false)
            }
        };

        if tick_next < tick_math::MIN_TICK {
            tick_next = tick_math::MIN_TICK;
        } else if tick_next > tick_math::MAX_TICK {
            tick_next = tick_math::MAX_TICK;
        }
        let sqrt_price_next = tick_math::get_sqrt_price_at_tick(tick_next)?;

        let target_price = if (params.a_to_b && sqrt_price_next < params.sqrt_price_limit_x64)
            || (!params.a_to_b && sqrt_price_next > params.sqrt_price_limit_x64)
        {
            params.sqrt_price_limit_x64
        } else {
            sqrt_price_next
        };

        let step = swap_math::compute_swap_step(
            sqrt_price_start,
            target_price,
            state.liquidity,
            state.amount_specified_remaining,
            pool.fee_rate,
        )?;

        state.sqrt_price_x64 = step.sqrt_price_next_x64;

        if params.amount_specified_is_input {
            state.amount_specified_remaining -= (step.amount_in + step.fee_amount) as i64;
            state.amount_calculated = state
                .amount_calculated
                .checked_add(step.amount_out)
                .ok_or(CoreError::TokenMaxExceeded)?;
        } else {
            state.amount_specified_remaining += step.amount_out as i64;
            state.amount_calculated = state
                .amount_calculated
                .checked_add(step.amount_in + step.fee_amount)
                .ok_or(CoreError::TokenMaxExceeded)?;
        }

        if state.liquidity > 0 {
            let (protocol_fee, growth_delta) =
                split_fee_and_accrue(step.fee_amount, pool.protocol_fee_rate, state.liquidity)?;
            state.protocol_fee = state
                .protocol_fee
                .checked_add(protocol_fee)
                .ok_or(CoreError::TokenMaxExceeded)?;
            state.fee_growth_global_x64 = state.fee_growth_global_x64.wrapping_add(growth_delta);
        }

        if state.sqrt_price_x64 == sqrt_price_next {
            if initialized {
                let tick_array = &mut tick_arrays[array_index];
                let tick = tick_array.get_tick_mut(tick_next, pool.tick_spacing)?;

                // `liquidity_net` is unaffected by `cross` (only the growth-outside
                // snapshots are), so the fallible liquidity update can be validated
                // before the tick is mutated at all.
                let mut liquidity_net = tick.liquidity_net;
                if params.a_to_b {
                    liquidity_net = -liquidity_net;
                }
                state.liquidity = crate::libraries::liquidity_math::add_delta(state.liquidity, liquidity_net)?;

                let (fee_a, fee_b) = if params.a_to_b {
                    (state.fee_growth_global_x64, pool.fee_growth_global_b_x64)
                } else {
                    (pool.fee_growth_global_a_x64, state.fee_growth_global_x64)
                };
                tick.cross(fee_a, fee_b, &updated_rewards);
                #[cfg(feature = "enable-log")]
                log::debug!(
                    "crossed tick {}: liquidity_net={}, new_liquidity={}",
                    tick_next,
                    liquidity_net,
                    state.liquidity,
                );
            }
            state.tick_current = if params.a_to_b { tick_next - 1 } else { tick_next };
        } else if state.sqrt_price_x64 != sqrt_price_start {
            state.tick_current = tick_math::get_tick_at_sqrt_price(state.sqrt_price_x64)?;
        }
    }

    if state.amount_calculated == 0 && pool.sqrt_price_x64 == state.sqrt_price_x64 {
        return Err(CoreError::ZeroTradableAmount);
    }

    let (amount_in_total, amount_out_total) = if params.amount_specified_is_input {
        (
            (params.amount_specified as i64 - state.amount_specified_remaining) as u64,
            state.amount_calculated,
        )
    } else {
        (state.amount_calculated, params.amount_specified - (-state.amount_specified_remaining) as u64)
    };

    pool.sqrt_price_x64 = state.sqrt_price_x64;
    pool.tick_current = state.tick_current;
    pool.liquidity = state.liquidity;
    pool.reward_infos = updated_rewards;
    if params.a_to_b {
        pool.fee_growth_global_a_x64 = state.fee_growth_global_x64;
        pool.protocol_fee_owed_a = pool
            .protocol_fee_owed_a
            .checked_add(state.protocol_fee)
            .ok_or(CoreError::TokenMaxExceeded)?;
    } else {
        pool.fee_growth_global_b_x64 = state.fee_growth_global_x64;
        pool.protocol_fee_owed_b = pool
            .protocol_fee_owed_b
            .checked_add(state.protocol_fee)
            .ok_or(CoreError::TokenMaxExceeded)?;
    }

    Ok(if params.a_to_b {
        SwapResult { amount_a: amount_in_total as i64, amount_b: -(amount_out_total as i64) }
    } else {
        SwapResult { amount_a: -(amount_out_total as i64), amount_b: amount_in_total as i64 }
    })
}

/// Checks the caller's slippage bound against the realized swap result.
pub fn check_slippage(
    result: SwapResult,
    other_amount_threshold: u64,
    amount_specified_is_input: bool,
    a_to_b: bool,
) -> Result<(), CoreError> {
    if amount_specified_is_input {
        let out = if a_to_b { -result.amount_b } else { -result.amount_a } as u64;
        if out < other_amount_threshold {
            return Err(CoreError::TokenMinSubceeded);
        }
    } else {
        let input = if a_to_b { result.amount_a } else { result.amount_b } as u64;
        if input > other_amount_threshold {
            return Err(CoreError::TokenMaxExceeded);
        }
    }
    Ok(())
}
