// Computes the result of a swap within a single tick range, i.e. a single segment.

use super::full_math::MulDiv;
use super::sqrt_price_math;
use crate::error::CoreError;
use crate::state::pool::FEE_RATE_DENOMINATOR_VALUE;

/// Result of advancing a swap across one segment.
#[derive(Default, Debug, Clone, Copy)]
pub struct SwapStep {
    /// The price after swapping the amount in/out, not to exceed the price target.
    pub sqrt_price_next_x64: u128,
    /// The amount swapped in, of either token A or token B, depending on swap direction.
    pub amount_in: u64,
    /// The amount received, of either token A or token B, depending on swap direction.
    pub amount_out: u64,
    /// The portion of the input taken as a fee.
    pub fee_amount: u64,
}

/// Computes the result of swapping some amount in, or amount out, within a
/// single segment bounded by `sqrt_ratio_target_x64`.
///
/// The fee, plus amount in, never exceeds `amount_remaining` when
/// `amount_remaining` is an exact-input amount.
pub fn compute_swap_step(
    sqrt_ratio_current_x64: u128,
    sqrt_ratio_target_x64: u128,
    liquidity: u128,
    amount_remaining: i64,
    fee_rate: u32,
) -> Result<SwapStep, CoreError> {
    let a_to_b = sqrt_ratio_current_x64 >= sqrt_ratio_target_x64;
    let exact_in = amount_remaining >= 0;
    let mut step = SwapStep::default();

    if exact_in {
        let amount_remaining_less_fee = (amount_remaining as u64).mul_div_floor(
            (FEE_RATE_DENOMINATOR_VALUE - fee_rate).into(),
            FEE_RATE_DENOMINATOR_VALUE as u64,
        )?;
        step.amount_in = if a_to_b {
            sqrt_price_math::get_amount_a_delta_unsigned(
                sqrt_ratio_target_x64,
                sqrt_ratio_current_x64,
                liquidity,
                true,
            )?
        } else {
            sqrt_price_math::get_amount_b_delta_unsigned(
                sqrt_ratio_current_x64,
                sqrt_ratio_target_x64,
                liquidity,
                true,
            )?
        };
        step.sqrt_price_next_x64 = if amount_remaining_less_fee >= step.amount_in {
            sqrt_ratio_target_x64
        } else {
            sqrt_price_math::get_next_sqrt_price_from_input(
                sqrt_ratio_current_x64,
                liquidity,
                amount_remaining_less_fee,
                a_to_b,
            )?
        };
    } else {
        step.amount_out = if a_to_b {
            sqrt_price_math::get_amount_b_delta_unsigned(
                sqrt_ratio_target_x64,
                sqrt_ratio_current_x64,
                liquidity,
                false,
            )?
        } else {
            sqrt_price_math::get_amount_a_delta_unsigned(
                sqrt_ratio_current_x64,
                sqrt_ratio_target_x64,
                liquidity,
                false,
            )?
        };
        step.sqrt_price_next_x64 = if (-amount_remaining as u64) >= step.amount_out {
            sqrt_ratio_target_x64
        } else {
            sqrt_price_math::get_next_sqrt_price_from_output(
                sqrt_ratio_current_x64,
                liquidity,
                -amount_remaining as u64,
                a_to_b,
            )?
        }
    }

    let reached_target = sqrt_ratio_target_x64 == step.sqrt_price_next_x64;

    if a_to_b {
        if !(reached_target && exact_in) {
            step.amount_in = sqrt_price_math::get_amount_a_delta_unsigned(
                step.sqrt_price_next_x64,
                sqrt_ratio_current_x64,
                liquidity,
                true,
            )?;
        }
        if !(reached_target && !exact_in) {
            step.amount_out = sqrt_price_math::get_amount_b_delta_unsigned(
                step.sqrt_price_next_x64,
                sqrt_ratio_current_x64,
                liquidity,
                false,
            )?;
        }
    } else {
        if !(reached_target && exact_in) {
            step.amount_in = sqrt_price_math::get_amount_b_delta_unsigned(
                sqrt_ratio_current_x64,
                step.sqrt_price_next_x64,
                liquidity,
                true,
            )?;
        }
        if !(reached_target && !exact_in) {
            step.amount_out = sqrt_price_math::get_amount_a_delta_unsigned(
                sqrt_ratio_current_x64,
                step.sqrt_price_next_x64,
                liquidity,
                false,
            )?;
        }
    }

    // exact-output: never hand back more than what was asked for.
    if !exact_in && step.amount_out > (-amount_remaining as u64) {
        step.amount_out = -amount_remaining as u64;
    }

    step.fee_amount = if exact_in && step.sqrt_price_next_x64 != sqrt_ratio_target_x64 {
        // Target wasn't reached: whatever's left of amount_remaining is fee (swap dust).
        (amount_remaining as u64)
            .checked_sub(step.amount_in)
            .ok_or(CoreError::MultiplicationOverflow)?
    } else {
        step.amount_in
            .mul_div_ceil(fee_rate.into(), (FEE_RATE_DENOMINATOR_VALUE - fee_rate).into())?
    };

    Ok(step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libraries::tick_math::get_sqrt_price_at_tick;

    #[test]
    fn exact_input_a_to_b_never_exceeds_remaining() {
        let current = get_sqrt_price_at_tick(0).unwrap();
        let target = get_sqrt_price_at_tick(-1000).unwrap();
        let step = compute_swap_step(current, target, 1_000_000_000, 10_000, 3000).unwrap();
        assert!(step.amount_in + step.fee_amount <= 10_000);
    }

    #[test]
    fn exact_output_caps_amount_out() {
        let current = get_sqrt_price_at_tick(0).unwrap();
        let target = get_sqrt_price_at_tick(1000).unwrap();
        let step = compute_swap_step(current, target, 1_000_000_000, -500, 3000).unwrap();
        assert!(step.amount_out <= 500);
    }

    #[test]
    fn reaching_target_sets_next_price_to_target() {
        let current = get_sqrt_price_at_tick(0).unwrap();
        let target = get_sqrt_price_at_tick(-10).unwrap();
        // plenty of input to blow straight through this narrow segment
        let step = compute_swap_step(current, target, 1_000_000_000_000, 1_000_000_000, 3000).unwrap();
        assert_eq!(step.sqrt_price_next_x64, target);
    }
}
