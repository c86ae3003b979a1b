//! Closed-form token deltas between two sqrt prices, and the inverse: the
//! next sqrt price given an input or output amount of one of the two tokens.

use super::big_num::U128;
use super::fixed_point;
use super::full_math::MulDiv;
use super::tick_math;
use super::unsafe_math::UnsafeMathTrait;
use crate::error::CoreError;

/// Gets the next sqrt price given a delta of token A (the price-numerator side).
///
/// Always rounds up: in the exact-output case this keeps the pool from
/// under-delivering; in the exact-input case it never under-charges the pool.
///
/// `√P' = √P * L / (L + Δx * √P)`, or `√P' = L / (L/√P + Δx)` if the direct
/// form would overflow.
pub fn get_next_sqrt_price_from_amount_a_rounding_up(
    sqrt_p_x64: u128,
    liquidity: u128,
    amount: u64,
    add: bool,
) -> Result<u128, CoreError> {
    if amount == 0 {
        return Ok(sqrt_p_x64);
    }
    let numerator_1 = U128::from(liquidity) << fixed_point::RESOLUTION;

    if add {
        if let Some(product) = U128::from(amount).checked_mul(U128::from(sqrt_p_x64)) {
            let denominator = numerator_1 + product;
            if denominator >= numerator_1 {
                return Ok(numerator_1
                    .mul_div_ceil(U128::from(sqrt_p_x64), denominator)?
                    .as_u128());
            }
        }
        let denom = (numerator_1 / U128::from(sqrt_p_x64))
            .checked_add(U128::from(amount))
            .ok_or(CoreError::MultiplicationOverflow)?;
        Ok(U128::div_rounding_up(numerator_1, denom).as_u128())
    } else {
        let product = U128::from(amount)
            .checked_mul(U128::from(sqrt_p_x64))
            .ok_or(CoreError::MultiplicationOverflow)?;
        if numerator_1 <= product {
            return Err(CoreError::SqrtPriceOutOfRange);
        }
        let denominator = numerator_1 - product;
        Ok(numerator_1
            .mul_div_ceil(U128::from(sqrt_p_x64), denominator)?
            .as_u128())
    }
}

/// Gets the next sqrt price given a delta of token B (the price-denominator side).
///
/// Always rounds down, mirroring the pool-favorable policy for token A.
///
/// `√P' = √P + Δy / L`
pub fn get_next_sqrt_price_from_amount_b_rounding_down(
    sqrt_p_x64: u128,
    liquidity: u128,
    amount: u64,
    add: bool,
) -> Result<u128, CoreError> {
    if add {
        let quotient = U128::from((amount as u128) << fixed_point::RESOLUTION) / U128::from(liquidity);
        sqrt_p_x64
            .checked_add(quotient.as_u128())
            .ok_or(CoreError::MultiplicationOverflow)
    } else {
        let quotient = U128::div_rounding_up(
            U128::from((amount as u128) << fixed_point::RESOLUTION),
            U128::from(liquidity),
        );
        if sqrt_p_x64 <= quotient.as_u128() {
            return Err(CoreError::SqrtPriceOutOfRange);
        }
        Ok(sqrt_p_x64 - quotient.as_u128())
    }
}

/// Gets the next sqrt price given an input amount of token A or B.
pub fn get_next_sqrt_price_from_input(
    sqrt_p_x64: u128,
    liquidity: u128,
    amount_in: u64,
    a_to_b: bool,
) -> Result<u128, CoreError> {
    if sqrt_p_x64 == 0 || liquidity == 0 {
        return Err(CoreError::DivideByZero);
    }
    if a_to_b {
        get_next_sqrt_price_from_amount_a_rounding_up(sqrt_p_x64, liquidity, amount_in, true)
    } else {
        get_next_sqrt_price_from_amount_b_rounding_down(sqrt_p_x64, liquidity, amount_in, true)
    }
}

/// Gets the next sqrt price given an output amount of token A or B.
pub fn get_next_sqrt_price_from_output(
    sqrt_p_x64: u128,
    liquidity: u128,
    amount_out: u64,
    a_to_b: bool,
) -> Result<u128, CoreError> {
    if sqrt_p_x64 == 0 || liquidity == 0 {
        return Err(CoreError::DivideByZero);
    }
    if a_to_b {
        get_next_sqrt_price_from_amount_b_rounding_down(sqrt_p_x64, liquidity, amount_out, false)
    } else {
        get_next_sqrt_price_from_amount_a_rounding_up(sqrt_p_x64, liquidity, amount_out, false)
    }
}

/// `Δx = L * (1/√P_lower - 1/√P_upper) = L * (√P_upper - √P_lower) / (√P_upper * √P_lower)`
pub fn get_amount_a_delta_unsigned(
    mut sqrt_ratio_a_x64: u128,
    mut sqrt_ratio_b_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u64, CoreError> {
    if sqrt_ratio_a_x64 > sqrt_ratio_b_x64 {
        std::mem::swap(&mut sqrt_ratio_a_x64, &mut sqrt_ratio_b_x64);
    }
    if sqrt_ratio_a_x64 == 0 {
        return Err(CoreError::DivideByZero);
    }

    let numerator_1 = U128::from(liquidity) << fixed_point::RESOLUTION;
    let numerator_2 = U128::from(sqrt_ratio_b_x64 - sqrt_ratio_a_x64);

    let result = if round_up {
        U128::div_rounding_up(
            numerator_1.mul_div_ceil(numerator_2, U128::from(sqrt_ratio_b_x64))?,
            U128::from(sqrt_ratio_a_x64),
        )
    } else {
        numerator_1.mul_div_floor(numerator_2, U128::from(sqrt_ratio_b_x64))?
            / U128::from(sqrt_ratio_a_x64)
    };
    if result > U128::from(u64::MAX) {
        return Err(CoreError::TokenMaxExceeded);
    }
    Ok(result.as_u64())
}

/// `Δy = L * (√P_upper - √P_lower)`
pub fn get_amount_b_delta_unsigned(
    mut sqrt_ratio_a_x64: u128,
    mut sqrt_ratio_b_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u64, CoreError> {
    if sqrt_ratio_a_x64 > sqrt_ratio_b_x64 {
        std::mem::swap(&mut sqrt_ratio_a_x64, &mut sqrt_ratio_b_x64);
    }

    let result = if round_up {
        U128::from(liquidity).mul_div_ceil(
            U128::from(sqrt_ratio_b_x64 - sqrt_ratio_a_x64),
            U128::from(fixed_point::Q64),
        )?
    } else {
        U128::from(liquidity).mul_div_floor(
            U128::from(sqrt_ratio_b_x64 - sqrt_ratio_a_x64),
            U128::from(fixed_point::Q64),
        )?
    };
    if result > U128::from(u64::MAX) {
        return Err(CoreError::TokenMaxExceeded);
    }
    Ok(result.as_u64())
}

/// Signed token A delta for a liquidity delta between two prices.
pub fn get_amount_a_delta_signed(
    sqrt_ratio_a_x64: u128,
    sqrt_ratio_b_x64: u128,
    liquidity: i128,
) -> Result<i64, CoreError> {
    if liquidity < 0 {
        Ok(-(get_amount_a_delta_unsigned(
            sqrt_ratio_a_x64,
            sqrt_ratio_b_x64,
            -liquidity as u128,
            false,
        )? as i64))
    } else {
        Ok(get_amount_a_delta_unsigned(sqrt_ratio_a_x64, sqrt_ratio_b_x64, liquidity as u128, true)? as i64)
    }
}

/// Signed token B delta for a liquidity delta between two prices.
pub fn get_amount_b_delta_signed(
    sqrt_ratio_a_x64: u128,
    sqrt_ratio_b_x64: u128,
    liquidity: i128,
) -> Result<i64, CoreError> {
    if liquidity < 0 {
        Ok(-(get_amount_b_delta_unsigned(
            sqrt_ratio_a_x64,
            sqrt_ratio_b_x64,
            -liquidity as u128,
            false,
        )? as i64))
    } else {
        Ok(get_amount_b_delta_unsigned(sqrt_ratio_a_x64, sqrt_ratio_b_x64, liquidity as u128, true)? as i64)
    }
}

/// Splits a liquidity delta across A-only / mixed / B-only ranges depending
/// on where `tick_current` falls relative to `[tick_lower, tick_upper)`.
pub fn get_amounts_delta_signed(
    tick_current: i32,
    tick_lower: i32,
    tick_upper: i32,
    liquidity_delta: i128,
) -> Result<(i64, i64), CoreError> {
    let mut amount_a = 0;
    let mut amount_b = 0;
    if tick_current < tick_lower {
        amount_a = get_amount_a_delta_signed(
            tick_math::get_sqrt_price_at_tick(tick_lower)?,
            tick_math::get_sqrt_price_at_tick(tick_upper)?,
            liquidity_delta,
        )?;
    } else if tick_current < tick_upper {
        amount_a = get_amount_a_delta_signed(
            tick_math::get_sqrt_price_at_tick(tick_current)?,
            tick_math::get_sqrt_price_at_tick(tick_upper)?,
            liquidity_delta,
        )?;
        amount_b = get_amount_b_delta_signed(
            tick_math::get_sqrt_price_at_tick(tick_lower)?,
            tick_math::get_sqrt_price_at_tick(tick_current)?,
            liquidity_delta,
        )?;
    } else {
        amount_b = get_amount_b_delta_signed(
            tick_math::get_sqrt_price_at_tick(tick_lower)?,
            tick_math::get_sqrt_price_at_tick(tick_upper)?,
            liquidity_delta,
        )?;
    }
    Ok((amount_a, amount_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_a_delta_is_symmetric_in_argument_order() {
        let p1 = tick_math::get_sqrt_price_at_tick(-1000).unwrap();
        let p2 = tick_math::get_sqrt_price_at_tick(1000).unwrap();
        let a = get_amount_a_delta_unsigned(p1, p2, 1_000_000, false).unwrap();
        let b = get_amount_a_delta_unsigned(p2, p1, 1_000_000, false).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn round_up_never_smaller_than_round_down() {
        let p1 = tick_math::get_sqrt_price_at_tick(0).unwrap();
        let p2 = tick_math::get_sqrt_price_at_tick(64).unwrap();
        let down = get_amount_b_delta_unsigned(p1, p2, 12345, false).unwrap();
        let up = get_amount_b_delta_unsigned(p1, p2, 12345, true).unwrap();
        assert!(up >= down);
    }
}
