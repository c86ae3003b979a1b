//! Sizing helpers: liquidity from desired token amounts, and the inverse.
//! Implements formulae 6.29 and 6.30 of the Uniswap v3 whitepaper.
use super::big_num::U128;
use super::fixed_point;
use super::full_math::MulDiv;
use super::sqrt_price_math::{get_amount_a_delta_unsigned, get_amount_b_delta_unsigned};
use crate::error::CoreError;

/// `ΔL = Δx * (√P_upper * √P_lower) / (√P_upper - √P_lower)`
pub fn get_liquidity_for_amount_a(
    mut sqrt_ratio_a_x64: u128,
    mut sqrt_ratio_b_x64: u128,
    amount_a: u64,
) -> Result<u128, CoreError> {
    if sqrt_ratio_a_x64 > sqrt_ratio_b_x64 {
        std::mem::swap(&mut sqrt_ratio_a_x64, &mut sqrt_ratio_b_x64);
    }
    let intermediate = U128::from(sqrt_ratio_a_x64)
        .mul_div_floor(U128::from(sqrt_ratio_b_x64), U128::from(fixed_point::Q64))?;

    Ok(U128::from(amount_a)
        .mul_div_floor(intermediate, U128::from(sqrt_ratio_b_x64 - sqrt_ratio_a_x64))?
        .as_u128())
}

/// `ΔL = Δy / (√P_upper - √P_lower)`
pub fn get_liquidity_for_amount_b(
    mut sqrt_ratio_a_x64: u128,
    mut sqrt_ratio_b_x64: u128,
    amount_b: u64,
) -> Result<u128, CoreError> {
    if sqrt_ratio_a_x64 > sqrt_ratio_b_x64 {
        std::mem::swap(&mut sqrt_ratio_a_x64, &mut sqrt_ratio_b_x64);
    }
    Ok(U128::from(amount_b)
        .mul_div_floor(U128::from(fixed_point::Q64), U128::from(sqrt_ratio_b_x64 - sqrt_ratio_a_x64))?
        .as_u128())
}

/// Maximum liquidity obtainable for the given token amounts at the current price.
pub fn get_liquidity_for_amounts(
    sqrt_ratio_x64: u128,
    mut sqrt_ratio_a_x64: u128,
    mut sqrt_ratio_b_x64: u128,
    amount_a: u64,
    amount_b: u64,
) -> Result<u128, CoreError> {
    if sqrt_ratio_a_x64 > sqrt_ratio_b_x64 {
        std::mem::swap(&mut sqrt_ratio_a_x64, &mut sqrt_ratio_b_x64);
    }

    if sqrt_ratio_x64 <= sqrt_ratio_a_x64 {
        get_liquidity_for_amount_a(sqrt_ratio_a_x64, sqrt_ratio_b_x64, amount_a)
    } else if sqrt_ratio_x64 < sqrt_ratio_b_x64 {
        let from_a = get_liquidity_for_amount_a(sqrt_ratio_x64, sqrt_ratio_b_x64, amount_a)?;
        let from_b = get_liquidity_for_amount_b(sqrt_ratio_a_x64, sqrt_ratio_x64, amount_b)?;
        Ok(from_a.min(from_b))
    } else {
        get_liquidity_for_amount_b(sqrt_ratio_a_x64, sqrt_ratio_b_x64, amount_b)
    }
}

/// Token A and B amounts required to mint `liquidity` over `[sqrt_ratio_a_x64, sqrt_ratio_b_x64)`
/// at the current price `sqrt_ratio_x64`.
pub fn get_amounts_for_liquidity(
    sqrt_ratio_x64: u128,
    sqrt_ratio_a_x64: u128,
    sqrt_ratio_b_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<(u64, u64), CoreError> {
    let (mut lower, mut upper) = (sqrt_ratio_a_x64, sqrt_ratio_b_x64);
    if lower > upper {
        std::mem::swap(&mut lower, &mut upper);
    }

    if sqrt_ratio_x64 <= lower {
        Ok((get_amount_a_delta_unsigned(lower, upper, liquidity, round_up)?, 0))
    } else if sqrt_ratio_x64 < upper {
        Ok((
            get_amount_a_delta_unsigned(sqrt_ratio_x64, upper, liquidity, round_up)?,
            get_amount_b_delta_unsigned(lower, sqrt_ratio_x64, liquidity, round_up)?,
        ))
    } else {
        Ok((0, get_amount_b_delta_unsigned(lower, upper, liquidity, round_up)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libraries::tick_math::get_sqrt_price_at_tick;

    #[test]
    fn liquidity_sizing_round_trips_within_rounding() {
        let p_lower = get_sqrt_price_at_tick(-1000).unwrap();
        let p_upper = get_sqrt_price_at_tick(1000).unwrap();
        let p_current = get_sqrt_price_at_tick(0).unwrap();
        let l = get_liquidity_for_amounts(p_current, p_lower, p_upper, 1_000_000, 1_000_000).unwrap();
        let (a, b) = get_amounts_for_liquidity(p_current, p_lower, p_upper, l, false).unwrap();
        assert!(a <= 1_000_000 && b <= 1_000_000);
    }
}
