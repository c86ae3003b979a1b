//! Q64.64 fixed point constants, used throughout sqrt_price/fee/reward math.

pub const Q64: u128 = (u64::MAX as u128) + 1; // 2^64
pub const RESOLUTION: u8 = 64;
