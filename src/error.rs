//! Error taxonomy for the core engine.
//!
//! Every public operation returns `Result<T, CoreError>`. Variants are grouped
//! into coarse [`CoreErrorKind`]s so a host can match broadly without
//! enumerating every leaf.

use thiserror::Error;

/// Coarse grouping of [`CoreError`] variants, mirroring the taxonomy a host
/// integration is expected to branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorKind {
    Math,
    Token,
    Tick,
    Liquidity,
    SqrtPrice,
    Position,
    Reward,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    // --- MathError ---
    #[error("multiplication overflowed")]
    MultiplicationOverflow,
    #[error("division by zero")]
    DivideByZero,
    #[error("numeric downcast failed")]
    NumberDownCastError,

    // --- TokenError ---
    #[error("token amount exceeds the caller's maximum")]
    TokenMaxExceeded,
    #[error("token amount is below the caller's minimum")]
    TokenMinSubceeded,
    #[error("swap produced zero tradable output")]
    ZeroTradableAmount,

    // --- TickError ---
    #[error("tick index is out of the admissible range")]
    InvalidTickIndex,
    #[error("tick index is not a multiple of the pool's tick spacing")]
    TickNotSpaced,
    #[error("tick is not housed by the given tick array")]
    TickNotFound,
    #[error("tick array index is out of bounds")]
    TickArrayIndexOutOfBounds,
    #[error("tick arrays were not supplied in a contiguous sequence for the swap direction")]
    TickArraySequenceInvalid,

    // --- LiquidityError ---
    #[error("liquidity delta must be non-zero")]
    LiquidityZero,
    #[error("liquidity addition overflowed")]
    LiquidityOverflow,
    #[error("liquidity subtraction underflowed")]
    LiquidityUnderflow,
    #[error("liquidity_net bookkeeping is inconsistent")]
    LiquidityNetError,

    // --- SqrtPriceError ---
    #[error("sqrt price is out of the admissible range")]
    SqrtPriceOutOfRange,
    #[error("sqrt price limit is out of bounds")]
    SqrtPriceLimitOutOfBounds,
    #[error("sqrt price limit direction is inconsistent with the swap direction")]
    InvalidSqrtPriceLimitDirection,

    // --- PositionError ---
    #[error("position cannot be closed while liquidity or owed amounts remain")]
    ClosePositionNotEmpty,
    #[error("position tick bounds are invalid")]
    InvalidPositionBounds,

    // --- RewardError ---
    #[error("reward index is out of range")]
    InvalidRewardIndex,
    #[error("reward has not been initialized")]
    RewardNotInitialized,
}

impl CoreError {
    pub fn kind(self) -> CoreErrorKind {
        use CoreError::*;
        match self {
            MultiplicationOverflow | DivideByZero | NumberDownCastError => CoreErrorKind::Math,
            TokenMaxExceeded | TokenMinSubceeded | ZeroTradableAmount => CoreErrorKind::Token,
            InvalidTickIndex
            | TickNotSpaced
            | TickNotFound
            | TickArrayIndexOutOfBounds
            | TickArraySequenceInvalid => CoreErrorKind::Tick,
            LiquidityZero | LiquidityOverflow | LiquidityUnderflow | LiquidityNetError => {
                CoreErrorKind::Liquidity
            }
            SqrtPriceOutOfRange | SqrtPriceLimitOutOfBounds | InvalidSqrtPriceLimitDirection => {
                CoreErrorKind::SqrtPrice
            }
            ClosePositionNotEmpty | InvalidPositionBounds => CoreErrorKind::Position,
            InvalidRewardIndex | RewardNotInitialized => CoreErrorKind::Reward,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
