//! # Core Error Types
//!
//! Every failure the pricing engine can report. All of them are local and
//! recoverable; none is retried internally.

use thiserror::Error;

/// Errors raised by the pricing core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub enum ClmmError {
    // ========================================================================
    // Domain Errors
    // ========================================================================
    /// Tick or sqrt price outside the protocol bounds
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// Price limit on the wrong side of the current price
    #[error("Invalid price limit ordering: {0}")]
    InvalidOrdering(String),

    #[error("Liquidity insufficient")]
    LiquidityInsufficient,

    #[error("Swap amount must not be zero")]
    ZeroAmount,

    /// The tick array map handed to the simulator lacks an array it needs
    #[error("Tick array data missing for start index {start_index}")]
    MissingTickArrayData { start_index: i32 },

    // ========================================================================
    // Math Errors
    // ========================================================================
    #[error("Math overflow")]
    MathOverflow,

    #[error("Math underflow")]
    MathUnderflow,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Sqrt price must be greater than zero")]
    ZeroSqrtPrice,

    #[error("Liquidity must be greater than zero")]
    ZeroLiquidity,

    /// Requested output exceeds what the current liquidity can release
    #[error("Output exceeds available liquidity")]
    InsufficientLiquidityForOutput,

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    // ========================================================================
    // Tick Array Errors
    // ========================================================================
    #[error("Invalid tick spacing: {0}")]
    InvalidTickSpacing(u16),

    #[error("Invalid tick array start index: {0}")]
    InvalidTickArrayStartIndex(i32),

    /// Start index does not belong to the bitmap it was looked up in
    #[error("Tick array start index {0} is outside the extension boundary")]
    InvalidTickArrayBoundary(i32),

    #[error("Tick {tick} is not a multiple of spacing {tick_spacing}")]
    TickNotAligned { tick: i32, tick_spacing: u16 },

    #[error("Tick array {start_index} has no initialized tick")]
    EmptyTickArray { start_index: i32 },
}

/// Result type using core errors
pub type CoreResult<T> = Result<T, ClmmError>;
