//! # Mathematical Functions
//!
//! Integer math shared by the swap simulator and the quote layer. Everything
//! here is pure and bit-exact with the program except `price_math`, which
//! converts to and from human-readable decimal prices.

pub mod big_int;
pub mod fee_math;
pub mod liquidity_math;
pub mod price_math;
pub mod safe_math;
pub mod sqrt_price_math;
pub mod tick_math;

// Re-export commonly used functions
pub use big_int::{mul_div_u128, Rounding, U256, U512};
pub use fee_math::*;
pub use liquidity_math::*;
pub use price_math::*;
pub use safe_math::*;
pub use sqrt_price_math::*;
pub use tick_math::*;
