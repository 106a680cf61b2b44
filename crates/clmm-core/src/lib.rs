//! # CLMM Core - Off-chain Pricing Engine
//!
//! Bit-exact replica of a concentrated-liquidity pool's pricing math, used
//! by clients to quote swaps without submitting a transaction. It provides:
//!
//! - Q64.64 tick and sqrt price conversions
//! - Liquidity and token amount conversions with program rounding
//! - The tick-array presence index (default bitmap plus extension)
//! - A swap simulator that walks initialized ticks across arrays
//!
//! ## Feature Flags
//!
//! - `client`: Enables serde serialization for off-chain use

pub mod constants;
pub mod errors;
pub mod math;
pub mod swap;
pub mod tick;
pub mod types;

// Re-export commonly used items
pub use constants::*;
pub use errors::{ClmmError, CoreResult};
pub use swap::{swap_compute, SwapParams, SwapResult, TickArraySource};
pub use tick::{TickArrayBitmapExtension, TickArrayIndex, TickArrayState, TickState};
pub use types::*;
