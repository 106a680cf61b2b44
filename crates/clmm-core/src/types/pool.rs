//! # Pool Snapshot
//!
//! The subset of a pool account the pricing engine reads. A snapshot is
//! built once from decoded account data and never mutated by the engine.

use crate::constants::{DEFAULT_BITMAP_WORDS, REWARD_NUM};
use crate::errors::{ClmmError, CoreResult};
use crate::math::tick_math::{is_sqrt_price_x64_valid, is_tick_valid};
use crate::tick::{TickArrayBitmapExtension, TickArrayIndex};

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

/// Decoded state of one CLMM pool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct PoolSnapshot {
    pub tick_spacing: u16,
    /// Fee rate in parts per million
    pub fee_rate: u32,
    pub tick_current: i32,
    pub sqrt_price_x64: u128,
    pub liquidity: u128,
    pub mint_decimals_a: u8,
    pub mint_decimals_b: u8,
    /// Default tick array bitmap: bit `i` marks the array at `(i - 512) * tick_count`
    pub tick_array_bitmap: [u64; DEFAULT_BITMAP_WORDS],
    pub fee_growth_global_x64_a: u128,
    pub fee_growth_global_x64_b: u128,
    pub reward_growths_global_x64: [u128; REWARD_NUM],
}

impl PoolSnapshot {
    /// Reject snapshots no consistent pool could produce
    pub fn validate(&self) -> CoreResult<()> {
        if self.tick_spacing == 0 {
            return Err(ClmmError::InvalidTickSpacing(self.tick_spacing));
        }
        if !is_tick_valid(self.tick_current) {
            return Err(ClmmError::OutOfRange(format!(
                "current tick {}",
                self.tick_current
            )));
        }
        if !is_sqrt_price_x64_valid(self.sqrt_price_x64) {
            return Err(ClmmError::OutOfRange(format!(
                "current sqrt price {}",
                self.sqrt_price_x64
            )));
        }
        Ok(())
    }

    /// Presence index over this pool's tick arrays
    pub fn tick_array_index<'a>(
        &'a self,
        extension: &'a TickArrayBitmapExtension,
    ) -> CoreResult<TickArrayIndex<'a>> {
        TickArrayIndex::new(self.tick_spacing, &self.tick_array_bitmap, extension)
    }
}
