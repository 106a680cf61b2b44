//! Display helpers for choosing position price ranges.

use bigdecimal::BigDecimal;
use tracing::warn;

use clmm_core::constants::{MAX_TICK, MIN_TICK};
use clmm_core::math::{
    get_sqrt_price_at_tick, get_tick_aligned_price_details, sqrt_price_x64_to_price, PriceAndTick,
    TickAlignedPriceDetails,
};
use clmm_core::tick::tick_range;
use clmm_core::ClmmError;

use crate::core::SdkResult;

/// Both ends of a user-entered range, moved onto the tick grid
#[derive(Debug, Clone, PartialEq)]
pub struct TickAlignedPriceRange {
    pub lower: TickAlignedPriceDetails,
    pub upper: TickAlignedPriceDetails,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBounds {
    pub min: PriceAndTick,
    pub max: PriceAndTick,
}

fn check_tick_spacing(tick_spacing: u16) -> SdkResult<()> {
    if tick_spacing == 0 {
        return Err(ClmmError::InvalidTickSpacing(tick_spacing).into());
    }
    Ok(())
}

pub fn calculate_tick_aligned_price_range(
    tick_spacing: u16,
    decimals_a: u8,
    decimals_b: u8,
    start_price: &BigDecimal,
    end_price: &BigDecimal,
) -> SdkResult<TickAlignedPriceRange> {
    check_tick_spacing(tick_spacing)?;
    Ok(TickAlignedPriceRange {
        lower: get_tick_aligned_price_details(start_price, tick_spacing, decimals_a, decimals_b)?,
        upper: get_tick_aligned_price_details(end_price, tick_spacing, decimals_a, decimals_b)?,
    })
}

/// Price one spacing above `tick`, or at `tick` when that step leaves the tick range
pub fn calculate_price_from_tick(
    tick: i32,
    decimals_a: u8,
    decimals_b: u8,
    tick_spacing: u16,
) -> SdkResult<PriceAndTick> {
    let mut tick_with_spacing = tick.saturating_add(tick_spacing as i32);
    if !(MIN_TICK..=MAX_TICK).contains(&tick_with_spacing) {
        warn!(
            "Tick {} is out of range, using tick {} instead",
            tick_with_spacing, tick
        );
        tick_with_spacing = tick;
    }

    let sqrt_price_x64 = get_sqrt_price_at_tick(tick_with_spacing)?;
    Ok(PriceAndTick {
        tick: tick_with_spacing,
        price: sqrt_price_x64_to_price(sqrt_price_x64, decimals_a, decimals_b),
    })
}

/// Lowest and highest prices a position can be opened at for this spacing
pub fn calculate_price_range_from_tick_spacing(
    tick_spacing: u16,
    decimals_a: u8,
    decimals_b: u8,
) -> SdkResult<PriceBounds> {
    check_tick_spacing(tick_spacing)?;
    let boundary = tick_range(tick_spacing);
    Ok(PriceBounds {
        min: calculate_price_from_tick(boundary.lower, decimals_a, decimals_b, tick_spacing)?,
        max: calculate_price_from_tick(boundary.upper, decimals_a, decimals_b, tick_spacing)?,
    })
}
