//! # Price Math
//!
//! Human-readable prices live in arbitrary-precision decimals; on-chain
//! prices live in Q64.64 integers. This module is the only place the two
//! domains meet, and every crossing rounds explicitly.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::constants::Q64;
use crate::errors::{ClmmError, CoreResult};
use crate::math::tick_math::{get_sqrt_price_at_tick, get_tick_at_sqrt_price};

/// Tick aligned to a pool's spacing, with its exact sqrt price and price
#[derive(Debug, Clone, PartialEq)]
pub struct TickAlignedPriceDetails {
    pub tick: i32,
    pub sqrt_price_x64: u128,
    pub price: BigDecimal,
}

/// Tick for a price in a chosen quote direction, with its rounded price
#[derive(Debug, Clone, PartialEq)]
pub struct PriceAndTick {
    pub tick: i32,
    pub price: BigDecimal,
}

// ============================================================================
// Decimal <-> Integer Boundary
// ============================================================================

pub(crate) fn u128_to_decimal(value: u128) -> BigDecimal {
    BigDecimal::from(BigInt::from(value))
}

/// `10^exponent`, exact for negative exponents too
fn pow10(exponent: i64) -> BigDecimal {
    BigDecimal::new(BigInt::from(1), -exponent)
}

/// Decimal from the shortest round-trip rendering of an `f64`
pub(crate) fn decimal_from_f64(value: f64) -> CoreResult<BigDecimal> {
    if !value.is_finite() {
        return Err(ClmmError::InvalidPrice(format!("{value} is not finite")));
    }
    BigDecimal::from_str(&value.to_string())
        .map_err(|e| ClmmError::InvalidPrice(e.to_string()))
}

fn decimal_to_u128_truncated(value: &BigDecimal) -> CoreResult<u128> {
    if value.is_negative() {
        return Err(ClmmError::InvalidPrice(format!("{value} is negative")));
    }
    let (digits, exponent) = value.with_scale(0).into_bigint_and_exponent();
    debug_assert_eq!(exponent, 0);
    digits.to_u128().ok_or(ClmmError::MathOverflow)
}

/// Non-negative decimal rounded half away from zero
pub(crate) fn decimal_to_u128_round_half_up(value: &BigDecimal) -> CoreResult<u128> {
    let half = BigDecimal::new(BigInt::from(5), 1);
    decimal_to_u128_truncated(&(value + half))
}

/// Q64.64 value as a decimal: `value / 2^64`
pub fn x64_to_decimal(value: u128) -> BigDecimal {
    u128_to_decimal(value) / u128_to_decimal(Q64)
}

/// Decimal as a Q64.64 value: `floor(value · 2^64)`
pub fn decimal_to_x64(value: &BigDecimal) -> CoreResult<u128> {
    decimal_to_u128_truncated(&(value * u128_to_decimal(Q64)))
}

// ============================================================================
// Price <-> Sqrt Price <-> Tick
// ============================================================================

/// Human price of token A in token B, from a Q64.64 sqrt price
pub fn sqrt_price_x64_to_price(sqrt_price_x64: u128, decimals_a: u8, decimals_b: u8) -> BigDecimal {
    let sqrt_price = x64_to_decimal(sqrt_price_x64);
    &sqrt_price * &sqrt_price * pow10(decimals_a as i64 - decimals_b as i64)
}

/// Q64.64 sqrt price for a human price of token A in token B
pub fn price_to_sqrt_price_x64(price: &BigDecimal, decimals_a: u8, decimals_b: u8) -> CoreResult<u128> {
    if price.is_negative() {
        return Err(ClmmError::InvalidPrice(format!("{price} is negative")));
    }
    let scaled = price * pow10(decimals_b as i64 - decimals_a as i64);
    let sqrt_price = scaled
        .sqrt()
        .ok_or_else(|| ClmmError::InvalidPrice(format!("no square root for {scaled}")))?;
    decimal_to_x64(&sqrt_price)
}

/// Tick whose price is at or just below `price`
pub fn get_tick_from_price(price: &BigDecimal, decimals_a: u8, decimals_b: u8) -> CoreResult<i32> {
    get_tick_at_sqrt_price(price_to_sqrt_price_x64(price, decimals_a, decimals_b)?)
}

/// Tick for `price` moved onto the spacing grid, away from zero
///
/// Positive ticks round up and negative ticks round down, so the aligned
/// price is never more aggressive than the one requested.
pub fn get_tick_with_price_and_tick_spacing(
    price: &BigDecimal,
    tick_spacing: u16,
    decimals_a: u8,
    decimals_b: u8,
) -> CoreResult<i32> {
    if tick_spacing == 0 {
        return Err(ClmmError::InvalidTickSpacing(tick_spacing));
    }
    let tick = get_tick_from_price(price, decimals_a, decimals_b)?;
    Ok(align_tick_away_from_zero(tick, tick_spacing as i32))
}

fn align_tick_away_from_zero(tick: i32, tick_spacing: i32) -> i32 {
    let floor = tick.div_euclid(tick_spacing);
    if tick < 0 || tick.rem_euclid(tick_spacing) == 0 {
        floor * tick_spacing
    } else {
        (floor + 1) * tick_spacing
    }
}

/// Price at `tick`; `base_in == false` quotes token B in token A instead
pub fn get_price_from_tick(
    tick: i32,
    decimals_a: u8,
    decimals_b: u8,
    base_in: bool,
) -> CoreResult<BigDecimal> {
    let price = sqrt_price_x64_to_price(get_sqrt_price_at_tick(tick)?, decimals_a, decimals_b);
    if base_in {
        Ok(price)
    } else {
        invert(&price)
    }
}

fn invert(price: &BigDecimal) -> CoreResult<BigDecimal> {
    if price.is_zero() {
        return Err(ClmmError::DivisionByZero);
    }
    Ok(BigDecimal::from(1) / price)
}

/// Aligned tick for `price` and the exact price that tick represents
pub fn get_tick_aligned_price_details(
    price: &BigDecimal,
    tick_spacing: u16,
    decimals_a: u8,
    decimals_b: u8,
) -> CoreResult<TickAlignedPriceDetails> {
    let tick = get_tick_with_price_and_tick_spacing(price, tick_spacing, decimals_a, decimals_b)?;
    let sqrt_price_x64 = get_sqrt_price_at_tick(tick)?;
    Ok(TickAlignedPriceDetails {
        tick,
        sqrt_price_x64,
        price: sqrt_price_x64_to_price(sqrt_price_x64, decimals_a, decimals_b),
    })
}

/// Aligned tick and rounded price for a price quoted in either direction
pub fn get_price_and_tick(
    price: &BigDecimal,
    base_in: bool,
    tick_spacing: u16,
    decimals_a: u8,
    decimals_b: u8,
) -> CoreResult<PriceAndTick> {
    let price_a_in_b = if base_in { price.clone() } else { invert(price)? };

    let details = get_tick_aligned_price_details(&price_a_in_b, tick_spacing, decimals_a, decimals_b)?;
    let price = if base_in {
        details.price
    } else {
        invert(&details.price)?
    };

    Ok(PriceAndTick {
        tick: details.tick,
        price,
    })
}
