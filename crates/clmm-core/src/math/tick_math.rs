//! # Tick Math
//!
//! Conversions between ticks and Q64.64 sqrt prices. Both directions are
//! integer-only and reproduce the on-chain program bit for bit: the forward
//! direction multiplies precomputed powers of `sqrt(1.0001)`, the inverse
//! takes a fixed-precision log2 and brackets the answer between two ticks.

use crate::constants::{
    BIT_PRECISION, LOG_B_2_X32, LOG_B_P_ERR_MARGIN_LOWER_X64, LOG_B_P_ERR_MARGIN_UPPER_X64,
    MAX_SQRT_PRICE_X64, MAX_TICK, MIN_SQRT_PRICE_X64, MIN_TICK, Q64,
};
use crate::errors::{ClmmError, CoreResult};

/// `1 / sqrt(1.0001)^(2^i)` in Q64, for bit `i` of `|tick|`, starting at bit 1.
/// Bit 0 is applied by the starting ratio.
const MAGIC_SQRT_RATIOS: [u128; 18] = [
    0xfff9_7272_373d_4000,
    0xfff2_e50f_5f65_7000,
    0xffe5_caca_7e10_f000,
    0xffcb_9843_d60f_7000,
    0xff97_3b41_fa98_e800,
    0xff2e_a164_66c9_b000,
    0xfe5d_ee04_6a9a_3800,
    0xfcbe_86c7_900b_b000,
    0xf987_a725_3ac6_5800,
    0xf339_2b08_22bb_6000,
    0xe715_9475_a2ca_f000,
    0xd097_f3bd_fd2f_2000,
    0xa9f7_4646_2d9f_8000,
    0x70d8_69a1_56f3_1c00,
    0x31be_135f_97ed_3200,
    0x09aa_508b_5b85_a500,
    0x005d_6af8_dedc_582c,
    0x0000_2216_e584_f5fa,
];

/// `1 / sqrt(1.0001)` in Q64
const SQRT_RATIO_BIT_0: u128 = 0xfffc_b933_bd6f_b800;

/// Get sqrt price from tick using Q64 precision
pub fn get_sqrt_price_at_tick(tick: i32) -> CoreResult<u128> {
    if !is_tick_valid(tick) {
        return Err(ClmmError::OutOfRange(format!(
            "tick {tick} outside [{MIN_TICK}, {MAX_TICK}]"
        )));
    }

    let abs_tick = tick.unsigned_abs();
    let mut ratio = if abs_tick & 0x1 != 0 {
        SQRT_RATIO_BIT_0
    } else {
        Q64
    };

    for (i, magic) in MAGIC_SQRT_RATIOS.iter().enumerate() {
        if abs_tick & (0x2 << i) != 0 {
            // ratio <= 2^64 and magic < 2^64, so the product fits in u128
            ratio = (ratio * magic) >> 64;
        }
    }

    // The product is 1/sqrt(1.0001)^|tick|; positive ticks take the reciprocal
    if tick > 0 {
        ratio = u128::MAX / ratio;
    }

    Ok(ratio)
}

/// Get tick from sqrt price using Q64 precision
///
/// Returns the greatest tick whose sqrt price is less than or equal to
/// `sqrt_price_x64`. Both bounds are inclusive.
pub fn get_tick_at_sqrt_price(sqrt_price_x64: u128) -> CoreResult<i32> {
    if !is_sqrt_price_x64_valid(sqrt_price_x64) {
        return Err(ClmmError::OutOfRange(format!(
            "sqrt price {sqrt_price_x64} outside [{MIN_SQRT_PRICE_X64}, {MAX_SQRT_PRICE_X64}]"
        )));
    }

    // Integer part of log2, relative to the Q64 scale
    let msb = 127 - sqrt_price_x64.leading_zeros();
    let log2p_integer_x32 = ((msb as i128) - 64) << 32;

    // Normalise into [2^63, 2^64) so the square fits in u128
    let mut r = if msb >= 64 {
        sqrt_price_x64 >> (msb - 63)
    } else {
        sqrt_price_x64 << (63 - msb)
    };

    let mut bit: i128 = 1 << 63;
    let mut log2p_fraction_x64: i128 = 0;
    for _ in 0..BIT_PRECISION {
        r *= r;
        let is_r_more_than_two = (r >> 127) as u32;
        r >>= 63 + is_r_more_than_two;
        log2p_fraction_x64 += bit * is_r_more_than_two as i128;
        bit >>= 1;
    }

    let log2p_x32 = log2p_integer_x32 + (log2p_fraction_x64 >> 32);
    let log_sqrt_10001_x64 = log2p_x32 * LOG_B_2_X32;

    // Arithmetic shifts floor toward negative infinity
    let tick_low = ((log_sqrt_10001_x64 - LOG_B_P_ERR_MARGIN_LOWER_X64) >> 64) as i32;
    let tick_high = ((log_sqrt_10001_x64 + LOG_B_P_ERR_MARGIN_UPPER_X64) >> 64) as i32;

    if tick_low == tick_high {
        return Ok(tick_low);
    }

    if get_sqrt_price_at_tick(tick_high)? <= sqrt_price_x64 {
        Ok(tick_high)
    } else {
        Ok(tick_low)
    }
}

/// Check if a tick is within the supported range
pub fn is_tick_valid(tick: i32) -> bool {
    (MIN_TICK..=MAX_TICK).contains(&tick)
}

/// Check if a Q64 sqrt price is within the supported range
pub fn is_sqrt_price_x64_valid(sqrt_price_x64: u128) -> bool {
    (MIN_SQRT_PRICE_X64..=MAX_SQRT_PRICE_X64).contains(&sqrt_price_x64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert_eq!(get_sqrt_price_at_tick(MIN_TICK).unwrap(), MIN_SQRT_PRICE_X64);
        assert_eq!(get_sqrt_price_at_tick(MAX_TICK).unwrap(), MAX_SQRT_PRICE_X64);
        assert_eq!(get_sqrt_price_at_tick(0).unwrap(), Q64);

        assert_eq!(get_tick_at_sqrt_price(MIN_SQRT_PRICE_X64).unwrap(), MIN_TICK);
        assert_eq!(get_tick_at_sqrt_price(MAX_SQRT_PRICE_X64).unwrap(), MAX_TICK);
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            get_sqrt_price_at_tick(MIN_TICK - 1),
            Err(ClmmError::OutOfRange(_))
        ));
        assert!(matches!(
            get_sqrt_price_at_tick(MAX_TICK + 1),
            Err(ClmmError::OutOfRange(_))
        ));
        assert!(matches!(
            get_tick_at_sqrt_price(MIN_SQRT_PRICE_X64 - 1),
            Err(ClmmError::OutOfRange(_))
        ));
        assert!(matches!(
            get_tick_at_sqrt_price(MAX_SQRT_PRICE_X64 + 1),
            Err(ClmmError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_monotonic_around_zero() {
        let below = get_sqrt_price_at_tick(-1).unwrap();
        let at = get_sqrt_price_at_tick(0).unwrap();
        let above = get_sqrt_price_at_tick(1).unwrap();
        assert!(below < at && at < above);
    }

    #[test]
    fn test_rounding_between_ticks() {
        let sqrt_price = get_sqrt_price_at_tick(1000).unwrap();
        assert_eq!(get_tick_at_sqrt_price(sqrt_price + 1).unwrap(), 1000);
        assert_eq!(get_tick_at_sqrt_price(sqrt_price - 1).unwrap(), 999);

        let sqrt_price = get_sqrt_price_at_tick(-1000).unwrap();
        assert_eq!(get_tick_at_sqrt_price(sqrt_price).unwrap(), -1000);
        assert_eq!(get_tick_at_sqrt_price(sqrt_price - 1).unwrap(), -1001);
    }
}
