//! # Sqrt Price Math
//!
//! Price movement caused by adding or removing a token amount at constant
//! liquidity. Token A moves round the price up, token B moves round it down,
//! so the pool never gives away a fraction of a unit.

use crate::constants::RESOLUTION;
use crate::errors::{ClmmError, CoreResult};
use crate::math::big_int::{div_rounding, mul_div, u512_to_u128, Rounding, U512};

/// Sqrt price reached after `amount_in` enters the pool
pub fn get_next_sqrt_price_from_input(
    sqrt_price_x64: u128,
    liquidity: u128,
    amount_in: u128,
    zero_for_one: bool,
) -> CoreResult<u128> {
    check_inputs(sqrt_price_x64, liquidity)?;

    if zero_for_one {
        next_sqrt_price_from_amount_a_rounding_up(sqrt_price_x64, liquidity, amount_in, true)
    } else {
        next_sqrt_price_from_amount_b_rounding_down(sqrt_price_x64, liquidity, amount_in, true)
    }
}

/// Sqrt price reached after `amount_out` leaves the pool
pub fn get_next_sqrt_price_from_output(
    sqrt_price_x64: u128,
    liquidity: u128,
    amount_out: u128,
    zero_for_one: bool,
) -> CoreResult<u128> {
    check_inputs(sqrt_price_x64, liquidity)?;

    if zero_for_one {
        next_sqrt_price_from_amount_b_rounding_down(sqrt_price_x64, liquidity, amount_out, false)
    } else {
        next_sqrt_price_from_amount_a_rounding_up(sqrt_price_x64, liquidity, amount_out, false)
    }
}

fn check_inputs(sqrt_price_x64: u128, liquidity: u128) -> CoreResult<()> {
    if sqrt_price_x64 == 0 {
        return Err(ClmmError::ZeroSqrtPrice);
    }
    if liquidity == 0 {
        return Err(ClmmError::ZeroLiquidity);
    }
    Ok(())
}

/// `L·p / (L ± amount·p)`, rounded up
fn next_sqrt_price_from_amount_a_rounding_up(
    sqrt_price_x64: u128,
    liquidity: u128,
    amount: u128,
    add: bool,
) -> CoreResult<u128> {
    if amount == 0 {
        return Ok(sqrt_price_x64);
    }

    let numerator = U512::from(liquidity) << RESOLUTION;
    let price = U512::from(sqrt_price_x64);
    let product = U512::from(amount) * price;

    let denominator = if add {
        numerator + product
    } else {
        if numerator <= product {
            return Err(ClmmError::InsufficientLiquidityForOutput);
        }
        numerator - product
    };

    u512_to_u128(mul_div(numerator, price, denominator, Rounding::Up)?)
}

/// `p ± amount / L`, rounded down
fn next_sqrt_price_from_amount_b_rounding_down(
    sqrt_price_x64: u128,
    liquidity: u128,
    amount: u128,
    add: bool,
) -> CoreResult<u128> {
    let delta_y = U512::from(amount) << RESOLUTION;
    let price = U512::from(sqrt_price_x64);

    if add {
        let quotient = div_rounding(delta_y, U512::from(liquidity), Rounding::Down)?;
        u512_to_u128(price + quotient)
    } else {
        let quotient = div_rounding(delta_y, U512::from(liquidity), Rounding::Up)?;
        if price <= quotient {
            return Err(ClmmError::InsufficientLiquidityForOutput);
        }
        u512_to_u128(price - quotient)
    }
}
