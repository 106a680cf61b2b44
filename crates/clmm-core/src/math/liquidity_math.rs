//! # Liquidity Math
//!
//! Conversions between a liquidity magnitude and the token amounts it spans
//! over a sqrt price range. Every function reorders its range bounds, so
//! `(a, b)` and `(b, a)` always give the same answer.
//!
//! Rounding is always explicit: `round_up` is set when computing what a user
//! must supply and cleared when computing what a user receives.

use bigdecimal::BigDecimal;

use crate::constants::{Q64, RESOLUTION, U64_MAX_AS_U128};
use crate::errors::{ClmmError, CoreResult};
use crate::math::big_int::{div_rounding, mul_div, mul_div_u128, u512_to_u128, Rounding, U512};
use crate::math::price_math::{decimal_from_f64, decimal_to_u128_round_half_up, u128_to_decimal};

/// Token amounts represented by a liquidity position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenAmounts {
    pub amount_a: u128,
    pub amount_b: u128,
}

fn ordered(sqrt_price_a_x64: u128, sqrt_price_b_x64: u128) -> (u128, u128) {
    if sqrt_price_a_x64 > sqrt_price_b_x64 {
        (sqrt_price_b_x64, sqrt_price_a_x64)
    } else {
        (sqrt_price_a_x64, sqrt_price_b_x64)
    }
}

/// Apply a signed liquidity delta, failing instead of going negative
pub fn add_delta(liquidity: u128, delta: i128) -> CoreResult<u128> {
    if delta >= 0 {
        liquidity
            .checked_add(delta.unsigned_abs())
            .ok_or(ClmmError::MathOverflow)
    } else {
        liquidity
            .checked_sub(delta.unsigned_abs())
            .ok_or(ClmmError::MathUnderflow)
    }
}

/// Token A spanned by `liquidity` over the range:
/// `L · 2^64 · (b - a) / b / a`
pub fn get_token_amount_a_from_liquidity(
    sqrt_price_a_x64: u128,
    sqrt_price_b_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> CoreResult<u128> {
    let (lower, upper) = ordered(sqrt_price_a_x64, sqrt_price_b_x64);
    if lower == 0 {
        return Err(ClmmError::ZeroSqrtPrice);
    }

    let numerator_1 = U512::from(liquidity) << RESOLUTION;
    let numerator_2 = U512::from(upper - lower);
    let rounding = Rounding::from_round_up(round_up);

    // Both divisions round the same way so a rounded-up amount never
    // undershoots the exact value
    let partial = mul_div(numerator_1, numerator_2, U512::from(upper), rounding)?;
    u512_to_u128(div_rounding(partial, U512::from(lower), rounding)?)
}

/// Token B spanned by `liquidity` over the range: `L · (b - a) / 2^64`
pub fn get_token_amount_b_from_liquidity(
    sqrt_price_a_x64: u128,
    sqrt_price_b_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> CoreResult<u128> {
    let (lower, upper) = ordered(sqrt_price_a_x64, sqrt_price_b_x64);
    if lower == 0 {
        return Err(ClmmError::ZeroSqrtPrice);
    }

    mul_div_u128(
        liquidity,
        upper - lower,
        Q64,
        Rounding::from_round_up(round_up),
    )
}

/// Liquidity supplied by `amount_a` of token A over the range
///
/// The rounded-up variant divides by `2^64 - 1` rather than shifting, which
/// is how the program sizes deposits.
pub fn get_liquidity_from_token_amount_a(
    sqrt_price_a_x64: u128,
    sqrt_price_b_x64: u128,
    amount_a: u128,
    round_up: bool,
) -> CoreResult<u128> {
    let (lower, upper) = ordered(sqrt_price_a_x64, sqrt_price_b_x64);

    let numerator = U512::from(amount_a) * U512::from(lower) * U512::from(upper);
    let result = div_rounding(numerator, U512::from(upper - lower), Rounding::Down)?;

    if round_up {
        u512_to_u128(div_rounding(
            result,
            U512::from(U64_MAX_AS_U128),
            Rounding::Up,
        )?)
    } else {
        u512_to_u128(result >> RESOLUTION)
    }
}

/// Liquidity supplied by `amount_b` of token B over the range
pub fn get_liquidity_from_token_amount_b(
    sqrt_price_a_x64: u128,
    sqrt_price_b_x64: u128,
    amount_b: u128,
) -> CoreResult<u128> {
    let (lower, upper) = ordered(sqrt_price_a_x64, sqrt_price_b_x64);
    mul_div_u128(amount_b, U64_MAX_AS_U128, upper - lower, Rounding::Down)
}

/// Maximum liquidity both amounts can back at the current price
pub fn get_liquidity_from_token_amounts(
    sqrt_price_current_x64: u128,
    sqrt_price_a_x64: u128,
    sqrt_price_b_x64: u128,
    amount_a: u128,
    amount_b: u128,
) -> CoreResult<u128> {
    let (lower, upper) = ordered(sqrt_price_a_x64, sqrt_price_b_x64);

    if sqrt_price_current_x64 <= lower {
        get_liquidity_from_token_amount_a(lower, upper, amount_a, false)
    } else if sqrt_price_current_x64 < upper {
        let liquidity_a =
            get_liquidity_from_token_amount_a(sqrt_price_current_x64, upper, amount_a, false)?;
        let liquidity_b =
            get_liquidity_from_token_amount_b(lower, sqrt_price_current_x64, amount_b)?;
        Ok(liquidity_a.min(liquidity_b))
    } else {
        get_liquidity_from_token_amount_b(lower, upper, amount_b)
    }
}

/// Token amounts spanned by `liquidity` at the current price
pub fn get_amounts_from_liquidity(
    sqrt_price_current_x64: u128,
    sqrt_price_a_x64: u128,
    sqrt_price_b_x64: u128,
    liquidity: u128,
    round_up: bool,
) -> CoreResult<TokenAmounts> {
    let (lower, upper) = ordered(sqrt_price_a_x64, sqrt_price_b_x64);

    if sqrt_price_current_x64 <= lower {
        Ok(TokenAmounts {
            amount_a: get_token_amount_a_from_liquidity(lower, upper, liquidity, round_up)?,
            amount_b: 0,
        })
    } else if sqrt_price_current_x64 < upper {
        Ok(TokenAmounts {
            amount_a: get_token_amount_a_from_liquidity(
                sqrt_price_current_x64,
                upper,
                liquidity,
                round_up,
            )?,
            amount_b: get_token_amount_b_from_liquidity(
                lower,
                sqrt_price_current_x64,
                liquidity,
                round_up,
            )?,
        })
    } else {
        Ok(TokenAmounts {
            amount_a: 0,
            amount_b: get_token_amount_b_from_liquidity(lower, upper, liquidity, round_up)?,
        })
    }
}

/// Token amounts scaled by `1 + slippage` (`amount_max`) or `1 - slippage`,
/// rounded half away from zero
pub fn get_amounts_from_liquidity_with_slippage(
    sqrt_price_current_x64: u128,
    sqrt_price_a_x64: u128,
    sqrt_price_b_x64: u128,
    liquidity: u128,
    amount_max: bool,
    round_up: bool,
    slippage: f64,
) -> CoreResult<TokenAmounts> {
    let amounts = get_amounts_from_liquidity(
        sqrt_price_current_x64,
        sqrt_price_a_x64,
        sqrt_price_b_x64,
        liquidity,
        round_up,
    )?;

    let coefficient = if amount_max {
        1.0 + slippage
    } else {
        1.0 - slippage
    };
    let coefficient = decimal_from_f64(coefficient)?;
    if coefficient < BigDecimal::from(0) {
        return Err(ClmmError::InvalidPrice(format!(
            "slippage {slippage} gives a negative coefficient"
        )));
    }

    Ok(TokenAmounts {
        amount_a: decimal_to_u128_round_half_up(&(u128_to_decimal(amounts.amount_a) * &coefficient))?,
        amount_b: decimal_to_u128_round_half_up(&(u128_to_decimal(amounts.amount_b) * &coefficient))?,
    })
}

/// Token B needed alongside `amount_a` of token A for a position over the range
///
/// Zero unless the current price lies strictly inside `(start, end)`. At the
/// upper bound the position holds no token A to pair with.
pub fn get_amount_b_from_amount_a(
    start_sqrt_price_x64: u128,
    end_sqrt_price_x64: u128,
    current_sqrt_price_x64: u128,
    amount_a: u128,
) -> CoreResult<u128> {
    let (start, end) = ordered(start_sqrt_price_x64, end_sqrt_price_x64);
    if current_sqrt_price_x64 <= start || current_sqrt_price_x64 >= end {
        return Ok(0);
    }

    let liquidity = get_liquidity_from_token_amount_a(current_sqrt_price_x64, end, amount_a, false)?;
    get_token_amount_b_from_liquidity(start, current_sqrt_price_x64, liquidity, true)
}

/// Token A needed alongside `amount_b` of token B for a position over the range
///
/// Zero when the current price is outside `(start, end]`.
pub fn get_amount_a_from_amount_b(
    start_sqrt_price_x64: u128,
    end_sqrt_price_x64: u128,
    current_sqrt_price_x64: u128,
    amount_b: u128,
) -> CoreResult<u128> {
    let (start, end) = ordered(start_sqrt_price_x64, end_sqrt_price_x64);
    if current_sqrt_price_x64 <= start || current_sqrt_price_x64 > end {
        return Ok(0);
    }

    let liquidity = get_liquidity_from_token_amount_b(start, current_sqrt_price_x64, amount_b)?;
    get_token_amount_a_from_liquidity(current_sqrt_price_x64, end, liquidity, true)
}
