//! Single swap step within one constant-liquidity segment.
//!
//! Rounding follows the program: input amounts round up, output amounts
//! round down, and the fee is charged on top of the net input so the pool
//! is never short a unit.

use crate::constants::FEE_RATE_DENOMINATOR;
use crate::errors::{ClmmError, CoreResult};
use crate::math::big_int::{mul_div_u128, Rounding};
use crate::math::liquidity_math::{get_token_amount_a_from_liquidity, get_token_amount_b_from_liquidity};
use crate::math::sqrt_price_math::{get_next_sqrt_price_from_input, get_next_sqrt_price_from_output};

/// Result of one swap step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwapStep {
    /// Sqrt price after the step
    pub sqrt_price_next_x64: u128,
    /// Net input, fee excluded
    pub amount_in: u128,
    pub amount_out: u128,
    /// Fee charged in input-token units
    pub fee_amount: u128,
}

/// Amount across the segment, or `None` when it exceeds 128 bits
///
/// An amount that large can never be matched by the remainder, so the step
/// then stops inside the segment.
fn amount_to_target(amount: CoreResult<u128>) -> CoreResult<Option<u128>> {
    match amount {
        Ok(value) => Ok(Some(value)),
        Err(ClmmError::MathOverflow) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Swap as far toward `sqrt_price_target_x64` as `amount_remaining` allows
///
/// `amount_remaining` is positive for exact input and negative for exact
/// output.
pub fn compute_swap_step(
    sqrt_price_current_x64: u128,
    sqrt_price_target_x64: u128,
    liquidity: u128,
    amount_remaining: i128,
    fee_rate: u32,
    zero_for_one: bool,
) -> CoreResult<SwapStep> {
    if fee_rate >= FEE_RATE_DENOMINATOR {
        return Err(ClmmError::OutOfRange(format!("fee rate {fee_rate}")));
    }

    let base_input = amount_remaining >= 0;
    let remaining = amount_remaining.unsigned_abs();
    let fee_denominator = FEE_RATE_DENOMINATOR as u128;
    let fee_rate = fee_rate as u128;

    let mut amount_in_to_target = None;
    let mut amount_out_to_target = None;

    let sqrt_price_next_x64 = if base_input {
        let remaining_less_fee =
            mul_div_u128(remaining, fee_denominator - fee_rate, fee_denominator, Rounding::Down)?;

        amount_in_to_target = amount_to_target(if zero_for_one {
            get_token_amount_a_from_liquidity(sqrt_price_target_x64, sqrt_price_current_x64, liquidity, true)
        } else {
            get_token_amount_b_from_liquidity(sqrt_price_current_x64, sqrt_price_target_x64, liquidity, true)
        })?;

        match amount_in_to_target {
            Some(amount_in) if remaining_less_fee >= amount_in => sqrt_price_target_x64,
            _ => get_next_sqrt_price_from_input(
                sqrt_price_current_x64,
                liquidity,
                remaining_less_fee,
                zero_for_one,
            )?,
        }
    } else {
        amount_out_to_target = amount_to_target(if zero_for_one {
            get_token_amount_b_from_liquidity(sqrt_price_target_x64, sqrt_price_current_x64, liquidity, false)
        } else {
            get_token_amount_a_from_liquidity(sqrt_price_current_x64, sqrt_price_target_x64, liquidity, false)
        })?;

        match amount_out_to_target {
            Some(amount_out) if remaining >= amount_out => sqrt_price_target_x64,
            _ => get_next_sqrt_price_from_output(
                sqrt_price_current_x64,
                liquidity,
                remaining,
                zero_for_one,
            )?,
        }
    };

    let reached_target = sqrt_price_next_x64 == sqrt_price_target_x64;

    // Keep the amount already computed for a reached target, recompute the rest
    // from the realised price
    let amount_in = match amount_in_to_target {
        Some(amount_in) if reached_target && base_input => amount_in,
        _ => {
            if zero_for_one {
                get_token_amount_a_from_liquidity(sqrt_price_next_x64, sqrt_price_current_x64, liquidity, true)?
            } else {
                get_token_amount_b_from_liquidity(sqrt_price_current_x64, sqrt_price_next_x64, liquidity, true)?
            }
        }
    };

    let mut amount_out = match amount_out_to_target {
        Some(amount_out) if reached_target && !base_input => amount_out,
        _ => {
            if zero_for_one {
                get_token_amount_b_from_liquidity(sqrt_price_next_x64, sqrt_price_current_x64, liquidity, false)?
            } else {
                get_token_amount_a_from_liquidity(sqrt_price_current_x64, sqrt_price_next_x64, liquidity, false)?
            }
        }
    };

    if !base_input && amount_out > remaining {
        amount_out = remaining;
    }

    let fee_amount = if base_input && !reached_target {
        // Everything left over is fee
        remaining
            .checked_sub(amount_in)
            .ok_or(ClmmError::MathUnderflow)?
    } else {
        // Ceiling, not floor: a full segment always rounds the fee up
        mul_div_u128(amount_in, fee_rate, fee_denominator - fee_rate, Rounding::Up)?
    };

    Ok(SwapStep {
        sqrt_price_next_x64,
        amount_in,
        amount_out,
        fee_amount,
    })
}
