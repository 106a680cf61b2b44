//! Big integer operations for high-precision math
//!
//! Q64.64 products overflow 128 bits as soon as a liquidity value is shifted
//! or two sqrt prices are multiplied. This module provides the wide types and
//! the explicit-rounding mul_div used by every conversion in the crate.

use uint::construct_uint;

use crate::errors::{ClmmError, CoreResult};

construct_uint! {
    /// 256-bit unsigned integer for intermediate calculations
    pub struct U256(4);
}

construct_uint! {
    /// 512-bit unsigned integer for products of three Q64 terms
    pub struct U512(8);
}

/// Rounding mode for division operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub enum Rounding {
    /// Round down (towards zero)
    Down,
    /// Round up (away from zero)
    Up,
}

impl Rounding {
    /// `Up` when `round_up` is set, `Down` otherwise
    pub const fn from_round_up(round_up: bool) -> Self {
        if round_up {
            Rounding::Up
        } else {
            Rounding::Down
        }
    }
}

/// Multiply two values and divide by a third with specified rounding
/// result = (a * b) / denominator
pub fn mul_div(a: U512, b: U512, denominator: U512, rounding: Rounding) -> CoreResult<U512> {
    if denominator.is_zero() {
        return Err(ClmmError::DivisionByZero);
    }

    let product = a.checked_mul(b).ok_or(ClmmError::MathOverflow)?;
    let (quotient, remainder) = product.div_mod(denominator);

    if rounding == Rounding::Up && !remainder.is_zero() {
        return quotient
            .checked_add(U512::one())
            .ok_or(ClmmError::MathOverflow);
    }

    Ok(quotient)
}

/// Multiply two u128 values and divide by a third with specified rounding
pub fn mul_div_u128(a: u128, b: u128, denominator: u128, rounding: Rounding) -> CoreResult<u128> {
    if denominator == 0 {
        return Err(ClmmError::DivisionByZero);
    }

    // u128 * u128 always fits in 256 bits
    let product = U256::from(a) * U256::from(b);
    let (quotient, remainder) = product.div_mod(U256::from(denominator));

    let result = if rounding == Rounding::Up && !remainder.is_zero() {
        quotient + U256::one()
    } else {
        quotient
    };

    u256_to_u128(result)
}

/// Divide with specified rounding
pub fn div_rounding(numerator: U512, denominator: U512, rounding: Rounding) -> CoreResult<U512> {
    mul_div(numerator, U512::one(), denominator, rounding)
}

/// Narrow a U256 to u128, failing on overflow
pub fn u256_to_u128(value: U256) -> CoreResult<u128> {
    if value > U256::from(u128::MAX) {
        return Err(ClmmError::MathOverflow);
    }
    Ok(value.low_u128())
}

/// Narrow a U512 to u128, failing on overflow
pub fn u512_to_u128(value: U512) -> CoreResult<u128> {
    if value > U512::from(u128::MAX) {
        return Err(ClmmError::MathOverflow);
    }
    Ok(value.low_u128())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_rounding() {
        // 30 / 4 = 7.5
        let down = mul_div_u128(10, 3, 4, Rounding::Down).unwrap();
        let up = mul_div_u128(10, 3, 4, Rounding::Up).unwrap();
        assert_eq!(down, 7);
        assert_eq!(up, 8);

        // Exact division never rounds
        assert_eq!(mul_div_u128(10, 4, 5, Rounding::Up).unwrap(), 8);
    }

    #[test]
    fn test_mul_div_large_numbers() {
        let a = u128::MAX / 2;
        let result = mul_div_u128(a, 2, 2, Rounding::Down).unwrap();
        assert_eq!(result, a);

        // Intermediate exceeds 256 bits but the quotient is small
        let big = U512::from(u128::MAX) << 64;
        let result = mul_div(big, U512::from(u128::MAX), big, Rounding::Up).unwrap();
        assert_eq!(u512_to_u128(result).unwrap(), u128::MAX);
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            mul_div_u128(1, 1, 0, Rounding::Down),
            Err(ClmmError::DivisionByZero)
        );
        assert_eq!(
            div_rounding(U512::one(), U512::zero(), Rounding::Up),
            Err(ClmmError::DivisionByZero)
        );
    }

    #[test]
    fn test_narrowing_overflow() {
        let too_big = U256::from(u128::MAX) + U256::one();
        assert_eq!(u256_to_u128(too_big), Err(ClmmError::MathOverflow));
        assert_eq!(u256_to_u128(U256::from(42u128)).unwrap(), 42);
    }
}
