//! # Safe Math Operations
//!
//! Overflow-checked arithmetic for the running totals of the swap loop.

use crate::errors::{ClmmError, CoreResult};

/// Macro to generate safe arithmetic functions
macro_rules! safe_arith {
    // Fallible conversions between integer widths
    (@cast $fn_name:ident, $from_type:ty, $to_type:ty) => {
        /// Checked conversion returning `MathOverflow` when out of range
        pub fn $fn_name(value: $from_type) -> CoreResult<$to_type> {
            <$to_type>::try_from(value).map_err(|_| ClmmError::MathOverflow)
        }
    };

    // Binary operations with checked methods
    ($fn_name:ident, $type:ty, $checked_method:ident, $error:expr) => {
        /// Checked arithmetic returning a core error on overflow
        pub fn $fn_name(a: $type, b: $type) -> CoreResult<$type> {
            a.$checked_method(b).ok_or($error)
        }
    };
}

safe_arith!(safe_add_u128, u128, checked_add, ClmmError::MathOverflow);

safe_arith!(safe_add_i128, i128, checked_add, ClmmError::MathOverflow);
safe_arith!(safe_sub_i128, i128, checked_sub, ClmmError::MathUnderflow);

safe_arith!(@cast safe_cast_u128_to_i128, u128, i128);
safe_arith!(@cast safe_cast_u128_to_u64, u128, u64);
