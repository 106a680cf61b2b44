//! # Default Tick Array Bitmap
//!
//! The pool account carries 1024 bits, one per tick array whose start index
//! lies in `[-512, 512)` arrays around zero. Bit `i` stands for the array
//! starting at `(i - 512) * tick_count`.

use crate::constants::{MAX_TICK, MIN_TICK, TICK_ARRAY_BITMAP_SIZE, TICK_ARRAY_SIZE};
use crate::errors::{ClmmError, CoreResult};
use crate::tick::bitmap::{is_bit_set, next_set_bit, prev_set_bit};
use crate::tick::tick_array::{is_valid_start_index, tick_array_start_index, tick_count};

/// Half-open tick interval `[lower, upper)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct TickBoundary {
    pub lower: i32,
    pub upper: i32,
}

/// Ticks covered by one 512-bit bitmap for this spacing
#[inline]
pub fn max_tick_in_tickarray_bitmap(tick_spacing: u16) -> i32 {
    tick_spacing as i32 * TICK_ARRAY_SIZE * TICK_ARRAY_BITMAP_SIZE
}

/// Boundary of the 512-bit bitmap that owns `tick_array_start_index`
pub fn bitmap_tick_boundary(tick_array_start_index: i32, tick_spacing: u16) -> TickBoundary {
    let ticks_in_one_bitmap = max_tick_in_tickarray_bitmap(tick_spacing);
    let abs_start = tick_array_start_index.abs();
    let mut m = abs_start / ticks_in_one_bitmap;
    if tick_array_start_index < 0 && abs_start % ticks_in_one_bitmap != 0 {
        m += 1;
    }

    let min_value = ticks_in_one_bitmap * m;
    if tick_array_start_index < 0 {
        TickBoundary {
            lower: -min_value,
            upper: -min_value + ticks_in_one_bitmap,
        }
    } else {
        TickBoundary {
            lower: min_value,
            upper: min_value + ticks_in_one_bitmap,
        }
    }
}

/// Start-index range of the default bitmap, clamped to the protocol bounds
pub fn tick_array_range(tick_spacing: u16) -> TickBoundary {
    let mut upper = max_tick_in_tickarray_bitmap(tick_spacing);
    let mut lower = -upper;

    if upper > MAX_TICK {
        upper = tick_array_start_index(MAX_TICK, tick_spacing) + tick_count(tick_spacing);
    }
    if lower < MIN_TICK {
        lower = tick_array_start_index(MIN_TICK, tick_spacing);
    }
    TickBoundary { lower, upper }
}

/// Inclusive range of ticks a user may pick as position bounds
pub fn tick_range(tick_spacing: u16) -> TickBoundary {
    let spacing = tick_spacing as i32;
    TickBoundary {
        lower: -(MIN_TICK.abs() / spacing) * spacing,
        upper: (MAX_TICK / spacing) * spacing,
    }
}

/// Whether any of the arrays holding `ticks` lies outside the default bitmap
pub fn is_overflow_default_tickarray_bitmap(tick_spacing: u16, ticks: &[i32]) -> bool {
    let boundary = tick_array_range(tick_spacing);
    ticks.iter().any(|&tick| {
        let start = tick_array_start_index(tick, tick_spacing);
        start >= boundary.upper || start < boundary.lower
    })
}

/// Bit of the default bitmap holding the array that contains `tick`
#[inline]
fn default_bit_position(tick: i32, tick_spacing: u16) -> i32 {
    tick.div_euclid(tick_count(tick_spacing)) + TICK_ARRAY_BITMAP_SIZE
}

/// Whether the array containing `tick` is marked, and its start index
pub fn check_tick_array_is_initialized(bitmap: &[u64], tick: i32, tick_spacing: u16) -> (bool, i32) {
    let bit_pos = default_bit_position(tick, tick_spacing).abs();
    let start_index = (bit_pos - TICK_ARRAY_BITMAP_SIZE) * tick_count(tick_spacing);
    (is_bit_set(bitmap, bit_pos as usize), start_index)
}

/// Next marked array after `last_tick_array_start_index`, searching the default bitmap
///
/// Returns `(true, start)` on a hit. On a miss the second value is where a
/// search of the extension should resume: the unchanged start when the
/// neighbour already leaves the default range, else the outermost default
/// array in the trade direction.
pub fn next_initialized_tick_array_start_index(
    bitmap: &[u64],
    last_tick_array_start_index: i32,
    tick_spacing: u16,
    zero_for_one: bool,
) -> CoreResult<(bool, i32)> {
    if !is_valid_start_index(last_tick_array_start_index, tick_spacing) {
        return Err(ClmmError::InvalidTickArrayStartIndex(last_tick_array_start_index));
    }

    let tick_boundary = max_tick_in_tickarray_bitmap(tick_spacing);
    let multiplier = tick_count(tick_spacing);
    let next_start_index = if zero_for_one {
        last_tick_array_start_index - multiplier
    } else {
        last_tick_array_start_index + multiplier
    };

    if next_start_index < -tick_boundary || next_start_index >= tick_boundary {
        return Ok((false, last_tick_array_start_index));
    }

    let bit_pos = default_bit_position(next_start_index, tick_spacing) as usize;

    if zero_for_one {
        match prev_set_bit(bitmap, bit_pos) {
            Some(bit) => Ok((true, (bit as i32 - TICK_ARRAY_BITMAP_SIZE) * multiplier)),
            None => Ok((false, -tick_boundary)),
        }
    } else {
        match next_set_bit(bitmap, bit_pos) {
            Some(bit) => Ok((true, (bit as i32 - TICK_ARRAY_BITMAP_SIZE) * multiplier)),
            None => Ok((false, tick_boundary - multiplier)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_BITMAP_WORDS;
    use crate::tick::bitmap::set_bit;

    fn bitmap_with(start_indices: &[i32], tick_spacing: u16) -> [u64; DEFAULT_BITMAP_WORDS] {
        let mut bitmap = [0u64; DEFAULT_BITMAP_WORDS];
        for &start in start_indices {
            let bit = default_bit_position(start, tick_spacing) as usize;
            set_bit(&mut bitmap, bit).unwrap();
        }
        bitmap
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(max_tick_in_tickarray_bitmap(1), 30_720);
        assert_eq!(
            bitmap_tick_boundary(0, 1),
            TickBoundary { lower: 0, upper: 30_720 }
        );
        assert_eq!(
            bitmap_tick_boundary(-60, 1),
            TickBoundary { lower: -30_720, upper: 0 }
        );
        assert_eq!(
            bitmap_tick_boundary(-30_720, 1),
            TickBoundary { lower: -30_720, upper: 0 }
        );
        assert_eq!(
            bitmap_tick_boundary(30_720, 1),
            TickBoundary { lower: 30_720, upper: 61_440 }
        );
    }

    #[test]
    fn test_ranges_clamp_to_protocol_bounds() {
        assert_eq!(
            tick_array_range(1),
            TickBoundary { lower: -30_720, upper: 30_720 }
        );
        let wide = tick_array_range(60);
        assert_eq!(wide.lower, tick_array_start_index(MIN_TICK, 60));
        assert_eq!(wide.upper, tick_array_start_index(MAX_TICK, 60) + 3_600);

        let ui = tick_range(60);
        assert_eq!(ui, TickBoundary { lower: -443_580, upper: 443_580 });
    }

    #[test]
    fn test_overflow_default_bitmap() {
        assert!(!is_overflow_default_tickarray_bitmap(1, &[0, -30_720, 30_719]));
        assert!(is_overflow_default_tickarray_bitmap(1, &[30_720]));
        assert!(is_overflow_default_tickarray_bitmap(1, &[-30_721]));
        assert!(!is_overflow_default_tickarray_bitmap(60, &[MIN_TICK, MAX_TICK]));
    }

    #[test]
    fn test_check_initialized() {
        let bitmap = bitmap_with(&[-600, 1200], 10);
        assert_eq!(check_tick_array_is_initialized(&bitmap, -1, 10), (true, -600));
        assert_eq!(check_tick_array_is_initialized(&bitmap, 1250, 10), (true, 1200));
        assert_eq!(check_tick_array_is_initialized(&bitmap, 0, 10), (false, 0));
    }

    #[test]
    fn test_next_in_both_directions() {
        let bitmap = bitmap_with(&[-1200, 0, 1800], 10);

        assert_eq!(
            next_initialized_tick_array_start_index(&bitmap, 0, 10, false).unwrap(),
            (true, 1800)
        );
        assert_eq!(
            next_initialized_tick_array_start_index(&bitmap, 0, 10, true).unwrap(),
            (true, -1200)
        );
        // The neighbour itself counts
        assert_eq!(
            next_initialized_tick_array_start_index(&bitmap, 600, 10, true).unwrap(),
            (true, 0)
        );
    }

    #[test]
    fn test_next_misses_report_resume_point() {
        let bitmap = bitmap_with(&[0], 1);
        assert_eq!(
            next_initialized_tick_array_start_index(&bitmap, 0, 1, false).unwrap(),
            (false, 30_720 - 60)
        );
        assert_eq!(
            next_initialized_tick_array_start_index(&bitmap, 0, 1, true).unwrap(),
            (false, -30_720)
        );
        // Already at the edge of the default range
        assert_eq!(
            next_initialized_tick_array_start_index(&bitmap, 30_720 - 60, 1, false).unwrap(),
            (false, 30_720 - 60)
        );
        assert_eq!(
            next_initialized_tick_array_start_index(&bitmap, 30, 1, false),
            Err(ClmmError::InvalidTickArrayStartIndex(30))
        );
    }
}
