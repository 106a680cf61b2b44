//! # Tick Array Bitmap Extension
//!
//! Pools with small tick spacings can place tick arrays beyond the 1024 the
//! default bitmap tracks. The extension account adds 14 bitmaps of 512 bits
//! on each side; bitmap `k` covers start indices `[(k+1)·B, (k+2)·B)` on the
//! positive side and the mirror interval on the negative side, where `B` is
//! the tick span of one bitmap.

use crate::constants::{
    EXTENSION_BITMAP_WORDS, EXTENSION_TICKARRAY_BITMAP_SIZE, MAX_TICK, MIN_TICK,
    TICK_ARRAY_BITMAP_SIZE,
};
use crate::errors::{ClmmError, CoreResult};
use crate::tick::bitmap::{is_bit_set, next_set_bit, prev_set_bit};
use crate::tick::tick_array::{is_valid_start_index, tick_count};
use crate::tick::tick_array_bitmap::{bitmap_tick_boundary, max_tick_in_tickarray_bitmap, TickBoundary};

/// One 512-bit extension bitmap
pub type ExtensionBitmap = [u64; EXTENSION_BITMAP_WORDS];

/// Decoded tick array bitmap extension account
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct TickArrayBitmapExtension {
    pub positive_tick_array_bitmap: [ExtensionBitmap; EXTENSION_TICKARRAY_BITMAP_SIZE],
    pub negative_tick_array_bitmap: [ExtensionBitmap; EXTENSION_TICKARRAY_BITMAP_SIZE],
}

/// Range the extension does not cover, i.e. the default bitmap's range
///
/// Fails for spacings whose default bitmap already reaches the protocol
/// bounds; such pools have no extension to search.
pub fn extension_tick_boundary(tick_spacing: u16) -> CoreResult<TickBoundary> {
    let positive_tick_boundary = max_tick_in_tickarray_bitmap(tick_spacing);
    let negative_tick_boundary = -positive_tick_boundary;

    if MAX_TICK <= positive_tick_boundary || negative_tick_boundary <= MIN_TICK {
        return Err(ClmmError::InvalidTickSpacing(tick_spacing));
    }

    Ok(TickBoundary {
        lower: negative_tick_boundary,
        upper: positive_tick_boundary,
    })
}

/// Index of the extension bitmap holding `tick_array_start_index`
pub fn bitmap_offset(tick_array_start_index: i32, tick_spacing: u16) -> CoreResult<usize> {
    if !is_valid_start_index(tick_array_start_index, tick_spacing) {
        return Err(ClmmError::InvalidTickArrayStartIndex(tick_array_start_index));
    }

    let boundary = extension_tick_boundary(tick_spacing)?;
    if tick_array_start_index >= boundary.lower && tick_array_start_index < boundary.upper {
        return Err(ClmmError::InvalidTickArrayBoundary(tick_array_start_index));
    }

    let ticks_in_one_bitmap = max_tick_in_tickarray_bitmap(tick_spacing);
    let abs_start = tick_array_start_index.abs();
    let mut offset = abs_start / ticks_in_one_bitmap - 1;
    if tick_array_start_index < 0 && abs_start % ticks_in_one_bitmap == 0 {
        offset -= 1;
    }

    let offset = offset as usize;
    if offset >= EXTENSION_TICKARRAY_BITMAP_SIZE {
        return Err(ClmmError::InvalidTickArrayBoundary(tick_array_start_index));
    }
    Ok(offset)
}

/// Bit of `tick_array_start_index` inside its own 512-bit bitmap
pub fn tick_array_offset_in_bitmap(tick_array_start_index: i32, tick_spacing: u16) -> usize {
    let m = tick_array_start_index.abs() % max_tick_in_tickarray_bitmap(tick_spacing);
    let mut offset = m / tick_count(tick_spacing);
    if tick_array_start_index < 0 && m != 0 {
        offset = TICK_ARRAY_BITMAP_SIZE - offset;
    }
    offset as usize
}

/// Search one 512-bit bitmap from `next_tick_array_start_index` inclusive
///
/// On a miss returns the edge of this bitmap in the trade direction, which
/// is where the following bitmap's search resumes.
pub fn next_initialized_tick_array_in_bitmap(
    tick_array_bitmap: &ExtensionBitmap,
    next_tick_array_start_index: i32,
    tick_spacing: u16,
    zero_for_one: bool,
) -> (bool, i32) {
    let boundary = bitmap_tick_boundary(next_tick_array_start_index, tick_spacing);
    let offset = tick_array_offset_in_bitmap(next_tick_array_start_index, tick_spacing);
    let multiplier = tick_count(tick_spacing);

    if zero_for_one {
        match prev_set_bit(tick_array_bitmap, offset) {
            Some(bit) => (
                true,
                next_tick_array_start_index - (offset - bit) as i32 * multiplier,
            ),
            None => (false, boundary.lower),
        }
    } else {
        match next_set_bit(tick_array_bitmap, offset) {
            Some(bit) => (
                true,
                next_tick_array_start_index + (bit - offset) as i32 * multiplier,
            ),
            None => (false, boundary.upper - multiplier),
        }
    }
}

impl TickArrayBitmapExtension {
    /// Bitmap holding `tick_array_start_index`, with its offset
    pub fn get_bitmap(
        &self,
        tick_array_start_index: i32,
        tick_spacing: u16,
    ) -> CoreResult<(usize, &ExtensionBitmap)> {
        let offset = bitmap_offset(tick_array_start_index, tick_spacing)?;
        let bitmap = if tick_array_start_index < 0 {
            &self.negative_tick_array_bitmap[offset]
        } else {
            &self.positive_tick_array_bitmap[offset]
        };
        Ok((offset, bitmap))
    }

    fn get_bitmap_mut(
        &mut self,
        tick_array_start_index: i32,
        tick_spacing: u16,
    ) -> CoreResult<&mut ExtensionBitmap> {
        let offset = bitmap_offset(tick_array_start_index, tick_spacing)?;
        Ok(if tick_array_start_index < 0 {
            &mut self.negative_tick_array_bitmap[offset]
        } else {
            &mut self.positive_tick_array_bitmap[offset]
        })
    }

    /// Mark or unmark an array outside the default range
    pub fn flip_tick_array_bit(
        &mut self,
        tick_array_start_index: i32,
        tick_spacing: u16,
    ) -> CoreResult<()> {
        let bit = tick_array_offset_in_bitmap(tick_array_start_index, tick_spacing);
        let bitmap = self.get_bitmap_mut(tick_array_start_index, tick_spacing)?;
        bitmap[bit / 64] ^= 1u64 << (bit % 64);
        Ok(())
    }

    pub fn check_tick_array_is_initialized(
        &self,
        tick_array_start_index: i32,
        tick_spacing: u16,
    ) -> CoreResult<(bool, i32)> {
        let (_, bitmap) = self.get_bitmap(tick_array_start_index, tick_spacing)?;
        let bit = tick_array_offset_in_bitmap(tick_array_start_index, tick_spacing);
        Ok((is_bit_set(bitmap, bit), tick_array_start_index))
    }

    /// Next marked array after `last_tick_array_start_index`, within one bitmap
    pub fn next_initialized_tick_array_from_one_bitmap(
        &self,
        last_tick_array_start_index: i32,
        tick_spacing: u16,
        zero_for_one: bool,
    ) -> CoreResult<(bool, i32)> {
        let multiplier = tick_count(tick_spacing);
        let next_tick_array_start_index = if zero_for_one {
            last_tick_array_start_index - multiplier
        } else {
            last_tick_array_start_index + multiplier
        };

        let (_, bitmap) = self.get_bitmap(next_tick_array_start_index, tick_spacing)?;
        Ok(next_initialized_tick_array_in_bitmap(
            bitmap,
            next_tick_array_start_index,
            tick_spacing,
            zero_for_one,
        ))
    }
}
