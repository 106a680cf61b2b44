//! # Tick Array Index
//!
//! Presence index over every tick array of a pool: the default bitmap from
//! the pool account merged with the extension account. Searches first walk
//! the default bitmap and then step into the extension one 512-array bitmap
//! at a time.
//!
//! The merged view lays the 30 bitmaps end to end, from the most negative
//! extension bitmap to the most positive, so array index `i` maps to merged
//! bit `i + 7680`.

use tracing::trace;

use crate::constants::{
    DEFAULT_BITMAP_WORDS, EXTENSION_BITMAP_WORDS, EXTENSION_TICKARRAY_BITMAP_SIZE,
    MAX_TICK, MERGED_BITMAP_HALF_SPAN, MIN_TICK, TICK_ARRAY_BITMAP_SIZE,
};
use crate::errors::{ClmmError, CoreResult};
use crate::tick::bitmap::{next_set_bit, prev_set_bit};
use crate::tick::bitmap_extension::TickArrayBitmapExtension;
use crate::tick::tick_array::{is_valid_start_index, tick_array_start_index, tick_count};
use crate::tick::tick_array_bitmap::{
    check_tick_array_is_initialized, is_overflow_default_tickarray_bitmap,
    next_initialized_tick_array_start_index,
};

const MERGED_BITMAP_WORDS: usize =
    DEFAULT_BITMAP_WORDS + 2 * EXTENSION_TICKARRAY_BITMAP_SIZE * EXTENSION_BITMAP_WORDS;

/// Read-only view over a pool's default bitmap and its extension
#[derive(Debug, Clone, Copy)]
pub struct TickArrayIndex<'a> {
    pub tick_spacing: u16,
    pub tick_array_bitmap: &'a [u64; DEFAULT_BITMAP_WORDS],
    pub extension: &'a TickArrayBitmapExtension,
}

impl<'a> TickArrayIndex<'a> {
    pub fn new(
        tick_spacing: u16,
        tick_array_bitmap: &'a [u64; DEFAULT_BITMAP_WORDS],
        extension: &'a TickArrayBitmapExtension,
    ) -> CoreResult<Self> {
        if tick_spacing == 0 {
            return Err(ClmmError::InvalidTickSpacing(tick_spacing));
        }
        Ok(Self {
            tick_spacing,
            tick_array_bitmap,
            extension,
        })
    }

    /// Whether the array starting at `tick_array_start_index` is marked in either bitmap
    pub fn is_tick_array_initialized(&self, tick_array_start_index: i32) -> CoreResult<bool> {
        if is_overflow_default_tickarray_bitmap(self.tick_spacing, &[tick_array_start_index]) {
            let (initialized, _) = self
                .extension
                .check_tick_array_is_initialized(tick_array_start_index, self.tick_spacing)?;
            Ok(initialized)
        } else {
            let (initialized, _) = check_tick_array_is_initialized(
                self.tick_array_bitmap,
                tick_array_start_index,
                self.tick_spacing,
            );
            Ok(initialized)
        }
    }

    /// Next marked array beyond the one containing `tick_current`
    ///
    /// Walks the default bitmap, then the extension, until a mark is found
    /// or the search leaves the protocol bounds. Pools whose spacing leaves
    /// no room for an extension stop at the edge of the default bitmap.
    pub fn next_initialized_tick_array_start_index(
        &self,
        tick_current: i32,
        zero_for_one: bool,
    ) -> CoreResult<Option<i32>> {
        let tick_spacing = self.tick_spacing;
        let mut last = tick_array_start_index(tick_current, tick_spacing);

        loop {
            let (found, start_index) = next_initialized_tick_array_start_index(
                self.tick_array_bitmap,
                last,
                tick_spacing,
                zero_for_one,
            )?;
            if found {
                return Ok(Some(start_index));
            }
            last = start_index;

            let next = if zero_for_one {
                last - tick_count(tick_spacing)
            } else {
                last + tick_count(tick_spacing)
            };
            if !is_valid_start_index(next, tick_spacing) {
                return Ok(None);
            }

            let (found, start_index) = match self
                .extension
                .next_initialized_tick_array_from_one_bitmap(last, tick_spacing, zero_for_one)
            {
                Ok(result) => result,
                Err(ClmmError::InvalidTickSpacing(_)) | Err(ClmmError::InvalidTickArrayBoundary(_)) => {
                    trace!(tick_spacing, last, "no extension bitmap beyond this start index");
                    return Ok(None);
                }
                Err(e) => return Err(e),
            };
            if found {
                return Ok(Some(start_index));
            }
            last = start_index;

            if !(MIN_TICK..=MAX_TICK).contains(&last) {
                return Ok(None);
            }
        }
    }

    /// Array the trade starts in: the current one when marked, else the next marked one
    pub fn first_initialized_tick_array(
        &self,
        tick_current: i32,
        zero_for_one: bool,
    ) -> CoreResult<Option<i32>> {
        let tick_spacing = self.tick_spacing;
        let (initialized, start_index) =
            if is_overflow_default_tickarray_bitmap(tick_spacing, &[tick_current]) {
                self.extension.check_tick_array_is_initialized(
                    tick_array_start_index(tick_current, tick_spacing),
                    tick_spacing,
                )?
            } else {
                check_tick_array_is_initialized(self.tick_array_bitmap, tick_current, tick_spacing)
            };

        if initialized {
            return Ok(Some(start_index));
        }
        self.next_initialized_tick_array_start_index(tick_current, zero_for_one)
    }

    // ------------------------------------------------------------------------
    // Merged view
    // ------------------------------------------------------------------------

    fn merged_bitmap(&self) -> [u64; MERGED_BITMAP_WORDS] {
        let mut merged = [0u64; MERGED_BITMAP_WORDS];
        let words = self
            .extension
            .negative_tick_array_bitmap
            .iter()
            .rev()
            .flatten()
            .chain(self.tick_array_bitmap.iter())
            .chain(self.extension.positive_tick_array_bitmap.iter().flatten());
        for (slot, word) in merged.iter_mut().zip(words) {
            *slot = *word;
        }
        merged
    }

    /// Up to `expected_count` marked arrays at or below array index `from`, nearest first
    fn search_low_bit_from_start(
        &self,
        merged: &[u64],
        from: i32,
        expected_count: usize,
    ) -> Vec<i32> {
        let mut result = Vec::new();
        let mut position = from.min(MERGED_BITMAP_HALF_SPAN - 1) + MERGED_BITMAP_HALF_SPAN;
        while position >= 0 && result.len() < expected_count {
            match prev_set_bit(merged, position as usize) {
                Some(bit) => {
                    result.push(bit as i32 - MERGED_BITMAP_HALF_SPAN);
                    position = bit as i32 - 1;
                }
                None => break,
            }
        }
        self.to_start_indices(result)
    }

    /// Up to `expected_count` marked arrays at or above array index `from`, nearest first
    fn search_high_bit_from_start(
        &self,
        merged: &[u64],
        from: i32,
        expected_count: usize,
    ) -> Vec<i32> {
        let mut result = Vec::new();
        let mut position = from.max(-MERGED_BITMAP_HALF_SPAN) + MERGED_BITMAP_HALF_SPAN;
        while position < 2 * MERGED_BITMAP_HALF_SPAN && result.len() < expected_count {
            match next_set_bit(merged, position as usize) {
                Some(bit) => {
                    result.push(bit as i32 - MERGED_BITMAP_HALF_SPAN);
                    position = bit as i32 + 1;
                }
                None => break,
            }
        }
        self.to_start_indices(result)
    }

    fn to_start_indices(&self, array_indices: Vec<i32>) -> Vec<i32> {
        let count = tick_count(self.tick_spacing);
        array_indices.into_iter().map(|index| index * count).collect()
    }

    /// Marked arrays around `tick_array_start_index`: up to `expected_count`
    /// below it (nearest first), then up to `expected_count` from it upward
    pub fn initialized_tick_array_in_range(
        &self,
        tick_array_start_index: i32,
        expected_count: usize,
    ) -> Vec<i32> {
        let merged = self.merged_bitmap();
        let offset = tick_array_start_index.div_euclid(tick_count(self.tick_spacing));

        let mut result = self.search_low_bit_from_start(&merged, offset - 1, expected_count);
        result.extend(self.search_high_bit_from_start(&merged, offset, expected_count));
        result
    }

    /// Every marked array, lowest first, capped at one bitmap's worth
    pub fn all_initialized_tick_array_start_indices(&self) -> Vec<i32> {
        let merged = self.merged_bitmap();
        self.search_high_bit_from_start(
            &merged,
            -MERGED_BITMAP_HALF_SPAN,
            TICK_ARRAY_BITMAP_SIZE as usize,
        )
    }

    /// Nearest marked array strictly beyond the one containing `tick`
    pub fn next_initialized_tick_array_from_tick(&self, tick: i32, zero_for_one: bool) -> Option<i32> {
        let merged = self.merged_bitmap();
        let current_offset = tick.div_euclid(tick_count(self.tick_spacing));
        let result = if zero_for_one {
            self.search_low_bit_from_start(&merged, current_offset - 1, 1)
        } else {
            self.search_high_bit_from_start(&merged, current_offset + 1, 1)
        };
        result.first().copied()
    }
}
