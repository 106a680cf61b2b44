//! Bit operations over multi-word bitmaps.
//!
//! Every tick array bitmap in the program is an array of `u64` words with
//! bit 0 of word 0 as the lowest position. Scans use the native
//! `trailing_zeros`/`leading_zeros` instructions one word at a time.

use crate::errors::{ClmmError, CoreResult};

/// Number of bits in a u64 word
pub const WORD_BITS: usize = 64;

/// Calculate word and bit indices for a given bit position
#[inline(always)]
pub fn get_word_and_bit_index(bit_position: usize) -> (usize, usize) {
    (bit_position / WORD_BITS, bit_position % WORD_BITS)
}

/// Total addressable bits in `bitmap`
#[inline(always)]
pub fn bit_len(bitmap: &[u64]) -> usize {
    bitmap.len() * WORD_BITS
}

/// Set a bit in a multi-word bitmap
pub fn set_bit(bitmap: &mut [u64], bit_position: usize) -> CoreResult<()> {
    let (word_index, bit_index) = get_word_and_bit_index(bit_position);
    let word = bitmap
        .get_mut(word_index)
        .ok_or_else(|| ClmmError::OutOfRange(format!("bit {bit_position} beyond bitmap")))?;
    *word |= 1u64 << bit_index;
    Ok(())
}

/// Clear a bit in a multi-word bitmap
pub fn clear_bit(bitmap: &mut [u64], bit_position: usize) -> CoreResult<()> {
    let (word_index, bit_index) = get_word_and_bit_index(bit_position);
    let word = bitmap
        .get_mut(word_index)
        .ok_or_else(|| ClmmError::OutOfRange(format!("bit {bit_position} beyond bitmap")))?;
    *word &= !(1u64 << bit_index);
    Ok(())
}

/// Check if a bit is set; positions past the end read as unset
#[inline(always)]
pub fn is_bit_set(bitmap: &[u64], bit_position: usize) -> bool {
    let (word_index, bit_index) = get_word_and_bit_index(bit_position);
    bitmap
        .get(word_index)
        .is_some_and(|word| word & (1u64 << bit_index) != 0)
}

/// Lowest set bit at or above `start_position`
pub fn next_set_bit(bitmap: &[u64], start_position: usize) -> Option<usize> {
    let (mut word_index, bit_index) = get_word_and_bit_index(start_position);
    if word_index >= bitmap.len() {
        return None;
    }

    // Mask off bits below the start in the first word
    let masked = bitmap[word_index] & (u64::MAX << bit_index);
    if masked != 0 {
        return Some(word_index * WORD_BITS + masked.trailing_zeros() as usize);
    }

    word_index += 1;
    while word_index < bitmap.len() {
        if bitmap[word_index] != 0 {
            return Some(word_index * WORD_BITS + bitmap[word_index].trailing_zeros() as usize);
        }
        word_index += 1;
    }

    None
}

/// Highest set bit at or below `start_position`
///
/// A start past the end of the bitmap searches from the last bit.
pub fn prev_set_bit(bitmap: &[u64], start_position: usize) -> Option<usize> {
    if bitmap.is_empty() {
        return None;
    }

    let start_position = start_position.min(bit_len(bitmap) - 1);
    let (mut word_index, bit_index) = get_word_and_bit_index(start_position);

    // Mask off bits above the start in the first word
    let mask = if bit_index == WORD_BITS - 1 {
        u64::MAX
    } else {
        (1u64 << (bit_index + 1)) - 1
    };
    let masked = bitmap[word_index] & mask;
    if masked != 0 {
        return Some(word_index * WORD_BITS + 63 - masked.leading_zeros() as usize);
    }

    while word_index > 0 {
        word_index -= 1;
        if bitmap[word_index] != 0 {
            return Some(word_index * WORD_BITS + 63 - bitmap[word_index].leading_zeros() as usize);
        }
    }

    None
}

/// Count total set bits in a multi-word bitmap
pub fn count_set_bits(bitmap: &[u64]) -> u32 {
    bitmap.iter().map(|word| word.count_ones()).sum()
}
