//! # Tick Arrays
//!
//! A tick array is the unit of on-chain storage: 60 consecutive ticks of one
//! pool, spaced `tick_spacing` apart, starting at a multiple of
//! `tick_spacing * 60`. The helpers here place ticks inside arrays and scan
//! a single array for liquidity.

use crate::constants::{MAX_TICK, MIN_TICK, REWARD_NUM, TICK_ARRAY_SIZE, TICK_ARRAY_SIZE_USIZE};
use crate::errors::{ClmmError, CoreResult};

// ============================================================================
// Tick Geometry
// ============================================================================

/// Number of ticks covered by one tick array
#[inline]
pub fn tick_count(tick_spacing: u16) -> i32 {
    TICK_ARRAY_SIZE * tick_spacing as i32
}

/// Signed index of the array containing `tick`, counted from the array at zero
#[inline]
pub fn tick_array_bit_index(tick: i32, tick_spacing: u16) -> i32 {
    tick.div_euclid(tick_count(tick_spacing))
}

/// Start index of the array containing `tick`
#[inline]
pub fn tick_array_start_index(tick: i32, tick_spacing: u16) -> i32 {
    tick_array_bit_index(tick, tick_spacing) * tick_count(tick_spacing)
}

/// Slot of an aligned tick inside its array
pub fn tick_offset_in_array(tick: i32, tick_spacing: u16) -> CoreResult<usize> {
    if tick_spacing == 0 {
        return Err(ClmmError::InvalidTickSpacing(tick_spacing));
    }
    if tick % tick_spacing as i32 != 0 {
        return Err(ClmmError::TickNotAligned { tick, tick_spacing });
    }
    let start = tick_array_start_index(tick, tick_spacing);
    Ok(((tick - start) / tick_spacing as i32) as usize)
}

pub fn is_tick_out_of_boundary(tick: i32) -> bool {
    !(MIN_TICK..=MAX_TICK).contains(&tick)
}

/// Whether `start_index` can start a tick array for this spacing
///
/// The array holding `MIN_TICK` starts below `MIN_TICK` and is the one
/// out-of-bounds start the program accepts.
pub fn is_valid_start_index(start_index: i32, tick_spacing: u16) -> bool {
    if is_tick_out_of_boundary(start_index) {
        if start_index > MAX_TICK {
            return false;
        }
        return start_index == tick_array_start_index(MIN_TICK, tick_spacing);
    }
    start_index % tick_count(tick_spacing) == 0
}

// ============================================================================
// Tick State
// ============================================================================

/// One slot of a tick array
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct TickState {
    pub tick: i32,
    /// Liquidity added when the price crosses this tick upward
    pub liquidity_net: i128,
    /// Total liquidity referencing this tick; nonzero iff initialized
    pub liquidity_gross: u128,
    pub fee_growth_outside_x64_a: u128,
    pub fee_growth_outside_x64_b: u128,
    pub reward_growths_outside_x64: [u128; REWARD_NUM],
}

impl TickState {
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.liquidity_gross > 0
    }
}

// ============================================================================
// Tick Array State
// ============================================================================

/// Decoded contents of one tick array account
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct TickArrayState {
    pub start_tick_index: i32,
    pub ticks: Vec<TickState>,
}

impl TickArrayState {
    /// Empty array with every slot labelled by its tick
    pub fn new(start_tick_index: i32, tick_spacing: u16) -> CoreResult<Self> {
        if tick_spacing == 0 {
            return Err(ClmmError::InvalidTickSpacing(tick_spacing));
        }
        if !is_valid_start_index(start_tick_index, tick_spacing) {
            return Err(ClmmError::InvalidTickArrayStartIndex(start_tick_index));
        }

        let ticks = (0..TICK_ARRAY_SIZE)
            .map(|i| TickState {
                tick: start_tick_index + i * tick_spacing as i32,
                ..TickState::default()
            })
            .collect();

        Ok(Self {
            start_tick_index,
            ticks,
        })
    }

    /// Check if a tick is within this array's range
    pub fn contains_tick(&self, tick: i32, tick_spacing: u16) -> bool {
        tick >= self.start_tick_index && tick < self.start_tick_index + tick_count(tick_spacing)
    }

    fn slot(&self, tick: i32, tick_spacing: u16) -> CoreResult<usize> {
        if !self.contains_tick(tick, tick_spacing) {
            return Err(ClmmError::OutOfRange(format!(
                "tick {tick} not in array {}",
                self.start_tick_index
            )));
        }
        let offset = tick_offset_in_array(tick, tick_spacing)?;
        if offset >= self.ticks.len() {
            return Err(ClmmError::OutOfRange(format!(
                "slot {offset} missing from array {}",
                self.start_tick_index
            )));
        }
        Ok(offset)
    }

    pub fn get_tick(&self, tick: i32, tick_spacing: u16) -> CoreResult<&TickState> {
        let offset = self.slot(tick, tick_spacing)?;
        Ok(&self.ticks[offset])
    }

    /// Store `state` in the slot named by `state.tick`
    pub fn set_tick(&mut self, state: TickState, tick_spacing: u16) -> CoreResult<()> {
        let offset = self.slot(state.tick, tick_spacing)?;
        self.ticks[offset] = state;
        Ok(())
    }

    /// Next initialized tick inside this array, scanning from `tick`
    ///
    /// Downward scans include the slot holding `tick`. Upward scans start
    /// one slot above it unless `include_current` is set. Returns `None`
    /// when `tick` belongs to another array.
    pub fn next_initialized_tick(
        &self,
        tick: i32,
        tick_spacing: u16,
        zero_for_one: bool,
        include_current: bool,
    ) -> Option<&TickState> {
        if tick_array_start_index(tick, tick_spacing) != self.start_tick_index {
            return None;
        }
        let offset = ((tick - self.start_tick_index) / tick_spacing as i32) as usize;

        if zero_for_one {
            self.ticks
                .iter()
                .take(offset + 1)
                .rev()
                .find(|state| state.is_initialized())
        } else {
            let from = if include_current { offset } else { offset + 1 };
            self.ticks
                .iter()
                .take(TICK_ARRAY_SIZE_USIZE)
                .skip(from)
                .find(|state| state.is_initialized())
        }
    }

    /// First initialized tick met when entering this array in a trade direction
    pub fn first_initialized_tick(&self, zero_for_one: bool) -> CoreResult<&TickState> {
        let found = if zero_for_one {
            self.ticks.iter().rev().find(|state| state.is_initialized())
        } else {
            self.ticks.iter().find(|state| state.is_initialized())
        };
        found.ok_or(ClmmError::EmptyTickArray {
            start_index: self.start_tick_index,
        })
    }

    pub fn initialized_ticks(&self) -> impl Iterator<Item = &TickState> + '_ {
        self.ticks.iter().filter(|state| state.is_initialized())
    }
}
