//! Tick-by-tick swap simulation.
//!
//! Replays the program's swap loop against a pool snapshot and a set of
//! prefetched tick arrays: step to the next initialized tick, cross it,
//! repeat until the amount is used up or the price limit is reached.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace, warn};

use crate::constants::{MAX_SQRT_PRICE_X64, MAX_TICK, MIN_SQRT_PRICE_X64, MIN_TICK};
use crate::errors::{ClmmError, CoreResult};
use crate::math::liquidity_math::add_delta;
use crate::math::safe_math::{safe_add_i128, safe_add_u128, safe_cast_u128_to_i128, safe_sub_i128};
use crate::math::tick_math::{get_sqrt_price_at_tick, get_tick_at_sqrt_price};
use crate::swap::step::compute_swap_step;
use crate::tick::{tick_count, TickArrayBitmapExtension, TickArrayState, TickState};
use crate::types::PoolSnapshot;

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

/// Lookup of decoded tick arrays by start index
pub trait TickArraySource {
    fn tick_array(&self, start_index: i32) -> Option<&TickArrayState>;
}

impl TickArraySource for HashMap<i32, TickArrayState> {
    fn tick_array(&self, start_index: i32) -> Option<&TickArrayState> {
        self.get(&start_index)
    }
}

impl TickArraySource for BTreeMap<i32, TickArrayState> {
    fn tick_array(&self, start_index: i32) -> Option<&TickArrayState> {
        self.get(&start_index)
    }
}

impl TickArraySource for [TickArrayState] {
    fn tick_array(&self, start_index: i32) -> Option<&TickArrayState> {
        self.iter().find(|array| array.start_tick_index == start_index)
    }
}

/// Default price limit one unit inside the protocol bound for the direction
pub fn default_sqrt_price_limit(zero_for_one: bool) -> u128 {
    if zero_for_one {
        MIN_SQRT_PRICE_X64 + 1
    } else {
        MAX_SQRT_PRICE_X64 - 1
    }
}

/// Parameters of one simulated swap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct SwapParams {
    /// Trade toward lower prices, selling token A
    pub zero_for_one: bool,
    /// Positive for exact input, negative for exact output
    pub amount_specified: i128,
    /// `None` uses the default limit for the direction
    pub sqrt_price_limit_x64: Option<u128>,
    /// Return a partial result instead of failing when liquidity runs out
    pub catch_liquidity_insufficient: bool,
    /// Optional cap on loop iterations
    pub max_steps: Option<usize>,
}

/// Outcome of a simulated swap
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct SwapResult {
    /// The whole specified amount was matched
    ///
    /// False when a price limit stops the swap early, with the unmatched part
    /// left in `amount_specified_remaining`.
    pub all_trade: bool,
    pub amount_specified_remaining: i128,
    /// Counter amount: negative output for exact input, positive input for exact output
    pub amount_calculated: i128,
    pub fee_amount: u128,
    pub sqrt_price_x64: u128,
    pub liquidity: u128,
    pub tick_current: i32,
    /// Start indices of the tick arrays the trade touches, in visiting order
    pub tick_arrays: Vec<i32>,
    pub steps: usize,
}

/// Running state of the swap loop
#[derive(Debug)]
struct SwapState {
    amount_specified_remaining: i128,
    amount_calculated: i128,
    sqrt_price_x64: u128,
    tick: i32,
    liquidity: u128,
    fee_amount: u128,
    tick_arrays: Vec<i32>,
    steps: usize,
}

impl SwapState {
    fn into_result(self, all_trade: bool) -> SwapResult {
        SwapResult {
            all_trade,
            amount_specified_remaining: self.amount_specified_remaining,
            amount_calculated: self.amount_calculated,
            fee_amount: self.fee_amount,
            sqrt_price_x64: self.sqrt_price_x64,
            liquidity: self.liquidity,
            tick_current: self.tick,
            tick_arrays: self.tick_arrays,
            steps: self.steps,
        }
    }
}

fn validate_price_limit(
    sqrt_price_limit_x64: u128,
    sqrt_price_current_x64: u128,
    zero_for_one: bool,
) -> CoreResult<()> {
    if zero_for_one {
        if sqrt_price_limit_x64 < MIN_SQRT_PRICE_X64 {
            return Err(ClmmError::OutOfRange(format!(
                "price limit {sqrt_price_limit_x64} below minimum"
            )));
        }
        if sqrt_price_limit_x64 >= sqrt_price_current_x64 {
            return Err(ClmmError::InvalidOrdering(format!(
                "price limit {sqrt_price_limit_x64} must be below current {sqrt_price_current_x64}"
            )));
        }
    } else {
        if sqrt_price_limit_x64 > MAX_SQRT_PRICE_X64 {
            return Err(ClmmError::OutOfRange(format!(
                "price limit {sqrt_price_limit_x64} above maximum"
            )));
        }
        if sqrt_price_limit_x64 <= sqrt_price_current_x64 {
            return Err(ClmmError::InvalidOrdering(format!(
                "price limit {sqrt_price_limit_x64} must be above current {sqrt_price_current_x64}"
            )));
        }
    }
    Ok(())
}

/// Simulate a swap against `pool`, starting in the array at `first_tick_array_start_index`
///
/// Every array the loop steps into must be present in `tick_arrays`;
/// a gap is reported as `MissingTickArrayData` so the caller can fetch it
/// and retry.
pub fn swap_compute<S: TickArraySource + ?Sized>(
    pool: &PoolSnapshot,
    extension: &TickArrayBitmapExtension,
    tick_arrays: &S,
    first_tick_array_start_index: i32,
    params: &SwapParams,
) -> CoreResult<SwapResult> {
    if params.amount_specified == 0 {
        return Err(ClmmError::ZeroAmount);
    }
    pool.validate()?;

    let zero_for_one = params.zero_for_one;
    let sqrt_price_limit_x64 = params
        .sqrt_price_limit_x64
        .unwrap_or_else(|| default_sqrt_price_limit(zero_for_one));
    validate_price_limit(sqrt_price_limit_x64, pool.sqrt_price_x64, zero_for_one)?;

    let base_input = params.amount_specified > 0;
    let tick_spacing = pool.tick_spacing;
    let index = pool.tick_array_index(extension)?;

    let mut tick_array_start_index = first_tick_array_start_index;
    let mut last_saved_start_index = first_tick_array_start_index;
    let mut tick_array_current = tick_arrays
        .tick_array(first_tick_array_start_index)
        .ok_or(ClmmError::MissingTickArrayData {
            start_index: first_tick_array_start_index,
        })?;

    let mut state = SwapState {
        amount_specified_remaining: params.amount_specified,
        amount_calculated: 0,
        sqrt_price_x64: pool.sqrt_price_x64,
        tick: if pool.tick_current > first_tick_array_start_index {
            (first_tick_array_start_index + tick_count(tick_spacing) - 1).min(pool.tick_current)
        } else {
            first_tick_array_start_index
        },
        liquidity: pool.liquidity,
        fee_amount: 0,
        tick_arrays: vec![first_tick_array_start_index],
        steps: 0,
    };

    debug!(
        "Swap start: zero_for_one={} amount={} tick={} array={}",
        zero_for_one, params.amount_specified, state.tick, first_tick_array_start_index
    );

    // Upward scans may start on the current slot when the tick sits exactly
    // on the array start
    let mut include_current = !zero_for_one && tick_array_current.start_tick_index == state.tick;

    while state.amount_specified_remaining != 0 && state.sqrt_price_x64 != sqrt_price_limit_x64 {
        if params.max_steps.is_some_and(|max| state.steps >= max) {
            debug!("Swap step cap of {} reached", state.steps);
            return liquidity_exhausted(state, params.catch_liquidity_insufficient);
        }

        let sqrt_price_start_x64 = state.sqrt_price_x64;

        let next_tick: TickState = match tick_array_current
            .next_initialized_tick(state.tick, tick_spacing, zero_for_one, include_current)
        {
            Some(tick) => *tick,
            None => {
                // Search from the array just left, not from the tick: a downward
                // cross leaves the tick one below the array start
                let Some(next_start_index) = index
                    .next_initialized_tick_array_start_index(tick_array_start_index, zero_for_one)?
                else {
                    return liquidity_exhausted(state, params.catch_liquidity_insufficient);
                };

                tick_array_start_index = next_start_index;
                tick_array_current = tick_arrays.tick_array(next_start_index).ok_or(
                    ClmmError::MissingTickArrayData {
                        start_index: next_start_index,
                    },
                )?;
                debug!("Swap moved to tick array {}", next_start_index);

                if last_saved_start_index != tick_array_start_index {
                    state.tick_arrays.push(tick_array_start_index);
                    last_saved_start_index = tick_array_start_index;
                }

                *tick_array_current.first_initialized_tick(zero_for_one)?
            }
        };

        let tick_next = next_tick.tick.clamp(MIN_TICK, MAX_TICK);
        let sqrt_price_next_x64 = get_sqrt_price_at_tick(tick_next)?;

        let target_price = if (zero_for_one && sqrt_price_next_x64 < sqrt_price_limit_x64)
            || (!zero_for_one && sqrt_price_next_x64 > sqrt_price_limit_x64)
        {
            sqrt_price_limit_x64
        } else {
            sqrt_price_next_x64
        };

        let step = compute_swap_step(
            state.sqrt_price_x64,
            target_price,
            state.liquidity,
            state.amount_specified_remaining,
            pool.fee_rate,
            zero_for_one,
        )?;
        state.sqrt_price_x64 = step.sqrt_price_next_x64;
        state.fee_amount = safe_add_u128(state.fee_amount, step.fee_amount)?;

        let amount_in_with_fee = safe_cast_u128_to_i128(safe_add_u128(step.amount_in, step.fee_amount)?)?;
        let amount_out = safe_cast_u128_to_i128(step.amount_out)?;
        if base_input {
            state.amount_specified_remaining =
                safe_sub_i128(state.amount_specified_remaining, amount_in_with_fee)?;
            state.amount_calculated = safe_sub_i128(state.amount_calculated, amount_out)?;
        } else {
            state.amount_specified_remaining =
                safe_add_i128(state.amount_specified_remaining, amount_out)?;
            state.amount_calculated = safe_add_i128(state.amount_calculated, amount_in_with_fee)?;
        }

        trace!(
            target_price,
            amount_in = step.amount_in,
            amount_out = step.amount_out,
            fee = step.fee_amount,
            tick_next,
            "swap step"
        );

        if state.sqrt_price_x64 == sqrt_price_next_x64 {
            if next_tick.is_initialized() {
                let liquidity_net = if zero_for_one {
                    next_tick
                        .liquidity_net
                        .checked_neg()
                        .ok_or(ClmmError::MathOverflow)?
                } else {
                    next_tick.liquidity_net
                };
                state.liquidity = add_delta(state.liquidity, liquidity_net)?;
                trace!(tick = tick_next, liquidity = state.liquidity, "crossed tick");
            }

            include_current = tick_next != state.tick
                && !zero_for_one
                && tick_array_current.start_tick_index == tick_next;
            state.tick = if zero_for_one { tick_next - 1 } else { tick_next };
        } else if state.sqrt_price_x64 != sqrt_price_start_x64 {
            let tick = get_tick_at_sqrt_price(state.sqrt_price_x64)?;
            include_current =
                tick != state.tick && !zero_for_one && tick_array_current.start_tick_index == tick;
            state.tick = tick;
        }

        state.steps += 1;
    }

    // Leave the program one array of headroom past the final tick
    if let Some(next_start_index) = index.next_initialized_tick_array_from_tick(state.tick, zero_for_one) {
        if last_saved_start_index != next_start_index {
            state.tick_arrays.push(next_start_index);
        }
    }

    let all_trade = state.amount_specified_remaining == 0;
    debug!(
        "Swap done: steps={} tick={} remaining={} calculated={} fee={}",
        state.steps,
        state.tick,
        state.amount_specified_remaining,
        state.amount_calculated,
        state.fee_amount
    );
    Ok(state.into_result(all_trade))
}

fn liquidity_exhausted(state: SwapState, catch_liquidity_insufficient: bool) -> CoreResult<SwapResult> {
    if catch_liquidity_insufficient {
        warn!(
            "Liquidity exhausted at tick {} with {} unmatched, returning partial result",
            state.tick, state.amount_specified_remaining
        );
        Ok(state.into_result(false))
    } else {
        Err(ClmmError::LiquidityInsufficient)
    }
}
