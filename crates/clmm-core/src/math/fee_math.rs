//! # Fee Math
//!
//! Fee and reward attribution through Q64 growth accumulators. Growth values
//! only ever increase on-chain and are allowed to wrap, so every difference
//! here is taken modulo 2^128.

use crate::constants::{Q64, REWARD_NUM};
use crate::errors::{ClmmError, CoreResult};
use crate::math::big_int::{mul_div_u128, Rounding};
use crate::math::liquidity_math::TokenAmounts;
use crate::tick::TickState;
use crate::types::PositionState;

/// Fee growth per unit of liquidity inside a position's range, both tokens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct FeeGrowthInside {
    pub fee_growth_inside_x64_a: u128,
    pub fee_growth_inside_x64_b: u128,
}

/// Subtract fee growth values with wraparound
#[inline]
pub fn sub_fee_growth(a: u128, b: u128) -> u128 {
    a.wrapping_sub(b)
}

/// Growth inside `[lower, upper)` from the global value and the two ticks' outside values
fn growth_inside(
    tick_current: i32,
    growth_global: u128,
    tick_lower: i32,
    outside_lower: u128,
    tick_upper: i32,
    outside_upper: u128,
) -> u128 {
    let growth_below = if tick_current >= tick_lower {
        outside_lower
    } else {
        sub_fee_growth(growth_global, outside_lower)
    };

    let growth_above = if tick_current < tick_upper {
        outside_upper
    } else {
        sub_fee_growth(growth_global, outside_upper)
    };

    sub_fee_growth(sub_fee_growth(growth_global, growth_below), growth_above)
}

/// Calculate fee growth inside a tick range
pub fn get_fee_growth_inside(
    tick_current: i32,
    fee_growth_global_x64_a: u128,
    fee_growth_global_x64_b: u128,
    tick_lower: &TickState,
    tick_upper: &TickState,
) -> FeeGrowthInside {
    FeeGrowthInside {
        fee_growth_inside_x64_a: growth_inside(
            tick_current,
            fee_growth_global_x64_a,
            tick_lower.tick,
            tick_lower.fee_growth_outside_x64_a,
            tick_upper.tick,
            tick_upper.fee_growth_outside_x64_a,
        ),
        fee_growth_inside_x64_b: growth_inside(
            tick_current,
            fee_growth_global_x64_b,
            tick_lower.tick,
            tick_lower.fee_growth_outside_x64_b,
            tick_upper.tick,
            tick_upper.fee_growth_outside_x64_b,
        ),
    }
}

/// Calculate reward growth inside a tick range, per reward slot
pub fn get_reward_growths_inside(
    tick_current: i32,
    reward_growths_global_x64: &[u128; REWARD_NUM],
    tick_lower: &TickState,
    tick_upper: &TickState,
) -> [u128; REWARD_NUM] {
    let mut inside = [0u128; REWARD_NUM];
    for (i, slot) in inside.iter_mut().enumerate() {
        *slot = growth_inside(
            tick_current,
            reward_growths_global_x64[i],
            tick_lower.tick,
            tick_lower.reward_growths_outside_x64[i],
            tick_upper.tick,
            tick_upper.reward_growths_outside_x64[i],
        );
    }
    inside
}

/// Tokens earned by `liquidity` since the growth moved from `last` to `inside`
fn accrued(inside: u128, last: u128, liquidity: u128) -> CoreResult<u128> {
    mul_div_u128(sub_fee_growth(inside, last), liquidity, Q64, Rounding::Down)
}

/// Fees a position can collect: recorded owed amounts plus growth since last update
pub fn get_position_fees(
    tick_current: i32,
    fee_growth_global_x64_a: u128,
    fee_growth_global_x64_b: u128,
    position: &PositionState,
    tick_lower: &TickState,
    tick_upper: &TickState,
) -> CoreResult<TokenAmounts> {
    let inside = get_fee_growth_inside(
        tick_current,
        fee_growth_global_x64_a,
        fee_growth_global_x64_b,
        tick_lower,
        tick_upper,
    );

    let delta_a = accrued(
        inside.fee_growth_inside_x64_a,
        position.fee_growth_inside_last_x64_a,
        position.liquidity,
    )?;
    let delta_b = accrued(
        inside.fee_growth_inside_x64_b,
        position.fee_growth_inside_last_x64_b,
        position.liquidity,
    )?;

    Ok(TokenAmounts {
        amount_a: (position.token_fees_owed_a as u128)
            .checked_add(delta_a)
            .ok_or(ClmmError::MathOverflow)?,
        amount_b: (position.token_fees_owed_b as u128)
            .checked_add(delta_b)
            .ok_or(ClmmError::MathOverflow)?,
    })
}

/// Rewards a position can collect, per reward slot
pub fn get_position_rewards(
    tick_current: i32,
    reward_growths_global_x64: &[u128; REWARD_NUM],
    position: &PositionState,
    tick_lower: &TickState,
    tick_upper: &TickState,
) -> CoreResult<[u128; REWARD_NUM]> {
    let inside = get_reward_growths_inside(
        tick_current,
        reward_growths_global_x64,
        tick_lower,
        tick_upper,
    );

    let mut rewards = [0u128; REWARD_NUM];
    for (i, reward) in rewards.iter_mut().enumerate() {
        let info = &position.reward_infos[i];
        let delta = accrued(inside[i], info.growth_inside_last_x64, position.liquidity)?;
        *reward = (info.reward_amount_owed as u128)
            .checked_add(delta)
            .ok_or(ClmmError::MathOverflow)?;
    }
    Ok(rewards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PositionRewardInfo;

    fn tick(tick: i32, outside_a: u128, outside_b: u128) -> TickState {
        TickState {
            tick,
            fee_growth_outside_x64_a: outside_a,
            fee_growth_outside_x64_b: outside_b,
            ..Default::default()
        }
    }

    #[test]
    fn test_inside_range() {
        let lower = tick(-100, 10, 20);
        let upper = tick(100, 30, 40);
        let inside = get_fee_growth_inside(0, 1_000, 2_000, &lower, &upper);
        assert_eq!(inside.fee_growth_inside_x64_a, 1_000 - 10 - 30);
        assert_eq!(inside.fee_growth_inside_x64_b, 2_000 - 20 - 40);
    }

    #[test]
    fn test_below_and_above_range() {
        let lower = tick(-100, 300, 0);
        let upper = tick(100, 100, 0);

        // Price below the range: inside = outside_lower - outside_upper
        let below = get_fee_growth_inside(-200, 1_000, 0, &lower, &upper);
        assert_eq!(below.fee_growth_inside_x64_a, 200);

        // Price above the range: inside = outside_upper - outside_lower, wrapped
        let above = get_fee_growth_inside(200, 1_000, 0, &lower, &upper);
        assert_eq!(above.fee_growth_inside_x64_a, 100u128.wrapping_sub(300));
    }

    #[test]
    fn test_growth_wraps_instead_of_failing() {
        let lower = tick(-100, u128::MAX - 5, 0);
        let upper = tick(100, 0, 0);
        let inside = get_fee_growth_inside(0, 10, 0, &lower, &upper);
        assert_eq!(inside.fee_growth_inside_x64_a, 16);
    }

    #[test]
    fn test_position_fees_accrue_from_last_snapshot() {
        let lower = tick(-100, 0, 0);
        let upper = tick(100, 0, 0);
        let position = PositionState {
            liquidity: 1_000,
            tick_lower: -100,
            tick_upper: 100,
            fee_growth_inside_last_x64_a: Q64,
            fee_growth_inside_last_x64_b: 0,
            token_fees_owed_a: 7,
            token_fees_owed_b: 0,
            ..Default::default()
        };

        // Growth of 3.0 per unit since the snapshot for A, 0.5 for B
        let fees = get_position_fees(0, 4 * Q64, Q64 / 2, &position, &lower, &upper).unwrap();
        assert_eq!(fees.amount_a, 7 + 3_000);
        assert_eq!(fees.amount_b, 500);
    }

    #[test]
    fn test_position_rewards() {
        let mut lower = tick(-100, 0, 0);
        lower.reward_growths_outside_x64 = [Q64, 0, 0];
        let upper = tick(100, 0, 0);

        let mut position = PositionState {
            liquidity: 10,
            tick_lower: -100,
            tick_upper: 100,
            ..Default::default()
        };
        position.reward_infos[0] = PositionRewardInfo {
            growth_inside_last_x64: 0,
            reward_amount_owed: 1,
        };

        let rewards =
            get_position_rewards(0, &[3 * Q64, Q64, 0], &position, &lower, &upper).unwrap();
        assert_eq!(rewards, [1 + 20, 10, 0]);
    }
}
