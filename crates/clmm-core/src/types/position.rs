//! # Position Types
//!
//! Personal position fields needed to attribute fees and rewards.

use crate::constants::REWARD_NUM;

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

/// Reward checkpoint of one position for one reward slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct PositionRewardInfo {
    pub growth_inside_last_x64: u128,
    pub reward_amount_owed: u64,
}

/// Snapshot of a personal position account
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct PositionState {
    pub liquidity: u128,
    pub tick_lower: i32,
    pub tick_upper: i32,
    /// Fee growth inside the range when fees were last settled
    pub fee_growth_inside_last_x64_a: u128,
    pub fee_growth_inside_last_x64_b: u128,
    pub token_fees_owed_a: u64,
    pub token_fees_owed_b: u64,
    pub reward_infos: [PositionRewardInfo; REWARD_NUM],
}
