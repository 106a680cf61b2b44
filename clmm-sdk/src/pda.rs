//! Program-derived addresses of pool-owned accounts.

use solana_program::pubkey::Pubkey;

use clmm_core::constants::{POOL_TICK_ARRAY_BITMAP_SEED, TICK_ARRAY_SEED};

/// Address of the tick array starting at `start_index`
///
/// The start index is encoded big-endian in the seed.
pub fn tick_array_address(program_id: &Pubkey, pool_id: &Pubkey, start_index: i32) -> Pubkey {
    Pubkey::find_program_address(
        &[
            TICK_ARRAY_SEED,
            pool_id.as_ref(),
            &start_index.to_be_bytes(),
        ],
        program_id,
    )
    .0
}

/// Address of the pool's tick array bitmap extension
pub fn tick_array_bitmap_extension_address(program_id: &Pubkey, pool_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[POOL_TICK_ARRAY_BITMAP_SEED, pool_id.as_ref()], program_id).0
}

pub fn tick_array_addresses(
    program_id: &Pubkey,
    pool_id: &Pubkey,
    start_indices: &[i32],
) -> Vec<Pubkey> {
    start_indices
        .iter()
        .map(|&start| tick_array_address(program_id, pool_id, start))
        .collect()
}
