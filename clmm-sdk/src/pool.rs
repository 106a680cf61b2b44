//! Pool state as the quote layer sees it: a core snapshot plus the
//! addresses and tick arrays needed to price against it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;

use clmm_core::tick::{is_valid_start_index, tick_array_start_index};
use clmm_core::{ClmmError, PoolSnapshot, TickArrayBitmapExtension, TickArrayIndex, TickArrayState};

use crate::core::{SdkError, SdkResult};
use crate::pda;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolInfo {
    pub program_id: Pubkey,
    pub pool_id: Pubkey,
    pub mint_a: Pubkey,
    pub mint_b: Pubkey,
    pub snapshot: PoolSnapshot,
    #[serde(default)]
    pub extension: TickArrayBitmapExtension,
    /// Decoded tick arrays keyed by start index
    #[serde(default)]
    pub tick_arrays: HashMap<i32, TickArrayState>,
}

impl PoolInfo {
    pub fn new(
        program_id: Pubkey,
        pool_id: Pubkey,
        mint_a: Pubkey,
        mint_b: Pubkey,
        snapshot: PoolSnapshot,
    ) -> SdkResult<Self> {
        let pool = Self {
            program_id,
            pool_id,
            mint_a,
            mint_b,
            snapshot,
            extension: TickArrayBitmapExtension::default(),
            tick_arrays: HashMap::new(),
        };
        pool.validate()?;
        Ok(pool)
    }

    /// Load a pool previously dumped as JSON
    pub fn from_json(content: &str) -> SdkResult<Self> {
        let pool: Self = serde_json::from_str(content)?;
        pool.validate()?;
        Ok(pool)
    }

    pub fn validate(&self) -> SdkResult<()> {
        if self.mint_a == self.mint_b {
            return Err(SdkError::InvalidParameters(format!(
                "pool {} has identical mints",
                self.pool_id
            )));
        }
        self.snapshot.validate()?;
        for (&start, array) in &self.tick_arrays {
            if start != array.start_tick_index {
                return Err(SdkError::InvalidParameters(format!(
                    "tick array keyed {start} starts at {}",
                    array.start_tick_index
                )));
            }
        }
        Ok(())
    }

    pub fn with_extension(mut self, extension: TickArrayBitmapExtension) -> Self {
        self.extension = extension;
        self
    }

    /// Add or replace a decoded tick array
    pub fn insert_tick_array(&mut self, array: TickArrayState) -> SdkResult<()> {
        if !is_valid_start_index(array.start_tick_index, self.snapshot.tick_spacing) {
            return Err(ClmmError::InvalidTickArrayStartIndex(array.start_tick_index).into());
        }
        self.tick_arrays.insert(array.start_tick_index, array);
        Ok(())
    }

    /// `true` for token A, `false` for token B
    pub fn is_mint_a(&self, mint: &Pubkey) -> SdkResult<bool> {
        if *mint == self.mint_a {
            Ok(true)
        } else if *mint == self.mint_b {
            Ok(false)
        } else {
            Err(SdkError::UnknownMint(*mint))
        }
    }

    pub fn tick_array_index(&self) -> SdkResult<TickArrayIndex<'_>> {
        Ok(self.snapshot.tick_array_index(&self.extension)?)
    }

    /// Start index of the array holding the current tick
    pub fn current_tick_array_start_index(&self) -> i32 {
        tick_array_start_index(self.snapshot.tick_current, self.snapshot.tick_spacing)
    }

    pub fn tick_array_address(&self, start_index: i32) -> Pubkey {
        pda::tick_array_address(&self.program_id, &self.pool_id, start_index)
    }

    pub fn tick_array_bitmap_extension_address(&self) -> Pubkey {
        pda::tick_array_bitmap_extension_address(&self.program_id, &self.pool_id)
    }
}
