//! Quote configuration

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;

use clmm_core::constants::DEFAULT_PREFETCH_TICK_ARRAYS;

use crate::core::{SdkError, SdkResult};

/// Byreal CLMM program on mainnet
pub const BYREAL_CLMM_PROGRAM_ID: &str = "45iBNkaENereLKMjLm2LHkF3hpDapf6mnvrM5HWFg9cY";

/// Raydium CLMM program on mainnet, same account layout
pub const RAYDIUM_CLMM_PROGRAM_ID: &str = "CAMMCzo5YL8w4VFF8KVHrK22GGUsp5VTaW7grrKgrWqK";

pub const DEFAULT_PROGRAM_ID: &str = BYREAL_CLMM_PROGRAM_ID;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteConfig {
    /// Fraction of the expected amount a quote may lose, e.g. `0.02`
    pub default_slippage: f64,
    /// Return partial quotes instead of failing when liquidity runs out
    pub catch_liquidity_insufficient: bool,
    /// Iteration cap for the swap loop, unbounded when unset
    pub max_swap_steps: Option<usize>,
    /// Tick arrays fetched on each side of the current one
    pub prefetch_tick_array_count: usize,
    /// Base58 program id
    pub program_id: String,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            default_slippage: 0.02,
            catch_liquidity_insufficient: false,
            max_swap_steps: None,
            prefetch_tick_array_count: DEFAULT_PREFETCH_TICK_ARRAYS,
            program_id: DEFAULT_PROGRAM_ID.to_string(),
        }
    }
}

impl QuoteConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> SdkResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> SdkResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> SdkResult<()> {
        validate_slippage(self.default_slippage)?;
        if self.prefetch_tick_array_count == 0 {
            return Err(SdkError::Config(
                "prefetch_tick_array_count must be at least 1".to_string(),
            ));
        }
        if self.max_swap_steps == Some(0) {
            return Err(SdkError::Config("max_swap_steps cannot be 0".to_string()));
        }
        self.program_id()?;
        Ok(())
    }

    pub fn program_id(&self) -> SdkResult<Pubkey> {
        Pubkey::from_str(&self.program_id)
            .map_err(|e| SdkError::Config(format!("program_id {}: {e}", self.program_id)))
    }
}

pub(crate) fn validate_slippage(slippage: f64) -> SdkResult<()> {
    if !(0.0..1.0).contains(&slippage) {
        return Err(SdkError::InvalidSlippage(slippage));
    }
    Ok(())
}
