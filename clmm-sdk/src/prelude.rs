//! Prelude module for common imports

pub use solana_program::pubkey::Pubkey;

pub use clmm_core::{
    ClmmError, PoolSnapshot, SwapResult, TickArrayBitmapExtension, TickArrayState, TickState,
};

pub use crate::config::QuoteConfig;
pub use crate::core::{SdkError, SdkResult};
pub use crate::pool::PoolInfo;
pub use crate::quote::{quote_exact_in, quote_exact_out, ExactInQuote, ExactOutQuote};
