//! # CLMM SDK - Swap Quotes
//!
//! Client layer over `clmm-core`: resolves trade direction from mints,
//! turns decimal price limits and slippage into program values, and
//! derives the tick-array accounts a swap needs. Account fetching and
//! transaction building stay with the caller.

pub mod config;
pub mod core;
pub mod pda;
pub mod pool;
pub mod prelude;
pub mod price_range;
pub mod quote;

pub use config::QuoteConfig;
pub use crate::core::{SdkError, SdkResult};
pub use pool::PoolInfo;
pub use quote::{
    prefetch_tick_array_addresses, quote_exact_in, quote_exact_out, ExactInQuote, ExactOutQuote,
};
