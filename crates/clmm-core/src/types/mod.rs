//! # Core Type Definitions
//!
//! Plain snapshots of on-chain accounts, consumed read-only by the math.

pub mod pool;
pub mod position;

pub use pool::*;
pub use position::*;
