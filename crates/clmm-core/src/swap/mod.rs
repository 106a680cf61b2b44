//! # Swap Simulation
//!
//! The per-segment step and the loop that chains steps across ticks and
//! tick arrays.

pub mod simulator;
pub mod step;

pub use simulator::{
    default_sqrt_price_limit, swap_compute, SwapParams, SwapResult, TickArraySource,
};
pub use step::{compute_swap_step, SwapStep};
