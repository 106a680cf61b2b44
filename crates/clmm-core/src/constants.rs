//! # Protocol Constants
//!
//! Fixed parameters of the CLMM program this crate replicates:
//! - Fixed-point scale factors (Q64)
//! - Tick and sqrt price bounds
//! - Tick array and bitmap geometry
//! - Fee denominator and reward slots

// ============================================================================
// Mathematical Constants
// ============================================================================

/// Number of fractional bits in a Q64.64 value
pub const RESOLUTION: u32 = 64;

/// Q64 fixed-point scale factor: 2^64
pub const Q64: u128 = 1u128 << RESOLUTION;

/// 2^64 - 1, used as the scale in the liquidity-from-amount conversions
pub const U64_MAX_AS_U128: u128 = u64::MAX as u128;

// ============================================================================
// Tick and Price Bounds
// ============================================================================

/// Lowest tick addressable by the program
pub const MIN_TICK: i32 = -443_636;

/// Highest tick addressable by the program
pub const MAX_TICK: i32 = -MIN_TICK;

/// Sqrt price at `MIN_TICK`, Q64.64
pub const MIN_SQRT_PRICE_X64: u128 = 4_295_048_016;

/// Sqrt price at `MAX_TICK`, Q64.64
pub const MAX_SQRT_PRICE_X64: u128 = 79_226_673_521_066_979_257_578_248_091;

/// Number of binary refinement iterations for the fractional log2
pub const BIT_PRECISION: u32 = 16;

/// log_{sqrt(1.0001)}(2) in Q32
pub const LOG_B_2_X32: i128 = 59_543_866_431_248;

/// Lower error margin of the log estimate, Q64
pub const LOG_B_P_ERR_MARGIN_LOWER_X64: i128 = 184_467_440_737_095_516;

/// Upper error margin of the log estimate, Q64
pub const LOG_B_P_ERR_MARGIN_UPPER_X64: i128 = 15_793_534_762_490_258_745;

// ============================================================================
// Tick Array Geometry
// ============================================================================

/// Ticks stored in one tick array account
pub const TICK_ARRAY_SIZE: i32 = 60;

/// Same as `TICK_ARRAY_SIZE`, for slice indexing
pub const TICK_ARRAY_SIZE_USIZE: usize = 60;

/// Tick arrays tracked per half of the default bitmap
pub const TICK_ARRAY_BITMAP_SIZE: i32 = 512;

/// 64-bit words in the pool's default tick array bitmap (1024 bits)
pub const DEFAULT_BITMAP_WORDS: usize = 16;

/// 64-bit words in one extension bitmap (512 bits)
pub const EXTENSION_BITMAP_WORDS: usize = 8;

/// Extension bitmaps per side (positive and negative)
pub const EXTENSION_TICKARRAY_BITMAP_SIZE: usize = 14;

/// Array-index span of the merged search view: 15 bitmaps of 512 bits per side
pub const MERGED_BITMAP_HALF_SPAN: i32 = 7_680;

/// Prefetch width used when a caller does not choose one
pub const DEFAULT_PREFETCH_TICK_ARRAYS: usize = 7;

// ============================================================================
// Fees and Rewards
// ============================================================================

/// Fee rates are expressed in parts per million
pub const FEE_RATE_DENOMINATOR: u32 = 1_000_000;

/// Reward slots carried by every tick and pool
pub const REWARD_NUM: usize = 3;

// ============================================================================
// Account Seeds
// ============================================================================

/// Seed of the tick array program-derived address
pub const TICK_ARRAY_SEED: &[u8] = b"tick_array";

/// Seed of the tick array bitmap extension program-derived address
pub const POOL_TICK_ARRAY_BITMAP_SEED: &[u8] = b"pool_tick_array_bitmap_extension";
