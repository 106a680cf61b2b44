//! # Swap Quotes
//!
//! Direction, price limit and slippage handling around the core swap
//! simulator. A quote lists every tick array the trade touches so the
//! transaction can pass them as remaining accounts.

use bigdecimal::BigDecimal;
use solana_program::pubkey::Pubkey;
use tracing::debug;

use clmm_core::math::{
    mul_div_u128, price_to_sqrt_price_x64, safe_cast_u128_to_i128, safe_cast_u128_to_u64,
    sqrt_price_x64_to_price, Rounding,
};
use clmm_core::swap::{default_sqrt_price_limit, swap_compute, SwapParams, SwapResult};
use clmm_core::ClmmError;

use crate::config::{validate_slippage, QuoteConfig};
use crate::core::SdkResult;
use crate::pool::PoolInfo;

/// Slippage factors are applied in units of 10^-10
const SLIPPAGE_SCALE: u128 = 10_000_000_000;

#[derive(Debug, Clone, PartialEq)]
pub struct ExactInQuote {
    pub all_trade: bool,
    pub is_input_mint_a: bool,
    pub amount_in: u64,
    pub expected_amount_out: u64,
    pub min_amount_out: u64,
    pub execution_sqrt_price_x64: u128,
    /// Pool price after the trade, token A in token B
    pub execution_price: BigDecimal,
    pub fee_amount: u64,
    pub remaining_accounts: Vec<Pubkey>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExactOutQuote {
    pub all_trade: bool,
    pub is_output_mint_a: bool,
    pub amount_out: u64,
    pub expected_amount_in: u64,
    pub max_amount_in: u64,
    pub execution_sqrt_price_x64: u128,
    pub execution_price: BigDecimal,
    pub fee_amount: u64,
    pub remaining_accounts: Vec<Pubkey>,
}

/// Sqrt price limit for a decimal price; zero or absent means no limit
fn sqrt_price_limit(
    pool: &PoolInfo,
    price_limit: Option<&BigDecimal>,
    zero_for_one: bool,
) -> SdkResult<u128> {
    match price_limit {
        Some(price) if *price != BigDecimal::from(0) => Ok(price_to_sqrt_price_x64(
            price,
            pool.snapshot.mint_decimals_a,
            pool.snapshot.mint_decimals_b,
        )?),
        _ => Ok(default_sqrt_price_limit(zero_for_one)),
    }
}

/// Run the simulator from the first initialized array in the trade direction
fn simulate(
    pool: &PoolInfo,
    zero_for_one: bool,
    amount_specified: i128,
    sqrt_price_limit_x64: u128,
    config: &QuoteConfig,
) -> SdkResult<SwapResult> {
    let index = pool.tick_array_index()?;
    let first_start_index = index
        .first_initialized_tick_array(pool.snapshot.tick_current, zero_for_one)?
        .ok_or(ClmmError::LiquidityInsufficient)?;

    let params = SwapParams {
        zero_for_one,
        amount_specified,
        sqrt_price_limit_x64: Some(sqrt_price_limit_x64),
        catch_liquidity_insufficient: config.catch_liquidity_insufficient,
        max_steps: config.max_swap_steps,
    };
    Ok(swap_compute(
        &pool.snapshot,
        &pool.extension,
        &pool.tick_arrays,
        first_start_index,
        &params,
    )?)
}

fn remaining_accounts(pool: &PoolInfo, result: &SwapResult) -> Vec<Pubkey> {
    result
        .tick_arrays
        .iter()
        .map(|&start| pool.tick_array_address(start))
        .collect()
}

/// `amount · floor((1 - slippage) · 10^10) / 10^10`
pub fn min_amount_with_slippage(amount: u64, slippage: f64) -> SdkResult<u64> {
    validate_slippage(slippage)?;
    let factor = ((1.0 - slippage) * SLIPPAGE_SCALE as f64).floor() as u128;
    let scaled = mul_div_u128(amount as u128, factor, SLIPPAGE_SCALE, Rounding::Down)?;
    Ok(safe_cast_u128_to_u64(scaled)?)
}

/// `amount · ceil((1 + slippage) · 10^10) / 10^10`, the product rounded down
pub fn max_amount_with_slippage(amount: u64, slippage: f64) -> SdkResult<u64> {
    validate_slippage(slippage)?;
    let factor = ((1.0 + slippage) * SLIPPAGE_SCALE as f64).ceil() as u128;
    let scaled = mul_div_u128(amount as u128, factor, SLIPPAGE_SCALE, Rounding::Down)?;
    Ok(safe_cast_u128_to_u64(scaled)?)
}

/// Quote a swap of exactly `amount_in` of `input_mint`
///
/// `slippage` falls back to the configured default.
pub fn quote_exact_in(
    pool: &PoolInfo,
    input_mint: &Pubkey,
    amount_in: u64,
    price_limit: Option<&BigDecimal>,
    slippage: Option<f64>,
    config: &QuoteConfig,
) -> SdkResult<ExactInQuote> {
    let slippage = slippage.unwrap_or(config.default_slippage);
    validate_slippage(slippage)?;

    let is_input_mint_a = pool.is_mint_a(input_mint)?;
    let zero_for_one = is_input_mint_a;
    let limit = sqrt_price_limit(pool, price_limit, zero_for_one)?;

    let result = simulate(pool, zero_for_one, amount_in as i128, limit, config)?;

    let amount_out = result
        .amount_calculated
        .checked_neg()
        .ok_or(ClmmError::MathOverflow)?;
    let expected_amount_out = safe_cast_u128_to_u64(
        u128::try_from(amount_out).map_err(|_| ClmmError::MathUnderflow)?,
    )?;
    let min_amount_out = min_amount_with_slippage(expected_amount_out, slippage)?;

    debug!(
        "Quote exact in: pool={} amount_in={} out={} min_out={} steps={} all_trade={}",
        pool.pool_id, amount_in, expected_amount_out, min_amount_out, result.steps, result.all_trade
    );

    Ok(ExactInQuote {
        all_trade: result.all_trade,
        is_input_mint_a,
        amount_in,
        expected_amount_out,
        min_amount_out,
        execution_sqrt_price_x64: result.sqrt_price_x64,
        execution_price: sqrt_price_x64_to_price(
            result.sqrt_price_x64,
            pool.snapshot.mint_decimals_a,
            pool.snapshot.mint_decimals_b,
        ),
        fee_amount: safe_cast_u128_to_u64(result.fee_amount)?,
        remaining_accounts: remaining_accounts(pool, &result),
    })
}

/// Quote a swap yielding exactly `amount_out` of `output_mint`
pub fn quote_exact_out(
    pool: &PoolInfo,
    output_mint: &Pubkey,
    amount_out: u64,
    price_limit: Option<&BigDecimal>,
    slippage: Option<f64>,
    config: &QuoteConfig,
) -> SdkResult<ExactOutQuote> {
    let slippage = slippage.unwrap_or(config.default_slippage);
    validate_slippage(slippage)?;

    let is_output_mint_a = pool.is_mint_a(output_mint)?;
    // Buying token B means selling token A
    let zero_for_one = !is_output_mint_a;
    let limit = sqrt_price_limit(pool, price_limit, zero_for_one)?;

    let amount_specified = -safe_cast_u128_to_i128(amount_out as u128)?;
    let result = simulate(pool, zero_for_one, amount_specified, limit, config)?;

    let expected_amount_in = safe_cast_u128_to_u64(
        u128::try_from(result.amount_calculated).map_err(|_| ClmmError::MathUnderflow)?,
    )?;
    let max_amount_in = max_amount_with_slippage(expected_amount_in, slippage)?;

    debug!(
        "Quote exact out: pool={} amount_out={} in={} max_in={} steps={} all_trade={}",
        pool.pool_id, amount_out, expected_amount_in, max_amount_in, result.steps, result.all_trade
    );

    Ok(ExactOutQuote {
        all_trade: result.all_trade,
        is_output_mint_a,
        amount_out,
        expected_amount_in,
        max_amount_in,
        execution_sqrt_price_x64: result.sqrt_price_x64,
        execution_price: sqrt_price_x64_to_price(
            result.sqrt_price_x64,
            pool.snapshot.mint_decimals_a,
            pool.snapshot.mint_decimals_b,
        ),
        fee_amount: safe_cast_u128_to_u64(result.fee_amount)?,
        remaining_accounts: remaining_accounts(pool, &result),
    })
}

/// Start indices of the initialized arrays around the current tick, `count` per side
pub fn prefetch_tick_array_start_indices(pool: &PoolInfo, count: usize) -> SdkResult<Vec<i32>> {
    let index = pool.tick_array_index()?;
    Ok(index.initialized_tick_array_in_range(pool.current_tick_array_start_index(), count))
}

/// Addresses to fetch before quoting against `pool`
pub fn prefetch_tick_array_addresses(pool: &PoolInfo, count: usize) -> SdkResult<Vec<Pubkey>> {
    Ok(prefetch_tick_array_start_indices(pool, count)?
        .into_iter()
        .map(|start| pool.tick_array_address(start))
        .collect())
}
