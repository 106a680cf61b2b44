//! Quote flow tests: pool setup, direction resolution, slippage and
//! remaining accounts, checked against direct simulator runs.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use proptest::prelude::*;

use clmm_core::constants::TICK_ARRAY_BITMAP_SIZE;
use clmm_core::math::{get_sqrt_price_at_tick, sqrt_price_x64_to_price};
use clmm_core::swap::{swap_compute, SwapParams};
use clmm_core::tick::bitmap::set_bit;
use clmm_core::tick::{tick_array_bit_index, tick_array_start_index};
use clmm_sdk::prelude::*;
use clmm_sdk::quote::prefetch_tick_array_start_indices;
use clmm_sdk::{prefetch_tick_array_addresses, ExactInQuote};

const TICK_SPACING: u16 = 10;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn build_pool(ticks: &[(i32, i128)]) -> PoolInfo {
    let snapshot = PoolSnapshot {
        tick_spacing: TICK_SPACING,
        fee_rate: 3_000,
        tick_current: 0,
        sqrt_price_x64: get_sqrt_price_at_tick(0).unwrap(),
        liquidity: 10_000_000,
        mint_decimals_a: 6,
        mint_decimals_b: 6,
        ..Default::default()
    };
    let mut pool = PoolInfo::new(
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        snapshot,
    )
    .unwrap();

    for &(tick, liquidity_net) in ticks {
        let start = tick_array_start_index(tick, TICK_SPACING);
        let mut array = pool
            .tick_arrays
            .remove(&start)
            .unwrap_or_else(|| TickArrayState::new(start, TICK_SPACING).unwrap());
        array
            .set_tick(
                TickState {
                    tick,
                    liquidity_net,
                    liquidity_gross: liquidity_net.unsigned_abs(),
                    ..Default::default()
                },
                TICK_SPACING,
            )
            .unwrap();
        pool.insert_tick_array(array).unwrap();

        let bit = tick_array_bit_index(tick, TICK_SPACING) + TICK_ARRAY_BITMAP_SIZE;
        set_bit(&mut pool.snapshot.tick_array_bitmap, bit as usize).unwrap();
    }
    pool
}

fn standard_pool() -> PoolInfo {
    build_pool(&[(-600, 10_000_000), (100, -5_000_000), (12_000, -5_000_000)])
}

fn simulate(pool: &PoolInfo, zero_for_one: bool, amount_specified: i128) -> SwapResult {
    let params = SwapParams {
        zero_for_one,
        amount_specified,
        sqrt_price_limit_x64: None,
        catch_liquidity_insufficient: false,
        max_steps: None,
    };
    swap_compute(&pool.snapshot, &pool.extension, &pool.tick_arrays, 0, &params).unwrap()
}

fn quote_in(pool: &PoolInfo, mint: &Pubkey, amount_in: u64) -> SdkResult<ExactInQuote> {
    quote_exact_in(pool, mint, amount_in, None, None, &QuoteConfig::default())
}

#[test]
fn test_exact_in_selling_token_b() {
    init_tracing();
    let pool = standard_pool();
    let quote = quote_in(&pool, &pool.mint_b, 1_000_000).unwrap();
    let expected = simulate(&pool, false, 1_000_000);

    assert!(quote.all_trade);
    assert!(!quote.is_input_mint_a);
    assert_eq!(quote.expected_amount_out as i128, -expected.amount_calculated);
    // Default slippage of 2%
    assert_eq!(
        quote.min_amount_out,
        quote.expected_amount_out * 9_800_000_000 / 10_000_000_000
    );
    assert_eq!(quote.fee_amount as u128, expected.fee_amount);
    assert_eq!(quote.execution_sqrt_price_x64, expected.sqrt_price_x64);
    assert_eq!(
        quote.execution_price,
        sqrt_price_x64_to_price(expected.sqrt_price_x64, 6, 6)
    );
    assert_eq!(
        quote.remaining_accounts,
        vec![pool.tick_array_address(0), pool.tick_array_address(12_000)]
    );
}

#[test]
fn test_exact_in_selling_token_a() {
    let pool = standard_pool();
    let quote = quote_in(&pool, &pool.mint_a, 100_000).unwrap();
    let expected = simulate(&pool, true, 100_000);

    assert!(quote.is_input_mint_a);
    assert_eq!(quote.expected_amount_out as i128, -expected.amount_calculated);
    assert!(quote.execution_sqrt_price_x64 < pool.snapshot.sqrt_price_x64);
    assert_eq!(
        quote.remaining_accounts,
        vec![pool.tick_array_address(0), pool.tick_array_address(-600)]
    );
}

#[test]
fn test_exact_out_buying_token_a() {
    init_tracing();
    let pool = standard_pool();
    let quote = quote_exact_out(
        &pool,
        &pool.mint_a,
        100_000,
        None,
        Some(0.01),
        &QuoteConfig::default(),
    )
    .unwrap();
    let expected = simulate(&pool, false, -100_000);

    assert!(quote.all_trade);
    assert!(quote.is_output_mint_a);
    assert_eq!(quote.expected_amount_in as i128, expected.amount_calculated);
    assert!(quote.expected_amount_in > 100_000);
    assert_eq!(
        quote.max_amount_in as u128,
        quote.expected_amount_in as u128 * 10_100_000_000 / 10_000_000_000
    );
    assert_eq!(quote.remaining_accounts[0], pool.tick_array_address(0));
}

#[test]
fn test_unknown_mint() {
    let pool = standard_pool();
    let stranger = Pubkey::new_unique();
    assert!(matches!(
        quote_in(&pool, &stranger, 1_000),
        Err(SdkError::UnknownMint(mint)) if mint == stranger
    ));
}

#[test]
fn test_price_limit() {
    let pool = standard_pool();
    let limit_price = sqrt_price_x64_to_price(get_sqrt_price_at_tick(50).unwrap(), 6, 6);
    let config = QuoteConfig::default();

    let limited = quote_exact_in(&pool, &pool.mint_b, 1_000_000, Some(&limit_price), None, &config)
        .unwrap();
    assert!(!limited.all_trade);
    assert!(limited.expected_amount_out < 1_000_000 / 2);

    // A zero limit behaves like no limit
    let zero = BigDecimal::from_str("0").unwrap();
    let unlimited = quote_exact_in(&pool, &pool.mint_b, 1_000_000, Some(&zero), None, &config)
        .unwrap();
    assert_eq!(unlimited, quote_in(&pool, &pool.mint_b, 1_000_000).unwrap());

    // Selling B pushes the price up, so a lower limit is on the wrong side
    let below = BigDecimal::from_str("0.5").unwrap();
    assert!(matches!(
        quote_exact_in(&pool, &pool.mint_b, 1_000, Some(&below), None, &config),
        Err(SdkError::Core(ClmmError::InvalidOrdering(_)))
    ));
}

#[test]
fn test_liquidity_insufficient_modes() {
    let pool = build_pool(&[(100, -10_000_000)]);

    assert!(matches!(
        quote_in(&pool, &pool.mint_b, 1_000_000_000_000),
        Err(SdkError::Core(ClmmError::LiquidityInsufficient))
    ));

    let tolerant = QuoteConfig {
        catch_liquidity_insufficient: true,
        ..QuoteConfig::default()
    };
    let partial =
        quote_exact_in(&pool, &pool.mint_b, 1_000_000_000_000, None, None, &tolerant).unwrap();
    assert!(!partial.all_trade);
    assert!(partial.expected_amount_out > 0);
    assert!(partial.min_amount_out <= partial.expected_amount_out);
}

#[test]
fn test_pool_without_tick_arrays() {
    let pool = build_pool(&[]);
    assert!(matches!(
        quote_in(&pool, &pool.mint_a, 1_000),
        Err(SdkError::Core(ClmmError::LiquidityInsufficient))
    ));
}

#[test]
fn test_invalid_slippage() {
    let pool = standard_pool();
    assert!(matches!(
        quote_exact_in(&pool, &pool.mint_a, 1_000, None, Some(1.2), &QuoteConfig::default()),
        Err(SdkError::InvalidSlippage(_))
    ));
}

#[test]
fn test_prefetch_addresses() {
    let pool = standard_pool();
    assert_eq!(
        prefetch_tick_array_start_indices(&pool, 7).unwrap(),
        vec![-600, 0, 12_000]
    );
    assert_eq!(
        prefetch_tick_array_addresses(&pool, 1).unwrap(),
        vec![pool.tick_array_address(-600), pool.tick_array_address(0)]
    );
}

proptest! {
    #[test]
    fn exact_in_quotes_are_consistent(amount_in in 1u64..200_000, sell_a in any::<bool>()) {
        let pool = standard_pool();
        let mint = if sell_a { pool.mint_a } else { pool.mint_b };
        let quote = quote_in(&pool, &mint, amount_in).unwrap();

        prop_assert!(quote.all_trade);
        prop_assert!(quote.min_amount_out <= quote.expected_amount_out);
        prop_assert!(quote.fee_amount <= amount_in);
        prop_assert_eq!(quote.remaining_accounts[0], pool.tick_array_address(0));
        if sell_a {
            prop_assert!(quote.execution_sqrt_price_x64 <= pool.snapshot.sqrt_price_x64);
        } else {
            prop_assert!(quote.execution_sqrt_price_x64 >= pool.snapshot.sqrt_price_x64);
        }
    }
}
