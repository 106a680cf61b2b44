//! # Swap Scenario Tests
//!
//! End-to-end runs of the swap simulator over a small hand-built pool.
//! Expected values are rebuilt segment by segment with the public step
//! function so every unit of input, output and fee is accounted for.

use std::collections::HashMap;

use clmm_core::math::{get_sqrt_price_at_tick, get_tick_at_sqrt_price, mul_div_u128, Rounding};
use clmm_core::swap::{compute_swap_step, swap_compute, SwapParams};
use clmm_core::tick::bitmap::set_bit;
use clmm_core::tick::{tick_array_bit_index, tick_array_start_index};
use clmm_core::*;

const TICK_SPACING: u16 = 10;
const FEE_RATE: u32 = 3_000;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Pool at tick 0 with 10M liquidity and the given initialized ticks
struct Fixture {
    pool: PoolSnapshot,
    extension: TickArrayBitmapExtension,
    tick_arrays: HashMap<i32, TickArrayState>,
}

impl Fixture {
    fn new(ticks: &[(i32, i128)]) -> Self {
        let mut pool = PoolSnapshot {
            tick_spacing: TICK_SPACING,
            fee_rate: FEE_RATE,
            tick_current: 0,
            sqrt_price_x64: get_sqrt_price_at_tick(0).unwrap(),
            liquidity: 10_000_000,
            mint_decimals_a: 6,
            mint_decimals_b: 6,
            ..Default::default()
        };

        let mut tick_arrays: HashMap<i32, TickArrayState> = HashMap::new();
        // The array holding the current tick is always loaded, even when empty
        tick_arrays.insert(0, TickArrayState::new(0, TICK_SPACING).unwrap());

        for &(tick, liquidity_net) in ticks {
            let start = tick_array_start_index(tick, TICK_SPACING);
            let array = tick_arrays
                .entry(start)
                .or_insert_with(|| TickArrayState::new(start, TICK_SPACING).unwrap());
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

            let bit = tick_array_bit_index(tick, TICK_SPACING) + TICK_ARRAY_BITMAP_SIZE;
            set_bit(&mut pool.tick_array_bitmap, bit as usize).unwrap();
        }

        Self {
            pool,
            extension: TickArrayBitmapExtension::default(),
            tick_arrays,
        }
    }

    /// Ticks at -600, +100 and +12000
    fn standard() -> Self {
        Self::new(&[(-600, 10_000_000), (100, -5_000_000), (12_000, -5_000_000)])
    }

    fn swap(&self, params: &SwapParams) -> CoreResult<SwapResult> {
        swap_compute(&self.pool, &self.extension, &self.tick_arrays, 0, params)
    }
}

fn params(zero_for_one: bool, amount_specified: i128) -> SwapParams {
    SwapParams {
        zero_for_one,
        amount_specified,
        sqrt_price_limit_x64: None,
        catch_liquidity_insufficient: false,
        max_steps: None,
    }
}

#[test]
fn test_exact_input_crosses_tick() {
    init_tracing();
    let fixture = Fixture::standard();
    let result = fixture.swap(&params(false, 1_000_000)).unwrap();

    let sqrt_0 = get_sqrt_price_at_tick(0).unwrap();
    let sqrt_100 = get_sqrt_price_at_tick(100).unwrap();
    let sqrt_12000 = get_sqrt_price_at_tick(12_000).unwrap();

    // First segment runs all the way to the tick at +100
    let first = compute_swap_step(sqrt_0, sqrt_100, 10_000_000, 1_000_000, FEE_RATE, false).unwrap();
    assert_eq!(first.sqrt_price_next_x64, sqrt_100);
    assert_eq!(
        first.fee_amount,
        mul_div_u128(first.amount_in, 3_000, 997_000, Rounding::Up).unwrap()
    );

    // Second segment spends the rest on half the liquidity
    let remaining = 1_000_000 - (first.amount_in + first.fee_amount) as i128;
    let second = compute_swap_step(sqrt_100, sqrt_12000, 5_000_000, remaining, FEE_RATE, false).unwrap();
    assert!(second.sqrt_price_next_x64 < sqrt_12000);

    assert!(result.all_trade);
    assert_eq!(result.amount_specified_remaining, 0);
    assert_eq!(result.liquidity, 5_000_000);
    assert_eq!(result.steps, 2);
    assert_eq!(result.sqrt_price_x64, second.sqrt_price_next_x64);
    assert_eq!(result.fee_amount, first.fee_amount + second.fee_amount);
    assert_eq!(
        result.amount_calculated,
        -((first.amount_out + second.amount_out) as i128)
    );
    assert_eq!(
        first.amount_in + first.fee_amount + second.amount_in + second.fee_amount,
        1_000_000
    );

    // Roughly 0.3% of the input goes to fees
    assert!((2_990..=3_010).contains(&result.fee_amount));

    assert_eq!(
        result.tick_current,
        get_tick_at_sqrt_price(result.sqrt_price_x64).unwrap()
    );
    assert!(result.tick_current > 100 && result.tick_current < 12_000);
    assert_eq!(result.tick_arrays, vec![0, 12_000]);
}

#[test]
fn test_exact_output_moves_down() {
    init_tracing();
    let fixture = Fixture::standard();
    let result = fixture.swap(&params(true, -100_000)).unwrap();

    let sqrt_0 = get_sqrt_price_at_tick(0).unwrap();
    let sqrt_600 = get_sqrt_price_at_tick(-600).unwrap();
    let step = compute_swap_step(sqrt_0, sqrt_600, 10_000_000, -100_000, FEE_RATE, true).unwrap();

    assert!(result.all_trade);
    assert_eq!(result.amount_specified_remaining, 0);
    assert_eq!(step.amount_out, 100_000);
    assert_eq!(result.amount_calculated, (step.amount_in + step.fee_amount) as i128);
    assert!(result.amount_calculated > 100_000);
    assert_eq!(result.liquidity, 10_000_000);
    assert!(result.tick_current < 0 && result.tick_current > -600);
    assert_eq!(result.tick_arrays, vec![0, -600]);
}

#[test]
fn test_downward_cross_adds_liquidity_back() {
    let fixture = Fixture::new(&[(-12_000, 1_000), (-100, -4_000_000)]);
    let result = fixture.swap(&params(true, 1_000_000)).unwrap();

    // Crossing downward negates liquidity_net
    assert_eq!(result.liquidity, 14_000_000);
    assert!(result.tick_current < -100 && result.tick_current > -12_000);
    assert_eq!(result.tick_arrays, vec![0, -600, -12_000]);
    assert!(result.all_trade);
}

#[test]
fn test_price_limit_stops_early() {
    let fixture = Fixture::standard();
    let limit = get_sqrt_price_at_tick(50).unwrap();
    let mut limited = params(false, 1_000_000);
    limited.sqrt_price_limit_x64 = Some(limit);

    let result = fixture.swap(&limited).unwrap();
    assert_eq!(result.sqrt_price_x64, limit);
    assert_eq!(result.tick_current, 50);
    assert!(result.amount_specified_remaining > 0);
    assert!(!result.all_trade);
    assert_eq!(result.liquidity, 10_000_000);
}

#[test]
fn test_wrong_side_price_limit() {
    let fixture = Fixture::standard();
    let current = fixture.pool.sqrt_price_x64;

    let mut up = params(false, 1_000);
    up.sqrt_price_limit_x64 = Some(current - 1);
    assert!(matches!(fixture.swap(&up), Err(ClmmError::InvalidOrdering(_))));

    let mut down = params(true, 1_000);
    down.sqrt_price_limit_x64 = Some(current);
    assert!(matches!(fixture.swap(&down), Err(ClmmError::InvalidOrdering(_))));

    let mut beyond = params(false, 1_000);
    beyond.sqrt_price_limit_x64 = Some(MAX_SQRT_PRICE_X64 + 1);
    assert!(matches!(fixture.swap(&beyond), Err(ClmmError::OutOfRange(_))));
}

#[test]
fn test_zero_amount() {
    let fixture = Fixture::standard();
    assert_eq!(fixture.swap(&params(true, 0)), Err(ClmmError::ZeroAmount));
    assert_eq!(fixture.swap(&params(false, 0)), Err(ClmmError::ZeroAmount));
}

#[test]
fn test_liquidity_insufficient() {
    init_tracing();
    // All liquidity leaves at +100 and nothing lies beyond
    let fixture = Fixture::new(&[(100, -10_000_000)]);

    for amount in [1_000_000_000_000i128, -1_000_000_000_000] {
        assert_eq!(
            fixture.swap(&params(false, amount)),
            Err(ClmmError::LiquidityInsufficient)
        );

        let mut tolerant = params(false, amount);
        tolerant.catch_liquidity_insufficient = true;
        let partial = fixture.swap(&tolerant).unwrap();

        assert!(!partial.all_trade);
        assert_ne!(partial.amount_specified_remaining, 0);
        assert_eq!(partial.liquidity, 0);
        assert_eq!(partial.tick_current, 100);
        if amount > 0 {
            // Output is reported negative and never flips sign
            assert!(partial.amount_calculated < 0);
        } else {
            assert!(partial.amount_calculated > 0);
        }
    }
}

#[test]
fn test_missing_tick_array() {
    let mut fixture = Fixture::standard();
    fixture.tick_arrays.remove(&12_000);
    assert_eq!(
        fixture.swap(&params(false, 1_000_000)),
        Err(ClmmError::MissingTickArrayData { start_index: 12_000 })
    );
}
