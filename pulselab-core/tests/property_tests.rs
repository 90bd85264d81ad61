//! Property tests for indicator and decision invariants.
//!
//! Uses proptest to verify:
//! 1. SMA of a constant series is that constant
//! 2. EMA moves toward each new input without overshooting it
//! 3. RSI stays within [0, 100]
//! 4. Crossover directions are mutually exclusive
//! 5. Replays are deterministic down to the serialized action stream, on
//!    bar scripts where every variant acts
//! 6. Protective levels always bracket the entry on the correct side

use chrono::NaiveDate;
use proptest::prelude::*;
use pulselab_core::components::crossover::{crosses_above, crosses_below, Cross};
use pulselab_core::components::factory::{build, default_params, StrategyKind};
use pulselab_core::components::indicator::{compute, Indicator, Series};
use pulselab_core::components::risk::{OrderIntent, TradeSide};
use pulselab_core::domain::{Action, Bar, Position};
use pulselab_core::indicators::{Ema, Rsi, Sma};

fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let mut prev = closes.first().copied().unwrap_or(100.0);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = prev;
            prev = close;
            Bar::new(
                base + chrono::Duration::hours(i as i64),
                open,
                open.max(close) + 1.0,
                open.min(close) - 1.0,
                close,
                1000.0,
            )
        })
        .collect()
}

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (10.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_closes(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(arb_price(), 2..max_len)
}

fn series_of(values: &[f64]) -> Series {
    let mut s = Series::new();
    for &v in values {
        s.push(Some(v));
    }
    s
}

// ── 1-3. Indicator bounds ────────────────────────────────────────────

proptest! {
    #[test]
    fn sma_of_constant_is_constant(price in arb_price(), period in 1usize..30, len in 30usize..80) {
        let bars = bars_from_closes(&vec![price; len]);
        let mut sma = Sma::new(period);
        let values = compute(&mut sma, &bars);
        for v in values.iter().flatten() {
            prop_assert!((v - price).abs() < 1e-9);
        }
        prop_assert_eq!(values.defined_from(), Some(period - 1));
    }

    #[test]
    fn ema_step_stays_between_previous_and_input(closes in arb_closes(120), period in 1usize..40) {
        let mut ema = Ema::new(period);
        let mut prev: Option<f64> = None;
        for bar in bars_from_closes(&closes) {
            let Some(cur) = ema.update(&bar) else { continue };
            if let Some(p) = prev {
                let (lo, hi) = (p.min(bar.close), p.max(bar.close));
                prop_assert!(cur >= lo - 1e-9 && cur <= hi + 1e-9, "ema {cur} outside [{lo}, {hi}]");
            }
            prev = Some(cur);
        }
    }

    #[test]
    fn rsi_is_bounded(closes in arb_closes(200), period in 1usize..30) {
        let mut rsi = Rsi::new(period);
        let values = compute(&mut rsi, &bars_from_closes(&closes));
        for v in values.iter().flatten() {
            prop_assert!((0.0..=100.0).contains(&v), "rsi {v}");
        }
    }
}

// ── 4. Crossover exclusivity ─────────────────────────────────────────

proptest! {
    #[test]
    fn crosses_are_mutually_exclusive(
        a in prop::collection::vec(arb_price(), 2..60),
        b in prop::collection::vec(arb_price(), 2..60),
    ) {
        let len = a.len().min(b.len());
        let (sa, sb) = (series_of(&a[..len]), series_of(&b[..len]));
        prop_assert_eq!(Cross::at(&sa, &sb, 0), Cross::None);
        for i in 0..len {
            prop_assert!(!(crosses_above(&sa, &sb, i) && crosses_below(&sa, &sb, i)));
            // Swapping the operands mirrors the direction.
            let swapped = match Cross::at(&sa, &sb, i) {
                Cross::Above => Cross::Below,
                Cross::Below => Cross::Above,
                Cross::None => Cross::None,
            };
            prop_assert_eq!(Cross::at(&sb, &sa, i), swapped);
        }
    }
}

// ── 5. Determinism ───────────────────────────────────────────────────

/// A bar script on which a variant is known to act, with the position held
/// throughout the replay.
struct Fixture {
    kind: StrategyKind,
    params: &'static [(&'static str, f64)],
    bars: Vec<Bar>,
    position: Position,
}

fn bars_from_ohlc(rows: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    rows.iter()
        .enumerate()
        .map(|(i, &(o, h, l, c))| {
            Bar::new(base + chrono::Duration::hours(i as i64), o, h, l, c, 1000.0)
        })
        .collect()
}

/// Continue `bars` hour by hour through `closes`.
fn extend_with_closes(mut bars: Vec<Bar>, closes: &[f64]) -> Vec<Bar> {
    for &close in closes {
        let last = bars.last().unwrap().clone();
        let open = last.close;
        bars.push(Bar::new(
            last.timestamp + chrono::Duration::hours(1),
            open,
            open.max(close) + 1.0,
            open.min(close) - 1.0,
            close,
            1000.0,
        ));
    }
    bars
}

fn fixtures() -> Vec<Fixture> {
    let mut coral: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
    coral.extend([120.0, 131.0, 132.0]);
    let mut ehlers: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
    ehlers.push(60.0);
    let accelerating: Vec<f64> = (0..30).map(|i| 100.0 + (i * i) as f64 * 0.1).collect();
    let scripted = [3.0, 2.0, 1.0, 10.0, 9.0, 8.0, 1.0, 1.0, 1.0];
    let flat = Position::flat();

    vec![
        Fixture {
            kind: StrategyKind::SmaCross,
            params: &[("fast_period", 2.0), ("slow_period", 3.0)],
            bars: bars_from_closes(&scripted),
            position: flat,
        },
        Fixture {
            kind: StrategyKind::RsiOscillator,
            params: &[("rsi_period", 3.0)],
            bars: bars_from_closes(&[10.0, 9.0, 8.0, 7.0]),
            position: flat,
        },
        Fixture {
            kind: StrategyKind::SmaCrossAtr,
            params: &[
                ("fast_period", 2.0),
                ("slow_period", 3.0),
                ("atr_period", 2.0),
                ("sl_multiplier", 1.0),
                ("tp_multiplier", 2.0),
            ],
            bars: bars_from_closes(&scripted),
            position: flat,
        },
        Fixture {
            kind: StrategyKind::EmaBreakout,
            params: &[("ema_period", 3.0), ("atr_period", 2.0)],
            bars: bars_from_closes(&[10.0, 10.0, 10.0, 20.0]),
            position: flat,
        },
        Fixture {
            kind: StrategyKind::EmaBreakoutBidirectional,
            params: &[("ema_period", 3.0), ("atr_period", 2.0)],
            bars: bars_from_closes(&[10.0, 10.0, 10.0, 2.0]),
            position: flat,
        },
        Fixture {
            kind: StrategyKind::EmaBandpassCombo,
            params: &[
                ("fast_period", 3.0),
                ("slow_period", 8.0),
                ("bp_period", 10.0),
                ("bp_delta", 0.3),
            ],
            bars: bars_from_closes(&accelerating),
            position: flat,
        },
        Fixture {
            kind: StrategyKind::AdaptiveT3Squeeze,
            params: &[
                ("rsi_period", 2.0),
                ("t3_min_length", 1.0),
                ("t3_max_length", 3.0),
                ("bb_length", 4.0),
                ("kc_length", 4.0),
                ("kc_mult", 1.5),
                ("momentum_length", 3.0),
            ],
            // Tight drift keeps the squeeze on until the jump releases it.
            bars: bars_from_closes(&[
                100.0, 100.2, 99.9, 100.1, 99.8, 100.0, 99.9, 99.7, 99.5, 99.3, 99.1, 110.0,
            ]),
            position: flat,
        },
        Fixture {
            kind: StrategyKind::EhlersCombo,
            params: &[],
            bars: bars_from_closes(&ehlers),
            position: Position::long(100.0),
        },
        Fixture {
            kind: StrategyKind::BottomCatcher,
            params: &[
                ("rsi_period", 3.0),
                ("entry_fast", 2.0),
                ("entry_slow", 3.0),
                ("exit_fast", 2.0),
                ("exit_slow", 3.0),
            ],
            bars: bars_from_closes(&[10.0, 11.0, 12.0, 13.0, 3.0]),
            position: flat,
        },
        Fixture {
            kind: StrategyKind::LevelBreakout,
            params: &[("lookback", 2.0), ("target_pct", 3.0)],
            bars: bars_from_ohlc(&[
                (100.0, 110.0, 99.0, 105.0),
                (105.0, 106.0, 100.0, 104.0),
                (104.0, 105.0, 101.0, 103.0),
                (103.0, 104.0, 98.0, 99.0),
                (99.0, 105.0, 98.5, 104.5),
            ]),
            position: flat,
        },
        Fixture {
            kind: StrategyKind::CoralPullback,
            params: &[
                ("smoothing", 21.0),
                ("cd", 0.4),
                ("swing_lookback", 10.0),
                ("reward_ratio", 2.0),
            ],
            bars: bars_from_closes(&coral),
            position: flat,
        },
    ]
}

fn replay_actions(
    kind: StrategyKind,
    params: &[(&str, f64)],
    bars: &[Bar],
    position: &Position,
) -> Vec<Action> {
    let mut merged = default_params(kind);
    merged.extend(params.iter().map(|&(k, v)| (k.to_string(), v)));
    let mut instance = build(kind, &merged).unwrap();
    bars.iter()
        .map(|bar| instance.step(bar.clone(), position).unwrap())
        .collect()
}

#[test]
fn every_variant_has_an_acting_fixture() {
    let fixtures = fixtures();
    for kind in StrategyKind::ALL {
        let fixture = fixtures.iter().find(|f| f.kind == kind).unwrap();
        let actions = replay_actions(kind, fixture.params, &fixture.bars, &fixture.position);
        assert!(
            actions.iter().any(|a| !a.is_none()),
            "{kind}: fixture produced no action"
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn replay_is_deterministic(
        which in 0usize..StrategyKind::ALL.len(),
        tail in prop::collection::vec(arb_price(), 0..80),
    ) {
        let all = fixtures();
        let fixture = &all[which];
        let bars = extend_with_closes(fixture.bars.clone(), &tail);
        let first = replay_actions(fixture.kind, fixture.params, &bars, &fixture.position);
        let second = replay_actions(fixture.kind, fixture.params, &bars, &fixture.position);
        prop_assert!(first.iter().any(|a| !a.is_none()), "{}: no action to compare", fixture.kind);
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}

// ── 6. Protective levels ─────────────────────────────────────────────

proptest! {
    #[test]
    fn atr_levels_bracket_entry(
        entry in arb_price(),
        atr in 0.01..20.0_f64,
        sl in 0.1..5.0_f64,
        tp in 0.1..10.0_f64,
        long in any::<bool>(),
    ) {
        let side = if long { TradeSide::Long } else { TradeSide::Short };
        let intent = OrderIntent::from_atr(side, entry, atr, sl, tp).unwrap();
        let target = intent.take_profit.unwrap();
        match side {
            TradeSide::Long => prop_assert!(intent.stop_loss < entry && target > entry),
            TradeSide::Short => prop_assert!(intent.stop_loss > entry && target < entry),
        }
        prop_assert!(intent.risk() > 0.0);
    }

    #[test]
    fn wrong_side_stop_is_rejected(entry in arb_price(), offset in 0.0..50.0_f64, rr in 0.5..5.0_f64) {
        prop_assert!(OrderIntent::from_stop_with_reward(TradeSide::Long, entry, entry + offset, rr).is_none());
        prop_assert!(OrderIntent::from_stop_with_reward(TradeSide::Short, entry, entry - offset, rr).is_none());
    }
}
