//! Strategy registry: variant identifiers, parameter schemas and construction.
//!
//! Every variant has a stable identifier and a schema listing its parameters
//! (kind, inclusive range, default, required flag). `build_strategy` validates
//! a parameter map against the schema and the variant's cross-parameter
//! constraints before constructing anything, so indicator constructors never
//! see values they would reject.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tracing::info;

use super::strategy::adaptive_t3_squeeze::AdaptiveT3SqueezeParams;
use super::strategy::bottom_catcher::BottomCatcherParams;
use super::strategy::ehlers_combo::EhlersComboParams;
use super::strategy::{
    AdaptiveT3Squeeze, BottomCatcher, CoralPullback, EhlersCombo, EmaBandpassCombo, EmaBreakout,
    LevelBreakout, RsiOscillator, SmaCross, SmaCrossAtr, Strategy, StrategyInstance,
};

/// Parameter map. Integers are whole floats, flags are 0 or 1.
pub type Params = BTreeMap<String, f64>;

// ─── Error type ──────────────────────────────────────────────────────

/// Errors raised while resolving a variant and its parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown strategy variant: {0}")]
    UnknownVariant(String),
    #[error("{variant}: missing required parameter `{name}`")]
    MissingParameter { variant: &'static str, name: String },
    #[error("{variant}: unknown parameter `{name}`")]
    UnknownParameter { variant: &'static str, name: String },
    #[error("{variant}: `{name}` = {value} outside [{min}, {max}]")]
    OutOfRange {
        variant: &'static str,
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{variant}: `{name}` = {value} must be a whole number")]
    NotAnInteger {
        variant: &'static str,
        name: String,
        value: f64,
    },
    #[error("{variant}: {message}")]
    Constraint {
        variant: &'static str,
        message: String,
    },
}

// ─── Variants ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StrategyKind {
    SmaCross,
    RsiOscillator,
    SmaCrossAtr,
    EmaBreakout,
    EmaBreakoutBidirectional,
    EmaBandpassCombo,
    AdaptiveT3Squeeze,
    EhlersCombo,
    BottomCatcher,
    LevelBreakout,
    CoralPullback,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 11] = [
        StrategyKind::SmaCross,
        StrategyKind::RsiOscillator,
        StrategyKind::SmaCrossAtr,
        StrategyKind::EmaBreakout,
        StrategyKind::EmaBreakoutBidirectional,
        StrategyKind::EmaBandpassCombo,
        StrategyKind::AdaptiveT3Squeeze,
        StrategyKind::EhlersCombo,
        StrategyKind::BottomCatcher,
        StrategyKind::LevelBreakout,
        StrategyKind::CoralPullback,
    ];

    /// Stable identifier used in configuration.
    pub fn id(self) -> &'static str {
        match self {
            StrategyKind::SmaCross => "sma_cross",
            StrategyKind::RsiOscillator => "rsi_oscillator",
            StrategyKind::SmaCrossAtr => "sma_cross_atr",
            StrategyKind::EmaBreakout => "ema_breakout",
            StrategyKind::EmaBreakoutBidirectional => "ema_breakout_bidirectional",
            StrategyKind::EmaBandpassCombo => "ema_bandpass_combo",
            StrategyKind::AdaptiveT3Squeeze => "adaptive_t3_squeeze",
            StrategyKind::EhlersCombo => "ehlers_combo",
            StrategyKind::BottomCatcher => "bottom_catcher",
            StrategyKind::LevelBreakout => "level_breakout",
            StrategyKind::CoralPullback => "coral_pullback",
        }
    }

    pub fn schema(self) -> &'static [ParamSpec] {
        match self {
            StrategyKind::SmaCross => SMA_CROSS,
            StrategyKind::RsiOscillator => RSI_OSCILLATOR,
            StrategyKind::SmaCrossAtr => SMA_CROSS_ATR,
            StrategyKind::EmaBreakout | StrategyKind::EmaBreakoutBidirectional => EMA_BREAKOUT,
            StrategyKind::EmaBandpassCombo => EMA_BANDPASS_COMBO,
            StrategyKind::AdaptiveT3Squeeze => ADAPTIVE_T3_SQUEEZE,
            StrategyKind::EhlersCombo => EHLERS_COMBO,
            StrategyKind::BottomCatcher => BOTTOM_CATCHER,
            StrategyKind::LevelBreakout => LEVEL_BREAKOUT,
            StrategyKind::CoralPullback => CORAL_PULLBACK,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| ConfigError::UnknownVariant(s.to_string()))
    }
}

// ─── Schemas ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    Float,
    Flag,
}

/// One entry of a variant's parameter schema. Ranges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub required: bool,
}

impl ParamSpec {
    const fn int(name: &'static str, min: f64, max: f64, default: f64) -> Self {
        Self {
            name,
            kind: ParamKind::Int,
            min,
            max,
            default,
            required: false,
        }
    }

    const fn float(name: &'static str, min: f64, max: f64, default: f64) -> Self {
        Self {
            name,
            kind: ParamKind::Float,
            min,
            max,
            default,
            required: false,
        }
    }

    const fn flag(name: &'static str, default: bool) -> Self {
        Self {
            name,
            kind: ParamKind::Flag,
            min: 0.0,
            max: 1.0,
            default: if default { 1.0 } else { 0.0 },
            required: false,
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

const MAX_PERIOD: f64 = 5000.0;

const SMA_CROSS: &[ParamSpec] = &[
    ParamSpec::int("fast_period", 1.0, MAX_PERIOD, 10.0).required(),
    ParamSpec::int("slow_period", 2.0, MAX_PERIOD, 50.0).required(),
];

const RSI_OSCILLATOR: &[ParamSpec] = &[
    ParamSpec::int("rsi_period", 1.0, MAX_PERIOD, 14.0).required(),
    ParamSpec::float("lower_bound", 0.0, 100.0, 30.0),
    ParamSpec::float("upper_bound", 0.0, 100.0, 70.0),
];

const SMA_CROSS_ATR: &[ParamSpec] = &[
    ParamSpec::int("fast_period", 1.0, MAX_PERIOD, 10.0).required(),
    ParamSpec::int("slow_period", 2.0, MAX_PERIOD, 50.0).required(),
    ParamSpec::int("atr_period", 1.0, MAX_PERIOD, 14.0),
    ParamSpec::float("sl_multiplier", 0.01, 50.0, 2.0),
    ParamSpec::float("tp_multiplier", 0.01, 100.0, 3.0),
];

const EMA_BREAKOUT: &[ParamSpec] = &[
    ParamSpec::int("ema_period", 1.0, MAX_PERIOD, 50.0).required(),
    ParamSpec::int("atr_period", 1.0, MAX_PERIOD, 14.0),
    ParamSpec::float("atr_multiplier", 0.0, 50.0, 1.0),
    ParamSpec::float("reward_ratio", 0.1, 20.0, 2.0),
    ParamSpec::int("swing_lookback", 0.0, MAX_PERIOD, 0.0),
];

const EMA_BANDPASS_COMBO: &[ParamSpec] = &[
    ParamSpec::int("fast_period", 1.0, MAX_PERIOD, 12.0).required(),
    ParamSpec::int("slow_period", 2.0, MAX_PERIOD, 26.0).required(),
    ParamSpec::int("bp_period", 2.0, MAX_PERIOD, 20.0),
    ParamSpec::float("bp_delta", 0.001, 100.0, 0.3),
    ParamSpec::float("bp_zone", 0.0, 1e9, 0.0),
    ParamSpec::flag("invert", false),
];

const ADAPTIVE_T3_SQUEEZE: &[ParamSpec] = &[
    ParamSpec::int("rsi_period", 1.0, MAX_PERIOD, 14.0),
    ParamSpec::int("t3_min_length", 1.0, MAX_PERIOD, 5.0),
    ParamSpec::int("t3_max_length", 1.0, MAX_PERIOD, 50.0),
    ParamSpec::float("volume_factor", 0.0, 1.0, 0.7),
    ParamSpec::int("bb_length", 1.0, MAX_PERIOD, 20.0),
    ParamSpec::float("bb_mult", 0.01, 10.0, 2.0),
    ParamSpec::int("kc_length", 1.0, MAX_PERIOD, 20.0),
    ParamSpec::float("kc_mult", 0.01, 10.0, 1.5),
    ParamSpec::flag("use_true_range", true),
    ParamSpec::int("momentum_length", 2.0, MAX_PERIOD, 20.0),
];

const EHLERS_COMBO: &[ParamSpec] = &[
    ParamSpec::int("bp_period", 2.0, MAX_PERIOD, 20.0),
    ParamSpec::float("bp_delta", 0.001, 100.0, 0.3),
    ParamSpec::float("itrend_alpha", 0.001, 0.999, 0.07),
    ParamSpec::int("filter_period", 1.0, MAX_PERIOD, 20.0),
    ParamSpec::int("rank_length", 2.0, MAX_PERIOD, 10.0),
    ParamSpec::float("snr_threshold", -100.0, 100.0, 3.0),
    ParamSpec::int("exit_lag", 0.0, 500.0, 2.0),
    ParamSpec::int("cross_window", 1.0, 500.0, 1.0),
];

const BOTTOM_CATCHER: &[ParamSpec] = &[
    ParamSpec::int("rsi_period", 1.0, MAX_PERIOD, 14.0),
    ParamSpec::float("oversold", 0.0, 100.0, 30.0),
    ParamSpec::float("overbought", 0.0, 100.0, 70.0),
    ParamSpec::float("rsi_drop", 0.0, 100.0, 5.0),
    ParamSpec::int("entry_fast", 1.0, MAX_PERIOD, 5.0),
    ParamSpec::int("entry_slow", 2.0, MAX_PERIOD, 20.0),
    ParamSpec::int("exit_fast", 1.0, MAX_PERIOD, 5.0),
    ParamSpec::int("exit_slow", 2.0, MAX_PERIOD, 20.0),
];

const LEVEL_BREAKOUT: &[ParamSpec] = &[
    ParamSpec::int("lookback", 2.0, MAX_PERIOD, 5.0),
    ParamSpec::float("target_pct", 0.01, 100.0, 3.0),
];

const CORAL_PULLBACK: &[ParamSpec] = &[
    ParamSpec::int("smoothing", 1.0, MAX_PERIOD, 21.0),
    ParamSpec::float("cd", 0.01, 1.0, 0.4),
    ParamSpec::int("swing_lookback", 1.0, MAX_PERIOD, 10.0),
    ParamSpec::float("reward_ratio", 0.1, 20.0, 2.0),
];

// ─── Resolution ──────────────────────────────────────────────────────

/// Parameter values checked against a schema, defaults filled in.
struct Resolved {
    kind: StrategyKind,
    values: BTreeMap<&'static str, f64>,
}

impl Resolved {
    fn new(kind: StrategyKind, params: &Params) -> Result<Self, ConfigError> {
        let variant = kind.id();
        let schema = kind.schema();

        if let Some(name) = params
            .keys()
            .find(|name| !schema.iter().any(|spec| spec.name == name.as_str()))
        {
            return Err(ConfigError::UnknownParameter {
                variant,
                name: name.clone(),
            });
        }

        let mut values = BTreeMap::new();
        for spec in schema {
            let value = match params.get(spec.name) {
                Some(&value) => value,
                None if spec.required => {
                    return Err(ConfigError::MissingParameter {
                        variant,
                        name: spec.name.to_string(),
                    })
                }
                None => spec.default,
            };
            if !value.is_finite() || value < spec.min || value > spec.max {
                return Err(ConfigError::OutOfRange {
                    variant,
                    name: spec.name.to_string(),
                    value,
                    min: spec.min,
                    max: spec.max,
                });
            }
            if spec.kind != ParamKind::Float && value.fract() != 0.0 {
                return Err(ConfigError::NotAnInteger {
                    variant,
                    name: spec.name.to_string(),
                    value,
                });
            }
            values.insert(spec.name, value);
        }
        Ok(Self { kind, values })
    }

    fn float(&self, name: &str) -> f64 {
        self.values.get(name).copied().unwrap_or(f64::NAN)
    }

    fn int(&self, name: &str) -> usize {
        self.values.get(name).map_or(0, |&v| v as usize)
    }

    fn flag(&self, name: &str) -> bool {
        self.values.get(name).is_some_and(|&v| v != 0.0)
    }

    fn constraint(&self, ok: bool, message: impl FnOnce() -> String) -> Result<(), ConfigError> {
        if ok {
            Ok(())
        } else {
            Err(ConfigError::Constraint {
                variant: self.kind.id(),
                message: message(),
            })
        }
    }

    fn fast_below_slow(&self, fast: &str, slow: &str) -> Result<(), ConfigError> {
        let (f, s) = (self.int(fast), self.int(slow));
        self.constraint(f < s, || format!("{fast} ({f}) must be < {slow} ({s})"))
    }

    fn ordered(&self, lower: &str, upper: &str) -> Result<(), ConfigError> {
        let (l, u) = (self.float(lower), self.float(upper));
        self.constraint(l < u, || format!("{lower} ({l}) must be < {upper} ({u})"))
    }

    fn bandpass_delta(&self) -> Result<(), ConfigError> {
        let (period, delta) = (self.int("bp_period"), self.float("bp_delta"));
        self.constraint(delta < period as f64 / 8.0, || {
            format!("bp_delta ({delta}) must be < bp_period / 8 ({})", period as f64 / 8.0)
        })
    }

    fn check_constraints(&self) -> Result<(), ConfigError> {
        match self.kind {
            StrategyKind::SmaCross | StrategyKind::SmaCrossAtr => {
                self.fast_below_slow("fast_period", "slow_period")
            }
            StrategyKind::RsiOscillator => self.ordered("lower_bound", "upper_bound"),
            StrategyKind::EmaBandpassCombo => {
                self.fast_below_slow("fast_period", "slow_period")?;
                self.bandpass_delta()
            }
            StrategyKind::AdaptiveT3Squeeze => {
                let (min, max) = (self.int("t3_min_length"), self.int("t3_max_length"));
                self.constraint(min <= max, || {
                    format!("t3_min_length ({min}) must be <= t3_max_length ({max})")
                })
            }
            StrategyKind::EhlersCombo => self.bandpass_delta(),
            StrategyKind::BottomCatcher => {
                self.ordered("oversold", "overbought")?;
                self.fast_below_slow("entry_fast", "entry_slow")?;
                self.fast_below_slow("exit_fast", "exit_slow")
            }
            StrategyKind::EmaBreakout
            | StrategyKind::EmaBreakoutBidirectional
            | StrategyKind::LevelBreakout
            | StrategyKind::CoralPullback => Ok(()),
        }
    }

    fn construct(&self) -> Box<dyn Strategy> {
        match self.kind {
            StrategyKind::SmaCross => Box::new(SmaCross::new(
                self.int("fast_period"),
                self.int("slow_period"),
            )),
            StrategyKind::RsiOscillator => Box::new(RsiOscillator::new(
                self.int("rsi_period"),
                self.float("lower_bound"),
                self.float("upper_bound"),
            )),
            StrategyKind::SmaCrossAtr => Box::new(SmaCrossAtr::new(
                self.int("fast_period"),
                self.int("slow_period"),
                self.int("atr_period"),
                self.float("sl_multiplier"),
                self.float("tp_multiplier"),
            )),
            StrategyKind::EmaBreakout | StrategyKind::EmaBreakoutBidirectional => {
                Box::new(EmaBreakout::new(
                    self.int("ema_period"),
                    self.int("atr_period"),
                    self.float("atr_multiplier"),
                    self.float("reward_ratio"),
                    self.int("swing_lookback"),
                    self.kind == StrategyKind::EmaBreakoutBidirectional,
                ))
            }
            StrategyKind::EmaBandpassCombo => Box::new(EmaBandpassCombo::new(
                self.int("fast_period"),
                self.int("slow_period"),
                self.int("bp_period"),
                self.float("bp_delta"),
                self.float("bp_zone"),
                self.flag("invert"),
            )),
            StrategyKind::AdaptiveT3Squeeze => {
                Box::new(AdaptiveT3Squeeze::new(AdaptiveT3SqueezeParams {
                    rsi_period: self.int("rsi_period"),
                    t3_min_length: self.int("t3_min_length"),
                    t3_max_length: self.int("t3_max_length"),
                    volume_factor: self.float("volume_factor"),
                    bb_length: self.int("bb_length"),
                    bb_mult: self.float("bb_mult"),
                    kc_length: self.int("kc_length"),
                    kc_mult: self.float("kc_mult"),
                    use_true_range: self.flag("use_true_range"),
                    momentum_length: self.int("momentum_length"),
                }))
            }
            StrategyKind::EhlersCombo => Box::new(EhlersCombo::new(EhlersComboParams {
                bp_period: self.int("bp_period"),
                bp_delta: self.float("bp_delta"),
                itrend_alpha: self.float("itrend_alpha"),
                filter_period: self.int("filter_period"),
                rank_length: self.int("rank_length"),
                snr_threshold: self.float("snr_threshold"),
                exit_lag: self.int("exit_lag"),
                cross_window: self.int("cross_window"),
            })),
            StrategyKind::BottomCatcher => Box::new(BottomCatcher::new(BottomCatcherParams {
                rsi_period: self.int("rsi_period"),
                oversold: self.float("oversold"),
                overbought: self.float("overbought"),
                rsi_drop: self.float("rsi_drop"),
                entry_fast: self.int("entry_fast"),
                entry_slow: self.int("entry_slow"),
                exit_fast: self.int("exit_fast"),
                exit_slow: self.int("exit_slow"),
            })),
            StrategyKind::LevelBreakout => Box::new(LevelBreakout::new(
                self.int("lookback"),
                self.float("target_pct"),
            )),
            StrategyKind::CoralPullback => Box::new(CoralPullback::new(
                self.int("smoothing"),
                self.float("cd"),
                self.int("swing_lookback"),
                self.float("reward_ratio"),
            )),
        }
    }
}

// ─── Public entry points ─────────────────────────────────────────────

/// Build a strategy instance for `kind` after validating `params`.
pub fn build(kind: StrategyKind, params: &Params) -> Result<StrategyInstance, ConfigError> {
    let resolved = Resolved::new(kind, params)?;
    resolved.check_constraints()?;
    let instance = StrategyInstance::new(kind, resolved.construct());
    info!(
        variant = kind.id(),
        name = instance.name(),
        warmup = instance.required_warmup(),
        "strategy built"
    );
    Ok(instance)
}

/// Build a strategy instance from its variant identifier.
pub fn build_strategy(variant: &str, params: &Params) -> Result<StrategyInstance, ConfigError> {
    build(variant.parse()?, params)
}

/// Every parameter of `kind` at its default value.
pub fn default_params(kind: StrategyKind) -> Params {
    kind.schema()
        .iter()
        .map(|spec| (spec.name.to_string(), spec.default))
        .collect()
}
