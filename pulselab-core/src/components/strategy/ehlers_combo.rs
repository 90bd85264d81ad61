//! Ehlers cycle toolkit combined into one six-way entry filter.
//!
//! Long entry requires all of:
//! 1. bandpass crossed above zero
//! 2. trendline trigger crossed above the instantaneous trendline
//! 3. close crossed above EMA(filter_period)
//! 4. close above a rising trendline
//! 5. Spearman rank signal positive
//! 6. SNR above `snr_threshold`
//!
//! Crosses 1-3 count when they happened within the last `cross_window` bars.
//! Short entry mirrors every condition.
//!
//! Exit long when the close crosses below the trendline as it stood
//! `exit_lag` bars earlier; exit short mirrors. Entries are checked first.

use crate::components::crossover::Cross;
use crate::components::indicator::{Indicator, Series};
use crate::domain::{Action, BarSeries, Position};
use crate::indicators::{Bandpass, Ema, InstantaneousTrendline, SignalToNoise, SpearmanOscillator};

use super::{enter_unless_long, enter_unless_short, Strategy};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EhlersComboParams {
    pub bp_period: usize,
    pub bp_delta: f64,
    pub itrend_alpha: f64,
    pub filter_period: usize,
    pub rank_length: usize,
    pub snr_threshold: f64,
    pub exit_lag: usize,
    pub cross_window: usize,
}

#[derive(Debug, Clone)]
pub struct EhlersCombo {
    params: EhlersComboParams,
    bandpass: Bandpass,
    itrend: InstantaneousTrendline,
    ema: Ema,
    spearman: SpearmanOscillator,
    snr: SignalToNoise,
    closes: Series,
    bp_values: Series,
    itrend_values: Series,
    trigger_values: Series,
    ema_values: Series,
    rank_signals: Series,
    snr_values: Series,
    name: String,
}

impl EhlersCombo {
    pub fn new(params: EhlersComboParams) -> Self {
        assert!(params.cross_window >= 1, "cross_window must be >= 1");
        Self {
            params,
            bandpass: Bandpass::new(params.bp_period, params.bp_delta),
            itrend: InstantaneousTrendline::new(params.itrend_alpha),
            ema: Ema::new(params.filter_period),
            spearman: SpearmanOscillator::new(params.rank_length),
            snr: SignalToNoise::new(),
            closes: Series::new(),
            bp_values: Series::new(),
            itrend_values: Series::new(),
            trigger_values: Series::new(),
            ema_values: Series::new(),
            rank_signals: Series::new(),
            snr_values: Series::new(),
            name: format!(
                "ehlers_combo_{}_{}_{}",
                params.bp_period, params.filter_period, params.rank_length
            ),
        }
    }

    /// Whether `cross` happened at one of the last `cross_window` bars.
    fn crossed_recently(&self, cross: impl Fn(usize) -> Cross, want: Cross) -> bool {
        let newest = self.closes.len().saturating_sub(1);
        (0..self.params.cross_window)
            .filter_map(|k| newest.checked_sub(k))
            .any(|i| cross(i) == want)
    }

    /// Entry conditions for one side, `want` being the required cross direction.
    fn entry_conditions(&self, want: Cross) -> Option<bool> {
        let close = self.closes.ago(0)?;
        let it = self.itrend_values.ago(0)?;
        let it_prev = self.itrend_values.ago(1)?;
        let rank = self.rank_signals.last()?;
        let snr = self.snr_values.last()?;

        let trend_ok = match want {
            Cross::Above => close > it && it > it_prev,
            Cross::Below => close < it && it < it_prev,
            Cross::None => return None,
        };
        let rank_ok = match want {
            Cross::Above => rank > 0.0,
            _ => rank < 0.0,
        };
        let crosses_ok = self
            .crossed_recently(|i| Cross::at_level(&self.bp_values, 0.0, i), want)
            && self.crossed_recently(
                |i| Cross::at(&self.trigger_values, &self.itrend_values, i),
                want,
            )
            && self.crossed_recently(|i| Cross::at(&self.closes, &self.ema_values, i), want);

        Some(crosses_ok && trend_ok && rank_ok && snr > self.params.snr_threshold)
    }

    /// Close crossed the trendline lagged by `exit_lag` bars.
    fn lagged_trend_cross(&self) -> Option<Cross> {
        let lag = self.params.exit_lag;
        let close = self.closes.ago(0)?;
        let prev_close = self.closes.ago(1)?;
        let it = self.itrend_values.ago(lag)?;
        let prev_it = self.itrend_values.ago(lag + 1)?;
        Some(Cross::detect(prev_close, prev_it, close, it))
    }
}

impl Strategy for EhlersCombo {
    fn name(&self) -> &str {
        &self.name
    }

    fn warmup_bars(&self) -> usize {
        self.params
            .filter_period
            .max(self.spearman.lookback() + 1)
            .max(self.snr.lookback())
            .max(self.bandpass.lookback() + 1)
            .max(self.params.exit_lag + 1)
    }

    fn on_bar(&mut self, bars: &BarSeries) {
        let Some(bar) = bars.last() else { return };
        self.closes.push(Some(bar.close));
        self.bp_values.push(self.bandpass.update(bar));
        let point = self.itrend.next_point(bar.hl2());
        self.itrend_values.push(Some(point.itrend));
        self.trigger_values.push(point.trigger);
        self.ema_values.push(self.ema.update(bar));
        let rank = self
            .spearman
            .next_point(bar.close)
            .and_then(|p| p.signal)
            .map(f64::from);
        self.rank_signals.push(rank);
        self.snr_values.push(self.snr.update(bar));
    }

    fn decide(&mut self, _bars: &BarSeries, position: &Position) -> Action {
        if self.entry_conditions(Cross::Above) == Some(true) {
            return enter_unless_long(position, Action::enter_long());
        }
        if self.entry_conditions(Cross::Below) == Some(true) {
            return enter_unless_short(position, Action::enter_short());
        }
        match self.lagged_trend_cross() {
            Some(Cross::Below) if position.is_long() => Action::CloseLong,
            Some(Cross::Above) if position.is_short() => Action::CloseShort,
            _ => Action::None,
        }
    }
}
