//! Ehlers signal-to-noise ratio with dominant cycle period.
//!
//! Homodyne discriminator on the bar midpoint:
//! - smooth = (4·p0 + 3·p1 + 2·p2 + p3) / 10
//! - H(x) = (0.0962·x0 + 0.5769·x2 - 0.5769·x4 - 0.0962·x6) · (0.075·period[-1] + 0.54)
//! - detrender = H(smooth), Q1 = H(detrender), I1 = detrender[3]
//! - jI = H(I1), jQ = H(Q1)
//! - I2 = I1 - jQ, Q2 = Q1 + jI, both smoothed 0.2 / 0.8
//! - Re = I2·I2[-1] + Q2·Q2[-1], Im = I2·Q2[-1] - Q2·I2[-1], both smoothed 0.2 / 0.8
//! - period = 2π / atan(Im / Re), limited to [0.67, 1.5] × period[-1] and to
//!   [6, 100], then smoothed 0.2 / 0.8
//!
//! Noise is the smoothed bar range. SNR in decibel-like units:
//!   amp   = 0.2·(I1² + Q1²) + 0.8·amp[-1]
//!   range = 0.1·(high - low) + 0.9·range[-1]
//!   snr   = 0.25·(10·log10(amp / range²) + 6) + 0.75·snr[-1]
//! A zero amplitude or range holds the previous SNR.
//!
//! The first six bars only seed the buffers. Lookback: 6.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::window::LagBuffer;

const SEED_BARS: usize = 6;
const MIN_PERIOD: f64 = 6.0;
const MAX_PERIOD: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CyclePoint {
    pub snr: f64,
    pub period: f64,
    pub smooth_period: f64,
}

#[derive(Debug, Clone)]
pub struct SignalToNoise {
    prices: LagBuffer<4>,
    smooth: LagBuffer<7>,
    detrender: LagBuffer<7>,
    i1: LagBuffer<7>,
    q1: LagBuffer<7>,
    i2: f64,
    q2: f64,
    re: f64,
    im: f64,
    period: f64,
    smooth_period: f64,
    amp: f64,
    range: f64,
    snr: f64,
    seen: usize,
}

impl Default for SignalToNoise {
    fn default() -> Self {
        Self::new()
    }
}

fn hilbert<const N: usize>(buf: &LagBuffer<N>) -> f64 {
    0.0962 * buf.at(0) + 0.5769 * buf.at(2) - 0.5769 * buf.at(4) - 0.0962 * buf.at(6)
}

impl SignalToNoise {
    pub fn new() -> Self {
        Self {
            prices: LagBuffer::new(),
            smooth: LagBuffer::new(),
            detrender: LagBuffer::new(),
            i1: LagBuffer::new(),
            q1: LagBuffer::new(),
            i2: 0.0,
            q2: 0.0,
            re: 0.0,
            im: 0.0,
            period: MIN_PERIOD,
            smooth_period: MIN_PERIOD,
            amp: 0.0,
            range: 0.0,
            snr: 0.0,
            seen: 0,
        }
    }

    pub fn smooth_period(&self) -> f64 {
        self.smooth_period
    }

    pub fn next_point(&mut self, bar: &Bar) -> Option<CyclePoint> {
        let price = bar.hl2();
        self.prices.push(price);
        let smooth = if self.seen >= 3 {
            (4.0 * self.prices.at(0)
                + 3.0 * self.prices.at(1)
                + 2.0 * self.prices.at(2)
                + self.prices.at(3))
                / 10.0
        } else {
            price
        };
        self.smooth.push(smooth);
        self.seen += 1;

        if self.seen <= SEED_BARS {
            self.detrender.push(0.0);
            self.i1.push(0.0);
            self.q1.push(0.0);
            self.range = 0.1 * bar.range() + 0.9 * self.range;
            return None;
        }

        let gain = 0.075 * self.period + 0.54;
        self.detrender.push(hilbert(&self.smooth) * gain);
        let q1 = hilbert(&self.detrender) * gain;
        let i1 = self.detrender.at(3);
        self.q1.push(q1);
        self.i1.push(i1);

        let j_i = hilbert(&self.i1) * gain;
        let j_q = hilbert(&self.q1) * gain;

        let i2 = 0.2 * (i1 - j_q) + 0.8 * self.i2;
        let q2 = 0.2 * (q1 + j_i) + 0.8 * self.q2;

        let re = 0.2 * (i2 * self.i2 + q2 * self.q2) + 0.8 * self.re;
        let im = 0.2 * (i2 * self.q2 - q2 * self.i2) + 0.8 * self.im;
        self.i2 = i2;
        self.q2 = q2;
        self.re = re;
        self.im = im;

        let prev_period = self.period;
        let mut period = prev_period;
        if im != 0.0 && re != 0.0 {
            period = 2.0 * PI / (im / re).atan();
        }
        period = period
            .min(1.5 * prev_period)
            .max(0.67 * prev_period)
            .clamp(MIN_PERIOD, MAX_PERIOD);
        self.period = 0.2 * period + 0.8 * prev_period;
        self.smooth_period = 0.33 * self.period + 0.67 * self.smooth_period;

        self.amp = 0.2 * (i1 * i1 + q1 * q1) + 0.8 * self.amp;
        self.range = 0.1 * bar.range() + 0.9 * self.range;
        if self.amp > 0.0 && self.range > 0.0 {
            let db = 10.0 * (self.amp / (self.range * self.range)).log10() + 6.0;
            self.snr = 0.25 * db + 0.75 * self.snr;
        }

        Some(CyclePoint {
            snr: self.snr,
            period: self.period,
            smooth_period: self.smooth_period,
        })
    }
}

impl Indicator for SignalToNoise {
    fn name(&self) -> &str {
        "snr"
    }

    fn lookback(&self) -> usize {
        SEED_BARS
    }

    /// Returns the SNR.
    fn update(&mut self, bar: &Bar) -> Option<f64> {
        self.next_point(bar).map(|p| p.snr)
    }
}
