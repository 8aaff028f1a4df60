// =============================================================================
// Indicator Pipeline: PriceSeries in, one IndicatorRow per sample out
// =============================================================================
//
// Stages run in a fixed order over the same price column:
//
//   1. short / long simple moving averages
//   2. RSI
//   3. Bollinger Bands
//   4. MACD + signal line
//   5. signal and position
//
// The pipeline is a pure function of its config and input. It keeps no state
// between runs, so one instance can serve any number of concurrent requests.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{AdviserError, Result};
use crate::indicators::{bollinger, macd, rsi, sma};
use crate::signals::{self, RsiBounds, SignalInputs, SignalPolicy};
use crate::types::{IndicatorRow, PriceSeries};

fn default_short_window() -> usize {
    5
}

fn default_long_window() -> usize {
    20
}

fn default_rsi_window() -> usize {
    14
}

fn default_bollinger_window() -> usize {
    20
}

fn default_bollinger_num_std() -> f64 {
    2.0
}

fn default_macd_short_span() -> usize {
    12
}

fn default_macd_long_span() -> usize {
    26
}

fn default_macd_signal_span() -> usize {
    9
}

fn default_rsi_oversold() -> f64 {
    30.0
}

fn default_rsi_overbought() -> f64 {
    70.0
}

/// Window lengths, spans and thresholds for every pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_short_window")]
    pub short_window: usize,

    #[serde(default = "default_long_window")]
    pub long_window: usize,

    #[serde(default = "default_rsi_window")]
    pub rsi_window: usize,

    #[serde(default = "default_bollinger_window")]
    pub bollinger_window: usize,

    /// Band distance from the middle, in standard deviations.
    #[serde(default = "default_bollinger_num_std")]
    pub bollinger_num_std: f64,

    #[serde(default = "default_macd_short_span")]
    pub macd_short_span: usize,

    #[serde(default = "default_macd_long_span")]
    pub macd_long_span: usize,

    #[serde(default = "default_macd_signal_span")]
    pub macd_signal_span: usize,

    /// RSI below this counts as oversold.
    #[serde(default = "default_rsi_oversold")]
    pub rsi_oversold: f64,

    /// RSI above this counts as overbought.
    #[serde(default = "default_rsi_overbought")]
    pub rsi_overbought: f64,

    #[serde(default)]
    pub policy: SignalPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            short_window: default_short_window(),
            long_window: default_long_window(),
            rsi_window: default_rsi_window(),
            bollinger_window: default_bollinger_window(),
            bollinger_num_std: default_bollinger_num_std(),
            macd_short_span: default_macd_short_span(),
            macd_long_span: default_macd_long_span(),
            macd_signal_span: default_macd_signal_span(),
            rsi_oversold: default_rsi_oversold(),
            rsi_overbought: default_rsi_overbought(),
            policy: SignalPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Reject parameter sets that would make a stage meaningless.
    pub fn validate(&self) -> Result<()> {
        let windows = [
            ("short_window", self.short_window),
            ("long_window", self.long_window),
            ("rsi_window", self.rsi_window),
            ("bollinger_window", self.bollinger_window),
            ("macd_short_span", self.macd_short_span),
            ("macd_long_span", self.macd_long_span),
            ("macd_signal_span", self.macd_signal_span),
        ];
        for (name, value) in windows {
            if value == 0 {
                return Err(AdviserError::invalid_input(format!("{name} must be at least 1")));
            }
        }

        if self.bollinger_window < 2 {
            return Err(AdviserError::invalid_input(
                "bollinger_window must be at least 2",
            ));
        }
        if !self.bollinger_num_std.is_finite() || self.bollinger_num_std < 0.0 {
            return Err(AdviserError::invalid_input(
                "bollinger_num_std must be a finite, non-negative number",
            ));
        }
        if !(self.rsi_oversold < self.rsi_overbought) {
            return Err(AdviserError::invalid_input(format!(
                "rsi_oversold ({}) must be below rsi_overbought ({})",
                self.rsi_oversold, self.rsi_overbought
            )));
        }

        Ok(())
    }

    pub fn rsi_bounds(&self) -> RsiBounds {
        RsiBounds {
            oversold: self.rsi_oversold,
            overbought: self.rsi_overbought,
        }
    }
}

/// Stateless indicator/signal transform.
#[derive(Debug, Clone)]
pub struct IndicatorPipeline {
    config: PipelineConfig,
}

impl IndicatorPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn rsi_bounds(&self) -> RsiBounds {
        self.config.rsi_bounds()
    }

    /// Compute every indicator column and the signal for each sample.
    ///
    /// Output length always equals `series.len()`.
    pub fn run(&self, series: &PriceSeries) -> Vec<IndicatorRow> {
        let cfg = &self.config;
        let prices = series.prices();

        let short_mavg = sma::rolling_mean(&prices, cfg.short_window);
        let long_mavg = sma::rolling_mean(&prices, cfg.long_window);
        let rsi = rsi::calculate_rsi(&prices, cfg.rsi_window);
        let bands =
            bollinger::calculate_bollinger(&prices, cfg.bollinger_window, cfg.bollinger_num_std);
        let macd_points = macd::calculate_macd(
            &prices,
            cfg.macd_short_span,
            cfg.macd_long_span,
            cfg.macd_signal_span,
        );
        let macd: Vec<f64> = macd_points.iter().map(|p| p.macd).collect();
        let macd_signal: Vec<f64> = macd_points.iter().map(|p| p.signal).collect();

        let inputs = SignalInputs {
            short_mavg: &short_mavg,
            long_mavg: &long_mavg,
            rsi: &rsi,
            macd: &macd,
            macd_signal: &macd_signal,
        };
        let signal =
            signals::generate_signals(cfg.policy, &inputs, cfg.short_window, cfg.rsi_bounds());
        let position = signals::positions(&signal);

        series
            .samples()
            .iter()
            .enumerate()
            .map(|(i, sample)| IndicatorRow {
                timestamp: sample.timestamp,
                price: sample.price,
                short_mavg: short_mavg[i],
                long_mavg: long_mavg[i],
                rsi: rsi[i],
                middle_band: bands[i].map(|b| b.middle),
                upper_band: bands[i].map(|b| b.upper),
                lower_band: bands[i].map(|b| b.lower),
                macd: macd[i],
                macd_signal: macd_signal[i],
                signal: signal[i],
                position: position[i],
            })
            .collect()
    }
}
