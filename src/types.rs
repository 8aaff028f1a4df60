// =============================================================================
// Price series and per-row indicator output
// =============================================================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AdviserError, Result};

/// One daily price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl PriceSample {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }

    /// UTC calendar day this sample belongs to.
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Non-empty, strictly chronological series with one sample per calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    samples: Vec<PriceSample>,
}

impl PriceSeries {
    /// Validate and wrap `samples`.
    ///
    /// Fails with `InvalidInput` when the series is empty, holds a non-finite
    /// price, or is not strictly ascending by calendar day.
    pub fn new(samples: Vec<PriceSample>) -> Result<Self> {
        if samples.is_empty() {
            return Err(AdviserError::invalid_input("price series is empty"));
        }

        for (i, s) in samples.iter().enumerate() {
            if !s.price.is_finite() {
                return Err(AdviserError::invalid_input(format!(
                    "non-finite price at index {i}"
                )));
            }
        }

        for (i, pair) in samples.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp || pair[1].day() <= pair[0].day() {
                return Err(AdviserError::invalid_input(format!(
                    "samples out of order at index {}: {} follows {}",
                    i + 1,
                    pair[1].day(),
                    pair[0].day()
                )));
            }
        }

        Ok(Self { samples })
    }

    /// Build a daily series from raw `(epoch_millis, price)` pairs.
    ///
    /// Pairs are sorted by time; when several fall on the same UTC day the
    /// latest one is kept.
    pub fn from_epoch_millis(pairs: &[(i64, f64)]) -> Result<Self> {
        let mut sorted: Vec<(i64, f64)> = pairs.to_vec();
        sorted.sort_by_key(|&(ms, _)| ms);

        let mut samples: Vec<PriceSample> = Vec::with_capacity(sorted.len());
        for (ms, price) in sorted {
            let timestamp = DateTime::<Utc>::from_timestamp_millis(ms).ok_or_else(|| {
                AdviserError::invalid_input(format!("timestamp {ms} is out of range"))
            })?;
            let sample = PriceSample::new(timestamp, price);

            match samples.last_mut() {
                Some(last) if last.day() == sample.day() => *last = sample,
                _ => samples.push(sample),
            }
        }

        Self::new(samples)
    }

    pub fn samples(&self) -> &[PriceSample] {
        &self.samples
    }

    pub fn prices(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.price).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn last(&self) -> &PriceSample {
        // Non-empty by construction.
        &self.samples[self.samples.len() - 1]
    }
}

/// Derived indicator values for one sample.
///
/// `None` marks a value still inside its indicator's warm-up period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub short_mavg: Option<f64>,
    pub long_mavg: Option<f64>,
    pub rsi: Option<f64>,
    pub middle_band: Option<f64>,
    pub upper_band: Option<f64>,
    pub lower_band: Option<f64>,
    pub macd: f64,
    pub macd_signal: f64,
    /// Trading stance: -1 sell, 0 neutral, 1 buy.
    pub signal: i8,
    /// `signal[i] - signal[i-1]`; zero on the first row.
    ///
    /// Usually -1, 0 or 1. Under the composite policy a direct flip between
    /// -1 and 1 gives -2 or 2.
    pub position: i8,
}

impl IndicatorRow {
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}
