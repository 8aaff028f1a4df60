// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the trailing sample standard
// deviation over the same window.

use serde::{Deserialize, Serialize};

use super::sma::{rolling_mean, rolling_std};

/// Band values for a single row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Calculate Bollinger Bands aligned with `closes`.
///
/// Rows inside the warm-up period (`i < period - 1`) are `None`, as is every
/// row when `period < 2`.
pub fn calculate_bollinger(
    closes: &[f64],
    period: usize,
    num_std: f64,
) -> Vec<Option<BollingerBands>> {
    let middle = rolling_mean(closes, period);
    let std_dev = rolling_std(closes, period);

    middle
        .into_iter()
        .zip(std_dev)
        .map(|(m, sd)| match (m, sd) {
            (Some(middle), Some(sd)) => Some(BollingerBands {
                upper: middle + num_std * sd,
                middle,
                lower: middle - num_std * sd,
            }),
            _ => None,
        })
        .collect()
}
