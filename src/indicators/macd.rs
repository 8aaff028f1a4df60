// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   MACD      = EMA(close, short_span) - EMA(close, long_span)
//   Signal    = EMA(MACD, signal_span)
//   Histogram = MACD - Signal
// =============================================================================

use serde::{Deserialize, Serialize};

use super::ema::calculate_ema;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdPoint {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Compute MACD aligned with `closes`.
///
/// Returns an empty `Vec` when `closes` is empty or any span is zero.
pub fn calculate_macd(
    closes: &[f64],
    short_span: usize,
    long_span: usize,
    signal_span: usize,
) -> Vec<MacdPoint> {
    let ema_short = calculate_ema(closes, short_span);
    let ema_long = calculate_ema(closes, long_span);
    if ema_short.is_empty() || ema_long.is_empty() {
        return Vec::new();
    }

    let macd: Vec<f64> = ema_short
        .iter()
        .zip(&ema_long)
        .map(|(s, l)| s - l)
        .collect();
    let signal = calculate_ema(&macd, signal_span);
    if signal.is_empty() {
        return Vec::new();
    }

    macd.into_iter()
        .zip(signal)
        .map(|(macd, signal)| MacdPoint {
            macd,
            signal,
            histogram: macd - signal,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macd_empty_input() {
        assert!(calculate_macd(&[], 12, 26, 9).is_empty());
    }

    #[test]
    fn macd_zero_span() {
        assert!(calculate_macd(&[1.0, 2.0], 12, 0, 9).is_empty());
    }

    #[test]
    fn macd_starts_at_zero() {
        let out = calculate_macd(&[50.0, 51.0, 49.0], 12, 26, 9);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].macd, 0.0);
        assert_eq!(out[0].signal, 0.0);
    }

    #[test]
    fn macd_flat_converges_to_zero() {
        for p in calculate_macd(&[100.0; 40], 12, 26, 9) {
            assert!(p.macd.abs() < 1e-9);
            assert!(p.signal.abs() < 1e-9);
        }
    }

    #[test]
    fn macd_positive_in_uptrend() {
        let closes: Vec<f64> = (1..=60).map(|x| x as f64).collect();
        let last = *calculate_macd(&closes, 12, 26, 9).last().unwrap();
        assert!(last.macd > 0.0);
        // Signal lags the rising MACD line.
        assert!(last.histogram > 0.0);
    }
}
