// =============================================================================
// Relative Strength Index (RSI): simple rolling averages
// =============================================================================
//
// RSI measures the balance of recent up-moves against down-moves.
//
// Step 1: delta_i = close_i - close_{i-1}. The first close has no
//          predecessor; it contributes zero gain and zero loss.
// Step 2: avg_gain_i = mean of max(delta, 0) over the trailing `period` rows
//          avg_loss_i = mean of max(-delta, 0) over the same rows
// Step 3: RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Division by zero: no movement at all gives 50, gains without losses 100.
// =============================================================================

use super::sma::rolling_mean;

/// Compute the RSI series aligned with `closes`.
///
/// # Edge cases
/// - `period == 0` => all `None`
/// - indices `< period - 1` => `None`
/// - average loss zero => 100.0, both averages zero => 50.0
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; closes.len()];
    }

    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        let delta = if i == 0 { 0.0 } else { closes[i] - closes[i - 1] };
        gains.push(delta.max(0.0));
        losses.push((-delta).max(0.0));
    }

    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);

    avg_gain
        .into_iter()
        .zip(avg_loss)
        .map(|(g, l)| match (g, l) {
            (Some(g), Some(l)) => rsi_from_averages(g, l),
            _ => None,
        })
        .collect()
}

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    if rsi.is_finite() {
        Some(rsi.clamp(0.0, 100.0))
    } else {
        None
    }
}
