// =============================================================================
// Exponential Moving Average (EMA): span form
// =============================================================================
//
// Formula:
//   alpha  = 2 / (span + 1)
//   EMA_0  = x_0
//   EMA_t  = alpha * x_t + (1 - alpha) * EMA_{t-1}
//
// Seeding with the first observation means there is no hard warm-up: every
// index has a value, though early values lean heavily on the seed.
// =============================================================================

/// Compute the EMA series for `values` with the given `span`.
///
/// Returns an empty `Vec` when the input is empty or `span == 0`.
pub fn calculate_ema(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || values.is_empty() {
        return Vec::new();
    }

    let alpha = 2.0 / (span as f64 + 1.0);

    let mut result = Vec::with_capacity(values.len());
    let mut prev = values[0];
    result.push(prev);

    for &x in &values[1..] {
        prev = alpha * x + (1.0 - alpha) * prev;
        result.push(prev);
    }

    result
}
