// =============================================================================
// Rolling window statistics: Simple Moving Average and sample std-dev
// =============================================================================
//
// Both functions look at the trailing `window` values ending at each index:
//
//   SMA_i = (x_{i-w+1} + ... + x_i) / w
//   SD_i  = sqrt( Σ (x_k - SMA_i)^2 / (w - 1) )      (sample, n-1 denominator)
//
// Each window is summed directly rather than with a running total so long
// series do not accumulate drift and constant inputs reproduce exactly.
// =============================================================================

/// Trailing arithmetic mean over `window` values.
///
/// # Edge cases
/// - `window == 0` => every element `None`
/// - indices `< window - 1` => `None` (warm-up)
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            Some(slice.iter().sum::<f64>() / window as f64)
        })
        .collect()
}

/// Trailing sample standard deviation over `window` values.
///
/// A sample deviation needs at least two points, so `window < 2` yields all
/// `None`.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window < 2 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            let mean = slice.iter().sum::<f64>() / window as f64;
            let variance =
                slice.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (window - 1) as f64;
            Some(variance.sqrt())
        })
        .collect()
}
