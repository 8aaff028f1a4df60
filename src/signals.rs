// =============================================================================
// Signal generation: per-row trading stance and its transitions
// =============================================================================
//
// Two policies:
//
//   Simple:    1 while the short moving average sits above the long one
//               (from index `short_window` on), else 0.
//   Composite: 1 when trend, momentum and RSI all point up:
//                 short > long AND macd > signal AND rsi < oversold
//               -1 when all three point down:
//                 short < long AND macd < signal AND rsi > overbought
//               else 0.
//
// The buy check runs first; the sell check only touches rows buy left at 0.
// With finite inputs the two conjunctions cannot both hold, so the order
// only matters if that ever changes.
//
// Position is the edge-triggered transition: signal_i - signal_{i-1}.
// =============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalPolicy {
    /// Moving-average crossover only.
    Simple,
    /// Crossover confirmed by MACD and RSI.
    #[default]
    Composite,
}

impl fmt::Display for SignalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Composite => write!(f, "composite"),
        }
    }
}

impl FromStr for SignalPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "composite" => Ok(Self::Composite),
            other => Err(format!(
                "unknown signal policy '{other}' (expected 'simple' or 'composite')"
            )),
        }
    }
}

/// Indicator columns the signal rules read. All slices share one length.
#[derive(Debug, Clone, Copy)]
pub struct SignalInputs<'a> {
    pub short_mavg: &'a [Option<f64>],
    pub long_mavg: &'a [Option<f64>],
    pub rsi: &'a [Option<f64>],
    pub macd: &'a [f64],
    pub macd_signal: &'a [f64],
}

/// RSI thresholds used by the composite rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RsiBounds {
    pub oversold: f64,
    pub overbought: f64,
}

/// `short_window` only affects the simple policy's start index.
pub fn generate_signals(
    policy: SignalPolicy,
    inputs: &SignalInputs<'_>,
    short_window: usize,
    bounds: RsiBounds,
) -> Vec<i8> {
    match policy {
        SignalPolicy::Simple => simple_signals(inputs, short_window),
        SignalPolicy::Composite => composite_signals(inputs, bounds),
    }
}

fn simple_signals(inputs: &SignalInputs<'_>, short_window: usize) -> Vec<i8> {
    let n = inputs.short_mavg.len();
    (0..n)
        .map(|i| {
            if i < short_window {
                return 0;
            }
            match (inputs.short_mavg[i], inputs.long_mavg[i]) {
                (Some(s), Some(l)) if s > l => 1,
                _ => 0,
            }
        })
        .collect()
}

fn composite_signals(inputs: &SignalInputs<'_>, bounds: RsiBounds) -> Vec<i8> {
    let n = inputs.short_mavg.len();
    let mut signals = vec![0_i8; n];

    for (i, slot) in signals.iter_mut().enumerate() {
        let (Some(short), Some(long), Some(rsi)) =
            (inputs.short_mavg[i], inputs.long_mavg[i], inputs.rsi[i])
        else {
            continue;
        };
        let macd = inputs.macd[i];
        let macd_signal = inputs.macd_signal[i];

        if short > long && macd > macd_signal && rsi < bounds.oversold {
            *slot = 1;
        }
    }

    for (i, slot) in signals.iter_mut().enumerate() {
        if *slot == 1 {
            continue;
        }
        let (Some(short), Some(long), Some(rsi)) =
            (inputs.short_mavg[i], inputs.long_mavg[i], inputs.rsi[i])
        else {
            continue;
        };
        if short < long && inputs.macd[i] < inputs.macd_signal[i] && rsi > bounds.overbought {
            *slot = -1;
        }
    }

    signals
}

/// Edge-triggered transitions of `signals`; the first row is always 0.
pub fn positions(signals: &[i8]) -> Vec<i8> {
    let mut out = Vec::with_capacity(signals.len());
    if signals.is_empty() {
        return out;
    }
    out.push(0);
    out.extend(signals.windows(2).map(|w| w[1] - w[0]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: RsiBounds = RsiBounds {
        oversold: 30.0,
        overbought: 70.0,
    };

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("Simple".parse::<SignalPolicy>(), Ok(SignalPolicy::Simple));
        assert_eq!(" composite ".parse::<SignalPolicy>(), Ok(SignalPolicy::Composite));
        assert!("momentum".parse::<SignalPolicy>().is_err());
        assert_eq!(SignalPolicy::default(), SignalPolicy::Composite);
    }

    #[test]
    fn simple_waits_for_short_window() {
        let short = vec![Some(2.0); 6];
        let long = vec![Some(1.0); 6];
        let inputs = SignalInputs {
            short_mavg: &short,
            long_mavg: &long,
            rsi: &[None; 6],
            macd: &[0.0; 6],
            macd_signal: &[0.0; 6],
        };
        let signals = generate_signals(SignalPolicy::Simple, &inputs, 5, BOUNDS);
        assert_eq!(signals, vec![0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn simple_undefined_long_is_no_signal() {
        let short = vec![Some(2.0); 8];
        let long = vec![None; 8];
        let inputs = SignalInputs {
            short_mavg: &short,
            long_mavg: &long,
            rsi: &[None; 8],
            macd: &[0.0; 8],
            macd_signal: &[0.0; 8],
        };
        let signals = generate_signals(SignalPolicy::Simple, &inputs, 5, BOUNDS);
        assert!(signals.iter().all(|&s| s == 0));
    }

    #[test]
    fn composite_requires_full_conjunction() {
        // Row 0: all three bullish. Row 1: crossover only. Row 2: all bearish.
        // Row 3: bearish trend but RSI neutral.
        let short = [Some(11.0), Some(11.0), Some(9.0), Some(9.0)];
        let long = [Some(10.0); 4];
        let rsi = [Some(25.0), Some(50.0), Some(75.0), Some(50.0)];
        let macd = [1.0, 1.0, -1.0, -1.0];
        let macd_signal = [0.0; 4];
        let inputs = SignalInputs {
            short_mavg: &short,
            long_mavg: &long,
            rsi: &rsi,
            macd: &macd,
            macd_signal: &macd_signal,
        };
        let signals = generate_signals(SignalPolicy::Composite, &inputs, 5, BOUNDS);
        assert_eq!(signals, vec![1, 0, -1, 0]);
    }

    #[test]
    fn composite_buy_and_sell_are_exclusive() {
        let mut short = Vec::new();
        let mut rsi = Vec::new();
        let mut macd = Vec::new();
        for s in [9.0, 10.0, 11.0] {
            for r in [20.0, 50.0, 80.0] {
                for m in [-1.0, 0.0, 1.0] {
                    short.push(Some(s));
                    rsi.push(Some(r));
                    macd.push(m);
                }
            }
        }
        let n = short.len();
        let long = vec![Some(10.0); n];
        let macd_signal = vec![0.0; n];
        let inputs = SignalInputs {
            short_mavg: &short,
            long_mavg: &long,
            rsi: &rsi,
            macd: &macd,
            macd_signal: &macd_signal,
        };
        let signals = generate_signals(SignalPolicy::Composite, &inputs, 5, BOUNDS);

        for i in 0..n {
            let (s, r, m) = (short[i].unwrap(), rsi[i].unwrap(), macd[i]);
            let buy = s > 10.0 && m > 0.0 && r < 30.0;
            let sell = s < 10.0 && m < 0.0 && r > 70.0;
            assert!(!(buy && sell));
            let expected = if buy { 1 } else if sell { -1 } else { 0 };
            assert_eq!(signals[i], expected, "row {i}");
        }
        assert_eq!(signals.iter().filter(|&&s| s == 1).count(), 1);
        assert_eq!(signals.iter().filter(|&&s| s == -1).count(), 1);
    }

    #[test]
    fn composite_undefined_rsi_is_no_signal() {
        let short = [Some(11.0)];
        let long = [Some(10.0)];
        let inputs = SignalInputs {
            short_mavg: &short,
            long_mavg: &long,
            rsi: &[None],
            macd: &[1.0],
            macd_signal: &[0.0],
        };
        assert_eq!(
            generate_signals(SignalPolicy::Composite, &inputs, 5, BOUNDS),
            vec![0]
        );
    }

    #[test]
    fn positions_are_first_differences() {
        assert!(positions(&[]).is_empty());
        assert_eq!(positions(&[1]), vec![0]);
        assert_eq!(positions(&[0, 1, 1, 0, -1, 1]), vec![0, 1, 0, -1, -1, 2]);
    }
}
