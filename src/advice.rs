// =============================================================================
// Advice: one human-readable recommendation per indicator row
// =============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::signals::RsiBounds;
use crate::types::IndicatorRow;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Advice {
    Buy { price: f64 },
    Sell { price: f64 },
    RsiLow { rsi: f64 },
    RsiHigh { rsi: f64 },
    Wait { price: f64 },
}

impl Advice {
    /// Derive the advice for a single row.
    ///
    /// Transitions take precedence; otherwise an RSI extreme is flagged as an
    /// upcoming opportunity, and everything else is "wait".
    pub fn for_row(row: &IndicatorRow, bounds: RsiBounds) -> Self {
        if row.position > 0 {
            return Self::Buy { price: row.price };
        }
        if row.position < 0 {
            return Self::Sell { price: row.price };
        }
        match row.rsi {
            Some(rsi) if rsi < bounds.oversold => Self::RsiLow { rsi },
            Some(rsi) if rsi > bounds.overbought => Self::RsiHigh { rsi },
            _ => Self::Wait { price: row.price },
        }
    }

    /// True for buy and sell transitions.
    pub fn is_action(&self) -> bool {
        matches!(self, Self::Buy { .. } | Self::Sell { .. })
    }
}

impl fmt::Display for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy { price } => write!(f, "buy at {price:.2} USD"),
            Self::Sell { price } => write!(f, "sell at {price:.2} USD"),
            Self::RsiLow { rsi } => {
                write!(f, "RSI low ({rsi:.2}), possible buy opportunity soon")
            }
            Self::RsiHigh { rsi } => {
                write!(f, "RSI high ({rsi:.2}), possible sell opportunity soon")
            }
            Self::Wait { price } => write!(f, "wait, current price = {price:.2} USD"),
        }
    }
}

/// Advice for every row, in order.
pub fn derive_advice(rows: &[IndicatorRow], bounds: RsiBounds) -> Vec<Advice> {
    rows.iter().map(|row| Advice::for_row(row, bounds)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const BOUNDS: RsiBounds = RsiBounds {
        oversold: 30.0,
        overbought: 70.0,
    };

    fn row(position: i8, rsi: Option<f64>) -> IndicatorRow {
        IndicatorRow {
            timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            price: 123.456,
            short_mavg: None,
            long_mavg: None,
            rsi,
            middle_band: None,
            upper_band: None,
            lower_band: None,
            macd: 0.0,
            macd_signal: 0.0,
            signal: 0,
            position,
        }
    }

    #[test]
    fn transitions_win_over_rsi() {
        assert_eq!(
            Advice::for_row(&row(1, Some(10.0)), BOUNDS),
            Advice::Buy { price: 123.456 }
        );
        assert_eq!(
            Advice::for_row(&row(-1, Some(90.0)), BOUNDS),
            Advice::Sell { price: 123.456 }
        );
        // Composite flip from -1 straight to 1.
        assert!(matches!(Advice::for_row(&row(2, None), BOUNDS), Advice::Buy { .. }));
        assert!(matches!(Advice::for_row(&row(-2, None), BOUNDS), Advice::Sell { .. }));
    }

    #[test]
    fn rsi_extremes_and_wait() {
        assert_eq!(
            Advice::for_row(&row(0, Some(25.0)), BOUNDS),
            Advice::RsiLow { rsi: 25.0 }
        );
        assert_eq!(
            Advice::for_row(&row(0, Some(75.0)), BOUNDS),
            Advice::RsiHigh { rsi: 75.0 }
        );
        assert_eq!(
            Advice::for_row(&row(0, Some(30.0)), BOUNDS),
            Advice::Wait { price: 123.456 }
        );
        assert_eq!(
            Advice::for_row(&row(0, None), BOUNDS),
            Advice::Wait { price: 123.456 }
        );
    }

    #[test]
    fn display_text() {
        assert_eq!(Advice::Buy { price: 1.25 }.to_string(), "buy at 1.25 USD");
        assert_eq!(Advice::Sell { price: 64000.0 }.to_string(), "sell at 64000.00 USD");
        assert_eq!(
            Advice::RsiLow { rsi: 21.234 }.to_string(),
            "RSI low (21.23), possible buy opportunity soon"
        );
        assert_eq!(
            Advice::RsiHigh { rsi: 80.0 }.to_string(),
            "RSI high (80.00), possible sell opportunity soon"
        );
        assert_eq!(
            Advice::Wait { price: 99.5 }.to_string(),
            "wait, current price = 99.50 USD"
        );
    }

    #[test]
    fn serialises_with_action_tag() {
        let json = serde_json::to_value(Advice::Buy { price: 2.0 }).unwrap();
        assert_eq!(json["action"], "buy");
        assert_eq!(json["price"], 2.0);
    }
}
