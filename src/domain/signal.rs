//! Signal interpretation: indicator values to qualitative states, and states
//! to an overall direction or a BUY/SELL/HOLD trading signal.
//!
//! | Indicator | DOWNWARD | UPWARD | NEUTRAL   |
//! |-----------|----------|--------|-----------|
//! | Z-score   | > 2.0    | < -2.0 | otherwise |
//! | RSI       | > 70     | < 30   | otherwise |
//! | %B        | > 1.0    | < 0.0  | otherwise |

use serde::Serialize;
use std::fmt;

use crate::domain::indicator::{IndicatorBundle, Interpretation, Macd};

pub const Z_THRESHOLD: f64 = 2.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;
pub const PERCENT_B_UPPER: f64 = 1.0;
pub const PERCENT_B_LOWER: f64 = 0.0;

/// Majority vote of Z-score, RSI and %B states.
pub type OverallSignal = Interpretation;

pub fn interpret_z_score(z_score: f64) -> Interpretation {
    classify(z_score, -Z_THRESHOLD, Z_THRESHOLD)
}

pub fn interpret_rsi(rsi: f64) -> Interpretation {
    classify(rsi, RSI_OVERSOLD, RSI_OVERBOUGHT)
}

pub fn interpret_percent_b(percent_b: f64) -> Interpretation {
    classify(percent_b, PERCENT_B_LOWER, PERCENT_B_UPPER)
}

/// Positive histogram reads bullish (upward), otherwise bearish.
pub fn interpret_macd(macd: &Macd) -> Interpretation {
    if macd.histogram > 0.0 {
        Interpretation::Upward
    } else {
        Interpretation::Downward
    }
}

fn classify(value: f64, lower: f64, upper: f64) -> Interpretation {
    if value > upper {
        Interpretation::Downward
    } else if value < lower {
        Interpretation::Upward
    } else {
        Interpretation::Neutral
    }
}

/// Count UPWARD vs DOWNWARD states; the majority wins, a tie is NEUTRAL.
pub fn aggregate(states: &[Interpretation]) -> OverallSignal {
    let upward = states.iter().filter(|s| **s == Interpretation::Upward).count();
    let downward = states
        .iter()
        .filter(|s| **s == Interpretation::Downward)
        .count();

    match upward.cmp(&downward) {
        std::cmp::Ordering::Greater => Interpretation::Upward,
        std::cmp::Ordering::Less => Interpretation::Downward,
        std::cmp::Ordering::Equal => Interpretation::Neutral,
    }
}

/// Overall direction of a bundle from its Z-score, RSI and %B states.
pub fn interpret(bundle: &IndicatorBundle) -> OverallSignal {
    aggregate(&[
        bundle.z_score.interpretation,
        bundle.rsi.interpretation,
        bundle.bollinger.interpretation,
    ])
}

/// The three values the trading rules look at on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub z_score: f64,
    pub rsi: f64,
    pub percent_b: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSignal {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for TradeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSignal::Buy => write!(f, "BUY"),
            TradeSignal::Sell => write!(f, "SELL"),
            TradeSignal::Hold => write!(f, "HOLD"),
        }
    }
}

/// Entry/exit thresholds of the mean-reversion rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalRules {
    pub z_threshold: f64,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
}

impl Default for SignalRules {
    fn default() -> Self {
        SignalRules {
            z_threshold: Z_THRESHOLD,
            rsi_oversold: RSI_OVERSOLD,
            rsi_overbought: RSI_OVERBOUGHT,
        }
    }
}

impl SignalRules {
    /// z < -threshold OR rsi < oversold OR %B < 0
    pub fn buy(&self, s: &IndicatorSnapshot) -> bool {
        s.z_score < -self.z_threshold || s.rsi < self.rsi_oversold || s.percent_b < PERCENT_B_LOWER
    }

    /// z > threshold OR rsi > overbought OR %B > 1
    pub fn sell(&self, s: &IndicatorSnapshot) -> bool {
        s.z_score > self.z_threshold || s.rsi > self.rsi_overbought || s.percent_b > PERCENT_B_UPPER
    }
}

/// BUY takes precedence when both conditions hold.
pub fn trade_signal(snapshot: &IndicatorSnapshot, rules: &SignalRules) -> TradeSignal {
    if rules.buy(snapshot) {
        TradeSignal::Buy
    } else if rules.sell(snapshot) {
        TradeSignal::Sell
    } else {
        TradeSignal::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(z_score: f64, rsi: f64, percent_b: f64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            z_score,
            rsi,
            percent_b,
        }
    }

    #[test]
    fn z_score_thresholds() {
        assert_eq!(interpret_z_score(2.5), Interpretation::Downward);
        assert_eq!(interpret_z_score(-2.5), Interpretation::Upward);
        assert_eq!(interpret_z_score(2.0), Interpretation::Neutral);
        assert_eq!(interpret_z_score(-2.0), Interpretation::Neutral);
    }

    #[test]
    fn rsi_thresholds() {
        assert_eq!(interpret_rsi(75.0), Interpretation::Downward);
        assert_eq!(interpret_rsi(25.0), Interpretation::Upward);
        assert_eq!(interpret_rsi(70.0), Interpretation::Neutral);
        assert_eq!(interpret_rsi(30.0), Interpretation::Neutral);
    }

    #[test]
    fn percent_b_thresholds() {
        assert_eq!(interpret_percent_b(1.2), Interpretation::Downward);
        assert_eq!(interpret_percent_b(-0.1), Interpretation::Upward);
        assert_eq!(interpret_percent_b(0.0), Interpretation::Neutral);
        assert_eq!(interpret_percent_b(1.0), Interpretation::Neutral);
    }

    #[test]
    fn macd_histogram_sign() {
        let bullish = Macd {
            macd_line: 1.0,
            signal_line: 0.5,
            histogram: 0.5,
        };
        let bearish = Macd {
            histogram: -0.5,
            ..bullish
        };
        assert_eq!(interpret_macd(&bullish), Interpretation::Upward);
        assert_eq!(interpret_macd(&bearish), Interpretation::Downward);
    }

    #[test]
    fn aggregate_majority_and_tie() {
        use Interpretation::*;
        assert_eq!(aggregate(&[Upward, Upward, Downward]), Upward);
        assert_eq!(aggregate(&[Downward, Neutral, Neutral]), Downward);
        assert_eq!(aggregate(&[Upward, Downward, Neutral]), Neutral);
        assert_eq!(aggregate(&[Neutral, Neutral, Neutral]), Neutral);
        assert_eq!(aggregate(&[]), Neutral);
    }

    #[test]
    fn buy_on_any_oversold_condition() {
        let rules = SignalRules::default();
        assert!(rules.buy(&snap(-2.1, 50.0, 0.5)));
        assert!(rules.buy(&snap(0.0, 29.0, 0.5)));
        assert!(rules.buy(&snap(0.0, 50.0, -0.01)));
        assert!(!rules.buy(&snap(0.0, 50.0, 0.5)));
    }

    #[test]
    fn sell_on_any_overbought_condition() {
        let rules = SignalRules::default();
        assert!(rules.sell(&snap(2.1, 50.0, 0.5)));
        assert!(rules.sell(&snap(0.0, 71.0, 0.5)));
        assert!(rules.sell(&snap(0.0, 50.0, 1.01)));
        assert!(!rules.sell(&snap(0.0, 50.0, 0.5)));
    }

    #[test]
    fn trade_signal_prefers_buy() {
        let rules = SignalRules::default();
        assert_eq!(trade_signal(&snap(-3.0, 80.0, 0.5), &rules), TradeSignal::Buy);
        assert_eq!(trade_signal(&snap(3.0, 50.0, 0.5), &rules), TradeSignal::Sell);
        assert_eq!(trade_signal(&snap(0.0, 50.0, 0.5), &rules), TradeSignal::Hold);
    }

    #[test]
    fn trade_signal_display() {
        assert_eq!(TradeSignal::Buy.to_string(), "BUY");
        assert_eq!(TradeSignal::Sell.to_string(), "SELL");
        assert_eq!(TradeSignal::Hold.to_string(), "HOLD");
    }
}
