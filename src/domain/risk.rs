//! Risk multiplier: scales a signal by an externally supplied risk score.
//!
//! risk_score >= 5 → 2.0, 2 <= risk_score < 5 → 1.5, otherwise 1.0.
//! A NaN risk score falls through to the low band.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskBand {
    Low,
    Moderate,
    High,
}

impl RiskBand {
    pub fn from_score(risk_score: f64) -> Self {
        if risk_score >= 5.0 {
            RiskBand::High
        } else if risk_score >= 2.0 {
            RiskBand::Moderate
        } else {
            RiskBand::Low
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            RiskBand::High => 2.0,
            RiskBand::Moderate => 1.5,
            RiskBand::Low => 1.0,
        }
    }

    pub fn explanation(self) -> &'static str {
        match self {
            RiskBand::High => "High whale activity/dominance detected - doubling signal strength",
            RiskBand::Moderate => {
                "Moderate whale activity/dominance detected - increasing signal strength by 50%"
            }
            RiskBand::Low => "Normal whale activity/dominance - maintaining original signal strength",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskBand::High => write!(f, "HIGH RISK"),
            RiskBand::Moderate => write!(f, "MODERATE RISK"),
            RiskBand::Low => write!(f, "LOW RISK"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskMultiplier {
    pub risk_score: f64,
    pub band: RiskBand,
    pub multiplier: f64,
}

pub fn get_risk_multiplier(risk_score: f64) -> RiskMultiplier {
    let band = RiskBand::from_score(risk_score);
    RiskMultiplier {
        risk_score,
        band,
        multiplier: band.multiplier(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustedScore {
    pub risk_score: f64,
    pub band: RiskBand,
    pub multiplier: f64,
    pub original_value: f64,
    pub adjusted_value: f64,
    pub explanation: String,
}

impl AdjustedScore {
    pub fn strength_increased(&self) -> bool {
        self.adjusted_value.abs() > self.original_value.abs()
    }
}

pub fn apply_risk_multiplier(signal_value: f64, risk_score: f64) -> AdjustedScore {
    let m = get_risk_multiplier(risk_score);
    AdjustedScore {
        risk_score,
        band: m.band,
        multiplier: m.multiplier,
        original_value: signal_value,
        adjusted_value: signal_value * m.multiplier,
        explanation: m.band.explanation().to_string(),
    }
}

/// Risk-adjust a mean-reversion composite score.
pub fn risk_adjusted_score(mr_score: f64, risk_score: f64) -> AdjustedScore {
    apply_risk_multiplier(mr_score, risk_score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn multiplier_bands() {
        assert_eq!(get_risk_multiplier(5.0).multiplier, 2.0);
        assert_eq!(get_risk_multiplier(9.0).multiplier, 2.0);
        assert_eq!(get_risk_multiplier(4.99).multiplier, 1.5);
        assert_eq!(get_risk_multiplier(2.0).multiplier, 1.5);
        assert_eq!(get_risk_multiplier(1.0).multiplier, 1.0);
        assert_eq!(get_risk_multiplier(-3.0).multiplier, 1.0);
    }

    #[test]
    fn nan_score_is_low_risk() {
        assert_eq!(get_risk_multiplier(f64::NAN).band, RiskBand::Low);
    }

    #[test]
    fn apply_scales_signal() {
        let adjusted = apply_risk_multiplier(-3.0, 6.0);
        assert_relative_eq!(adjusted.adjusted_value, -6.0);
        assert_relative_eq!(adjusted.original_value, -3.0);
        assert_eq!(adjusted.band, RiskBand::High);
        assert!(adjusted.explanation.contains("doubling"));
        assert!(adjusted.strength_increased());
    }

    #[test]
    fn low_risk_leaves_signal_unchanged() {
        let adjusted = risk_adjusted_score(4.0, 0.5);
        assert_relative_eq!(adjusted.adjusted_value, 4.0);
        assert!(!adjusted.strength_increased());
        assert!(adjusted.explanation.contains("maintaining"));
    }

    #[test]
    fn moderate_explanation() {
        let adjusted = apply_risk_multiplier(2.0, 3.0);
        assert_relative_eq!(adjusted.adjusted_value, 3.0);
        assert!(adjusted.explanation.contains("50%"));
    }
}
