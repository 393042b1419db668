//! Mean-reversion composite score in [-10, 10].
//!
//! Positive scores point to upward reversion, negative to downward; the
//! magnitude is the strength. Components:
//! - Z: clamp(-z × z_multiplier, -z_cap, z_cap)
//! - RSI: 0 inside [30, 70], linear in the distance past either bound, capped at rsi_cap
//! - %B: 0 inside [0, 1], linear in the distance past either bound, capped at percent_b_cap

use serde::Serialize;
use std::fmt;

use crate::domain::signal::{
    IndicatorSnapshot, PERCENT_B_LOWER, PERCENT_B_UPPER, RSI_OVERBOUGHT, RSI_OVERSOLD,
};

pub const SCORE_LIMIT: f64 = 10.0;

/// Tunable scaling constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreWeights {
    pub z_multiplier: f64,
    pub z_cap: f64,
    pub rsi_cap: f64,
    pub percent_b_cap: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights {
            z_multiplier: 1.0,
            z_cap: 5.0,
            rsi_cap: 3.0,
            percent_b_cap: 4.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub z_component: f64,
    pub rsi_component: f64,
    pub percent_b_component: f64,
    pub score: f64,
}

pub fn score_breakdown(snapshot: &IndicatorSnapshot, weights: &ScoreWeights) -> ScoreBreakdown {
    let z_component = (-snapshot.z_score * weights.z_multiplier).clamp(-weights.z_cap, weights.z_cap);

    // RSI runs 0..100, so the full 30-point distance past a bound maps to the cap.
    let rsi_component = if snapshot.rsi < RSI_OVERSOLD {
        weights.rsi_cap * (RSI_OVERSOLD - snapshot.rsi) / RSI_OVERSOLD
    } else if snapshot.rsi > RSI_OVERBOUGHT {
        -weights.rsi_cap * (snapshot.rsi - RSI_OVERBOUGHT) / (100.0 - RSI_OVERBOUGHT)
    } else {
        0.0
    };
    let rsi_component = rsi_component.clamp(-weights.rsi_cap, weights.rsi_cap);

    // One full band-width outside the band saturates the component.
    let percent_b_component = if snapshot.percent_b < PERCENT_B_LOWER {
        weights.percent_b_cap * (PERCENT_B_LOWER - snapshot.percent_b).min(1.0)
    } else if snapshot.percent_b > PERCENT_B_UPPER {
        -weights.percent_b_cap * (snapshot.percent_b - PERCENT_B_UPPER).min(1.0)
    } else {
        0.0
    };

    let score = (z_component + rsi_component + percent_b_component).clamp(-SCORE_LIMIT, SCORE_LIMIT);

    ScoreBreakdown {
        z_component,
        rsi_component,
        percent_b_component,
        score,
    }
}

pub fn mean_reversion_score(snapshot: &IndicatorSnapshot, weights: &ScoreWeights) -> f64 {
    score_breakdown(snapshot, weights).score
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReversionDirection {
    StrongUpward,
    ModerateUpward,
    Neutral,
    ModerateDownward,
    StrongDownward,
}

impl ReversionDirection {
    pub fn from_score(score: f64) -> Self {
        if score > 3.0 {
            ReversionDirection::StrongUpward
        } else if score > 0.0 {
            ReversionDirection::ModerateUpward
        } else if score == 0.0 {
            ReversionDirection::Neutral
        } else if score > -3.0 {
            ReversionDirection::ModerateDownward
        } else {
            ReversionDirection::StrongDownward
        }
    }
}

impl fmt::Display for ReversionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReversionDirection::StrongUpward => "STRONG UPWARD REVERSION POTENTIAL",
            ReversionDirection::ModerateUpward => "MODERATE UPWARD REVERSION POTENTIAL",
            ReversionDirection::Neutral => "NO REVERSION SIGNAL",
            ReversionDirection::ModerateDownward => "MODERATE DOWNWARD REVERSION POTENTIAL",
            ReversionDirection::StrongDownward => "STRONG DOWNWARD REVERSION POTENTIAL",
        };
        write!(f, "{label}")
    }
}
