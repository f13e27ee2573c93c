//! Trading signal types: direction, strength buckets, market regime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trade direction decision at a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Buy,
    Sell,
    Hold,
}

/// Discrete strength bucket, derived from confidence via fixed thresholds.
///
/// `Weak` is only reachable below the tradeable `min_confidence` thresholds,
/// so emitted signals can carry it but the simulator never opens on one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalStrength {
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl SignalStrength {
    /// Bucket a confidence score: >= 0.8 VeryStrong, >= 0.65 Strong,
    /// >= 0.5 Moderate, else Weak.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            Self::VeryStrong
        } else if confidence >= 0.65 {
            Self::Strong
        } else if confidence >= 0.5 {
            Self::Moderate
        } else {
            Self::Weak
        }
    }
}

/// Market regime classification, computed per bar before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketRegime {
    TrendingUp,
    TrendingDown,
    Ranging,
    HighVolatility,
    LowVolatility,
}

/// One scoring rule's contribution to a signal, kept for auditability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalFactor {
    pub name: String,
    /// Signed contribution: positive supported the winning direction,
    /// negative weakened it.
    pub contribution: f64,
}

/// Trading decision at a single bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub timestamp: DateTime<Utc>,
    pub direction: Direction,
    /// Normalized confidence in [0, 1].
    pub confidence: f64,
    pub strength: SignalStrength,
    pub regime: MarketRegime,
    /// Scoring rules that fired, with their signed contributions.
    pub factors: Vec<SignalFactor>,
}

impl Signal {
    /// A no-action signal with the given regime context.
    pub fn hold(timestamp: DateTime<Utc>, regime: MarketRegime) -> Self {
        Self {
            timestamp,
            direction: Direction::Hold,
            confidence: 0.0,
            strength: SignalStrength::Weak,
            regime,
            factors: Vec::new(),
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.direction != Direction::Hold
    }
}
