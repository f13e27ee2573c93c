//! Trade — a completed (possibly partial) position close.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::position::PositionSide;

/// Why a close happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    StopLoss,
    /// Take-profit tier index, 0-based in ascending distance from entry.
    TakeProfit(u8),
    SignalReversal,
    EndOfData,
}

/// Record of one close event. A position with partial take-profit tiers
/// produces several of these, each covering the units closed at that event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub side: PositionSide,
    pub entry_time: DateTime<Utc>,
    /// Slippage-adjusted entry fill.
    pub entry_price: f64,
    pub exit_time: DateTime<Utc>,
    /// Slippage-adjusted exit fill.
    pub exit_price: f64,
    /// Units closed by this event.
    pub size: f64,
    /// Price move P&L before fees.
    pub gross_pnl: f64,
    /// Commission on both fills, prorated for partial closes.
    pub fees: f64,
    pub net_pnl: f64,
    pub exit_reason: ExitReason,
    /// Confidence of the signal that opened the position.
    pub entry_confidence: f64,
    pub bars_held: usize,
}

impl TradeRecord {
    pub fn is_win(&self) -> bool {
        self.net_pnl > 0.0
    }

    /// Net return on the notional committed to this slice of the position.
    pub fn return_pct(&self) -> f64 {
        let notional = self.entry_price * self.size;
        if notional == 0.0 {
            0.0
        } else {
            self.net_pnl / notional
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_trade() -> TradeRecord {
        TradeRecord {
            side: PositionSide::Long,
            entry_time: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            entry_price: 100.0,
            exit_time: Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap(),
            exit_price: 110.0,
            size: 2.0,
            gross_pnl: 20.0,
            fees: 0.42,
            net_pnl: 19.58,
            exit_reason: ExitReason::TakeProfit(0),
            entry_confidence: 0.72,
            bars_held: 3,
        }
    }

    #[test]
    fn win_detection() {
        let mut t = sample_trade();
        assert!(t.is_win());
        t.net_pnl = -1.0;
        assert!(!t.is_win());
        t.net_pnl = 0.0;
        assert!(!t.is_win(), "scratch trades are not wins");
    }

    #[test]
    fn return_pct_on_notional() {
        let t = sample_trade();
        assert!((t.return_pct() - 19.58 / 200.0).abs() < 1e-10);
    }

    #[test]
    fn exit_reason_serializes_tier_index() {
        let json = serde_json::to_string(&ExitReason::TakeProfit(1)).unwrap();
        let back: ExitReason = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ExitReason::TakeProfit(1));
    }
}
