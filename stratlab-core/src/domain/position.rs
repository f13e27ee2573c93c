//! Position — an open trade with its attached risk rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which way the position points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    /// +1 for long, -1 for short. P&L = direction * (price - entry) * size.
    pub fn direction(&self) -> f64 {
        match self {
            Self::Long => 1.0,
            Self::Short => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionStatus {
    Open,
    Closed,
}

/// One take-profit tier: a target price closing a fraction of the size
/// remaining when the tier fills.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TakeProfitTier {
    pub price: f64,
    pub close_fraction: f64,
    pub filled: bool,
}

/// An open (or just-closed) trade, mutated bar by bar.
///
/// Invariants maintained by the simulator:
/// - `stop_price` is set before the entry fill is recorded.
/// - `stop_price` only ever moves in the position's favor (ratchet).
/// - `size <= initial_size`, shrinking as tiers fill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub side: PositionSide,
    pub status: PositionStatus,

    pub entry_bar: usize,
    pub entry_time: DateTime<Utc>,
    /// Slippage-adjusted fill price.
    pub entry_price: f64,
    pub entry_confidence: f64,

    /// Units currently held.
    pub size: f64,
    /// Units at entry, before any tier fills.
    pub initial_size: f64,

    pub stop_price: f64,
    pub tiers: Vec<TakeProfitTier>,

    /// Best price seen since entry, driving the trailing stop.
    pub highest_price_since_entry: f64,
    pub lowest_price_since_entry: f64,
    /// Set once unrealized gain crosses the breakeven trigger.
    pub trailing_active: bool,
}

impl Position {
    pub fn open(
        side: PositionSide,
        entry_bar: usize,
        entry_time: DateTime<Utc>,
        entry_price: f64,
        entry_confidence: f64,
        size: f64,
        stop_price: f64,
        tiers: Vec<TakeProfitTier>,
    ) -> Self {
        Self {
            side,
            status: PositionStatus::Open,
            entry_bar,
            entry_time,
            entry_price,
            entry_confidence,
            size,
            initial_size: size,
            stop_price,
            tiers,
            highest_price_since_entry: entry_price,
            lowest_price_since_entry: entry_price,
            trailing_active: false,
        }
    }

    /// Unrealized P&L of the remaining size at `price`.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.side.direction() * (price - self.entry_price) * self.size
    }

    /// Unrealized gain of the best price since entry, as a fraction of entry.
    pub fn peak_gain_pct(&self) -> f64 {
        match self.side {
            PositionSide::Long => {
                (self.highest_price_since_entry - self.entry_price) / self.entry_price
            }
            PositionSide::Short => {
                (self.entry_price - self.lowest_price_since_entry) / self.entry_price
            }
        }
    }

    /// Record a bar's high/low into the since-entry extremes.
    pub fn update_extremes(&mut self, high: f64, low: f64) {
        if high > self.highest_price_since_entry {
            self.highest_price_since_entry = high;
        }
        if low < self.lowest_price_since_entry {
            self.lowest_price_since_entry = low;
        }
    }

    /// Move the stop to `candidate` only if it is an improvement for this
    /// side. The ratchet: a stop never moves against the position.
    pub fn ratchet_stop(&mut self, candidate: f64) {
        match self.side {
            PositionSide::Long => {
                if candidate > self.stop_price {
                    self.stop_price = candidate;
                }
            }
            PositionSide::Short => {
                if candidate < self.stop_price {
                    self.stop_price = candidate;
                }
            }
        }
    }

    /// True if the bar's range touched the stop.
    pub fn stop_hit(&self, high: f64, low: f64) -> bool {
        match self.side {
            PositionSide::Long => low <= self.stop_price,
            PositionSide::Short => high >= self.stop_price,
        }
    }

    /// True if the bar's range touched the given tier target.
    pub fn tier_hit(&self, tier_price: f64, high: f64, low: f64) -> bool {
        match self.side {
            PositionSide::Long => high >= tier_price,
            PositionSide::Short => low <= tier_price,
        }
    }
}
