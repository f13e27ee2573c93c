//! Core domain types shared across the engine.

pub mod bar;
pub mod position;
pub mod signal;
pub mod trade;

pub use bar::Bar;
pub use position::{Position, PositionSide, PositionStatus, TakeProfitTier};
pub use signal::{Direction, MarketRegime, Signal, SignalFactor, SignalStrength};
pub use trade::{ExitReason, TradeRecord};
