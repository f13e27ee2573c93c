//! stratlab-core: the backtesting engine.
//!
//! Pipeline, per bar slice: indicators → signals → risk plans → simulated
//! fills. Everything in this crate is deterministic and single-threaded;
//! orchestration, metrics, and parameter search live in `stratlab-runner`.

pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod risk;
pub mod signal;
pub mod sim;

pub use config::{BacktestConfig, IndicatorConfig, RiskConfig, RunId, SignalConfig};
pub use data::{synthetic_bars, validate_bars};
pub use domain::{
    Bar, Direction, ExitReason, MarketRegime, Position, PositionSide, Signal, SignalFactor,
    SignalStrength, TakeProfitTier, TradeRecord,
};
pub use error::{ConfigError, DataError};
pub use indicators::{IndicatorSeries, IndicatorSnapshot};
pub use risk::{RiskManager, TradePlan};
pub use signal::SignalGenerator;
pub use sim::{EquityPoint, PortfolioSimulator, SignalEvent, SimulationOutput};
