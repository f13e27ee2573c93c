//! Bar-by-bar portfolio simulation.
//!
//! One position at a time, long or short. Per-bar order is fixed:
//!   1. stop-loss check (full close)
//!   2. take-profit tiers, nearest first (partial closes)
//!   3. trailing-stop update and signal-reversal exit
//!   4. entry, if flat and the daily limits allow
//! Stop and tier triggers read the bar's high/low; every fill executes at
//! that bar's close adjusted for slippage, with commission charged on the
//! fill notional. Equity is marked to market on every bar.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::BacktestConfig;
use crate::data::validate_bars;
use crate::domain::{
    Bar, Direction, ExitReason, Position, PositionSide, PositionStatus, TradeRecord,
};
use crate::error::DataError;
use crate::indicators::IndicatorSeries;
use crate::risk::{update_trailing_stop, RiskManager};
use crate::signal::SignalGenerator;

/// Mark-to-market equity at one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
}

/// Audit record of an actionable signal, kept when `record_signals` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalEvent {
    pub timestamp: DateTime<Utc>,
    pub direction: Direction,
    pub confidence: f64,
    pub price: f64,
}

/// Raw simulation output, before metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<TradeRecord>,
    pub signals: Vec<SignalEvent>,
    pub final_equity: f64,
}

/// Per-calendar-day circuit breaker state.
struct DayState {
    date: NaiveDate,
    trades_opened: usize,
    start_equity: f64,
    loss_blocked: bool,
}

pub struct PortfolioSimulator<'a> {
    config: &'a BacktestConfig,
}

impl<'a> PortfolioSimulator<'a> {
    pub fn new(config: &'a BacktestConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, bars: &[Bar]) -> Result<SimulationOutput, DataError> {
        validate_bars(bars, self.config.warmup_bars() + 1)?;

        let series = IndicatorSeries::compute(bars, &self.config.indicators);
        let generator = SignalGenerator::new(&self.config.signals);
        let risk = RiskManager::new(&self.config.risk);

        let mut cash = self.config.initial_capital;
        let mut position: Option<Position> = None;
        let mut trades: Vec<TradeRecord> = Vec::new();
        let mut signals: Vec<SignalEvent> = Vec::new();
        let mut equity_curve = Vec::with_capacity(bars.len());

        let mut day = DayState {
            date: bars[0].timestamp.date_naive(),
            trades_opened: 0,
            start_equity: cash,
            loss_blocked: false,
        };

        for (i, bar) in bars.iter().enumerate() {
            let today = bar.timestamp.date_naive();
            if today != day.date {
                day.date = today;
                day.trades_opened = 0;
                day.start_equity = mark_equity(cash, position.as_ref(), bar.open);
                day.loss_blocked = false;
            }

            let signal = generator.generate(bars, &series, i);
            if self.config.record_signals && signal.is_actionable() {
                signals.push(SignalEvent {
                    timestamp: bar.timestamp,
                    direction: signal.direction,
                    confidence: signal.confidence,
                    price: bar.close,
                });
            }

            if let Some(mut pos) = position.take() {
                // 1. Stop-loss, full close. Worst-case ordering: when the
                // stop and a tier both trigger intrabar, the stop wins.
                if pos.stop_hit(bar.high, bar.low) {
                    let record = self.close_slice(&pos, pos.size, bar, i, ExitReason::StopLoss);
                    cash += self.exit_cash_delta(&pos, &record);
                    pos.status = PositionStatus::Closed;
                    trades.push(record);
                } else {
                    // 2. Take-profit tiers, nearest first.
                    for t in 0..pos.tiers.len() {
                        let tier = pos.tiers[t];
                        if tier.filled || !pos.tier_hit(tier.price, bar.high, bar.low) {
                            continue;
                        }
                        let close_size = pos.size * tier.close_fraction;
                        let record = self.close_slice(
                            &pos,
                            close_size,
                            bar,
                            i,
                            ExitReason::TakeProfit(t as u8),
                        );
                        cash += self.exit_cash_delta(&pos, &record);
                        pos.tiers[t].filled = true;
                        pos.size -= close_size;
                        trades.push(record);
                    }

                    // 3. Trailing update, then reversal exit on an opposing
                    // signal.
                    pos.update_extremes(bar.high, bar.low);
                    update_trailing_stop(&mut pos, &self.config.risk);

                    let opposing = matches!(
                        (pos.side, signal.direction),
                        (PositionSide::Long, Direction::Sell)
                            | (PositionSide::Short, Direction::Buy)
                    );
                    if opposing {
                        let record =
                            self.close_slice(&pos, pos.size, bar, i, ExitReason::SignalReversal);
                        cash += self.exit_cash_delta(&pos, &record);
                        pos.status = PositionStatus::Closed;
                        trades.push(record);
                    } else {
                        position = Some(pos);
                    }
                }
            }

            // 4. Entry.
            let equity_now = mark_equity(cash, position.as_ref(), bar.close);
            if !day.loss_blocked && day.start_equity > 0.0 {
                let day_loss = (day.start_equity - equity_now) / day.start_equity;
                if day_loss >= self.config.risk.max_daily_loss_pct {
                    day.loss_blocked = true;
                }
            }
            if position.is_none()
                && signal.is_actionable()
                && !day.loss_blocked
                && day.trades_opened < self.config.risk.max_trades_per_day
            {
                let long = signal.direction == Direction::Buy;
                let fill = self.fill_price(bar.close, long, true);
                let snapshot = series.snapshot(i);
                if let Some(plan) = risk.plan_entry(
                    signal.direction,
                    fill,
                    equity_now,
                    signal.confidence,
                    signal.regime,
                    &snapshot,
                ) {
                    let notional = plan.size * fill;
                    let commission = self.config.commission_rate * notional;
                    let side = if long { PositionSide::Long } else { PositionSide::Short };
                    cash += if long { -(notional + commission) } else { notional - commission };
                    position = Some(Position::open(
                        side,
                        i,
                        bar.timestamp,
                        fill,
                        signal.confidence,
                        plan.size,
                        plan.stop_price,
                        plan.tiers,
                    ));
                    day.trades_opened += 1;
                }
            }

            equity_curve.push(EquityPoint {
                timestamp: bar.timestamp,
                equity: mark_equity(cash, position.as_ref(), bar.close),
            });
        }

        // Force-close whatever is still open on the last bar so realized
        // P&L reconciles with the equity curve.
        if let Some(mut pos) = position.take() {
            let last = bars.len() - 1;
            let bar = &bars[last];
            let record = self.close_slice(&pos, pos.size, bar, last, ExitReason::EndOfData);
            cash += self.exit_cash_delta(&pos, &record);
            pos.status = PositionStatus::Closed;
            trades.push(record);
            if let Some(point) = equity_curve.last_mut() {
                point.equity = cash;
            }
        }

        Ok(SimulationOutput {
            final_equity: cash,
            equity_curve,
            trades,
            signals,
        })
    }

    /// Slippage-adjusted fill at the bar close. Long entries and short
    /// exits fill above the close; the other two fill below it.
    fn fill_price(&self, close: f64, long: bool, entry: bool) -> f64 {
        let pays_up = long == entry;
        if pays_up {
            close * (1.0 + self.config.slippage_rate)
        } else {
            close * (1.0 - self.config.slippage_rate)
        }
    }

    /// Build the trade record for closing `size` units at this bar's close.
    /// Does not mutate the position; the caller settles cash and size.
    fn close_slice(
        &self,
        pos: &Position,
        size: f64,
        bar: &Bar,
        bar_index: usize,
        reason: ExitReason,
    ) -> TradeRecord {
        let long = pos.side == PositionSide::Long;
        let exit_price = self.fill_price(bar.close, long, false);
        let gross = pos.side.direction() * (exit_price - pos.entry_price) * size;

        // Entry commission prorated onto the units this slice closes.
        let entry_commission = self.config.commission_rate * pos.entry_price * size;
        let exit_commission = self.config.commission_rate * exit_price * size;
        let fees = entry_commission + exit_commission;

        TradeRecord {
            side: pos.side,
            entry_time: pos.entry_time,
            entry_price: pos.entry_price,
            exit_time: bar.timestamp,
            exit_price,
            size,
            gross_pnl: gross,
            fees,
            net_pnl: gross - fees,
            exit_reason: reason,
            entry_confidence: pos.entry_confidence,
            bars_held: bar_index - pos.entry_bar,
        }
    }

    /// Cash movement when `record.size` units leave the book. The entry
    /// commission in the record was already paid from cash at entry.
    fn exit_cash_delta(&self, pos: &Position, record: &TradeRecord) -> f64 {
        let notional = record.exit_price * record.size;
        let exit_commission = self.config.commission_rate * notional;
        match pos.side {
            PositionSide::Long => notional - exit_commission,
            PositionSide::Short => -(notional + exit_commission),
        }
    }
}

/// Cash plus the marked value of any open position.
fn mark_equity(cash: f64, position: Option<&Position>, price: f64) -> f64 {
    match position {
        Some(pos) => match pos.side {
            PositionSide::Long => cash + pos.size * price,
            PositionSide::Short => cash - pos.size * price,
        },
        None => cash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic_bars;
    use crate::indicators::make_bars;

    fn run(bars: &[Bar], config: &BacktestConfig) -> SimulationOutput {
        PortfolioSimulator::new(config).run(bars).unwrap()
    }

    #[test]
    fn insufficient_bars_is_an_error() {
        let config = BacktestConfig::default();
        let bars = make_bars(&[100.0; 10]);
        let err = PortfolioSimulator::new(&config).run(&bars).unwrap_err();
        assert!(matches!(err, DataError::InsufficientBars { .. }));
    }

    #[test]
    fn flat_market_trades_nothing() {
        let config = BacktestConfig::default();
        let bars = make_bars(&vec![100.0; 200]);
        let out = run(&bars, &config);
        assert!(out.trades.is_empty());
        assert_eq!(out.final_equity, config.initial_capital);
        assert!(out
            .equity_curve
            .iter()
            .all(|p| (p.equity - config.initial_capital).abs() < 1e-9));
    }

    #[test]
    fn rising_market_goes_long_and_profits() {
        let config = BacktestConfig::default();
        let closes: Vec<f64> = (0..200).map(|i| 100.0 * 1.004f64.powi(i)).collect();
        let bars = make_bars(&closes);
        let out = run(&bars, &config);
        assert!(!out.trades.is_empty(), "sustained rally must produce entries");
        assert!(out.trades.iter().all(|t| t.side == PositionSide::Long));
        assert!(out.final_equity > config.initial_capital);
    }

    #[test]
    fn equity_identity_holds() {
        let config = BacktestConfig::default();
        let bars = synthetic_bars(600, 100.0, 42);
        let out = run(&bars, &config);
        let net: f64 = out.trades.iter().map(|t| t.net_pnl).sum();
        assert!(
            (out.final_equity - (config.initial_capital + net)).abs() < 1e-6,
            "final {} != initial {} + net {}",
            out.final_equity,
            config.initial_capital,
            net
        );
    }

    #[test]
    fn deterministic_across_runs() {
        let config = BacktestConfig::default();
        let bars = synthetic_bars(600, 100.0, 42);
        let a = run(&bars, &config);
        let b = run(&bars, &config);
        assert_eq!(a.final_equity, b.final_equity);
        assert_eq!(a.trades.len(), b.trades.len());
        assert_eq!(a.equity_curve, b.equity_curve);
    }

    #[test]
    fn equity_curve_covers_every_bar() {
        let config = BacktestConfig::default();
        let bars = synthetic_bars(400, 100.0, 7);
        let out = run(&bars, &config);
        assert_eq!(out.equity_curve.len(), bars.len());
        for (point, bar) in out.equity_curve.iter().zip(&bars) {
            assert_eq!(point.timestamp, bar.timestamp);
        }
    }

    #[test]
    fn trades_ordered_by_exit_time() {
        let config = BacktestConfig::default();
        let bars = synthetic_bars(800, 100.0, 3);
        let out = run(&bars, &config);
        for pair in out.trades.windows(2) {
            assert!(pair[0].exit_time <= pair[1].exit_time);
        }
    }

    #[test]
    fn daily_trade_limit_respected() {
        let config = BacktestConfig::default();
        let bars = synthetic_bars(800, 100.0, 11);
        let out = run(&bars, &config);
        // Slices of one position share an entry time; dedup to count opens.
        let mut entries: Vec<DateTime<Utc>> = out.trades.iter().map(|t| t.entry_time).collect();
        entries.dedup();
        let mut opened: std::collections::HashMap<NaiveDate, usize> =
            std::collections::HashMap::new();
        for e in entries {
            *opened.entry(e.date_naive()).or_default() += 1;
        }
        for (_, n) in opened {
            assert!(n <= config.risk.max_trades_per_day);
        }
    }

    #[test]
    fn signals_recorded_when_enabled() {
        let mut config = BacktestConfig::default();
        config.record_signals = true;
        let closes: Vec<f64> = (0..200).map(|i| 100.0 * 1.004f64.powi(i)).collect();
        let bars = make_bars(&closes);
        let out = run(&bars, &config);
        assert!(!out.signals.is_empty());
        assert!(out.signals.iter().all(|s| s.direction != Direction::Hold));
    }

    #[test]
    fn signals_empty_when_disabled() {
        let config = BacktestConfig::default();
        let closes: Vec<f64> = (0..200).map(|i| 100.0 * 1.004f64.powi(i)).collect();
        let bars = make_bars(&closes);
        let out = run(&bars, &config);
        assert!(out.signals.is_empty());
    }

    #[test]
    fn equity_never_negative_under_default_costs() {
        for seed in [1, 2, 3, 4, 5] {
            let config = BacktestConfig::default();
            let bars = synthetic_bars(700, 100.0, seed);
            let out = run(&bars, &config);
            assert!(out.equity_curve.iter().all(|p| p.equity > 0.0), "seed {seed}");
        }
    }
}
