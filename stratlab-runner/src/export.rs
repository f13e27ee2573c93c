//! Result export — JSON manifests plus CSV trade tape and equity curve.
//!
//! CSV output targets external analysis tools (spreadsheets, pandas), so
//! prices keep six decimals and money amounts two.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use stratlab_core::{EquityPoint, ExitReason, TradeRecord};

use crate::runner::BacktestResult;

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

pub fn import_json(json: &str) -> Result<BacktestResult> {
    serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the trade tape as CSV.
///
/// Columns: side, entry_time, entry_price, exit_time, exit_price, size,
/// gross_pnl, fees, net_pnl, exit_reason, entry_confidence, bars_held
pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "side",
        "entry_time",
        "entry_price",
        "exit_time",
        "exit_price",
        "size",
        "gross_pnl",
        "fees",
        "net_pnl",
        "exit_reason",
        "entry_confidence",
        "bars_held",
    ])?;

    for t in trades {
        wtr.write_record([
            &format!("{:?}", t.side),
            &t.entry_time.to_rfc3339(),
            &format!("{:.6}", t.entry_price),
            &t.exit_time.to_rfc3339(),
            &format!("{:.6}", t.exit_price),
            &format!("{:.6}", t.size),
            &format!("{:.2}", t.gross_pnl),
            &format!("{:.2}", t.fees),
            &format!("{:.2}", t.net_pnl),
            &exit_reason_label(t.exit_reason),
            &format!("{:.4}", t.entry_confidence),
            &t.bars_held.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export an equity curve as CSV with timestamp and equity columns.
pub fn export_equity_csv(equity_curve: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["timestamp", "equity"])?;
    for point in equity_curve {
        wtr.write_record([&point.timestamp.to_rfc3339(), &format!("{:.2}", point.equity)])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

fn exit_reason_label(reason: ExitReason) -> String {
    match reason {
        ExitReason::StopLoss => "STOP_LOSS".to_string(),
        ExitReason::TakeProfit(tier) => format!("TAKE_PROFIT_{tier}"),
        ExitReason::SignalReversal => "SIGNAL_REVERSAL".to_string(),
        ExitReason::EndOfData => "END_OF_DATA".to_string(),
    }
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single backtest run.
///
/// Creates a directory named after the run id under `output_dir`
/// containing:
/// - `manifest.json` — the full `BacktestResult`
/// - `trades.csv` — trade tape
/// - `equity.csv` — bar-by-bar equity curve
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = output_dir.join(result.run_id.as_str());
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("manifest.json"), export_json(result)?)?;
    std::fs::write(run_dir.join("trades.csv"), export_trades_csv(&result.trades)?)?;
    std::fs::write(run_dir.join("equity.csv"), export_equity_csv(&result.equity_curve)?)?;

    Ok(run_dir)
}
