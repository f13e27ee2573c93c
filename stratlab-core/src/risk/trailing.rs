//! Breakeven-then-trail stop management.
//!
//! Two phases. Dormant: the initial stop holds until the best price since
//! entry is `breakeven_trigger_pct` in the money, at which point the stop
//! jumps to entry. Active: the stop trails `trailing_pct` behind the best
//! price. Both moves go through the ratchet, so the stop never retreats.

use crate::config::RiskConfig;
use crate::domain::{Position, PositionSide};

/// Advance the trailing state after the position's extremes have been
/// updated for the current bar.
pub fn update_trailing_stop(position: &mut Position, config: &RiskConfig) {
    if !position.trailing_active {
        if position.peak_gain_pct() >= config.breakeven_trigger_pct {
            position.trailing_active = true;
            position.ratchet_stop(position.entry_price);
        } else {
            return;
        }
    }

    let candidate = match position.side {
        PositionSide::Long => {
            position.highest_price_since_entry * (1.0 - config.trailing_pct)
        }
        PositionSide::Short => {
            position.lowest_price_since_entry * (1.0 + config.trailing_pct)
        }
    };
    position.ratchet_stop(candidate);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PositionStatus;
    use chrono::{TimeZone, Utc};

    fn long_at_100() -> Position {
        Position {
            side: PositionSide::Long,
            status: PositionStatus::Open,
            entry_bar: 0,
            entry_time: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            entry_price: 100.0,
            entry_confidence: 0.7,
            size: 1.0,
            initial_size: 1.0,
            stop_price: 96.0,
            tiers: Vec::new(),
            highest_price_since_entry: 100.0,
            lowest_price_since_entry: 100.0,
            trailing_active: false,
        }
    }

    fn config() -> RiskConfig {
        RiskConfig::default() // trigger 2%, trail 1.5%
    }

    #[test]
    fn dormant_below_trigger() {
        let mut pos = long_at_100();
        pos.update_extremes(101.5, 99.0);
        update_trailing_stop(&mut pos, &config());
        assert!(!pos.trailing_active);
        assert_eq!(pos.stop_price, 96.0);
    }

    #[test]
    fn breakeven_jump_at_trigger() {
        let mut pos = long_at_100();
        pos.update_extremes(102.0, 100.0);
        update_trailing_stop(&mut pos, &config());
        assert!(pos.trailing_active);
        // 102 * (1 - 0.015) = 100.47, above entry, so the trail wins outright.
        assert!((pos.stop_price - 100.47).abs() < 1e-9);
    }

    #[test]
    fn stop_jumps_to_entry_when_trail_is_below_it() {
        let mut pos = long_at_100();
        let mut cfg = config();
        cfg.trailing_pct = 0.03; // trail candidate 98.94 < entry
        pos.update_extremes(102.0, 100.0);
        update_trailing_stop(&mut pos, &cfg);
        assert_eq!(pos.stop_price, 100.0);
    }

    #[test]
    fn trail_follows_new_highs() {
        let mut pos = long_at_100();
        pos.update_extremes(102.0, 100.0);
        update_trailing_stop(&mut pos, &config());
        pos.update_extremes(110.0, 104.0);
        update_trailing_stop(&mut pos, &config());
        assert!((pos.stop_price - 110.0 * 0.985).abs() < 1e-9);
    }

    #[test]
    fn trail_never_retreats_on_pullback() {
        let mut pos = long_at_100();
        pos.update_extremes(110.0, 100.0);
        update_trailing_stop(&mut pos, &config());
        let stop_after_high = pos.stop_price;
        pos.update_extremes(106.0, 104.0);
        update_trailing_stop(&mut pos, &config());
        assert_eq!(pos.stop_price, stop_after_high);
    }

    #[test]
    fn short_trails_above_lows() {
        let mut pos = long_at_100();
        pos.side = PositionSide::Short;
        pos.stop_price = 104.0;
        pos.update_extremes(100.0, 97.0);
        update_trailing_stop(&mut pos, &config());
        assert!(pos.trailing_active);
        assert!((pos.stop_price - 97.0 * 1.015).abs() < 1e-9);
    }
}
