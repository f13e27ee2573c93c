//! Parameter sensitivity — how strongly each tuned parameter moves the score.
//!
//! Absolute Pearson correlation between a parameter's values and the
//! objective scores across the evaluated candidates. Failed candidates are
//! excluded; a parameter that never varies gets 0. This is a linear,
//! marginal view, so interactions between parameters will not show up, but
//! it is cheap and usually enough to spot the parameter that dominates a
//! sweep.

use std::collections::BTreeMap;

use crate::optimize::Candidate;

pub fn parameter_sensitivity(candidates: &[Candidate]) -> BTreeMap<String, f64> {
    let mut sensitivity = BTreeMap::new();

    let usable: Vec<&Candidate> = candidates.iter().filter(|c| !c.failed()).collect();
    let Some(first) = usable.first() else {
        return sensitivity;
    };

    for name in first.params.values.keys() {
        let pairs: Vec<(f64, f64)> = usable
            .iter()
            .filter_map(|c| c.params.get(name).map(|v| (v, c.score)))
            .collect();
        sensitivity.insert(name.clone(), correlation(&pairs).abs());
    }
    sensitivity
}

/// Pearson correlation of (x, y) pairs; 0 when either side is degenerate.
fn correlation(pairs: &[(f64, f64)]) -> f64 {
    if pairs.len() < 2 {
        return 0.0;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x <= 0.0 || var_y <= 0.0 {
        return 0.0;
    }
    cov / (var_x * var_y).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::ParameterSet;
    use std::collections::BTreeMap as Map;

    fn candidate(rsi: f64, trail: f64, score: f64) -> Candidate {
        let mut values = Map::new();
        values.insert("rsi_period".to_string(), rsi);
        values.insert("trailing_pct".to_string(), trail);
        Candidate { params: ParameterSet::new(values), score, metrics: None }
    }

    #[test]
    fn perfectly_linear_parameter_scores_one() {
        let candidates = vec![
            candidate(10.0, 0.01, 1.0),
            candidate(20.0, 0.01, 2.0),
            candidate(30.0, 0.01, 3.0),
        ];
        let s = parameter_sensitivity(&candidates);
        assert!((s["rsi_period"] - 1.0).abs() < 1e-10);
        // Constant parameter carries no signal.
        assert!(s["trailing_pct"].abs() < 1e-10);
    }

    #[test]
    fn inverse_relation_reports_magnitude() {
        let candidates = vec![
            candidate(10.0, 0.01, 3.0),
            candidate(20.0, 0.02, 2.0),
            candidate(30.0, 0.03, 1.0),
        ];
        let s = parameter_sensitivity(&candidates);
        assert!((s["rsi_period"] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn failed_candidates_are_ignored() {
        let candidates = vec![
            candidate(10.0, 0.01, 1.0),
            candidate(20.0, 0.01, 2.0),
            Candidate {
                params: ParameterSet::new(Map::new()),
                score: f64::NEG_INFINITY,
                metrics: None,
            },
        ];
        let s = parameter_sensitivity(&candidates);
        assert!((s["rsi_period"] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn all_failed_yields_empty_map() {
        let candidates = vec![Candidate {
            params: ParameterSet::new(Map::new()),
            score: f64::NEG_INFINITY,
            metrics: None,
        }];
        assert!(parameter_sensitivity(&candidates).is_empty());
    }
}
