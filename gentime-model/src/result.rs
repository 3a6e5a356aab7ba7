//! Output records produced by the timing strategies.
use serde::{Deserialize, Serialize};

use crate::timing::TimingModel;

/// Expected-value summary of one strategy evaluation.
///
/// Every strategy fills the same fields so callers can swap strategies
/// without branching on type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelResult {
    /// Completion time with zero skill checks (`total_units / U`).
    pub default_time: f64,
    /// Expected completion time under the chosen strategy.
    pub average_time: f64,
    /// Mean number of checks triggered before completion.
    pub expected_skill_checks: f64,
    /// Mean number of checks successfully passed.
    pub expected_successful_checks: f64,
    /// Observed check trigger rate per real second.
    pub effective_check_rate: f64,
    /// Net progress rate (units per second) including expected bonuses.
    pub effective_progress_rate: f64,
    /// Poisson hazard for the continuous strategy.
    ///
    /// `None` for the discrete strategy, and for the continuous strategy once
    /// `p` saturates: checks then fire back to back at the dead-time-limited
    /// rate.
    pub hazard_rate: Option<f64>,
}

impl ModelResult {
    /// Seconds shaved off the no-check completion time.
    #[must_use]
    pub fn time_saved(&self) -> f64 {
        self.default_time - self.average_time
    }

    /// Ratio of the no-check completion time to the expected completion time.
    #[must_use]
    pub fn speedup(&self) -> f64 {
        self.default_time / self.average_time
    }
}

/// Both strategies evaluated against the same inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelComparison {
    pub continuous: ModelResult,
    pub discrete: ModelResult,
}

impl ModelComparison {
    #[must_use]
    pub const fn get(&self, model: TimingModel) -> &ModelResult {
        match model {
            TimingModel::Continuous => &self.continuous,
            TimingModel::Discrete => &self.discrete,
        }
    }

    /// Discrete average time minus continuous average time.
    #[must_use]
    pub fn average_time_gap(&self) -> f64 {
        self.discrete.average_time - self.continuous.average_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(average_time: f64) -> ModelResult {
        ModelResult {
            default_time: 30.0,
            average_time,
            expected_skill_checks: 0.0,
            expected_successful_checks: 0.0,
            effective_check_rate: 0.0,
            effective_progress_rate: 45.0 / average_time,
            hazard_rate: None,
        }
    }

    #[test]
    fn derived_metrics_follow_times() {
        let result = sample(24.0);
        assert!((result.time_saved() - 6.0).abs() < 1e-12);
        assert!((result.speedup() - 1.25).abs() < 1e-12);
    }

    #[test]
    fn comparison_reports_gap_and_lookup() {
        let comparison = ModelComparison {
            continuous: sample(23.5),
            discrete: sample(24.0),
        };
        assert!((comparison.average_time_gap() - 0.5).abs() < 1e-12);
        assert!((comparison.get(TimingModel::Discrete).average_time - 24.0).abs() < 1e-12);
    }

    #[test]
    fn serialized_shape_keeps_absent_hazard() {
        let value = serde_json::to_value(sample(24.0)).unwrap();
        assert!(value.get("hazard_rate").is_some_and(serde_json::Value::is_null));
    }
}
