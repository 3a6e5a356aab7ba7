//! Skill-check chance sweeps for balance tables.
use serde::{Deserialize, Serialize};

use crate::constants::MAX_SWEEP_STEPS;
use crate::inputs::{ModelError, ModelInputs};
use crate::numbers::{step_fraction, usize_to_f64};
use crate::result::ModelResult;
use crate::timing::TimingModel;

/// One row of a sweep: the chance that was evaluated and its result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub chance: f64,
    pub result: ModelResult,
}

/// Evaluate `model` across `steps + 1` evenly spaced chances in `[0, 1]`.
///
/// Every other field of `base` is held fixed. With `steps == 0` the sweep
/// collapses to the single chance already stored in `base`.
///
/// # Errors
///
/// Returns [`ModelError::InvalidParameter`] when `base` fails validation or
/// `steps` exceeds [`MAX_SWEEP_STEPS`]; nothing is evaluated in that case.
pub fn sweep(
    base: &ModelInputs,
    model: TimingModel,
    steps: usize,
) -> Result<Vec<SweepPoint>, ModelError> {
    base.validate()?;
    if steps > MAX_SWEEP_STEPS {
        return Err(ModelError::InvalidParameter {
            field: "steps",
            constraint: "must be at most 10000",
            value: usize_to_f64(steps),
        });
    }

    if steps == 0 {
        let result = model.evaluate(base)?;
        return Ok(vec![SweepPoint {
            chance: base.skill_check_chance,
            result,
        }]);
    }

    (0..=steps)
        .map(|index| {
            let chance = step_fraction(index, steps);
            let result = model.evaluate(&base.with_skill_check_chance(chance))?;
            Ok(SweepPoint { chance, result })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> ModelInputs {
        ModelInputs::new(1.5, 0.25, 3.0).with_skill_check_success(0.9)
    }

    #[test]
    fn sweep_spans_unit_interval() {
        let points = sweep(&reference(), TimingModel::Discrete, 4).unwrap();
        let chances: Vec<f64> = points.iter().map(|p| p.chance).collect();
        assert_eq!(chances, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert!((points[0].result.average_time - 30.0).abs() < 1e-12);
    }

    #[test]
    fn zero_steps_keeps_base_chance() {
        let points = sweep(&reference(), TimingModel::Continuous, 0).unwrap();
        assert_eq!(points.len(), 1);
        assert!((points[0].chance - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn average_time_falls_as_chance_rises() {
        for model in TimingModel::ALL {
            let points = sweep(&reference(), model, 20).unwrap();
            for pair in points.windows(2) {
                assert!(
                    pair[1].result.average_time < pair[0].result.average_time,
                    "{model}: {} -> {}",
                    pair[0].chance,
                    pair[1].chance
                );
            }
        }
    }

    #[test]
    fn oversized_step_counts_are_rejected() {
        let err = sweep(&reference(), TimingModel::Continuous, usize::MAX).unwrap_err();
        assert_eq!(err.field(), "steps");
        let points = sweep(&reference(), TimingModel::Discrete, MAX_SWEEP_STEPS).unwrap();
        assert_eq!(points.len(), MAX_SWEEP_STEPS + 1);
    }

    #[test]
    fn invalid_base_is_rejected_before_sweeping() {
        let err = sweep(&reference().with_total_units(0.0), TimingModel::Discrete, 5).unwrap_err();
        assert_eq!(err.field(), "total_units");
    }
}
