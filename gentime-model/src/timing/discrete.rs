//! Discrete-tick strategy: checks are polled once per real second.
//!
//! After the lockout ends the machine waits for the next whole-second tick and
//! rolls a Bernoulli(`p`) trial there. Inter-arrival gaps are geometric rather
//! than exponential, giving `r = p / (1 + pD)`. At `p = 1` every cycle is the
//! lockout plus one polling second, so the rate tops out at `1 / (1 + D)`,
//! just under the `1 / D` ceiling of the continuous strategy.

use crate::inputs::{ModelError, ModelInputs};
use crate::result::ModelResult;
use crate::timing::{TimingModel, assemble};

/// Observed check rate for per-second polling with lockout `dead_time`.
#[must_use]
pub fn tick_check_rate(chance: f64, dead_time: f64) -> f64 {
    if chance > 0.0 {
        chance / (1.0 + chance * dead_time)
    } else {
        0.0
    }
}

/// Expected completion time assuming one check poll per second.
///
/// # Errors
///
/// Returns [`ModelError::InvalidParameter`] when `inputs` fail validation.
pub fn evaluate_discrete(inputs: &ModelInputs) -> Result<ModelResult, ModelError> {
    inputs.validate()?;

    let check_rate = tick_check_rate(inputs.skill_check_chance, inputs.dead_time());
    Ok(assemble(TimingModel::Discrete, inputs, check_rate, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> ModelInputs {
        ModelInputs::new(1.5, 0.25, 3.0).with_skill_check_success(0.9)
    }

    #[test]
    fn reference_scenario_matches_worked_example() {
        let result = evaluate_discrete(&reference()).unwrap();
        assert!((result.effective_check_rate - 0.25 / 1.906_25).abs() < 1e-12);
        assert!((result.effective_progress_rate - 1.8541).abs() < 5e-4);
        assert!((result.average_time - 24.27).abs() < 0.01);
        assert!(result.hazard_rate.is_none());
    }

    #[test]
    fn zero_chance_has_no_rate() {
        assert!(tick_check_rate(0.0, 3.625).abs() < f64::EPSILON);
        let result = evaluate_discrete(&reference().with_skill_check_chance(0.0)).unwrap();
        assert!((result.average_time - result.default_time).abs() < f64::EPSILON);
        assert!(result.expected_skill_checks.abs() < f64::EPSILON);
    }

    #[test]
    fn zero_dead_time_polls_every_second() {
        assert!((tick_check_rate(0.4, 0.0) - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn certain_chance_hits_dead_time_ceiling() {
        let inputs = reference().with_skill_check_chance(1.0);
        let result = evaluate_discrete(&inputs).unwrap();
        assert!((result.effective_check_rate - 1.0 / (1.0 + inputs.dead_time())).abs() < 1e-12);
    }
}
