//! Continuous-arrival strategy: Poisson check onsets with non-paralyzable
//! dead time.
//!
//! Once the grace period ends a new check can spawn immediately. With arrival
//! hazard `λ` and a lockout of `D` seconds measured from each onset, the
//! renewal equilibrium rate is `λ / (1 + λD)`, which can never exceed one check
//! per dead-time interval no matter how large `λ` grows.

use crate::inputs::{ModelError, ModelInputs};
use crate::result::ModelResult;
use crate::timing::{TimingModel, assemble};

/// Map the per-second chance `p` to a Poisson hazard `λ = -ln(1 - p)`.
///
/// A zero chance always maps to a zero hazard, whatever `epsilon` is.
/// Otherwise returns `None` once `p ≥ 1 - epsilon`: the hazard is unbounded
/// and checks fire back to back at the dead-time-limited rate.
#[must_use]
pub fn hazard_rate(chance: f64, epsilon: f64) -> Option<f64> {
    if chance <= 0.0 {
        Some(0.0)
    } else if chance >= 1.0 - epsilon {
        log::trace!("chance {chance} saturates within epsilon {epsilon}");
        None
    } else {
        Some(-(-chance).ln_1p())
    }
}

/// Expected completion time assuming Poisson check arrivals.
///
/// # Errors
///
/// Returns [`ModelError::InvalidParameter`] when `inputs` fail validation.
pub fn evaluate_continuous(inputs: &ModelInputs) -> Result<ModelResult, ModelError> {
    inputs.validate()?;

    let (check_rate, hazard) = poisson_check_rate(inputs);
    Ok(assemble(TimingModel::Continuous, inputs, check_rate, hazard))
}

/// Observed check rate and the hazard it came from, for validated inputs.
pub(crate) fn poisson_check_rate(inputs: &ModelInputs) -> (f64, Option<f64>) {
    let dead_time = inputs.dead_time();
    let hazard = hazard_rate(inputs.skill_check_chance, inputs.epsilon);
    let check_rate = match hazard {
        Some(lambda) => lambda / (1.0 + lambda * dead_time),
        // A zero lockout would make the saturated rate unbounded.
        None => 1.0 / dead_time.max(inputs.epsilon),
    };
    (check_rate, hazard)
}
