//! Timing strategies and the shared result assembly.
//!
//! Both strategies model the same machine: progress accrues at a constant
//! extraction speed while skill checks arrive at random, each locking out new
//! checks for its dead time `D`. They differ only in how the nominal chance
//! `p` becomes an observed check rate `r`:
//!
//! - [`continuous`]: Poisson arrivals with hazard `λ = -ln(1 - p)` and
//!   non-paralyzable dead time, `r = λ / (1 + λD)`.
//! - [`discrete`]: one Bernoulli(`p`) poll per whole second once the lockout
//!   ends, `r = p / (1 + pD)`.
//!
//! Everything after the rate (bonus accounting, completion time, expected
//! check counts) goes through [`assemble`], so the two result shapes can never
//! drift apart.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::inputs::{ModelError, ModelInputs};
use crate::result::{ModelComparison, ModelResult};

pub mod continuous;
pub mod discrete;
pub mod sweep;
pub mod window;

pub use continuous::{evaluate_continuous, hazard_rate};
pub use discrete::{evaluate_discrete, tick_check_rate};
pub use sweep::{SweepPoint, sweep};
pub use window::{
    CascadeStep, MachineRun, StatPhase, WindowProgress, cascade, evaluate_remaining,
    evaluate_window,
};

/// Selects which stochastic formulation turns `p` into a check rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimingModel {
    /// Poisson arrivals; a check can spawn the instant the lockout ends.
    #[default]
    Continuous,
    /// Checks are only polled once per real second.
    Discrete,
}

impl TimingModel {
    pub const ALL: [Self; 2] = [Self::Continuous, Self::Discrete];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Continuous => "continuous",
            Self::Discrete => "discrete",
        }
    }

    /// Evaluate `inputs` with this strategy.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] when `inputs` fail validation.
    pub fn evaluate(self, inputs: &ModelInputs) -> Result<ModelResult, ModelError> {
        match self {
            Self::Continuous => evaluate_continuous(inputs),
            Self::Discrete => evaluate_discrete(inputs),
        }
    }

    /// Observed check rate (and hazard, if any) for already validated inputs.
    pub(crate) fn check_rate(self, inputs: &ModelInputs) -> (f64, Option<f64>) {
        match self {
            Self::Continuous => continuous::poisson_check_rate(inputs),
            Self::Discrete => (
                tick_check_rate(inputs.skill_check_chance, inputs.dead_time()),
                None,
            ),
        }
    }
}

impl fmt::Display for TimingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a strategy label matches neither model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown timing model `{0}` (expected continuous or discrete)")]
pub struct ParseTimingModelError(pub String);

impl FromStr for TimingModel {
    type Err = ParseTimingModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continuous" => Ok(Self::Continuous),
            "discrete" => Ok(Self::Discrete),
            _ => Err(ParseTimingModelError(s.to_string())),
        }
    }
}

/// Evaluate both strategies against the same inputs.
///
/// # Errors
///
/// Returns [`ModelError::InvalidParameter`] when `inputs` fail validation.
pub fn compare(inputs: &ModelInputs) -> Result<ModelComparison, ModelError> {
    Ok(ModelComparison {
        continuous: evaluate_continuous(inputs)?,
        discrete: evaluate_discrete(inputs)?,
    })
}

/// Net units per second: base speed plus the expected bonus of each check.
pub(crate) fn progress_rate(inputs: &ModelInputs, check_rate: f64) -> f64 {
    inputs.extraction_speed + inputs.skill_check_units * inputs.skill_check_success * check_rate
}

/// Turn an observed check rate into the full expected-value summary.
///
/// `inputs` must already be validated: `U > 0` keeps the progress rate
/// strictly positive, so the completion-time division is always defined.
pub(crate) fn assemble(
    model: TimingModel,
    inputs: &ModelInputs,
    check_rate: f64,
    hazard: Option<f64>,
) -> ModelResult {
    let default_time = inputs.default_time();
    let effective_progress_rate = progress_rate(inputs, check_rate);
    let average_time = inputs.total_units / effective_progress_rate;
    let expected_skill_checks = check_rate * average_time;
    let expected_successful_checks = expected_skill_checks * inputs.skill_check_success;

    log::debug!(
        "{model} model: rate {check_rate:.5}/s, progress {effective_progress_rate:.4} u/s, \
         average {average_time:.3}s of {default_time:.3}s"
    );

    ModelResult {
        default_time,
        average_time,
        expected_skill_checks,
        expected_successful_checks,
        effective_check_rate: check_rate,
        effective_progress_rate,
        hazard_rate: hazard,
    }
}
