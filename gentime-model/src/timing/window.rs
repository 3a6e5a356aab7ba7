//! Bounded time windows and machines whose stats change partway through.
//!
//! Timed items (candies and the like) boost a repairer for a few seconds and
//! then expire. A machine run is therefore split into phases, each with its
//! own inputs: progress is accrued window by window with
//! [`evaluate_window`], and whatever is left after the last phase is finished
//! at the final stats with [`evaluate_remaining`].
use serde::{Deserialize, Serialize};

use crate::inputs::{ModelError, ModelInputs, require_non_negative};
use crate::result::ModelResult;
use crate::timing::{TimingModel, progress_rate};

/// Expected progress over one bounded window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowProgress {
    pub units_completed: f64,
    pub units_remaining: f64,
    pub expected_skill_checks: f64,
    pub expected_successful_checks: f64,
    /// Seconds actually spent; shorter than the window when the machine
    /// finishes early.
    pub time_consumed: f64,
    /// The machine finished within the window.
    pub is_complete: bool,
    pub effective_progress_rate: f64,
}

/// Accrue progress on a machine with `units_remaining` left for at most
/// `duration` seconds.
///
/// A machine that would finish exactly at the end of the window counts as
/// complete.
///
/// # Errors
///
/// Returns [`ModelError::InvalidParameter`] when `inputs` fail validation or
/// either `units_remaining` or `duration` is negative or not finite.
pub fn evaluate_window(
    model: TimingModel,
    inputs: &ModelInputs,
    units_remaining: f64,
    duration: f64,
) -> Result<WindowProgress, ModelError> {
    inputs.validate()?;
    require_non_negative("units_remaining", units_remaining)?;
    require_non_negative("duration", duration)?;

    let (check_rate, _) = model.check_rate(inputs);
    let effective_progress_rate = progress_rate(inputs, check_rate);
    let time_to_completion = units_remaining / effective_progress_rate;
    let is_complete = time_to_completion <= duration;
    let time_consumed = time_to_completion.min(duration);
    let units_completed = if is_complete {
        units_remaining
    } else {
        effective_progress_rate * time_consumed
    };
    let expected_skill_checks = check_rate * time_consumed;

    Ok(WindowProgress {
        units_completed,
        units_remaining: (units_remaining - units_completed).max(0.0),
        expected_skill_checks,
        expected_successful_checks: expected_skill_checks * inputs.skill_check_success,
        time_consumed,
        is_complete,
        effective_progress_rate,
    })
}

/// Evaluate a machine that already has some progress on it.
///
/// With nothing left the result is immediate: every time and count is zero,
/// while the rates still describe `inputs`.
///
/// # Errors
///
/// Returns [`ModelError::InvalidParameter`] when `inputs` fail validation or
/// `units_remaining` is negative or not finite.
pub fn evaluate_remaining(
    model: TimingModel,
    inputs: &ModelInputs,
    units_remaining: f64,
) -> Result<ModelResult, ModelError> {
    inputs.validate()?;
    require_non_negative("units_remaining", units_remaining)?;
    if units_remaining > 0.0 {
        return model.evaluate(&inputs.with_total_units(units_remaining));
    }

    let (check_rate, hazard) = model.check_rate(inputs);
    Ok(ModelResult {
        default_time: 0.0,
        average_time: 0.0,
        expected_skill_checks: 0.0,
        expected_successful_checks: 0.0,
        effective_check_rate: check_rate,
        effective_progress_rate: progress_rate(inputs, check_rate),
        hazard_rate: hazard,
    })
}

/// Inputs that hold until `ends_at` seconds after the machine starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatPhase {
    pub ends_at: f64,
    pub inputs: ModelInputs,
}

/// One evaluated phase of a [`MachineRun`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CascadeStep {
    pub starts_at: f64,
    pub ends_at: f64,
    pub inputs: ModelInputs,
    pub progress: WindowProgress,
}

/// Expected totals for a whole machine, phase by phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineRun {
    /// Units left when repairs begin, after any head start.
    pub starting_units: f64,
    /// `starting_units` over the extraction speed repairs begin with.
    pub default_time: f64,
    pub average_time: f64,
    pub expected_skill_checks: f64,
    pub expected_successful_checks: f64,
    pub steps: Vec<CascadeStep>,
}

impl MachineRun {
    /// The head start finished the machine before any repairs.
    #[must_use]
    pub fn is_instant(&self) -> bool {
        self.starting_units <= 0.0
    }

    fn instant() -> Self {
        Self {
            starting_units: 0.0,
            default_time: 0.0,
            average_time: 0.0,
            expected_skill_checks: 0.0,
            expected_successful_checks: 0.0,
            steps: Vec::new(),
        }
    }
}

/// Run a machine with `units` left through `phases` in order, then finish it
/// at `final_inputs`.
///
/// `phases` must be sorted by `ends_at`; a phase ending at or before the time
/// already elapsed is skipped. The run stops early once a window completes
/// the machine.
///
/// # Errors
///
/// Returns [`ModelError::InvalidParameter`] when `units` is negative or not
/// finite, or when any phase or `final_inputs` fails validation.
pub fn cascade(
    model: TimingModel,
    phases: &[StatPhase],
    final_inputs: &ModelInputs,
    units: f64,
) -> Result<MachineRun, ModelError> {
    final_inputs.validate()?;
    require_non_negative("units_remaining", units)?;
    if units <= 0.0 {
        return Ok(MachineRun::instant());
    }

    let initial_speed = phases
        .first()
        .map_or(final_inputs.extraction_speed, |phase| {
            phase.inputs.extraction_speed
        });
    let mut run = MachineRun {
        starting_units: units,
        default_time: units / initial_speed,
        ..MachineRun::instant()
    };

    let mut elapsed = 0.0;
    let mut remaining = units;
    for phase in phases {
        let window = phase.ends_at - elapsed;
        if window <= 0.0 {
            continue;
        }
        let progress = evaluate_window(model, &phase.inputs, remaining, window)?;
        log::debug!(
            "{model} window {elapsed:.2}s..{:.2}s: {:.3} units, {:.3} checks",
            phase.ends_at,
            progress.units_completed,
            progress.expected_skill_checks
        );
        run.steps.push(CascadeStep {
            starts_at: elapsed,
            ends_at: phase.ends_at,
            inputs: phase.inputs,
            progress,
        });
        elapsed += progress.time_consumed;
        remaining = progress.units_remaining;
        run.expected_skill_checks += progress.expected_skill_checks;
        run.expected_successful_checks += progress.expected_successful_checks;
        if progress.is_complete {
            break;
        }
    }

    if remaining > 0.0 {
        let tail = evaluate_remaining(model, final_inputs, remaining)?;
        elapsed += tail.average_time;
        run.expected_skill_checks += tail.expected_skill_checks;
        run.expected_successful_checks += tail.expected_successful_checks;
    }
    run.average_time = elapsed;
    Ok(run)
}
