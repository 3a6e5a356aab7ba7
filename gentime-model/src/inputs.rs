//! Parameter set shared by every timing strategy, plus its validation rules.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_EPSILON, DEFAULT_GRACE_PERIOD, DEFAULT_MAX_SKILL_CHECK_DURATION,
    DEFAULT_MIN_SKILL_CHECK_DURATION, DEFAULT_SKILL_CHECK_SUCCESS, DEFAULT_TOTAL_UNITS,
};

const POSITIVE: &str = "must be finite and greater than 0";
const NON_NEGATIVE: &str = "must be finite and at least 0";
const PROBABILITY: &str = "must be between 0 and 1";
const DURATION_ORDER: &str = "must be at least min_skill_check_duration";

/// Errors raised when timing parameters violate their documented ranges.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ModelError {
    #[error("{field} {constraint} (got {value})")]
    InvalidParameter {
        field: &'static str,
        constraint: &'static str,
        value: f64,
    },
}

impl ModelError {
    /// Name of the offending input field.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::InvalidParameter { field, .. } => field,
        }
    }
}

/// Knobs consumed by the timing models.
///
/// Failed skill checks only forfeit their bonus. There is no regression or
/// penalty term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelInputs {
    /// Base repair speed `U` in units per real second.
    pub extraction_speed: f64,
    /// Chance `p` that a skill check begins, in `[0, 1]`.
    ///
    /// The two strategies read this differently. The continuous model treats
    /// it as the chance a check starts within the next second and converts it
    /// into a Poisson hazard `-ln(1 - p)`. The discrete model uses it directly
    /// as the Bernoulli probability rolled on each one-second poll.
    pub skill_check_chance: f64,
    /// Bonus units `S` granted instantly on a successful check.
    pub skill_check_units: f64,
    /// Probability `q` that the player hits a check once it appears.
    #[serde(default = "ModelInputs::default_skill_check_success")]
    pub skill_check_success: f64,
    /// Progress required to finish the machine.
    #[serde(default = "ModelInputs::default_total_units")]
    pub total_units: f64,
    /// Lower bound (seconds) of the uniformly distributed check interaction.
    #[serde(default = "ModelInputs::default_min_skill_check_duration")]
    pub min_skill_check_duration: f64,
    /// Upper bound (seconds) of the uniformly distributed check interaction.
    #[serde(default = "ModelInputs::default_max_skill_check_duration")]
    pub max_skill_check_duration: f64,
    /// Extra seconds after a check resolves during which no check can spawn.
    #[serde(default = "ModelInputs::default_grace_period")]
    pub grace_period: f64,
    /// Keeps `p` numerically away from 1 before taking `ln(1 - p)`.
    #[serde(default = "ModelInputs::default_epsilon")]
    pub epsilon: f64,
}

impl ModelInputs {
    const fn default_skill_check_success() -> f64 {
        DEFAULT_SKILL_CHECK_SUCCESS
    }

    const fn default_total_units() -> f64 {
        DEFAULT_TOTAL_UNITS
    }

    const fn default_min_skill_check_duration() -> f64 {
        DEFAULT_MIN_SKILL_CHECK_DURATION
    }

    const fn default_max_skill_check_duration() -> f64 {
        DEFAULT_MAX_SKILL_CHECK_DURATION
    }

    const fn default_grace_period() -> f64 {
        DEFAULT_GRACE_PERIOD
    }

    const fn default_epsilon() -> f64 {
        DEFAULT_EPSILON
    }

    /// Build inputs from the three required knobs, defaulting everything else.
    #[must_use]
    pub const fn new(
        extraction_speed: f64,
        skill_check_chance: f64,
        skill_check_units: f64,
    ) -> Self {
        Self {
            extraction_speed,
            skill_check_chance,
            skill_check_units,
            skill_check_success: DEFAULT_SKILL_CHECK_SUCCESS,
            total_units: DEFAULT_TOTAL_UNITS,
            min_skill_check_duration: DEFAULT_MIN_SKILL_CHECK_DURATION,
            max_skill_check_duration: DEFAULT_MAX_SKILL_CHECK_DURATION,
            grace_period: DEFAULT_GRACE_PERIOD,
            epsilon: DEFAULT_EPSILON,
        }
    }

    #[must_use]
    pub const fn with_extraction_speed(mut self, value: f64) -> Self {
        self.extraction_speed = value;
        self
    }

    #[must_use]
    pub const fn with_skill_check_chance(mut self, value: f64) -> Self {
        self.skill_check_chance = value;
        self
    }

    #[must_use]
    pub const fn with_skill_check_units(mut self, value: f64) -> Self {
        self.skill_check_units = value;
        self
    }

    #[must_use]
    pub const fn with_skill_check_success(mut self, value: f64) -> Self {
        self.skill_check_success = value;
        self
    }

    #[must_use]
    pub const fn with_total_units(mut self, value: f64) -> Self {
        self.total_units = value;
        self
    }

    /// Replace both duration bounds at once.
    #[must_use]
    pub const fn with_skill_check_duration(mut self, min: f64, max: f64) -> Self {
        self.min_skill_check_duration = min;
        self.max_skill_check_duration = max;
        self
    }

    #[must_use]
    pub const fn with_grace_period(mut self, value: f64) -> Self {
        self.grace_period = value;
        self
    }

    #[must_use]
    pub const fn with_epsilon(mut self, value: f64) -> Self {
        self.epsilon = value;
        self
    }

    /// Expected check interaction length, `E[L] = (min + max) / 2`.
    #[must_use]
    pub fn mean_skill_check_duration(&self) -> f64 {
        0.5 * (self.min_skill_check_duration + self.max_skill_check_duration)
    }

    /// Expected lockout after a check starts: `D = E[L] + g`.
    #[must_use]
    pub fn dead_time(&self) -> f64 {
        self.mean_skill_check_duration() + self.grace_period
    }

    /// Progress time with no skill checks at all, `total_units / U`.
    #[must_use]
    pub fn default_time(&self) -> f64 {
        self.total_units / self.extraction_speed
    }

    /// Check every range constraint, reporting the first violation.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] naming the offending field.
    pub fn validate(&self) -> Result<(), ModelError> {
        require_positive("extraction_speed", self.extraction_speed)?;
        require_probability("skill_check_chance", self.skill_check_chance)?;
        require_non_negative("skill_check_units", self.skill_check_units)?;
        require_probability("skill_check_success", self.skill_check_success)?;
        require_positive("total_units", self.total_units)?;
        require_non_negative("min_skill_check_duration", self.min_skill_check_duration)?;
        require_non_negative("max_skill_check_duration", self.max_skill_check_duration)?;
        if self.max_skill_check_duration < self.min_skill_check_duration {
            return Err(ModelError::InvalidParameter {
                field: "max_skill_check_duration",
                constraint: DURATION_ORDER,
                value: self.max_skill_check_duration,
            });
        }
        require_non_negative("grace_period", self.grace_period)?;
        require_positive("epsilon", self.epsilon)?;
        Ok(())
    }
}

pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<(), ModelError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ModelError::InvalidParameter {
            field,
            constraint: POSITIVE,
            value,
        })
    }
}

pub(crate) fn require_non_negative(field: &'static str, value: f64) -> Result<(), ModelError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ModelError::InvalidParameter {
            field,
            constraint: NON_NEGATIVE,
            value,
        })
    }
}

fn require_probability(field: &'static str, value: f64) -> Result<(), ModelError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ModelError::InvalidParameter {
            field,
            constraint: PROBABILITY,
            value,
        })
    }
}
