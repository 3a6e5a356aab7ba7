use anyhow::{Context, Result, anyhow};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

use gentime_model::presets::catalog;
use gentime_model::{Loadout, ModelInputs, extraction_speed_for_stars};

/// Where model inputs come from: a preset or JSON file, then per-field flags.
#[derive(Debug, Clone, Default, Args)]
pub struct InputArgs {
    /// Start from a bundled preset (see `gentime presets`)
    #[arg(long, conflicts_with = "inputs")]
    pub preset: Option<String>,

    /// JSON file holding model inputs
    #[arg(long)]
    pub inputs: Option<PathBuf>,

    /// JSON file listing trinkets and items whose effects adjust the inputs
    #[arg(long)]
    pub loadout: Option<PathBuf>,

    /// Extraction star rating; sets extraction speed from the roster table
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=6))]
    pub stars: Option<u8>,

    /// Base extraction speed U (units per second)
    #[arg(short = 'u', long)]
    pub extraction_speed: Option<f64>,

    /// Skill check chance p (0-1)
    #[arg(short = 'p', long)]
    pub chance: Option<f64>,

    /// Bonus units S granted by a successful check
    #[arg(short = 's', long)]
    pub units: Option<f64>,

    /// Probability q of passing a triggered check (0-1)
    #[arg(short = 'q', long)]
    pub success: Option<f64>,

    /// Total units required to finish the machine
    #[arg(long)]
    pub total_units: Option<f64>,

    /// Shortest skill check interaction in seconds
    #[arg(long)]
    pub min_duration: Option<f64>,

    /// Longest skill check interaction in seconds
    #[arg(long)]
    pub max_duration: Option<f64>,

    /// Lockout seconds after a check resolves
    #[arg(long)]
    pub grace: Option<f64>,

    /// Guard keeping the chance away from 1 in the hazard transform
    #[arg(long)]
    pub epsilon: Option<f64>,
}

impl InputArgs {
    /// Merge every input source into one validated parameter set.
    ///
    /// Precedence, lowest first: preset or inputs file, star rating, explicit
    /// flags, loadout effects.
    pub fn resolve(&self) -> Result<ModelInputs> {
        let mut inputs = self.resolve_base()?;
        if let Some(path) = &self.loadout {
            inputs = read_loadout(path)?
                .apply(&inputs)
                .with_context(|| format!("loadout {} produced invalid inputs", path.display()))?;
        }

        inputs.validate()?;
        log::debug!("resolved inputs {inputs:?}");
        Ok(inputs)
    }

    /// Inputs before any loadout effects, validated.
    pub fn resolve_base(&self) -> Result<ModelInputs> {
        let mut inputs = match self.base()? {
            Some(inputs) => inputs,
            None => self.flag_inputs()?,
        };

        if let Some(stars) = self.stars {
            inputs = inputs.with_extraction_speed(extraction_speed_for_stars(stars));
        }
        inputs = self.apply_overrides(inputs);
        inputs.validate()?;
        Ok(inputs)
    }

    /// The `--loadout` file, or an empty loadout when none was given.
    pub fn loadout(&self) -> Result<Loadout> {
        self.loadout
            .as_deref()
            .map_or_else(|| Ok(Loadout::default()), read_loadout)
    }

    fn base(&self) -> Result<Option<ModelInputs>> {
        if let Some(id) = &self.preset {
            let preset = catalog().get(id).ok_or_else(|| {
                let known: Vec<&str> = catalog().ids().collect();
                anyhow!("unknown preset `{id}` (available: {})", known.join(", "))
            })?;
            return Ok(Some(preset.inputs));
        }
        if let Some(path) = &self.inputs {
            return read_inputs(path).map(Some);
        }
        Ok(None)
    }

    fn flag_inputs(&self) -> Result<ModelInputs> {
        let speed = match (self.extraction_speed, self.stars) {
            (Some(speed), _) => speed,
            (None, Some(stars)) => extraction_speed_for_stars(stars),
            (None, None) => {
                return Err(anyhow!(
                    "missing --extraction-speed (or --stars, --preset, --inputs)"
                ));
            }
        };
        let chance = self
            .chance
            .context("missing --chance (or --preset, --inputs)")?;
        let units = self
            .units
            .context("missing --units (or --preset, --inputs)")?;
        Ok(ModelInputs::new(speed, chance, units))
    }

    fn apply_overrides(&self, mut inputs: ModelInputs) -> ModelInputs {
        if let Some(value) = self.extraction_speed {
            inputs = inputs.with_extraction_speed(value);
        }
        if let Some(value) = self.chance {
            inputs = inputs.with_skill_check_chance(value);
        }
        if let Some(value) = self.units {
            inputs = inputs.with_skill_check_units(value);
        }
        if let Some(value) = self.success {
            inputs = inputs.with_skill_check_success(value);
        }
        if let Some(value) = self.total_units {
            inputs = inputs.with_total_units(value);
        }
        let min = self.min_duration.unwrap_or(inputs.min_skill_check_duration);
        let max = self.max_duration.unwrap_or(inputs.max_skill_check_duration);
        inputs = inputs.with_skill_check_duration(min, max);
        if let Some(value) = self.grace {
            inputs = inputs.with_grace_period(value);
        }
        if let Some(value) = self.epsilon {
            inputs = inputs.with_epsilon(value);
        }
        inputs
    }
}

fn read_inputs(path: &Path) -> Result<ModelInputs> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read inputs {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse inputs {}", path.display()))
}

fn read_loadout(path: &Path) -> Result<Loadout> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read loadout {}", path.display()))?;
    Loadout::from_json(&raw).with_context(|| format!("failed to parse loadout {}", path.display()))
}
