//! gentime Timing Models
//!
//! Closed-form expected completion times for machines repaired at a constant
//! extraction speed while randomly arriving skill checks award bonus progress.
//! Each check locks out new checks for a dead time (mean interaction length
//! plus a grace period). Two strategies turn the nominal skill-check chance
//! into an observed check rate:
//!
//! - [`evaluate_continuous`]: Poisson arrivals with non-paralyzable dead time.
//! - [`evaluate_discrete`]: one Bernoulli poll per whole second.
//!
//! Both consume [`ModelInputs`] and return [`ModelResult`], so callers can
//! compare strategies directly. [`cascade`] chains bounded windows when gear
//! changes stats partway through a machine. Everything here is a
//! deterministic expectation; there is no sampling.

pub mod constants;
pub mod inputs;
pub mod modifiers;
pub mod numbers;
pub mod presets;
pub mod ratings;
pub mod result;
pub mod timing;

// Re-export commonly used types
pub use inputs::{ModelError, ModelInputs};
pub use modifiers::{
    ApplicationType, HeadStart, Loadout, LoadoutEntry, ModifierStack, StatEffect, TargetStat,
};
pub use presets::{Preset, PresetCatalog};
pub use ratings::extraction_speed_for_stars;
pub use result::{ModelComparison, ModelResult};
pub use timing::{
    CascadeStep, MachineRun, ParseTimingModelError, StatPhase, SweepPoint, TimingModel,
    WindowProgress, cascade, compare, evaluate_continuous, evaluate_discrete, evaluate_remaining,
    evaluate_window, hazard_rate, sweep, tick_check_rate,
};
