//! Centralized tuning defaults for the timing models.
//!
//! These values describe a stock machine: 45 units of progress, skill checks
//! whose interaction lasts between 0.75 and 2.5 seconds, and a two second
//! grace lockout once a check resolves. Keeping them together means balance
//! changes happen in one reviewed place instead of leaking into call sites.

// Machine defaults -----------------------------------------------------------
pub const DEFAULT_SKILL_CHECK_SUCCESS: f64 = 1.0;
pub const DEFAULT_TOTAL_UNITS: f64 = 45.0;
pub const DEFAULT_MIN_SKILL_CHECK_DURATION: f64 = 0.75;
pub const DEFAULT_MAX_SKILL_CHECK_DURATION: f64 = 2.5;
pub const DEFAULT_GRACE_PERIOD: f64 = 2.0;
pub const DEFAULT_EPSILON: f64 = 1e-12;

// Character ratings ----------------------------------------------------------
/// Extraction speed (units per second) indexed by star rating minus one.
pub const EXTRACTION_SPEED_BY_STARS: [f64; 6] = [0.75, 0.85, 1.0, 1.2, 1.5, 1.6];
pub const EXTRACTION_SPEED_FALLBACK: f64 = 1.0;

// Sweeps -------------------------------------------------------------------
pub const DEFAULT_SWEEP_STEPS: usize = 10;
/// Upper bound on sweep intervals; each interval is one evaluated row.
pub const MAX_SWEEP_STEPS: usize = 10_000;
