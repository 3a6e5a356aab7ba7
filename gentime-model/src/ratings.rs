//! Character star ratings translated into model inputs.
use crate::constants::{EXTRACTION_SPEED_BY_STARS, EXTRACTION_SPEED_FALLBACK};

/// Extraction speed (units per second) for a one to six star rating.
///
/// Ratings outside that range fall back to the three-star speed.
#[must_use]
pub fn extraction_speed_for_stars(stars: u8) -> f64 {
    usize::from(stars)
        .checked_sub(1)
        .and_then(|index| EXTRACTION_SPEED_BY_STARS.get(index))
        .copied()
        .unwrap_or(EXTRACTION_SPEED_FALLBACK)
}
