//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Convert usize to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(f64::MAX)
}

/// Evenly spaced fraction `index / steps`, pinned to exactly 1.0 at the end.
#[must_use]
pub fn step_fraction(index: usize, steps: usize) -> f64 {
    if steps == 0 || index >= steps {
        return 1.0;
    }
    usize_to_f64(index) / usize_to_f64(steps)
}
