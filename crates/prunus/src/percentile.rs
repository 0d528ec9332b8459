//! Linear-interpolation percentile.

use crate::config::validate_rate;
use prunus_core::{PruneError, Result};

/// Value at percentile `rate` (0-100) of `values`.
///
/// Uses linear interpolation between closest ranks (the R-7 definition):
/// `h = (n - 1) * rate / 100`, then `sorted[floor(h)]` interpolated towards
/// `sorted[ceil(h)]`. The result stays in `f64` so that a value between two
/// neighbouring `f32`s is not rounded onto either of them.
///
/// Fails on an empty slice, a non-finite value, or a rate outside [0, 100].
pub fn percentile(values: &[f32], rate: f64) -> Result<f64> {
    let rate = validate_rate(rate)?;
    if values.is_empty() {
        return Err(PruneError::invalid_weights(
            "cannot compute percentile of empty weight array",
        ));
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(PruneError::invalid_weights(format!(
            "non-finite weight {bad} in percentile input"
        )));
    }

    let mut sorted: Vec<f64> = values.iter().map(|&v| f64::from(v)).collect();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    if n == 1 {
        return Ok(sorted[0]);
    }

    let h = (n - 1) as f64 * rate / 100.0;
    let lo = h.floor() as usize;
    let hi = (h.ceil() as usize).min(n - 1);

    if lo == hi {
        return Ok(sorted[lo]);
    }
    Ok(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}
