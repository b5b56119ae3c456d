//! Percentage and confidence-interval arithmetic.
//!
//! All figures are on the percentage scale (0 to 100). The margin is a
//! normal-approximation (Wald) interval computed from the *rounded*
//! percentage, and every intermediate rounding is round-half-up so results
//! match the published figures digit for digit.

use crate::types::ConfidenceInterval;

/// z-score for a two-sided 95% interval.
pub const Z_95: f64 = 1.96;

/// Round half up to the nearest integer (`2.5 -> 3`, `-2.5 -> -2`).
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round half up to one decimal place.
pub fn round_to_tenth(value: f64) -> f64 {
    round_half_up(value * 10.0) / 10.0
}

/// `round(part / total * 100)`, or 0 when `total` is 0.
pub fn percentage(part: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let pct = round_half_up(f64::from(part) / f64::from(total) * 100.0);
    pct.clamp(0.0, 100.0) as u32
}

/// Half-width of the 95% Wald interval around `percentage`, to one decimal.
pub fn wald_margin(percentage: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = f64::from(percentage);
    let variance = p * (100.0 - p) / f64::from(total);
    round_to_tenth(Z_95 * variance.max(0.0).sqrt())
}

/// 95% interval around `percentage`, clamped to `[0, 100]`.
pub fn confidence_interval(percentage: u32, total: u32) -> ConfidenceInterval {
    let p = f64::from(percentage);
    let margin = wald_margin(percentage, total);
    ConfidenceInterval {
        min: round_to_tenth(p - margin).clamp(0.0, 100.0),
        max: round_to_tenth(p + margin).clamp(0.0, 100.0),
    }
}
