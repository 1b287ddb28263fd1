//! Edge-triggered threshold crossing detection.
//!
//! An alert fires only when the previous sample sat on or inside a bound and
//! the current one is strictly past it. While the price stays past the bound
//! nothing further fires; it has to come back before it can alert again.

use crate::models::{Direction, PriceAlert, Thresholds};

/// Compare `current` against `last` and report a crossing, if any.
///
/// The first sample (`last == None`) never alerts. The upper bound is checked
/// first, so at most one alert is produced per call.
pub fn detect_crossing(
    last: Option<f64>,
    current: f64,
    thresholds: &Thresholds,
) -> Option<PriceAlert> {
    let last = last?;
    let (low, high) = (thresholds.low(), thresholds.high());

    if current > high && last <= high {
        Some(PriceAlert {
            direction: Direction::Above,
            threshold: high,
            price: current,
        })
    } else if current < low && last >= low {
        Some(PriceAlert {
            direction: Direction::Below,
            threshold: low,
            price: current,
        })
    } else {
        None
    }
}
