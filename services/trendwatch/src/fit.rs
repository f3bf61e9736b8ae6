//! Least-squares line fit over a trailing sample window
//!
//! Time offsets are taken relative to the newest sample in the window, so the
//! intercept is the fitted value "now" and can be compared directly against a
//! live threshold.

use crate::store::{seconds_between, SampleStore};

/// Slope and intercept of a fitted line.
///
/// The intercept is the fitted value at the timestamp of the newest sample in
/// the window, not at time zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    /// Rate of change in value units per second
    pub slope: f64,
    /// Fitted value at the time of the newest sample
    pub intercept: f64,
}

/// Fit a line to the trailing `window` measurements of `store`.
///
/// With no samples in the window the result is an all-zero fit (the emitted
/// sample count tells the consumer there was nothing to fit). A single sample
/// yields a flat line through its value. Two or more samples use ordinary
/// least squares.
///
/// A window whose samples all share one timestamp makes the denominator zero;
/// the NaN or infinite results of IEEE division are returned as-is.
pub fn fit_window(store: &SampleStore, window: usize) -> LineFit {
    let count = window.min(store.len());

    let Some(newest) = store.latest() else {
        return LineFit {
            slope: 0.0,
            intercept: 0.0,
        };
    };
    if count == 0 {
        return LineFit {
            slope: 0.0,
            intercept: 0.0,
        };
    }
    if count == 1 {
        return LineFit {
            slope: 0.0,
            intercept: newest.value,
        };
    }

    let t0 = newest.timestamp;
    let n = count as f64;
    let mut x_sum = 0.0;
    let mut y_sum = 0.0;
    let mut xx_sum = 0.0;
    let mut xy_sum = 0.0;

    for sample in store.window(window) {
        let x = seconds_between(sample.timestamp, t0);
        let y = sample.value;
        x_sum += x;
        y_sum += y;
        xx_sum += x * x;
        xy_sum += x * y;
    }

    let delta = n * xx_sum - x_sum * x_sum;
    LineFit {
        slope: (n * xy_sum - x_sum * y_sum) / delta,
        intercept: (y_sum * xx_sum - x_sum * xy_sum) / delta,
    }
}

/// Seconds until the fitted line reaches `threshold`.
///
/// A zero slope gives ±infinity or NaN, meaning there is no measurable trend
/// toward the threshold. A negative result means the threshold has already
/// been crossed. Values are returned unclamped.
pub fn time_to_threshold(fit: &LineFit, threshold: f64) -> f64 {
    (threshold - fit.intercept) / fit.slope
}
