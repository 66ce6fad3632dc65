//! Smoothing filters for the cursor position.
//!
//! The hand centroid jitters by a few pixels between frames; these filters
//! turn the raw screen target into a steady pointer path.

/// Divisor-form exponential low-pass, the default cursor smoother
pub mod exponential;

/// Moving average filter for simple smoothing
pub mod moving_average;

use crate::Result;

/// Trait for all cursor filters
pub trait PointFilter: Send {
    /// Feed a target position, get the smoothed position back
    fn apply(&mut self, x: f64, y: f64) -> (f64, f64);

    /// Reset filter state
    fn reset(&mut self);

    /// Get filter name
    fn name(&self) -> &str;
}

/// No-op filter that passes through values unchanged
pub struct NoFilter;

impl PointFilter for NoFilter {
    fn apply(&mut self, x: f64, y: f64) -> (f64, f64) {
        (x, y)
    }

    fn reset(&mut self) {}

    fn name(&self) -> &str {
        "NoFilter"
    }
}

/// Create a cursor filter by type name
///
/// `smoothing` is the exponential divisor, or the window length for the
/// moving average.
///
/// # Errors
///
/// Returns an error for an unknown name or an out-of-range parameter
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // validated positive
pub fn create_filter(filter_type: &str, smoothing: f64) -> Result<Box<dyn PointFilter>> {
    match filter_type.to_lowercase().as_str() {
        "none" | "nofilter" => Ok(Box::new(NoFilter)),
        "exponential" | "smoothing" => {
            if !(smoothing >= 1.0 && smoothing.is_finite()) {
                return Err(crate::Error::FilterError(format!(
                    "Smoothing factor must be at least 1, got {smoothing}"
                )));
            }
            Ok(Box::new(exponential::ExponentialSmoother::new(smoothing)))
        }
        "moving_average" | "movingaverage" => {
            if !(smoothing >= 1.0 && smoothing.is_finite()) {
                return Err(crate::Error::FilterError(format!(
                    "Window size must be at least 1, got {smoothing}"
                )));
            }
            Ok(Box::new(moving_average::MovingAverageFilter::new(smoothing.round() as usize)))
        }
        _ => Err(crate::Error::FilterError(format!("Unknown filter type: {filter_type}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filter() {
        let mut filter = NoFilter;
        let (x, y) = filter.apply(10.0, 20.0);
        assert_eq!(x, 10.0);
        assert_eq!(y, 20.0);
    }

    #[test]
    fn test_create_filter() {
        assert!(create_filter("none", 7.0).is_ok());
        assert_eq!(create_filter("exponential", 7.0).unwrap().name(), "ExponentialSmoother");
        assert!(create_filter("moving_average", 5.0).is_ok());
        assert!(create_filter("kalman", 7.0).is_err());
        assert!(create_filter("exponential", 0.5).is_err());
        assert!(create_filter("exponential", f64::NAN).is_err());
    }
}
