//! Comparison of the estimate against the wait actually observed at seating.

use serde::Serialize;

/// Positive when the customer waited longer than estimated; 0 without both values.
pub fn wait_variance(actual_minutes: f64, estimated_minutes: f64) -> f64 {
    if actual_minutes == 0.0 || estimated_minutes == 0.0 {
        return 0.0;
    }
    actual_minutes - estimated_minutes
}

/// 100 for a perfect estimate, down to 0 once the error reaches the estimate itself.
pub fn wait_accuracy(actual_minutes: f64, estimated_minutes: f64) -> f64 {
    if actual_minutes == 0.0 || estimated_minutes == 0.0 {
        return 0.0;
    }
    let error_percent = (wait_variance(actual_minutes, estimated_minutes) / estimated_minutes)
        .abs()
        * 100.0;
    (100.0 - error_percent).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyGrade {
    /// Within 2 minutes.
    Excellent,
    /// Within 5 minutes.
    Good,
    /// Within 10 minutes.
    Acceptable,
    Large,
}

impl AccuracyGrade {
    pub fn from_variance(variance_minutes: f64) -> Self {
        match variance_minutes.abs() {
            v if v <= 2.0 => Self::Excellent,
            v if v <= 5.0 => Self::Good,
            v if v <= 10.0 => Self::Acceptable,
            _ => Self::Large,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatingFeedback {
    pub actual_minutes: f64,
    pub estimated_minutes: f64,
    pub variance_minutes: f64,
    pub accuracy_percent: f64,
    pub grade: AccuracyGrade,
    pub message: String,
}

impl SeatingFeedback {
    /// `None` unless both the estimate and the observed wait are non-zero.
    pub fn evaluate(actual_minutes: f64, estimated_minutes: f64) -> Option<Self> {
        if actual_minutes == 0.0 || estimated_minutes == 0.0 {
            return None;
        }
        let variance_minutes = wait_variance(actual_minutes, estimated_minutes);
        let accuracy_percent = wait_accuracy(actual_minutes, estimated_minutes);
        let message = if variance_minutes > 0.0 {
            format!(
                "Customer waited {actual_minutes:.0} minutes (estimated {estimated_minutes:.0} minutes), {:.0} minutes longer than estimated",
                variance_minutes.abs()
            )
        } else if variance_minutes < 0.0 {
            format!(
                "Customer waited {actual_minutes:.0} minutes (estimated {estimated_minutes:.0} minutes), seated {:.0} minutes faster than estimated",
                variance_minutes.abs()
            )
        } else {
            format!("Customer waited exactly {actual_minutes:.0} minutes as estimated")
        };
        Some(Self {
            actual_minutes,
            estimated_minutes,
            variance_minutes,
            accuracy_percent,
            grade: AccuracyGrade::from_variance(variance_minutes),
            message,
        })
    }
}
