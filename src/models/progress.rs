// src/models/progress.rs

use serde::{Deserialize, Serialize};

use crate::{config::PROGRESS_DECIMALS, error::AppError};

/// DTO for `POST /api/progress`.
#[derive(Debug, Deserialize)]
pub struct SetProgressRequest {
    pub progress: f64,
}

impl SetProgressRequest {
    /// Rejects non-finite or out-of-range values, then rounds to the stored precision.
    pub fn normalized(&self) -> Result<f64, AppError> {
        let value = self.progress;
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(AppError::BadRequest(
                "progress must be a number between 0 and 100.".to_string(),
            ));
        }
        let scale = 10f64.powi(PROGRESS_DECIMALS);
        Ok((value * scale).round() / scale)
    }
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub ok: bool,
    pub progress: f64,
    pub completed: bool,
}

/// Query string of the public unlock preview.
#[derive(Debug, Deserialize)]
pub struct UnlockQuery {
    pub progress: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(progress: f64) -> Result<f64, AppError> {
        SetProgressRequest { progress }.normalized()
    }

    #[test]
    fn keeps_four_decimals() {
        assert_eq!(normalized(37.2).unwrap(), 37.2);
        assert_eq!(normalized(12.345678).unwrap(), 12.3457);
        assert_eq!(normalized(0.0).unwrap(), 0.0);
        assert_eq!(normalized(100.0).unwrap(), 100.0);
    }

    #[test]
    fn rejects_out_of_range_and_non_finite() {
        for bad in [150.0, -0.5, 100.0001, f64::NAN, f64::INFINITY] {
            assert!(normalized(bad).is_err(), "{}", bad);
        }
    }
}
