/// Configuration rejected at the engine boundary.
///
/// Degenerate data (empty sets, zero vectors, missing items) never produces an
/// error; only caller-supplied tuning values do.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("{name} must be a finite, non-negative number (got {value})")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("time window must be a finite number of hours > 0 (got {0})")]
    InvalidWindow(f64),

    #[error("popularity cap must be a finite number > 0 (got {0})")]
    InvalidPopularityCap(f64),
}

pub(crate) fn check_weight(name: &'static str, value: f64) -> Result<f64, EngineError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(EngineError::InvalidWeight { name, value })
    }
}
