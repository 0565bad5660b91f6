use std::num::ParseFloatError;
use thiserror::Error;

/// Why an input line did not produce a sample.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    #[error("empty line")]
    Empty,
    #[error("not a number: {0}")]
    Invalid(#[from] ParseFloatError),
    #[error("non-finite value: {0}")]
    NonFinite(f64),
}

/// Parses one input line into a finite sample.
///
/// Surrounding whitespace is ignored. Anything Rust's `f64` parser accepts is
/// read, but `NaN` and infinities are rejected since they cannot be scaled.
pub fn parse_sample(line: &str) -> Result<f64, SampleError> {
    let text = line.trim();
    if text.is_empty() {
        return Err(SampleError::Empty);
    }

    let value: f64 = text.parse()?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SampleError::NonFinite(value))
    }
}
