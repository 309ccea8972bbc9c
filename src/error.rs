//! Errors raised by the numeric core (`vstats`, `projection`, `aggregate`).
//!
//! A day whose observed depths match no sampling case is not an error: it
//! shows up as `NaN` in the aggregated series.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, VstatsError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VstatsError {
    /// Bad cutoff depth, malformed layer window, shape mismatch.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Observation depth outside the model grid.
    #[error("depth {depth} m is outside the model grid [0, {max_depth}) m")]
    OutOfDomain { depth: f64, max_depth: f64 },

    /// Not enough usable samples to interpolate.
    #[error("need at least 2 non-missing samples, found {available}")]
    InsufficientData { available: usize },

    /// Several concentrations for the same (day, depth) of a matched case.
    #[error("day {day}: {count} values recorded at depth {depth} m")]
    AmbiguousObservation { day: u16, depth: f64, count: usize },
}

impl VstatsError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        VstatsError::InvalidArgument(msg.into())
    }
}
