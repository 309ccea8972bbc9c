use thiserror::Error;

use crate::error::VstatsError;
use crate::tracer::Tracer2D;

/// Supplier of model fields, already oriented as (layer, timestep).
pub trait TracerReader {
    fn read_tracer(&self, variable: &str) -> Result<Tracer2D, ReadError>;

    /// One-dimensional grid variable such as `drF` or `RC`.
    fn read_vector(&self, variable: &str) -> Result<Vec<f64>, ReadError>;
}

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("NetCDF error: {0}")]
    NetCDF(String),
    #[error("variable {0} not found")]
    MissingVariable(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: invalid date {value:?}: {source}")]
    Date {
        row: usize,
        value: String,
        source: chrono::ParseError,
    },
    #[error(transparent)]
    Shape(#[from] VstatsError),
    #[error(transparent)]
    File(#[from] FileError),
}

impl From<gdal::errors::GdalError> for ReadError {
    fn from(err: gdal::errors::GdalError) -> ReadError {
        ReadError::NetCDF(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum FileError {
    #[error("unknown file type")]
    UnknownFileType,
    #[error("{0} does not hold model output")]
    UnsupportedModelFile(String),
    #[error("{0} does not hold field observations")]
    UnsupportedObservationFile(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    NetCDF,
    Csv,
}
