pub mod runner;
pub mod validation;

pub use runner::{BatchRunner, RunFiles, discover_runs};
pub use validation::{
    BloomPeak, DayComparison, GroupReport, IceBreakup, NutrientInventory, ObservedDay,
    ObservedGroupData, ObservedSummary, RunReport, TaxonShare, ValidationReport,
    ValidationSettings, validate_run,
};

use thiserror::Error;

use crate::config::ConfigError;
use crate::error::VstatsError;
use crate::readers::{FileError, ReadError};

#[derive(Error, Debug)]
pub enum BatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    File(#[from] FileError),
    #[error(transparent)]
    Vstats(#[from] VstatsError),
    #[error("invalid runs pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("no simulation run matches {0}")]
    NoRuns(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}
