use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("campaign_end cannot be earlier than campaign_start")]
    DateOrder,
    #[error("invalid {field} format: {source}")]
    DateParse {
        field: &'static str,
        source: chrono::ParseError,
    },
    #[error("cutoff_depth and projection_depth must be positive, got {0}")]
    Depth(f64),
    #[error("analysis_year starts at 1")]
    AnalysisYear,
    #[error("invalid runs_pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("group {0} is not both a model and an observed group")]
    UnknownGroup(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}
