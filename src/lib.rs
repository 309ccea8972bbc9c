//! Validation of 1-D MITgcm phytoplankton functional groups against
//! in-situ carbon profiles.

pub mod aggregate;
pub mod batch;
pub mod cases;
pub mod config;
pub mod date_gen;
pub mod error;
pub mod grid;
pub mod groups;
pub mod logger;
pub mod observations;
pub mod projection;
pub mod readers;
pub mod stats;
pub mod tracer;
pub mod vstats;

pub use error::{Result, VstatsError};
pub use grid::DepthProfile;
pub use tracer::Tracer2D;
