use std::collections::HashMap;

use super::{ReadError, TracerReader};
use crate::tracer::Tracer2D;

/// Fields already held in memory, keyed by variable name.
#[derive(Debug, Default, Clone)]
pub struct MemoryReader {
    tracers: HashMap<String, Tracer2D>,
    vectors: HashMap<String, Vec<f64>>,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tracer(mut self, name: &str, tracer: Tracer2D) -> Self {
        self.tracers.insert(name.to_string(), tracer);
        self
    }

    pub fn with_vector(mut self, name: &str, values: Vec<f64>) -> Self {
        self.vectors.insert(name.to_string(), values);
        self
    }
}

impl TracerReader for MemoryReader {
    fn read_tracer(&self, variable: &str) -> Result<Tracer2D, ReadError> {
        self.tracers
            .get(variable)
            .cloned()
            .ok_or_else(|| ReadError::MissingVariable(variable.to_string()))
    }

    fn read_vector(&self, variable: &str) -> Result<Vec<f64>, ReadError> {
        self.vectors
            .get(variable)
            .cloned()
            .ok_or_else(|| ReadError::MissingVariable(variable.to_string()))
    }
}
