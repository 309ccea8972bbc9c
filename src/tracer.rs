use std::fmt;
use std::ops::Range;

use crate::error::{Result, VstatsError};

/// A tracer field indexed by (layer, timestep), stored row-major.
///
/// Model output carries a sentinel in its deepest layer: the bottom boundary
/// cell has no meaningful value and is stored as `NaN` once
/// [`Tracer2D::mask_bottom_layer`] has been applied. Any integral that reaches
/// into that cell is therefore `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tracer2D {
    layers: usize,
    timesteps: usize,
    data: Vec<f64>,
}

impl Tracer2D {
    pub fn new(layers: usize, timesteps: usize, data: Vec<f64>) -> Result<Self> {
        if layers == 0 || timesteps == 0 {
            return Err(VstatsError::invalid("tracer must have at least one layer and one timestep"));
        }
        if data.len() != layers * timesteps {
            return Err(VstatsError::invalid(format!(
                "tracer buffer holds {} values, expected {} layers x {} timesteps",
                data.len(),
                layers,
                timesteps
            )));
        }
        Ok(Self {
            layers,
            timesteps,
            data,
        })
    }

    pub fn filled(layers: usize, timesteps: usize, value: f64) -> Result<Self> {
        Self::new(layers, timesteps, vec![value; layers * timesteps])
    }

    /// Builds a tracer from one profile per layer (`rows[layer][timestep]`).
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let layers = rows.len();
        let timesteps = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != timesteps) {
            return Err(VstatsError::invalid("tracer rows have different lengths"));
        }
        Self::new(layers, timesteps, rows.concat())
    }

    /// Builds a tracer from a single vertical profile repeated over `timesteps`.
    pub fn from_profile(profile: &[f64], timesteps: usize) -> Result<Self> {
        let data = profile
            .iter()
            .flat_map(|&v| std::iter::repeat_n(v, timesteps))
            .collect();
        Self::new(profile.len(), timesteps, data)
    }

    pub fn layers(&self) -> usize {
        self.layers
    }

    pub fn timesteps(&self) -> usize {
        self.timesteps
    }

    pub fn get(&self, layer: usize, timestep: usize) -> f64 {
        self.data[layer * self.timesteps + timestep]
    }

    pub fn set(&mut self, layer: usize, timestep: usize, value: f64) {
        self.data[layer * self.timesteps + timestep] = value;
    }

    /// Vertical profile at one timestep.
    pub fn column(&self, timestep: usize) -> Vec<f64> {
        (0..self.layers).map(|l| self.get(l, timestep)).collect()
    }

    /// Time series of one layer.
    pub fn row(&self, layer: usize) -> &[f64] {
        &self.data[layer * self.timesteps..(layer + 1) * self.timesteps]
    }

    /// Flags the deepest layer as the bottom sentinel.
    pub fn mask_bottom_layer(&mut self) {
        let bottom = self.layers - 1;
        for t in 0..self.timesteps {
            self.set(bottom, t, f64::NAN);
        }
    }

    pub fn scale(&mut self, factor: f64) {
        self.data.iter_mut().for_each(|v| *v *= factor);
    }

    /// Element-wise sum; `NaN` propagates like in the model's own arithmetic.
    pub fn add_assign(&mut self, other: &Tracer2D) -> Result<()> {
        if self.layers != other.layers || self.timesteps != other.timesteps {
            return Err(VstatsError::invalid(format!(
                "cannot add a {}x{} tracer to a {}x{} tracer",
                other.layers, other.timesteps, self.layers, self.timesteps
            )));
        }
        self.data
            .iter_mut()
            .zip(&other.data)
            .for_each(|(a, b)| *a += b);
        Ok(())
    }

    /// Keeps the given timesteps, in order.
    pub fn select_timesteps(&self, timesteps: Range<usize>) -> Result<Self> {
        if timesteps.is_empty() || timesteps.end > self.timesteps {
            return Err(VstatsError::invalid(format!(
                "timestep window {:?} is outside 0..{}",
                timesteps, self.timesteps
            )));
        }
        let n = timesteps.len();
        let data = (0..self.layers)
            .flat_map(|l| self.row(l)[timesteps.clone()].iter().copied())
            .collect();
        Self::new(self.layers, n, data)
    }

    /// Keeps the first `layers` layers.
    pub fn select_layers(&self, layers: usize) -> Result<Self> {
        if layers == 0 || layers > self.layers {
            return Err(VstatsError::invalid(format!(
                "cannot keep {} of {} layers",
                layers, self.layers
            )));
        }
        Self::new(
            layers,
            self.timesteps,
            self.data[..layers * self.timesteps].to_vec(),
        )
    }
}

impl fmt::Display for Tracer2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let finite = self.data.iter().filter(|v| v.is_finite());
        let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
        write!(
            f,
            "Layers: {}\nTimesteps: {}\nMin value: {}\nMax value: {}",
            self.layers, self.timesteps, min, max
        )
    }
}
