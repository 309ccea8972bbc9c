use crate::error::{Result, VstatsError};

/// Layer thicknesses of the model's vertical grid, shallowest layer first.
///
/// This is `drF` (a.k.a. `delR`) in MITgcm output: the separation between
/// consecutive cell faces, in metres.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthProfile {
    thickness: Vec<f64>,
}

impl DepthProfile {
    pub fn new(thickness: Vec<f64>) -> Result<Self> {
        if thickness.is_empty() {
            return Err(VstatsError::invalid("depth profile has no layers"));
        }

        if let Some((i, t)) = thickness
            .iter()
            .enumerate()
            .find(|(_, t)| !t.is_finite() || **t <= 0.0)
        {
            return Err(VstatsError::invalid(format!(
                "layer {} has non-positive thickness {}",
                i, t
            )));
        }

        Ok(Self { thickness })
    }

    /// Same thickness for every layer.
    pub fn uniform(n_layers: usize, thickness: f64) -> Result<Self> {
        Self::new(vec![thickness; n_layers])
    }

    pub fn len(&self) -> usize {
        self.thickness.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thickness.is_empty()
    }

    pub fn thickness(&self) -> &[f64] {
        &self.thickness
    }

    /// Depth of the bottom of the water column.
    pub fn total_depth(&self) -> f64 {
        self.thickness.iter().sum()
    }

    /// Cell interfaces (`RF`, positive down): `len() + 1` values, starting at 0.
    pub fn boundaries(&self) -> Vec<f64> {
        let mut boundaries = Vec::with_capacity(self.thickness.len() + 1);
        let mut depth = 0.0;
        boundaries.push(depth);
        for t in &self.thickness {
            depth += t;
            boundaries.push(depth);
        }
        boundaries
    }

    /// Cell centres (`RC`, positive down).
    pub fn centres(&self) -> Vec<f64> {
        self.boundaries()
            .windows(2)
            .map(|w| 0.5 * (w[0] + w[1]))
            .collect()
    }

    /// Thicknesses of the layers down to `cutoff_depth`, the last one clipped
    /// so the weights sum to exactly `cutoff_depth`.
    pub(crate) fn clipped_thickness(&self, cutoff_depth: f64) -> Result<Vec<f64>> {
        if !cutoff_depth.is_finite() || cutoff_depth <= 0.0 {
            return Err(VstatsError::invalid(format!(
                "cutoff depth ({}) is negative or null",
                cutoff_depth
            )));
        }

        let boundaries = self.boundaries();
        let n_layers = boundaries.iter().filter(|&&b| b < cutoff_depth).count();
        if n_layers > self.thickness.len() {
            return Err(VstatsError::invalid(format!(
                "cutoff depth {} m is below the bottom of the grid ({} m)",
                cutoff_depth,
                self.total_depth()
            )));
        }

        let mut weights = self.thickness[..n_layers].to_vec();
        weights[n_layers - 1] = cutoff_depth - boundaries[n_layers - 1];
        Ok(weights)
    }
}

/// Index of the element nearest to `value`, skipping `NaN` entries.
pub fn find_idx_nearest(values: &[f64], value: f64) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .min_by(|(_, a), (_, b)| (*a - value).abs().total_cmp(&(*b - value).abs()))
        .map(|(i, _)| i)
}
