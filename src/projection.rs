//! Model values at the observation points.
//!
//! For each observation, the model column of that day is linearly
//! interpolated over the depth grid. Extrapolation is allowed past both ends
//! of the grid: the shallowest cell centre sits below 0 m, so observations
//! taken at the surface are extrapolated from the two upper cells.

use serde::Serialize;

use crate::error::{Result, VstatsError};
use crate::tracer::Tracer2D;

/// Where and when a sample was taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationPoint {
    /// Day of year, 1-based.
    pub day: u16,
    /// Depth below the surface (m).
    pub depth: f64,
}

/// Model value at an observation point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectedObservation {
    pub day: u16,
    pub depth: f64,
    pub value: f64,
}

/// Piecewise-linear interpolant that extrapolates with the end segments.
#[derive(Debug)]
struct LinearInterpolant {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl LinearInterpolant {
    /// Drops the `NaN` samples; needs at least two left.
    fn new(x: &[f64], y: &[f64]) -> Result<Self> {
        let mut points: Vec<(f64, f64)> = x
            .iter()
            .zip(y)
            .filter(|(x, y)| !x.is_nan() && !y.is_nan())
            .map(|(&x, &y)| (x, y))
            .collect();

        if points.len() < 2 {
            return Err(VstatsError::InsufficientData {
                available: points.len(),
            });
        }

        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (x, y) = points.into_iter().unzip();
        Ok(Self { x, y })
    }

    fn eval(&self, target: f64) -> f64 {
        let n = self.x.len();
        // Segment whose right end is the first x above target, clamped to the
        // first/last segment for extrapolation.
        let upper = self.x.partition_point(|&x| x <= target).clamp(1, n - 1);
        let (x0, x1) = (self.x[upper - 1], self.x[upper]);
        let (y0, y1) = (self.y[upper - 1], self.y[upper]);

        if x1 == x0 {
            return y0;
        }
        y0 + (target - x0) * (y1 - y0) / (x1 - x0)
    }
}

/// Model values at each observation point, row-aligned with `observations`.
///
/// `depth_grid` holds the depth of each model layer (cell centres, positive
/// down) and must have one entry per tracer layer. Observations must lie
/// above the deepest level of the grid.
pub fn project(
    observations: &[ObservationPoint],
    model: &Tracer2D,
    depth_grid: &[f64],
) -> Result<Vec<ProjectedObservation>> {
    let max_depth = depth_grid
        .iter()
        .copied()
        .filter(|d| !d.is_nan())
        .fold(f64::NEG_INFINITY, f64::max);

    project_within(observations, model, depth_grid, max_depth)
}

/// Like [`project`], for a model cut above the bottom of its grid.
///
/// Observations are accepted down to `max_depth` (the deepest cell centre of
/// the full grid) and extrapolated below the last level of `depth_grid`.
pub fn project_within(
    observations: &[ObservationPoint],
    model: &Tracer2D,
    depth_grid: &[f64],
    max_depth: f64,
) -> Result<Vec<ProjectedObservation>> {
    if depth_grid.len() != model.layers() {
        return Err(VstatsError::invalid(format!(
            "depth grid has {} levels but the model has {} layers",
            depth_grid.len(),
            model.layers()
        )));
    }

    observations
        .iter()
        .map(|obs| {
            if obs.day == 0 || usize::from(obs.day) > model.timesteps() {
                return Err(VstatsError::invalid(format!(
                    "day {} is outside the {} days of the model",
                    obs.day,
                    model.timesteps()
                )));
            }

            if !(0.0..max_depth).contains(&obs.depth) {
                return Err(VstatsError::OutOfDomain {
                    depth: obs.depth,
                    max_depth,
                });
            }

            let column = model.column(usize::from(obs.day) - 1);
            let interpolant = LinearInterpolant::new(depth_grid, &column)?;

            Ok(ProjectedObservation {
                day: obs.day,
                depth: obs.depth,
                value: interpolant.eval(obs.depth),
            })
        })
        .collect()
}
