//! Statistics over a water column.
//!
//! All functions take a tracer indexed by (layer, timestep) and the layer
//! thicknesses of the model grid, and return one value per timestep.
//! Depths are positive down from the surface.

use crate::error::{Result, VstatsError};
use crate::grid::DepthProfile;
use crate::tracer::Tracer2D;

/// One value per timestep (or per day for aggregated observations).
pub type IntegratedSeries = Vec<f64>;

fn check_depth_window(tracer: &Tracer2D, n_layers: usize) -> Result<()> {
    if n_layers > tracer.layers() {
        return Err(VstatsError::invalid(format!(
            "integration needs {} layers but the tracer only has {}",
            n_layers,
            tracer.layers()
        )));
    }
    Ok(())
}

/// Vertically integrates `tracer` from the surface down to `cutoff_depth`.
///
/// The layer containing `cutoff_depth` only contributes the part above it.
/// With a concentration in mmol m^-3 the result is in mmol m^-2.
pub fn integrate(
    tracer: &Tracer2D,
    layer_thickness: &DepthProfile,
    cutoff_depth: f64,
) -> Result<IntegratedSeries> {
    let weights = layer_thickness.clipped_thickness(cutoff_depth)?;
    check_depth_window(tracer, weights.len())?;

    Ok((0..tracer.timesteps())
        .map(|t| {
            weights
                .iter()
                .enumerate()
                .map(|(l, w)| tracer.get(l, t) * w)
                .sum::<f64>()
        })
        .collect())
}

/// Vertically integrates `tracer` over the layers `first..last_exclusive`.
///
/// With `treat_missing_as_zero`, `NaN` values count as zero, but a timestep
/// with fewer than two non-missing values in the window stays `NaN`.
pub fn integrate_by_layer_index(
    tracer: &Tracer2D,
    layer_thickness: &DepthProfile,
    first: usize,
    last_exclusive: usize,
    treat_missing_as_zero: bool,
) -> Result<IntegratedSeries> {
    let available = tracer.layers().min(layer_thickness.len());
    if first >= last_exclusive || last_exclusive > available {
        return Err(VstatsError::invalid(format!(
            "layer window {}..{} is empty or exceeds the {} available layers",
            first, last_exclusive, available
        )));
    }

    let thickness = &layer_thickness.thickness()[first..last_exclusive];

    Ok((0..tracer.timesteps())
        .map(|t| {
            let values = (first..last_exclusive).map(|l| tracer.get(l, t));
            if !treat_missing_as_zero {
                return values.zip(thickness).map(|(v, w)| v * w).sum::<f64>();
            }

            let present = values.clone().filter(|v| !v.is_nan()).count();
            if present < 2 {
                return f64::NAN;
            }
            values
                .zip(thickness)
                .map(|(v, w)| if v.is_nan() { 0.0 } else { v * w })
                .sum::<f64>()
        })
        .collect())
}

/// Thickness-weighted mean of `tracer` from the surface to `cutoff_depth`.
pub fn surface_mean(
    tracer: &Tracer2D,
    layer_thickness: &DepthProfile,
    cutoff_depth: f64,
) -> Result<IntegratedSeries> {
    let weights = layer_thickness.clipped_thickness(cutoff_depth)?;
    check_depth_window(tracer, weights.len())?;
    let total_weight: f64 = weights.iter().sum();

    let integral = integrate(tracer, layer_thickness, cutoff_depth)?;
    Ok(integral.into_iter().map(|v| v / total_weight).collect())
}
