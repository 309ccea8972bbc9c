//! Series statistics used to compare the model with the observations.

use serde::Serialize;

use crate::error::{Result, VstatsError};

fn check_lengths(a: &[f64], b: &[f64]) -> Result<()> {
    if a.len() != b.len() {
        return Err(VstatsError::invalid(format!(
            "series have different lengths ({} and {})",
            a.len(),
            b.len()
        )));
    }
    Ok(())
}

/// Sum ignoring `NaN`; zero when every value is missing.
pub fn nansum(values: &[f64]) -> f64 {
    values.iter().filter(|v| !v.is_nan()).sum()
}

/// Element-wise sum of several series, ignoring `NaN`.
pub fn nansum_series(series: &[&[f64]]) -> Result<Vec<f64>> {
    let Some(first) = series.first() else {
        return Ok(Vec::new());
    };
    for s in series {
        check_lengths(first, s)?;
    }

    Ok((0..first.len())
        .map(|i| series.iter().map(|s| s[i]).filter(|v| !v.is_nan()).sum::<f64>())
        .collect())
}

/// `part / total * 100`, element-wise.
pub fn percent_of_total(part: &[f64], total: &[f64]) -> Result<Vec<f64>> {
    check_lengths(part, total)?;
    Ok(part.iter().zip(total).map(|(p, t)| p / t * 100.0).collect())
}

/// Time integral of a daily series of mg C m^-2, in g C m^-2.
pub fn temporal_integral(series: &[f64]) -> f64 {
    nansum(series) / 1000.0
}

/// `simulated - observed`, element-wise.
pub fn bias(simulated: &[f64], observed: &[f64]) -> Result<Vec<f64>> {
    check_lengths(simulated, observed)?;
    Ok(simulated.iter().zip(observed).map(|(s, o)| s - o).collect())
}

/// Sample standard deviation (one degree of freedom removed) of the finite
/// values.
pub fn sample_std(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = finite.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean = finite.iter().sum::<f64>() / n as f64;
    let ss: f64 = finite.iter().map(|v| (v - mean).powi(2)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Pearson correlation over the pairs where both values are finite.
pub fn pearson(a: &[f64], b: &[f64]) -> Result<f64> {
    check_lengths(a, b)?;
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(&x, &y)| (x, y))
        .collect();

    let n = pairs.len();
    if n < 2 {
        return Ok(f64::NAN);
    }
    let mean_a = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
    let mean_b = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        cov += (x - mean_a) * (y - mean_b);
        var_a += (x - mean_a).powi(2);
        var_b += (y - mean_b).powi(2);
    }
    Ok(cov / (var_a * var_b).sqrt())
}

/// Statistics of a Taylor diagram, computed on log10 concentrations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaylorStats {
    pub std_observed: f64,
    pub std_simulated: f64,
    /// `std_simulated / std_observed`; the reference point sits at 1.
    pub normalized_std: f64,
    pub correlation: f64,
}

/// Taylor statistics of `simulated` against `observed`, point by point.
///
/// Values are log-transformed first; zero or negative concentrations are left
/// out.
pub fn taylor_stats(simulated: &[f64], observed: &[f64]) -> Result<TaylorStats> {
    check_lengths(simulated, observed)?;
    let log_sim: Vec<f64> = simulated.iter().map(|v| v.log10()).collect();
    let log_obs: Vec<f64> = observed.iter().map(|v| v.log10()).collect();

    let std_observed = sample_std(&log_obs);
    let std_simulated = sample_std(&log_sim);

    Ok(TaylorStats {
        std_observed,
        std_simulated,
        normalized_std: std_simulated / std_observed,
        correlation: pearson(&log_obs, &log_sim)?,
    })
}

/// Index of the first strict local maximum (greater than both neighbours).
/// The end points are never maxima.
pub fn first_local_maximum(series: &[f64]) -> Option<usize> {
    series
        .windows(3)
        .position(|w| w[1] > w[0] && w[1] > w[2])
        .map(|i| i + 1)
}

/// Index of the largest value, skipping `NaN`. The first one wins on ties.
pub fn nanargmax(series: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in series.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        if best.is_none_or(|(_, b)| v > b) {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}

/// Index of the first value below `threshold`, e.g. the day sea ice drops
/// under 15 % cover.
pub fn first_below(series: &[f64], threshold: f64) -> Option<usize> {
    series.iter().position(|&v| v < threshold)
}
