//! Daily vertical integrals of sparse observed profiles.
//!
//! A day is integrated only when its set of sampling depths is exactly one of
//! the known sampling cases; the case's trapezoidal weights then give the
//! integral. Other days are `NaN`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cases::{self, SamplingCase};
use crate::error::{Result, VstatsError};
use crate::vstats::IntegratedSeries;

/// A concentration measured at one depth on one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObservationRecord {
    /// Day of year, 1-based.
    pub day: u16,
    /// Depth below the surface (m).
    pub depth: f64,
    pub value: f64,
}

/// Aggregate of one day, with the case that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyAggregate {
    pub value: f64,
    pub case: Option<&'static str>,
}

impl DailyAggregate {
    fn missing() -> Self {
        Self {
            value: f64::NAN,
            case: None,
        }
    }
}

fn group_by_day(
    records: &[ObservationRecord],
    n_days: u16,
) -> Result<BTreeMap<u16, Vec<&ObservationRecord>>> {
    let mut by_day: BTreeMap<u16, Vec<&ObservationRecord>> = BTreeMap::new();
    for record in records {
        if record.day == 0 || record.day > n_days {
            return Err(VstatsError::invalid(format!(
                "observation day {} is outside 1..={}",
                record.day, n_days
            )));
        }
        if record.depth.is_nan() {
            return Err(VstatsError::invalid(format!(
                "observation on day {} has no depth",
                record.day
            )));
        }
        by_day.entry(record.day).or_default().push(record);
    }
    Ok(by_day)
}

fn aggregate_day(
    day: u16,
    rows: &[&ObservationRecord],
    catalog: &[SamplingCase],
) -> Result<DailyAggregate> {
    // Cases are written as elevations, sorted from the surface down
    let mut depths: Vec<f64> = rows.iter().map(|r| -r.depth).collect();
    depths.sort_by(|a, b| b.total_cmp(a));
    depths.dedup();

    let Some(case) = cases::classify(catalog, &depths) else {
        log::debug!("day {}: depths {:?} match no sampling case", day, depths);
        return Ok(DailyAggregate::missing());
    };

    let mut total = 0.0;
    for (elevation, weight) in case.pairs() {
        let matching: Vec<&&ObservationRecord> =
            rows.iter().filter(|r| -r.depth == elevation).collect();
        if matching.len() != 1 {
            return Err(VstatsError::AmbiguousObservation {
                day,
                depth: -elevation,
                count: matching.len(),
            });
        }
        total += matching[0].value * weight;
    }

    log::debug!("day {}: {} -> {}", day, case.label, total);
    Ok(DailyAggregate {
        value: total,
        case: Some(case.label),
    })
}

/// Daily aggregates for days `1..=n_days`, with the matched case of each day.
pub fn aggregate_detailed(
    records: &[ObservationRecord],
    catalog: &[SamplingCase],
    n_days: u16,
) -> Result<Vec<DailyAggregate>> {
    let by_day = group_by_day(records, n_days)?;

    (1..=n_days)
        .map(|day| match by_day.get(&day) {
            Some(rows) => aggregate_day(day, rows, catalog),
            None => Ok(DailyAggregate::missing()),
        })
        .collect()
}

/// Vertically integrated observations per day (index `day - 1`); `NaN` for
/// days without a matching sampling case.
pub fn aggregate(
    records: &[ObservationRecord],
    catalog: &[SamplingCase],
    n_days: u16,
) -> Result<IntegratedSeries> {
    Ok(aggregate_detailed(records, catalog, n_days)?
        .into_iter()
        .map(|d| d.value)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cases::SAMPLING_CASES;

    fn records(day: u16, depths: &[f64], values: &[f64]) -> Vec<ObservationRecord> {
        depths
            .iter()
            .zip(values)
            .map(|(&depth, &value)| ObservationRecord { day, depth, value })
            .collect()
    }

    #[test]
    fn test_unit_values_sum_the_weights() {
        let obs = records(123, &[1.5, 5.0, 10.0, 20.0, 40.0], &[1.0; 5]);

        let result = aggregate(&obs, &SAMPLING_CASES, 365).unwrap();

        assert_eq!(result.len(), 365);
        assert!((result[122] - 100.0).abs() < 1e-9);
        assert!(result[121].is_nan());
        assert!(result[123].is_nan());
    }

    #[test]
    fn test_row_order_does_not_matter() {
        let depths = [0.0, 1.5, 5.0, 10.0, 20.0, 40.0];
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let expected = 0.75 * 1.0 + 2.5 * 2.0 + 4.25 * 3.0 + 7.5 * 4.0 + 15.0 * 5.0 + 70.0 * 6.0;

        let mut obs = records(130, &depths, &values);
        let ordered = aggregate_detailed(&obs, &SAMPLING_CASES, 365).unwrap();

        obs.reverse();
        obs.swap(1, 4);
        let shuffled = aggregate_detailed(&obs, &SAMPLING_CASES, 365).unwrap();

        assert_eq!(ordered[129].case, Some("case4"));
        assert_eq!(shuffled[129].case, Some("case4"));
        assert!((ordered[129].value - expected).abs() < 1e-9);
        assert!((shuffled[129].value - expected).abs() < 1e-9);
    }

    #[test]
    fn test_unmatched_day_is_missing() {
        let obs = records(150, &[0.0, 3.0, 7.0], &[1.0, 2.0, 3.0]);

        let result = aggregate_detailed(&obs, &SAMPLING_CASES, 365).unwrap();

        assert!(result[149].value.is_nan());
        assert_eq!(result[149].case, None);
    }

    #[test]
    fn test_shallow_case_is_missing() {
        let obs = records(120, &[1.5, 5.0], &[1.0, 1.0]);

        let result = aggregate(&obs, &SAMPLING_CASES, 365).unwrap();

        assert!(result[119].is_nan());
    }

    #[test]
    fn test_duplicate_depth_is_ambiguous() {
        let mut obs = records(123, &[1.5, 5.0, 10.0, 20.0, 40.0], &[1.0; 5]);
        obs.push(ObservationRecord {
            day: 123,
            depth: 10.0,
            value: 2.0,
        });

        assert_eq!(
            aggregate(&obs, &SAMPLING_CASES, 365),
            Err(VstatsError::AmbiguousObservation {
                day: 123,
                depth: 10.0,
                count: 2
            })
        );
    }

    #[test]
    fn test_several_days() {
        let mut obs = records(123, &[1.5, 5.0, 10.0, 20.0, 40.0], &[2.0; 5]);
        obs.extend(records(125, &[0.0, 5.0, 10.0, 20.0], &[1.0; 4]));
        obs.extend(records(126, &[0.0, 5.0], &[1.0; 2]));

        let result = aggregate(&obs, &SAMPLING_CASES, 365).unwrap();

        assert!((result[122] - 200.0).abs() < 1e-9);
        assert!((result[124] - 100.0).abs() < 1e-9);
        assert!(result[125].is_nan());
        assert_eq!(result.iter().filter(|v| !v.is_nan()).count(), 2);
    }

    #[test]
    fn test_day_out_of_range() {
        let obs = records(366, &[1.5], &[1.0]);

        assert!(matches!(
            aggregate(&obs, &SAMPLING_CASES, 365),
            Err(VstatsError::InvalidArgument(_))
        ));
    }
}
