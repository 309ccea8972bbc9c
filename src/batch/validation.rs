//! Comparison of one simulation run with the field observations.

use std::ops::Range;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::BatchError;
use crate::aggregate::{self, DailyAggregate, ObservationRecord};
use crate::cases::SAMPLING_CASES;
use crate::config::{Config, ConfigError};
use crate::date_gen::{self, CampaignCalendar, DAYS_PER_YEAR};
use crate::grid::DepthProfile;
use crate::groups::{self, CHLOROPHYLL, NITRATE, SILICIC_ACID};
use crate::observations::{
    self, FieldObservation, OBSERVED_GROUPS, OPEN_WATER_COVER, ObservedGroup, UNCLASSIFIED_TAXA,
};
use crate::projection;
use crate::readers::TracerReader;
use crate::stats::{self, TaylorStats};
use crate::vstats;

/// Nutrients are integrated over the upper 100 m.
const NUTRIENT_DEPTH: f64 = 100.0;
/// 15 May on the model's 365-day calendar.
const NUTRIENT_TIMESTEP: usize = 134;

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationSettings {
    pub cutoff_depth: f64,
    /// Model levels deeper than this are left out of the interpolation.
    pub projection_depth: f64,
    /// Timesteps of the analysis year.
    pub window: Range<usize>,
    /// Calendar year of the observations, used for date labels.
    pub year: i32,
}

impl ValidationSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            cutoff_depth: config.cutoff_depth(),
            projection_depth: config.projection_depth(),
            window: date_gen::analysis_year_window(config.analysis_year()),
            year: config.calendar().year(),
        }
    }
}

/// Observations of one functional group, shared by every run.
#[derive(Debug, Clone)]
pub struct ObservedGroupData {
    pub name: String,
    /// Carbon per (day, depth).
    pub records: Vec<ObservationRecord>,
    /// Vertically integrated carbon per day of year.
    pub daily: Vec<DailyAggregate>,
}

/// Rows of the campaign's mission and sample type taken between its dates.
fn campaign_rows<'a>(
    observations: &'a [FieldObservation],
    mission: &str,
    sample_type: &str,
    calendar: &CampaignCalendar,
) -> Vec<&'a FieldObservation> {
    observations::select_campaign(observations, mission, sample_type)
        .into_iter()
        .filter(|o| calendar.contains_day(o.day))
        .collect()
}

impl ObservedGroupData {
    fn prepare(group: &ObservedGroup, campaign: &[&FieldObservation]) -> Result<Self, BatchError> {
        let records = observations::group_records(campaign, group);
        let daily = aggregate::aggregate_detailed(&records, &SAMPLING_CASES, DAYS_PER_YEAR as u16)?;

        log::info!(
            "{}: {} (day, depth) samples, {} days integrated",
            group.name,
            records.len(),
            daily.iter().filter(|d| d.case.is_some()).count()
        );
        Ok(Self {
            name: group.name.to_string(),
            records,
            daily,
        })
    }

    /// Selects the campaign's rows and prepares each of the `names` groups.
    pub fn prepare_all(
        observations: &[FieldObservation],
        mission: &str,
        sample_type: &str,
        calendar: &CampaignCalendar,
        names: &[String],
    ) -> Result<Vec<Self>, BatchError> {
        let campaign = campaign_rows(observations, mission, sample_type, calendar);
        log::info!(
            "{} observation rows for {} ({})",
            campaign.len(),
            mission,
            sample_type
        );

        names
            .iter()
            .map(|name| -> Result<Self, BatchError> {
                let group = observations::observed_group(name)
                    .ok_or_else(|| ConfigError::UnknownGroup(name.clone()))?;
                Self::prepare(group, &campaign)
            })
            .collect()
    }

    fn values(&self) -> Vec<f64> {
        self.daily.iter().map(|d| d.value).collect()
    }

    /// Integrated days with the case that produced them.
    fn observed_days(&self) -> Vec<ObservedDay> {
        self.daily
            .iter()
            .enumerate()
            .filter_map(|(index, d)| {
                d.case.map(|case| ObservedDay {
                    day: index as u16 + 1,
                    case,
                    value: d.value,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ObservedDay {
    pub day: u16,
    pub case: &'static str,
    /// mg C m^-2
    pub value: f64,
}

/// Observed biomass of a taxon left out of the comparison.
#[derive(Debug, Clone, Serialize)]
pub struct TaxonShare {
    pub name: String,
    pub days: Vec<ObservedDay>,
    /// g C m^-2 over the integrated observation days
    pub total: f64,
    /// Share of the observed biomass of every group (%).
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IceBreakup {
    /// First day of open water, 0-based.
    pub timestep: usize,
    pub date: String,
}

/// Run-independent results of the field campaign.
#[derive(Debug, Clone, Serialize)]
pub struct ObservedSummary {
    /// g C m^-2 of every observed group, over the integrated days
    pub all_total: f64,
    pub unclassified: Vec<TaxonShare>,
    pub ice_breakup: Option<IceBreakup>,
}

impl ObservedSummary {
    pub fn prepare(
        observations: &[FieldObservation],
        mission: &str,
        sample_type: &str,
        calendar: &CampaignCalendar,
        ice_breakup: Option<NaiveDate>,
    ) -> Result<Self, BatchError> {
        let campaign = campaign_rows(observations, mission, sample_type, calendar);

        let mut all_total = 0.0;
        for group in &OBSERVED_GROUPS {
            let data = ObservedGroupData::prepare(group, &campaign)?;
            all_total += stats::temporal_integral(&data.values());
        }

        let unclassified = UNCLASSIFIED_TAXA
            .iter()
            .map(|taxon| -> Result<TaxonShare, BatchError> {
                let data = ObservedGroupData::prepare(taxon, &campaign)?;
                let total = stats::temporal_integral(&data.values());
                Ok(TaxonShare {
                    name: data.name.clone(),
                    days: data.observed_days(),
                    total,
                    percent: total / all_total * 100.0,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let ice_breakup = ice_breakup.and_then(|date| {
            let day = u16::try_from(date.ordinal()).ok()?;
            let cover = observations::ice_cover_series(day, DAYS_PER_YEAR);
            let timestep = stats::first_below(&cover, OPEN_WATER_COVER)?;
            Some(IceBreakup {
                timestep,
                date: date_gen::format_timestep(date.year(), timestep),
            })
        });

        Ok(Self {
            all_total,
            unclassified,
            ice_breakup,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BloomPeak {
    /// First local maximum of the chlorophyll integral.
    pub timestep: usize,
    pub date: String,
    /// mg Chl m^-2
    pub chl_vint: f64,
    pub global_maximum: Option<usize>,
}

/// One day with an integrated observation.
#[derive(Debug, Clone, Serialize)]
pub struct DayComparison {
    pub day: u16,
    pub case: &'static str,
    /// mg C m^-2
    pub observed: f64,
    pub simulated: f64,
    pub bias: f64,
    /// Share of the compared groups (%).
    pub observed_percent: f64,
    pub simulated_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub name: String,
    /// g C m^-2 over the analysis year
    pub simulated_total: f64,
    /// g C m^-2 after the bloom peak
    pub simulated_after_peak: Option<f64>,
    /// g C m^-2 over the integrated observation days
    pub observed_total: f64,
    pub days: Vec<DayComparison>,
    pub points: usize,
    pub taylor: Option<TaylorStats>,
}

/// Nutrients in the upper 100 m on 15 May of the analysis year.
#[derive(Debug, Clone, Serialize)]
pub struct NutrientInventory {
    pub timestep: usize,
    /// mmol N m^-2
    pub nitrate: f64,
    /// mmol Si m^-2
    pub silicic_acid: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run: String,
    pub bloom_peak: Option<BloomPeak>,
    pub nutrients: NutrientInventory,
    pub groups: Vec<GroupReport>,
}

/// Everything written to the output file.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub observed: ObservedSummary,
    pub runs: Vec<RunReport>,
}

fn nutrient_inventory(
    reader: &dyn TracerReader,
    layer_thickness: &DepthProfile,
    window: Range<usize>,
) -> Result<NutrientInventory, BatchError> {
    let on_day = |variable: &str| -> Result<f64, BatchError> {
        let series =
            groups::tracer_vint(reader, variable, layer_thickness, NUTRIENT_DEPTH, window.clone())?;
        Ok(series.get(NUTRIENT_TIMESTEP).copied().unwrap_or(f64::NAN))
    };

    Ok(NutrientInventory {
        timestep: NUTRIENT_TIMESTEP,
        nitrate: on_day(NITRATE)?,
        silicic_acid: on_day(SILICIC_ACID)?,
    })
}

fn bloom_peak(chl_vint: &[f64], year: i32) -> Option<BloomPeak> {
    let timestep = stats::first_local_maximum(chl_vint)?;
    Some(BloomPeak {
        timestep,
        date: date_gen::format_timestep(year, timestep),
        chl_vint: chl_vint[timestep],
        global_maximum: stats::nanargmax(chl_vint),
    })
}

/// Compares a run with the observed groups. Biomass and nutrients come from
/// `biomass`, chlorophyll from `chlorophyll`.
pub fn validate_run(
    run: &str,
    biomass: &dyn TracerReader,
    chlorophyll: &dyn TracerReader,
    layer_thickness: &DepthProfile,
    observed: &[ObservedGroupData],
    settings: &ValidationSettings,
) -> Result<RunReport, BatchError> {
    let chl = groups::group_vint(
        chlorophyll,
        &CHLOROPHYLL,
        layer_thickness,
        settings.cutoff_depth,
        settings.window.clone(),
    )?;
    let peak = bloom_peak(&chl, settings.year);
    match &peak {
        Some(p) => log::info!(
            "{}: bloom peak on {} ({:.1} mg Chl m^-2)",
            run,
            p.date,
            p.chl_vint
        ),
        None => log::warn!("{}: no bloom peak in the analysis year", run),
    }

    let nutrients = nutrient_inventory(biomass, layer_thickness, settings.window.clone())?;
    log::debug!(
        "{}: {:.1} mmol N m^-2 and {:.1} mmol Si m^-2 on timestep {}",
        run,
        nutrients.nitrate,
        nutrients.silicic_acid,
        nutrients.timestep
    );

    // Interpolation uses the levels above projection_depth, the domain check
    // the deepest level of the full grid
    let all_centres = layer_thickness.centres();
    let deepest = all_centres.last().copied().unwrap_or(0.0);
    let centres: Vec<f64> = all_centres
        .into_iter()
        .filter(|&c| c < settings.projection_depth)
        .collect();

    let mut simulated = Vec::with_capacity(observed.len());
    let mut projections = Vec::with_capacity(observed.len());
    for obs in observed {
        let group = groups::functional_group(&obs.name)
            .ok_or_else(|| ConfigError::UnknownGroup(obs.name.clone()))?;
        let profile =
            groups::group_profile(biomass, group)?.select_timesteps(settings.window.clone())?;
        simulated.push(vstats::integrate(
            &profile,
            layer_thickness,
            settings.cutoff_depth,
        )?);

        // Zero carbon means the taxa were looked for but not seen
        let present: Vec<ObservationRecord> = obs
            .records
            .iter()
            .copied()
            .filter(|r| r.value != 0.0 && !r.value.is_nan())
            .collect();
        let points = observations::sampling_points(&present);
        let model = profile.select_layers(centres.len())?;
        let projected = projection::project_within(&points, &model, &centres, deepest)?;

        let sim: Vec<f64> = projected.iter().map(|p| p.value).collect();
        let obs_values: Vec<f64> = present.iter().map(|r| r.value).collect();
        let taylor = if projected.len() >= 2 {
            Some(stats::taylor_stats(&sim, &obs_values)?)
        } else {
            None
        };
        projections.push((projected.len(), taylor));
    }

    let simulated_refs: Vec<&[f64]> = simulated.iter().map(Vec::as_slice).collect();
    let simulated_sum = stats::nansum_series(&simulated_refs)?;
    let observed_values: Vec<Vec<f64>> = observed.iter().map(ObservedGroupData::values).collect();
    let observed_refs: Vec<&[f64]> = observed_values.iter().map(Vec::as_slice).collect();
    let observed_sum = stats::nansum_series(&observed_refs)?;

    let mut reports = Vec::with_capacity(observed.len());
    for (i, obs) in observed.iter().enumerate() {
        let series = &simulated[i];
        let simulated_percent = stats::percent_of_total(series, &simulated_sum)?;
        let observed_percent = stats::percent_of_total(&observed_values[i], &observed_sum)?;

        let matched: Vec<(usize, &'static str)> = obs
            .daily
            .iter()
            .enumerate()
            .filter_map(|(index, d)| d.case.map(|case| (index, case)))
            .collect();
        let day_observed: Vec<f64> = matched
            .iter()
            .map(|&(index, _)| obs.daily[index].value)
            .collect();
        let day_simulated: Vec<f64> = matched
            .iter()
            .map(|&(index, _)| series.get(index).copied().unwrap_or(f64::NAN))
            .collect();
        let day_bias = stats::bias(&day_simulated, &day_observed)?;

        let days = matched
            .iter()
            .enumerate()
            .map(|(k, &(index, case))| DayComparison {
                day: index as u16 + 1,
                case,
                observed: day_observed[k],
                simulated: day_simulated[k],
                bias: day_bias[k],
                observed_percent: observed_percent[index],
                simulated_percent: simulated_percent.get(index).copied().unwrap_or(f64::NAN),
            })
            .collect();

        let (points, taylor) = projections[i];
        reports.push(GroupReport {
            name: obs.name.clone(),
            simulated_total: stats::temporal_integral(series),
            simulated_after_peak: peak
                .as_ref()
                .map(|p| stats::temporal_integral(series.get(p.timestep + 1..).unwrap_or(&[]))),
            observed_total: stats::temporal_integral(&observed_values[i]),
            days,
            points,
            taylor,
        });
    }

    Ok(RunReport {
        run: run.to_string(),
        bloom_peak: peak,
        nutrients,
        groups: reports,
    })
}
