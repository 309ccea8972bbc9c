//! Phytoplankton functional groups of the gud ecosystem model.
//!
//! Each group is a set of MITgcm passive tracers summed together after a unit
//! conversion. Biomass tracers are in mmol C m^-3 and are converted to
//! mg C m^-3; chlorophyll tracers are already in mg Chl m^-3.

use std::ops::Range;

use crate::grid::DepthProfile;
use crate::readers::{ReadError, TracerReader};
use crate::tracer::Tracer2D;
use crate::vstats::{self, IntegratedSeries};

/// g C (mol C)^-1
pub const MOLAR_MASS_C: f64 = 12.0107;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionalGroup {
    pub name: &'static str,
    pub tracers: &'static [&'static str],
    /// Applied to every tracer before summing.
    pub factor: f64,
}

const fn biomass(name: &'static str, tracers: &'static [&'static str]) -> FunctionalGroup {
    FunctionalGroup {
        name,
        tracers,
        factor: MOLAR_MASS_C,
    }
}

pub static BIOMASS_GROUPS: [FunctionalGroup; 9] = [
    biomass("pro", &["TRAC21"]),
    biomass("syn", &["TRAC22"]),
    biomass("smalleuk", &["TRAC23", "TRAC24"]),
    // coccolithophores and other nanoeukaryotes
    biomass("other", &["TRAC25", "TRAC26", "TRAC27", "TRAC28", "TRAC29"]),
    biomass("diazo", &["TRAC30", "TRAC31", "TRAC32", "TRAC33"]),
    biomass("tri", &["TRAC34"]),
    biomass(
        "diatoms",
        &[
            "TRAC35", "TRAC36", "TRAC37", "TRAC38", "TRAC39", "TRAC40", "TRAC41", "TRAC42",
            "TRAC43",
        ],
    ),
    biomass(
        "dino",
        &[
            "TRAC44", "TRAC45", "TRAC46", "TRAC47", "TRAC48", "TRAC49", "TRAC50", "TRAC51",
            "TRAC52", "TRAC53",
        ],
    ),
    biomass(
        "phyto",
        &[
            "TRAC21", "TRAC22", "TRAC23", "TRAC24", "TRAC25", "TRAC26", "TRAC27", "TRAC28",
            "TRAC29", "TRAC30", "TRAC31", "TRAC32", "TRAC33", "TRAC34", "TRAC35", "TRAC36",
            "TRAC37", "TRAC38", "TRAC39", "TRAC40", "TRAC41", "TRAC42", "TRAC43", "TRAC44",
            "TRAC45", "TRAC46", "TRAC47", "TRAC48", "TRAC49", "TRAC50", "TRAC51", "TRAC52",
            "TRAC53",
        ],
    ),
];

/// Biomass by equivalent spherical diameter.
pub static SIZE_CLASSES: [FunctionalGroup; 6] = [
    biomass("pico", &["TRAC21", "TRAC22", "TRAC23", "TRAC24"]),
    biomass(
        "lte4_5",
        &[
            "TRAC21", "TRAC22", "TRAC23", "TRAC24", "TRAC25", "TRAC26", "TRAC30", "TRAC31",
        ],
    ),
    biomass("6_6", &["TRAC27", "TRAC32", "TRAC35", "TRAC44"]),
    biomass("10", &["TRAC28", "TRAC33", "TRAC36", "TRAC45"]),
    biomass("15", &["TRAC29", "TRAC34", "TRAC37", "TRAC46"]),
    biomass(
        "ge20",
        &[
            "TRAC38", "TRAC39", "TRAC40", "TRAC41", "TRAC42", "TRAC43", "TRAC47", "TRAC48",
            "TRAC49", "TRAC50", "TRAC51", "TRAC52", "TRAC53",
        ],
    ),
];

/// Total chlorophyll (mg Chl m^-3).
pub static CHLOROPHYLL: FunctionalGroup = FunctionalGroup {
    name: "chl",
    tracers: &[
        "TRAC70", "TRAC71", "TRAC72", "TRAC73", "TRAC74", "TRAC75", "TRAC76", "TRAC77", "TRAC78",
        "TRAC79", "TRAC80", "TRAC81", "TRAC82", "TRAC83", "TRAC84", "TRAC85", "TRAC86", "TRAC87",
        "TRAC88", "TRAC89", "TRAC90", "TRAC91", "TRAC92", "TRAC93", "TRAC94", "TRAC95", "TRAC96",
        "TRAC97", "TRAC98", "TRAC99", "TRAC0a", "TRAC0b", "TRAC0c",
    ],
    factor: 1.0,
};

/// Nitrate tracer (mmol N m^-3).
pub const NITRATE: &str = "TRAC04";
/// Silicic acid tracer (mmol Si m^-3).
pub const SILICIC_ACID: &str = "TRAC06";

/// Looks a group up by name among the biomass groups, the size classes and
/// chlorophyll.
pub fn functional_group(name: &str) -> Option<&'static FunctionalGroup> {
    BIOMASS_GROUPS
        .iter()
        .chain(SIZE_CLASSES.iter())
        .chain(std::iter::once(&CHLOROPHYLL))
        .find(|g| g.name == name)
}

/// Concentration of `group` over the full run.
///
/// Every tracer has its bottom layer flagged before it is scaled and summed,
/// so the result carries the bottom sentinel too.
pub fn group_profile(
    reader: &dyn TracerReader,
    group: &FunctionalGroup,
) -> Result<Tracer2D, ReadError> {
    let mut total: Option<Tracer2D> = None;

    for name in group.tracers {
        let mut tracer = reader.read_tracer(name)?;
        tracer.mask_bottom_layer();
        tracer.scale(group.factor);

        match total.as_mut() {
            Some(sum) => sum.add_assign(&tracer)?,
            None => total = Some(tracer),
        }
    }

    total.ok_or_else(|| ReadError::MissingVariable(format!("no tracers in group {}", group.name)))
}

/// Vertical integral of `group` down to `cutoff_depth`, restricted to the
/// timesteps of `window`.
pub fn group_vint(
    reader: &dyn TracerReader,
    group: &FunctionalGroup,
    layer_thickness: &DepthProfile,
    cutoff_depth: f64,
    window: Range<usize>,
) -> Result<IntegratedSeries, ReadError> {
    let profile = group_profile(reader, group)?.select_timesteps(window)?;
    let series = vstats::integrate(&profile, layer_thickness, cutoff_depth)?;

    log::debug!(
        "{}: integrated {} tracers over {} timesteps",
        group.name,
        group.tracers.len(),
        series.len()
    );
    Ok(series)
}

/// Depth integral of one tracer read as is, without the bottom flag or a
/// unit conversion. Used for the nutrients.
pub fn tracer_vint(
    reader: &dyn TracerReader,
    variable: &str,
    layer_thickness: &DepthProfile,
    cutoff_depth: f64,
    window: Range<usize>,
) -> Result<IntegratedSeries, ReadError> {
    let profile = reader.read_tracer(variable)?.select_timesteps(window)?;
    Ok(vstats::integrate(&profile, layer_thickness, cutoff_depth)?)
}
