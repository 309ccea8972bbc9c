//! In-situ phytoplankton carbon from the Green Edge 2016 ice camp.
//!
//! The IFCB table lists one carbon estimate per (sample, taxon). Taxa are
//! mapped onto the model's functional groups and summed per (day, depth)
//! before the depth-weighted aggregation.

use std::collections::BTreeMap;

use crate::aggregate::ObservationRecord;
use crate::projection::ObservationPoint;

pub const DEFAULT_MISSION: &str = "ice_camp_2016";
pub const DEFAULT_SAMPLE_TYPE: &str = "water";

/// One row of the observation table.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldObservation {
    pub mission: String,
    pub sample_type: String,
    /// Day of year of the sampling date, 1-based.
    pub day: u16,
    /// Depth below the surface (m).
    pub depth: f64,
    pub taxonomy: String,
    /// Carbon estimate (mg C m^-3); `NaN` when not reported.
    pub carbon: f64,
}

/// Observed taxa that make up one model functional group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservedGroup {
    pub name: &'static str,
    pub taxa: &'static [&'static str],
}

impl ObservedGroup {
    pub fn contains(&self, taxonomy: &str) -> bool {
        self.taxa.contains(&taxonomy)
    }
}

pub static OBSERVED_GROUPS: [ObservedGroup; 4] = [
    ObservedGroup {
        name: "diatoms",
        taxa: &[
            "Attheya",
            "Centric diatoms",
            "Centric diatoms chains",
            "Chaetoceros",
            "Cylindrotheca closterium",
            "Entomoneis",
            "Eucampia",
            "Fragilariopsis",
            "Gyro_Pleurosigma",
            "Licmophora",
            "Melosira",
            "Navicula",
            "Navicula pelagica",
            "Navicula septentrionalis",
            "Nitzschia frigida",
            "Pennate diatoms",
            "Pennate diatoms chains",
            "Porosira",
            "Pseudo-nitzschia",
            "Rhizosolenia",
            "Thalassiosira",
            "Thalassiosira nordenskioeldii",
        ],
    },
    ObservedGroup {
        name: "dino",
        taxa: &[
            "Cryptophytes",
            "Dinoflagellates",
            "Euglenozoa",
            "Neoceratium",
            "Peridiniella catenata",
            "Polarella glacialis",
        ],
    },
    ObservedGroup {
        name: "other",
        taxa: &[
            "Ciliates",
            "Dictyocha",
            "Flagellates",
            "Other phytoplankton",
            "Phaeocystis",
        ],
    },
    ObservedGroup {
        name: "diazo",
        taxa: &["Anabaena"],
    },
];

/// Taxa that fit no model group well, followed on their own to see how much
/// of the observed biomass they hold. Cryptophytes, Dictyocha and Euglenozoa
/// are still counted in their nearest group; Rhodomonas is in none.
pub static UNCLASSIFIED_TAXA: [ObservedGroup; 4] = [
    ObservedGroup {
        name: "Cryptophytes",
        taxa: &["Cryptophytes"],
    },
    ObservedGroup {
        name: "Dictyocha",
        taxa: &["Dictyocha"],
    },
    ObservedGroup {
        name: "Euglenozoa",
        taxa: &["Euglenozoa"],
    },
    ObservedGroup {
        name: "Rhodomonas",
        taxa: &["Rhodomonas"],
    },
];

/// Ice cover below which the water counts as open.
pub const OPEN_WATER_COVER: f64 = 0.15;

pub fn observed_group(name: &str) -> Option<&'static ObservedGroup> {
    OBSERVED_GROUPS.iter().find(|g| g.name == name)
}

/// Rows of one mission and sample type.
pub fn select_campaign<'a>(
    observations: &'a [FieldObservation],
    mission: &str,
    sample_type: &str,
) -> Vec<&'a FieldObservation> {
    observations
        .iter()
        .filter(|o| o.mission == mission && o.sample_type == sample_type)
        .collect()
}

/// Carbon of the group's taxa summed per (day, depth), sorted by day then
/// depth. Missing estimates count as zero.
pub fn group_records(
    observations: &[&FieldObservation],
    group: &ObservedGroup,
) -> Vec<ObservationRecord> {
    // Depths are non-negative, so their bit patterns sort like the values
    let mut sums: BTreeMap<(u16, u64), f64> = BTreeMap::new();
    for obs in observations.iter().filter(|o| group.contains(&o.taxonomy)) {
        let total = sums.entry((obs.day, obs.depth.to_bits())).or_insert(0.0);
        if !obs.carbon.is_nan() {
            *total += obs.carbon;
        }
    }

    sums.into_iter()
        .map(|((day, depth), value)| ObservationRecord {
            day,
            depth: f64::from_bits(depth),
            value,
        })
        .collect()
}

/// Daily ice cover of a year where only the breakup is known: full cover
/// before the 1-based `breakup_day`, none on it, unknown afterwards.
pub fn ice_cover_series(breakup_day: u16, n_days: usize) -> Vec<f64> {
    let mut cover = vec![f64::NAN; n_days];
    let breakup = usize::from(breakup_day.max(1)) - 1;
    for (day, value) in cover.iter_mut().enumerate().take(breakup + 1) {
        *value = if day < breakup { 1.0 } else { 0.0 };
    }
    cover
}

/// Distinct (day, depth) sampling points of the campaign.
pub fn sampling_points(records: &[ObservationRecord]) -> Vec<ObservationPoint> {
    let mut points: Vec<ObservationPoint> = records
        .iter()
        .map(|r| ObservationPoint {
            day: r.day,
            depth: r.depth,
        })
        .collect();
    points.dedup();
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(mission: &str, day: u16, depth: f64, taxonomy: &str, carbon: f64) -> FieldObservation {
        FieldObservation {
            mission: mission.to_string(),
            sample_type: "water".to_string(),
            day,
            depth,
            taxonomy: taxonomy.to_string(),
            carbon,
        }
    }

    #[test]
    fn test_catalog_has_no_shared_taxa() {
        for (i, a) in OBSERVED_GROUPS.iter().enumerate() {
            for b in &OBSERVED_GROUPS[i + 1..] {
                assert!(
                    a.taxa.iter().all(|t| !b.contains(t)),
                    "{} and {} share a taxon",
                    a.name,
                    b.name
                );
            }
        }
    }

    #[test]
    fn test_select_campaign() {
        let mut ice = row("ice_camp_2016", 130, 1.5, "Chaetoceros", 1.0);
        ice.sample_type = "ice".to_string();
        let rows = vec![
            row("ice_camp_2016", 130, 1.5, "Chaetoceros", 1.0),
            row("amundsen_2016", 130, 1.5, "Chaetoceros", 1.0),
            ice,
        ];

        let selected = select_campaign(&rows, DEFAULT_MISSION, DEFAULT_SAMPLE_TYPE);

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].mission, "ice_camp_2016");
    }

    #[test]
    fn test_group_records_sums_taxa() {
        let rows = vec![
            row("ice_camp_2016", 130, 5.0, "Chaetoceros", 2.0),
            row("ice_camp_2016", 130, 5.0, "Melosira", 3.0),
            row("ice_camp_2016", 130, 5.0, "Dinoflagellates", 10.0),
            row("ice_camp_2016", 130, 1.5, "Navicula", f64::NAN),
            row("ice_camp_2016", 127, 0.0, "Attheya", 0.5),
        ];
        let selected: Vec<&FieldObservation> = rows.iter().collect();
        let diatoms = observed_group("diatoms").unwrap();

        let records = group_records(&selected, diatoms);

        assert_eq!(
            records,
            vec![
                ObservationRecord { day: 127, depth: 0.0, value: 0.5 },
                ObservationRecord { day: 130, depth: 1.5, value: 0.0 },
                ObservationRecord { day: 130, depth: 5.0, value: 5.0 },
            ]
        );
    }

    #[test]
    fn test_sampling_points() {
        let records = [
            ObservationRecord { day: 127, depth: 0.0, value: 0.5 },
            ObservationRecord { day: 130, depth: 1.5, value: 0.0 },
        ];

        let points = sampling_points(&records);

        assert_eq!(points.len(), 2);
        assert_eq!(points[1], ObservationPoint { day: 130, depth: 1.5 });
    }

    #[test]
    fn test_unclassified_taxa() {
        let rows = vec![
            row("ice_camp_2016", 130, 5.0, "Cryptophytes", 2.0),
            row("ice_camp_2016", 130, 5.0, "Dinoflagellates", 10.0),
            row("ice_camp_2016", 130, 10.0, "Rhodomonas", 0.0),
        ];
        let selected: Vec<&FieldObservation> = rows.iter().collect();

        let crypto = group_records(&selected, &UNCLASSIFIED_TAXA[0]);
        let rhodo = group_records(&selected, &UNCLASSIFIED_TAXA[3]);

        assert_eq!(crypto, vec![ObservationRecord { day: 130, depth: 5.0, value: 2.0 }]);
        assert_eq!(rhodo, vec![ObservationRecord { day: 130, depth: 10.0, value: 0.0 }]);
        assert!(OBSERVED_GROUPS.iter().all(|g| !g.contains("Rhodomonas")));
        assert!(observed_group("dino").unwrap().contains("Cryptophytes"));
    }

    #[test]
    fn test_ice_cover_series() {
        // Breakup on 18 July 2016
        let cover = ice_cover_series(200, 365);

        assert_eq!(cover.len(), 365);
        assert_eq!(cover[0], 1.0);
        assert_eq!(cover[198], 1.0);
        assert_eq!(cover[199], 0.0);
        assert!(cover[200].is_nan());
        assert_eq!(crate::stats::first_below(&cover, OPEN_WATER_COVER), Some(199));
    }

    #[test]
    fn test_unknown_group() {
        assert!(observed_group("coccolithophores").is_none());
    }
}
