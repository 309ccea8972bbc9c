use chrono::NaiveDate;

use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::date_gen::CampaignCalendar;
use crate::groups;
use crate::observations::{self, DEFAULT_MISSION, DEFAULT_SAMPLE_TYPE};

pub mod error;
pub use error::ConfigError;

const DEFAULT_PROJECTION_DEPTH: f64 = 105.0;
const DEFAULT_GROUPS: [&str; 4] = ["diatoms", "dino", "other", "diazo"];

#[derive(Debug, Clone)]
pub struct Config {
    campaign_start: NaiveDate,
    campaign_end: NaiveDate,
    cutoff_depth: f64,
    projection_depth: f64,
    analysis_year: usize,
    runs_pattern: String,
    grid_file: String,
    tracer_file: String,
    chl_file: String,
    layer_thickness: Option<Vec<f64>>,
    observations: String,
    ice_breakup: Option<NaiveDate>,
    mission: String,
    sample_type: String,
    groups: Vec<String>,
    output_file: Option<String>,
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|source| ConfigError::DateParse { field, source })
}

// Deserializes a Config, checking the campaign dates are valid and in order,
// the depths are positive and every compared group exists on both sides.
impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ConfigHelper {
            campaign_start: String,
            campaign_end: String,
            cutoff_depth: f64,
            projection_depth: Option<f64>,
            analysis_year: usize,
            runs_pattern: String,
            grid_file: String,
            tracer_file: String,
            chl_file: String,
            layer_thickness: Option<Vec<f64>>,
            observations: String,
            ice_breakup: Option<String>,
            mission: Option<String>,
            sample_type: Option<String>,
            groups: Option<Vec<String>>,
            output_file: Option<String>,
        }

        let helper = ConfigHelper::deserialize(deserializer)?;

        let campaign_start =
            parse_date("campaign_start", &helper.campaign_start).map_err(D::Error::custom)?;
        let campaign_end =
            parse_date("campaign_end", &helper.campaign_end).map_err(D::Error::custom)?;
        let ice_breakup = helper
            .ice_breakup
            .as_deref()
            .map(|date| parse_date("ice_breakup", date))
            .transpose()
            .map_err(D::Error::custom)?;

        if campaign_start > campaign_end {
            return Err(D::Error::custom(ConfigError::DateOrder));
        }

        let projection_depth = helper
            .projection_depth
            .unwrap_or(DEFAULT_PROJECTION_DEPTH);
        for depth in [helper.cutoff_depth, projection_depth] {
            if !(depth.is_finite() && depth > 0.0) {
                return Err(D::Error::custom(ConfigError::Depth(depth)));
            }
        }

        if helper.analysis_year == 0 {
            return Err(D::Error::custom(ConfigError::AnalysisYear));
        }

        glob::Pattern::new(&helper.runs_pattern)
            .map_err(|e| D::Error::custom(ConfigError::Pattern(e)))?;

        let compared = helper
            .groups
            .unwrap_or_else(|| DEFAULT_GROUPS.iter().map(|g| g.to_string()).collect());
        if let Some(unknown) = compared.iter().find(|g| {
            groups::functional_group(g).is_none() || observations::observed_group(g).is_none()
        }) {
            return Err(D::Error::custom(ConfigError::UnknownGroup(unknown.clone())));
        }

        Ok(Config {
            campaign_start,
            campaign_end,
            cutoff_depth: helper.cutoff_depth,
            projection_depth,
            analysis_year: helper.analysis_year,
            runs_pattern: helper.runs_pattern,
            grid_file: helper.grid_file,
            tracer_file: helper.tracer_file,
            chl_file: helper.chl_file,
            layer_thickness: helper.layer_thickness,
            observations: helper.observations,
            ice_breakup,
            mission: helper.mission.unwrap_or_else(|| DEFAULT_MISSION.to_string()),
            sample_type: helper
                .sample_type
                .unwrap_or_else(|| DEFAULT_SAMPLE_TYPE.to_string()),
            groups: compared,
            output_file: helper.output_file,
        })
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config: Config = serde_json::from_reader(reader).map_err(ConfigError::from)?;

        Ok(config)
    }

    pub fn calendar(&self) -> CampaignCalendar {
        CampaignCalendar::new(self.campaign_start, self.campaign_end)
    }

    pub fn cutoff_depth(&self) -> f64 {
        self.cutoff_depth
    }

    /// Deepest model level used to interpolate at the observation depths.
    pub fn projection_depth(&self) -> f64 {
        self.projection_depth
    }

    pub fn analysis_year(&self) -> usize {
        self.analysis_year
    }

    pub fn runs_pattern(&self) -> &str {
        &self.runs_pattern
    }

    pub fn grid_file(&self) -> &str {
        &self.grid_file
    }

    pub fn tracer_file(&self) -> &str {
        &self.tracer_file
    }

    /// Output file holding the chlorophyll tracers.
    pub fn chl_file(&self) -> &str {
        &self.chl_file
    }

    /// Layer thicknesses given in place of the grid file's `drF`.
    pub fn layer_thickness(&self) -> Option<&[f64]> {
        self.layer_thickness.as_deref()
    }

    pub fn observations(&self) -> &str {
        &self.observations
    }

    /// Observed sea-ice breakup at the sampling site.
    pub fn ice_breakup(&self) -> Option<NaiveDate> {
        self.ice_breakup
    }

    pub fn mission(&self) -> &str {
        &self.mission
    }

    pub fn sample_type(&self) -> &str {
        &self.sample_type
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn output_file(&self) -> Option<&str> {
        self.output_file.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const MINIMAL: &str = r#"
    {
        "campaign_start": "2016-04-29",
        "campaign_end": "2016-07-19",
        "cutoff_depth": 100,
        "analysis_year": 10,
        "runs_pattern": "output/run_*",
        "grid_file": "grid.t001.nc",
        "tracer_file": "car.0000000000.t001.nc",
        "chl_file": "chl.0000000000.t001.nc",
        "observations": "obs/66408.csv"
    }
    "#;

    fn with_field(key: &str, value: &str) -> String {
        let mut config: serde_json::Value = serde_json::from_str(MINIMAL).unwrap();
        config[key] = serde_json::from_str(value).unwrap();
        config.to_string()
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("config.json");
        let mut file = File::create(&file_path).unwrap();

        file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = Config::from_file(file_path).unwrap();

        assert_eq!(
            config.campaign_start,
            NaiveDate::from_ymd_opt(2016, 4, 29).expect("Invalid date")
        );
        assert_eq!(config.cutoff_depth(), 100.0);
        assert_eq!(config.projection_depth(), 105.0);
        assert_eq!(config.analysis_year(), 10);
        assert_eq!(config.mission(), "ice_camp_2016");
        assert_eq!(config.sample_type(), "water");
        assert_eq!(config.groups(), &["diatoms", "dino", "other", "diazo"]);
        assert_eq!(config.chl_file(), "chl.0000000000.t001.nc");
        assert!(config.layer_thickness().is_none());
        assert!(config.ice_breakup().is_none());
        assert!(config.output_file().is_none());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Config::from_file("does/not/exist.json"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_optional_fields() {
        let json = with_field("layer_thickness", "[1.0, 1.5, 2.0]");
        let config: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.layer_thickness(), Some(&[1.0, 1.5, 2.0][..]));

        let json = with_field("groups", r#"["diatoms"]"#);
        let config: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.groups(), &["diatoms"]);

        let json = with_field("ice_breakup", r#""2016-07-18""#);
        let config: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.ice_breakup(), NaiveDate::from_ymd_opt(2016, 7, 18));
    }

    #[test]
    fn test_date_format() {
        let json = with_field("campaign_start", r#""29/04/2016""#);
        let err = serde_json::from_str::<Config>(&json).unwrap_err();
        assert!(err.to_string().contains("invalid campaign_start format"));

        let json = with_field("ice_breakup", r#""July 18""#);
        let err = serde_json::from_str::<Config>(&json).unwrap_err();
        assert!(err.to_string().contains("invalid ice_breakup format"));
    }

    #[test]
    fn test_date_order() {
        let json = with_field("campaign_end", r#""2016-04-01""#);

        let err = serde_json::from_str::<Config>(&json).unwrap_err();
        assert!(err.to_string().contains("earlier"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(serde_json::from_str::<Config>(&with_field("campaign_start", r#""29/04/2016""#)).is_err());
        assert!(serde_json::from_str::<Config>(&with_field("cutoff_depth", "0")).is_err());
        assert!(serde_json::from_str::<Config>(&with_field("projection_depth", "-5")).is_err());
        assert!(serde_json::from_str::<Config>(&with_field("analysis_year", "0")).is_err());
        assert!(serde_json::from_str::<Config>(&with_field("runs_pattern", r#""output/[run""#)).is_err());
        assert!(serde_json::from_str::<Config>(&with_field("groups", r#"["pro"]"#)).is_err());
    }
}
