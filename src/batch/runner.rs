use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::BatchError;
use super::validation::{
    ObservedGroupData, ObservedSummary, ValidationReport, ValidationSettings, validate_run,
};
use crate::config::Config;
use crate::grid::DepthProfile;
use crate::readers::{self, NcReader, TracerReader};

/// Output files of one simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFiles {
    pub dir: PathBuf,
    pub grid: PathBuf,
    /// Nutrients and biomass.
    pub tracer: PathBuf,
    /// Chlorophyll.
    pub chl: PathBuf,
}

impl RunFiles {
    pub fn name(&self) -> String {
        self.dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.dir.to_string_lossy().to_string())
    }
}

/// Search for a file recursively within a directory
fn search_file_recursively(base_dir: &Path, filename: &str) -> Option<PathBuf> {
    WalkDir::new(base_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .find(|entry| {
            entry.file_type().is_file() && entry.file_name().to_string_lossy() == filename
        })
        .map(|entry| entry.into_path())
}

/// Run directories matching `pattern` that hold every output file. Runs with
/// a missing file are skipped.
pub fn discover_runs(
    pattern: &str,
    grid_file: &str,
    tracer_file: &str,
    chl_file: &str,
) -> Result<Vec<RunFiles>, BatchError> {
    let mut runs = Vec::new();

    for entry in glob::glob(pattern)? {
        let dir = match entry {
            Ok(path) if path.is_dir() => path,
            Ok(_) => continue,
            Err(e) => {
                log::warn!("cannot read {}: {}", e.path().display(), e);
                continue;
            }
        };

        let grid = search_file_recursively(&dir, grid_file);
        let tracer = search_file_recursively(&dir, tracer_file);
        let chl = search_file_recursively(&dir, chl_file);
        match (grid, tracer, chl) {
            (Some(grid), Some(tracer), Some(chl)) => {
                log::debug!("found run {}", dir.display());
                runs.push(RunFiles {
                    dir,
                    grid,
                    tracer,
                    chl,
                });
            }
            (grid, tracer, chl) => {
                let missing: Vec<&str> = [
                    (grid.is_none(), grid_file),
                    (tracer.is_none(), tracer_file),
                    (chl.is_none(), chl_file),
                ]
                .into_iter()
                .filter(|(is_missing, _)| *is_missing)
                .map(|(_, name)| name)
                .collect();
                log::warn!("skipping {}: missing {:?}", dir.display(), missing);
            }
        }
    }

    if runs.is_empty() {
        return Err(BatchError::NoRuns(pattern.to_string()));
    }

    runs.sort_by(|a, b| a.dir.cmp(&b.dir));
    log::info!("found {} simulation runs matching {}", runs.len(), pattern);
    Ok(runs)
}

#[derive(Debug)]
pub struct BatchRunner {
    runs: Vec<RunFiles>,
    config: Config,
}

impl BatchRunner {
    pub fn new(config: Config) -> Result<Self, BatchError> {
        let runs = discover_runs(
            config.runs_pattern(),
            config.grid_file(),
            config.tracer_file(),
            config.chl_file(),
        )?;
        Ok(BatchRunner { runs, config })
    }

    /// Validates every run against the observations. A run that cannot be
    /// read is reported and skipped.
    pub fn process(&self) -> Result<ValidationReport, BatchError> {
        let observations = readers::load_observations(self.config.observations())?;
        let summary = ObservedSummary::prepare(
            &observations,
            self.config.mission(),
            self.config.sample_type(),
            &self.config.calendar(),
            self.config.ice_breakup(),
        )?;
        let observed = ObservedGroupData::prepare_all(
            &observations,
            self.config.mission(),
            self.config.sample_type(),
            &self.config.calendar(),
            self.config.groups(),
        )?;
        let settings = ValidationSettings::from_config(&self.config);

        let mut reports = Vec::new();
        for run in &self.runs {
            let name = run.name();
            let grid = NcReader::new(run.grid.to_string_lossy());
            let result =
                layer_thickness(&grid, self.config.layer_thickness()).and_then(|thickness| {
                    let biomass =
                        readers::create_reader(run.tracer.to_string_lossy().to_string())?;
                    let chlorophyll =
                        readers::create_reader(run.chl.to_string_lossy().to_string())?;
                    validate_run(
                        &name,
                        biomass.as_ref(),
                        chlorophyll.as_ref(),
                        &thickness,
                        &observed,
                        &settings,
                    )
                });

            match result {
                Ok(report) => {
                    log::info!("✓ validated {}", name);
                    reports.push(report);
                }
                Err(e) => log::error!("✗ {}: {}", name, e),
            }
        }

        Ok(ValidationReport {
            observed: summary,
            runs: reports,
        })
    }

    /// Writes the report as pretty JSON to the configured output file.
    pub fn write_reports(&self, report: &ValidationReport) -> Result<Option<PathBuf>, BatchError> {
        let Some(path) = self.config.output_file() else {
            return Ok(None);
        };
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, report)?;
        log::info!("saved {} run reports to {}", report.runs.len(), path);
        Ok(Some(PathBuf::from(path)))
    }
}

/// Layer thicknesses from the configuration, else `drF` of the run's grid.
fn layer_thickness(
    grid: &dyn TracerReader,
    configured: Option<&[f64]>,
) -> Result<DepthProfile, BatchError> {
    let thickness = match configured {
        Some(thickness) => thickness.to_vec(),
        None => grid.read_vector("drF")?,
    };
    Ok(DepthProfile::new(thickness)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readers::{MemoryReader, ReadError};
    use std::fs;
    use tempfile::tempdir;

    const GRID: &str = "grid.t001.nc";
    const CAR: &str = "car.0000000000.t001.nc";
    const CHL: &str = "chl.0000000000.t001.nc";

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_discover_runs() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("output");
        for run in ["run_a/mnc_0001", "run_b"] {
            touch(&output.join(run).join(GRID));
            touch(&output.join(run).join(CAR));
            touch(&output.join(run).join(CHL));
        }
        // Missing the tracer file
        touch(&output.join("run_c").join(GRID));
        touch(&output.join("run_c").join(CHL));
        // Missing the chlorophyll file
        touch(&output.join("run_e").join(GRID));
        touch(&output.join("run_e").join(CAR));
        touch(&output.join("run_d.txt"));

        let pattern = format!("{}/run_*", output.display());
        let runs = discover_runs(&pattern, GRID, CAR, CHL).unwrap();

        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].name(), "run_a");
        assert_eq!(runs[0].tracer, output.join("run_a/mnc_0001").join(CAR));
        assert_eq!(runs[0].chl, output.join("run_a/mnc_0001").join(CHL));
        assert_eq!(runs[1].name(), "run_b");
    }

    #[test]
    fn test_layer_thickness() {
        let grid = MemoryReader::new().with_vector("drF", vec![10.0, 10.0, 15.0]);

        let from_grid = layer_thickness(&grid, None).unwrap();
        assert_eq!(from_grid.thickness(), &[10.0, 10.0, 15.0]);

        let configured = layer_thickness(&grid, Some(&[5.0, 5.0][..])).unwrap();
        assert_eq!(configured.len(), 2);

        assert!(matches!(
            layer_thickness(&MemoryReader::new(), None),
            Err(BatchError::Read(ReadError::MissingVariable(_)))
        ));
        assert!(matches!(
            layer_thickness(&grid, Some(&[5.0, 0.0][..])),
            Err(BatchError::Vstats(_))
        ));
    }

    #[test]
    fn test_no_runs() {
        let dir = tempdir().unwrap();
        let pattern = format!("{}/run_*", dir.path().display());

        assert!(matches!(
            discover_runs(&pattern, GRID, CAR, CHL),
            Err(BatchError::NoRuns(_))
        ));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            discover_runs("output/[run", GRID, CAR, CHL),
            Err(BatchError::Pattern(_))
        ));
    }
}
