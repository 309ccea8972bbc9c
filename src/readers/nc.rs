use gdal::{Dataset, Metadata};

use super::{ReadError, TracerReader};
use crate::tracer::Tracer2D;

/// Reads MITgcm netCDF output through GDAL's netCDF driver.
///
/// A 1-D column model writes tracers as `(T, Z, Y, X)` with a single X/Y
/// cell, which GDAL exposes as a 1x1 raster with one band per (T, Z) pair.
pub struct NcReader {
    pub file_name: String,
}

impl NcReader {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    fn subdataset_path(&self, variable: &str) -> String {
        format!("NETCDF:\"{}\":{}", self.file_name, variable)
    }

    fn open(&self, variable: &str) -> Result<Dataset, ReadError> {
        Dataset::open(self.subdataset_path(variable)).map_err(|e| {
            log::debug!("could not open {} in {}: {}", variable, self.file_name, e);
            ReadError::MissingVariable(format!("{} in {}", variable, self.file_name))
        })
    }
}

/// Parses GDAL list metadata such as `{T,Z}` or `{50,6}`.
fn parse_list(value: &str) -> Vec<String> {
    value
        .trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn is_time_dimension(name: &str) -> bool {
    name == "T" || name.to_lowercase().starts_with("time")
}

/// Size of a dimension from its `NETCDF_DIM_<name>_DEF` item, `{size,type}`.
fn parse_dimension_def(def: &str) -> Option<usize> {
    parse_list(def).first()?.parse().ok()
}

fn dimension_size(dataset: &Dataset, name: &str) -> Result<usize, ReadError> {
    let key = format!("NETCDF_DIM_{}_DEF", name);
    dataset
        .metadata_item(&key, "")
        .and_then(|def| parse_dimension_def(&def))
        .ok_or_else(|| ReadError::NetCDF(format!("missing or invalid {}", key)))
}

/// (layer, timestep) held by the 0-based `band`.
fn band_position(
    band: usize,
    n_layers: usize,
    n_times: usize,
    layers_fastest: bool,
) -> (usize, usize) {
    if layers_fastest {
        (band % n_layers, band / n_layers)
    } else {
        (band / n_times, band % n_times)
    }
}

fn read_band_value(dataset: &Dataset, index: usize) -> Result<f64, ReadError> {
    let band = dataset.rasterband(index)?;
    let buffer = band.read_as::<f64>((0, 0), (1, 1), (1, 1), None)?;
    let raw_value = buffer.data()[0];

    if band.no_data_value().is_some_and(|nd| raw_value == nd) {
        return Ok(f64::NAN);
    }
    let scale = band.scale().unwrap_or(1.0);
    let offset = band.offset().unwrap_or(0.0);
    Ok(raw_value * scale + offset)
}

impl TracerReader for NcReader {
    fn read_tracer(&self, variable: &str) -> Result<Tracer2D, ReadError> {
        let dataset = self.open(variable)?;

        let (width, height) = dataset.raster_size();
        if width * height != 1 {
            return Err(ReadError::NetCDF(format!(
                "{} is a {}x{} raster, expected a single water column",
                variable, width, height
            )));
        }

        let extra = dataset
            .metadata_item("NETCDF_DIM_EXTRA", "")
            .map(|v| parse_list(&v))
            .unwrap_or_default();
        let time_name = extra.iter().find(|name| is_time_dimension(name));
        let layer_name = extra.iter().find(|name| !is_time_dimension(name));

        let n_bands = dataset.raster_count();
        let n_layers = match layer_name {
            Some(name) => dimension_size(&dataset, name)?,
            None => 1,
        };
        let n_times = match time_name {
            Some(name) => dimension_size(&dataset, name)?,
            None => 1,
        };
        if n_layers * n_times != n_bands {
            return Err(ReadError::NetCDF(format!(
                "{} has {} bands for {} layers x {} timesteps",
                variable, n_bands, n_layers, n_times
            )));
        }

        // Band order follows the variable's dimension order; find out which
        // of the two extra dimensions varies fastest.
        let layers_fastest = match layer_name {
            Some(name) if n_layers > 1 && n_times > 1 => {
                let key = format!("NETCDF_DIM_{}", name);
                let first = dataset.rasterband(1)?.metadata_item(&key, "");
                let second = dataset.rasterband(2)?.metadata_item(&key, "");
                first != second
            }
            _ => true,
        };

        let mut tracer = Tracer2D::filled(n_layers, n_times, f64::NAN)?;
        for b in 0..n_bands {
            let (layer, t) = band_position(b, n_layers, n_times, layers_fastest);
            tracer.set(layer, t, read_band_value(&dataset, b + 1)?);
        }

        log::debug!(
            "read {} from {}: {} layers x {} timesteps",
            variable,
            self.file_name,
            n_layers,
            n_times
        );
        Ok(tracer)
    }

    fn read_vector(&self, variable: &str) -> Result<Vec<f64>, ReadError> {
        let dataset = self.open(variable)?;
        let (width, height) = dataset.raster_size();

        if width * height == 1 {
            // One value per band
            return (1..=dataset.raster_count())
                .map(|b| read_band_value(&dataset, b))
                .collect();
        }

        let band = dataset.rasterband(1)?;
        let buffer = band.read_as::<f64>((0, 0), (width, height), (width, height), None)?;
        let no_data = band.no_data_value();
        Ok(buffer
            .data()
            .iter()
            .map(|&v| if no_data == Some(v) { f64::NAN } else { v })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("{T,Z}"), vec!["T", "Z"]);
        assert_eq!(parse_list("{50, 6}"), vec!["50", "6"]);
        assert!(parse_list("{}").is_empty());
    }

    #[test]
    fn test_parse_dimension_def() {
        assert_eq!(parse_dimension_def("{50,6}"), Some(50));
        assert_eq!(parse_dimension_def("{3650, 6}"), Some(3650));
        assert_eq!(parse_dimension_def("{}"), None);
        assert_eq!(parse_dimension_def("{Z,6}"), None);
    }

    #[test]
    fn test_band_position() {
        // (T, Z) variables: layers vary fastest
        let by_layer: Vec<(usize, usize)> = (0..6).map(|b| band_position(b, 3, 2, true)).collect();
        assert_eq!(by_layer, [(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);

        let by_time: Vec<(usize, usize)> = (0..6).map(|b| band_position(b, 3, 2, false)).collect();
        assert_eq!(by_time, [(0, 0), (0, 1), (1, 0), (1, 1), (2, 0), (2, 1)]);

        // A single layer or timestep
        assert_eq!(band_position(4, 1, 5, true), (0, 4));
        assert_eq!(band_position(4, 5, 1, true), (4, 0));
    }

    #[test]
    fn test_time_dimension() {
        assert!(is_time_dimension("T"));
        assert!(is_time_dimension("time"));
        assert!(!is_time_dimension("Z"));
        assert!(!is_time_dimension("Zmd000050"));
    }

    #[test]
    fn test_missing_file() {
        let reader = NcReader::new("does/not/exist.nc");

        assert!(matches!(
            reader.read_tracer("TRAC21"),
            Err(ReadError::MissingVariable(_))
        ));
    }
}
