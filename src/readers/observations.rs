use std::path::Path;

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use super::ReadError;
use crate::observations::FieldObservation;

/// Columns of the IFCB carbon table that are used; the others are ignored.
#[derive(Debug, Deserialize)]
struct ObservationRow {
    mission: String,
    date: String,
    sample_type: String,
    depth_m: Option<f64>,
    taxonomy: String,
    carbon_estimate_mg_c_m3: Option<f64>,
}

/// Parses `2016-05-06`, ignoring any time part that follows the date.
fn day_of_year(date: &str) -> Result<u16, chrono::ParseError> {
    let date = date.trim();
    let date = date.get(..10).unwrap_or(date);
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")?;
    Ok(date.ordinal() as u16)
}

/// Reads the observation table. Rows without a depth are skipped.
pub fn read_observations<P: AsRef<Path>>(path: P) -> Result<Vec<FieldObservation>, ReadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path.as_ref())?;

    let mut observations = Vec::new();
    let mut skipped = 0;
    for (index, result) in reader.deserialize::<ObservationRow>().enumerate() {
        let row = result?;
        let Some(depth) = row.depth_m else {
            skipped += 1;
            continue;
        };
        let day = day_of_year(&row.date).map_err(|source| ReadError::Date {
            row: index + 1,
            value: row.date.clone(),
            source,
        })?;

        observations.push(FieldObservation {
            mission: row.mission,
            sample_type: row.sample_type,
            day,
            depth,
            taxonomy: row.taxonomy,
            carbon: row.carbon_estimate_mg_c_m3.unwrap_or(f64::NAN),
        });
    }

    if skipped > 0 {
        log::warn!("skipped {} observation rows without a depth", skipped);
    }
    log::info!(
        "read {} observations from {}",
        observations.len(),
        path.as_ref().display()
    );
    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_day_of_year() {
        assert_eq!(day_of_year("2016-01-01").unwrap(), 1);
        assert_eq!(day_of_year("2016-05-02").unwrap(), 123);
        assert_eq!(day_of_year("2016-05-02 10:30:00").unwrap(), 123);
        assert!(day_of_year("02/05/2016").is_err());
    }

    #[test]
    fn test_read_observations() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("66408.csv");
        let mut file = File::create(&file_path).unwrap();

        let table = "\
mission,date,date_time,sample_type,depth_m,taxonomy,carbon_estimate_mg_c_m3,pi
ice_camp_2016,2016-05-02,2016-05-02 10:00:00,water,1.5,Chaetoceros,2.25,someone
ice_camp_2016,2016-05-02,2016-05-02 10:00:00,water,5,Dinoflagellates,,someone
ice_camp_2016,2016-05-02,2016-05-02 10:00:00,ice,,Melosira,4.0,someone
";
        file.write_all(table.as_bytes()).unwrap();

        let observations = read_observations(&file_path).unwrap();

        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].day, 123);
        assert_eq!(observations[0].depth, 1.5);
        assert_eq!(observations[0].taxonomy, "Chaetoceros");
        assert_eq!(observations[0].carbon, 2.25);
        assert!(observations[1].carbon.is_nan());
    }

    #[test]
    fn test_bad_date() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("bad.csv");
        let mut file = File::create(&file_path).unwrap();
        file.write_all(
            b"mission,date,sample_type,depth_m,taxonomy,carbon_estimate_mg_c_m3\n\
ice_camp_2016,May 2nd,water,1.5,Chaetoceros,1.0\n",
        )
        .unwrap();

        assert!(matches!(
            read_observations(&file_path),
            Err(ReadError::Date { row: 1, .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            read_observations("does/not/exist.csv"),
            Err(ReadError::Csv(_))
        ));
    }
}
