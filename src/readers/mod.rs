pub mod memory;
pub mod nc;
pub mod observations;
pub mod types;
pub mod utils;

pub use memory::MemoryReader;
pub use nc::NcReader;
pub use observations::read_observations;
pub use types::{FileError, FileType, ReadError, TracerReader};
pub use utils::reader_from_filetype;

use crate::observations::FieldObservation;

/// Tracer reader for a model output file, chosen from its extension.
pub fn create_reader(file_name: String) -> Result<Box<dyn TracerReader>, FileError> {
    match reader_from_filetype(file_name.as_ref()) {
        Ok(FileType::NetCDF) => Ok(Box::new(NcReader { file_name })),
        Ok(FileType::Csv) => Err(FileError::UnsupportedModelFile(file_name)),
        Err(e) => Err(e),
    }
}

/// Field observations from a table, chosen from its extension.
pub fn load_observations(file_name: &str) -> Result<Vec<FieldObservation>, ReadError> {
    match reader_from_filetype(file_name.as_ref())? {
        FileType::Csv => read_observations(file_name),
        FileType::NetCDF => Err(FileError::UnsupportedObservationFile(file_name.to_string()).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_create_reader() {
        assert!(create_reader("run/car.0000000000.t001.nc".to_string()).is_ok());
        assert!(matches!(
            create_reader("obs/66408.csv".to_string()),
            Err(FileError::UnsupportedModelFile(_))
        ));
        assert!(matches!(
            create_reader("input/siarea.bin".to_string()),
            Err(FileError::UnknownFileType)
        ));
    }

    #[test]
    fn test_load_observations() {
        let dir = tempdir().unwrap();
        let table = dir.path().join("66408.csv");
        fs::write(
            &table,
            "mission,date,sample_type,depth_m,taxonomy,carbon_estimate_mg_c_m3\n\
             ice_camp_2016,2016-05-02,water,1.5,Chaetoceros,2.25\n",
        )
        .unwrap();

        let observations = load_observations(&table.to_string_lossy()).unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].day, 123);

        assert!(matches!(
            load_observations("run/car.0000000000.t001.nc"),
            Err(ReadError::File(FileError::UnsupportedObservationFile(_)))
        ));
        assert!(matches!(
            load_observations("obs/66408.xlsx"),
            Err(ReadError::File(FileError::UnknownFileType))
        ));
    }
}
