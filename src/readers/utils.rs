use super::types::{FileError, FileType};
use std::path::Path;

pub fn reader_from_filetype(path: &Path) -> Result<FileType, FileError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("nc") => Ok(FileType::NetCDF),
        Some("csv") => Ok(FileType::Csv),
        _ => Err(FileError::UnknownFileType),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_from_filetype() {
        assert_eq!(
            reader_from_filetype(Path::new("run/car.0000000000.t001.nc")).unwrap(),
            FileType::NetCDF
        );
        assert_eq!(
            reader_from_filetype(Path::new("obs/66408.csv")).unwrap(),
            FileType::Csv
        );
        assert!(reader_from_filetype(Path::new("input/siarea.bin")).is_err());
        assert!(reader_from_filetype(Path::new("grid")).is_err());
    }
}
