//! Loading serialised units from disk.

use crate::ast::SourceUnit;
use crate::discovery::MAX_FILE_SIZE;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read a file with TOCTOU-safe handling.
///
/// Opens the file, validates metadata from the file descriptor,
/// and returns the file content. This prevents race conditions
/// where the file could be replaced between check and read.
pub fn read_file_secure(file_path: &Path) -> Result<String> {
    // SECURITY: Open once, verify via fd metadata, then read from same fd
    let mut file = File::open(file_path).map_err(|e| Error::io(file_path, e))?;
    let metadata = file.metadata().map_err(|e| Error::io(file_path, e))?;

    if !metadata.is_file() {
        return Err(Error::io(
            file_path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
        ));
    }

    if metadata.len() > MAX_FILE_SIZE {
        return Err(Error::io(
            file_path,
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!(
                    "file too large: {} bytes (max: {} bytes)",
                    metadata.len(),
                    MAX_FILE_SIZE
                ),
            ),
        ));
    }

    let mut source = String::with_capacity(metadata.len() as usize);
    file.read_to_string(&mut source)
        .map_err(|e| Error::io(file_path, e))?;

    Ok(source)
}

/// Read and decode one `*.unit.json` file.
pub fn load_unit(path: &Path) -> Result<SourceUnit> {
    let text = read_file_secure(path)?;
    serde_json::from_str(&text).map_err(|e| Error::decode(path, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_file_secure_success() {
        let tmp = TempDir::new().unwrap();
        let file_path = tmp.path().join("app.unit.json");
        std::fs::write(&file_path, "{}").unwrap();

        assert_eq!(read_file_secure(&file_path).unwrap(), "{}");
    }

    #[test]
    fn test_read_file_secure_not_found() {
        let err = read_file_secure(Path::new("/nonexistent/app.unit.json")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_read_file_secure_directory() {
        let tmp = TempDir::new().unwrap();
        assert!(read_file_secure(tmp.path()).is_err());
    }

    #[test]
    fn test_load_unit_decodes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("app.unit.json");
        std::fs::write(&path, r#"{"package": "app", "files": []}"#).unwrap();

        let unit = load_unit(&path).unwrap();
        assert_eq!(unit.package, "app");
        assert_eq!(unit.language, "go");
    }

    #[test]
    fn test_load_unit_reports_decode_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.unit.json");
        std::fs::write(&path, r#"{"files": "#).unwrap();

        let err = load_unit(&path).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
        assert!(err.to_string().contains("bad.unit.json"));
    }
}
