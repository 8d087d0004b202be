//! Unit file discovery.
//!
//! Front ends write one `*.unit.json` per analyzed package; this module finds
//! them under a path.

use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Maximum unit file size to load (10 MB).
///
/// Files larger than this are skipped to prevent memory exhaustion attacks.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// File name suffix of serialised syntax-tree units.
pub const UNIT_SUFFIX: &str = ".unit.json";

/// True if the path names a unit file.
pub fn is_unit_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(UNIT_SUFFIX) && name.len() > UNIT_SUFFIX.len())
}

/// Discover all unit files at the given path, sorted.
///
/// A file path is returned as-is when it is a unit file. Directories are
/// walked without following symlinks, skipping:
/// - Hidden directories (starting with `.`)
/// - Common dependency/build directories (`vendor`, `node_modules`, ...)
/// - Files over [`MAX_FILE_SIZE`]
pub fn discover_units(path: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    // SECURITY: Disable symlink following within the tree.
    // The root itself may be a symlink (common for /tmp on macOS).
    for entry in WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e))
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let file_path = entry.path();
        if !is_unit_file(file_path) {
            continue;
        }

        // SECURITY: Double-check it's a regular file via metadata
        match std::fs::symlink_metadata(file_path) {
            Ok(meta) if meta.is_file() => {
                if meta.len() > MAX_FILE_SIZE {
                    warn!(
                        path = %file_path.display(),
                        size = meta.len(),
                        max = MAX_FILE_SIZE,
                        "skipping unit: file too large"
                    );
                    continue;
                }
                files.push(file_path.to_path_buf());
            }
            Ok(_) => continue,
            Err(e) => {
                warn!(path = %file_path.display(), error = %e, "cannot read metadata");
                continue;
            }
        }
    }

    files.sort();
    files
}

/// Check if a directory entry should be excluded from traversal.
///
/// The root directory (depth 0) is never excluded, even if it starts with `.`.
pub fn is_excluded_dir(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }

    // Never exclude the root directory (allows temp dirs like .tmpXXX)
    if entry.depth() == 0 {
        return false;
    }

    let name = entry.file_name().to_string_lossy();

    if name.starts_with('.') {
        return true;
    }

    matches!(
        name.as_ref(),
        "target" | "node_modules" | "vendor" | "third_party" | "testdata" | "build" | "dist" | "out"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unit_suffix() {
        assert!(is_unit_file(Path::new("out/app.unit.json")));
        assert!(!is_unit_file(Path::new("out/app.json")));
        assert!(!is_unit_file(Path::new(".unit.json")));
        assert!(!is_unit_file(Path::new("main.go")));
    }

    #[test]
    fn test_excludes_vendor_directory() {
        let temp_dir = TempDir::new().unwrap();
        let vendor_dir = temp_dir.path().join("vendor");
        std::fs::create_dir(&vendor_dir).unwrap();
        std::fs::write(vendor_dir.join("dep.unit.json"), "{}").unwrap();

        assert!(discover_units(temp_dir.path()).is_empty());
    }

    #[test]
    fn test_excludes_hidden_directories() {
        let temp_dir = TempDir::new().unwrap();
        let hidden_dir = temp_dir.path().join(".cache");
        std::fs::create_dir(&hidden_dir).unwrap();
        std::fs::write(hidden_dir.join("app.unit.json"), "{}").unwrap();

        assert!(discover_units(temp_dir.path()).is_empty());
    }

    #[test]
    fn test_finds_unit_files_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let units = temp_dir.path().join("units");
        std::fs::create_dir(&units).unwrap();
        std::fs::write(units.join("b.unit.json"), "{}").unwrap();
        std::fs::write(units.join("a.unit.json"), "{}").unwrap();
        std::fs::write(units.join("notes.txt"), "text file").unwrap();

        let files = discover_units(temp_dir.path());
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.unit.json", "b.unit.json"]);
    }

    #[test]
    fn test_single_file_path() {
        let temp_dir = TempDir::new().unwrap();
        let unit = temp_dir.path().join("app.unit.json");
        std::fs::write(&unit, "{}").unwrap();

        assert_eq!(discover_units(&unit), vec![unit]);
    }

    #[cfg(unix)]
    #[test]
    fn test_does_not_follow_symlinks() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        std::fs::write(outside.path().join("x.unit.json"), "{}").unwrap();
        symlink(outside.path().join("x.unit.json"), temp_dir.path().join("link.unit.json")).unwrap();

        assert!(discover_units(temp_dir.path()).is_empty());
    }
}
