//! Locating the per-band catalog files of an observation

use crate::error::CatalogResult;
use std::path::{Path, PathBuf};

/// Glob pattern for the catalogs of one filter band.
///
/// A directory prefix yields `<dir>/*<filter>.csv`; any other prefix is
/// concatenated as-is, so `data/M71-` yields `data/M71-*<filter>.csv`.
pub fn band_pattern(source_prefix: &str, filter: &str) -> String {
    let prefix = Path::new(source_prefix);
    if !source_prefix.is_empty() && prefix.is_dir() {
        prefix.join(format!("*{}.csv", filter)).to_string_lossy().into_owned()
    } else {
        format!("{}*{}.csv", source_prefix, filter)
    }
}

/// Files matching `pattern`, sorted by path
pub fn discover(pattern: &str) -> CatalogResult<Vec<PathBuf>> {
    let mut paths = glob::glob(pattern)?.collect::<Result<Vec<_>, _>>()?;
    paths.sort();
    tracing::debug!("{} files match {}", paths.len(), pattern);
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_pattern_is_concatenated() {
        assert_eq!(band_pattern("no/such/dir/M71-", "R"), "no/such/dir/M71-*R.csv");
    }

    #[test]
    fn test_directory_prefix_is_joined() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = band_pattern(dir.path().to_str().unwrap(), "V");
        assert_eq!(PathBuf::from(pattern), dir.path().join("*V.csv"));
    }

    #[test]
    fn test_discover_filters_by_band_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["M71-002-R.csv", "M71-001-R.csv", "M71-001-V.csv", "notes.txt"] {
            std::fs::write(dir.path().join(name), "RA,Dec\n").unwrap();
        }

        let found = discover(&band_pattern(dir.path().to_str().unwrap(), "R")).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["M71-001-R.csv", "M71-002-R.csv"]);
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        assert!(discover("[").is_err());
    }
}
