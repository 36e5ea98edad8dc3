use crate::error::CatalogResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Outcome of one filter band
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandEntry {
    pub filter: String,
    pub inputs: Vec<String>,
    pub reference: Option<String>,
    pub rows: usize,
    /// Rows with a non-zero `DataNum`, reference rows included
    pub matched_rows: usize,
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BandEntry {
    pub fn failed(filter: &str, error: String) -> Self {
        Self {
            filter: filter.to_string(),
            inputs: Vec::new(),
            reference: None,
            rows: 0,
            matched_rows: 0,
            output: None,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Record of a `group_by_filter` run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub version: u32,
    pub object: String,
    pub source: String,
    pub match_radius_arcsec: f64,
    pub bands: Vec<BandEntry>,
}

impl RunManifest {
    pub fn new(object: &str, source: &str, match_radius_arcsec: f64) -> Self {
        Self {
            version: 1,
            object: object.to_string(),
            source: source.to_string(),
            match_radius_arcsec,
            bands: Vec::new(),
        }
    }

    /// `<object>_manifest.json`
    pub fn file_name(object: &str) -> String {
        format!("{}_manifest.json", object)
    }

    pub fn add_band(&mut self, entry: BandEntry) {
        self.bands.push(entry);
    }

    pub fn succeeded(&self) -> usize {
        self.bands.iter().filter(|b| b.is_ok()).count()
    }

    pub fn save(&self, path: &Path) -> CatalogResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> CatalogResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
