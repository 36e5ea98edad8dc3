//! Per-filter matching pipeline and the averaging stage

use crate::aggregate::{Aggregator, UnmatchedPolicy};
use crate::catalog::{Catalog, DATA_NUM_COLUMN, UNMATCHED};
use crate::discovery::{band_pattern, discover};
use crate::error::{CatalogError, CatalogResult};
use crate::identity::{IdentityAssigner, StampSummary};
use crate::io::{file_name, read_catalog, read_table, write_catalog};
use crate::manifest::{BandEntry, RunManifest};
use crate::matcher::SpatialMatcher;
use crate::merge::merge_catalogs;
use crate::reference::select_reference;

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use skymatch_core::constants::DEFAULT_MATCH_RADIUS_ARCSEC;
use std::path::{Path, PathBuf};

/// How a failing band affects the rest of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// First failing band aborts the run
    #[default]
    Abort,
    /// Failing bands are logged and recorded; the rest still run
    Continue,
}

/// Pipeline configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub filters: Vec<String>,
    pub target_dir: PathBuf,
    pub match_radius_arcsec: f64,
    pub unmatched: UnmatchedPolicy,
    pub failure_policy: FailurePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            filters: ["I", "R", "V", "B"].iter().map(|f| f.to_string()).collect(),
            target_dir: PathBuf::from("output"),
            match_radius_arcsec: DEFAULT_MATCH_RADIUS_ARCSEC,
            unmatched: UnmatchedPolicy::Include,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

impl PipelineConfig {
    /// Load from JSON; missing fields take their defaults
    pub fn load(path: &Path) -> CatalogResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, path: &Path) -> CatalogResult<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Merged catalog of one band plus what went into it
#[derive(Debug, Clone)]
pub struct BandOutput {
    pub merged: Catalog,
    pub reference: String,
    /// Reference first, then the others in processing order
    pub stamps: Vec<StampSummary>,
}

/// Matching pipeline: select, stamp and merge the catalogs of each band
pub struct MatchPipeline {
    config: PipelineConfig,
    assigner: IdentityAssigner,
}

impl MatchPipeline {
    pub fn new(config: PipelineConfig) -> CatalogResult<Self> {
        let matcher = SpatialMatcher::new(config.match_radius_arcsec)?;
        Ok(Self {
            config,
            assigner: IdentityAssigner::new(matcher),
        })
    }

    pub fn with_defaults() -> Self {
        Self {
            config: PipelineConfig::default(),
            assigner: IdentityAssigner::default(),
        }
    }

    /// Load every file once, stamp identities against the largest catalog and
    /// concatenate, reference rows first.
    pub fn match_band(&self, paths: &[PathBuf]) -> CatalogResult<BandOutput> {
        if paths.is_empty() {
            return Err(CatalogError::EmptyBatch("no catalog files given".to_string()));
        }

        let catalogs = paths
            .iter()
            .map(|p| read_catalog(p))
            .collect::<CatalogResult<Vec<_>>>()?;

        let mut split = select_reference(catalogs)?;
        let mut stamps = vec![self.assigner.stamp_reference(&mut split.reference)?];

        let pb = ProgressBar::new(split.others.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        for target in split.others.iter_mut() {
            pb.set_message(target.source_file().to_string());
            stamps.push(self.assigner.stamp_target(&split.reference, target)?);
            pb.inc(1);
        }
        pb.finish_and_clear();

        let reference = split.reference.source_file().to_string();
        let merged = merge_catalogs(split.reference, &split.others)?;

        Ok(BandOutput {
            merged,
            reference,
            stamps,
        })
    }

    /// Discover, match and write one band to `<target>/<object><filter>Filt.csv`
    pub fn process_band(&self, source_prefix: &str, object: &str, filter: &str) -> CatalogResult<BandEntry> {
        let pattern = band_pattern(source_prefix, filter);
        let paths = discover(&pattern)?;
        if paths.is_empty() {
            return Err(CatalogError::EmptyBatch(format!("no files match {}", pattern)));
        }

        tracing::info!("Filter {}: {} catalogs", filter, paths.len());

        let output_path = self.config.target_dir.join(format!("{}{}Filt.csv", object, filter));
        let band = self.match_band(&paths)?;
        let merged = band.merged.with_source_file(file_name(&output_path));
        write_catalog(&merged, &output_path)?;

        let matched_rows = merged
            .integer_values(DATA_NUM_COLUMN)?
            .iter()
            .filter(|&&id| id != UNMATCHED)
            .count();

        tracing::info!(
            "Filter {}: {} rows ({} matched) -> {:?}",
            filter,
            merged.len(),
            matched_rows,
            output_path
        );

        Ok(BandEntry {
            filter: filter.to_string(),
            inputs: paths.iter().map(|p| file_name(p)).collect(),
            reference: Some(band.reference),
            rows: merged.len(),
            matched_rows,
            output: Some(output_path),
            error: None,
        })
    }

    /// Run every configured band and write the run manifest.
    ///
    /// Under `FailurePolicy::Abort` the first failing band is returned as the
    /// error. Under `Continue` failures are recorded and the run only fails if
    /// no band succeeded.
    pub fn group_by_filter(&self, source_prefix: &str, object: &str) -> CatalogResult<RunManifest> {
        ensure_output_dir(&self.config.target_dir)?;

        let radius = self.assigner.matcher().radius_arcsec();
        let mut manifest = RunManifest::new(object, source_prefix, radius);
        let manifest_path = self.config.target_dir.join(RunManifest::file_name(object));
        let mut last_error = None;

        for filter in &self.config.filters {
            match self.process_band(source_prefix, object, filter) {
                Ok(entry) => manifest.add_band(entry),
                Err(e) if self.config.failure_policy == FailurePolicy::Continue => {
                    tracing::warn!("Filter {} failed: {}", filter, e);
                    manifest.add_band(BandEntry::failed(filter, e.to_string()));
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        manifest.save(&manifest_path)?;

        match last_error {
            Some(e) if manifest.succeeded() == 0 => Err(e),
            _ => Ok(manifest),
        }
    }
}

/// Top-level per-filter grouping with an explicit configuration
pub fn group_by_filter(source_prefix: &str, object: &str, config: PipelineConfig) -> CatalogResult<RunManifest> {
    MatchPipeline::new(config)?.group_by_filter(source_prefix, object)
}

/// Create `path` if needed. An existing directory is not an error; an
/// existing non-directory or any other failure is.
pub fn ensure_output_dir(path: &Path) -> CatalogResult<()> {
    std::fs::create_dir_all(path).map_err(|source| CatalogError::OutputDirectory {
        path: path.to_path_buf(),
        source,
    })
}

/// Average a merged catalog per object into `Avg<name>` next to it
pub fn average_photometry(merged_path: &Path, unmatched: UnmatchedPolicy) -> CatalogResult<PathBuf> {
    let merged = read_table(merged_path)?;
    let averaged = Aggregator::new(unmatched).aggregate(&merged)?;

    let output_path = merged_path.with_file_name(averaged.source_file());
    write_catalog(&averaged, &output_path)?;
    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.filters, ["I", "R", "V", "B"]);
        assert_eq!(config.target_dir, PathBuf::from("output"));
        assert_eq!(config.match_radius_arcsec, 2.0);
        assert_eq!(config.unmatched, UnmatchedPolicy::Include);
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn test_partial_config_json_fills_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"filters": ["R"], "failure_policy": "continue"}"#).unwrap();
        assert_eq!(config.filters, ["R"]);
        assert_eq!(config.failure_policy, FailurePolicy::Continue);
        assert_eq!(config.match_radius_arcsec, 2.0);
    }

    #[test]
    fn test_invalid_radius_is_rejected() {
        let config = PipelineConfig {
            match_radius_arcsec: 0.0,
            ..Default::default()
        };
        assert!(matches!(MatchPipeline::new(config), Err(CatalogError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_band_is_rejected() {
        let err = MatchPipeline::with_defaults().match_band(&[]).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyBatch(_)));
    }

    #[test]
    fn test_existing_output_dir_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("output");
        ensure_output_dir(&out).unwrap();
        ensure_output_dir(&out).unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn test_output_path_occupied_by_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("output");
        std::fs::write(&out, "not a directory").unwrap();
        let err = ensure_output_dir(&out).unwrap_err();
        assert!(matches!(err, CatalogError::OutputDirectory { .. }));
    }
}
