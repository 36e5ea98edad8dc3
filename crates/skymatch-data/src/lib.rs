pub mod aggregate;
pub mod catalog;
pub mod discovery;
pub mod error;
pub mod identity;
pub mod io;
pub mod manifest;
pub mod matcher;
pub mod merge;
pub mod pipeline;
pub mod reference;
pub mod synthetic;

pub use aggregate::{Aggregator, UnmatchedPolicy};
pub use catalog::{Catalog, Column, ColumnKind, Field, UNMATCHED};
pub use discovery::{band_pattern, discover};
pub use error::{CatalogError, CatalogResult};
pub use identity::{IdentityAssigner, StampSummary};
pub use io::{read_catalog, read_table, write_catalog};
pub use manifest::{BandEntry, RunManifest};
pub use matcher::{MatchResult, Nearest, SpatialMatcher};
pub use merge::merge_catalogs;
pub use pipeline::{
    average_photometry, ensure_output_dir, group_by_filter, BandOutput, FailurePolicy, MatchPipeline,
    PipelineConfig,
};
pub use reference::{select_reference, ReferenceSplit};
pub use synthetic::SyntheticField;
