//! Object identity stamping (`DataNum` / `SourceFile`)

use crate::catalog::{Catalog, Column, DATA_NUM_COLUMN, SOURCE_FILE_COLUMN, UNMATCHED};
use crate::error::CatalogResult;
use crate::matcher::SpatialMatcher;
use serde::{Deserialize, Serialize};

/// Outcome of stamping one catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StampSummary {
    pub source_file: String,
    pub rows: usize,
    /// Rows carrying a non-zero `DataNum`
    pub matched: usize,
}

/// Assigns canonical object ids to a reference catalog and propagates them
/// to other catalogs of the same band by sky position.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityAssigner {
    matcher: SpatialMatcher,
}

impl IdentityAssigner {
    pub fn new(matcher: SpatialMatcher) -> Self {
        Self { matcher }
    }

    pub fn matcher(&self) -> &SpatialMatcher {
        &self.matcher
    }

    /// `DataNum` = 1..=N in existing row order, `SourceFile` = the catalog's file.
    ///
    /// Existing `DataNum`/`SourceFile` columns are overwritten in place.
    pub fn stamp_reference(&self, reference: &mut Catalog) -> CatalogResult<StampSummary> {
        // Coordinates are validated up front so a bad reference fails here
        reference.positions()?;

        let rows = reference.len();
        let ids: Vec<i64> = (1..=rows as i64).collect();
        reference.set_column(DATA_NUM_COLUMN, Column::Integer(ids))?;
        stamp_source_file(reference)?;

        Ok(StampSummary {
            source_file: reference.source_file().to_string(),
            rows,
            matched: rows,
        })
    }

    /// `DataNum` of the nearest reference row within the radius, else 0.
    ///
    /// `reference` must already be stamped. Re-stamping a target against the
    /// same reference reproduces the same ids.
    pub fn stamp_target(&self, reference: &Catalog, target: &mut Catalog) -> CatalogResult<StampSummary> {
        let reference_ids = reference.integer_values(DATA_NUM_COLUMN)?;
        let result = self.matcher.match_catalogs(reference, target)?;

        let mut ids = vec![UNMATCHED; target.len()];
        for (target_row, reference_row) in result.matches() {
            ids[target_row] = reference_ids[reference_row];
        }
        let matched = ids.iter().filter(|&&id| id != UNMATCHED).count();

        target.set_column(DATA_NUM_COLUMN, Column::Integer(ids))?;
        stamp_source_file(target)?;

        tracing::debug!(
            "{}: matched {}/{} rows against {}",
            target.source_file(),
            matched,
            target.len(),
            reference.source_file()
        );

        Ok(StampSummary {
            source_file: target.source_file().to_string(),
            rows: target.len(),
            matched,
        })
    }
}

fn stamp_source_file(catalog: &mut Catalog) -> CatalogResult<()> {
    let name = catalog.source_file().to_string();
    let column = Column::Text(vec![name; catalog.len()]);
    catalog.set_column(SOURCE_FILE_COLUMN, column)
}
