//! Reference catalog selection for a filter band

use crate::catalog::Catalog;
use crate::error::{CatalogError, CatalogResult};

/// A band's catalogs split into the identity baseline and everything else
#[derive(Debug, Clone)]
pub struct ReferenceSplit {
    pub reference: Catalog,
    /// Remaining catalogs in their original order
    pub others: Vec<Catalog>,
}

/// Pick the catalog with the most rows as reference.
///
/// On equal row counts the first catalog in input order wins.
pub fn select_reference(mut catalogs: Vec<Catalog>) -> CatalogResult<ReferenceSplit> {
    if catalogs.is_empty() {
        return Err(CatalogError::EmptyBatch("no catalogs to select a reference from".to_string()));
    }

    let mut best = 0;
    for (i, catalog) in catalogs.iter().enumerate().skip(1) {
        if catalog.len() > catalogs[best].len() {
            best = i;
        }
    }

    let reference = catalogs.remove(best);
    tracing::debug!(
        "Reference catalog {} ({} rows) out of {}",
        reference.source_file(),
        reference.len(),
        catalogs.len() + 1
    );

    Ok(ReferenceSplit {
        reference,
        others: catalogs,
    })
}
