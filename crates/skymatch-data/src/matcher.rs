//! Nearest-neighbour matching of a target catalog against a reference catalog

use crate::catalog::Catalog;
use crate::error::{CatalogError, CatalogResult};
use serde::{Deserialize, Serialize};
use skymatch_core::constants::DEFAULT_MATCH_RADIUS_ARCSEC;
use skymatch_core::{chord_to_arcsec, SkyTree};

/// Closest reference row for one target row
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Nearest {
    pub reference_row: usize,
    pub separation_arcsec: f64,
}

/// Per-target-row nearest neighbours and the radius they are judged against
#[derive(Clone, Debug)]
pub struct MatchResult {
    pub nearest: Vec<Option<Nearest>>,
    pub radius_arcsec: f64,
}

impl MatchResult {
    /// Reference row accepted for `target_row`, if within the radius
    pub fn matched(&self, target_row: usize) -> Option<usize> {
        self.nearest[target_row]
            .filter(|n| n.separation_arcsec < self.radius_arcsec)
            .map(|n| n.reference_row)
    }

    /// `(target_row, reference_row)` for every accepted match
    pub fn matches(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.nearest.len()).filter_map(|row| self.matched(row).map(|r| (row, r)))
    }

    pub fn matched_count(&self) -> usize {
        self.matches().count()
    }

    pub fn len(&self) -> usize {
        self.nearest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nearest.is_empty()
    }
}

/// Great-circle nearest-neighbour matcher with a fixed acceptance radius
#[derive(Clone, Copy, Debug)]
pub struct SpatialMatcher {
    radius_arcsec: f64,
}

impl Default for SpatialMatcher {
    fn default() -> Self {
        Self {
            radius_arcsec: DEFAULT_MATCH_RADIUS_ARCSEC,
        }
    }
}

impl SpatialMatcher {
    pub fn new(radius_arcsec: f64) -> CatalogResult<Self> {
        if !radius_arcsec.is_finite() || radius_arcsec <= 0.0 {
            return Err(CatalogError::InvalidConfig(format!(
                "match radius must be a positive number of arcseconds, got {}",
                radius_arcsec
            )));
        }
        Ok(Self { radius_arcsec })
    }

    pub fn radius_arcsec(&self) -> f64 {
        self.radius_arcsec
    }

    /// For every target row find the closest reference row on the sky.
    ///
    /// A target row is matched iff its separation is strictly below the
    /// radius. Equidistant reference rows resolve to the lowest row index.
    pub fn match_catalogs(&self, reference: &Catalog, target: &Catalog) -> CatalogResult<MatchResult> {
        let reference_points: Vec<_> = reference
            .positions()?
            .iter()
            .map(|p| p.to_unit_vector())
            .collect();
        let target_positions = target.positions()?;

        let tree = SkyTree::build(&reference_points);

        let nearest = target_positions
            .iter()
            .map(|p| {
                tree.nearest(&p.to_unit_vector()).map(|(reference_row, chord)| Nearest {
                    reference_row,
                    separation_arcsec: chord_to_arcsec(chord),
                })
            })
            .collect();

        Ok(MatchResult {
            nearest,
            radius_arcsec: self.radius_arcsec,
        })
    }
}
