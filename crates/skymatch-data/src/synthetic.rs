//! Synthetic multi-exposure fields for testing (deterministic)

use crate::catalog::{Catalog, Column, DEC_COLUMN, RA_COLUMN};
use crate::error::CatalogResult;
use crate::io::write_catalog;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use skymatch_core::constants::ARCSEC_PER_DEGREE;
use skymatch_core::SkyPosition;
use std::path::{Path, PathBuf};

/// Star field observed repeatedly with positional jitter and dropouts
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyntheticField {
    pub stars: usize,
    pub exposures: usize,
    pub center: SkyPosition,
    /// Side of the square field in degrees
    pub field_size_deg: f64,
    /// Max per-axis position error per exposure (arcsec)
    pub jitter_arcsec: f64,
    /// Probability a star is missing from an exposure
    pub dropout: f64,
    pub seed: u64,
}

impl Default for SyntheticField {
    fn default() -> Self {
        Self {
            stars: 200,
            exposures: 4,
            center: SkyPosition::new(298.4438, 18.7792), // M71
            field_size_deg: 0.2,
            jitter_arcsec: 0.3,
            dropout: 0.05,
            seed: 42,
        }
    }
}

struct Star {
    id: i64,
    pos: SkyPosition,
    flux: f64,
}

impl SyntheticField {
    /// One catalog per exposure, named `<prefix>-<NNN>-<filter>.csv`.
    ///
    /// Columns: `RA`, `Dec`, `Flux`, `Mag`, and `StarId` (ground-truth index).
    pub fn generate(&self, prefix: &str, filter: &str) -> CatalogResult<Vec<Catalog>> {
        let band_seed = filter
            .bytes()
            .fold(self.seed, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut rng = band_seed;
        let mut rand = move || {
            rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (rng >> 33) as f64 / (1u64 << 31) as f64
        };

        let cos_dec = self.center.dec.to_radians().cos().max(1e-6);
        let stars: Vec<Star> = (0..self.stars)
            .map(|i| {
                let ra = self.center.ra + (rand() - 0.5) * self.field_size_deg / cos_dec;
                let dec = self.center.dec + (rand() - 0.5) * self.field_size_deg;
                // Log-uniform flux: 1e2 to 1e5
                let flux = 10.0_f64.powf(2.0 + rand() * 3.0);
                Star {
                    id: i as i64 + 1,
                    pos: SkyPosition::new(ra, dec),
                    flux,
                }
            })
            .collect();

        let jitter_deg = self.jitter_arcsec / ARCSEC_PER_DEGREE;

        (0..self.exposures)
            .map(|e| {
                let mut ra = Vec::new();
                let mut dec = Vec::new();
                let mut flux = Vec::new();
                let mut mag = Vec::new();
                let mut ids = Vec::new();

                for star in &stars {
                    if rand() < self.dropout {
                        continue;
                    }
                    let measured = star.flux * (1.0 + 0.02 * (rand() * 2.0 - 1.0));
                    ra.push(star.pos.ra + jitter_deg * (rand() * 2.0 - 1.0) / cos_dec);
                    dec.push(star.pos.dec + jitter_deg * (rand() * 2.0 - 1.0));
                    mag.push(25.0 - 2.5 * measured.log10());
                    flux.push(measured);
                    ids.push(star.id);
                }

                let name = format!("{}-{:03}-{}.csv", prefix, e + 1, filter);
                Catalog::from_columns(
                    name,
                    vec![
                        (RA_COLUMN.to_string(), Column::Float(ra)),
                        (DEC_COLUMN.to_string(), Column::Float(dec)),
                        ("Flux".to_string(), Column::Float(flux)),
                        ("Mag".to_string(), Column::Float(mag)),
                        ("StarId".to_string(), Column::Integer(ids)),
                    ],
                )
            })
            .collect()
    }

    /// Generate and write every exposure of every filter into `dir`
    pub fn write(&self, dir: &Path, prefix: &str, filters: &[String]) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        let mut written = Vec::new();
        for filter in filters {
            for catalog in self.generate(prefix, filter)? {
                let path = dir.join(catalog.source_file());
                write_catalog(&catalog, &path)
                    .with_context(|| format!("Failed to write catalog: {}", path.display()))?;
                written.push(path);
            }
        }

        tracing::info!("Wrote {} synthetic catalogs to {:?}", written.len(), dir);
        Ok(written)
    }
}
