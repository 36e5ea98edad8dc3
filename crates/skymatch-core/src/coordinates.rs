use crate::constants::{ARCSEC_PER_DEGREE, DEC_LIMIT_DEG};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Equatorial sky position (degrees)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkyPosition {
    /// Right ascension in degrees, any wrap
    pub ra: f64,
    /// Declination in degrees [-90, 90]
    pub dec: f64,
}

impl SkyPosition {
    pub fn new(ra: f64, dec: f64) -> Self {
        Self { ra, dec }
    }

    /// True if both angles are finite and Dec lies on the sphere
    pub fn is_valid(&self) -> bool {
        self.ra.is_finite() && self.dec.is_finite() && self.dec.abs() <= DEC_LIMIT_DEG
    }

    /// Point on the unit sphere (x towards RA=0, z towards the north pole)
    pub fn to_unit_vector(&self) -> Vector3<f64> {
        let ra = self.ra.to_radians();
        let dec = self.dec.to_radians();
        let cos_dec = dec.cos();
        Vector3::new(cos_dec * ra.cos(), cos_dec * ra.sin(), dec.sin())
    }
}

/// Angle subtended by a chord of the unit sphere, in arcseconds.
///
/// Computed as `2·asin(chord/2)`, which stays accurate at sub-arcsecond scales.
pub fn chord_to_arcsec(chord: f64) -> f64 {
    let half = (chord / 2.0).clamp(0.0, 1.0);
    (2.0 * half.asin()).to_degrees() * ARCSEC_PER_DEGREE
}
