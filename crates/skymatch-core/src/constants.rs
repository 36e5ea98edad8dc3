/// Arcseconds in one degree
pub const ARCSEC_PER_DEGREE: f64 = 3600.0;

/// Default acceptance radius for a cross-catalog match, in arcseconds
pub const DEFAULT_MATCH_RADIUS_ARCSEC: f64 = 2.0;

/// Valid declination range in degrees
pub const DEC_LIMIT_DEG: f64 = 90.0;
