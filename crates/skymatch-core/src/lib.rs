pub mod constants;
pub mod coordinates;
pub mod spatial;

pub use coordinates::{chord_to_arcsec, SkyPosition};
pub use spatial::SkyTree;
