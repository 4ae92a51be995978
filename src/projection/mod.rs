//! GPS to floorplan pixel projection.

mod projector;

pub use projector::{Projection, ProjectionWarning, QuadProjector, DEGENERATE_RATIO};
