//! Point-in-Polygon (PIP) building classification.
//!
//! Building footprints are indexed by envelope in an R-tree, then tested
//! exactly with even-odd ray casting in declared order.

mod classifier;
pub mod geometry;
mod index;

pub use classifier::PolygonClassifier;
pub use index::EnvelopeIndex;
