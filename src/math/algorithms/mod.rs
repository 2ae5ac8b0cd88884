// src/math/algorithms/mod.rs
pub mod clipping;
pub mod sampling;

pub use clipping::{HalfPlane, HalfPlaneClipper};
pub use sampling::PointSampler;
