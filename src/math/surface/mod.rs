// src/math/surface/mod.rs

// Kontinuierliche Flächen auf einem Raster: IDW und Kerndichte
pub mod grid;
pub mod idw;
pub mod kde;

pub use self::grid::SurfaceGrid;
pub use self::idw::IdwInterpolator;
pub use self::kde::{Bandwidth, KernelDensity};
