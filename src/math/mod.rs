pub mod algorithms;
pub mod error;
pub mod surface;
pub mod tessellation;
pub mod types;
pub mod utils;

// Re-exports für einfache Verwendung
pub use error::{MathError, MathResult};
pub use types::*;

// Öffentliche API
pub mod prelude {
    pub use super::{
        algorithms::{HalfPlane, HalfPlaneClipper, PointSampler},
        error::{MathError, MathResult},
        surface::{Bandwidth, IdwInterpolator, KernelDensity, SurfaceGrid},
        tessellation::voronoi::{
            CellMetric, DensityMap, DuplicatePolicy, EngineConfig, Metric, MetricMode,
            VoronoiCell, VoronoiDensityEngine,
        },
        types::*,
    };
}
