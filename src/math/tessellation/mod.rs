// src/math/tessellation/mod.rs

pub mod voronoi;

pub use self::voronoi::{
    CellMetric, DensityMap, DuplicatePolicy, EngineConfig, Metric, MetricMode, VoronoiCell,
    VoronoiDensityEngine,
};
