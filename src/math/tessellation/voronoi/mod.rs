// src/math/tessellation/voronoi/mod.rs

// Deklaration der Untermodule für Voronoi-spezifische Funktionalität
pub mod builder;
pub mod config;
pub mod metric;
pub mod voronoi_diagram; // Enthält VoronoiCell und VoronoiExtractor

// Re-Exporte für den einfachen Zugriff auf die wichtigsten Voronoi-Elemente
pub use self::builder::VoronoiDensityEngine;
pub use self::config::{DuplicatePolicy, EngineConfig, MetricMode};
pub use self::metric::{CellMetric, DensityMap, Metric};
pub use self::voronoi_diagram::{VoronoiCell, VoronoiExtractor};
