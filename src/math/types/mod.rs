// src/math/types/mod.rs
pub mod bounds;
pub mod point;
pub mod region;

pub use bounds::*;
pub use point::*;
pub use region::*;

pub(crate) use crate::math::error::{MathError, MathResult};

// Re-export häufig verwendete externe Typen
pub use geo::{Coord, MultiPolygon, Polygon};
pub use spade::Point2;

// Einheitliche Typen für das gesamte Modul
pub type Point2D = Coord<f64>;
pub type SpadePoint = Point2<f64>;
