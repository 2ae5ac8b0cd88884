// src/io/mod.rs

// Laden der JSON-Datensätze (Punkte, Grenzpolygon)
pub mod loader;

pub use self::loader::{
    BoundaryDataset, LoadError, load_boundary, load_points, parse_boundary, parse_points,
};
