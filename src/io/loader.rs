// src/io/loader.rs

use crate::math::{
    error::MathError,
    types::{Crs, PointSet, Region},
};
use geo::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid geometry: {message}")]
    InvalidGeometry { message: String },
}

impl From<MathError> for LoadError {
    fn from(err: MathError) -> Self {
        LoadError::InvalidGeometry {
            message: err.to_string(),
        }
    }
}

/// Grenzpolygon auf der Platte: jede Teilfläche ist eine Liste von Ringen,
/// zuerst der äußere Ring, danach die Löcher.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundaryDataset {
    pub crs: Crs,
    pub parts: Vec<Vec<Vec<[f64; 2]>>>,
}

impl BoundaryDataset {
    /// Baut die Region; Teilflächen werden vereinigt.
    pub fn into_region(self) -> Result<Region, LoadError> {
        if self.parts.is_empty() {
            return Err(LoadError::InvalidGeometry {
                message: "Boundary has no parts".to_string(),
            });
        }
        let polygons = self
            .parts
            .into_iter()
            .enumerate()
            .map(|(idx, rings)| build_polygon(idx, rings))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Region::from_parts(self.crs, polygons)?)
    }
}

fn build_polygon(idx: usize, rings: Vec<Vec<[f64; 2]>>) -> Result<Polygon<f64>, LoadError> {
    let mut rings = rings.into_iter().enumerate().map(|(ring_idx, ring)| {
        build_ring(ring).ok_or_else(|| LoadError::InvalidGeometry {
            message: format!(
                "Ring #{} of part #{} needs at least 3 distinct finite vertices",
                ring_idx, idx
            ),
        })
    });
    let exterior = rings.next().ok_or_else(|| LoadError::InvalidGeometry {
        message: format!("Part #{} has no exterior ring", idx),
    })??;
    let interiors = rings.collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Ring aus Koordinatenpaaren; `Polygon::new` schließt ihn.
fn build_ring(ring: Vec<[f64; 2]>) -> Option<LineString<f64>> {
    if ring.iter().any(|[x, y]| !x.is_finite() || !y.is_finite()) {
        return None;
    }
    let mut coords: Vec<Coord<f64>> = ring.into_iter().map(|[x, y]| Coord { x, y }).collect();
    coords.dedup();
    if coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
    if coords.len() < 3 {
        return None;
    }
    Some(LineString::from(coords))
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Punktdatensatz aus einem JSON-String.
pub fn parse_points(json: &str) -> Result<PointSet, LoadError> {
    let points: PointSet = serde_json::from_str(json)?;
    if let Some(index) = points.iter().position(|p| !p.is_finite()) {
        warn!("Point #{} has non-finite coordinates", index);
    }
    Ok(points)
}

/// Grenzpolygon aus einem JSON-String.
pub fn parse_boundary(json: &str) -> Result<Region, LoadError> {
    let dataset: BoundaryDataset = serde_json::from_str(json)?;
    dataset.into_region()
}

pub fn load_points(path: impl AsRef<Path>) -> Result<PointSet, LoadError> {
    let path = path.as_ref();
    let points = parse_points(&read(path)?)?;
    info!(
        "Loaded {} points ({}) from {}",
        points.len(),
        points.crs,
        path.display()
    );
    Ok(points)
}

pub fn load_boundary(path: impl AsRef<Path>) -> Result<Region, LoadError> {
    let path = path.as_ref();
    let region = parse_boundary(&read(path)?)?;
    info!(
        "Loaded boundary ({}, {} polygon(s), {:.1} km²) from {}",
        region.crs,
        region.shape().0.len(),
        region.area_km2(),
        path.display()
    );
    Ok(region)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const POINTS: &str = r#"{
        "crs": "EPSG:3035",
        "points": [
            { "x": 100.0, "y": 200.0, "attributes": { "pm10": 21.5 } },
            { "x": 300.0, "y": 50.0 }
        ]
    }"#;

    #[test]
    fn test_parse_points() {
        let points = parse_points(POINTS).unwrap();
        assert_eq!(points.crs, Crs::new("EPSG:3035"));
        assert_eq!(points.len(), 2);
        assert_eq!(points.points[0].attribute("pm10"), Some(21.5));
        assert!(points.points[1].attributes.is_empty());
    }

    #[test]
    fn test_parse_boundary_with_hole() {
        let json = r#"{
            "crs": "EPSG:3035",
            "parts": [
                [
                    [[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]],
                    [[4, 4], [6, 4], [6, 6], [4, 6]]
                ]
            ]
        }"#;
        let region = parse_boundary(json).unwrap();
        assert_relative_eq!(region.area_m2(), 96.0, max_relative = 1e-6);
    }

    #[test]
    fn test_parts_are_unioned() {
        let json = r#"{
            "crs": "EPSG:3035",
            "parts": [
                [[[0, 0], [2, 0], [2, 2], [0, 2]]],
                [[[1, 0], [3, 0], [3, 2], [1, 2]]]
            ]
        }"#;
        let region = parse_boundary(json).unwrap();
        assert_eq!(region.shape().0.len(), 1);
        assert_relative_eq!(region.area_m2(), 6.0, max_relative = 1e-6);
    }

    #[test]
    fn test_rejects_bad_ring() {
        let json = r#"{ "crs": "EPSG:3035", "parts": [ [ [[0, 0], [1, 1], [0, 0]] ] ] }"#;
        assert!(matches!(
            parse_boundary(json),
            Err(LoadError::InvalidGeometry { .. })
        ));
        let empty = r#"{ "crs": "EPSG:3035", "parts": [] }"#;
        assert!(matches!(
            parse_boundary(empty),
            Err(LoadError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn test_json_and_io_errors() {
        assert!(matches!(parse_points("{ not json"), Err(LoadError::Json(_))));
        assert!(matches!(
            load_points("/nonexistent/points.json"),
            Err(LoadError::Io { .. })
        ));
    }
}
