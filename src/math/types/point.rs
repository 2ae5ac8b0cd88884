// src/math/types/point.rs
use super::*;
use serde::{Deserialize, Serialize};
use spade::Point2;
use std::collections::BTreeMap;
use std::fmt;

/// Kennung eines projizierten Koordinatensystems (z.B. "EPSG:3035").
/// Es wird nur auf Gleichheit geprüft, nicht umprojiziert.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Crs(pub String);

impl Crs {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ein Messpunkt (Station, Ortungsfix) mit optionalen skalaren Attributen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SitePoint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub attributes: BTreeMap<String, f64>,
}

impl SitePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: f64) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<f64> {
        self.attributes.get(name).copied()
    }

    pub fn coord(&self) -> Point2D {
        Point2D {
            x: self.x,
            y: self.y,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<&SitePoint> for Point2<f64> {
    fn from(p: &SitePoint) -> Self {
        Point2::new(p.x, p.y)
    }
}

impl From<Point2D> for SitePoint {
    fn from(c: Point2D) -> Self {
        SitePoint::new(c.x, c.y)
    }
}

/// Geordnete Punktmenge in einem gemeinsamen Koordinatensystem.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointSet {
    pub crs: Crs,
    pub points: Vec<SitePoint>,
}

impl PointSet {
    pub fn new(crs: Crs, points: Vec<SitePoint>) -> Self {
        Self { crs, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SitePoint> {
        self.points.iter()
    }

    pub fn bounds(&self) -> Option<Bounds2D> {
        Bounds2D::from_points_iter(self.points.iter().map(SitePoint::coord))
    }

    /// Werte eines Attributs in Punktreihenfolge.
    pub fn attribute_values(&self, name: &str) -> MathResult<Vec<f64>> {
        self.points
            .iter()
            .enumerate()
            .map(|(index, p)| {
                p.attribute(name).ok_or_else(|| MathError::MissingAttribute {
                    index,
                    attribute: name.to_string(),
                })
            })
            .collect()
    }

    /// Prüft, ob beide Eingaben im selben Koordinatensystem liegen.
    pub fn ensure_crs(&self, other: &Crs, input: &str) -> MathResult<()> {
        if &self.crs != other {
            return Err(MathError::CoordinateSystemMismatch {
                expected: self.crs.to_string(),
                found: other.to_string(),
                input: input.to_string(),
            });
        }
        Ok(())
    }
}
