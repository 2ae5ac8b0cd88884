// src/math/types/region.rs

use super::*;
use crate::math::utils::{area, comparison};
use geo::{Area, BooleanOps, BoundingRect, Contains, MultiPolygon, Point, Polygon};
use tracing::debug;

/// Geschlossene, ggf. mehrteilige Fläche (Landesgrenze oder Tessellations-Hülle).
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub crs: Crs,
    shape: MultiPolygon<f64>,
}

impl Region {
    /// Übernimmt eine bereits vereinigte Geometrie.
    pub fn new(crs: Crs, shape: MultiPolygon<f64>) -> MathResult<Self> {
        for (idx, polygon) in shape.0.iter().enumerate() {
            validate_part(idx, polygon)?;
        }
        if shape.unsigned_area() <= 0.0 {
            return Err(MathError::GeometricFailure {
                operation: "Region has zero area".to_string(),
            });
        }
        Ok(Self { crs, shape })
    }

    /// Vereinigt die Teilflächen zu einer Region.
    pub fn from_parts(crs: Crs, parts: Vec<Polygon<f64>>) -> MathResult<Self> {
        if parts.is_empty() {
            return Err(MathError::InvalidConfiguration {
                message: "Region needs at least one polygon part".to_string(),
            });
        }
        for (idx, polygon) in parts.iter().enumerate() {
            validate_part(idx, polygon)?;
        }

        let part_count = parts.len();
        let mut iter = parts.into_iter();
        let first = MultiPolygon::new(iter.next().into_iter().collect());
        let shape = iter.fold(first, |acc, part| acc.union(&part));
        debug!(
            "Region: unioned {} part(s) into {} polygon(s)",
            part_count,
            shape.0.len()
        );
        Self::new(crs, shape)
    }

    /// Achsenparalleles Rechteck als Region.
    pub fn rectangle(crs: Crs, bounds: Bounds2D) -> MathResult<Self> {
        if !bounds.is_valid() || bounds.area() <= 0.0 {
            return Err(MathError::InvalidConfiguration {
                message: format!("Rectangle region needs a non-degenerate box, got {}", bounds),
            });
        }
        Self::new(crs, MultiPolygon::new(vec![bounds.to_polygon()]))
    }

    pub fn shape(&self) -> &MultiPolygon<f64> {
        &self.shape
    }

    pub fn area_m2(&self) -> f64 {
        self.shape.unsigned_area()
    }

    pub fn area_km2(&self) -> f64 {
        area::m2_to_km2(self.area_m2())
    }

    pub fn bounds(&self) -> Bounds2D {
        self.shape
            .bounding_rect()
            .map(Bounds2D::from)
            .unwrap_or_else(Bounds2D::empty)
    }

    pub fn contains(&self, point: Point2D) -> bool {
        self.shape.contains(&Point::from(point))
    }

    /// Ob die Region exakt ihre eigene Bounding Box ist.
    pub fn is_axis_aligned_rectangle(&self) -> bool {
        self.shape.0.len() == 1
            && self.shape.0[0].interiors().is_empty()
            && comparison::nearly_equal_eps(
                self.area_m2(),
                self.bounds().area(),
                self.bounds().area() * 1e-12,
            )
    }

    /// Rechteckige Hülle um die Region, um `padding_factor` der längeren Seite erweitert.
    pub fn bounding_envelope(&self, padding_factor: f64) -> MathResult<Region> {
        if !padding_factor.is_finite() || padding_factor < 0.0 {
            return Err(MathError::InvalidConfiguration {
                message: format!("Envelope padding must be >= 0, got {}", padding_factor),
            });
        }
        let bounds = self.bounds();
        let margin = bounds.width().max(bounds.height()) * padding_factor;
        Region::rectangle(self.crs.clone(), bounds.expand(margin))
    }
}

fn validate_part(idx: usize, polygon: &Polygon<f64>) -> MathResult<()> {
    let exterior = polygon.exterior();
    // Geschlossener Ring: erster == letzter Punkt, daher mindestens 4 Koordinaten.
    if exterior.0.len() < 4 {
        return Err(MathError::GeometricFailure {
            operation: format!(
                "Polygon part #{} has only {} ring coordinates",
                idx,
                exterior.0.len()
            ),
        });
    }
    let all_finite = std::iter::once(exterior)
        .chain(polygon.interiors())
        .flat_map(|ring| ring.coords())
        .all(|c| c.x.is_finite() && c.y.is_finite());
    if !all_finite {
        return Err(MathError::GeometricFailure {
            operation: format!("Polygon part #{} has non-finite coordinates", idx),
        });
    }
    Ok(())
}
