// src/math/surface/idw.rs

use super::grid::SurfaceGrid;
use crate::math::{error::*, types::*, utils::constants};
use tracing::info;

/// Inverse-Distanz-Gewichtung eines Punktattributs.
#[derive(Debug, Clone, PartialEq)]
pub struct IdwInterpolator {
    /// Exponent der Distanzgewichtung.
    pub power: f64,
    /// Nur Stützstellen innerhalb dieses Radius zählen; `None` = alle.
    pub search_radius: Option<f64>,
}

impl Default for IdwInterpolator {
    fn default() -> Self {
        Self {
            power: 2.0,
            search_radius: None,
        }
    }
}

impl IdwInterpolator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_power(mut self, power: f64) -> Self {
        self.power = power;
        self
    }

    pub fn with_search_radius(mut self, radius: f64) -> Self {
        self.search_radius = Some(radius);
        self
    }

    pub fn validate(&self) -> MathResult<()> {
        if !self.power.is_finite() || self.power <= 0.0 {
            return Err(MathError::InvalidConfiguration {
                message: format!("IDW power must be positive, got {}", self.power),
            });
        }
        if let Some(radius) = self.search_radius {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(MathError::InvalidConfiguration {
                    message: format!("IDW search radius must be positive, got {}", radius),
                });
            }
        }
        Ok(())
    }

    /// Interpolierter Wert an `query`. Liegt eine Stützstelle genau dort, wird ihr Wert geliefert.
    pub fn interpolate_at(&self, samples: &[(Point2D, f64)], query: Point2D) -> Option<f64> {
        let radius_sq = self.search_radius.map(|r| r * r);
        let mut weight_sum = 0.0;
        let mut value_sum = 0.0;

        for &(position, value) in samples {
            let d = position - query;
            let dist_sq = d.x * d.x + d.y * d.y;
            if dist_sq <= constants::EPSILON_SQUARED {
                return Some(value);
            }
            if radius_sq.is_some_and(|r| dist_sq > r) {
                continue;
            }
            let weight = dist_sq.powf(-0.5 * self.power);
            weight_sum += weight;
            value_sum += weight * value;
        }

        if weight_sum > 0.0 {
            Some(value_sum / weight_sum)
        } else {
            None
        }
    }

    /// Rasterfläche des Attributs `attribute` über `boundary`.
    pub fn surface(
        &self,
        points: &PointSet,
        attribute: &str,
        boundary: &Region,
        cell_size: f64,
    ) -> MathResult<SurfaceGrid> {
        self.validate()?;
        if points.is_empty() {
            return Err(MathError::InsufficientPoints {
                expected: 1,
                actual: 0,
            });
        }
        points.ensure_crs(&boundary.crs, "boundary")?;

        let values = points.attribute_values(attribute)?;
        let samples: Vec<(Point2D, f64)> = points
            .iter()
            .map(SitePoint::coord)
            .zip(values)
            .collect();

        let grid = SurfaceGrid::evaluate(boundary, cell_size, |center| {
            self.interpolate_at(&samples, center)
        })?;
        info!(
            "IdwInterpolator: '{}' from {} samples (power {})",
            attribute,
            samples.len(),
            self.power
        );
        Ok(grid)
    }
}
