// src/math/surface/kde.rs

use super::grid::SurfaceGrid;
use crate::math::{
    error::*,
    types::*,
    utils::constants::{M2_PER_KM2, TAU},
};
use tracing::info;

/// Kernel jenseits dieser Anzahl Bandbreiten wird ignoriert.
const KERNEL_CUTOFF: f64 = 5.0;

/// Bandbreitenwahl für die Kerndichteschätzung.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bandwidth {
    /// Scott-Regel pro Achse: `σ · n^(-1/6)`.
    Scott,
    /// Feste Bandbreite in Metern für beide Achsen.
    Fixed(f64),
}

/// Gaußsche Kerndichteschätzung mit achsenweisem Produktkern.
/// Ergebnis ist eine Intensität in Punkten pro km².
#[derive(Debug, Clone, PartialEq)]
pub struct KernelDensity {
    pub bandwidth: Bandwidth,
}

impl Default for KernelDensity {
    fn default() -> Self {
        Self {
            bandwidth: Bandwidth::Scott,
        }
    }
}

impl KernelDensity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bandwidth(mut self, bandwidth: Bandwidth) -> Self {
        self.bandwidth = bandwidth;
        self
    }

    /// Bandbreiten (x, y) in Metern für die gegebene Punktmenge.
    pub fn bandwidths(&self, points: &PointSet) -> MathResult<(f64, f64)> {
        match self.bandwidth {
            Bandwidth::Fixed(h) => {
                if !h.is_finite() || h <= 0.0 {
                    return Err(MathError::InvalidConfiguration {
                        message: format!("KDE bandwidth must be positive, got {}", h),
                    });
                }
                Ok((h, h))
            }
            Bandwidth::Scott => {
                let n = points.len();
                if n < 2 {
                    return Err(MathError::InsufficientPoints {
                        expected: 2,
                        actual: n,
                    });
                }
                let factor = (n as f64).powf(-1.0 / 6.0);
                let hx = sample_std(points.iter().map(|p| p.x)) * factor;
                let hy = sample_std(points.iter().map(|p| p.y)) * factor;
                if !(hx > 0.0 && hy > 0.0) {
                    return Err(MathError::InvalidConfiguration {
                        message: "Scott bandwidth is zero because the points have no spread along one axis; use a fixed bandwidth".to_string(),
                    });
                }
                Ok((hx, hy))
            }
        }
    }

    /// Intensität an `query` in Punkten pro m².
    pub fn intensity_at(points: &[Point2D], (hx, hy): (f64, f64), query: Point2D) -> f64 {
        let norm = 1.0 / (TAU * hx * hy);
        points
            .iter()
            .filter_map(|p| {
                let u = (p.x - query.x) / hx;
                let v = (p.y - query.y) / hy;
                if u.abs() > KERNEL_CUTOFF || v.abs() > KERNEL_CUTOFF {
                    None
                } else {
                    Some(norm * (-0.5 * (u * u + v * v)).exp())
                }
            })
            .sum()
    }

    /// Rasterfläche der Intensität (Punkte pro km²) über `boundary`.
    pub fn surface(
        &self,
        points: &PointSet,
        boundary: &Region,
        cell_size: f64,
    ) -> MathResult<SurfaceGrid> {
        if points.is_empty() {
            return Err(MathError::InsufficientPoints {
                expected: 1,
                actual: 0,
            });
        }
        points.ensure_crs(&boundary.crs, "boundary")?;
        let bandwidths = self.bandwidths(points)?;
        let coords: Vec<Point2D> = points.iter().map(SitePoint::coord).collect();

        let grid = SurfaceGrid::evaluate(boundary, cell_size, |center| {
            Some(Self::intensity_at(&coords, bandwidths, center) * M2_PER_KM2)
        })?;
        info!(
            "KernelDensity: {} points, bandwidth ({:.1} m, {:.1} m)",
            coords.len(),
            bandwidths.0,
            bandwidths.1
        );
        Ok(grid)
    }
}

/// Stichproben-Standardabweichung (Nenner n - 1).
fn sample_std<I: Iterator<Item = f64> + Clone>(values: I) -> f64 {
    let n = values.clone().count();
    if n < 2 {
        return 0.0;
    }
    let mean = values.clone().sum::<f64>() / n as f64;
    let var = values.map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    var.sqrt()
}
