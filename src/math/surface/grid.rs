// src/math/surface/grid.rs

use crate::math::{error::*, types::*};
use geo::coord;
use tracing::debug;

/// Obergrenze für die Anzahl der Rasterzellen.
pub const MAX_GRID_CELLS: usize = 4_000_000;

/// Regelmäßiges Raster über der Bounding Box einer Region.
/// Zellen, deren Mittelpunkt außerhalb der Region liegt, sind maskiert (`None`).
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceGrid {
    /// Linke untere Ecke des Rasters.
    pub origin: Point2D,
    pub cell_size: f64,
    pub cols: usize,
    pub rows: usize,
    /// Zeilenweise, beginnend unten links.
    pub values: Vec<Option<f64>>,
}

impl SurfaceGrid {
    /// Wertet `f` an allen Zellmittelpunkten innerhalb von `region` aus.
    pub fn evaluate<F>(region: &Region, cell_size: f64, mut f: F) -> MathResult<Self>
    where
        F: FnMut(Point2D) -> Option<f64>,
    {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(MathError::InvalidConfiguration {
                message: format!("Grid cell size must be positive, got {}", cell_size),
            });
        }
        let bounds = region.bounds();
        let cols = (bounds.width() / cell_size).ceil().max(1.0) as usize;
        let rows = (bounds.height() / cell_size).ceil().max(1.0) as usize;
        if cols.saturating_mul(rows) > MAX_GRID_CELLS {
            return Err(MathError::InvalidConfiguration {
                message: format!(
                    "Grid of {}x{} cells exceeds the limit of {} cells; increase the cell size",
                    cols, rows, MAX_GRID_CELLS
                ),
            });
        }

        let mut grid = Self {
            origin: bounds.min,
            cell_size,
            cols,
            rows,
            values: Vec::with_capacity(cols * rows),
        };
        let mut masked = 0usize;
        for row in 0..rows {
            for col in 0..cols {
                let center = grid.cell_center(col, row);
                if region.contains(center) {
                    grid.values.push(f(center));
                } else {
                    masked += 1;
                    grid.values.push(None);
                }
            }
        }
        debug!(
            "SurfaceGrid: {}x{} cells of {} m, {} masked",
            cols, rows, cell_size, masked
        );
        Ok(grid)
    }

    pub fn cell_center(&self, col: usize, row: usize) -> Point2D {
        coord! {
            x: self.origin.x + (col as f64 + 0.5) * self.cell_size,
            y: self.origin.y + (row as f64 + 0.5) * self.cell_size,
        }
    }

    pub fn get(&self, col: usize, row: usize) -> Option<f64> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.values[row * self.cols + col]
    }

    /// Minimum und Maximum der definierten Werte.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Iterator über (Spalte, Zeile, Wert) aller definierten Zellen.
    pub fn defined_cells(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.values.iter().enumerate().filter_map(move |(i, v)| {
            v.map(|value| (i % self.cols, i / self.cols, value))
        })
    }

    pub fn cell_area(&self) -> f64 {
        self.cell_size * self.cell_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{MultiPolygon, polygon};

    fn triangle() -> Region {
        Region::new(
            Crs::new("EPSG:3035"),
            MultiPolygon::new(vec![polygon![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 0.0, y: 10.0)]]),
        )
        .unwrap()
    }

    #[test]
    fn test_grid_masks_outside_cells() {
        let grid = SurfaceGrid::evaluate(&triangle(), 1.0, |_| Some(1.0)).unwrap();
        assert_eq!((grid.cols, grid.rows), (10, 10));
        assert_eq!(grid.get(0, 0), Some(1.0));
        assert_eq!(grid.get(9, 9), None);
        // Zellmittelpunkte mit x + y < 10 liegen im Dreieck.
        assert_eq!(grid.defined_cells().count(), 45);
    }

    #[test]
    fn test_cell_center() {
        let grid = SurfaceGrid::evaluate(&triangle(), 2.0, |c| Some(c.x)).unwrap();
        assert_eq!(grid.cell_center(1, 0), coord! { x: 3.0, y: 1.0 });
        assert_eq!(grid.get(1, 0), Some(3.0));
        assert_eq!(grid.get(50, 0), None);
    }

    #[test]
    fn test_invalid_cell_size() {
        assert!(SurfaceGrid::evaluate(&triangle(), 0.0, |_| None).is_err());
        assert!(SurfaceGrid::evaluate(&triangle(), 1e-6, |_| None).is_err());
    }
}
