// src/math/tessellation/voronoi/voronoi_diagram.rs

use crate::math::{
    algorithms::clipping::{HalfPlane, HalfPlaneClipper},
    error::{MathError, MathResult},
    types::{Bounds2D, Point2D, Region, SpadePoint},
};
use geo::{Area, BooleanOps, LineString, MultiPolygon, Polygon};
use spade::{DelaunayTriangulation, Triangulation};
use tracing::{debug, trace};

/// Repräsentiert eine einzelne Zelle in einem Voronoi-Diagramm.
#[derive(Debug, Clone, PartialEq)]
pub struct VoronoiCell {
    /// Index des Generatorpunktes in der ursprünglichen Eingabeliste
    pub site_index: usize,
    /// Der Generatorpunkt (Site), der diese Zelle definiert.
    pub generator: Point2D,
    /// Die Zelle innerhalb der Hülle (noch nicht gegen die Grenze geclippt).
    pub geometry: MultiPolygon<f64>,
    /// Gibt an, ob die Zelle durch die Bounding Box der Hülle beschnitten wurde.
    pub is_boundary_cell: bool,
    /// Eingabe-Indizes der Delaunay-Nachbarn
    pub neighbor_ids: Vec<usize>,
}

impl VoronoiCell {
    /// Fläche der Zelle in Einheiten des Koordinatensystems (m²).
    pub fn area(&self) -> f64 {
        self.geometry.unsigned_area()
    }

    pub fn is_empty(&self) -> bool {
        self.geometry.0.is_empty()
    }
}

/// Extrahiert Voronoi-Zellen aus einer Delaunay-Triangulation.
pub struct VoronoiExtractor;

impl VoronoiExtractor {
    /// Extrahiert alle Voronoi-Zellen aus der gegebenen Delaunay-Triangulation.
    /// `triangulation`: Delaunay-Triangulation, Vertex-Reihenfolge wie `site_indices`.
    /// `site_indices`: Vertex-Index -> Index in der Eingabeliste.
    /// `envelope`: Hülle, auf die die Zellen beschränkt werden.
    ///
    /// Jede Zelle entsteht aus der Bounding Box der Hülle, geschnitten mit den
    /// Halbebenen der Mittelsenkrechten zu allen Delaunay-Nachbarn.
    pub fn extract_cells(
        triangulation: &DelaunayTriangulation<SpadePoint>,
        site_indices: &[usize],
        envelope: &Region,
    ) -> MathResult<Vec<VoronoiCell>> {
        if triangulation.num_vertices() != site_indices.len() {
            return Err(MathError::TriangulationFailed {
                reason: format!(
                    "Triangulation has {} vertices but {} sites were given",
                    triangulation.num_vertices(),
                    site_indices.len()
                ),
            });
        }

        let bounds = envelope.bounds();
        if !bounds.is_valid() {
            return Err(MathError::GeometricFailure {
                operation: format!("Envelope has invalid bounds {}", bounds),
            });
        }
        let envelope_is_box = envelope.is_axis_aligned_rectangle();
        let box_ring = bounds.corners().to_vec();
        // Toleranz relativ zur Größe der Hülle
        let clipper = HalfPlaneClipper::new().with_tolerance(bounds.diagonal().max(1.0) * 1e-12);

        let mut voronoi_cells = Vec::with_capacity(triangulation.num_vertices());

        for vertex_handle in triangulation.vertices() {
            let vertex_index = vertex_handle.fix().index();
            let generator_spade = vertex_handle.position();
            let generator = Point2D {
                x: generator_spade.x,
                y: generator_spade.y,
            };

            let mut neighbor_ids = Vec::new();
            let mut half_planes = Vec::new();
            for connected_edge in vertex_handle.out_edges() {
                let neighbor = connected_edge.to();
                let neighbor_pos = neighbor.position();
                half_planes.push(HalfPlane::closer_to(
                    generator,
                    Point2D {
                        x: neighbor_pos.x,
                        y: neighbor_pos.y,
                    },
                ));
                neighbor_ids.push(site_indices[neighbor.fix().index()]);
            }
            neighbor_ids.sort_unstable();
            neighbor_ids.dedup();

            let ring = clipper.clip_all(&box_ring, half_planes.iter());
            let is_boundary_cell = touches_bounds(&ring, &bounds);

            let geometry = if ring.len() < 3 {
                trace!(
                    "VoronoiExtractor: cell of site #{} vanished inside the envelope box",
                    site_indices[vertex_index]
                );
                MultiPolygon::new(Vec::new())
            } else {
                let cell_polygon = Polygon::new(LineString::from(ring), Vec::new());
                if envelope_is_box {
                    MultiPolygon::new(vec![cell_polygon])
                } else {
                    cell_polygon.intersection(envelope.shape())
                }
            };

            voronoi_cells.push(VoronoiCell {
                site_index: site_indices[vertex_index],
                generator,
                geometry,
                is_boundary_cell,
                neighbor_ids,
            });
        }

        voronoi_cells.sort_by_key(|cell| cell.site_index);
        debug!(
            "VoronoiExtractor: extracted {} cells within {}",
            voronoi_cells.len(),
            bounds
        );
        Ok(voronoi_cells)
    }
}

fn touches_bounds(ring: &[Point2D], bounds: &Bounds2D) -> bool {
    let eps = bounds.diagonal().max(1.0) * 1e-12;
    ring.iter().any(|p| {
        (p.x - bounds.min.x).abs() <= eps
            || (p.x - bounds.max.x).abs() <= eps
            || (p.y - bounds.min.y).abs() <= eps
            || (p.y - bounds.max.y).abs() <= eps
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::types::Crs;
    use approx::assert_relative_eq;
    use spade::Point2;

    fn square_envelope(size: f64) -> Region {
        Region::rectangle(
            Crs::new("EPSG:3035"),
            Bounds2D::from_points(Point2D { x: 0.0, y: 0.0 }, Point2D { x: size, y: size }),
        )
        .unwrap()
    }

    fn triangulate(points: &[(f64, f64)]) -> DelaunayTriangulation<SpadePoint> {
        DelaunayTriangulation::bulk_load_stable(
            points.iter().map(|&(x, y)| Point2::new(x, y)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_two_sites_split_square() {
        let tri = triangulate(&[(1.0, 2.0), (3.0, 2.0)]);
        let cells = VoronoiExtractor::extract_cells(&tri, &[0, 1], &square_envelope(4.0)).unwrap();
        assert_eq!(cells.len(), 2);
        for cell in &cells {
            assert_relative_eq!(cell.area(), 8.0, epsilon = 1e-9);
            assert!(cell.is_boundary_cell);
        }
        assert_eq!(cells[0].neighbor_ids, vec![1]);
        assert_eq!(cells[1].neighbor_ids, vec![0]);
    }

    #[test]
    fn test_collinear_sites_form_strips() {
        let tri = triangulate(&[(0.5, 2.0), (1.5, 2.0), (2.5, 2.0), (3.5, 2.0)]);
        let cells =
            VoronoiExtractor::extract_cells(&tri, &[0, 1, 2, 3], &square_envelope(4.0)).unwrap();
        for cell in &cells {
            assert_relative_eq!(cell.area(), 4.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_cells_partition_envelope() {
        let points = [
            (0.3, 0.4),
            (2.9, 0.7),
            (1.7, 2.2),
            (3.6, 3.1),
            (0.8, 3.5),
            (2.2, 1.1),
        ];
        let tri = triangulate(&points);
        let indices: Vec<usize> = (0..points.len()).collect();
        let cells = VoronoiExtractor::extract_cells(&tri, &indices, &square_envelope(4.0)).unwrap();
        let total: f64 = cells.iter().map(VoronoiCell::area).sum();
        assert_relative_eq!(total, 16.0, epsilon = 1e-6);
        // Jeder Generator liegt in seiner eigenen Zelle.
        for (cell, &(x, y)) in cells.iter().zip(points.iter()) {
            assert_eq!(cell.generator, Point2D { x, y });
            assert!(geo::Contains::contains(&cell.geometry, &geo::Point::new(x, y)));
        }
    }

    #[test]
    fn test_site_indices_are_mapped() {
        let tri = triangulate(&[(1.0, 1.0), (3.0, 3.0)]);
        let cells = VoronoiExtractor::extract_cells(&tri, &[4, 9], &square_envelope(4.0)).unwrap();
        assert_eq!(cells[0].site_index, 4);
        assert_eq!(cells[1].site_index, 9);
        assert_eq!(cells[0].neighbor_ids, vec![9]);
    }

    #[test]
    fn test_site_count_mismatch_is_error() {
        let tri = triangulate(&[(1.0, 1.0), (3.0, 3.0)]);
        assert!(matches!(
            VoronoiExtractor::extract_cells(&tri, &[0], &square_envelope(4.0)),
            Err(MathError::TriangulationFailed { .. })
        ));
    }
}
