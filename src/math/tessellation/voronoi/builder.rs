// src/math/tessellation/voronoi/builder.rs

use crate::math::{
    error::{MathError, MathResult},
    tessellation::voronoi::{
        config::{DuplicatePolicy, EngineConfig, MetricMode},
        metric::{CellMetric, DensityMap, Metric},
        voronoi_diagram::{VoronoiCell, VoronoiExtractor},
    },
    types::{PointSet, Region, SpadePoint},
    utils::coordinate_key,
};
use geo::{Area, BooleanOps};
use spade::{DelaunayTriangulation, Point2, Triangulation};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Erzeugt Voronoi-basierte Dichte- bzw. Attributkarten.
/// Orchestriert die Schritte: Validierung, Duplikatprüfung, Delaunay-Triangulation,
/// Zellextraktion innerhalb der Hülle, Clipping an der Grenze und Kennzahlberechnung.
///
/// Reine Funktion ihrer Eingaben; gleiche Eingaben liefern identische Ergebnisse.
#[derive(Debug, Clone)]
pub struct VoronoiDensityEngine {
    config: EngineConfig,
}

impl VoronoiDensityEngine {
    pub fn new(config: EngineConfig) -> MathResult<Self> {
        config.validate()?; // Validiert die übergebene Konfiguration
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Berechnet die Karte: Zellen in `envelope`, geclippt an `boundary`.
    pub fn compute(
        &self,
        points: &PointSet,
        envelope: &Region,
        boundary: &Region,
    ) -> MathResult<DensityMap> {
        let step_description =
            |step_name: &str| format!("VoronoiDensityEngine::compute - Step: {}", step_name);

        points.ensure_crs(&boundary.crs, "boundary")?;
        if !boundary.bounds().intersects(&envelope.bounds()) {
            warn!(
                "{}: boundary {} does not overlap envelope {}",
                step_description("InputValidation"),
                boundary.bounds(),
                envelope.bounds()
            );
        }

        let (cells, duplicates) = self.tessellate_with_duplicates(points, envelope)?;

        // Clipping an der Grenze
        let step_name = "BoundaryClipping";
        let mut dropped_sites = duplicates;
        let mut output = Vec::with_capacity(cells.len());
        for cell in cells {
            let clipped = cell.geometry.intersection(boundary.shape());
            if clipped.0.is_empty() {
                debug!(
                    "{}: cell of site #{} lies outside the boundary",
                    step_description(step_name),
                    cell.site_index
                );
                dropped_sites.push(cell.site_index);
                continue;
            }
            // Teilstücke einer Zelle werden aufsummiert.
            let area_m2 = clipped.unsigned_area();

            let metric = match &self.config.mode {
                MetricMode::Density => Metric::density(area_m2, self.config.cap),
                MetricMode::AttributeTransfer { attribute } => {
                    if !(area_m2 > 0.0) {
                        dropped_sites.push(cell.site_index);
                        continue;
                    }
                    let value = points.points[cell.site_index]
                        .attribute(attribute)
                        .ok_or_else(|| MathError::MissingAttribute {
                            index: cell.site_index,
                            attribute: attribute.clone(),
                        })?;
                    Metric::Attribute(value)
                }
            };
            if metric == Metric::NoArea {
                warn!(
                    "{}: cell of site #{} has no measurable area after clipping",
                    step_description(step_name),
                    cell.site_index
                );
            }

            output.push(CellMetric {
                site_index: cell.site_index,
                generator: cell.generator,
                geometry: clipped,
                area_m2,
                metric,
            });
        }
        dropped_sites.sort_unstable();

        info!(
            "{}: {} cells from {} points ({} dropped)",
            step_description("Done"),
            output.len(),
            points.len(),
            dropped_sites.len()
        );

        Ok(DensityMap {
            mode: self.config.mode.clone(),
            cells: output,
            dropped_sites,
        })
    }

    /// Ungeclippte Zellen innerhalb der Hülle, eine pro (eindeutigem) Eingabepunkt.
    pub fn tessellate(&self, points: &PointSet, envelope: &Region) -> MathResult<Vec<VoronoiCell>> {
        self.tessellate_with_duplicates(points, envelope)
            .map(|(cells, _)| cells)
    }

    fn tessellate_with_duplicates(
        &self,
        points: &PointSet,
        envelope: &Region,
    ) -> MathResult<(Vec<VoronoiCell>, Vec<usize>)> {
        let step_description =
            |step_name: &str| format!("VoronoiDensityEngine::tessellate - Step: {}", step_name);

        // 1. Eingaben prüfen
        let step_name = "InputValidation";
        if points.len() < 2 {
            return Err(MathError::InsufficientPoints {
                expected: 2,
                actual: points.len(),
            });
        }
        points.ensure_crs(&envelope.crs, "envelope")?;
        self.validate_points(points)?;

        let envelope_bounds = envelope.bounds();
        let outside = points
            .iter()
            .filter(|p| !envelope_bounds.contains_point(p.coord()))
            .count();
        if outside > 0 {
            warn!(
                "{}: {} point(s) lie outside the envelope {}; their cells are truncated there",
                step_description(step_name),
                outside,
                envelope_bounds
            );
        }

        // 2. Duplikate
        let step_name = "Deduplication";
        let (site_indices, duplicates) = self.unique_sites(points)?;
        if !duplicates.is_empty() {
            warn!(
                "{}: dropped {} coincident point(s): {:?}",
                step_description(step_name),
                duplicates.len(),
                duplicates
            );
        }
        if site_indices.len() < 2 {
            return Err(MathError::InsufficientPoints {
                expected: 2,
                actual: site_indices.len(),
            });
        }

        // 3. Delaunay-Triangulation
        let step_name = "Triangulation";
        let spade_points: Vec<SpadePoint> = site_indices
            .iter()
            .map(|&i| Point2::from(&points.points[i]))
            .collect();
        let triangulation: DelaunayTriangulation<SpadePoint> =
            DelaunayTriangulation::bulk_load_stable(spade_points).map_err(|e| {
                MathError::TriangulationFailed {
                    reason: format!(
                        "{}: Spade's bulk_load_stable failed: {:?}. Input point count: {}",
                        step_description(step_name),
                        e,
                        site_indices.len()
                    ),
                }
            })?;
        debug!(
            "{}: Delaunay triangulation created with {} vertices and {} faces.",
            step_description(step_name),
            triangulation.num_vertices(),
            triangulation.num_all_faces()
        );

        // 4. Zellen extrahieren
        let step_name = "VoronoiCellExtraction";
        let cells = VoronoiExtractor::extract_cells(&triangulation, &site_indices, envelope)
            .map_err(|e| match e {
                MathError::TriangulationFailed { reason } => MathError::TriangulationFailed {
                    reason: format!("{}: {}", step_description(step_name), reason),
                },
                other => other,
            })?;
        let truncated = cells.iter().filter(|c| c.is_boundary_cell).count();
        debug!(
            "{}: {} of {} cells reach the envelope bounds",
            step_description(step_name),
            truncated,
            cells.len()
        );

        Ok((cells, duplicates))
    }

    fn validate_points(&self, points: &PointSet) -> MathResult<()> {
        for (index, p) in points.iter().enumerate() {
            if !p.is_finite() {
                return Err(MathError::DegenerateInput {
                    index,
                    reason: format!("non-finite coordinate ({}, {})", p.x, p.y),
                });
            }
            if let MetricMode::AttributeTransfer { attribute } = &self.config.mode {
                if p.attribute(attribute).is_none() {
                    return Err(MathError::MissingAttribute {
                        index,
                        attribute: attribute.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Indizes der eindeutigen Punkte und der verworfenen Duplikate.
    fn unique_sites(&self, points: &PointSet) -> MathResult<(Vec<usize>, Vec<usize>)> {
        let mut first_seen: HashMap<(u64, u64), usize> = HashMap::with_capacity(points.len());
        let mut unique = Vec::with_capacity(points.len());
        let mut duplicates = Vec::new();

        for (index, p) in points.iter().enumerate() {
            match first_seen.get(&coordinate_key(p.x, p.y)) {
                Some(&original) => match self.config.duplicate_policy {
                    DuplicatePolicy::Reject => return Err(MathError::duplicate(index, original)),
                    DuplicatePolicy::KeepFirst => duplicates.push(index),
                },
                None => {
                    first_seen.insert(coordinate_key(p.x, p.y), index);
                    unique.push(index);
                }
            }
        }
        Ok((unique, duplicates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::types::{Bounds2D, Crs, Point2D, SitePoint};
    use approx::assert_relative_eq;
    use geo::{MultiPolygon, polygon};

    const KM: f64 = 1000.0;

    fn crs() -> Crs {
        Crs::new("EPSG:3035")
    }

    fn square(size: f64) -> Region {
        Region::rectangle(
            crs(),
            Bounds2D::from_points(Point2D { x: 0.0, y: 0.0 }, Point2D { x: size, y: size }),
        )
        .unwrap()
    }

    fn point_set(coords: &[(f64, f64)]) -> PointSet {
        PointSet::new(
            crs(),
            coords.iter().map(|&(x, y)| SitePoint::new(x, y)).collect(),
        )
    }

    fn density_engine() -> VoronoiDensityEngine {
        VoronoiDensityEngine::new(EngineConfig::density()).unwrap()
    }

    #[test]
    fn test_four_corners_give_unit_quadrants() {
        let points = point_set(&[(0.0, 0.0), (2.0 * KM, 0.0), (2.0 * KM, 2.0 * KM), (0.0, 2.0 * KM)]);
        let region = square(2.0 * KM);
        let map = density_engine().compute(&points, &region, &region).unwrap();

        assert_eq!(map.len(), 4);
        for cell in map.iter() {
            assert_relative_eq!(cell.area_km2(), 1.0, max_relative = 1e-6);
            let value = cell.metric.display_value().unwrap();
            assert_relative_eq!(value, 1.0, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_attribute_transfer_is_identity() {
        let points = PointSet::new(
            crs(),
            vec![
                SitePoint::new(0.5 * KM, 0.5 * KM).with_attribute("pm10", 10.0),
                SitePoint::new(3.0 * KM, 1.0 * KM).with_attribute("pm10", 20.0),
                SitePoint::new(1.5 * KM, 3.5 * KM).with_attribute("pm10", 30.0),
            ],
        );
        let region = square(4.0 * KM);
        let engine = VoronoiDensityEngine::new(EngineConfig::attribute_transfer("pm10")).unwrap();
        let map = engine.compute(&points, &region, &region).unwrap();

        let values: Vec<Metric> = map.iter().map(|c| c.metric).collect();
        assert_eq!(
            values,
            vec![
                Metric::Attribute(10.0),
                Metric::Attribute(20.0),
                Metric::Attribute(30.0)
            ]
        );
        assert_eq!(map.unit_label(), "pm10");
    }

    #[test]
    fn test_clipped_areas_sum_to_boundary() {
        let points = point_set(&[
            (1.2 * KM, 0.7 * KM),
            (5.1 * KM, 1.9 * KM),
            (3.3 * KM, 4.4 * KM),
            (7.2 * KM, 6.5 * KM),
            (0.9 * KM, 8.8 * KM),
            (6.1 * KM, 9.0 * KM),
            (9.4 * KM, 3.2 * KM),
        ]);
        let envelope = square(10.0 * KM);
        // Konkave Grenze (L-Form) innerhalb der Hülle
        let boundary = Region::new(
            crs(),
            MultiPolygon::new(vec![polygon![
                (x: 1.0 * KM, y: 1.0 * KM),
                (x: 9.0 * KM, y: 1.0 * KM),
                (x: 9.0 * KM, y: 4.0 * KM),
                (x: 4.0 * KM, y: 4.0 * KM),
                (x: 4.0 * KM, y: 9.0 * KM),
                (x: 1.0 * KM, y: 9.0 * KM),
            ]]),
        )
        .unwrap();

        let map = density_engine().compute(&points, &envelope, &boundary).unwrap();
        assert!(map.len() <= points.len());
        assert_relative_eq!(
            map.total_area_m2(),
            boundary.area_m2(),
            max_relative = 1e-6
        );
        for cell in map.iter() {
            let expected = 1.0 / cell.area_km2();
            assert_relative_eq!(cell.metric.uncapped().unwrap(), expected, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_single_cell_equal_to_boundary() {
        // Zweiter Punkt liegt weit außerhalb: die erste Zelle deckt die ganze Grenze ab.
        let points = point_set(&[(1.0 * KM, 1.0 * KM), (100.0 * KM, 1.0 * KM)]);
        let boundary = square(2.0 * KM);
        let envelope = Region::rectangle(
            crs(),
            Bounds2D::from_points(Point2D { x: 0.0, y: 0.0 }, Point2D { x: 200.0 * KM, y: 2.0 * KM }),
        )
        .unwrap();
        let map = density_engine().compute(&points, &envelope, &boundary).unwrap();

        assert_eq!(map.len(), 1);
        assert_eq!(map.dropped_sites, vec![1]);
        assert_relative_eq!(
            map.cells[0].metric.uncapped().unwrap(),
            1.0 / boundary.area_km2(),
            max_relative = 1e-6
        );
    }

    #[test]
    fn test_disconnected_pieces_are_summed() {
        // Zwei Inseln, die beide in der Zelle des linken Punktes liegen.
        let boundary = Region::from_parts(
            crs(),
            vec![
                polygon![(x: 0.0, y: 0.0), (x: 1.0 * KM, y: 0.0), (x: 1.0 * KM, y: 1.0 * KM), (x: 0.0, y: 1.0 * KM)],
                polygon![(x: 0.0, y: 3.0 * KM), (x: 1.0 * KM, y: 3.0 * KM), (x: 1.0 * KM, y: 4.0 * KM), (x: 0.0, y: 4.0 * KM)],
            ],
        )
        .unwrap();
        let points = point_set(&[(0.5 * KM, 2.0 * KM), (3.5 * KM, 2.0 * KM)]);
        let envelope = square(4.0 * KM);
        let map = density_engine().compute(&points, &envelope, &boundary).unwrap();

        assert_eq!(map.len(), 1);
        let cell = &map.cells[0];
        assert_eq!(cell.part_count(), 2);
        assert_relative_eq!(cell.area_km2(), 2.0, max_relative = 1e-6);
        assert_relative_eq!(cell.metric.uncapped().unwrap(), 0.5, max_relative = 1e-6);
    }

    #[test]
    fn test_cap_clamps_display_only() {
        let points = point_set(&[(0.0, 0.0), (2.0 * KM, 0.0), (2.0 * KM, 2.0 * KM), (0.0, 2.0 * KM)]);
        let region = square(2.0 * KM);
        let engine = VoronoiDensityEngine::new(EngineConfig::density().with_cap(0.5)).unwrap();
        let map = engine.compute(&points, &region, &region).unwrap();
        for cell in map.iter() {
            assert_eq!(cell.metric.display_value(), Some(0.5));
            assert_relative_eq!(cell.metric.uncapped().unwrap(), 1.0, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_deterministic() {
        let points = point_set(&[
            (1.1 * KM, 2.3 * KM),
            (3.7 * KM, 0.4 * KM),
            (2.2 * KM, 3.9 * KM),
            (0.2 * KM, 0.1 * KM),
        ]);
        let region = square(4.0 * KM);
        let engine = density_engine();
        let a = engine.compute(&points, &region, &region).unwrap();
        let b = engine.compute(&points, &region, &region).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fewer_than_two_points() {
        let region = square(KM);
        let err = density_engine()
            .compute(&point_set(&[(1.0, 1.0)]), &region, &region)
            .unwrap_err();
        assert_eq!(
            err,
            MathError::InsufficientPoints {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_two_coincident_points_are_degenerate() {
        let region = square(KM);
        let err = density_engine()
            .compute(&point_set(&[(5.0, 5.0), (5.0, 5.0)]), &region, &region)
            .unwrap_err();
        assert_eq!(err, MathError::duplicate(1, 0));
    }

    #[test]
    fn test_keep_first_drops_duplicates() {
        let region = square(4.0 * KM);
        let points = point_set(&[(1.0 * KM, 1.0 * KM), (3.0 * KM, 3.0 * KM), (1.0 * KM, 1.0 * KM)]);
        let engine = VoronoiDensityEngine::new(
            EngineConfig::density().with_duplicate_policy(DuplicatePolicy::KeepFirst),
        )
        .unwrap();
        let map = engine.compute(&points, &region, &region).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.dropped_sites, vec![2]);

        // Nach dem Entfernen bleibt nur ein Punkt übrig.
        let collapsed = point_set(&[(1.0, 1.0), (1.0, 1.0)]);
        assert!(matches!(
            engine.compute(&collapsed, &region, &region),
            Err(MathError::InsufficientPoints { actual: 1, .. })
        ));
    }

    #[test]
    fn test_crs_mismatch() {
        let points = point_set(&[(1.0, 1.0), (2.0, 2.0)]);
        let region = square(KM);
        let other = Region::rectangle(
            Crs::new("EPSG:32633"),
            Bounds2D::from_points(Point2D { x: 0.0, y: 0.0 }, Point2D { x: KM, y: KM }),
        )
        .unwrap();
        assert!(matches!(
            density_engine().compute(&points, &region, &other),
            Err(MathError::CoordinateSystemMismatch { .. })
        ));
        assert!(matches!(
            density_engine().compute(&points, &other, &region),
            Err(MathError::CoordinateSystemMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_attribute_aborts() {
        let points = PointSet::new(
            crs(),
            vec![
                SitePoint::new(1.0, 1.0).with_attribute("no2", 3.0),
                SitePoint::new(2.0, 2.0),
            ],
        );
        let region = square(KM);
        let engine = VoronoiDensityEngine::new(EngineConfig::attribute_transfer("no2")).unwrap();
        assert_eq!(
            engine.compute(&points, &region, &region),
            Err(MathError::MissingAttribute {
                index: 1,
                attribute: "no2".to_string()
            })
        );
    }

    #[test]
    fn test_non_finite_point_is_degenerate() {
        let region = square(KM);
        assert!(matches!(
            density_engine().compute(&point_set(&[(1.0, 1.0), (f64::NAN, 2.0)]), &region, &region),
            Err(MathError::DegenerateInput { index: 1, .. })
        ));
    }

    #[test]
    fn test_tessellation_partitions_envelope() {
        let points = point_set(&[
            (0.4 * KM, 0.3 * KM),
            (1.9 * KM, 0.8 * KM),
            (1.1 * KM, 1.7 * KM),
            (0.2 * KM, 1.9 * KM),
        ]);
        let region = square(2.0 * KM);
        let cells = density_engine().tessellate(&points, &region).unwrap();
        assert_eq!(cells.len(), points.len());
        let total: f64 = cells.iter().map(VoronoiCell::area).sum();
        assert_relative_eq!(total, region.area_m2(), max_relative = 1e-6);
    }

    #[test]
    fn test_concave_envelope_truncates_outside_site() {
        // U-förmige Hülle; der Punkt #4 liegt in der Aussparung, also außerhalb.
        let envelope = Region::new(
            crs(),
            MultiPolygon::new(vec![polygon![
                (x: 0.0, y: 0.0),
                (x: 8.0 * KM, y: 0.0),
                (x: 8.0 * KM, y: 8.0 * KM),
                (x: 5.0 * KM, y: 8.0 * KM),
                (x: 5.0 * KM, y: 4.0 * KM),
                (x: 3.0 * KM, y: 4.0 * KM),
                (x: 3.0 * KM, y: 8.0 * KM),
                (x: 0.0, y: 8.0 * KM),
            ]]),
        )
        .unwrap();
        assert!(!envelope.is_axis_aligned_rectangle());
        let points = point_set(&[
            (1.5 * KM, 2.0 * KM),
            (6.5 * KM, 2.0 * KM),
            (1.5 * KM, 6.0 * KM),
            (6.5 * KM, 6.0 * KM),
            (4.0 * KM, 7.5 * KM),
        ]);
        assert!(!envelope.contains(points.points[4].coord()));

        let cells = density_engine().tessellate(&points, &envelope).unwrap();
        assert_eq!(cells.len(), 5);
        let total: f64 = cells.iter().map(VoronoiCell::area).sum();
        assert_relative_eq!(total, envelope.area_m2(), max_relative = 1e-6);
        assert_relative_eq!(envelope.area_km2(), 56.0, max_relative = 1e-12);
        for cell in &cells {
            let outside = cell.geometry.difference(envelope.shape()).unsigned_area();
            assert!(outside <= envelope.area_m2() * 1e-6);
        }
        // Die Zelle des äußeren Punktes zerfällt in die beiden Schenkel.
        let outside_cell = &cells[4];
        assert_eq!(outside_cell.site_index, 4);
        assert_eq!(outside_cell.geometry.0.len(), 2);
        assert!(outside_cell.area() > 0.0);

        // Grenze: unteres Band innerhalb der Hülle
        let boundary = Region::rectangle(
            crs(),
            Bounds2D::from_points(
                Point2D { x: 0.5 * KM, y: 0.5 * KM },
                Point2D { x: 7.5 * KM, y: 3.5 * KM },
            ),
        )
        .unwrap();
        let map = density_engine().compute(&points, &envelope, &boundary).unwrap();
        assert_eq!(map.cells.iter().map(|c| c.site_index).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(map.dropped_sites, vec![2, 3, 4]);
        assert_relative_eq!(map.total_area_m2(), boundary.area_m2(), max_relative = 1e-6);
        for cell in map.iter() {
            let outside = cell.geometry.difference(boundary.shape()).unsigned_area();
            assert!(outside <= boundary.area_m2() * 1e-6);
        }
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<VoronoiDensityEngine>();
        assert_send_sync::<DensityMap>();
    }
}
