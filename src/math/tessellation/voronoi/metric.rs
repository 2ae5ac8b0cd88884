// src/math/tessellation/voronoi/metric.rs

use super::config::MetricMode;
use crate::math::{types::*, utils::area};
use geo::MultiPolygon;

/// Kennzahl einer geclippten Zelle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    /// `1 / Fläche` in Punkten pro km², optional mit Darstellungsobergrenze.
    Density { per_km2: f64, cap: Option<f64> },
    /// Zelle ohne messbare Fläche; eine Dichte ist nicht definiert.
    NoArea,
    /// Übernommener Attributwert.
    Attribute(f64),
}

impl Metric {
    /// Dichte aus der geclippten Fläche in m².
    pub fn density(area_m2: f64, cap: Option<f64>) -> Self {
        let area_km2 = area::m2_to_km2(area_m2);
        if !(area_km2 > 0.0) {
            return Metric::NoArea;
        }
        let per_km2 = 1.0 / area_km2;
        if per_km2.is_finite() {
            Metric::Density { per_km2, cap }
        } else {
            Metric::NoArea
        }
    }

    /// Wert für die Darstellung (gekappt, falls eine Obergrenze gesetzt ist).
    pub fn display_value(&self) -> Option<f64> {
        match *self {
            Metric::Density { per_km2, cap } => Some(cap.map_or(per_km2, |c| per_km2.min(c))),
            Metric::Attribute(value) => Some(value),
            Metric::NoArea => None,
        }
    }

    /// Ungekappter Wert.
    pub fn uncapped(&self) -> Option<f64> {
        match *self {
            Metric::Density { per_km2, .. } => Some(per_km2),
            Metric::Attribute(value) => Some(value),
            Metric::NoArea => None,
        }
    }

    pub fn is_capped(&self) -> bool {
        matches!(*self, Metric::Density { per_km2, cap: Some(c) } if per_km2 > c)
    }
}

/// Eine geclippte Zelle mit ihrer Kennzahl.
#[derive(Debug, Clone, PartialEq)]
pub struct CellMetric {
    /// Index des erzeugenden Punktes in der Eingabe.
    pub site_index: usize,
    pub generator: Point2D,
    /// Geclippte Geometrie; Teilstücke einer Zelle bleiben zusammen.
    pub geometry: MultiPolygon<f64>,
    /// Summe der Teilflächen in m².
    pub area_m2: f64,
    pub metric: Metric,
}

impl CellMetric {
    pub fn area_km2(&self) -> f64 {
        area::m2_to_km2(self.area_m2)
    }

    pub fn part_count(&self) -> usize {
        self.geometry.0.len()
    }
}

/// Ergebnis einer Berechnung, in Eingabereihenfolge.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityMap {
    pub mode: MetricMode,
    pub cells: Vec<CellMetric>,
    /// Eingabepunkte ohne Zelle (komplett außerhalb, Duplikate, Nullfläche).
    pub dropped_sites: Vec<usize>,
}

impl DensityMap {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[CellMetric] {
        &self.cells
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CellMetric> {
        self.cells.iter()
    }

    pub fn cell_for_site(&self, site_index: usize) -> Option<&CellMetric> {
        self.cells
            .binary_search_by_key(&site_index, |c| c.site_index)
            .ok()
            .map(|i| &self.cells[i])
    }

    pub fn total_area_m2(&self) -> f64 {
        self.cells.iter().map(|c| c.area_m2).sum()
    }

    /// Minimum und Maximum der Darstellungswerte; `None` ohne definierte Werte.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.cells
            .iter()
            .filter_map(|c| c.metric.display_value())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Einheit für Legenden.
    pub fn unit_label(&self) -> String {
        match &self.mode {
            MetricMode::Density => "per km²".to_string(),
            MetricMode::AttributeTransfer { attribute } => attribute.clone(),
        }
    }
}
