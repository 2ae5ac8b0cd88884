// src/visualization/svg.rs
use super::color::{ColorScale, ColorTransform, NO_DATA_COLOR};
use crate::math::{
    surface::SurfaceGrid,
    tessellation::voronoi::DensityMap,
    types::{Bounds2D, Point2D, Region},
};
use geo::{LineString, MultiPolygon};
use std::path::{Path as FsPath, PathBuf};
use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Group, Path, Rectangle, Text};
use thiserror::Error;
use tracing::info;

/// Anzahl der Farbstufen im Legendenbalken.
const LEGEND_STEPS: usize = 32;
/// Breite des Legendenbereichs rechts der Karte in Pixeln.
const LEGEND_WIDTH: f64 = 170.0;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Nothing to render: the map has no cells with a value")]
    EmptyMap,
}

/// Darstellungsoptionen für alle Karten.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Breite des Kartenbereichs in Pixeln; die Höhe folgt dem Seitenverhältnis.
    pub width_px: f64,
    pub transform: ColorTransform,
    pub show_sites: bool,
    pub show_boundary: bool,
    pub title: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width_px: 800.0,
            transform: ColorTransform::Linear,
            show_sites: true,
            show_boundary: true,
            title: None,
        }
    }
}

impl RenderOptions {
    pub fn with_transform(mut self, transform: ColorTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

// ===================================================================================
// HILFS-STRUCT für die SVG-Erstellung
// ===================================================================================
/// Sammelt die Ebenen einer Karte und rechnet Weltkoordinaten in Pixel um.
struct SvgBuilder {
    bounds: Bounds2D,
    scale: f64,
    map_width: f64,
    map_height: f64,
    layers: Vec<Group>,
}

impl SvgBuilder {
    fn new(bounds: Bounds2D, width_px: f64) -> Self {
        let extent = bounds.width().max(bounds.height()).max(f64::MIN_POSITIVE);
        let scale = width_px / extent;
        Self {
            bounds,
            scale,
            map_width: bounds.width() * scale,
            map_height: bounds.height() * scale,
            layers: Vec::new(),
        }
    }

    /// Weltkoordinate nach Pixel; die y-Achse zeigt im SVG nach unten.
    fn project(&self, p: Point2D) -> (f64, f64) {
        (
            (p.x - self.bounds.min.x) * self.scale,
            (self.bounds.max.y - p.y) * self.scale,
        )
    }

    /// Pfadparameter sind im `svg`-Crate `f32`.
    fn path_point(&self, p: Point2D) -> (f32, f32) {
        let (x, y) = self.project(p);
        (x as f32, y as f32)
    }

    fn ring_data(&self, data: Data, ring: &LineString<f64>) -> Data {
        let mut coords = ring.coords();
        let Some(first) = coords.next() else {
            return data;
        };
        let data = data.move_to(self.path_point(*first));
        coords
            .fold(data, |d, c| d.line_to(self.path_point(*c)))
            .close()
    }

    /// Pfad einer Mehrfachfläche; Löcher über die Füllregel `evenodd`.
    fn multipolygon_path(&self, shape: &MultiPolygon<f64>, class: &str, fill: &str) -> Path {
        let data = shape.0.iter().fold(Data::new(), |data, polygon| {
            let data = self.ring_data(data, polygon.exterior());
            polygon
                .interiors()
                .iter()
                .fold(data, |d, ring| self.ring_data(d, ring))
        });
        Path::new()
            .set("class", class)
            .set("d", data)
            .set("fill", fill)
            .set("fill-rule", "evenodd")
    }

    fn push_layer(&mut self, layer: Group) {
        self.layers.push(layer);
    }

    fn draw_boundary(&mut self, boundary: &Region) {
        let outline = self
            .multipolygon_path(boundary.shape(), "boundary", "none")
            .set("stroke", "#333333")
            .set("stroke-width", 1.2);
        self.push_layer(Group::new().set("id", "boundary").add(outline));
    }

    fn draw_sites(&mut self, sites: impl Iterator<Item = Point2D>) {
        let group = sites.fold(Group::new().set("id", "sites"), |g, p| {
            let (cx, cy) = self.project(p);
            g.add(
                Circle::new()
                    .set("class", "site")
                    .set("cx", cx)
                    .set("cy", cy)
                    .set("r", 1.8)
                    .set("fill", "#1f3b73"),
            )
        });
        self.push_layer(group);
    }

    /// Farbbalken mit Minimum, Maximum und Einheit.
    fn draw_legend(&mut self, scale: &ColorScale, unit: &str) {
        let x = self.map_width + 30.0;
        let top = 40.0;
        let bar_height = (self.map_height - 2.0 * top).max(120.0);
        let step = bar_height / LEGEND_STEPS as f64;

        let mut legend = Group::new().set("id", "legend");
        for i in 0..LEGEND_STEPS {
            // Oben das Maximum.
            let t = 1.0 - (i as f64 + 0.5) / LEGEND_STEPS as f64;
            legend = legend.add(
                Rectangle::new()
                    .set("x", x)
                    .set("y", top + i as f64 * step)
                    .set("width", 24.0)
                    .set("height", step + 0.5)
                    .set("fill", scale.color_at(t).to_hex()),
            );
        }
        let label = |y: f64, content: String| {
            Text::new(content)
                .set("x", x + 32.0)
                .set("y", y)
                .set("font-family", "sans-serif")
                .set("font-size", 12)
                .set("dominant-baseline", "middle")
        };
        legend = legend
            .add(label(top, format_value(scale.max)))
            .add(label(top + bar_height, format_value(scale.min)))
            .add(
                Text::new(unit.to_string())
                    .set("x", x)
                    .set("y", top - 14.0)
                    .set("font-family", "sans-serif")
                    .set("font-size", 13)
                    .set("font-weight", "bold"),
            )
            .add(
                Rectangle::new()
                    .set("x", x)
                    .set("y", top + bar_height + 20.0)
                    .set("width", 24.0)
                    .set("height", 12.0)
                    .set("fill", NO_DATA_COLOR.to_hex()),
            )
            .add(label(top + bar_height + 26.0, "no area".to_string()));
        self.push_layer(legend);
    }

    fn finish(self, title: Option<&str>) -> Document {
        let width = self.map_width + LEGEND_WIDTH;
        let height = self.map_height.max(240.0);
        let mut document = Document::new()
            .set("width", width)
            .set("height", height)
            .set("viewBox", format!("0 0 {:.1} {:.1}", width, height))
            .add(
                Rectangle::new()
                    .set("class", "background")
                    .set("width", width)
                    .set("height", height)
                    .set("fill", "#f0f0f0"),
            );
        for layer in self.layers {
            document = document.add(layer);
        }
        if let Some(title) = title {
            document = document.add(
                Text::new(title.to_string())
                    .set("x", 10)
                    .set("y", 20)
                    .set("font-family", "sans-serif")
                    .set("font-size", 15),
            );
        }
        document
    }
}

fn format_value(value: f64) -> String {
    if value.abs() >= 100.0 || value == 0.0 {
        format!("{:.0}", value)
    } else if value.abs() >= 1.0 {
        format!("{:.2}", value)
    } else {
        format!("{:.3e}", value)
    }
}

/// Choroplethenkarte einer Dichte- oder Attributkarte: ein Pfad pro Zelle.
pub fn render_density_map(
    map: &DensityMap,
    boundary: &Region,
    options: &RenderOptions,
) -> Result<Document, RenderError> {
    let (min, max) = map.value_range().ok_or(RenderError::EmptyMap)?;
    let scale = ColorScale::new(min, max, options.transform);

    let mut svg = SvgBuilder::new(boundary.bounds(), options.width_px);
    let cells = map.iter().fold(Group::new().set("id", "cells"), |g, cell| {
        let fill = scale.color(cell.metric.display_value()).to_hex();
        g.add(
            svg.multipolygon_path(&cell.geometry, "cell", &fill)
                .set("data-site", cell.site_index)
                .set("stroke", "#ffffff")
                .set("stroke-width", 0.4),
        )
    });
    svg.push_layer(cells);
    if options.show_boundary {
        svg.draw_boundary(boundary);
    }
    if options.show_sites {
        svg.draw_sites(map.iter().map(|c| c.generator));
    }
    svg.draw_legend(&scale, &map.unit_label());
    Ok(svg.finish(options.title.as_deref()))
}

/// Rasterkarte einer Fläche (IDW, KDE); maskierte Zellen bleiben leer.
pub fn render_surface(
    grid: &SurfaceGrid,
    boundary: &Region,
    unit: &str,
    options: &RenderOptions,
) -> Result<Document, RenderError> {
    let (min, max) = grid.value_range().ok_or(RenderError::EmptyMap)?;
    let scale = ColorScale::new(min, max, options.transform);

    let mut svg = SvgBuilder::new(boundary.bounds(), options.width_px);
    let size = grid.cell_size * svg.scale;
    let raster = grid
        .defined_cells()
        .fold(Group::new().set("id", "raster"), |g, (col, row, value)| {
            let center = grid.cell_center(col, row);
            let (cx, cy) = svg.project(center);
            g.add(
                Rectangle::new()
                    .set("class", "raster-cell")
                    .set("x", cx - size / 2.0)
                    .set("y", cy - size / 2.0)
                    // Überlappung gegen Haarlinien zwischen Zellen.
                    .set("width", size + 0.3)
                    .set("height", size + 0.3)
                    .set("fill", scale.color(Some(value)).to_hex()),
            )
        });
    svg.push_layer(raster);
    if options.show_boundary {
        svg.draw_boundary(boundary);
    }
    svg.draw_legend(&scale, unit);
    Ok(svg.finish(options.title.as_deref()))
}

/// Speichert ein SVG-Dokument.
pub fn save(document: &Document, path: impl AsRef<FsPath>) -> Result<(), RenderError> {
    let path = path.as_ref();
    svg::save(path, document).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("SVG '{}' wurde erstellt.", path.display());
    Ok(())
}
