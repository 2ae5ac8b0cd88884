// src/visualization/mod.rs

pub mod color;
pub mod svg;

pub use self::color::{ColorScale, ColorTransform, Rgb};
pub use self::svg::{RenderError, RenderOptions, render_density_map, render_surface, save};
