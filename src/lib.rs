//! Voronoi-basierte Dichte- und Attributkarten für planare Punktdatensätze.
//!
//! Punkte und Grenzpolygon werden über [`io`] geladen, in [`math`] tesselliert
//! bzw. interpoliert und mit [`visualization`] als SVG ausgegeben.

pub mod io;
pub mod math;
pub mod visualization;
