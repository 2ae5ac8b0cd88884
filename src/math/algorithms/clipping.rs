// src/math/algorithms/clipping.rs

use crate::math::{types::*, utils::constants};

/// Halbebene `{ q : normal · q <= offset }`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfPlane {
    pub normal: Point2D,
    pub offset: f64,
}

impl HalfPlane {
    pub fn new(normal: Point2D, offset: f64) -> Self {
        Self { normal, offset }
    }

    /// Halbebene der Punkte, die näher an `site` als an `other` liegen
    /// (begrenzt durch die Mittelsenkrechte).
    pub fn closer_to(site: Point2D, other: Point2D) -> Self {
        let normal = other - site;
        let midpoint = (site + other) * 0.5;
        Self {
            normal,
            offset: dot(normal, midpoint),
        }
    }

    /// Vorzeichenbehafteter Abstand (skaliert mit |normal|); <= 0 heißt innen.
    pub fn signed_distance(&self, p: Point2D) -> f64 {
        dot(self.normal, p) - self.offset
    }

    pub fn contains(&self, p: Point2D) -> bool {
        self.signed_distance(p) <= 0.0
    }
}

/// Schneidet konvexe Polygone mit Halbebenen (Sutherland-Hodgman mit einer Kante).
pub struct HalfPlaneClipper {
    tolerance: f64,
}

impl Default for HalfPlaneClipper {
    fn default() -> Self {
        Self {
            tolerance: constants::EPSILON,
        }
    }
}

impl HalfPlaneClipper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Setzt die Toleranz
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Clippt einen offenen Ring (ohne wiederholten Endpunkt) gegen eine Halbebene.
    /// Ergebnis ist leer, wenn weniger als drei Eckpunkte übrig bleiben.
    pub fn clip(&self, ring: &[Point2D], half_plane: &HalfPlane) -> Vec<Point2D> {
        if ring.len() < 3 {
            return Vec::new();
        }
        // Toleranz relativ zur Normalenlänge, damit große projizierte Koordinaten stabil bleiben.
        let scale = half_plane.normal.x.hypot(half_plane.normal.y).max(1.0);
        let eps = self.tolerance * scale;

        let mut output = Vec::with_capacity(ring.len() + 1);
        let mut s = ring[ring.len() - 1];
        let mut s_dist = half_plane.signed_distance(s);

        for &e in ring {
            let e_dist = half_plane.signed_distance(e);
            let e_inside = e_dist <= eps;
            let s_inside = s_dist <= eps;

            if e_inside {
                if !s_inside {
                    // Entering
                    output.push(intersect(s, e, s_dist, e_dist));
                }
                output.push(e);
            } else if s_inside {
                // Leaving
                output.push(intersect(s, e, s_dist, e_dist));
            }

            s = e;
            s_dist = e_dist;
        }

        dedup_ring(&mut output, eps.min(constants::EPSILON * scale));
        if output.len() < 3 { Vec::new() } else { output }
    }

    /// Clippt nacheinander gegen alle Halbebenen.
    pub fn clip_all<'a, I>(&self, ring: &[Point2D], half_planes: I) -> Vec<Point2D>
    where
        I: IntoIterator<Item = &'a HalfPlane>,
    {
        let mut current = ring.to_vec();
        for half_plane in half_planes {
            if current.is_empty() {
                break;
            }
            current = self.clip(&current, half_plane);
        }
        current
    }
}

fn dot(a: Point2D, b: Point2D) -> f64 {
    a.x * b.x + a.y * b.y
}

fn intersect(s: Point2D, e: Point2D, s_dist: f64, e_dist: f64) -> Point2D {
    let denom = s_dist - e_dist;
    if denom.abs() < f64::MIN_POSITIVE {
        return e;
    }
    let t = s_dist / denom;
    s + (e - s) * t
}

fn dedup_ring(ring: &mut Vec<Point2D>, eps: f64) {
    let eps_sq = eps * eps;
    ring.dedup_by(|a, b| {
        let d = *a - *b;
        dot(d, d) <= eps_sq
    });
    while ring.len() > 1 {
        let d = ring[0] - ring[ring.len() - 1];
        if dot(d, d) <= eps_sq {
            ring.pop();
        } else {
            break;
        }
    }
}
