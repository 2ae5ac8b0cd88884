// src/math/utils.rs

/// Mathematische Konstanten
pub mod constants {
    pub const EPSILON: f64 = 1e-9;
    pub const EPSILON_SQUARED: f64 = EPSILON * EPSILON; // Für Vergleiche mit Längen
    /// Quadratmeter pro Quadratkilometer.
    pub const M2_PER_KM2: f64 = 1_000_000.0;
    pub const TAU: f64 = std::f64::consts::TAU;
}

/// Vergleichsfunktionen mit Toleranz
pub mod comparison {
    use super::constants::EPSILON;

    /// Prüft ob zwei Floats (nahezu) gleich sind
    pub fn nearly_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    /// Prüft ob zwei Floats mit custom Toleranz gleich sind
    pub fn nearly_equal_eps(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    /// Lineare Interpolation
    pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
        a + (b - a) * t
    }

    /// Inverse lineare Interpolation
    pub fn inverse_lerp(a: f64, b: f64, value: f64) -> f64 {
        if nearly_equal(a, b) {
            0.0
        } else {
            (value - a) / (b - a)
        }
    }
}

/// Flächen-Umrechnungen
pub mod area {
    use super::constants::M2_PER_KM2;

    pub fn m2_to_km2(area_m2: f64) -> f64 {
        area_m2 / M2_PER_KM2
    }

    pub fn km2_to_m2(area_km2: f64) -> f64 {
        area_km2 * M2_PER_KM2
    }
}

/// Schlüssel für exakte Koordinatengleichheit. `-0.0` und `0.0` fallen zusammen.
pub fn coordinate_key(x: f64, y: f64) -> (u64, u64) {
    let canon = |v: f64| if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() };
    (canon(x), canon(y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_conversion() {
        assert_eq!(area::m2_to_km2(2_500_000.0), 2.5);
        assert_eq!(area::km2_to_m2(0.5), 500_000.0);
    }

    #[test]
    fn test_coordinate_key_signed_zero() {
        assert_eq!(coordinate_key(0.0, -0.0), coordinate_key(-0.0, 0.0));
        assert_ne!(coordinate_key(1.0, 2.0), coordinate_key(2.0, 1.0));
    }

    #[test]
    fn test_inverse_lerp_degenerate_range() {
        assert_eq!(comparison::inverse_lerp(3.0, 3.0, 5.0), 0.0);
        assert!(comparison::nearly_equal(
            comparison::inverse_lerp(0.0, 4.0, 1.0),
            0.25
        ));
    }
}
