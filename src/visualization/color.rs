// src/visualization/color.rs

use crate::math::utils::comparison;

/// Farbe für Zellen ohne definierten Wert.
pub const NO_DATA_COLOR: Rgb = Rgb(0xbd, 0xbd, 0xbd);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    fn mix(self, other: Rgb, t: f64) -> Rgb {
        let channel = |a: u8, b: u8| comparison::lerp(a as f64, b as f64, t).round() as u8;
        Rgb(
            channel(self.0, other.0),
            channel(self.1, other.1),
            channel(self.2, other.2),
        )
    }
}

/// Abbildung des Wertebereichs auf [0, 1] vor der Farbwahl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorTransform {
    #[default]
    Linear,
    /// Quadratwurzel des normierten Werts; spreizt den unteren Bereich.
    Sqrt,
}

impl ColorTransform {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            ColorTransform::Linear => t,
            ColorTransform::Sqrt => t.sqrt(),
        }
    }
}

/// Sequentielle Farbskala (hell nach dunkel) über einem Wertebereich.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
    pub transform: ColorTransform,
    stops: Vec<Rgb>,
}

impl ColorScale {
    pub fn new(min: f64, max: f64, transform: ColorTransform) -> Self {
        Self {
            min,
            max,
            transform,
            // YlOrRd
            stops: vec![
                Rgb(0xff, 0xff, 0xcc),
                Rgb(0xfe, 0xd9, 0x76),
                Rgb(0xfd, 0x8d, 0x3c),
                Rgb(0xe3, 0x1a, 0x1c),
                Rgb(0x80, 0x00, 0x26),
            ],
        }
    }

    /// Normierte Position eines Werts auf der Skala.
    pub fn position(&self, value: f64) -> f64 {
        if comparison::nearly_equal(self.min, self.max) {
            return 0.5;
        }
        self.transform
            .apply(comparison::inverse_lerp(self.min, self.max, value))
    }

    pub fn color(&self, value: Option<f64>) -> Rgb {
        match value {
            Some(v) if v.is_finite() => self.color_at(self.position(v)),
            _ => NO_DATA_COLOR,
        }
    }

    /// Farbe an einer normierten Position.
    pub fn color_at(&self, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let segments = self.stops.len() - 1;
        let scaled = t * segments as f64;
        let idx = (scaled.floor() as usize).min(segments - 1);
        self.stops[idx].mix(self.stops[idx + 1], scaled - idx as f64)
    }
}
