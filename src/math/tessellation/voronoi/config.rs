// src/math/tessellation/voronoi/config.rs

use crate::math::error::{MathError, MathResult};

/// Welche Kennzahl pro Zelle berechnet wird.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricMode {
    /// `1 / Fläche in km²` als Dichte-Proxy.
    Density,
    /// Attributwert des erzeugenden Punktes wird unverändert übernommen.
    AttributeTransfer { attribute: String },
}

/// Umgang mit Punkten, die exakt dieselben Koordinaten haben.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Abbruch mit `MathError::DegenerateInput`.
    #[default]
    Reject,
    /// Der erste Punkt gewinnt, spätere Duplikate erhalten keine Zelle.
    KeepFirst,
}

/// Konfiguration für die Voronoi-Dichte-/Attributkarte.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub mode: MetricMode,
    /// Obergrenze für die Darstellung im Dichtemodus. Der ungekappte Wert bleibt abrufbar.
    pub cap: Option<f64>,
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: MetricMode::Density,
            cap: None,
            duplicate_policy: DuplicatePolicy::Reject,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn density() -> Self {
        Self::default()
    }

    pub fn attribute_transfer(attribute: impl Into<String>) -> Self {
        Self {
            mode: MetricMode::AttributeTransfer {
                attribute: attribute.into(),
            },
            ..Self::default()
        }
    }

    pub fn with_cap(mut self, cap: f64) -> Self {
        self.cap = Some(cap);
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    pub fn validate(&self) -> MathResult<()> {
        if let MetricMode::AttributeTransfer { attribute } = &self.mode {
            if attribute.trim().is_empty() {
                return Err(MathError::InvalidConfiguration {
                    message: "Attribute transfer needs a non-empty attribute name.".to_string(),
                });
            }
            if self.cap.is_some() {
                return Err(MathError::InvalidConfiguration {
                    message: "A display cap only applies to density mode.".to_string(),
                });
            }
        }
        if let Some(cap) = self.cap {
            if !cap.is_finite() || cap <= 0.0 {
                return Err(MathError::InvalidConfiguration {
                    message: format!("Density cap must be a positive finite number, got {}", cap),
                });
            }
        }
        Ok(())
    }
}
