use serde::{Deserialize, Serialize};

// ============ Request Models ============

/// Body of `POST /predict`.
///
/// Only the coordinate is required; the temporal fields default to noon on
/// a Monday and the contributing factor to "Unspecified", matching the
/// defaults the model was evaluated with.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionRequest {
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lng: f64,
    /// Hour of day, 0-23.
    #[serde(default = "default_hour")]
    pub hour: i64,
    /// Day of week, 0=Monday .. 6=Sunday.
    #[serde(default)]
    pub day_of_week: i64,
    /// Label-encoded contributing factor index; `null` or absent means 0.
    #[serde(default)]
    pub contrib_factor: Option<i64>,
}

fn default_hour() -> i64 {
    12
}

// ============ Response Models ============

/// Per-class probabilities as percentages rounded to one decimal.
///
/// The fields are positional over the classifier's three outputs, matching
/// the fixed 0=low / 1=medium / 2=high training encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

/// Body of the `POST /predict` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Echo of the requested latitude.
    pub lat: f64,
    /// Echo of the requested longitude.
    pub lng: f64,
    /// Discretized risk level: "low", "medium", "high", or "unknown".
    pub level: String,
    /// Maximum class probability, as a fraction.
    pub score: f64,
    /// Probability breakdown per class.
    pub probabilities: ClassProbabilities,
    /// Human-readable contributing factor, or "Unknown" when the index
    /// falls outside the catalog.
    pub contrib_factor_name: String,
}

/// One entry of the contributing-factor catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorEntry {
    pub id: usize,
    pub name: String,
}

/// Body of the `GET /factors` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorsResponse {
    pub factors: Vec<FactorEntry>,
}
