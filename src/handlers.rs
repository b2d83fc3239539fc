use crate::errors::{AppError, ResultExt};
use crate::factors::{factor_name, CONTRIB_FACTORS};
use crate::features;
use crate::model::{RiskArtifacts, RiskLevel};
use crate::models::*;
use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
///
/// The artifacts are loaded once at startup and never written afterwards,
/// so they are shared across requests without locking.
#[derive(Clone)]
pub struct AppState {
    /// Frozen scaler, classifier, and feature-name list.
    pub artifacts: Arc<RiskArtifacts>,
}

/// GET /
///
/// Liveness banner.
pub async fn root() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "message": "NYC Accident Risk Predictor API",
            "status": "running"
        })),
    )
}

/// GET /health
///
/// Static health check; does not touch the model artifacts.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// GET /factors
///
/// Returns the fixed contributing-factor catalog in encoding order.
pub async fn list_factors() -> Json<FactorsResponse> {
    let factors = CONTRIB_FACTORS
        .iter()
        .enumerate()
        .map(|(id, name)| FactorEntry {
            id,
            name: (*name).to_string(),
        })
        .collect();

    Json(FactorsResponse { factors })
}

/// POST /predict
///
/// Scores one location/time combination against the frozen model.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `req` - JSON body with the coordinate and optional temporal fields.
///
/// # Returns
///
/// * `Result<Json<PredictionResponse>, AppError>` - The risk level with its
///   probability breakdown, or an error.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PredictionRequest>,
) -> Result<Json<PredictionResponse>, AppError> {
    tracing::info!(
        "POST /predict - lat: {}, lng: {}, hour: {}, day_of_week: {}",
        req.lat,
        req.lng,
        req.hour,
        req.day_of_week
    );

    let response = run_prediction(&state.artifacts, &req)?;

    tracing::info!(
        "Prediction: level={}, score={:.3}",
        response.level,
        response.score
    );

    Ok(Json(response))
}

/// Full request-to-response pipeline: derive features, scale, classify,
/// and shape the output. Pure in the request plus the frozen artifacts.
pub fn run_prediction(
    artifacts: &RiskArtifacts,
    req: &PredictionRequest,
) -> Result<PredictionResponse, AppError> {
    // The raw index feeds the model even when it is outside the catalog;
    // only the display name degrades to "Unknown" in that case.
    let contrib_factor = req.contrib_factor.unwrap_or(0);

    let x = features::feature_vector(req.lat, req.lng, req.hour, req.day_of_week, contrib_factor);

    let scaled = artifacts
        .scaler
        .transform(&x)
        .context("scaling feature vector")?;

    let (label, proba) = artifacts
        .classifier
        .predict(&scaled)
        .context("querying classifier")?;

    let score = proba.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Ok(PredictionResponse {
        lat: req.lat,
        lng: req.lng,
        level: RiskLevel::from_label(label).as_str().to_string(),
        score,
        probabilities: ClassProbabilities {
            low: round_pct(proba[0]),
            medium: round_pct(proba[1]),
            high: round_pct(proba[2]),
        },
        contrib_factor_name: factor_name(contrib_factor).to_string(),
    })
}

/// Converts a probability fraction to a percentage with one decimal place.
fn round_pct(p: f64) -> f64 {
    (p * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_pct_keeps_one_decimal() {
        assert_eq!(round_pct(0.12345), 12.3);
        assert_eq!(round_pct(0.12356), 12.4);
        assert_eq!(round_pct(0.0), 0.0);
        assert_eq!(round_pct(1.0), 100.0);
    }
}
