//! Frozen model artifacts: the fitted feature scaler and the multinomial
//! logistic classifier, plus the loader that brings them up at startup.
//!
//! The artifacts are exported by the offline training pipeline as JSON
//! (`scaler.json`, `risk_classifier.json`, `selected_features.json`). This
//! module only applies them; it never fits, refits, or mutates anything.

use std::fs;
use std::path::Path;

use anyhow::Context;
use ndarray::{Array1, Array2};
use serde::Deserialize;
use thiserror::Error;

use crate::features::{FEATURE_COUNT, FEATURE_NAMES};

/// Number of risk classes the classifier was trained on.
pub const N_CLASSES: usize = 3;

/// Errors raised while applying the frozen artifacts.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("feature dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("malformed artifact: {0}")]
    MalformedArtifact(String),
}

/// Discretized classifier output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Unknown,
}

impl RiskLevel {
    /// Maps a class label to its level name. Labels outside 0/1/2 fall back
    /// to `Unknown` instead of failing; a 3-class artifact should never
    /// produce one, but the artifact is external input.
    pub fn from_label(label: i64) -> Self {
        match label {
            0 => RiskLevel::Low,
            1 => RiskLevel::Medium,
            2 => RiskLevel::High,
            _ => RiskLevel::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Unknown => "unknown",
        }
    }
}

/// Pre-fitted z-score transform: `(x - mean) / scale` per column.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// Builds a scaler from fitted parameters.
    ///
    /// Rejects mismatched lengths and zero scale entries up front so that
    /// `transform` can never divide by zero at request time.
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, InferenceError> {
        if mean.len() != scale.len() {
            return Err(InferenceError::MalformedArtifact(format!(
                "scaler mean has {} entries but scale has {}",
                mean.len(),
                scale.len()
            )));
        }
        if let Some(i) = scale.iter().position(|s| *s == 0.0 || !s.is_finite()) {
            return Err(InferenceError::MalformedArtifact(format!(
                "scaler scale[{}] is zero or non-finite",
                i
            )));
        }

        Ok(Self {
            mean: Array1::from_vec(mean),
            scale: Array1::from_vec(scale),
        })
    }

    /// Number of columns the scaler was fitted on.
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Applies the fitted transform to one feature vector.
    pub fn transform(&self, x: &Array1<f64>) -> Result<Array1<f64>, InferenceError> {
        if x.len() != self.mean.len() {
            return Err(InferenceError::DimensionMismatch {
                expected: self.mean.len(),
                got: x.len(),
            });
        }

        Ok((x - &self.mean) / &self.scale)
    }
}

/// Fitted multinomial logistic regression: `softmax(W·x + b)`.
///
/// `classes` carries the training labels in coefficient-row order; the
/// predicted label is looked up there rather than assumed to be the row
/// index, matching the exporter's conventions.
#[derive(Debug, Clone)]
pub struct SoftmaxClassifier {
    classes: Vec<i64>,
    coefficients: Array2<f64>,
    intercepts: Array1<f64>,
}

impl SoftmaxClassifier {
    /// Builds a classifier from fitted parameters, validating shape
    /// consistency between the class list, coefficient matrix, and
    /// intercept vector.
    pub fn new(
        classes: Vec<i64>,
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    ) -> Result<Self, InferenceError> {
        let n_classes = classes.len();
        if coefficients.len() != n_classes || intercepts.len() != n_classes {
            return Err(InferenceError::MalformedArtifact(format!(
                "classifier has {} classes but {} coefficient rows and {} intercepts",
                n_classes,
                coefficients.len(),
                intercepts.len()
            )));
        }

        let n_features = coefficients.first().map(Vec::len).unwrap_or(0);
        if coefficients.iter().any(|row| row.len() != n_features) {
            return Err(InferenceError::MalformedArtifact(
                "classifier coefficient rows have unequal lengths".to_string(),
            ));
        }

        let flat: Vec<f64> = coefficients.into_iter().flatten().collect();
        let coefficients = Array2::from_shape_vec((n_classes, n_features), flat)
            .map_err(|e| InferenceError::MalformedArtifact(e.to_string()))?;

        Ok(Self {
            classes,
            coefficients,
            intercepts: Array1::from_vec(intercepts),
        })
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Number of input columns the classifier was fitted on.
    pub fn n_features(&self) -> usize {
        self.coefficients.ncols()
    }

    /// Class probability distribution for one (already scaled) vector.
    pub fn predict_proba(&self, x: &Array1<f64>) -> Result<Array1<f64>, InferenceError> {
        if x.len() != self.coefficients.ncols() {
            return Err(InferenceError::DimensionMismatch {
                expected: self.coefficients.ncols(),
                got: x.len(),
            });
        }

        let logits = self.coefficients.dot(x) + &self.intercepts;
        Ok(softmax(&logits))
    }

    /// Predicted class label plus the full probability distribution.
    ///
    /// Ties resolve to the earliest class in stored order (argmax takes the
    /// first maximum, as the training-side tooling does).
    pub fn predict(&self, x: &Array1<f64>) -> Result<(i64, Array1<f64>), InferenceError> {
        let proba = self.predict_proba(x)?;

        let mut argmax = 0;
        let mut best = f64::NEG_INFINITY;
        for (i, &p) in proba.iter().enumerate() {
            if p > best {
                best = p;
                argmax = i;
            }
        }

        Ok((self.classes[argmax], proba))
    }
}

/// Numerically stable softmax (max-subtracted before exponentiation).
fn softmax(z: &Array1<f64>) -> Array1<f64> {
    let max_z = z.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp_z = z.mapv(|v| (v - max_z).exp());
    let sum = exp_z.sum();
    exp_z / sum
}

#[derive(Debug, Deserialize)]
struct ScalerFile {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct ClassifierFile {
    classes: Vec<i64>,
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

/// The three frozen artifacts, loaded once at startup and shared read-only
/// for the process lifetime.
#[derive(Debug, Clone)]
pub struct RiskArtifacts {
    pub scaler: StandardScaler,
    pub classifier: SoftmaxClassifier,
    /// Feature names in fitted order; kept for debugging, not computation.
    pub feature_names: Vec<String>,
}

impl RiskArtifacts {
    /// Loads and cross-validates `scaler.json`, `risk_classifier.json`, and
    /// `selected_features.json` from the models directory.
    ///
    /// Any missing file, parse failure, or shape inconsistency is fatal:
    /// the service must not come up with a partial or mismatched model.
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        let scaler_path = dir.join("scaler.json");
        let raw: ScalerFile = serde_json::from_str(
            &fs::read_to_string(&scaler_path)
                .with_context(|| format!("reading {}", scaler_path.display()))?,
        )
        .with_context(|| format!("parsing {}", scaler_path.display()))?;
        let scaler = StandardScaler::new(raw.mean, raw.scale)
            .with_context(|| format!("validating {}", scaler_path.display()))?;

        let classifier_path = dir.join("risk_classifier.json");
        let raw: ClassifierFile = serde_json::from_str(
            &fs::read_to_string(&classifier_path)
                .with_context(|| format!("reading {}", classifier_path.display()))?,
        )
        .with_context(|| format!("parsing {}", classifier_path.display()))?;
        let classifier = SoftmaxClassifier::new(raw.classes, raw.coefficients, raw.intercepts)
            .with_context(|| format!("validating {}", classifier_path.display()))?;

        let names_path = dir.join("selected_features.json");
        let feature_names: Vec<String> = serde_json::from_str(
            &fs::read_to_string(&names_path)
                .with_context(|| format!("reading {}", names_path.display()))?,
        )
        .with_context(|| format!("parsing {}", names_path.display()))?;

        if scaler.n_features() != FEATURE_COUNT {
            anyhow::bail!(
                "scaler was fitted on {} features, service derives {}",
                scaler.n_features(),
                FEATURE_COUNT
            );
        }
        if classifier.n_features() != FEATURE_COUNT {
            anyhow::bail!(
                "classifier was fitted on {} features, service derives {}",
                classifier.n_features(),
                FEATURE_COUNT
            );
        }
        if classifier.n_classes() != N_CLASSES {
            anyhow::bail!(
                "classifier has {} classes, expected {}",
                classifier.n_classes(),
                N_CLASSES
            );
        }
        if feature_names.len() != FEATURE_COUNT {
            anyhow::bail!(
                "selected_features.json lists {} features, expected {}",
                feature_names.len(),
                FEATURE_COUNT
            );
        }

        // Column order is the whole contract with the artifacts; a rename in
        // the export is worth a warning even though only the count is fatal.
        for (i, (got, expected)) in feature_names.iter().zip(FEATURE_NAMES.iter()).enumerate() {
            if got != expected {
                tracing::warn!(
                    "feature name mismatch at column {}: artifact says {:?}, service derives {:?}",
                    i,
                    got,
                    expected
                );
            }
        }

        Ok(Self {
            scaler,
            classifier,
            feature_names,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    fn sample_classifier() -> SoftmaxClassifier {
        SoftmaxClassifier::new(
            vec![0, 1, 2],
            vec![
                vec![0.5, -0.2, 0.1],
                vec![-0.3, 0.4, 0.0],
                vec![0.1, 0.1, -0.6],
            ],
            vec![0.2, -0.1, 0.0],
        )
        .unwrap()
    }

    #[test]
    fn scaler_applies_zscore_transform() {
        let scaler = StandardScaler::new(vec![1.0, 2.0], vec![2.0, 4.0]).unwrap();
        let out = scaler.transform(&arr1(&[3.0, 2.0])).unwrap();

        assert!((out[0] - 1.0).abs() < 1e-12);
        assert!((out[1] - 0.0).abs() < 1e-12);
    }

    #[test]
    fn scaler_rejects_zero_scale() {
        let err = StandardScaler::new(vec![0.0, 0.0], vec![1.0, 0.0]).unwrap_err();
        assert!(matches!(err, InferenceError::MalformedArtifact(_)));
    }

    #[test]
    fn scaler_rejects_wrong_width_input() {
        let scaler = StandardScaler::new(vec![0.0, 0.0], vec![1.0, 1.0]).unwrap();
        let err = scaler.transform(&arr1(&[1.0])).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::DimensionMismatch { expected: 2, got: 1 }
        ));
    }

    #[test]
    fn probabilities_sum_to_one() {
        let clf = sample_classifier();
        let proba = clf.predict_proba(&arr1(&[1.0, -2.0, 0.5])).unwrap();

        assert_eq!(proba.len(), 3);
        assert!((proba.sum() - 1.0).abs() < 1e-9);
        assert!(proba.iter().all(|p| *p > 0.0 && *p < 1.0));
    }

    #[test]
    fn predict_returns_label_of_largest_probability() {
        let clf = sample_classifier();
        let x = arr1(&[1.0, -2.0, 0.5]);
        let (label, proba) = clf.predict(&x).unwrap();

        let max = proba.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let argmax = proba.iter().position(|p| *p == max).unwrap();
        assert_eq!(label, argmax as i64);
    }

    #[test]
    fn predict_looks_label_up_in_class_list() {
        // Third row dominates regardless of input; its stored label is 7,
        // which the level mapping then degrades to "unknown".
        let clf = SoftmaxClassifier::new(
            vec![0, 1, 7],
            vec![vec![0.0, 0.0], vec![0.0, 0.0], vec![0.0, 0.0]],
            vec![0.0, 0.0, 50.0],
        )
        .unwrap();

        let (label, _) = clf.predict(&arr1(&[0.3, -0.3])).unwrap();
        assert_eq!(label, 7);
        assert_eq!(RiskLevel::from_label(label), RiskLevel::Unknown);
    }

    #[test]
    fn classifier_rejects_ragged_coefficients() {
        let err = SoftmaxClassifier::new(
            vec![0, 1],
            vec![vec![1.0, 2.0], vec![1.0]],
            vec![0.0, 0.0],
        )
        .unwrap_err();
        assert!(matches!(err, InferenceError::MalformedArtifact(_)));
    }

    #[test]
    fn classifier_rejects_row_count_mismatch() {
        let err = SoftmaxClassifier::new(
            vec![0, 1, 2],
            vec![vec![1.0], vec![2.0]],
            vec![0.0, 0.0, 0.0],
        )
        .unwrap_err();
        assert!(matches!(err, InferenceError::MalformedArtifact(_)));
    }

    #[test]
    fn level_mapping_is_fixed() {
        assert_eq!(RiskLevel::from_label(0).as_str(), "low");
        assert_eq!(RiskLevel::from_label(1).as_str(), "medium");
        assert_eq!(RiskLevel::from_label(2).as_str(), "high");
        assert_eq!(RiskLevel::from_label(3).as_str(), "unknown");
        assert_eq!(RiskLevel::from_label(-1).as_str(), "unknown");
    }

    #[test]
    fn softmax_is_stable_for_large_logits() {
        let proba = softmax(&arr1(&[1000.0, 999.0, 998.0]));
        assert!((proba.sum() - 1.0).abs() < 1e-9);
        assert!(proba[0] > proba[1] && proba[1] > proba[2]);
    }
}
