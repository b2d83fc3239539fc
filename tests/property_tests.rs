/// Property-based tests using proptest
/// Tests invariants that should hold for every valid prediction request
use proptest::prelude::*;

use accident_risk_api::factors::{factor_name, CONTRIB_FACTORS};
use accident_risk_api::features::{derive, feature_vector, FEATURE_COUNT, FEATURE_NAMES};
use accident_risk_api::handlers::run_prediction;
use accident_risk_api::model::{RiskArtifacts, SoftmaxClassifier, StandardScaler};
use accident_risk_api::models::PredictionRequest;

/// Small but non-trivial artifacts so the distributions actually move with
/// the inputs.
fn test_artifacts() -> RiskArtifacts {
    RiskArtifacts {
        scaler: StandardScaler::new(
            vec![40.72, -73.92, -3010.8, 13.2, 3.6, 3.0, 0.27, 0.31, 0.24, 3.1],
            vec![0.08, 0.07, 7.4, 5.9, 6.9, 2.0, 0.44, 0.46, 0.43, 4.7],
        )
        .unwrap(),
        classifier: SoftmaxClassifier::new(
            vec![0, 1, 2],
            vec![
                vec![0.2, -0.2, 0.1, -0.3, -0.1, -0.04, -0.15, -0.28, -0.2, -0.09],
                vec![-0.05, 0.07, -0.02, 0.1, 0.03, 0.02, 0.05, 0.08, 0.06, 0.02],
                vec![-0.15, 0.13, -0.08, 0.2, 0.07, 0.02, 0.1, 0.2, 0.14, 0.07],
            ],
            vec![0.5, 0.1, -0.6],
        )
        .unwrap(),
        feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
    }
}

// Property: derived flags follow their truth tables over the full domain
proptest! {
    #[test]
    fn weekend_flag_matches_day_of_week(day_of_week in 0i64..=6) {
        let d = derive(40.7, -73.9, 12, day_of_week);
        let expected = i64::from(day_of_week == 5 || day_of_week == 6);
        prop_assert_eq!(d.is_weekend, expected);
    }

    #[test]
    fn rush_hour_flag_matches_hour(hour in 0i64..=23) {
        let d = derive(40.7, -73.9, hour, 0);
        let expected = i64::from((6..=8).contains(&hour) || (16..=19).contains(&hour));
        prop_assert_eq!(d.is_rush_hour, expected);
    }

    #[test]
    fn rush_hour_weekday_is_conjunction(hour in 0i64..=23, day_of_week in 0i64..=6) {
        let d = derive(40.7, -73.9, hour, day_of_week);
        prop_assert_eq!(
            d.rush_hour_weekday,
            d.is_rush_hour * (1 - d.is_weekend)
        );
        prop_assert_eq!(d.hour_weekend, hour * d.is_weekend);
    }
}

// Property: the feature vector keeps its width and tail position
proptest! {
    #[test]
    fn vector_width_and_factor_position_are_stable(
        lat in -90.0f64..=90.0,
        lng in -180.0f64..=180.0,
        hour in 0i64..=23,
        day_of_week in 0i64..=6,
        contrib in -5i64..=60,
    ) {
        let v = feature_vector(lat, lng, hour, day_of_week, contrib);
        prop_assert_eq!(v.len(), FEATURE_COUNT);
        prop_assert_eq!(v[0], lat);
        prop_assert_eq!(v[1], lng);
        prop_assert_eq!(v[9], contrib as f64);
    }
}

// Property: factor-name lookup never panics and respects the catalog bounds
proptest! {
    #[test]
    fn factor_name_total_over_i64(index in any::<i64>()) {
        let name = factor_name(index);
        if (0..20).contains(&index) {
            prop_assert_eq!(name, CONTRIB_FACTORS[index as usize]);
        } else {
            prop_assert_eq!(name, "Unknown");
        }
    }
}

// Property: response invariants hold for every valid request
proptest! {
    #[test]
    fn probabilities_sum_to_one_hundred(
        lat in -90.0f64..=90.0,
        lng in -180.0f64..=180.0,
        hour in 0i64..=23,
        day_of_week in 0i64..=6,
        contrib in 0i64..=40,
    ) {
        let artifacts = test_artifacts();
        let req = PredictionRequest { lat, lng, hour, day_of_week, contrib_factor: Some(contrib) };
        let resp = run_prediction(&artifacts, &req).unwrap();

        let sum = resp.probabilities.low + resp.probabilities.medium + resp.probabilities.high;
        // Three one-decimal roundings can drift at most 0.05 each
        prop_assert!((sum - 100.0).abs() <= 0.15 + 1e-9, "sum = {}", sum);
    }

    #[test]
    fn score_is_the_maximum_probability(
        lat in -90.0f64..=90.0,
        lng in -180.0f64..=180.0,
        hour in 0i64..=23,
        day_of_week in 0i64..=6,
    ) {
        let artifacts = test_artifacts();
        let req = PredictionRequest { lat, lng, hour, day_of_week, contrib_factor: None };
        let resp = run_prediction(&artifacts, &req).unwrap();

        let max_pct = resp
            .probabilities
            .low
            .max(resp.probabilities.medium)
            .max(resp.probabilities.high);

        // score is the pre-rounding fraction; rounding it the same way must
        // reproduce the largest displayed percentage
        prop_assert!(resp.score > 0.0 && resp.score <= 1.0);
        prop_assert_eq!((resp.score * 1000.0).round() / 10.0, max_pct);
    }

    #[test]
    fn level_is_always_in_the_fixed_set(
        lat in -90.0f64..=90.0,
        lng in -180.0f64..=180.0,
        hour in 0i64..=23,
        day_of_week in 0i64..=6,
        contrib in 0i64..=19,
    ) {
        let artifacts = test_artifacts();
        let req = PredictionRequest { lat, lng, hour, day_of_week, contrib_factor: Some(contrib) };
        let resp = run_prediction(&artifacts, &req).unwrap();

        prop_assert!(["low", "medium", "high", "unknown"].contains(&resp.level.as_str()));
        prop_assert_eq!(resp.contrib_factor_name, CONTRIB_FACTORS[contrib as usize]);
    }

    #[test]
    fn identical_requests_are_idempotent(
        lat in -90.0f64..=90.0,
        lng in -180.0f64..=180.0,
        hour in 0i64..=23,
        day_of_week in 0i64..=6,
    ) {
        let artifacts = test_artifacts();
        let req = PredictionRequest { lat, lng, hour, day_of_week, contrib_factor: Some(3) };

        let a = run_prediction(&artifacts, &req).unwrap();
        let b = run_prediction(&artifacts, &req).unwrap();
        prop_assert_eq!(a, b);
    }
}
