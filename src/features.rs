//! Feature derivation for the risk classifier.
//!
//! The scaler and classifier were fitted against a fixed 10-column layout.
//! Everything in this module exists to reproduce that layout exactly:
//! the derivation formulas and the column order are a contract with the
//! frozen artifacts, and reordering either side silently corrupts
//! predictions without any error being raised.

use ndarray::Array1;

/// Width of the model's input vector.
pub const FEATURE_COUNT: usize = 10;

/// Canonical column names, in fitted order. `selected_features.json` is
/// checked against this list at startup.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "LATITUDE",
    "LONGITUDE",
    "lat_long_interaction",
    "hour",
    "hour_weekend",
    "day_of_week",
    "is_weekend",
    "is_rush_hour",
    "rush_hour_weekday",
    "contrib_factor_encoded",
];

/// Secondary features computed from the raw request fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedFeatures {
    pub lat_long_interaction: f64,
    pub is_weekend: i64,
    pub is_rush_hour: i64,
    pub hour_weekend: i64,
    pub rush_hour_weekday: i64,
}

/// Computes the secondary features.
///
/// Rush hour covers 06:00-08:00 and 16:00-19:00 inclusive; the weekend
/// starts at `day_of_week == 5` (Saturday, with Monday as 0).
pub fn derive(lat: f64, lng: f64, hour: i64, day_of_week: i64) -> DerivedFeatures {
    let is_weekend = i64::from(day_of_week >= 5);
    let is_rush_hour = i64::from((6..=8).contains(&hour) || (16..=19).contains(&hour));

    DerivedFeatures {
        lat_long_interaction: lat * lng,
        is_weekend,
        is_rush_hour,
        hour_weekend: hour * is_weekend,
        rush_hour_weekday: is_rush_hour * (1 - is_weekend),
    }
}

/// Assembles the model input vector in fitted column order.
///
/// `contrib_factor` is the raw label-encoded index and is passed through
/// even when it falls outside the catalog; only the display name degrades
/// in that case.
pub fn feature_vector(
    lat: f64,
    lng: f64,
    hour: i64,
    day_of_week: i64,
    contrib_factor: i64,
) -> Array1<f64> {
    let d = derive(lat, lng, hour, day_of_week);

    Array1::from_vec(vec![
        lat,
        lng,
        d.lat_long_interaction,
        hour as f64,
        d.hour_weekend as f64,
        day_of_week as f64,
        d.is_weekend as f64,
        d.is_rush_hour as f64,
        d.rush_hour_weekday as f64,
        contrib_factor as f64,
    ])
}
