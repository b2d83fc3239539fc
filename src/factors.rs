//! Contributing-factor catalog.
//!
//! The offline training pipeline label-encoded the crash dataset's
//! "contributing factor" column; the integer index of each entry below is
//! the encoding the model was fitted against. The order is frozen and must
//! match that encoder; appending is safe only together with a retrain.

/// The 20 contributing-factor categories, in label-encoder order.
pub const CONTRIB_FACTORS: [&str; 20] = [
    "Unspecified",
    "Driver Inattention/Distraction",
    "Failure to Yield Right-of-Way",
    "Following Too Closely",
    "Passing or Lane Usage Improper",
    "Unsafe Speed",
    "Traffic Control Disregarded",
    "Other Vehicular",
    "Backing Unsafely",
    "Turning Improperly",
    "Pavement Slippery",
    "Reaction to Uninvolved Vehicle",
    "Pedestrian/Bicyclist/Other Pedestrian Error/Confusion",
    "View Obstructed/Limited",
    "Aggressive Driving/Road Rage",
    "Alcohol Involvement",
    "Driver Inexperience",
    "Fatigued/Drowsy",
    "Lost Consciousness",
    "Oversized Vehicle",
];

/// Resolves a factor index to its human-readable name.
///
/// Indices outside `0..20` (including negatives) resolve to `"Unknown"`
/// rather than failing; the raw index still reaches the model unchanged.
pub fn factor_name(index: i64) -> &'static str {
    usize::try_from(index)
        .ok()
        .and_then(|i| CONTRIB_FACTORS.get(i).copied())
        .unwrap_or("Unknown")
}
