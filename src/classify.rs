//! Status classification and triage
//!
//! Each classifier is a total function from a Z-score to one label: a ladder
//! of thresholds evaluated low to high with early return. The two
//! age-indexed indicators use four bands (everything above +2 SD is one
//! label); weight-for-height keeps the full six-band scale. The asymmetry
//! mirrors the national anthropometric standard and is deliberate.

use crate::types::{
    HeightForAgeStatus, TriageTier, WeightForAgeStatus, WeightForHeightStatus,
};

/// Classify a weight-for-age Z-score.
pub fn weight_for_age_status(z: f64) -> WeightForAgeStatus {
    if z < -3.0 {
        WeightForAgeStatus::SeverelyUnderweight
    } else if z < -2.0 {
        WeightForAgeStatus::Underweight
    } else if z <= 2.0 {
        WeightForAgeStatus::Normal
    } else {
        WeightForAgeStatus::RiskOfExcessWeight
    }
}

/// Classify a height-for-age Z-score.
pub fn height_for_age_status(z: f64) -> HeightForAgeStatus {
    if z < -3.0 {
        HeightForAgeStatus::SeverelyStunted
    } else if z < -2.0 {
        HeightForAgeStatus::Stunted
    } else if z <= 2.0 {
        HeightForAgeStatus::Normal
    } else {
        HeightForAgeStatus::Tall
    }
}

/// Classify a weight-for-height Z-score.
pub fn weight_for_height_status(z: f64) -> WeightForHeightStatus {
    if z < -3.0 {
        WeightForHeightStatus::SevereAcuteMalnutrition
    } else if z < -2.0 {
        WeightForHeightStatus::ModerateAcuteMalnutrition
    } else if z <= 2.0 {
        WeightForHeightStatus::GoodNutrition
    } else if z <= 3.0 {
        WeightForHeightStatus::RiskOfOverweight
    } else if z <= 5.0 {
        WeightForHeightStatus::Overweight
    } else {
        WeightForHeightStatus::Obese
    }
}

/// Combine the three indicator statuses into one triage tier.
///
/// Precedence, evaluated in order, highest wins:
/// 1. Urgent: severe acute malnutrition, or severe stunting.
/// 2. Watch: either underweight band, moderate stunting, or moderate acute
///    malnutrition.
/// 3. Normal: everything else.
pub fn triage(
    weight_for_age: WeightForAgeStatus,
    height_for_age: HeightForAgeStatus,
    weight_for_height: WeightForHeightStatus,
) -> TriageTier {
    if weight_for_height == WeightForHeightStatus::SevereAcuteMalnutrition
        || height_for_age == HeightForAgeStatus::SeverelyStunted
    {
        return TriageTier::Urgent;
    }

    if matches!(
        weight_for_age,
        WeightForAgeStatus::SeverelyUnderweight | WeightForAgeStatus::Underweight
    ) || height_for_age == HeightForAgeStatus::Stunted
        || weight_for_height == WeightForHeightStatus::ModerateAcuteMalnutrition
    {
        return TriageTier::Watch;
    }

    TriageTier::Normal
}
