//! Z-score computation
//!
//! The LMS transform standardizes an observed value against the matched
//! reference cell's power (L), median (M), and coefficient of variation (S).
//! The indicator functions here resolve the matching cell and apply the
//! transform; no interpolation, no fallback rows.

use crate::error::GrowthError;
use crate::reference::{round_to_half_cm, GrowthStandards, Lms};
use crate::types::{Indicator, Regime, Sex};

/// The LMS transform.
///
/// Valid reference data guarantees `m > 0` and `s > 0` (enforced at load
/// time); malformed parameters produce a numeric fault here, not a
/// recoverable error. Callers supply a strictly positive `x`.
pub fn lms_zscore(x: f64, l: f64, m: f64, s: f64) -> f64 {
    if l == 0.0 {
        (x / m).ln() / s
    } else {
        ((x / m).powf(l) - 1.0) / (l * s)
    }
}

fn require_positive(value: f64, what: &str) -> Result<(), GrowthError> {
    if !(value > 0.0) || !value.is_finite() {
        return Err(GrowthError::InvalidMeasurement(format!(
            "{what} must be a positive number, got {value}"
        )));
    }
    Ok(())
}

fn age_row(
    standards: &GrowthStandards,
    indicator: Indicator,
    age_months: u32,
    sex: Sex,
) -> Result<Lms, GrowthError> {
    let table = match indicator {
        Indicator::WeightForAge => &standards.weight_for_age,
        Indicator::HeightForAge => &standards.height_for_age,
        Indicator::WeightForHeight => unreachable!("weight-for-height is height-indexed"),
    };
    table.get(age_months, sex).ok_or_else(|| {
        GrowthError::ReferenceNotFound(format!(
            "{indicator}: no row for age {age_months} months, sex {sex}"
        ))
    })
}

/// Weight-for-age Z-score: exact (age, sex) match in the age-indexed table.
pub fn weight_for_age(
    standards: &GrowthStandards,
    weight_kg: f64,
    age_months: u32,
    sex: Sex,
) -> Result<f64, GrowthError> {
    require_positive(weight_kg, "weight (kg)")?;
    let row = age_row(standards, Indicator::WeightForAge, age_months, sex)?;
    Ok(lms_zscore(weight_kg, row.l, row.m, row.s))
}

/// Height-for-age Z-score: exact (age, sex) match in the age-indexed table.
pub fn height_for_age(
    standards: &GrowthStandards,
    height_cm: f64,
    age_months: u32,
    sex: Sex,
) -> Result<f64, GrowthError> {
    require_positive(height_cm, "height (cm)")?;
    let row = age_row(standards, Indicator::HeightForAge, age_months, sex)?;
    Ok(lms_zscore(height_cm, row.l, row.m, row.s))
}

/// Weight-for-height Z-score.
///
/// The stature is binned to its 0.5 cm cell, the regime is selected from the
/// age (length under 24 months, height from 24), and the weight is scored
/// against the matching height-indexed row.
pub fn weight_for_height(
    standards: &GrowthStandards,
    weight_kg: f64,
    height_cm: f64,
    age_months: u32,
    sex: Sex,
) -> Result<f64, GrowthError> {
    require_positive(weight_kg, "weight (kg)")?;
    require_positive(height_cm, "height (cm)")?;

    let regime = Regime::for_age_months(age_months);
    let row = standards
        .weight_for_height
        .get(height_cm, sex, regime)
        .ok_or_else(|| {
            GrowthError::ReferenceNotFound(format!(
                "{}: no row for height {} cm, sex {sex}, {regime} regime",
                Indicator::WeightForHeight,
                round_to_half_cm(height_cm),
            ))
        })?;

    Ok(lms_zscore(weight_kg, row.l, row.m, row.s))
}
