//! Core types for the growth assessment engine
//!
//! This module defines the vocabulary shared by every stage: sex and
//! measurement-regime codes, indicator and status enums, the validated
//! measurement passed into the engine, and the combined assessment produced
//! by a pipeline run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::age;
use crate::error::GrowthError;

/// Upper bound of the age-indexed WHO reference tables, in months.
///
/// Ages above this have no reference row; lookups fail with
/// `ReferenceNotFound` rather than extrapolating.
pub const MAX_AGE_MONTHS: u32 = 60;

/// Age below which stature is measured recumbent (length regime), in months.
pub const RECUMBENT_AGE_LIMIT_MONTHS: u32 = 24;

/// Child sex as used by the WHO reference tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }

    /// Parse a sex code, accepting the canonical English codes and the
    /// source register's Indonesian codes. Input is trimmed and uppercased
    /// before matching.
    pub fn parse(code: &str) -> Result<Self, GrowthError> {
        match code.trim().to_uppercase().as_str() {
            "M" | "MALE" | "L" | "LAKI-LAKI" => Ok(Sex::Male),
            "F" | "FEMALE" | "P" | "PEREMPUAN" => Ok(Sex::Female),
            other => Err(GrowthError::UnknownSex(other.to_string())),
        }
    }
}

impl std::str::FromStr for Sex {
    type Err = GrowthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sex::parse(s)
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stature measurement regime.
///
/// WHO tabulates two parameter sets for the same nominal stature: recumbent
/// length for children under 24 months and standing height from 24 months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    Length,
    Height,
}

impl Regime {
    /// Select the regime for a given age in completed months.
    pub fn for_age_months(age_months: u32) -> Self {
        if age_months < RECUMBENT_AGE_LIMIT_MONTHS {
            Regime::Length
        } else {
            Regime::Height
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::Length => "length",
            Regime::Height => "height",
        }
    }

    /// Parse a regime code, accepting the reference table's single-letter
    /// flags (`L`/`H`) as well as the full words.
    pub fn parse(code: &str) -> Result<Self, GrowthError> {
        match code.trim().to_uppercase().as_str() {
            "L" | "LENGTH" => Ok(Regime::Length),
            "H" | "HEIGHT" => Ok(Regime::Height),
            other => Err(GrowthError::UnknownRegime(other.to_string())),
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Anthropometric indicator identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    WeightForAge,
    HeightForAge,
    WeightForHeight,
}

impl Indicator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Indicator::WeightForAge => "weight_for_age",
            Indicator::HeightForAge => "height_for_age",
            Indicator::WeightForHeight => "weight_for_height",
        }
    }
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Weight-for-age status, ordered from most deficient to most excess.
///
/// The scale has four bands: everything above +2 SD collapses into a single
/// above-normal label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightForAgeStatus {
    SeverelyUnderweight,
    Underweight,
    Normal,
    RiskOfExcessWeight,
}

impl WeightForAgeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightForAgeStatus::SeverelyUnderweight => "severely underweight",
            WeightForAgeStatus::Underweight => "underweight",
            WeightForAgeStatus::Normal => "normal",
            WeightForAgeStatus::RiskOfExcessWeight => "risk of excess weight",
        }
    }
}

impl std::fmt::Display for WeightForAgeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Height-for-age status, ordered from most deficient to most excess.
///
/// Four bands, like weight-for-age: everything above +2 SD is `Tall`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeightForAgeStatus {
    SeverelyStunted,
    Stunted,
    Normal,
    Tall,
}

impl HeightForAgeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeightForAgeStatus::SeverelyStunted => "severely stunted",
            HeightForAgeStatus::Stunted => "stunted",
            HeightForAgeStatus::Normal => "normal",
            HeightForAgeStatus::Tall => "tall",
        }
    }
}

impl std::fmt::Display for HeightForAgeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Weight-for-height status, ordered from most deficient to most excess.
///
/// This indicator keeps the full six-band scale above +2 SD, unlike the two
/// age-indexed indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightForHeightStatus {
    SevereAcuteMalnutrition,
    ModerateAcuteMalnutrition,
    GoodNutrition,
    RiskOfOverweight,
    Overweight,
    Obese,
}

impl WeightForHeightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightForHeightStatus::SevereAcuteMalnutrition => "severe acute malnutrition",
            WeightForHeightStatus::ModerateAcuteMalnutrition => "moderate acute malnutrition",
            WeightForHeightStatus::GoodNutrition => "good nutrition",
            WeightForHeightStatus::RiskOfOverweight => "risk of overweight",
            WeightForHeightStatus::Overweight => "overweight",
            WeightForHeightStatus::Obese => "obese",
        }
    }
}

impl std::fmt::Display for WeightForHeightStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Overall triage tier combined from the three indicator statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriageTier {
    Urgent,
    Watch,
    Normal,
}

impl TriageTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriageTier::Urgent => "urgent",
            TriageTier::Watch => "watch",
            TriageTier::Normal => "normal",
        }
    }
}

impl std::fmt::Display for TriageTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One validated observation of a child, as consumed by the engine.
///
/// Construct through [`Measurement::new`] so that positivity of weight and
/// height and the derived age are established up front. The engine treats
/// the value as read-only; persistence belongs to the record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    /// Child this observation belongs to
    pub child_id: Uuid,
    /// Child sex, from the child register
    pub sex: Sex,
    /// Observation date
    pub observed_at: NaiveDate,
    /// Age at observation in completed months
    pub age_months: u32,
    /// Body weight in kilograms (strictly positive)
    pub weight_kg: f64,
    /// Stature in centimeters (strictly positive)
    pub height_cm: f64,
}

impl Measurement {
    /// Build a measurement, deriving the age from the birth date and
    /// rejecting non-positive weight or height.
    pub fn new(
        child_id: Uuid,
        sex: Sex,
        birth_date: NaiveDate,
        observed_at: NaiveDate,
        weight_kg: f64,
        height_cm: f64,
    ) -> Result<Self, GrowthError> {
        if !(weight_kg > 0.0) || !weight_kg.is_finite() {
            return Err(GrowthError::InvalidMeasurement(format!(
                "weight must be a positive number of kilograms, got {weight_kg}"
            )));
        }
        if !(height_cm > 0.0) || !height_cm.is_finite() {
            return Err(GrowthError::InvalidMeasurement(format!(
                "height must be a positive number of centimeters, got {height_cm}"
            )));
        }

        Ok(Self {
            child_id,
            sex,
            observed_at,
            age_months: age::age_in_months_at(birth_date, observed_at),
            weight_kg,
            height_cm,
        })
    }
}

/// Measurement as it arrives at the crate boundary (CLI, FFI, batch files).
///
/// Carries the birth date instead of a precomputed age; `observed_at`
/// defaults to today and `child_id` to a fresh v4 id when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementInput {
    #[serde(default)]
    pub child_id: Option<Uuid>,
    pub sex: Sex,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub observed_at: Option<NaiveDate>,
    pub weight_kg: f64,
    pub height_cm: f64,
}

impl MeasurementInput {
    /// Validate and convert into an engine-ready [`Measurement`].
    pub fn into_measurement(self) -> Result<Measurement, GrowthError> {
        let observed_at = self.observed_at.unwrap_or_else(age::today);
        Measurement::new(
            self.child_id.unwrap_or_else(Uuid::new_v4),
            self.sex,
            self.birth_date,
            observed_at,
            self.weight_kg,
            self.height_cm,
        )
    }
}

/// Result of assessing one measurement against the growth standards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    /// The measurement this assessment was computed from
    pub measurement: Measurement,
    /// Weight-for-age Z-score
    pub z_weight_for_age: f64,
    /// Weight-for-age status band
    pub status_weight_for_age: WeightForAgeStatus,
    /// Height-for-age Z-score
    pub z_height_for_age: f64,
    /// Height-for-age status band
    pub status_height_for_age: HeightForAgeStatus,
    /// Weight-for-height Z-score
    pub z_weight_for_height: f64,
    /// Weight-for-height status band
    pub status_weight_for_height: WeightForHeightStatus,
    /// Combined triage tier
    pub triage: TriageTier,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sex_parse_codes() {
        assert_eq!(Sex::parse("M").unwrap(), Sex::Male);
        assert_eq!(Sex::parse("male").unwrap(), Sex::Male);
        assert_eq!(Sex::parse(" l ").unwrap(), Sex::Male);
        assert_eq!(Sex::parse("LAKI-LAKI").unwrap(), Sex::Male);
        assert_eq!(Sex::parse("F").unwrap(), Sex::Female);
        assert_eq!(Sex::parse("p").unwrap(), Sex::Female);
        assert_eq!(Sex::parse("Perempuan").unwrap(), Sex::Female);

        assert!(matches!(Sex::parse("x"), Err(GrowthError::UnknownSex(_))));
    }

    #[test]
    fn test_regime_parse_codes() {
        assert_eq!(Regime::parse("L").unwrap(), Regime::Length);
        assert_eq!(Regime::parse("h").unwrap(), Regime::Height);
        assert_eq!(Regime::parse("Height").unwrap(), Regime::Height);
        assert!(matches!(
            Regime::parse("standing"),
            Err(GrowthError::UnknownRegime(_))
        ));
    }

    #[test]
    fn test_regime_switches_at_24_months() {
        assert_eq!(Regime::for_age_months(0), Regime::Length);
        assert_eq!(Regime::for_age_months(23), Regime::Length);
        assert_eq!(Regime::for_age_months(24), Regime::Height);
        assert_eq!(Regime::for_age_months(60), Regime::Height);
    }

    #[test]
    fn test_status_severity_ordering() {
        assert!(WeightForAgeStatus::SeverelyUnderweight < WeightForAgeStatus::Underweight);
        assert!(WeightForAgeStatus::Underweight < WeightForAgeStatus::Normal);
        assert!(HeightForAgeStatus::SeverelyStunted < HeightForAgeStatus::Stunted);
        assert!(
            WeightForHeightStatus::SevereAcuteMalnutrition
                < WeightForHeightStatus::ModerateAcuteMalnutrition
        );
        assert!(WeightForHeightStatus::Overweight < WeightForHeightStatus::Obese);
    }

    #[test]
    fn test_measurement_rejects_nonpositive_values() {
        let birth = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap();
        let observed = NaiveDate::from_ymd_opt(2023, 7, 20).unwrap();

        let zero_weight =
            Measurement::new(Uuid::new_v4(), Sex::Male, birth, observed, 0.0, 65.0);
        assert!(matches!(
            zero_weight,
            Err(GrowthError::InvalidMeasurement(_))
        ));

        let negative_height =
            Measurement::new(Uuid::new_v4(), Sex::Female, birth, observed, 6.5, -1.0);
        assert!(matches!(
            negative_height,
            Err(GrowthError::InvalidMeasurement(_))
        ));

        let nan_weight =
            Measurement::new(Uuid::new_v4(), Sex::Male, birth, observed, f64::NAN, 65.0);
        assert!(matches!(nan_weight, Err(GrowthError::InvalidMeasurement(_))));
    }

    #[test]
    fn test_measurement_derives_age() {
        let birth = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap();
        let observed = NaiveDate::from_ymd_opt(2023, 6, 10).unwrap();

        let m = Measurement::new(Uuid::new_v4(), Sex::Male, birth, observed, 7.2, 64.0)
            .unwrap();
        assert_eq!(m.age_months, 4);
    }

    #[test]
    fn test_measurement_input_defaults() {
        let input = MeasurementInput {
            child_id: None,
            sex: Sex::Female,
            birth_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            observed_at: Some(NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()),
            weight_kg: 7.0,
            height_cm: 66.0,
        };

        let m = input.into_measurement().unwrap();
        assert_eq!(m.age_months, 6);
        assert_eq!(m.sex, Sex::Female);
    }

    #[test]
    fn test_measurement_input_json_round_trip() {
        let json = r#"{
            "sex": "female",
            "birth_date": "2024-03-01",
            "observed_at": "2024-09-15",
            "weight_kg": 7.1,
            "height_cm": 66.5
        }"#;

        let input: MeasurementInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.sex, Sex::Female);
        assert!(input.child_id.is_none());

        let m = input.into_measurement().unwrap();
        assert_eq!(m.age_months, 6);
    }
}
