//! Record-store contracts
//!
//! The engine does not persist anything itself. These types define what the
//! external record store exchanges with it: the child register entry and
//! the denormalized measurement row that caches the engine's output (raw
//! values alongside rounded Z-scores and status labels). The engine never
//! reads its own prior outputs back.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GrowthError;
use crate::posyandu::{self, ServiceUnit};
use crate::types::{
    Assessment, HeightForAgeStatus, Sex, TriageTier, WeightForAgeStatus,
    WeightForHeightStatus,
};
use crate::age;

/// One child in the register
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildRecord {
    pub id: Uuid,
    pub name: String,
    pub birth_date: NaiveDate,
    pub sex: Sex,
    pub mother_name: String,
    pub village: String,
    pub hamlet: String,
    pub address: String,
    pub rt: u8,
    pub rw: u8,
    /// Service unit the child is registered under, derived from RT/RW
    pub service_unit: ServiceUnit,
}

impl ChildRecord {
    /// Build a register entry, assigning a fresh id and deriving the
    /// service unit from the RT/RW pair. Fails when the pair is outside
    /// the service map.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        birth_date: NaiveDate,
        sex: Sex,
        mother_name: impl Into<String>,
        village: impl Into<String>,
        hamlet: impl Into<String>,
        address: impl Into<String>,
        rt: u8,
        rw: u8,
    ) -> Result<Self, GrowthError> {
        let service_unit = posyandu::service_unit_for(rt, rw)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            birth_date,
            sex,
            mother_name: mother_name.into(),
            village: village.into(),
            hamlet: hamlet.into(),
            address: address.into(),
            rt,
            rw,
            service_unit,
        })
    }

    /// Age in completed months at a given date.
    pub fn age_in_months_at(&self, as_of: NaiveDate) -> u32 {
        age::age_in_months_at(self.birth_date, as_of)
    }
}

/// Denormalized measurement row as kept by the record store.
///
/// Z-scores are rounded to two decimals for storage; the labels and tier
/// are computed from the unrounded scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub child_id: Uuid,
    pub observed_at: NaiveDate,
    pub age_months: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub z_weight_for_age: f64,
    pub status_weight_for_age: WeightForAgeStatus,
    pub z_height_for_age: f64,
    pub status_height_for_age: HeightForAgeStatus,
    pub z_weight_for_height: f64,
    pub status_weight_for_height: WeightForHeightStatus,
    pub triage: TriageTier,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl MeasurementRecord {
    /// Flatten an assessment into the row the store persists.
    pub fn from_assessment(assessment: &Assessment) -> Self {
        let m = &assessment.measurement;
        Self {
            child_id: m.child_id,
            observed_at: m.observed_at,
            age_months: m.age_months,
            weight_kg: m.weight_kg,
            height_cm: m.height_cm,
            z_weight_for_age: round2(assessment.z_weight_for_age),
            status_weight_for_age: assessment.status_weight_for_age,
            z_height_for_age: round2(assessment.z_height_for_age),
            status_height_for_age: assessment.status_height_for_age,
            z_weight_for_height: round2(assessment.z_weight_for_height),
            status_weight_for_height: assessment.status_weight_for_height,
            triage: assessment.triage,
        }
    }
}
