//! Assessment orchestration
//!
//! This module provides the public entry points for assessing a measurement:
//! Z-score computation for all three indicators, status classification, and
//! the combined triage tier. The stateful [`GrowthEngine`] owns the loaded
//! reference standards for callers that assess many measurements.

use std::path::Path;

use tracing::debug;

use crate::classify;
use crate::error::GrowthError;
use crate::reference::GrowthStandards;
use crate::types::{Assessment, Measurement};
use crate::zscore;

/// Assess one measurement against the growth standards.
///
/// Stages:
/// 1. Weight-for-age, height-for-age, weight-for-height Z-scores
/// 2. Per-indicator status classification
/// 3. Combined triage tier
///
/// Any indicator failure (missing reference row, invalid measurement)
/// aborts the whole assessment; no partial result is produced.
pub fn assess(
    standards: &GrowthStandards,
    measurement: &Measurement,
) -> Result<Assessment, GrowthError> {
    let z_weight_for_age = zscore::weight_for_age(
        standards,
        measurement.weight_kg,
        measurement.age_months,
        measurement.sex,
    )?;
    let z_height_for_age = zscore::height_for_age(
        standards,
        measurement.height_cm,
        measurement.age_months,
        measurement.sex,
    )?;
    let z_weight_for_height = zscore::weight_for_height(
        standards,
        measurement.weight_kg,
        measurement.height_cm,
        measurement.age_months,
        measurement.sex,
    )?;

    let status_weight_for_age = classify::weight_for_age_status(z_weight_for_age);
    let status_height_for_age = classify::height_for_age_status(z_height_for_age);
    let status_weight_for_height = classify::weight_for_height_status(z_weight_for_height);

    let triage = classify::triage(
        status_weight_for_age,
        status_height_for_age,
        status_weight_for_height,
    );

    Ok(Assessment {
        measurement: measurement.clone(),
        z_weight_for_age,
        status_weight_for_age,
        z_height_for_age,
        status_height_for_age,
        z_weight_for_height,
        status_weight_for_height,
        triage,
    })
}

/// Stateful engine owning the loaded reference standards.
///
/// The standards are read-only after construction, so sharing an engine
/// across sessions is safe; [`GrowthEngine::reload`] is the single,
/// explicit way to swap in a fresh dataset.
pub struct GrowthEngine {
    standards: GrowthStandards,
}

impl GrowthEngine {
    /// Create an engine from already-loaded standards.
    pub fn new(standards: GrowthStandards) -> Self {
        Self { standards }
    }

    /// Load standards from a reference directory and build an engine.
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, GrowthError> {
        Ok(Self::new(GrowthStandards::load_from_dir(dir)?))
    }

    /// Assess one measurement.
    pub fn assess(&self, measurement: &Measurement) -> Result<Assessment, GrowthError> {
        assess(&self.standards, measurement)
    }

    /// Access the loaded standards.
    pub fn standards(&self) -> &GrowthStandards {
        &self.standards
    }

    /// Replace the standards wholesale.
    pub fn reload(&mut self, standards: GrowthStandards) {
        debug!("reloading growth standards");
        self.standards = standards;
    }
}
