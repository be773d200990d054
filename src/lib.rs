//! Gizi Core - Compute engine for WHO child growth standards
//!
//! Gizi Core turns a raw child measurement (weight, height, age, sex) into
//! an anthropometric assessment through a deterministic pipeline: reference
//! row lookup → LMS Z-score → status classification → triage tier.
//!
//! ## Modules
//!
//! - **Reference**: load the LMS growth-standard tables into keyed lookups
//! - **Compute**: age in completed months, Z-scores for weight-for-age,
//!   height-for-age, and weight-for-height
//! - **Classify**: status bands per indicator and the combined triage rule
//! - **Records**: the child-register and measurement-row contracts shared
//!   with the external record store

pub mod age;
pub mod classify;
pub mod error;
pub mod pipeline;
pub mod posyandu;
pub mod record;
pub mod reference;
pub mod types;
pub mod zscore;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use error::GrowthError;
pub use pipeline::{assess, GrowthEngine};
pub use reference::{AgeLmsTable, GrowthStandards, HeightLmsTable, Lms};

// Type exports
pub use types::{
    Assessment, HeightForAgeStatus, Indicator, Measurement, MeasurementInput, Regime,
    Sex, TriageTier, WeightForAgeStatus, WeightForHeightStatus,
};

// Record-store contract exports
pub use record::{ChildRecord, MeasurementRecord};

/// Engine version embedded in CLI and FFI surfaces
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for diagnostics
pub const PRODUCER_NAME: &str = "gizi-core";
