//! Error types for the growth assessment engine

use thiserror::Error;

/// Errors that can occur during reference loading or assessment
#[derive(Debug, Error)]
pub enum GrowthError {
    #[error("Reference row not found: {0}")]
    ReferenceNotFound(String),

    #[error("Invalid measurement: {0}")]
    InvalidMeasurement(String),

    #[error("Invalid reference data: {0}")]
    InvalidReferenceData(String),

    #[error("Unknown sex code: {0}")]
    UnknownSex(String),

    #[error("Unknown measurement regime code: {0}")]
    UnknownRegime(String),

    #[error("RT {rt} / RW {rw} is not registered to any service unit")]
    UnmappedServiceArea { rt: u8, rw: u8 },

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
