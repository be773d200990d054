//! WHO LMS reference tables
//!
//! This module loads the per-cell Lambda-Mu-Sigma growth reference data into
//! keyed lookup tables: one age-indexed shape for weight-for-age and
//! height-for-age, and one height-indexed shape (with a length-vs-height
//! regime dimension) for weight-for-height.
//!
//! Loading is tolerant: a malformed row is skipped with a warning rather
//! than aborting the whole table, and a skipped row simply stays absent so
//! later lookups fail loudly instead of producing a NaN score. No fallback
//! row is ever synthesized.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::GrowthError;
use crate::types::{Regime, Sex, MAX_AGE_MONTHS};

/// Weight-for-age table file name in a reference directory
pub const WEIGHT_FOR_AGE_FILE: &str = "lms_bbu.csv";
/// Height-for-age table file name in a reference directory
pub const HEIGHT_FOR_AGE_FILE: &str = "lms_tbu.csv";
/// Weight-for-height table file name in a reference directory
pub const WEIGHT_FOR_HEIGHT_FILE: &str = "lms_bbtb.csv";

/// One LMS parameter cell (power, median, coefficient of variation)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lms {
    pub l: f64,
    pub m: f64,
    pub s: f64,
}

/// Round a stature to the nearest 0.5 cm WHO bin.
///
/// Half steps on the doubled value round away from zero, so 84.26 bins to
/// 84.5 and 84.75 bins to 85.0.
pub fn round_to_half_cm(height_cm: f64) -> f64 {
    (height_cm * 2.0).round() / 2.0
}

/// Integer half-centimeter key for a stature. Exact and hashable, unlike the
/// rounded f64 itself.
fn bin_height_half_cm(height_cm: f64) -> i32 {
    (height_cm * 2.0).round() as i32
}

/// Raw age-indexed CSV row. Aliases accept the source dataset's Indonesian
/// headers alongside the canonical ones.
#[derive(Debug, Deserialize)]
struct AgeRowRaw {
    #[serde(alias = "umur")]
    age_months: u32,
    #[serde(alias = "jenis_kelamin")]
    sex: String,
    #[serde(alias = "L")]
    l: f64,
    #[serde(alias = "M")]
    m: f64,
    #[serde(alias = "S")]
    s: f64,
}

/// Raw height-indexed CSV row
#[derive(Debug, Deserialize)]
struct HeightRowRaw {
    #[serde(alias = "tb")]
    height_cm: f64,
    #[serde(alias = "jenis_kelamin")]
    sex: String,
    #[serde(alias = "lorh")]
    regime: String,
    #[serde(alias = "L")]
    l: f64,
    #[serde(alias = "M")]
    m: f64,
    #[serde(alias = "S")]
    s: f64,
}

fn check_lms(l: f64, m: f64, s: f64) -> Result<Lms, GrowthError> {
    if !l.is_finite() || !m.is_finite() || !s.is_finite() {
        return Err(GrowthError::InvalidReferenceData(
            "non-finite LMS parameter".to_string(),
        ));
    }
    if m <= 0.0 {
        return Err(GrowthError::InvalidReferenceData(format!(
            "median M must be positive, got {m}"
        )));
    }
    if s <= 0.0 {
        return Err(GrowthError::InvalidReferenceData(format!(
            "coefficient of variation S must be positive, got {s}"
        )));
    }
    Ok(Lms { l, m, s })
}

/// Age-indexed LMS table, keyed by (age in months, sex)
#[derive(Debug, Clone, Default)]
pub struct AgeLmsTable {
    rows: HashMap<(u32, Sex), Lms>,
    skipped_rows: usize,
}

impl AgeLmsTable {
    /// Parse an age-indexed table from CSV with headers.
    ///
    /// Rows that fail numeric conversion, carry an unknown sex code, violate
    /// the M > 0 / S > 0 constraints, or duplicate an earlier key are
    /// skipped and counted, not fatal.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, GrowthError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        // A file whose header row cannot be read at all is fatal; bad data
        // rows below are merely skipped.
        csv_reader.headers()?;

        let mut rows = HashMap::new();
        let mut skipped_rows = 0;

        for (index, record) in csv_reader.deserialize::<AgeRowRaw>().enumerate() {
            let line = index + 2; // header is line 1
            let raw = match record {
                Ok(raw) => raw,
                Err(err) => {
                    warn!(line, "skipping unparseable reference row: {err}");
                    skipped_rows += 1;
                    continue;
                }
            };

            let parsed = Sex::parse(&raw.sex)
                .and_then(|sex| check_lms(raw.l, raw.m, raw.s).map(|lms| (sex, lms)));
            match parsed {
                Ok((sex, lms)) => {
                    let key = (raw.age_months, sex);
                    if rows.contains_key(&key) {
                        warn!(
                            line,
                            age_months = raw.age_months,
                            sex = %sex,
                            "skipping duplicate reference row"
                        );
                        skipped_rows += 1;
                    } else {
                        rows.insert(key, lms);
                    }
                }
                Err(err) => {
                    warn!(line, "skipping invalid reference row: {err}");
                    skipped_rows += 1;
                }
            }
        }

        debug!(rows = rows.len(), skipped_rows, "loaded age-indexed LMS table");
        Ok(Self { rows, skipped_rows })
    }

    /// Exact lookup; no interpolation between ages or sexes.
    pub fn get(&self, age_months: u32, sex: Sex) -> Option<Lms> {
        self.rows.get(&(age_months, sex)).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of input rows rejected during loading
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }
}

/// Height-indexed LMS table, keyed by (0.5 cm height bin, sex, regime)
#[derive(Debug, Clone, Default)]
pub struct HeightLmsTable {
    rows: HashMap<(i32, Sex, Regime), Lms>,
    skipped_rows: usize,
}

impl HeightLmsTable {
    /// Parse a height-indexed table from CSV with headers. Same tolerance
    /// rules as [`AgeLmsTable::from_reader`].
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, GrowthError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        // A file whose header row cannot be read at all is fatal; bad data
        // rows below are merely skipped.
        csv_reader.headers()?;

        let mut rows = HashMap::new();
        let mut skipped_rows = 0;

        for (index, record) in csv_reader.deserialize::<HeightRowRaw>().enumerate() {
            let line = index + 2;
            let raw = match record {
                Ok(raw) => raw,
                Err(err) => {
                    warn!(line, "skipping unparseable reference row: {err}");
                    skipped_rows += 1;
                    continue;
                }
            };

            let parsed = Sex::parse(&raw.sex).and_then(|sex| {
                let regime = Regime::parse(&raw.regime)?;
                if !(raw.height_cm > 0.0) || !raw.height_cm.is_finite() {
                    return Err(GrowthError::InvalidReferenceData(format!(
                        "height must be positive, got {}",
                        raw.height_cm
                    )));
                }
                let lms = check_lms(raw.l, raw.m, raw.s)?;
                Ok((sex, regime, lms))
            });
            match parsed {
                Ok((sex, regime, lms)) => {
                    let key = (bin_height_half_cm(raw.height_cm), sex, regime);
                    if rows.contains_key(&key) {
                        warn!(
                            line,
                            height_cm = raw.height_cm,
                            sex = %sex,
                            regime = %regime,
                            "skipping duplicate reference row"
                        );
                        skipped_rows += 1;
                    } else {
                        rows.insert(key, lms);
                    }
                }
                Err(err) => {
                    warn!(line, "skipping invalid reference row: {err}");
                    skipped_rows += 1;
                }
            }
        }

        debug!(
            rows = rows.len(),
            skipped_rows, "loaded height-indexed LMS table"
        );
        Ok(Self { rows, skipped_rows })
    }

    /// Exact lookup after binning the stature to its 0.5 cm cell.
    pub fn get(&self, height_cm: f64, sex: Sex, regime: Regime) -> Option<Lms> {
        self.rows
            .get(&(bin_height_half_cm(height_cm), sex, regime))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of input rows rejected during loading
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }
}

/// The three reference tables the engine assesses against.
///
/// Loaded once at startup and treated as read-only afterwards; replacing the
/// whole set is the only supported form of update.
#[derive(Debug, Clone, Default)]
pub struct GrowthStandards {
    pub weight_for_age: AgeLmsTable,
    pub height_for_age: AgeLmsTable,
    pub weight_for_height: HeightLmsTable,
}

impl GrowthStandards {
    /// Assemble standards from three already-opened CSV sources.
    pub fn from_readers<R1, R2, R3>(
        weight_for_age: R1,
        height_for_age: R2,
        weight_for_height: R3,
    ) -> Result<Self, GrowthError>
    where
        R1: Read,
        R2: Read,
        R3: Read,
    {
        Ok(Self {
            weight_for_age: AgeLmsTable::from_reader(weight_for_age)?,
            height_for_age: AgeLmsTable::from_reader(height_for_age)?,
            weight_for_height: HeightLmsTable::from_reader(weight_for_height)?,
        })
    }

    /// Load the three tables from a directory using the dataset's standard
    /// file names (`lms_bbu.csv`, `lms_tbu.csv`, `lms_bbtb.csv`).
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, GrowthError> {
        let dir = dir.as_ref();
        let standards = Self::from_readers(
            File::open(dir.join(WEIGHT_FOR_AGE_FILE))?,
            File::open(dir.join(HEIGHT_FOR_AGE_FILE))?,
            File::open(dir.join(WEIGHT_FOR_HEIGHT_FILE))?,
        )?;
        debug!(dir = %dir.display(), "loaded growth standards");
        Ok(standards)
    }

    /// Whether an age falls inside the tabulated 0-60 month range.
    ///
    /// A gate for input forms; the lookup itself still fails with
    /// `ReferenceNotFound` when a cell is missing.
    pub fn supports_age(&self, age_months: u32) -> bool {
        age_months <= MAX_AGE_MONTHS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const AGE_CSV: &str = "\
age_months,sex,l,m,s
6,M,1.0,7.9,0.11
6,F,0.8,7.3,0.12
24,M,0.5,12.2,0.10
";

    const HEIGHT_CSV: &str = "\
height_cm,sex,regime,l,m,s
84.0,M,L,-0.35,11.4,0.085
84.5,M,L,-0.35,11.5,0.085
84.0,M,H,-0.35,11.5,0.084
85.0,F,H,-0.38,11.3,0.089
";

    #[test]
    fn test_load_age_table() {
        let table = AgeLmsTable::from_reader(AGE_CSV.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.skipped_rows(), 0);

        let row = table.get(6, Sex::Male).unwrap();
        assert_eq!(row, Lms { l: 1.0, m: 7.9, s: 0.11 });

        assert!(table.get(7, Sex::Male).is_none());
        assert!(table.get(24, Sex::Female).is_none());
    }

    #[test]
    fn test_load_age_table_with_source_headers() {
        // The source dataset ships Indonesian headers and uppercase LMS.
        let csv = "\
umur,jenis_kelamin,L,M,S
6,L,1.0,7.9,0.11
6,P,0.8,7.3,0.12
";
        let table = AgeLmsTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.get(6, Sex::Male).unwrap(),
            Lms { l: 1.0, m: 7.9, s: 0.11 }
        );
        assert!(table.get(6, Sex::Female).is_some());
    }

    #[test]
    fn test_malformed_rows_are_skipped_not_fatal() {
        let csv = "\
age_months,sex,l,m,s
6,M,1.0,7.9,0.11
7,M,not-a-number,8.0,0.11
8,X,1.0,8.2,0.11
9,M,1.0,0.0,0.11
10,M,1.0,8.6,-0.2
11,F,0.9,8.0,0.12
";
        let table = AgeLmsTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.skipped_rows(), 4);

        // The skipped cells are simply absent.
        assert!(table.get(7, Sex::Male).is_none());
        assert!(table.get(9, Sex::Male).is_none());
        assert!(table.get(11, Sex::Female).is_some());
    }

    #[test]
    fn test_duplicate_key_keeps_first_row() {
        let csv = "\
age_months,sex,l,m,s
6,M,1.0,7.9,0.11
6,M,2.0,9.9,0.22
";
        let table = AgeLmsTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.skipped_rows(), 1);
        assert_eq!(table.get(6, Sex::Male).unwrap().m, 7.9);
    }

    #[test]
    fn test_load_height_table() {
        let table = HeightLmsTable::from_reader(HEIGHT_CSV.as_bytes()).unwrap();
        assert_eq!(table.len(), 4);

        // Same nominal stature, distinct regimes, distinct cells.
        let length = table.get(84.0, Sex::Male, Regime::Length).unwrap();
        let height = table.get(84.0, Sex::Male, Regime::Height).unwrap();
        assert_eq!(length.m, 11.4);
        assert_eq!(height.m, 11.5);

        assert!(table.get(90.0, Sex::Male, Regime::Height).is_none());
    }

    #[test]
    fn test_height_lookup_bins_to_half_cm() {
        let table = HeightLmsTable::from_reader(HEIGHT_CSV.as_bytes()).unwrap();

        // 84.24 bins down to 84.0, 84.26 bins up to 84.5.
        assert_eq!(table.get(84.24, Sex::Male, Regime::Length).unwrap().m, 11.4);
        assert_eq!(table.get(84.26, Sex::Male, Regime::Length).unwrap().m, 11.5);
        // 84.75 bins up to 85.0.
        assert_eq!(table.get(84.75, Sex::Female, Regime::Height).unwrap().m, 11.3);
    }

    #[test]
    fn test_round_to_half_cm_pinned() {
        assert_eq!(round_to_half_cm(84.24), 84.0);
        assert_eq!(round_to_half_cm(84.26), 84.5);
        assert_eq!(round_to_half_cm(84.75), 85.0);
        assert_eq!(round_to_half_cm(65.0), 65.0);
        assert_eq!(round_to_half_cm(65.3), 65.5);
    }

    #[test]
    fn test_height_table_with_source_headers() {
        let csv = "\
tb,jenis_kelamin,lorh,L,M,S
84.0,L,L,-0.35,11.4,0.085
84.0,P,H,-0.38,11.2,0.089
";
        let table = HeightLmsTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.get(84.0, Sex::Male, Regime::Length).is_some());
        assert!(table.get(84.0, Sex::Female, Regime::Height).is_some());
    }

    #[test]
    fn test_from_readers_bundle() {
        let standards = GrowthStandards::from_readers(
            AGE_CSV.as_bytes(),
            AGE_CSV.as_bytes(),
            HEIGHT_CSV.as_bytes(),
        )
        .unwrap();

        assert!(!standards.weight_for_age.is_empty());
        assert!(!standards.height_for_age.is_empty());
        assert!(!standards.weight_for_height.is_empty());

        assert!(standards.supports_age(0));
        assert!(standards.supports_age(60));
        assert!(!standards.supports_age(61));
    }
}
