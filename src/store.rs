//! In-memory record store and the CSV loader that builds it.
//!
//! The store is built once at startup and never mutated afterwards. Rows that
//! fail to parse are dropped during loading; the rest of the crate only ever
//! sees complete records.

use crate::error::{Result, WaterError};
use crate::normalize::{match_key, normalize};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

pub const COL_ID: &str = "id";
pub const COL_DEPARTAMENTO: &str = "Departamento";
pub const COL_MUNICIPIO: &str = "Municipio";
pub const COL_PERIODO: &str = "Periodo";
pub const COL_IRCA: &str = "IRCA";

const REQUIRED_COLUMNS: [&str; 5] = [COL_ID, COL_DEPARTAMENTO, COL_MUNICIPIO, COL_PERIODO, COL_IRCA];

/// One row of the water-quality dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub id: String,
    #[serde(rename = "Departamento")]
    pub departamento: String,
    #[serde(rename = "Municipio")]
    pub municipio: String,
    #[serde(rename = "Periodo")]
    pub periodo: String,
    #[serde(rename = "IRCA")]
    pub irca: f64,
    /// Remaining columns, carried through unchanged
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// Counts produced by a CSV load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub loaded: usize,
    pub dropped: usize,
}

/// Immutable snapshot of every loaded record
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<MeasurementRecord>,
    by_id: HashMap<String, usize>,
    // (departamento, municipio) match keys, parallel to `records`
    location_keys: Vec<(String, String)>,
}

impl RecordStore {
    /// Build a store from records already in their final form. The first
    /// occurrence of a duplicated id wins for id lookups.
    pub fn from_records(records: Vec<MeasurementRecord>) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        let mut location_keys = Vec::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            by_id.entry(record.id.clone()).or_insert(idx);
            location_keys.push((match_key(&record.departamento), match_key(&record.municipio)));
        }
        Self {
            records,
            by_id,
            location_keys,
        }
    }

    /// All records in insertion order
    pub fn all_records(&self) -> &[MeasurementRecord] {
        &self.records
    }

    pub fn find_by_id(&self, id: &str) -> Option<&MeasurementRecord> {
        self.by_id.get(id).map(|&idx| &self.records[idx])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records paired with their precomputed location match keys
    pub(crate) fn with_location_keys(
        &self,
    ) -> impl Iterator<Item = (&MeasurementRecord, &(String, String))> {
        self.records.iter().zip(self.location_keys.iter())
    }
}

/// Load the dataset from a delimited file on disk
pub fn load_csv(path: impl AsRef<Path>, delimiter: u8) -> Result<(RecordStore, LoadReport)> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| WaterError::DataLoad {
        message: format!("cannot open {}: {}", path.display(), e),
    })?;
    let (store, report) = load_from_reader(file, delimiter)?;
    info!(
        "Loaded {} measurements from {} ({} rows dropped)",
        report.loaded,
        path.display(),
        report.dropped
    );
    Ok((store, report))
}

/// Load the dataset from any reader. The first row is the header.
pub fn load_from_reader<R: Read>(reader: R, delimiter: u8) -> Result<(RecordStore, LoadReport)> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();

    let column = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| WaterError::DataLoad {
                message: format!("missing required column '{}'", name),
            })
    };
    let idx_id = column(COL_ID)?;
    let idx_dpto = column(COL_DEPARTAMENTO)?;
    let idx_mun = column(COL_MUNICIPIO)?;
    let idx_periodo = column(COL_PERIODO)?;
    let idx_irca = column(COL_IRCA)?;

    let mut records = Vec::new();
    let mut report = LoadReport::default();

    for row in rdr.records() {
        // Undecodable rows are skipped like short or long ones
        let Ok(row) = row else {
            report.dropped += 1;
            continue;
        };
        if row.len() != headers.len() || row.iter().any(is_missing) {
            report.dropped += 1;
            continue;
        }
        let irca = match row[idx_irca].trim().parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                report.dropped += 1;
                continue;
            }
        };

        let extra = headers
            .iter()
            .zip(row.iter())
            .filter(|(h, _)| !REQUIRED_COLUMNS.contains(&h.as_str()))
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect();

        records.push(MeasurementRecord {
            id: row[idx_id].trim().to_string(),
            departamento: normalize(&row[idx_dpto]),
            municipio: normalize(&row[idx_mun]),
            periodo: row[idx_periodo].to_string(),
            irca,
            extra,
        });
        report.loaded += 1;
    }

    if report.dropped > 0 {
        debug!("Dropped {} incomplete or malformed rows", report.dropped);
    }

    Ok((RecordStore::from_records(records), report))
}

/// Cell values read as missing, same set pandas treats as NA by default
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(field: &str) -> bool {
    MISSING_MARKERS.contains(&field.trim())
}
