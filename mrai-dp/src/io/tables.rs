//! CSV and JSON persistence of stage tables
//!
//! Every reader checks the header before deserializing a single row, so a
//! structurally wrong file fails with [`Error::Schema`] and no stage ever
//! works on a partial table.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use mrai_common::columns::{self, ALBUM_ID, DECADE_CLASS, FEATURE, RATING};
use mrai_common::{Error, Result};

use crate::models::{FeatureDataset, RymFeatureRow, RymFeatureTable};

/// Final dataset file inside each layout directory
pub const DATASET_FILE: &str = "album_rating.csv";
/// Feature-name sidecar inside each layout directory
pub const FEATURE_NAMES_FILE: &str = "album_rating_feature_names.json";

/// How strictly a header must match its schema
#[derive(Debug, Clone, Copy)]
pub enum HeaderCheck<'a> {
    /// Same columns in the same order
    Exact(&'a [&'a str]),
    /// Every listed column present, any order, extras allowed
    Present(&'a [&'a str]),
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn validate_header(table: &str, found: &[String], check: HeaderCheck<'_>) -> Result<()> {
    match check {
        HeaderCheck::Exact(expected) => columns::validate_exact(table, found, expected),
        HeaderCheck::Present(required) => columns::validate_present(table, found, required),
    }
}

/// Read a whole CSV table after validating its header
pub fn read_rows<T: DeserializeOwned>(
    path: &Path,
    table: &str,
    check: HeaderCheck<'_>,
) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)?;
    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    validate_header(table, &header, check)?;

    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, csv::Error>>()?;
    debug!(table, path = %path.display(), rows = rows.len(), "Read table");
    Ok(rows)
}

/// Write a CSV table; the header is written even when `rows` is empty
pub fn write_rows<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    debug!(path = %path.display(), rows = rows.len(), "Wrote table");
    Ok(())
}

/// Chart feature table: `album_id`, feature columns, `rating` (target class)
pub fn write_rym_features(path: &Path, table: &RymFeatureTable) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = Vec::with_capacity(table.columns.len() + 2);
    header.push(ALBUM_ID.to_string());
    header.extend(table.columns.iter().cloned());
    header.push(RATING.to_string());
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(header.len());
        record.push(row.album_id.clone());
        record.extend(row.features.iter().map(|v| v.to_string()));
        record.push(row.target.to_string());
        writer.write_record(&record)?;
    }
    writer.flush()?;
    debug!(path = %path.display(), rows = table.rows.len(), "Wrote chart features");
    Ok(())
}

pub fn read_rym_features(path: &Path) -> Result<RymFeatureTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)?;
    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let shaped = header.len() >= 3
        && header[0] == ALBUM_ID
        && header[1] == DECADE_CLASS
        && header[header.len() - 1] == RATING;
    if !shaped {
        return Err(Error::Schema(format!(
            "chart features: expected '{}', '{}', genre columns, '{}'; found {:?}",
            ALBUM_ID, DECADE_CLASS, RATING, header
        )));
    }
    let columns = header[1..header.len() - 1].to_vec();

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let parse_err = |field: &str| {
            Error::InvalidInput(format!(
                "chart features row {}: unparsable {} value",
                line + 1,
                field
            ))
        };

        let album_id = record.get(0).unwrap_or_default().to_string();
        let features = (1..header.len() - 1)
            .map(|i| {
                record
                    .get(i)
                    .and_then(|v| v.trim().parse::<f64>().ok())
                    .ok_or_else(|| parse_err(&header[i]))
            })
            .collect::<Result<Vec<f64>>>()?;
        let target = record
            .get(header.len() - 1)
            .and_then(|v| v.trim().parse::<u8>().ok())
            .ok_or_else(|| parse_err(RATING))?;

        rows.push(RymFeatureRow {
            album_id,
            features,
            target,
        });
    }

    Ok(RymFeatureTable { columns, rows })
}

/// Write `<dir>/album_rating.csv` and the feature-name sidecar
///
/// The CSV holds `album_id`, `feature` (JSON array) and `rating` (target
/// class).
pub fn write_dataset(dir: &Path, dataset: &FeatureDataset) -> Result<()> {
    fs::create_dir_all(dir)?;

    let mut writer = csv::Writer::from_path(dir.join(DATASET_FILE))?;
    writer.write_record([ALBUM_ID, FEATURE, RATING])?;
    for row in &dataset.rows {
        let features = serde_json::to_string(&row.features)?;
        let target = row.target.to_string();
        writer.write_record([row.album_id.as_str(), features.as_str(), target.as_str()])?;
    }
    writer.flush()?;

    write_json(&dir.join(FEATURE_NAMES_FILE), &dataset.feature_names)?;
    debug!(
        dir = %dir.display(),
        rows = dataset.rows.len(),
        width = dataset.width(),
        "Wrote dataset"
    );
    Ok(())
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(writer, value)?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
