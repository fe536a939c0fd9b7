//! JSON loading and saving for roster and stats documents, and applying an
//! id mapping back onto roster records.
//!
//! Roster records are kept as raw JSON objects so that fields the resolver
//! does not know about survive a load/rewrite cycle untouched.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::record::{PersonId, RosterEntry, StatEntry};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unexpected document shape: {0}")]
    Shape(String),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Read and parse any JSON file.
pub fn read_json(path: &Path) -> Result<Value, StoreError> {
    let content = std::fs::read_to_string(path).map_err(io_error(path))?;
    Ok(serde_json::from_str(&content)?)
}

/// Write `data` as JSON indented with four spaces. Non-ASCII text is written as-is.
pub fn save_json_pretty<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<(), StoreError> {
    let file = File::create(path).map_err(io_error(path))?;
    let mut writer = BufWriter::new(file);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
    data.serialize(&mut ser)?;
    writer.flush().map_err(io_error(path))?;
    Ok(())
}

/// `members.json` -> `members.backup.json`, next to the original.
pub fn backup_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match path.extension() {
        Some(ext) => format!("{}.backup.{}", stem, ext.to_string_lossy()),
        None => format!("{}.backup", stem),
    };
    path.with_file_name(file_name)
}

// -- Roster --

/// Parse a roster document: a JSON array of objects.
pub fn parse_roster(value: Value) -> Result<Vec<Value>, StoreError> {
    let Value::Array(records) = value else {
        return Err(StoreError::Shape("roster must be a JSON array".to_string()));
    };
    for (i, record) in records.iter().enumerate() {
        if !record.is_object() {
            return Err(StoreError::Shape(format!("roster record {} is not an object", i)));
        }
    }
    Ok(records)
}

pub fn load_roster(path: &Path) -> Result<Vec<Value>, StoreError> {
    parse_roster(read_json(path)?)
}

/// Matching view of roster records. A missing `name` reads as empty.
pub fn roster_entries(records: &[Value]) -> Vec<RosterEntry> {
    records
        .iter()
        .map(|record| RosterEntry {
            name: record_name(record).to_string(),
            person_id: record.get("person_id").and_then(PersonId::from_json),
        })
        .collect()
}

fn record_name(record: &Value) -> &str {
    record.get("name").and_then(Value::as_str).unwrap_or_default()
}

// -- Stats --

/// Parse a stats document.
///
/// Accepts either an object keyed by name whose values carry `person_id`,
/// or an array of `{name, person_id}` objects. Document order is kept.
pub fn parse_stats(value: Value) -> Result<Vec<StatEntry>, StoreError> {
    match value {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(name, data)| StatEntry {
                person_id: data.get("person_id").and_then(PersonId::from_json),
                name,
            })
            .collect()),
        Value::Array(records) => records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                if !record.is_object() {
                    return Err(StoreError::Shape(format!("stats record {} is not an object", i)));
                }
                Ok(StatEntry {
                    name: record_name(record).to_string(),
                    person_id: record.get("person_id").and_then(PersonId::from_json),
                })
            })
            .collect(),
        _ => Err(StoreError::Shape(
            "stats must be a JSON object keyed by name or an array".to_string(),
        )),
    }
}

pub fn load_stats(path: &Path) -> Result<Vec<StatEntry>, StoreError> {
    parse_stats(read_json(path)?)
}

// -- Applying a mapping --

/// One rewritten roster identifier.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct IdChange {
    pub name: String,
    pub old_id: PersonId,
    pub new_id: PersonId,
}

/// Counts from [`apply_mapping`].
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct ApplySummary {
    pub processed: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub changes: Vec<IdChange>,
}

/// Replace `person_id` on every record whose current id is a mapping key.
///
/// The replacement keeps the JSON kind of the new id (number or string).
/// Records without a usable id are counted as unchanged.
pub fn apply_mapping(
    records: &mut [Value],
    mapping: &BTreeMap<PersonId, PersonId>,
) -> ApplySummary {
    let mut summary = ApplySummary {
        processed: records.len(),
        ..ApplySummary::default()
    };

    for record in records.iter_mut() {
        let Some(old_id) = record.get("person_id").and_then(PersonId::from_json) else {
            continue;
        };
        let Some(new_id) = mapping.get(&old_id) else {
            continue;
        };
        let name = record_name(record).to_string();
        if let Some(obj) = record.as_object_mut() {
            obj.insert("person_id".to_string(), new_id.to_json());
        }
        tracing::debug!("Updated {}: {} -> {}", name, old_id, new_id);
        summary.changes.push(IdChange {
            name,
            old_id,
            new_id: new_id.clone(),
        });
    }

    summary.updated = summary.changes.len();
    summary.unchanged = summary.processed - summary.updated;
    summary
}
