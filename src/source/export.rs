//! Flat-File Export Source
//!
//! Reads ticket exports (CSV/TSV header-row files, or JSON arrays optionally
//! wrapped in a container object) into raw flat records, then normalizes
//! them through the canonical field alias table. Values are renamed, never
//! transformed: whatever string the export holds is what the canonical
//! field carries.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::constants::import::CONTAINER_KEYS;
use crate::source::fields::{self, CanonicalField, ColumnMap};
use crate::types::{CanonicalTicket, Result, TicketError, TicketSource, TicketType};

/// A raw export row: flat mapping of column name to scalar value
pub type RawRecord = HashMap<String, String>;

/// Read an export file into raw records.
///
/// Fails with `FileNotFound` when the path does not resolve and
/// `UnsupportedFormat` when the extension is neither tabular nor JSON-like.
pub fn read_export(path: &Path) -> Result<Vec<RawRecord>> {
    if !path.exists() {
        return Err(TicketError::FileNotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "csv" => read_delimited(path, b','),
        "tsv" => read_delimited(path, b'\t'),
        "json" => read_json(path),
        other => Err(TicketError::UnsupportedFormat {
            extension: other.to_string(),
        }),
    }
}

fn read_delimited(path: &Path, delimiter: u8) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let mut record = RawRecord::new();
        for (i, header) in headers.iter().enumerate() {
            let value = row.get(i).unwrap_or("");
            record.insert(header.clone(), value.to_string());
        }
        records.push(record);
    }

    debug!("Read {} rows from {}", records.len(), path.display());
    Ok(records)
}

fn read_json(path: &Path) -> Result<Vec<RawRecord>> {
    let text = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&text)?;

    let rows: Vec<Value> = match value {
        Value::Array(items) => items,
        Value::Object(map) => {
            // Container object under a conventional key, else a single record
            let container = CONTAINER_KEYS
                .iter()
                .find_map(|key| map.get(*key).and_then(|v| v.as_array()).cloned());
            match container {
                Some(items) => items,
                None => vec![Value::Object(map)],
            }
        }
        _ => {
            return Err(TicketError::UnsupportedFormat {
                extension: "json (top-level scalar)".to_string(),
            });
        }
    };

    let records = rows.iter().map(flatten_scalars).collect();
    Ok(records)
}

/// Flatten a JSON object's scalar members into a raw record.
/// Nested objects and arrays are skipped — exports are flat by contract.
fn flatten_scalars(row: &Value) -> RawRecord {
    let mut record = RawRecord::new();
    if let Value::Object(map) = row {
        for (key, value) in map {
            let scalar = match value {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            };
            if let Some(scalar) = scalar {
                record.insert(key.clone(), scalar);
            }
        }
    }
    record
}

/// Normalize raw export records into canonical tickets.
///
/// The column map is resolved from the first record's key set only and then
/// applied uniformly; records whose spelling differs from the first row
/// normalize unmapped fields to empty string.
pub fn normalize_records(records: &[RawRecord]) -> Vec<CanonicalTicket> {
    let Some(first) = records.first() else {
        return Vec::new();
    };

    // Sorted for deterministic resolution; precedence comes from the alias
    // table, not key order
    let mut keys: Vec<&String> = first.keys().collect();
    keys.sort();
    let columns = fields::resolve_columns(&keys);
    debug!("Resolved {} of {} canonical fields", columns.len(), CanonicalField::ALL.len());

    records
        .iter()
        .map(|record| normalize_one(record, &columns))
        .collect()
}

fn normalize_one(record: &RawRecord, columns: &ColumnMap) -> CanonicalTicket {
    let get = |field: CanonicalField| -> String {
        columns
            .get(&field)
            .and_then(|key| record.get(key))
            .cloned()
            .unwrap_or_default()
    };

    CanonicalTicket {
        number: get(CanonicalField::Number),
        ticket_type: TicketType::parse_or_default(&get(CanonicalField::Type)),
        short_description: get(CanonicalField::ShortDescription),
        description: get(CanonicalField::Description),
        state: get(CanonicalField::State),
        priority: get(CanonicalField::Priority),
        category: get(CanonicalField::Category),
        subcategory: get(CanonicalField::Subcategory),
        opened_at: get(CanonicalField::OpenedAt),
        closed_at: get(CanonicalField::ClosedAt),
        resolved_at: get(CanonicalField::ResolvedAt),
        assigned_to: get(CanonicalField::AssignedTo),
        caller_name: get(CanonicalField::CallerName),
        close_notes: get(CanonicalField::CloseNotes),
        work_notes: get(CanonicalField::WorkNotes),
        ci_name: get(CanonicalField::CiName),
        source: TicketSource::Export,
    }
}

/// Read and normalize an export file in one step.
/// An empty result is not an error; it is reported at warning level.
pub fn load_tickets(path: &Path) -> Result<Vec<CanonicalTicket>> {
    let records = read_export(path)?;
    let tickets = normalize_records(&records);
    if tickets.is_empty() {
        warn!("Export {} produced no tickets", path.display());
    }
    Ok(tickets)
}
