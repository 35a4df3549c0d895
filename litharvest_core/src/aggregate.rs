//! Merging, deduplication and tabular projection of per-source results.

use crate::dedup::dedup_records;
use crate::error::HarvestError;
use crate::model::ChunkRecord;
use serde_json::Value;
use std::collections::BTreeSet;

/// Preferred column prefix of the output schema. Field names present in the
/// records but not listed here are appended in lexical order.
pub const PREFERRED_FIELDS: [&str; 10] = [
    "paper_id",
    "source",
    "title",
    "authors",
    "published",
    "chunk_id",
    "text_chunk",
    "pdf_url",
    "abstract",
    "doi",
];

/// A header plus rows of single-line cells, ready for the CSV writer.
#[derive(Debug)]
pub struct RecordTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Concatenate per-source record lists (already in precedence order) and
/// drop exact duplicates, keeping the first occurrence.
pub fn merge(per_source: Vec<Vec<ChunkRecord>>) -> Vec<ChunkRecord> {
    dedup_records(per_source.into_iter().flatten().collect())
}

/// Project records onto a fixed column order: the union of field names
/// across all records, preferred prefix first, remaining names lexically.
/// Missing fields become empty cells; every cell has its whitespace runs
/// collapsed to single spaces.
pub fn project(records: &[ChunkRecord]) -> Result<RecordTable, HarvestError> {
    let mut maps = Vec::with_capacity(records.len());
    for record in records {
        match serde_json::to_value(record)? {
            Value::Object(map) => maps.push(map),
            other => {
                return Err(HarvestError::Other(format!(
                    "chunk record serialized to non-object value: {other}"
                )))
            }
        }
    }

    let mut present: BTreeSet<&str> = BTreeSet::new();
    for map in &maps {
        for key in map.keys() {
            present.insert(key.as_str());
        }
    }

    let mut header: Vec<String> = PREFERRED_FIELDS
        .iter()
        .filter(|field| present.contains(**field))
        .map(|field| field.to_string())
        .collect();
    for key in &present {
        if !PREFERRED_FIELDS.contains(key) {
            header.push((*key).to_string());
        }
    }

    let rows = maps
        .iter()
        .map(|map| header.iter().map(|field| cell(map.get(field))).collect())
        .collect();

    Ok(RecordTable { header, rows })
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => collapse_whitespace(text),
        Some(other) => collapse_whitespace(&other.to_string()),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
