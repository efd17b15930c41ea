#![forbid(unsafe_code)]

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::domain::SelectionRecord;
use serde_json::Value;
use tracing::warn;

/// Durable, ordered list of selections with at most one record per endpoint.
///
/// Persistence is best-effort: reads fall back to an empty list and write
/// failures are logged, never returned.
pub trait SelectionStore: Send + Sync {
    fn get_selections(&self) -> Vec<SelectionRecord>;

    /// Replace the record with the same endpoint in place, or append.
    fn save_selection(&self, record: SelectionRecord);
}

/// Upsert by endpoint key, keeping the position of an existing record.
pub fn upsert(records: &mut Vec<SelectionRecord>, record: SelectionRecord) {
    match records.iter_mut().find(|existing| existing.same_key(&record)) {
        Some(existing) => *existing = record,
        None => records.push(record),
    }
}

/// Decode a persisted list, dropping entries that do not parse.
///
/// Anything other than a JSON array yields an empty list.
pub fn parse_selections(raw: &str) -> Vec<SelectionRecord> {
    let entries = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(entries)) => entries,
        Ok(other) => {
            warn!(kind = json_kind(&other), "saved selections are not a list, ignoring");
            return Vec::new();
        }
        Err(err) => {
            warn!(%err, "saved selections are not valid JSON, ignoring");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| match serde_json::from_value(entry) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(index = i, %err, "dropping malformed saved selection");
                None
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EndpointKey, HttpMethod, PresetChoice};
    use pretty_assertions::assert_eq;

    fn record(path: &str, preset: &str) -> SelectionRecord {
        SelectionRecord::new(EndpointKey::new(HttpMethod::Get, path), preset.into())
    }

    #[test]
    fn upsert_preserves_position() {
        let mut records = vec![record("/a", "x"), record("/b", "y")];
        upsert(&mut records, record("/a", "z"));
        upsert(&mut records, record("/c", "w"));
        assert_eq!(
            records,
            vec![record("/a", "z"), record("/b", "y"), record("/c", "w")]
        );
    }

    #[test]
    fn parse_drops_bad_entries() {
        let raw = r#"[
            {"method": "GET", "path": "/api/user", "preset": "success"},
            {"method": "FETCH", "path": "/api/user", "preset": "success"},
            {"path": "/api/posts"},
            42,
            {"method": "get", "path": "/api/posts", "preset": "real-api"}
        ]"#;
        let records = parse_selections(raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].preset, PresetChoice::Preset("success".into()));
        assert_eq!(records[1].preset, PresetChoice::RealApi);
    }

    #[test]
    fn parse_tolerates_garbage() {
        assert!(parse_selections("").is_empty());
        assert!(parse_selections("{not json").is_empty());
        assert!(parse_selections(r#"{"method": "GET"}"#).is_empty());
        assert!(parse_selections("null").is_empty());
    }
}
