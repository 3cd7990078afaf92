//! Maps raw query result rows onto a uniform span shape.
//!
//! Honeycomb has used several column names for the same span attribute over
//! time, and breakdown rows may arrive flat or nested under `data`. Each
//! canonical field is resolved from an ordered alias list, first match wins,
//! with a sentinel when nothing matches. Every other column is carried in
//! `attributes` untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::query::RawRow;

pub const MISSING: &str = "N/A";
pub const ROOT_PARENT: &str = "ROOT";
const COUNT_COLUMN: &str = "COUNT";

#[derive(Debug, Clone, Copy)]
pub struct FieldAliases {
    pub keys: &'static [&'static str],
    pub default: &'static str,
}

pub const SPAN_ID: FieldAliases = FieldAliases {
    keys: &["trace.span_id", "span.id", "span_id"],
    default: MISSING,
};
pub const PARENT_ID: FieldAliases = FieldAliases {
    keys: &["trace.parent_id", "parent.id", "parent_id"],
    default: ROOT_PARENT,
};
pub const NAME: FieldAliases = FieldAliases {
    keys: &["name", "span.name"],
    default: MISSING,
};
pub const SERVICE: FieldAliases = FieldAliases {
    keys: &["service.name", "service"],
    default: MISSING,
};
pub const DURATION: FieldAliases = FieldAliases {
    keys: &["duration_ms", "duration"],
    default: MISSING,
};

const CANONICAL: [FieldAliases; 5] = [SPAN_ID, PARENT_ID, NAME, SERVICE, DURATION];

impl FieldAliases {
    fn lookup<'a>(&self, row: &'a RawRow) -> Option<&'a Value> {
        self.keys
            .iter()
            .filter_map(|key| row.get(*key))
            .find(|value| is_present(value))
    }

    pub fn resolve(&self, row: &RawRow) -> Value {
        self.lookup(row)
            .cloned()
            .unwrap_or_else(|| Value::String(self.default.to_string()))
    }

    fn claims(&self, key: &str) -> bool {
        self.keys.contains(&key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanView {
    pub span_id: Value,
    pub parent_id: Value,
    pub name: Value,
    pub service: Value,
    pub duration: Value,
    pub attributes: Map<String, Value>,
}

impl SpanView {
    pub fn from_row(row: &RawRow) -> Self {
        let attributes = row
            .iter()
            .filter(|(key, _)| {
                key.as_str() != COUNT_COLUMN && !CANONICAL.iter().any(|f| f.claims(key))
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Self {
            span_id: SPAN_ID.resolve(row),
            parent_id: PARENT_ID.resolve(row),
            name: NAME.resolve(row),
            service: SERVICE.resolve(row),
            duration: DURATION.resolve(row),
            attributes,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.as_str() == Some(ROOT_PARENT)
    }

    /// Service name for the summary, `None` for the sentinel.
    pub fn service_name(&self) -> Option<String> {
        match &self.service {
            Value::String(s) if s == MISSING => None,
            other => Some(display_value(other)),
        }
    }
}

/// Flattens a row whose columns are nested under a `data` object.
pub fn unwrap_row(row: RawRow) -> RawRow {
    match row.get("data") {
        Some(Value::Object(inner)) => inner.clone(),
        _ => row,
    }
}

/// A single row reporting `COUNT == 0` means the trace matched nothing.
pub fn is_zero_count(rows: &[RawRow]) -> bool {
    let [row] = rows else {
        return false;
    };
    let Some(Value::Object(data)) = row.get("data") else {
        return false;
    };
    data.get(COUNT_COLUMN).and_then(Value::as_f64) == Some(0.0)
}

/// Unwraps, orders by parent id and normalizes every row.
pub fn normalize_rows(rows: Vec<RawRow>) -> Vec<SpanView> {
    let mut rows: Vec<RawRow> = rows.into_iter().map(unwrap_row).collect();
    rows.sort_by_cached_key(|row| {
        PARENT_ID
            .lookup(row)
            .map(display_value)
            .unwrap_or_default()
    });
    rows.iter().map(SpanView::from_row).collect()
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
