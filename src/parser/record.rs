use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

use crate::schema::{Column, ColumnType, Fallback, TableSchema};

/// A feature's properties coerced into typed column values
#[derive(Debug)]
pub struct ParsedRow {
    pub local_id: i64,
    pub values: HashMap<&'static str, SqlValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    pub fn bind_to(&self, idx: usize, stmt: &mut rusqlite::Statement) -> rusqlite::Result<()> {
        match self {
            SqlValue::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null)?,
            SqlValue::Integer(i) => stmt.raw_bind_parameter(idx, i)?,
            SqlValue::Real(f) => stmt.raw_bind_parameter(idx, f)?,
            SqlValue::Text(s) => stmt.raw_bind_parameter(idx, s.as_str())?,
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("feature has no numeric id")]
    MissingLocalId,
}

/// Coerce a feature's property bag into a row for the given table.
///
/// Only the `id` property is required; every other column falls back to its
/// declared default when absent or of the wrong shape.
pub fn parse_record(
    properties: Option<&Map<String, Value>>,
    schema: &TableSchema,
) -> Result<ParsedRow, RecordError> {
    let local_id = properties
        .and_then(|p| p.get("id"))
        .and_then(coerce_local_id)
        .ok_or(RecordError::MissingLocalId)?;

    let mut values = HashMap::with_capacity(schema.columns.len());
    for col in schema.columns {
        let value = properties
            .and_then(|p| p.get(col.property()))
            .and_then(|v| coerce(v, col.col_type))
            .unwrap_or_else(|| default_value(col));
        values.insert(col.name, value);
    }

    Ok(ParsedRow { local_id, values })
}

fn default_value(col: &Column) -> SqlValue {
    match (col.fallback, col.col_type) {
        (Fallback::Null, _) => SqlValue::Null,
        (Fallback::ZeroValue, ColumnType::Integer | ColumnType::Boolean) => SqlValue::Integer(0),
        (Fallback::ZeroValue, ColumnType::Real) => SqlValue::Real(0.0),
        (Fallback::ZeroValue, ColumnType::Text | ColumnType::Json) => SqlValue::Null,
    }
}

fn coerce(value: &Value, col_type: ColumnType) -> Option<SqlValue> {
    if value.is_null() {
        return None;
    }
    match col_type {
        ColumnType::Integer => coerce_integer(value).map(SqlValue::Integer),
        ColumnType::Real => coerce_real(value).map(SqlValue::Real),
        ColumnType::Boolean => coerce_bool(value).map(|b| SqlValue::Integer(b as i64)),
        ColumnType::Text => coerce_text(value).map(SqlValue::Text),
        ColumnType::Json => Some(SqlValue::Text(value.to_string())),
    }
}

fn coerce_local_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| truncate(n.as_f64()?)),
        Value::String(s) => {
            let s = s.trim();
            s.parse().ok().or_else(|| truncate(s.parse().ok()?))
        }
        _ => None,
    }
}

/// Truncate toward zero, rejecting values that do not fit
fn truncate(f: f64) -> Option<i64> {
    (f.is_finite() && f.abs() < i64::MAX as f64).then(|| f.trunc() as i64)
}

fn coerce_real(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok().filter(|f: &f64| f.is_finite()),
        _ => None,
    }
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(sanitize_text(s)),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Strip control characters other than tab, newline and carriage return
pub fn sanitize_text(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect()
}
