//! Entity hydration
//!
//! Raw payloads are loosely typed: fields may be missing, timestamps may be
//! empty strings or zero, nested entities may arrive as partial records.
//! Hydration merges a raw record over the entity defaults, coerces the date
//! fields and recursively hydrates relations before the typed
//! deserialization runs.

mod model;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::domain::endpoint::scalar_to_string;
use crate::domain::DomainError;

pub use model::{Entity, ModelFactory, Normalizer, Relation};

/// Hydrate a raw record into a fully populated entity
pub fn hydrate<E: Entity>(raw: Value) -> Result<E, DomainError> {
    let normalized = normalize::<E>(raw)?;

    serde_json::from_value(normalized)
        .map_err(|e| DomainError::decode(format!("Invalid {} record: {}", E::NAME, e)))
}

/// Merge new field data into an existing entity and hydrate the result
pub fn rehydrate<E: Entity>(entity: &E, patch: Value) -> Result<E, DomainError> {
    let mut current = into_object::<E>(serde_json::to_value(entity)?)?;
    let patch = into_object::<E>(patch)?;

    overlay(&mut current, patch);
    hydrate(Value::Object(current))
}

/// Normalize a raw record of `E` without deserializing it.
///
/// The output is the canonical JSON form of the entity, so normalizing it
/// again yields the same value.
pub fn normalize<E: Entity>(raw: Value) -> Result<Value, DomainError> {
    let mut record = defaults::<E>()?;
    overlay(&mut record, into_object::<E>(raw)?);

    for field in E::DATE_FIELDS {
        if let Some(value) = record.get_mut(*field) {
            *value = coerce_date(E::NAME, field, value.take())?;
        }
    }

    for relation in E::RELATIONS {
        let nested = record.remove(relation.field).unwrap_or(Value::Null);
        record.insert(relation.field.to_string(), (relation.normalize)(nested)?);
    }

    Ok(Value::Object(record))
}

/// Scalar fields of `entity` that differ from the entity defaults
pub fn set_fields<E: Entity>(entity: &E) -> Result<HashMap<String, String>, DomainError> {
    let defaults = defaults::<E>()?;
    let fields = into_object::<E>(serde_json::to_value(entity)?)?;

    Ok(fields
        .into_iter()
        .filter(|(name, value)| defaults.get(name) != Some(value))
        .filter_map(|(name, value)| scalar_to_string(&value).map(|v| (name, v)))
        .collect())
}

fn defaults<E: Entity>() -> Result<Map<String, Value>, DomainError> {
    into_object::<E>(serde_json::to_value(E::default())?)
}

fn into_object<E: Entity>(raw: Value) -> Result<Map<String, Value>, DomainError> {
    match raw {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(DomainError::decode(format!(
            "Expected {} record to be an object, got {}",
            E::NAME,
            json_kind(&other)
        ))),
    }
}

/// Shallow merge. Explicit nulls keep the existing value.
fn overlay(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (name, value) in source {
        if !value.is_null() {
            target.insert(name, value);
        }
    }
}

fn coerce_date(entity: &str, field: &str, value: Value) -> Result<Value, DomainError> {
    if !is_truthy(&value) {
        return Ok(Value::Null);
    }

    let parsed: Option<DateTime<Utc>> = match &value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    };

    match parsed {
        Some(dt) => Ok(serde_json::to_value(dt)?),
        None => Err(DomainError::decode(format!(
            "Invalid date in {}.{}: {}",
            entity, field, value
        ))),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
