//! Request validation and id assignment.
//!
//! Everything here is pure: it runs before any store mutation, so a rejected request
//! never leaves a partial write behind.

use crate::domain::model::Entity;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

/// A missing, wrong-typed or empty request field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvalidInput(pub String);

impl InvalidInput {
    pub fn new(msg: impl Into<String>) -> Self {
        InvalidInput(msg.into())
    }
}

/// A create collided (case-insensitively) with an existing name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{label} '{name}' already exists")]
pub struct DuplicateName {
    pub label: &'static str,
    pub name: String,
}

pub fn as_object<'a>(
    body: &'a JsonValue,
    label: &str,
) -> Result<&'a Map<String, JsonValue>, InvalidInput> {
    body.as_object()
        .ok_or_else(|| InvalidInput::new(format!("{} request body must be a JSON object", label)))
}

/// Required non-empty string, returned trimmed.
pub fn required_name(
    obj: &Map<String, JsonValue>,
    field: &str,
    label: &str,
) -> Result<String, InvalidInput> {
    match obj.get(field) {
        None | Some(JsonValue::Null) => Err(InvalidInput::new(format!(
            "{} {} is required and must be a non-empty string",
            label, field
        ))),
        Some(v) => non_empty_string(v, field, label),
    }
}

/// Optional non-empty string: absent means "leave unchanged".
pub fn optional_name(
    obj: &Map<String, JsonValue>,
    field: &str,
    label: &str,
) -> Result<Option<String>, InvalidInput> {
    match obj.get(field) {
        None => Ok(None),
        Some(v) => non_empty_string(v, field, label).map(Some),
    }
}

fn non_empty_string(v: &JsonValue, field: &str, label: &str) -> Result<String, InvalidInput> {
    match v.as_str().map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(InvalidInput::new(format!(
            "{} {} must be a non-empty string",
            label, field
        ))),
    }
}

pub fn required_integer(obj: &Map<String, JsonValue>, field: &str) -> Result<i64, InvalidInput> {
    match obj.get(field) {
        None | Some(JsonValue::Null) => Err(InvalidInput::new(format!(
            "{} is required and must be an integer",
            field
        ))),
        Some(v) => integer(v, field),
    }
}

pub fn optional_integer(
    obj: &Map<String, JsonValue>,
    field: &str,
) -> Result<Option<i64>, InvalidInput> {
    match obj.get(field) {
        None => Ok(None),
        Some(v) => integer(v, field).map(Some),
    }
}

fn integer(v: &JsonValue, field: &str) -> Result<i64, InvalidInput> {
    v.as_i64()
        .ok_or_else(|| InvalidInput::new(format!("{} must be an integer", field)))
}

pub fn required_price(obj: &Map<String, JsonValue>, field: &str) -> Result<f64, InvalidInput> {
    match obj.get(field) {
        None | Some(JsonValue::Null) => Err(InvalidInput::new(format!(
            "{} is required and must be a number >= 0",
            field
        ))),
        Some(v) => price(v, field),
    }
}

pub fn optional_price(
    obj: &Map<String, JsonValue>,
    field: &str,
) -> Result<Option<f64>, InvalidInput> {
    match obj.get(field) {
        None => Ok(None),
        Some(v) => price(v, field).map(Some),
    }
}

fn price(v: &JsonValue, field: &str) -> Result<f64, InvalidInput> {
    match v.as_f64() {
        Some(p) if p.is_finite() && p >= 0.0 => Ok(p),
        _ => Err(InvalidInput::new(format!("{} must be a number >= 0", field))),
    }
}

/// Parses the `{ "id": <integer> }` body shared by both delete endpoints.
pub fn parse_delete(body: &JsonValue, label: &str) -> Result<i64, InvalidInput> {
    let obj = as_object(body, label)?;
    required_integer(obj, "id")
}

/// Next id for a file-backed collection: `max(existing) + 1`, or 1 when empty.
/// `None` once the largest id is `i64::MAX`.
pub fn next_id<E: Entity>(items: &[E]) -> Option<i64> {
    match items.iter().map(|item| item.id()).max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}

/// Rejects `name` if any existing record carries it, ignoring case.
pub fn ensure_unique_name<E: Entity>(items: &[E], name: &str) -> Result<(), DuplicateName> {
    let wanted = name.trim().to_lowercase();
    if items.iter().any(|item| item.name().trim().to_lowercase() == wanted) {
        return Err(DuplicateName {
            label: E::LABEL,
            name: name.trim().to_string(),
        });
    }
    Ok(())
}
