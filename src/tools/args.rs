//! Tool argument parsing helpers
//!
//! MCP clients are loose about types: numbers sometimes arrive as strings
//! and lists as comma-separated text, so both forms are accepted.

use serde_json::{json, Map, Number, Value};
use std::collections::HashMap;
use thiserror::Error;

/// Raw tool arguments as received in `tools/call`
pub type Args = HashMap<String, Value>;

/// Argument validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgError {
    #[error("Missing required parameter: {0}")]
    Missing(&'static str),

    #[error("Invalid parameter '{name}': {reason}")]
    Invalid { name: &'static str, reason: String },
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ArgError {
    ArgError::Invalid {
        name,
        reason: reason.into(),
    }
}

/// Non-empty string argument; empty strings count as absent
pub fn optional_str<'a>(args: &'a Args, key: &'static str) -> Result<Option<&'a str>, ArgError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(invalid(key, format!("expected a string, got {}", other))),
    }
}

pub fn required_str<'a>(args: &'a Args, key: &'static str) -> Result<&'a str, ArgError> {
    optional_str(args, key)?.ok_or(ArgError::Missing(key))
}

/// String argument restricted to a fixed set of values
pub fn optional_choice<'a>(
    args: &'a Args,
    key: &'static str,
    allowed: &[&str],
) -> Result<Option<&'a str>, ArgError> {
    match optional_str(args, key)? {
        Some(value) if !allowed.contains(&value) => Err(invalid(
            key,
            format!("expected one of {}, got '{}'", allowed.join(", "), value),
        )),
        other => Ok(other),
    }
}

pub fn required_choice<'a>(
    args: &'a Args,
    key: &'static str,
    allowed: &[&str],
) -> Result<&'a str, ArgError> {
    optional_choice(args, key, allowed)?.ok_or(ArgError::Missing(key))
}

fn number_from_str(key: &'static str, s: &str) -> Result<Number, ArgError> {
    let s = s.trim();
    if let Ok(n) = s.parse::<i64>() {
        return Ok(Number::from(n));
    }
    s.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| invalid(key, format!("expected a number, got '{}'", s)))
}

/// Numeric argument, kept as a JSON number. Zero is a value, not absence.
pub fn optional_number(args: &Args, key: &'static str) -> Result<Option<Number>, ArgError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(Some(n.clone())),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => number_from_str(key, s).map(Some),
        Some(other) => Err(invalid(key, format!("expected a number, got {}", other))),
    }
}

pub fn required_number(args: &Args, key: &'static str) -> Result<Number, ArgError> {
    optional_number(args, key)?.ok_or(ArgError::Missing(key))
}

/// Parse a number argument (handles both string and number types)
pub fn parse_number_arg(args: &Args, key: &'static str) -> Result<Option<u64>, ArgError> {
    match optional_number(args, key)? {
        None => Ok(None),
        Some(n) => match n.as_u64() {
            Some(v) => Ok(Some(v)),
            None => Err(invalid(key, format!("expected a positive integer, got {}", n))),
        },
    }
}

/// List of strings, from a JSON array or a comma-separated string
pub fn optional_string_array(
    args: &Args,
    key: &'static str,
) -> Result<Option<Vec<String>>, ArgError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(invalid(key, format!("expected strings, got {}", other))),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(Value::String(s)) => Ok(Some(
            s.split(',')
                .map(|f| f.trim())
                .filter(|f| !f.is_empty())
                .map(String::from)
                .collect(),
        )),
        Some(other) => Err(invalid(key, format!("expected a list of strings, got {}", other))),
    }
}

/// List of objects, e.g. invoice line items
pub fn optional_object_array(
    args: &Args,
    key: &'static str,
) -> Result<Option<Vec<Args>>, ArgError> {
    let items = match args.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(items)) => items,
        Some(other) => return Err(invalid(key, format!("expected a list, got {}", other))),
    };

    items
        .iter()
        .map(|item| match item {
            Value::Object(map) => Ok(map.clone().into_iter().collect::<Args>()),
            other => Err(invalid(key, format!("expected objects, got {}", other))),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

pub fn required_object_array(args: &Args, key: &'static str) -> Result<Vec<Args>, ArgError> {
    optional_object_array(args, key)?.ok_or(ArgError::Missing(key))
}

/// `page` object built from `page` / `page_size`, defaults 1 and 20.
/// Only sent when at least one of them is non-zero.
pub fn page_param(args: &Args) -> Result<Option<Value>, ArgError> {
    let number = parse_number_arg(args, "page")?;
    let size = parse_number_arg(args, "page_size")?;

    let requested = |v: Option<u64>| v.is_some_and(|v| v != 0);
    if !requested(number) && !requested(size) {
        return Ok(None);
    }

    Ok(Some(json!({
        "number": number.unwrap_or(1),
        "size": size.unwrap_or(20),
    })))
}

/// `{ "type": ..., "id": ... }` reference used throughout the Teamleader API
pub fn id_ref(kind: &str, id: &str) -> Value {
    json!({ "type": kind, "id": id })
}

/// Reference built only when both halves are present
pub fn optional_id_ref(kind: Option<&str>, id: Option<&str>) -> Option<Value> {
    match (kind, id) {
        (Some(kind), Some(id)) => Some(id_ref(kind, id)),
        _ => None,
    }
}

/// Insert `value` under `key` if present
pub fn set_opt<T: Into<Value>>(map: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value.into());
    }
}
