//! JSON-based configuration loader
//!
//! Reads a flat parameter mapping from a JSON file (by default under
//! `configs/`) and converts individual values into typed fields.

use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};

/// Default directory holding the shipped example configurations
pub const DEFAULT_CONFIG_DIR: &str = "configs";

/// Load a flat parameter mapping from a JSON file
pub fn load_config_file(path: &Path) -> ConfigResult<Map<String, Value>> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ConfigError::Malformed(format!("found {}", other))),
        Err(e) => Err(ConfigError::Malformed(e.to_string())),
    }
}

/// A finite number
pub(crate) fn as_f64(name: &str, value: &Value) -> ConfigResult<f64> {
    match value.as_f64() {
        Some(x) if x.is_finite() => Ok(x),
        _ => Err(ConfigError::invalid_type(name, format!("expected a number, found {}", value))),
    }
}

/// A number, or null for "unused"
pub(crate) fn as_optional_f64(name: &str, value: &Value) -> ConfigResult<Option<f64>> {
    match value {
        Value::Null => Ok(None),
        other => as_f64(name, other).map(Some),
    }
}

/// A per-period sequence; a bare number is a one-element sequence
pub(crate) fn as_sequence(name: &str, value: &Value) -> ConfigResult<Vec<f64>> {
    match value {
        Value::Array(items) => items.iter().map(|item| as_f64(name, item)).collect(),
        Value::Number(_) => Ok(vec![as_f64(name, value)?]),
        other => Err(ConfigError::invalid_type(
            name,
            format!("expected a number or a list of numbers, found {}", other),
        )),
    }
}

/// Extra grid points; null entries are placeholders and are skipped
pub(crate) fn as_extra_points(name: &str, value: &Value) -> ConfigResult<Vec<f64>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(|item| as_f64(name, item))
            .collect(),
        other => as_sequence(name, other),
    }
}

/// A non-negative integer (integral floats such as `7.0` are accepted)
pub(crate) fn as_count(name: &str, value: &Value) -> ConfigResult<usize> {
    if let Some(n) = value.as_u64() {
        return usize::try_from(n)
            .map_err(|_| ConfigError::out_of_range(name, n as f64, "count too large"));
    }
    match value.as_f64() {
        Some(x) if x >= 0.0 && x.fract() == 0.0 && x <= usize::MAX as f64 => Ok(x as usize),
        Some(x) => Err(ConfigError::out_of_range(name, x, "must be a non-negative integer")),
        None => {
            let reason = format!("expected an integer, found {}", value);
            Err(ConfigError::invalid_type(name, reason))
        }
    }
}

pub(crate) fn as_bool(name: &str, value: &Value) -> ConfigResult<bool> {
    value.as_bool().ok_or_else(|| {
        ConfigError::invalid_type(name, format!("expected true or false, found {}", value))
    })
}
