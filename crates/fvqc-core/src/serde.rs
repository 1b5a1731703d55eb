use ::serde::de::DeserializeOwned;
use ::serde::Serialize;
use serde_json::Value;

use crate::errors::{ErrorInfo, QcError};

fn serde_error(code: &str, err: impl ToString) -> QcError {
    QcError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Rebuilds every JSON object with its keys sorted.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        scalar => scalar,
    }
}

/// Compact JSON with sorted object keys; the input of [`crate::stable_hash_string`].
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, QcError> {
    let tree = serde_json::to_value(value).map_err(|err| serde_error("json-encode", err))?;
    serde_json::to_vec(&sort_keys(tree)).map_err(|err| serde_error("json-write", err))
}

/// Decodes a JSON setup document.
pub fn from_json_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, QcError> {
    serde_json::from_slice(data).map_err(|err| serde_error("json-read", err))
}

/// Decodes a YAML setup document.
pub fn from_yaml_str<T: DeserializeOwned>(text: &str) -> Result<T, QcError> {
    serde_yaml::from_str(text).map_err(|err| serde_error("yaml-read", err))
}
