//! Shape-tolerant payload parsing, validated once at the repository boundary.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{GraphError, Result};

/// Accepts either a bare array or an object carrying the array under `key`.
pub fn collection<T: DeserializeOwned>(payload: Value, key: &'static str) -> Result<Vec<T>> {
	let items = match payload {
		Value::Array(items) => items,
		Value::Object(mut fields) => match fields.remove(key) {
			Some(Value::Array(items)) => items,
			Some(other) => {
				return Err(GraphError::data_shape(
					key,
					format!("`{key}` is {}, expected an array", kind(&other)),
				));
			}
			None => {
				return Err(GraphError::data_shape(key, format!("missing `{key}` collection")));
			}
		},
		other => {
			return Err(GraphError::data_shape(
				key,
				format!("expected an array or an object, got {}", kind(&other)),
			));
		}
	};

	items
		.into_iter()
		.map(serde_json::from_value)
		.collect::<std::result::Result<Vec<T>, _>>()
		.map_err(|e| GraphError::data_shape(key, e))
}

pub fn record<T: DeserializeOwned>(payload: Value, resource: &'static str) -> Result<T> {
	serde_json::from_value(payload).map_err(|e| GraphError::data_shape(resource, e))
}

fn kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
