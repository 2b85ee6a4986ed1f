use serde_json::{json, Map, Value};

use super::BValue;

/// Convert a `BValue` into JSON (using Serde JSON `Value`).
///
/// - `Integer(i)` => JSON number
/// - `ByteString(bytes)` => JSON string when valid UTF-8, otherwise `{"_bytes_hex": "..."}`
/// - `List(...)` => JSON array
/// - `Dict(...)` => JSON object, keys in sorted order
pub fn bvalue_to_json(bv: &BValue) -> Value {
	match bv {
		BValue::Integer(i) => json!(i),
		BValue::ByteString(bytes) => match std::str::from_utf8(bytes) {
			Ok(text) => Value::String(text.to_owned()),
			Err(_) => json!({ "_bytes_hex": hex::encode(bytes) }),
		},
		BValue::List(items) => Value::Array(items.iter().map(bvalue_to_json).collect()),
		BValue::Dict(map) => {
			let object: Map<String, Value> = map
				.iter()
				.map(|(k, v)| (k.clone(), bvalue_to_json(v)))
				.collect();
			Value::Object(object)
		}
	}
}
