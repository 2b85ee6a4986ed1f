use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BValue {
	ByteString(Vec<u8>), // raw bytes, never assumed to be text
	Integer(i64),
	List(Vec<BValue>),
	Dict(BTreeMap<String, BValue>) // keys decoded as UTF-8
}

impl BValue {
	/// Short name of the variant, used in error messages.
	pub fn kind(&self) -> &'static str {
		match self {
			BValue::ByteString(_) => "byte string",
			BValue::Integer(_) => "integer",
			BValue::List(_) => "list",
			BValue::Dict(_) => "dictionary",
		}
	}

	pub fn as_bytes(&self) -> Option<&[u8]> {
		match self {
			BValue::ByteString(b) => Some(b.as_slice()),
			_ => None,
		}
	}

	pub fn as_integer(&self) -> Option<i64> {
		match self {
			BValue::Integer(i) => Some(*i),
			_ => None,
		}
	}

	pub fn as_list(&self) -> Option<&[BValue]> {
		match self {
			BValue::List(items) => Some(items.as_slice()),
			_ => None,
		}
	}

	pub fn as_dict(&self) -> Option<&BTreeMap<String, BValue>> {
		match self {
			BValue::Dict(map) => Some(map),
			_ => None,
		}
	}
}

impl From<&str> for BValue {
	fn from(s: &str) -> Self {
		BValue::ByteString(s.as_bytes().to_vec())
	}
}

impl From<i64> for BValue {
	fn from(i: i64) -> Self {
		BValue::Integer(i)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_accessors_match_variant() {
		let value = BValue::from("spam");
		assert_eq!(value.as_bytes(), Some(&b"spam"[..]));
		assert_eq!(value.as_integer(), None);
		assert_eq!(value.kind(), "byte string");

		let value = BValue::from(7);
		assert_eq!(value.as_integer(), Some(7));
		assert!(value.as_list().is_none());
		assert!(value.as_dict().is_none());
	}
}
