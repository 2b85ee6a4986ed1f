use std::collections::BTreeMap;

use log::{debug, trace};

use super::cursor::Cursor;
use super::error::BencodeError;
use crate::bencode::bvalue::BValue;

/// Nesting limit used by [`decode`] and [`decode_bencode`].
pub const DEFAULT_MAX_DEPTH: usize = 64;

const INTEGER_BEGIN: u8 = b'i';
const LIST_BEGIN: u8 = b'l';
const DICT_BEGIN: u8 = b'd';
const TYPE_END: u8 = b'e';
const COLON: u8 = b':';
const MINUS: u8 = b'-';

/// Decodes the first value in `input`. Bytes after that value are ignored.
pub fn decode(input: &[u8]) -> Result<BValue, BencodeError> {
	decode_bencode(input).map(|(_consumed, value)| value)
}

/// Decodes the first value in `input`, returning it with the number of bytes it spans.
pub fn decode_bencode(input: &[u8]) -> Result<(usize, BValue), BencodeError> {
	decode_with_depth(input, DEFAULT_MAX_DEPTH)
}

/// Like [`decode_bencode`] with an explicit limit on list/dictionary nesting.
pub fn decode_with_depth(input: &[u8], max_depth: usize) -> Result<(usize, BValue), BencodeError> {
	let mut decoder = Decoder {
		cursor: Cursor::new(input),
		max_depth,
	};
	let value = decoder.parse_value(0)?;
	let consumed = decoder.cursor.position();
	debug!("Decoded {} of {} bytes as {}", consumed, input.len(), value.kind());
	Ok((consumed, value))
}

struct Decoder<'a> {
	cursor: Cursor<'a>,
	max_depth: usize,
}

impl<'a> Decoder<'a> {
	fn parse_value(&mut self, depth: usize) -> Result<BValue, BencodeError> {
		if depth > self.max_depth {
			return Err(BencodeError::TooDeep(self.max_depth));
		}

		match self.cursor.peek()? {
			INTEGER_BEGIN => self.parse_integer(),
			LIST_BEGIN => self.parse_list(depth),
			DICT_BEGIN => self.parse_dict(depth),
			c if c.is_ascii_digit() => self.parse_byte_string().map(|b| BValue::ByteString(b.to_vec())),
			c => Err(BencodeError::syntax(
				self.cursor.position(),
				format!("Unknown value identifier {:?}", c as char),
			)),
		}
	}

	/// `i<digits>e`, with an optional leading '-'.
	fn parse_integer(&mut self) -> Result<BValue, BencodeError> {
		self.expect(INTEGER_BEGIN, "Expected integer begin marker")?;
		let start = self.cursor.position();

		let negative = self.cursor.next()? == MINUS;
		if !negative {
			self.cursor.unread();
		}

		let magnitude = self.parse_base_ten()?;
		let signed = if negative {
			-i128::from(magnitude)
		} else {
			i128::from(magnitude)
		};
		let integer = i64::try_from(signed)
			.map_err(|_| BencodeError::syntax(start, "Integer out of range"))?;

		self.expect(TYPE_END, "Expected integer end marker")?;
		Ok(BValue::Integer(integer))
	}

	/// `<length>:<bytes>`; the payload is returned untouched.
	fn parse_byte_string(&mut self) -> Result<&'a [u8], BencodeError> {
		let start = self.cursor.position();
		let len = usize::try_from(self.parse_base_ten()?)
			.map_err(|_| BencodeError::syntax(start, "Byte string length out of range"))?;
		self.expect(COLON, "Expected colon")?;
		self.cursor.take(len)
	}

	fn parse_list(&mut self, depth: usize) -> Result<BValue, BencodeError> {
		self.expect(LIST_BEGIN, "Expected list begin marker")?;
		let mut items = Vec::new();

		while self.cursor.next()? != TYPE_END {
			self.cursor.unread();
			items.push(self.parse_value(depth + 1)?);
		}

		Ok(BValue::List(items))
	}

	fn parse_dict(&mut self, depth: usize) -> Result<BValue, BencodeError> {
		self.expect(DICT_BEGIN, "Expected dictionary")?;
		let mut map = BTreeMap::new();

		while self.cursor.next()? != TYPE_END {
			self.cursor.unread();
			let key = self.parse_dict_key()?;
			let value = self.parse_value(depth + 1)?;
			trace!("Dictionary entry {:?}: {}", key, value.kind());
			// Duplicate keys: the last one wins.
			map.insert(key, value);
		}

		Ok(BValue::Dict(map))
	}

	fn parse_dict_key(&mut self) -> Result<String, BencodeError> {
		let position = self.cursor.position();
		if !self.cursor.peek()?.is_ascii_digit() {
			return Err(BencodeError::syntax(position, "Dictionary key must be a byte string"));
		}
		let bytes = self.parse_byte_string()?;
		Ok(String::from_utf8_lossy(bytes).into_owned())
	}

	/// Reads a non-empty run of ASCII digits. The first non-digit is left unread.
	fn parse_base_ten(&mut self) -> Result<u64, BencodeError> {
		let start = self.cursor.position();
		let mut value: u64 = 0;
		let mut digits = 0usize;

		loop {
			let byte = self.cursor.next()?;
			if !byte.is_ascii_digit() {
				self.cursor.unread();
				break;
			}
			value = value
				.checked_mul(10)
				.and_then(|v| v.checked_add(u64::from(byte - b'0')))
				.ok_or_else(|| BencodeError::syntax(start, "Number too large"))?;
			digits += 1;
		}

		if digits == 0 {
			return Err(BencodeError::syntax(start, "Expected digits"));
		}
		Ok(value)
	}

	fn expect(&mut self, marker: u8, message: &str) -> Result<(), BencodeError> {
		let position = self.cursor.position();
		if self.cursor.next()? != marker {
			return Err(BencodeError::syntax(position, message));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(s: &str) -> BValue {
        BValue::ByteString(s.as_bytes().to_vec())
    }

    #[test]
    fn test_decode_integer() {
        let input = b"i42e";
        let (consumed, value) = decode_bencode(input).unwrap();
        assert_eq!(consumed, input.len());
        assert_eq!(value, BValue::Integer(42));
    }

    #[test]
    fn test_decode_negative_integer() {
        let input = b"i-13e";
        let (consumed, value) = decode_bencode(input).unwrap();
        assert_eq!(consumed, input.len());
        assert_eq!(value, BValue::Integer(-13));
    }

    #[test]
    fn test_decode_integer_zero() {
        assert_eq!(decode(b"i0e").unwrap(), BValue::Integer(0));
    }

    #[test]
    fn test_decode_integer_extremes() {
        assert_eq!(decode(b"i9223372036854775807e").unwrap(), BValue::Integer(i64::MAX));
        assert_eq!(decode(b"i-9223372036854775808e").unwrap(), BValue::Integer(i64::MIN));
        assert!(decode(b"i9223372036854775808e").unwrap_err().is_syntax());
        assert!(decode(b"i99999999999999999999999e").unwrap_err().is_syntax());
    }

    #[test]
    fn test_decode_leading_zeros_accepted() {
        assert_eq!(decode(b"i007e").unwrap(), BValue::Integer(7));
    }

    #[test]
    fn test_decode_string() {
        let input = b"5:hello";
        let (consumed, value) = decode_bencode(input).unwrap();
        assert_eq!(consumed, input.len());
        assert_eq!(value, bytes("hello"));
    }

    #[test]
    fn test_decode_empty_string() {
        assert_eq!(decode(b"0:").unwrap(), bytes(""));
    }

    #[test]
    fn test_decode_binary_string_unaltered() {
        let mut input = b"4:".to_vec();
        input.extend_from_slice(&[0xff, 0x00, b'e', 0x80]);
        assert_eq!(decode(&input).unwrap(), BValue::ByteString(vec![0xff, 0x00, b'e', 0x80]));
    }

    #[test]
    fn test_decode_list() {
        let input = b"l4:spam4:eggse";
        let (consumed, value) = decode_bencode(input).unwrap();
        assert_eq!(consumed, input.len());
        assert_eq!(value, BValue::List(vec![bytes("spam"), bytes("eggs")]));
    }

    #[test]
    fn test_decode_nested_list() {
        let input = b"l4:spaml3:eggi3eee";
        let (consumed, value) = decode_bencode(input).unwrap();
        assert_eq!(consumed, input.len());
        assert_eq!(
            value,
            BValue::List(vec![
                bytes("spam"),
                BValue::List(vec![bytes("egg"), BValue::Integer(3)]),
            ])
        );
    }

    #[test]
    fn test_decode_dict() {
        let input = b"d3:cow3:moo4:spam4:eggse";
        let (consumed, value) = decode_bencode(input).unwrap();
        assert_eq!(consumed, input.len());
        let mut expected_map = BTreeMap::new();
        expected_map.insert("cow".to_string(), bytes("moo"));
        expected_map.insert("spam".to_string(), bytes("eggs"));
        assert_eq!(value, BValue::Dict(expected_map));
    }

    #[test]
    fn test_decode_empty_dict() {
        assert_eq!(decode(b"de").unwrap(), BValue::Dict(BTreeMap::new()));
    }

    #[test]
    fn test_decode_unsorted_and_duplicate_keys() {
        let value = decode(b"d1:bi1e1:ai2e1:bi3ee").unwrap();
        let map = value.as_dict().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], BValue::Integer(2));
        assert_eq!(map["b"], BValue::Integer(3));
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let (consumed, value) = decode_bencode(b"i1egarbage").unwrap();
        assert_eq!(consumed, 3);
        assert_eq!(value, BValue::Integer(1));
    }

    #[test]
    fn test_decode_depth_limit() {
        assert!(decode_with_depth(b"llleee", 2).is_ok());
        assert_eq!(decode_with_depth(b"lllleeee", 2), Err(BencodeError::TooDeep(2)));

        let hostile = [vec![b'l'; 10_000], vec![b'e'; 10_000]].concat();
        assert_eq!(decode(&hostile), Err(BencodeError::TooDeep(DEFAULT_MAX_DEPTH)));
    }

    //
    // Malformed Inputs: Test expected failures
    //

    #[test]
    fn test_decode_empty_input() {
        assert!(decode(b"").unwrap_err().is_bounds());
    }

    #[test]
    fn test_decode_integer_missing_e() {
        assert!(decode(b"i42").unwrap_err().is_bounds());
        assert!(decode(b"i42x").unwrap_err().is_syntax());
    }

    #[test]
    fn test_decode_integer_without_digits() {
        assert!(decode(b"ie").unwrap_err().is_syntax());
        assert!(decode(b"i-e").unwrap_err().is_syntax());
        assert!(decode(b"i+1e").unwrap_err().is_syntax());
    }

    #[test]
    fn test_decode_string_missing_colon() {
        assert!(decode(b"5hello").unwrap_err().is_syntax());
    }

    #[test]
    fn test_decode_string_too_short() {
        assert!(decode(b"4:ab").unwrap_err().is_bounds());
    }

    #[test]
    fn test_decode_unknown_marker() {
        let err = decode(b"x").unwrap_err();
        assert_eq!(err, BencodeError::syntax(0, "Unknown value identifier 'x'"));
    }

    #[test]
    fn test_decode_list_unclosed() {
        assert!(decode(b"l4:spam").unwrap_err().is_bounds());
    }

    #[test]
    fn test_decode_dict_unclosed() {
        assert!(decode(b"d3:cow3:moo").unwrap_err().is_bounds());
    }

    #[test]
    fn test_decode_dict_key_not_string() {
        let err = decode(b"di42e4:spame").unwrap_err();
        assert!(err.is_syntax());
    }
}
