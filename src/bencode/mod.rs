pub mod bvalue;
pub mod cursor;
pub mod decode;
pub mod error;
pub mod json;

pub use bvalue::BValue;   // re-export
pub use cursor::Cursor;   // re-export
pub use decode::{decode, decode_bencode, decode_with_depth, DEFAULT_MAX_DEPTH};   // re-export
pub use error::BencodeError;   // re-export
pub use json::bvalue_to_json;   // re-export
