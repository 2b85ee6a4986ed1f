use thiserror::Error;

use crate::bencode::BencodeError;

/// The decoded value does not describe a valid torrent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetadataError {
	#[error("Root of .torrent must be a dictionary, found {0}")]
	NotADictionary(&'static str),

	#[error("Missing '{0}'")]
	MissingField(String),

	#[error("'{field}' must be a {expected}, found {found}")]
	WrongType {
		field: String,
		expected: &'static str,
		found: &'static str,
	},

	#[error("Field 'pieces' has wrong size: {0} is not a multiple of 20")]
	PiecesLength(usize),

	#[error("'creation date' {0} is not a representable timestamp")]
	InvalidCreationDate(i64),

	#[error("'{0}' has no path segments")]
	EmptyPath(String),
}

/// Anything that can go wrong between a file on disk and a [`TorrentMetadata`](super::TorrentMetadata).
#[derive(Debug, Error)]
pub enum TorrentError {
	#[error("I/O error while reading torrent: {0}")]
	Io(#[from] std::io::Error),

	#[error("Bencode error: {0}")]
	Decode(#[from] BencodeError),

	#[error("Invalid torrent: {0}")]
	Metadata(#[from] MetadataError),
}
