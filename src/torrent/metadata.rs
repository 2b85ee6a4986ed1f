use std::{collections::BTreeMap, fmt, fs, path::Path};

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Serialize, Serializer};

use crate::bencode::{decode, BValue};
use crate::torrent::error::{MetadataError, TorrentError};

/// SHA-1 digests are 20 bytes each.
pub const PIECE_HASH_LEN: usize = 20;

type Dict = BTreeMap<String, BValue>;

/// The hash of one piece, in piece order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceHash(pub [u8; PIECE_HASH_LEN]);

impl fmt::Display for PieceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl Serialize for PieceHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

/// Path of a file inside a multi-file torrent.
///
/// A one-segment path is kept as `Single`, longer paths as `Segments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilePath {
    Single(String),
    Segments(Vec<String>),
}

impl FilePath {
    pub fn segments(&self) -> Vec<&str> {
        match self {
            FilePath::Single(name) => vec![name.as_str()],
            FilePath::Segments(parts) => parts.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments().join("/"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub path: FilePath,
    pub length: i64,
}

/// Typed view of a .torrent file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TorrentMetadata {
    pub announce: Option<String>,           // Primary tracker URL
    pub announce_list: Option<Vec<String>>, // Every tier flattened, in order
    pub creation_date: Option<DateTime<Utc>>,
    pub length: Option<i64>,                // Single-file torrents only
    pub name: Option<String>,
    pub piece_length: i64,
    pub pieces: Vec<PieceHash>,
    pub files: Option<Vec<FileEntry>>,      // Multi-file torrents only
}

impl TorrentMetadata {
    /// Reads a .torrent file from disk and parses its contents.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TorrentError> {
        let buf = fs::read(path)?;
        Self::from_bytes(&buf)
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self, TorrentError> {
        let value = decode(buf)?;
        Ok(Self::from_bvalue(&value)?)
    }

    /// Creates a `TorrentMetadata` from a decoded top-level dictionary.
    ///
    /// Stops at the first missing required field or wrongly typed value.
    pub fn from_bvalue(value: &BValue) -> Result<Self, MetadataError> {
        let root = match value {
            BValue::Dict(m) => m,
            other => return Err(MetadataError::NotADictionary(other.kind())),
        };

        let announce = get_string(root, "", "announce")?;
        let announce_list = root
            .get("announce-list")
            .map(flatten_trackers)
            .transpose()?;
        let creation_date = get_integer(root, "", "creation date")?
            .map(|secs| {
                DateTime::<Utc>::from_timestamp(secs, 0)
                    .ok_or(MetadataError::InvalidCreationDate(secs))
            })
            .transpose()?;

        let info = require(get_dict(root, "", "info")?, "info")?;

        let length = get_integer(info, "info.", "length")?;
        let name = get_string(info, "info.", "name")?;
        let piece_length = require(get_integer(info, "info.", "piece length")?, "info.piece length")?;
        let pieces = split_pieces(require(get_bytes(info, "info.", "pieces")?, "info.pieces")?)?;
        let files = info.get("files").map(parse_files).transpose()?;

        debug!(
            "Parsed torrent {:?}: {} pieces of {} bytes",
            name,
            pieces.len(),
            piece_length
        );

        Ok(TorrentMetadata {
            announce,
            announce_list,
            creation_date,
            length,
            name,
            piece_length,
            pieces,
            files,
        })
    }

    pub fn is_multi_file(&self) -> bool {
        self.files.is_some()
    }

    /// Size of the whole payload: `length`, or the sum over `files`.
    pub fn total_length(&self) -> Option<i64> {
        match (&self.files, self.length) {
            (Some(files), _) => files
                .iter()
                .try_fold(0i64, |acc, f| acc.checked_add(f.length)),
            (None, length) => length,
        }
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// Number of pieces the payload size implies. Not checked against `pieces`.
    pub fn expected_piece_count(&self) -> Option<u64> {
        let total = u64::try_from(self.total_length()?).ok()?;
        let piece_length = u64::try_from(self.piece_length).ok().filter(|&l| l > 0)?;
        Some(total.div_ceil(piece_length))
    }
}

fn require<T>(value: Option<T>, field: &str) -> Result<T, MetadataError> {
    value.ok_or_else(|| MetadataError::MissingField(field.to_string()))
}

fn wrong_type(field: String, expected: &'static str, found: &BValue) -> MetadataError {
    MetadataError::WrongType {
        field,
        expected,
        found: found.kind(),
    }
}

/// Looks up a key and returns its bytes if present.
/// Returns an error if the value is of the wrong type.
fn get_bytes<'a>(dict: &'a Dict, scope: &str, key: &str) -> Result<Option<&'a [u8]>, MetadataError> {
    match dict.get(key) {
        None => Ok(None),
        Some(BValue::ByteString(b)) => Ok(Some(b.as_slice())),
        Some(other) => Err(wrong_type(format!("{scope}{key}"), "byte string", other)),
    }
}

/// Gets a ByteString from the dictionary as text. Invalid UTF-8 is replaced, not rejected.
fn get_string(dict: &Dict, scope: &str, key: &str) -> Result<Option<String>, MetadataError> {
    Ok(get_bytes(dict, scope, key)?.map(utf8))
}

fn get_integer(dict: &Dict, scope: &str, key: &str) -> Result<Option<i64>, MetadataError> {
    match dict.get(key) {
        None => Ok(None),
        Some(BValue::Integer(i)) => Ok(Some(*i)),
        Some(other) => Err(wrong_type(format!("{scope}{key}"), "integer", other)),
    }
}

fn get_dict<'a>(dict: &'a Dict, scope: &str, key: &str) -> Result<Option<&'a Dict>, MetadataError> {
    match dict.get(key) {
        None => Ok(None),
        Some(BValue::Dict(d)) => Ok(Some(d)),
        Some(other) => Err(wrong_type(format!("{scope}{key}"), "dictionary", other)),
    }
}

fn utf8(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Flattens tracker tiers nested to any depth into one ordered list.
fn flatten_trackers(value: &BValue) -> Result<Vec<String>, MetadataError> {
    fn walk(value: &BValue, out: &mut Vec<String>) -> Result<(), MetadataError> {
        match value {
            BValue::List(items) => items.iter().try_for_each(|item| walk(item, out)),
            BValue::ByteString(b) => {
                out.push(utf8(b));
                Ok(())
            }
            other => Err(wrong_type("announce-list".to_string(), "byte string", other)),
        }
    }

    if !matches!(value, BValue::List(_)) {
        return Err(wrong_type("announce-list".to_string(), "list", value));
    }
    let mut trackers = Vec::new();
    walk(value, &mut trackers)?;
    Ok(trackers)
}

fn split_pieces(raw: &[u8]) -> Result<Vec<PieceHash>, MetadataError> {
    if raw.len() % PIECE_HASH_LEN != 0 {
        return Err(MetadataError::PiecesLength(raw.len()));
    }

    Ok(raw
        .chunks_exact(PIECE_HASH_LEN)
        .map(|chunk| {
            let mut hash = [0u8; PIECE_HASH_LEN];
            hash.copy_from_slice(chunk);
            PieceHash(hash)
        })
        .collect())
}

fn parse_files(value: &BValue) -> Result<Vec<FileEntry>, MetadataError> {
    let entries = value
        .as_list()
        .ok_or_else(|| wrong_type("info.files".to_string(), "list", value))?;

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let scope = format!("info.files[{index}].");
            let dict = entry
                .as_dict()
                .ok_or_else(|| wrong_type(format!("info.files[{index}]"), "dictionary", entry))?;

            let length = require(get_integer(dict, &scope, "length")?, &format!("{scope}length"))?;
            let path = match dict.get("path") {
                None => return Err(MetadataError::MissingField(format!("{scope}path"))),
                Some(path) => parse_path(path, &format!("{scope}path"))?,
            };
            Ok(FileEntry { path, length })
        })
        .collect()
}

fn parse_path(value: &BValue, field: &str) -> Result<FilePath, MetadataError> {
    let segments = match value {
        BValue::ByteString(b) => return Ok(FilePath::Single(utf8(b))),
        BValue::List(segments) => segments,
        other => return Err(wrong_type(field.to_string(), "list", other)),
    };

    let mut names = segments
        .iter()
        .map(|segment| match segment {
            BValue::ByteString(b) => Ok(utf8(b)),
            other => Err(wrong_type(field.to_string(), "byte string", other)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    match names.len() {
        0 => Err(MetadataError::EmptyPath(field.to_string())),
        1 => Ok(FilePath::Single(names.remove(0))),
        _ => Ok(FilePath::Segments(names)),
    }
}
