// lib.rs - Library interface for the torrent metadata viewer

pub mod bencode;
pub mod config;
pub mod engine;
pub mod torrent;

// Re-export commonly used types for easier testing
pub use bencode::{decode, decode_bencode, BValue, BencodeError};
pub use config::Config;
pub use torrent::{FileEntry, FilePath, MetadataError, PieceHash, TorrentError, TorrentMetadata};
