pub mod error;
pub mod metadata;

pub use error::{MetadataError, TorrentError};
pub use metadata::{FileEntry, FilePath, PieceHash, TorrentMetadata, PIECE_HASH_LEN};
