// src/engine.rs
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use crate::bencode::{bvalue_to_json, decode_with_depth, BValue};
use crate::config::Config;
use crate::torrent::TorrentMetadata;

/// Inspect bencoded data and .torrent files.
#[derive(Debug, Parser)]
#[command(name = "torview", version)]
pub struct Cli {
    /// Config file, defaults to ./torview.toml when present
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decode a bencoded string and print it as JSON
    Decode { bencoded: String },

    /// Print the metadata of a .torrent file
    Info {
        file: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// List every piece hash
        #[arg(long)]
        pieces: bool,
    },
}

pub fn use_command<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Decode { bencoded } => {
            let value = decode_value(bencoded.as_bytes(), &config)?;
            writeln!(out, "{}", serde_json::to_string(&bvalue_to_json(&value))?)?;
        }
        Command::Info { file, json, pieces } => {
            let buf = fs::read(&file).with_context(|| format!("Cannot read {}", file.display()))?;
            let value = decode_value(&buf, &config)
                .with_context(|| format!("Cannot decode {}", file.display()))?;
            let torrent = TorrentMetadata::from_bvalue(&value)
                .with_context(|| format!("Invalid torrent {}", file.display()))?;
            info!("Loaded {} ({} pieces)", file.display(), torrent.piece_count());

            if let Some(expected) = torrent.expected_piece_count() {
                if expected != torrent.piece_count() as u64 {
                    warn!(
                        "Torrent declares {} pieces but its size implies {}",
                        torrent.piece_count(),
                        expected
                    );
                }
            }

            if json || config.json {
                writeln!(out, "{}", serde_json::to_string_pretty(&torrent)?)?;
            } else {
                print_info(out, &torrent, pieces || config.list_pieces)?;
            }
        }
    }
    Ok(())
}

fn decode_value(buf: &[u8], config: &Config) -> Result<BValue> {
    let (consumed, value) = decode_with_depth(buf, config.max_depth)?;
    if consumed < buf.len() {
        warn!("Ignoring {} trailing bytes", buf.len() - consumed);
    }
    Ok(value)
}

fn print_info<W: Write>(out: &mut W, torrent: &TorrentMetadata, list_pieces: bool) -> Result<()> {
    fn or_unknown<T: ToString>(value: Option<T>) -> String {
        value.map_or_else(|| "-".to_string(), |v| v.to_string())
    }

    writeln!(out, "Tracker URL: {}", or_unknown(torrent.announce.as_deref()))?;
    if let Some(trackers) = &torrent.announce_list {
        writeln!(out, "Trackers:")?;
        for tracker in trackers {
            writeln!(out, "  {}", tracker)?;
        }
    }
    writeln!(out, "Created: {}", or_unknown(torrent.creation_date))?;
    writeln!(out, "Name: {}", or_unknown(torrent.name.as_deref()))?;
    writeln!(out, "Length: {}", or_unknown(torrent.total_length()))?;
    writeln!(out, "Piece Length: {}", torrent.piece_length)?;
    writeln!(out, "Number of Pieces: {}", torrent.piece_count())?;

    if let Some(files) = &torrent.files {
        writeln!(out, "Files:")?;
        for file in files {
            writeln!(out, "  {:>12}  {}", file.length, file.path)?;
        }
    }

    if list_pieces {
        writeln!(out, "Piece Hashes:")?;
        for piece_hash in &torrent.pieces {
            writeln!(out, "{}", piece_hash)?;
        }
    }
    Ok(())
}
