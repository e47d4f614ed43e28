//! Tag decoding for the save-data formats.
//!
//! A tag file is either binary NBT (optionally gzip- or zlib-wrapped) or its
//! textual SNBT notation. [`decode_file`] sniffs the format from the first
//! non-whitespace byte and hands off to the matching parser; both produce
//! the same closed [`Tag`] model.

pub mod binary;
pub mod snbt;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use binary::BinaryError;
pub use snbt::SnbtError;

/// One decoded tag value.
///
/// This is the closed set of shapes the formats can produce, fixed at decode
/// time; the normalizer matches on it exhaustively. Compounds preserve entry
/// order.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(Vec<Tag>),
    Compound(Vec<(String, Tag)>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

/// Errors from decoding a single tag file.
///
/// Always carries the source path; the orchestrator logs these per file and
/// keeps going.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid binary tag data in {path}: {source}")]
    Binary {
        path: PathBuf,
        #[source]
        source: BinaryError,
    },

    #[error("invalid textual tag data in {path}: {source}")]
    Text {
        path: PathBuf,
        #[source]
        source: SnbtError,
    },
}

/// Decode one tag file, sniffing binary vs. textual serialization.
///
/// A first non-whitespace byte of `{` or `[` selects the textual parser;
/// anything else is treated as binary. Binary parsing unwraps the named
/// file-level root so the returned tag is the root value itself.
pub fn decode_file(path: &Path) -> Result<Tag, DecodeError> {
    let bytes = fs::read(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let first = bytes.iter().copied().find(|b| !b.is_ascii_whitespace());
    if matches!(first, Some(b'{') | Some(b'[')) {
        let text = String::from_utf8_lossy(&bytes);
        snbt::parse(&text).map_err(|source| DecodeError::Text {
            path: path.to_path_buf(),
            source,
        })
    } else {
        binary::parse(&bytes).map_err(|source| DecodeError::Binary {
            path: path.to_path_buf(),
            source,
        })
    }
}
