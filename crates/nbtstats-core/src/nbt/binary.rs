//! Binary NBT reader.
//!
//! The binary container is a single named root tag, usually a compound,
//! optionally wrapped in gzip or zlib compression. All multi-byte values are
//! big-endian:
//! - named tag = id byte, u16 name length, UTF-8 name, payload
//! - list = element id byte, i32 count, payloads
//! - arrays = i32 count, elements
//! - string = u16 length, UTF-8 bytes

use std::io::{self, Read};

use flate2::read::{GzDecoder, ZlibDecoder};
use thiserror::Error;

use super::Tag;

const TAG_END: u8 = 0;
const TAG_BYTE: u8 = 1;
const TAG_SHORT: u8 = 2;
const TAG_INT: u8 = 3;
const TAG_LONG: u8 = 4;
const TAG_FLOAT: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_BYTE_ARRAY: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_LIST: u8 = 9;
const TAG_COMPOUND: u8 = 10;
const TAG_INT_ARRAY: u8 = 11;
const TAG_LONG_ARRAY: u8 = 12;

/// Nesting limit; save files in the wild stay far below this.
const MAX_DEPTH: usize = 512;

/// Errors from binary tag framing.
#[derive(Debug, Error)]
pub enum BinaryError {
    #[error("truncated data: need {needed} bytes at offset {offset}, have {have}")]
    Truncated {
        offset: usize,
        needed: usize,
        have: usize,
    },

    #[error("unknown tag id {id} at offset {offset}")]
    UnknownTagId { id: u8, offset: usize },

    #[error("negative length {len} at offset {offset}")]
    NegativeLength { len: i32, offset: usize },

    #[error("nesting deeper than {max} levels")]
    TooDeep { max: usize },

    #[error("no root tag")]
    Empty,

    #[error("decompression failed")]
    Decompress(#[source] io::Error),
}

/// Parse a binary tag container, decompressing if wrapped, and unwrap the
/// named root so the returned tag is the root value itself.
pub fn parse(bytes: &[u8]) -> Result<Tag, BinaryError> {
    let decompressed;
    let data: &[u8] = match bytes {
        [0x1f, 0x8b, ..] => {
            decompressed = decompress(GzDecoder::new(bytes))?;
            &decompressed
        }
        // zlib: 0x78 is not a valid tag id, so the magic is unambiguous
        [0x78, ..] => {
            decompressed = decompress(ZlibDecoder::new(bytes))?;
            &decompressed
        }
        _ => bytes,
    };

    let mut reader = Reader { buf: data, pos: 0 };
    let id = reader.read_u8()?;
    if id == TAG_END {
        return Err(BinaryError::Empty);
    }
    if id > TAG_LONG_ARRAY {
        return Err(BinaryError::UnknownTagId { id, offset: 0 });
    }
    let _root_name = reader.read_string()?;
    read_payload(&mut reader, id, 0)
}

fn decompress<R: Read>(mut decoder: R) -> Result<Vec<u8>, BinaryError> {
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(BinaryError::Decompress)?;
    Ok(out)
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], BinaryError> {
        let have = self.buf.len() - self.pos;
        if have < n {
            return Err(BinaryError::Truncated {
                offset: self.pos,
                needed: n,
                have,
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, BinaryError> {
        Ok(self.take(1)?[0])
    }

    fn read_i16(&mut self) -> Result<i16, BinaryError> {
        let b = self.take(2)?;
        Ok(i16::from_be_bytes([b[0], b[1]]))
    }

    fn read_u16(&mut self) -> Result<u16, BinaryError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn read_i32(&mut self) -> Result<i32, BinaryError> {
        let b = self.take(4)?;
        Ok(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_i64(&mut self) -> Result<i64, BinaryError> {
        let b = self.take(8)?;
        Ok(i64::from_be_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    fn read_f32(&mut self) -> Result<f32, BinaryError> {
        let b = self.take(4)?;
        Ok(f32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_f64(&mut self) -> Result<f64, BinaryError> {
        let b = self.take(8)?;
        Ok(f64::from_be_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    /// Length-prefixed string; invalid UTF-8 is replaced, not fatal.
    fn read_string(&mut self) -> Result<String, BinaryError> {
        let len = self.read_u16()? as usize;
        let bytes = self.take(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Signed 32-bit element count; negative counts are framing errors.
    fn read_len(&mut self) -> Result<usize, BinaryError> {
        let len = self.read_i32()?;
        if len < 0 {
            return Err(BinaryError::NegativeLength {
                len,
                offset: self.pos - 4,
            });
        }
        Ok(len as usize)
    }
}

fn read_payload(reader: &mut Reader<'_>, id: u8, depth: usize) -> Result<Tag, BinaryError> {
    if depth > MAX_DEPTH {
        return Err(BinaryError::TooDeep { max: MAX_DEPTH });
    }
    match id {
        TAG_BYTE => Ok(Tag::Byte(reader.read_u8()? as i8)),
        TAG_SHORT => Ok(Tag::Short(reader.read_i16()?)),
        TAG_INT => Ok(Tag::Int(reader.read_i32()?)),
        TAG_LONG => Ok(Tag::Long(reader.read_i64()?)),
        TAG_FLOAT => Ok(Tag::Float(reader.read_f32()?)),
        TAG_DOUBLE => Ok(Tag::Double(reader.read_f64()?)),
        TAG_BYTE_ARRAY => {
            let len = reader.read_len()?;
            let bytes = reader.take(len)?;
            Ok(Tag::ByteArray(bytes.iter().map(|&b| b as i8).collect()))
        }
        TAG_STRING => Ok(Tag::String(reader.read_string()?)),
        TAG_LIST => {
            let elem = reader.read_u8()?;
            let len = reader.read_len()?;
            // end-typed lists must be empty
            if (elem == TAG_END && len > 0) || elem > TAG_LONG_ARRAY {
                return Err(BinaryError::UnknownTagId {
                    id: elem,
                    offset: reader.pos,
                });
            }
            let mut items = Vec::new();
            for _ in 0..len {
                items.push(read_payload(reader, elem, depth + 1)?);
            }
            Ok(Tag::List(items))
        }
        TAG_COMPOUND => {
            let mut entries = Vec::new();
            loop {
                let child = reader.read_u8()?;
                if child == TAG_END {
                    break;
                }
                if child > TAG_LONG_ARRAY {
                    return Err(BinaryError::UnknownTagId {
                        id: child,
                        offset: reader.pos - 1,
                    });
                }
                let name = reader.read_string()?;
                let value = read_payload(reader, child, depth + 1)?;
                entries.push((name, value));
            }
            Ok(Tag::Compound(entries))
        }
        TAG_INT_ARRAY => {
            let len = reader.read_len()?;
            let mut values = Vec::new();
            for _ in 0..len {
                values.push(reader.read_i32()?);
            }
            Ok(Tag::IntArray(values))
        }
        TAG_LONG_ARRAY => {
            let len = reader.read_len()?;
            let mut values = Vec::new();
            for _ in 0..len {
                values.push(reader.read_i64()?);
            }
            Ok(Tag::LongArray(values))
        }
        _ => Err(BinaryError::UnknownTagId {
            id,
            offset: reader.pos,
        }),
    }
}
