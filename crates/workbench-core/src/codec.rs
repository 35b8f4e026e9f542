//! Wire format for craft requests.
//!
//! Layout: `[u16 length][UTF-8 output type, length <= 128][i32 x][i32 y][i32 z]`,
//! all integers big-endian. Decoding is purely syntactic: it never consults
//! the registry, inventories, or stations.

use crate::id::BlockPos;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Longest output-type identifier accepted on the wire, in bytes.
pub const MAX_OUTPUT_TYPE_LEN: usize = 128;

const COORD_LEN: usize = 3 * 4;

/// A client's request to craft one output at one station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CraftRequest {
    pub output_type_id: String,
    pub station: BlockPos,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("output type is {0} bytes, limit is {MAX_OUTPUT_TYPE_LEN}")]
    TooLong(usize),
    #[error("buffer ended after {available} bytes, needed {needed}")]
    EndOfBuffer { needed: usize, available: usize },
    #[error("output type is not valid UTF-8")]
    InvalidUtf8,
    #[error("{0} trailing bytes after request")]
    TrailingBytes(usize),
}

impl CraftRequest {
    pub fn new(output_type_id: impl Into<String>, station: BlockPos) -> Self {
        Self {
            output_type_id: output_type_id.into(),
            station,
        }
    }

    /// Size of the encoded request in bytes.
    pub fn encode_size(&self) -> usize {
        2 + self.output_type_id.len() + COORD_LEN
    }

    /// Append the encoded request to `writer`. Identifiers over the limit are
    /// rejected, never truncated.
    pub fn write(&self, writer: &mut impl BufMut) -> Result<(), CodecError> {
        let bytes = self.output_type_id.as_bytes();
        if bytes.len() > MAX_OUTPUT_TYPE_LEN {
            return Err(CodecError::TooLong(bytes.len()));
        }
        writer.put_u16(bytes.len() as u16);
        writer.put_slice(bytes);
        writer.put_i32(self.station.x);
        writer.put_i32(self.station.y);
        writer.put_i32(self.station.z);
        Ok(())
    }

    /// Read one request from the front of `reader`, leaving any bytes after it.
    pub fn read(reader: &mut impl Buf) -> Result<Self, CodecError> {
        ensure(reader.remaining(), 2)?;
        let len = reader.get_u16() as usize;
        if len > MAX_OUTPUT_TYPE_LEN {
            return Err(CodecError::TooLong(len));
        }

        ensure(reader.remaining(), len)?;
        let mut raw = vec![0u8; len];
        reader.copy_to_slice(&mut raw);
        let output_type_id = String::from_utf8(raw).map_err(|_| CodecError::InvalidUtf8)?;

        ensure(reader.remaining(), COORD_LEN)?;
        let station = BlockPos::new(reader.get_i32(), reader.get_i32(), reader.get_i32());

        Ok(Self {
            output_type_id,
            station,
        })
    }

    pub fn encode(&self) -> Result<Bytes, CodecError> {
        let mut buf = BytesMut::with_capacity(self.encode_size());
        self.write(&mut buf)?;
        Ok(buf.freeze())
    }

    /// Decode a complete message. Trailing bytes are rejected.
    pub fn decode(mut bytes: &[u8]) -> Result<Self, CodecError> {
        let request = Self::read(&mut bytes)?;
        if !bytes.is_empty() {
            return Err(CodecError::TrailingBytes(bytes.len()));
        }
        Ok(request)
    }
}

fn ensure(available: usize, needed: usize) -> Result<(), CodecError> {
    if available < needed {
        return Err(CodecError::EndOfBuffer { needed, available });
    }
    Ok(())
}
