//! Framing for the fingerprint stream and the changed-block stream.

use std::io::{Read, Write};

use checksum::FingerprintStream;

use crate::error::CodecError;
use crate::message::{tag, BlockMessage};

/// Writes the fingerprint stream as produced by [`checksum::hash_reader`].
pub fn write_fingerprint_stream<W: Write>(
    writer: &mut W,
    stream: &FingerprintStream,
) -> Result<(), CodecError> {
    stream.write_to(writer)?;
    Ok(())
}

/// Reads a fingerprint stream previously written by
/// [`write_fingerprint_stream`].
pub fn read_fingerprint_stream<R: Read>(reader: &mut R) -> Result<FingerprintStream, CodecError> {
    Ok(FingerprintStream::read_from(reader)?)
}

/// Writes one changed-block message.
///
/// Frame layout: `offset: u64`, `tag: u8`, then for [`BlockMessage::Data`]
/// the payload bytes (`data.len()` of them, with no length prefix — the
/// reader derives the expected length from the negotiated block size and
/// the source file size). [`BlockMessage::Hole`] carries no payload.
pub fn write_block_message<W: Write>(
    writer: &mut W,
    message: &BlockMessage,
) -> Result<(), CodecError> {
    match message {
        BlockMessage::Data { offset, data } => {
            writer.write_all(&offset.to_le_bytes())?;
            writer.write_all(&[tag::DATA])?;
            writer.write_all(data)?;
        }
        BlockMessage::Hole { offset, .. } => {
            writer.write_all(&offset.to_le_bytes())?;
            writer.write_all(&[tag::HOLE])?;
        }
    }
    Ok(())
}

/// Reads one changed-block message, or `None` once the stream has cleanly
/// ended (no more bytes follow where the next message's offset would
/// begin).
///
/// `block_size` and `source_size` are the same values carried by the
/// session's fingerprint stream and leading `sourceSize` field; they let
/// the reader compute the implied length of both `DATA` and `HOLE` without
/// the wire carrying it explicitly. A message whose offset is within
/// `block_size` of `source_size` is the final, possibly-short block.
pub fn read_block_message<R: Read>(
    reader: &mut R,
    block_size: u64,
    source_size: u64,
) -> Result<Option<BlockMessage>, CodecError> {
    let Some(offset) = read_u64_or_eof(reader)? else {
        return Ok(None);
    };

    let mut tag_buf = [0u8; 1];
    reader.read_exact(&mut tag_buf)?;

    let len = block_size.min(source_size.saturating_sub(offset));

    match tag_buf[0] {
        tag::DATA => {
            let mut data = vec![0u8; len as usize];
            reader.read_exact(&mut data)?;
            Ok(Some(BlockMessage::Data { offset, data }))
        }
        tag::HOLE => Ok(Some(BlockMessage::Hole { offset, len })),
        other => Err(CodecError::UnknownTag(other)),
    }
}

/// Reads a little-endian `u64`, distinguishing a clean end-of-stream (no
/// bytes at all) from a truncated one (some, but fewer than 8, bytes).
fn read_u64_or_eof<R: Read>(reader: &mut R) -> Result<Option<u64>, std::io::Error> {
    let mut buf = [0u8; 8];
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    if filled == 0 {
        return Ok(None);
    }
    if filled < buf.len() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "truncated block message offset",
        ));
    }
    Ok(Some(u64::from_le_bytes(buf)))
}

/// Writes the changed-block stream's leading `sourceSize` field.
pub fn write_source_size<W: Write>(writer: &mut W, source_size: u64) -> Result<(), CodecError> {
    writer.write_all(&source_size.to_le_bytes())?;
    Ok(())
}

/// Reads the changed-block stream's leading `sourceSize` field.
pub fn read_source_size<R: Read>(reader: &mut R) -> Result<u64, CodecError> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}
