//! Optional zstd wrapping over a raw byte sink/source.
//!
//! Each peer owns one [`OutStream`] and one [`InStream`] per socket half.
//! Compression is an all-or-nothing choice made once at session setup (the
//! target's `--no-compress` flag); the variant chosen never changes within a
//! session.

use std::io::{self, Read, Write};

use compress::zstd::{CountingZstdDecoder, CountingZstdEncoder};

/// A byte sink that is either written through directly or wrapped in a
/// streaming zstd encoder.
pub enum OutStream<W: Write> {
    /// No compression; bytes are written as-is.
    Plain(W),
    /// Bytes are compressed before reaching `W`.
    Zstd(CountingZstdEncoder<W>),
}

impl<W: Write> OutStream<W> {
    /// Wraps `inner` with no compression.
    pub const fn plain(inner: W) -> Self {
        Self::Plain(inner)
    }

    /// Wraps `inner` with a zstd encoder at `level`.
    pub fn zstd(inner: W, level: i32) -> io::Result<Self> {
        Ok(Self::Zstd(CountingZstdEncoder::with_sink(inner, level)?))
    }

    /// Flushes and finalizes any compression frame, returning the inner sink.
    ///
    /// This is the flush boundary between the fingerprint stream and the
    /// changed-block stream: callers invoke it before handing the connection
    /// to the peer for the reverse direction.
    pub fn finish(self) -> io::Result<W> {
        match self {
            Self::Plain(mut inner) => {
                inner.flush()?;
                Ok(inner)
            }
            Self::Zstd(encoder) => {
                let (inner, _bytes) = encoder.finish_into_inner()?;
                Ok(inner)
            }
        }
    }
}

impl<W: Write> Write for OutStream<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(inner) => inner.write(buf),
            Self::Zstd(encoder) => {
                encoder.write(buf)?;
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(inner) => inner.flush(),
            Self::Zstd(_) => Ok(()),
        }
    }
}

/// A byte source that is either read through directly or unwrapped from a
/// streaming zstd decoder.
pub enum InStream<R: Read> {
    /// No compression; bytes are read as-is.
    Plain(R),
    /// Bytes are decompressed as they are read.
    Zstd(CountingZstdDecoder<R>),
}

impl<R: Read> InStream<R> {
    /// Wraps `inner` with no decompression.
    pub const fn plain(inner: R) -> Self {
        Self::Plain(inner)
    }

    /// Wraps `inner` with a zstd decoder.
    pub fn zstd(inner: R) -> io::Result<Self> {
        Ok(Self::Zstd(CountingZstdDecoder::new(inner)?))
    }

    /// Consumes the stream and returns the inner reader, dropping any
    /// decompression state. Used to switch direction on a full-duplex
    /// connection once the fingerprint stream has been fully read.
    pub fn into_inner(self) -> R {
        match self {
            Self::Plain(inner) => inner,
            Self::Zstd(decoder) => decoder.into_inner(),
        }
    }
}

impl<R: Read> Read for InStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(inner) => inner.read(buf),
            Self::Zstd(decoder) => decoder.read(buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read as _, Write as _};

    #[test]
    fn plain_round_trips() {
        let mut out = OutStream::plain(Vec::new());
        out.write_all(b"hello").unwrap();
        let buf = out.finish().unwrap();

        let mut inp = InStream::plain(Cursor::new(buf));
        let mut roundtrip = Vec::new();
        inp.read_to_end(&mut roundtrip).unwrap();
        assert_eq!(roundtrip, b"hello");
    }

    #[test]
    fn zstd_round_trips() {
        let mut out = OutStream::zstd(Vec::new(), 3).unwrap();
        out.write_all(b"compressed payload").unwrap();
        let buf = out.finish().unwrap();
        assert!(!buf.is_empty());

        let mut inp = InStream::zstd(Cursor::new(buf)).unwrap();
        let mut roundtrip = Vec::new();
        inp.read_to_end(&mut roundtrip).unwrap();
        assert_eq!(roundtrip, b"compressed payload");
    }

    #[test]
    fn into_inner_allows_direction_switch() {
        let mut out = OutStream::plain(Vec::new());
        out.write_all(b"first").unwrap();
        let buf = out.finish().unwrap();

        let inp = InStream::plain(Cursor::new(buf));
        let cursor = inp.into_inner();
        assert_eq!(cursor.into_inner(), b"first");
    }
}
