#![allow(clippy::module_name_repetitions)]

//! Streaming Zstandard helpers used to wrap the changed-block wire stream.
//!
//! Encoders implement [`std::io::Write`] and keep track of the number of
//! compressed bytes produced, allowing the wire codec to report progress
//! without a second pass over the data.

use std::io::{self, BufReader, IoSliceMut, Read, Write};

use crate::common::{CountingSink, CountingWriter};
use zstd::stream::{read::Decoder as ZstdDecoder, write::Encoder as ZstdEncoder};

/// Streaming encoder that records the number of compressed bytes produced.
pub struct CountingZstdEncoder<W = CountingSink>
where
    W: Write,
{
    inner: ZstdEncoder<'static, CountingWriter<W>>,
}

impl CountingZstdEncoder<CountingSink> {
    /// Creates a new encoder that discards the compressed output while tracking its length.
    ///
    /// `level` follows zstd's own scale (0 selects the library default, 1-22
    /// trade speed for ratio).
    ///
    /// # Example
    ///
    /// ```
    /// use compress::zstd::CountingZstdEncoder;
    ///
    /// let mut encoder = CountingZstdEncoder::new(3).unwrap();
    /// encoder.write(b"data to compress").unwrap();
    /// let compressed_bytes = encoder.finish().unwrap();
    /// ```
    pub fn new(level: i32) -> io::Result<Self> {
        Self::with_sink(CountingSink, level)
    }

    /// Completes the stream and returns the total number of compressed bytes generated.
    pub fn finish(self) -> io::Result<u64> {
        let (_sink, bytes) = self.finish_into_inner()?;
        Ok(bytes)
    }
}

impl<W> CountingZstdEncoder<W>
where
    W: Write,
{
    /// Creates a new encoder that writes compressed bytes into `sink`.
    ///
    /// # Example
    ///
    /// ```
    /// use compress::zstd::CountingZstdEncoder;
    ///
    /// let mut output = Vec::new();
    /// let mut encoder = CountingZstdEncoder::with_sink(&mut output, 1).unwrap();
    /// encoder.write(b"payload").unwrap();
    /// let (_, bytes_written) = encoder.finish_into_inner().unwrap();
    /// assert!(bytes_written > 0);
    /// ```
    pub fn with_sink(sink: W, level: i32) -> io::Result<Self> {
        let writer = CountingWriter::new(sink);
        let encoder = ZstdEncoder::new(writer, level).map_err(io::Error::other)?;
        Ok(Self { inner: encoder })
    }

    /// Appends data to the compression stream.
    pub fn write(&mut self, input: &[u8]) -> io::Result<()> {
        self.inner.write_all(input)
    }

    /// Returns the number of compressed bytes produced so far.
    #[inline]
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.inner.get_ref().bytes()
    }

    /// Provides immutable access to the underlying sink.
    #[inline]
    #[must_use]
    pub fn get_ref(&self) -> &W {
        self.inner.get_ref().inner_ref()
    }

    /// Provides mutable access to the underlying sink.
    #[inline]
    #[must_use]
    pub fn get_mut(&mut self) -> &mut W {
        self.inner.get_mut().inner_mut()
    }

    /// Completes the stream, flushing the zstd frame trailer, and returns
    /// the sink together with the number of compressed bytes.
    ///
    /// This is the flush boundary the peer's decoder relies on when the
    /// wire codec switches direction (fingerprint stream finished, changed
    /// block stream about to start, or vice versa).
    pub fn finish_into_inner(self) -> io::Result<(W, u64)> {
        let writer = self.inner.finish().map_err(io::Error::other)?;
        Ok(writer.into_parts())
    }
}

/// Streaming decoder that records the number of decompressed bytes produced.
pub struct CountingZstdDecoder<R> {
    inner: ZstdDecoder<'static, BufReader<R>>,
    bytes: u64,
}

impl<R> CountingZstdDecoder<R>
where
    R: Read,
{
    /// Creates a new decoder that wraps the provided reader.
    pub fn new(reader: R) -> io::Result<Self> {
        let decoder = ZstdDecoder::new(reader).map_err(io::Error::other)?;
        Ok(Self {
            inner: decoder,
            bytes: 0,
        })
    }

    /// Returns the number of decompressed bytes read so far.
    #[inline]
    #[must_use]
    pub const fn bytes_read(&self) -> u64 {
        self.bytes
    }

    /// Returns a mutable reference to the underlying reader.
    #[inline]
    #[must_use]
    pub fn get_mut(&mut self) -> &mut R {
        self.inner.get_mut().get_mut()
    }

    /// Returns an immutable reference to the wrapped reader.
    #[inline]
    #[must_use]
    pub fn get_ref(&self) -> &R {
        self.inner.get_ref().get_ref()
    }

    /// Consumes the decoder and returns the wrapped reader.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> R {
        self.inner.finish().into_inner()
    }
}

impl<R> Read for CountingZstdDecoder<R>
where
    R: Read,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.bytes = self.bytes.saturating_add(read as u64);
        Ok(read)
    }

    fn read_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> io::Result<usize> {
        let read = self.inner.read_vectored(bufs)?;
        self.bytes = self.bytes.saturating_add(read as u64);
        Ok(read)
    }
}

/// Compresses `input` into a new [`Vec`].
pub fn compress_to_vec(input: &[u8], level: i32) -> io::Result<Vec<u8>> {
    let mut encoder = ZstdEncoder::new(Vec::new(), level).map_err(io::Error::other)?;
    encoder.write_all(input)?;
    encoder.finish().map_err(io::Error::other)
}

/// Decompresses `input` into a new [`Vec`].
pub fn decompress_to_vec(input: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoder = ZstdDecoder::new(input).map_err(io::Error::other)?;
    let mut output = Vec::new();
    io::copy(&mut decoder, &mut output)?;
    Ok(output)
}

/// Default compression level used when the CLI does not request a specific one.
#[must_use]
pub const fn default_level() -> i32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_encoder_tracks_bytes() {
        let mut encoder = CountingZstdEncoder::new(default_level()).expect("encoder");
        encoder.write(b"payload").expect("compress payload");
        let compressed = encoder.finish().expect("finish stream");
        assert!(compressed > 0);
    }

    #[test]
    fn encoder_with_sink_forwards_bytes() {
        let mut encoder =
            CountingZstdEncoder::with_sink(Vec::new(), default_level()).expect("encoder");
        encoder.write(b"payload").expect("compress payload");
        let (compressed, bytes) = encoder.finish_into_inner().expect("finish stream");
        assert_eq!(bytes as usize, compressed.len());
    }

    #[test]
    fn decoder_tracks_bytes() {
        let compressed = compress_to_vec(b"payload", default_level()).expect("compress");
        let mut decoder = CountingZstdDecoder::new(&compressed[..]).expect("decoder");
        let mut output = Vec::new();
        decoder.read_to_end(&mut output).expect("decompress");
        assert_eq!(output, b"payload");
        assert_eq!(decoder.bytes_read(), output.len() as u64);
    }

    #[test]
    fn round_trip_several_levels() {
        let input = b"Lorem ipsum dolor sit amet, consectetur adipiscing elit. \
                      Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.";

        for level in [1, 3, 9, 19] {
            let compressed = compress_to_vec(input, level)
                .unwrap_or_else(|e| panic!("compress failed at level {level}: {e}"));
            let decompressed = decompress_to_vec(&compressed)
                .unwrap_or_else(|e| panic!("decompress failed at level {level}: {e}"));
            assert_eq!(decompressed, input, "round-trip failed at level {level}");
        }
    }

    #[test]
    fn edge_case_empty_input() {
        let input = b"";
        let compressed = compress_to_vec(input, default_level()).expect("compress empty");
        let decompressed = decompress_to_vec(&compressed).expect("decompress empty");
        assert_eq!(decompressed, input);
    }
}
