#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! Target-side backing stores for the synced file: a trait,
//! [`StorageAdapter`], and three implementations chosen by what the target
//! path actually is.
//!
//! # Design
//!
//! - [`DeviceAdapter`] for block devices and other fixed-size files: no
//!   resizing, no hole punching, just direct reads and writes.
//! - [`SparseFileAdapter`] for a plain regular file: real `fallocate`
//!   hole punching where the filesystem supports it, zero-write fallback
//!   otherwise.
//! - [`CompressedSparseAdapter`] for the on-disk container format used when
//!   compression is enabled for a regular-file target: each chunk is stored
//!   zstd-compressed, or raw if compression did not help, or as a hole when
//!   the chunk is entirely zero.
//!
//! [`select_target_adapter`] implements the target's adapter-selection
//! policy from a path and the negotiated options; [`open_source_reader`]
//! opens a source path for hashing, transparently decompressing a
//! compressed-sparse container if the source happens to be one.
//!
//! # Invariants
//!
//! The session driver issues one read or write at a time; no adapter here
//! needs to support concurrent access.
//!
//! # Errors
//!
//! All fallible operations return [`AdapterError`], which distinguishes
//! format problems (wrong magic, unsupported version) from out-of-range
//! requests and I/O failures.
//!
//! # Examples
//!
//! ```
//! use storage::{SparseFileAdapter, StorageAdapter};
//!
//! let file = tempfile::tempfile().unwrap();
//! let mut adapter = SparseFileAdapter::new(file);
//! adapter.truncate(4096).unwrap();
//! adapter.write_at(0, b"hello").unwrap();
//!
//! let mut buf = [0u8; 5];
//! adapter.read_at(0, &mut buf).unwrap();
//! assert_eq!(&buf, b"hello");
//! ```
//!
//! # See also
//!
//! `wire::codec` frames the changed-block messages that the session driver
//! turns into calls against this trait.

mod adapter;
#[cfg(feature = "zstd")]
mod compressed;
mod device;
mod error;
mod sparse;

use std::fs::File;

pub use adapter::StorageAdapter;
#[cfg(feature = "zstd")]
pub use compressed::CompressedSparseAdapter;
pub use device::DeviceAdapter;
pub use error::AdapterError;
pub use sparse::SparseFileAdapter;

/// The default chunk size used by [`CompressedSparseAdapter`] when one is
/// not otherwise specified; independent of the sync protocol's block size.
pub const DEFAULT_CHUNK_SIZE: u64 = 1024 * 1024;

/// Whether the target path refers to a block device or a regular file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// A block device (or other fixed-size special file).
    Device,
    /// A regular file.
    RegularFile,
}

impl TargetKind {
    /// Inspects an already-opened file's metadata to decide which adapter
    /// family applies, matching the target's `OPEN` step.
    #[cfg(unix)]
    pub fn detect(file: &File) -> Result<Self, AdapterError> {
        use std::os::unix::fs::FileTypeExt;
        let file_type = file.metadata()?.file_type();
        if file_type.is_block_device() || file_type.is_char_device() {
            Ok(Self::Device)
        } else {
            Ok(Self::RegularFile)
        }
    }

    /// Non-Unix targets have no device-file concept; everything is a
    /// regular file.
    #[cfg(not(unix))]
    pub fn detect(_file: &File) -> Result<Self, AdapterError> {
        Ok(Self::RegularFile)
    }
}

/// Picks and opens the adapter for a target, following the same policy the
/// target's `OPEN` step uses: a device always gets [`DeviceAdapter`]; a
/// regular file gets [`CompressedSparseAdapter`] unless compression has
/// been disabled, in which case it gets [`SparseFileAdapter`].
///
/// `current_size` is the target file's length *before* this sync, used only
/// to size a freshly created compressed-sparse container; a container the
/// file already holds is opened as-is; HASH then reads its actual contents.
pub fn select_target_adapter(
    file: File,
    kind: TargetKind,
    current_size: u64,
    compress: bool,
    chunk_size: u64,
) -> Result<Box<dyn StorageAdapter>, AdapterError> {
    match kind {
        TargetKind::Device => Ok(Box::new(DeviceAdapter::new(file)?)),
        TargetKind::RegularFile => {
            if compress {
                open_or_create_compressed(file, current_size, chunk_size)
            } else {
                let adapter = SparseFileAdapter::new(file);
                Ok(Box::new(adapter) as Box<dyn StorageAdapter>)
            }
        }
    }
}

#[cfg(feature = "zstd")]
fn open_or_create_compressed(
    file: File,
    current_size: u64,
    chunk_size: u64,
) -> Result<Box<dyn StorageAdapter>, AdapterError> {
    if CompressedSparseAdapter::looks_like(&file)? {
        return Ok(Box::new(CompressedSparseAdapter::open(file)?));
    }

    let chunk_size = if chunk_size == 0 {
        DEFAULT_CHUNK_SIZE
    } else {
        chunk_size
    };
    let adapter = CompressedSparseAdapter::create(file, chunk_size, current_size)?;
    Ok(Box::new(adapter))
}

#[cfg(not(feature = "zstd"))]
fn open_or_create_compressed(
    file: File,
    _current_size: u64,
    _chunk_size: u64,
) -> Result<Box<dyn StorageAdapter>, AdapterError> {
    let adapter = SparseFileAdapter::new(file);
    Ok(Box::new(adapter))
}

/// Opens `file` for reading on the source side, transparently unwrapping a
/// compressed-sparse container if it happens to be one; otherwise treats it
/// as a plain file.
pub fn open_source_reader(mut file: File) -> Result<Box<dyn StorageAdapter>, AdapterError> {
    #[cfg(feature = "zstd")]
    {
        if CompressedSparseAdapter::looks_like(&file)? {
            return Ok(Box::new(CompressedSparseAdapter::open(file)?));
        }
    }
    use std::io::Seek;
    file.seek(std::io::SeekFrom::Start(0))?;
    Ok(Box::new(SparseFileAdapter::new(file)))
}

/// Reads the full contents of a source-side adapter into memory. Only used
/// by tests and small fixtures; the session driver streams block by block
/// instead.
#[cfg(test)]
fn read_all(adapter: &mut dyn StorageAdapter) -> Result<Vec<u8>, AdapterError> {
    let size = adapter.size()?;
    let mut buf = vec![0u8; size as usize];
    let mut read = 0usize;
    while read < buf.len() {
        let n = adapter.read_at(read as u64, &mut buf[read..])?;
        if n == 0 {
            break;
        }
        read += n;
    }
    buf.truncate(read);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn detect_regular_file() {
        let file = tempfile::tempfile().unwrap();
        assert_eq!(TargetKind::detect(&file).unwrap(), TargetKind::RegularFile);
    }

    #[test]
    fn select_device_adapter_for_device_kind() {
        let file = tempfile::tempfile().unwrap();
        file.set_len(4096).unwrap();
        let adapter = select_target_adapter(file, TargetKind::Device, 4096, true, 0).unwrap();
        assert_eq!(adapter.size().unwrap(), 4096);
    }

    #[test]
    fn select_plain_sparse_when_compression_disabled() {
        let file = tempfile::tempfile().unwrap();
        let mut adapter =
            select_target_adapter(file, TargetKind::RegularFile, 8192, false, 0).unwrap();
        adapter.write_at(0, b"abc").unwrap();
        let mut buf = [0u8; 3];
        adapter.read_at(0, &mut buf).unwrap();
        assert_eq!(&buf, b"abc");
    }

    #[test]
    fn select_compressed_sparse_by_default() {
        let file = tempfile::tempfile().unwrap();
        let mut adapter =
            select_target_adapter(file, TargetKind::RegularFile, 8192, true, 4096).unwrap();
        adapter.write_at(0, b"abc").unwrap();
        assert_eq!(read_all(adapter.as_mut()).unwrap()[..3], *b"abc");
    }

    #[test]
    fn select_target_adapter_reopens_existing_container_instead_of_recreating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("target.bsz");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)
            .unwrap();
        let mut adapter = CompressedSparseAdapter::create(file, 4096, 4096).unwrap();
        adapter.write_at(0, b"hello").unwrap();
        drop(adapter);

        let reopened = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .unwrap();
        let current_size = reopened.metadata().unwrap().len();
        let mut adapter =
            select_target_adapter(reopened, TargetKind::RegularFile, current_size, true, 4096)
                .unwrap();

        // A re-`create` would have truncated the file to an empty container,
        // wiping the prior contents before HASH ever sees them.
        assert_eq!(read_all(adapter.as_mut()).unwrap()[..5], *b"hello");
    }

    #[test]
    fn open_source_reader_detects_compressed_container() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.bsz");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)
            .unwrap();
        let mut adapter = CompressedSparseAdapter::create(file, 4096, 4096).unwrap();
        adapter.write_at(0, b"hello").unwrap();
        drop(adapter);

        let reopened = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .unwrap();
        let mut reader = open_source_reader(reopened).unwrap();
        let mut buf = [0u8; 5];
        reader.read_at(0, &mut buf).unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn open_source_reader_falls_back_to_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.img");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"raw bytes").unwrap();
        drop(file);

        let reopened = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .unwrap();
        let mut reader = open_source_reader(reopened).unwrap();
        let mut buf = [0u8; 9];
        reader.read_at(0, &mut buf).unwrap();
        assert_eq!(&buf, b"raw bytes");
    }
}
