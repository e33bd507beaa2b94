//! Adapts a random-access [`StorageAdapter`] into a sequential [`Read`] so
//! the hasher, which only needs one forward pass, can consume it directly.

use std::io::{self, Read};

use storage::StorageAdapter;

/// A forward-only cursor over a [`StorageAdapter`].
pub struct AdapterReader<'a> {
    adapter: &'a mut dyn StorageAdapter,
    pos: u64,
}

impl<'a> AdapterReader<'a> {
    /// Wraps `adapter`, starting the cursor at offset 0.
    pub const fn new(adapter: &'a mut dyn StorageAdapter) -> Self {
        Self { adapter, pos: 0 }
    }
}

impl Read for AdapterReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self
            .adapter
            .read_at(self.pos, buf)
            .map_err(io::Error::other)?;
        self.pos += n as u64;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::SparseFileAdapter;

    #[test]
    fn reads_sequentially_across_calls() {
        let file = tempfile::tempfile().unwrap();
        let mut adapter = SparseFileAdapter::new(file);
        adapter.truncate(8).unwrap();
        adapter.write_at(0, b"abcdefgh").unwrap();

        let mut reader = AdapterReader::new(&mut adapter);
        let mut first = [0u8; 4];
        reader.read_exact(&mut first).unwrap();
        assert_eq!(&first, b"abcd");

        let mut second = [0u8; 4];
        reader.read_exact(&mut second).unwrap();
        assert_eq!(&second, b"efgh");
    }
}
