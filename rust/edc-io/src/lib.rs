//! I/O abstractions for container sources and sinks:
//! - `ReadAt`: positional reader able to fill a buffer from an arbitrary offset of a file/blob.
//! - `WriteAt`: positional writer, used to flush a finished container in one bulk write.
//!
//! Provides a couple of simple implementations: memory-based and file-based.

pub mod file;
pub mod memory;
pub mod utils;

pub use file::{FileReader, FileWriter};
pub use memory::MemoryWriter;
pub use utils::read_to_buffer;

/// A trait representing a conceptual file or buffer that supports reading from arbitrary
/// positions.
pub trait ReadAt: Send + Sync + 'static {
    /// Returns the size of the underlying object.
    fn size(&self) -> std::io::Result<u64>;

    /// Fills `buf` with the bytes starting at `pos`.
    ///
    /// **NOTE**: `read_exact_at` never returns a short read. If the object ends before
    /// `buf` is filled, it fails with [`std::io::ErrorKind::UnexpectedEof`].
    fn read_exact_at(&self, pos: u64, buf: &mut [u8]) -> std::io::Result<()>;
}

/// A trait representing a conceptual file or buffer that supports writing at arbitrary
/// positions.
///
/// The storage is expanded if a write occurs beyond its current end.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` and should correctly handle concurrent writes
/// to non-overlapping regions.
pub trait WriteAt: Send + Sync + 'static {
    /// Writes the provided buffer at the specified position, expanding the underlying
    /// storage if necessary.
    ///
    /// **NOTE**: `write_at` should not return with a short write, upon success the entire
    /// buffer is written.
    fn write_at(&self, pos: u64, buf: &[u8]) -> std::io::Result<()>;

    /// Commits previously written data to the storage medium.
    fn flush(&self) -> std::io::Result<()> {
        Ok(())
    }
}
