use std::sync::{Mutex, MutexGuard};

use crate::{ReadAt, WriteAt, verify};

impl<T> ReadAt for T
where
    T: details::SliceBytes + Send + Sync + 'static,
{
    fn size(&self) -> std::io::Result<u64> {
        Ok(self.bytes().len() as u64)
    }

    fn read_exact_at(&self, pos: u64, buf: &mut [u8]) -> std::io::Result<()> {
        let content = self.bytes();
        let Some(end) = pos.checked_add(buf.len() as u64) else {
            return Err(std::io::ErrorKind::InvalidInput.into());
        };
        if end > content.len() as u64 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        let pos = pos as usize;
        buf.copy_from_slice(&content[pos..pos + buf.len()]);
        Ok(())
    }
}

/// An in-memory [`WriteAt`] sink.
#[derive(Debug, Default)]
pub struct MemoryWriter(Mutex<Vec<u8>>);

impl MemoryWriter {
    pub fn new() -> MemoryWriter {
        Default::default()
    }

    /// Current size of the written data.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of the written data.
    pub fn to_vec(&self) -> Vec<u8> {
        self.lock().clone()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl WriteAt for MemoryWriter {
    fn write_at(&self, pos: u64, buf: &[u8]) -> std::io::Result<()> {
        let end = pos.checked_add(buf.len() as u64);
        verify!(end.is_some_and(|end| end <= usize::MAX as u64));
        let pos = pos as usize;
        let end = pos + buf.len();
        let mut data = self.lock();
        if data.len() < end {
            data.resize(end, 0);
        }
        data[pos..end].copy_from_slice(buf);
        Ok(())
    }
}

mod details {
    use std::sync::Arc;

    pub trait SliceBytes {
        fn bytes(&self) -> &[u8];
    }

    impl SliceBytes for Vec<u8> {
        fn bytes(&self) -> &[u8] {
            self
        }
    }

    impl SliceBytes for Box<[u8]> {
        fn bytes(&self) -> &[u8] {
            self
        }
    }

    impl SliceBytes for Arc<[u8]> {
        fn bytes(&self) -> &[u8] {
            self
        }
    }

    impl SliceBytes for &'static [u8] {
        fn bytes(&self) -> &[u8] {
            self
        }
    }

    impl SliceBytes for edc_bytes::OwningBuffer {
        fn bytes(&self) -> &[u8] {
            self.as_bytes()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{ReadAt, WriteAt, memory::MemoryWriter};

    #[test]
    fn test_mem_writer() {
        let writer = MemoryWriter::new();
        writer.write_at(0, b"abcd").unwrap();
        writer.write_at(4, b"123").unwrap();
        assert_eq!(writer.to_vec(), b"abcd123");

        writer.write_at(10, b"z").unwrap();
        writer.write_at(1, b"B").unwrap();
        assert_eq!(writer.len(), 11);
        assert_eq!(writer.into_inner(), b"aBcd123\0\0\0z");
    }

    #[test]
    fn test_mem_writer_rejects_overflowing_position() {
        let writer = MemoryWriter::new();
        let e = writer.write_at(u64::MAX, b"ab").unwrap_err();
        assert_eq!(e.kind(), std::io::ErrorKind::InvalidInput);
        assert!(writer.is_empty());
    }

    #[test]
    fn test_mem_reader() {
        let blob = b"abcd123".to_vec();
        assert_eq!(blob.size().unwrap(), 7);
        let mut buf = [0u8; 2];
        blob.read_exact_at(1, &mut buf).unwrap();
        assert_eq!(&buf, b"bc");

        let mut buf = [0u8; 4];
        let e = blob.read_exact_at(4, &mut buf).unwrap_err();
        assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof);
        blob.read_exact_at(7, &mut []).unwrap();

        let blob = Arc::new(blob) as Arc<dyn ReadAt>;
        let mut buf = [0u8; 3];
        blob.read_exact_at(4, &mut buf).unwrap();
        assert_eq!(&buf, b"123");

        let stat: &'static [u8] = b"static";
        let mut buf = [0u8; 3];
        stat.read_exact_at(3, &mut buf).unwrap();
        assert_eq!(&buf, b"tic");
    }
}
