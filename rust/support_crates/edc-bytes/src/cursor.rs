//! Forward-only read and write cursors over raw memory.
//!
//! The cursors do not bounds-check their reads and writes: they sit on the hot,
//! trusted path of container decoding and encoding. The caller validates the
//! sizes once (see [`StreamReader::ensure_remaining`]) and then walks the bytes
//! without per-access checks. Cursor positions are checked by `debug_assert!`
//! in debug builds only.
//!
//! Records are never reinterpreted from memory. Every record type declares its
//! wire layout explicitly through [`FixedLayout`], which keeps the byte layout
//! independent of the host's struct layout rules.

use std::marker::PhantomData;

use edc_common::{Result, error::Error};

/// A record with a fixed little-endian wire layout.
pub trait FixedLayout: Sized {
    /// Size of the encoded record in bytes.
    const SIZE: usize;

    /// Encodes the record into `out`, which is exactly `SIZE` bytes long.
    fn encode_to(&self, out: &mut [u8]);

    /// Decodes the record from `bytes`, which are exactly `SIZE` bytes long.
    fn decode_from(bytes: &[u8]) -> Self;
}

macro_rules! impl_fixed_layout_for_primitive {
    ($($t:ty),*) => {
        $(
            impl FixedLayout for $t {
                const SIZE: usize = std::mem::size_of::<$t>();

                #[inline]
                fn encode_to(&self, out: &mut [u8]) {
                    out.copy_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn decode_from(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$t>()];
                    raw.copy_from_slice(bytes);
                    <$t>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_fixed_layout_for_primitive!(u8, u16, u32, u64, i32, i64, f32);

/// Forward-only reader over a borrowed byte range.
pub struct StreamReader<'a> {
    origin: *const u8,
    len: usize,
    offset: u64,
    _marker: PhantomData<&'a [u8]>,
}

impl<'a> StreamReader<'a> {
    /// Creates a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> StreamReader<'a> {
        StreamReader {
            origin: data.as_ptr(),
            len: data.len(),
            offset: 0,
            _marker: PhantomData,
        }
    }

    /// Current position in bytes from the start of the range.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Number of bytes between the current position and the end of the range.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.len.saturating_sub(self.offset as usize)
    }

    /// Fails with a format error naming `element` unless at least `byte_len`
    /// bytes remain.
    pub fn ensure_remaining(&self, byte_len: u64, element: &str) -> Result<()> {
        if byte_len > self.remaining() as u64 {
            return Err(Error::invalid_format(
                element,
                format!(
                    "{byte_len} bytes required at offset {}, {} available",
                    self.offset,
                    self.remaining()
                ),
            ));
        }
        Ok(())
    }

    /// Reads one fixed-layout record and advances past it.
    ///
    /// # Safety
    ///
    /// At least `R::SIZE` bytes must remain.
    #[inline]
    pub unsafe fn read_fixed<R: FixedLayout>(&mut self) -> R {
        let bytes = unsafe { self.read_bytes(R::SIZE) };
        R::decode_from(bytes)
    }

    /// Returns a typed view over `count` consecutive records and advances past them.
    ///
    /// # Safety
    ///
    /// At least `count * T::SIZE` bytes must remain, and the product must not
    /// overflow `usize`.
    #[inline]
    pub unsafe fn read_array<T: FixedLayout>(&mut self, count: usize) -> ArrayView<'a, T> {
        let bytes = unsafe { self.read_bytes(count * T::SIZE) };
        ArrayView {
            bytes,
            count,
            _marker: PhantomData,
        }
    }

    /// Returns a view of the next `byte_len` bytes and advances past them.
    ///
    /// # Safety
    ///
    /// At least `byte_len` bytes must remain.
    #[inline]
    pub unsafe fn read_bytes(&mut self, byte_len: usize) -> &'a [u8] {
        debug_assert!(byte_len <= self.remaining());
        if byte_len == 0 {
            return &[];
        }
        let bytes = unsafe {
            std::slice::from_raw_parts(self.origin.add(self.offset as usize), byte_len)
        };
        self.offset += byte_len as u64;
        bytes
    }
}

/// Lazily decoded view over consecutive fixed-layout records.
#[derive(Clone, Copy)]
pub struct ArrayView<'a, T> {
    bytes: &'a [u8],
    count: usize,
    _marker: PhantomData<T>,
}

impl<'a, T: FixedLayout> ArrayView<'a, T> {
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Encoded bytes backing the view.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Decodes the record at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.count {
            return None;
        }
        let start = index * T::SIZE;
        Some(T::decode_from(&self.bytes[start..start + T::SIZE]))
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = T> {
        self.bytes.chunks_exact(T::SIZE).map(T::decode_from)
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

impl<T: FixedLayout + std::fmt::Debug> std::fmt::Debug for ArrayView<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Forward-only writer over a borrowed mutable byte range.
pub struct StreamWriter<'a> {
    origin: *mut u8,
    len: usize,
    offset: u64,
    _marker: PhantomData<&'a mut [u8]>,
}

impl<'a> StreamWriter<'a> {
    /// Creates a writer positioned at the start of `data`.
    pub fn new(data: &'a mut [u8]) -> StreamWriter<'a> {
        StreamWriter {
            origin: data.as_mut_ptr(),
            len: data.len(),
            offset: 0,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.len.saturating_sub(self.offset as usize)
    }

    /// Encodes one fixed-layout record at the current position and advances past it.
    ///
    /// # Safety
    ///
    /// At least `R::SIZE` bytes must remain.
    #[inline]
    pub unsafe fn write_fixed<R: FixedLayout>(&mut self, record: &R) {
        let out = unsafe { self.next_mut(R::SIZE) };
        record.encode_to(out);
    }

    /// Copies `source` to the current position and advances past it.
    ///
    /// # Safety
    ///
    /// At least `source.len()` bytes must remain.
    #[inline]
    pub unsafe fn write_raw(&mut self, source: &[u8]) {
        let out = unsafe { self.next_mut(source.len()) };
        out.copy_from_slice(source);
    }

    #[inline]
    unsafe fn next_mut(&mut self, byte_len: usize) -> &mut [u8] {
        debug_assert!(byte_len <= self.remaining());
        if byte_len == 0 {
            return &mut [];
        }
        let out = unsafe {
            std::slice::from_raw_parts_mut(self.origin.add(self.offset as usize), byte_len)
        };
        self.offset += byte_len as u64;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Pair {
        tag: u8,
        value: u32,
    }

    impl FixedLayout for Pair {
        const SIZE: usize = 5;

        fn encode_to(&self, out: &mut [u8]) {
            out[0] = self.tag;
            out[1..5].copy_from_slice(&self.value.to_le_bytes());
        }

        fn decode_from(bytes: &[u8]) -> Self {
            Pair {
                tag: bytes[0],
                value: u32::decode_from(&bytes[1..5]),
            }
        }
    }

    #[test]
    fn test_primitive_layout_is_little_endian() {
        let mut out = [0u8; 4];
        0x0102_0304u32.encode_to(&mut out);
        assert_eq!(out, [4, 3, 2, 1]);
        assert_eq!(u32::decode_from(&out), 0x0102_0304);

        let mut out = [0u8; 8];
        1u64.encode_to(&mut out);
        assert_eq!(out, [1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_write_then_read_sequence() {
        let mut buf = vec![0u8; 4 + Pair::SIZE * 2 + 8 + 3];
        let len = buf.len();
        let mut writer = StreamWriter::new(&mut buf);
        unsafe {
            writer.write_fixed(&2u32);
            writer.write_fixed(&Pair { tag: 1, value: 10 });
            writer.write_fixed(&Pair { tag: 2, value: 20 });
            writer.write_fixed(&3u64);
            writer.write_raw(b"xyz");
        }
        assert_eq!(writer.offset() as usize, len);
        assert_eq!(writer.remaining(), 0);

        let mut reader = StreamReader::new(&buf);
        let count = unsafe { reader.read_fixed::<u32>() };
        assert_eq!(count, 2);
        let pairs = unsafe { reader.read_array::<Pair>(count as usize) };
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs.get(1), Some(Pair { tag: 2, value: 20 }));
        assert_eq!(pairs.get(2), None);
        assert_eq!(
            pairs.to_vec(),
            vec![Pair { tag: 1, value: 10 }, Pair { tag: 2, value: 20 }]
        );
        let len = unsafe { reader.read_fixed::<u64>() };
        let raw = unsafe { reader.read_bytes(len as usize) };
        assert_eq!(raw, b"xyz");
        assert_eq!(reader.remaining(), 0);
        assert_eq!(reader.offset() as usize, buf.len());
    }

    #[test]
    fn test_ensure_remaining() {
        let buf = [0u8; 6];
        let mut reader = StreamReader::new(&buf);
        assert!(reader.ensure_remaining(6, "all").is_ok());
        unsafe { reader.read_fixed::<u32>() };
        assert!(reader.ensure_remaining(2, "tail").is_ok());
        let e = reader.ensure_remaining(3, "tail").unwrap_err();
        assert!(e.is_format_error());
        assert!(e.to_string().contains("tail"));
    }

    #[test]
    fn test_empty_reads_and_writes() {
        let buf: [u8; 0] = [];
        let mut reader = StreamReader::new(&buf);
        let view = unsafe { reader.read_array::<u32>(0) };
        assert!(view.is_empty());
        assert_eq!(unsafe { reader.read_bytes(0) }, &[] as &[u8]);

        let mut out: [u8; 0] = [];
        let mut writer = StreamWriter::new(&mut out);
        unsafe { writer.write_raw(&[]) };
        assert_eq!(writer.offset(), 0);
    }
}
