use edc_bytes::OwningBuffer;
use edc_common::{Result, error::Error};

use crate::ReadAt;

#[macro_export]
macro_rules! verify {
    ($expr:expr) => {{
        let result = $expr;
        $crate::utils::verify(result, stringify!($expr))?;
    }};
}

pub fn verify(predicate: bool, condition: &str) -> std::io::Result<()> {
    if predicate {
        Ok(())
    } else {
        Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            condition,
        ))
    }
}

/// Reads `len` bytes starting at `pos` into a newly allocated, zero-initialized
/// [`OwningBuffer`].
///
/// A source that ends before `pos + len` is reported as a format error naming
/// `element`, other I/O failures are propagated as I/O errors.
pub fn read_to_buffer(
    source: &dyn ReadAt,
    pos: u64,
    len: usize,
    element: &str,
) -> Result<OwningBuffer> {
    let mut buf = OwningBuffer::allocate_zeroed(len)?;
    match source.read_exact_at(pos, buf.as_bytes_mut()) {
        Ok(()) => Ok(buf),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(Error::invalid_format(
            element,
            format!("source ends before {len} bytes at offset {pos}"),
        )),
        Err(e) => Err(Error::io(element, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::read_to_buffer;

    #[test]
    fn test_read_to_buffer() {
        let blob = (0u8..100).collect::<Vec<_>>();
        let buf = read_to_buffer(&blob, 10, 5, "content").unwrap();
        assert_eq!(buf.as_bytes(), &[10, 11, 12, 13, 14]);

        let buf = read_to_buffer(&blob, 100, 0, "content").unwrap();
        assert!(buf.is_empty());

        let e = read_to_buffer(&blob, 90, 20, "content").unwrap_err();
        assert!(e.is_format_error());
        assert!(e.to_string().contains("content"));
    }
}
