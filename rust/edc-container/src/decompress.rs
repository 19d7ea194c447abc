use edc_bytes::OwningBuffer;
use edc_common::{Result, error::{Error, ErrorKind}};
use edc_format::{CompressionType, ContainerHeader};

/// Turns stored content into decompressed content according to the header's
/// compression tag.
///
/// `none` hands `content` back unchanged. `deflate` is a reserved tag without a
/// codec and fails with `NotImplemented`. Any other tag fails with
/// `UnsupportedCompression`. On failure `content` is dropped, releasing it.
pub fn decompress(header: &ContainerHeader, content: OwningBuffer) -> Result<OwningBuffer> {
    match header.compression_type {
        CompressionType::NONE => {
            if header.decompressed_size != content.len() as u64 {
                return Err(Error::invalid_format(
                    "decompressed size",
                    format!(
                        "uncompressed content of {} bytes declares {} decompressed bytes",
                        content.len(),
                        header.decompressed_size
                    ),
                ));
            }
            log::trace!("decompress: none, {} bytes", content.len());
            Ok(content)
        }
        CompressionType::DEFLATE => Err(Error::not_implemented("deflate compressed content")),
        CompressionType(tag) => Err(ErrorKind::UnsupportedCompression { tag }.into()),
    }
}
