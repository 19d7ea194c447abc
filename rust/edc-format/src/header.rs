//! The fixed 40-byte record opening every container, and the tags it carries.

use edc_bytes::FixedLayout;
use edc_common::{Result, error::Error, verify_data};

use crate::{
    defs::{EDC_MAGIC, FORMAT_VERSION, HEADER_SIZE},
    limits::ContainerLimits,
};

/// Content type tag: 8 ASCII bytes, space-padded.
///
/// Tags are compared for exact byte equality. Adding a content type is a
/// format change.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerType(pub [u8; 8]);

impl ContainerType {
    pub const MESH: ContainerType = ContainerType(*b"mesh    ");

    #[inline]
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    /// Tag text without the trailing padding.
    pub fn name(&self) -> String {
        String::from_utf8_lossy(&self.0)
            .trim_end_matches([' ', '\0'])
            .to_string()
    }
}

impl std::fmt::Display for ContainerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

impl std::fmt::Debug for ContainerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContainerType({:?})", self.name())
    }
}

/// Compression type tag stored as `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompressionType(pub u32);

impl CompressionType {
    pub const NONE: CompressionType = CompressionType(0);
    /// Reserved: the tag is recognized, the codec is not provided.
    pub const DEFLATE: CompressionType = CompressionType(1);

    pub fn name(&self) -> Option<&'static str> {
        match *self {
            Self::NONE => Some("none"),
            Self::DEFLATE => Some("deflate"),
            _ => None,
        }
    }
}

impl std::fmt::Display for CompressionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "unknown({})", self.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub magic: [u8; 8],
    pub format_version: u32,
    pub content_type: ContainerType,
    pub compression_type: CompressionType,
    /// Content size in bytes as stored after the header.
    pub content_size: u64,
    /// Content size in bytes after decompression.
    pub decompressed_size: u64,
}

impl ContainerHeader {
    /// Creates a header with the current signature and format version.
    pub fn new(
        content_type: ContainerType,
        compression_type: CompressionType,
        content_size: u64,
        decompressed_size: u64,
    ) -> ContainerHeader {
        ContainerHeader {
            magic: EDC_MAGIC,
            format_version: FORMAT_VERSION,
            content_type,
            compression_type,
            content_size,
            decompressed_size,
        }
    }

    /// Total container size: header plus stored content.
    pub fn container_size(&self) -> Option<u64> {
        self.content_size.checked_add(HEADER_SIZE as u64)
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        self.encode_to(&mut out);
        out
    }
}

impl FixedLayout for ContainerHeader {
    const SIZE: usize = HEADER_SIZE;

    fn encode_to(&self, out: &mut [u8]) {
        out[0..8].copy_from_slice(&self.magic);
        self.format_version.encode_to(&mut out[8..12]);
        out[12..20].copy_from_slice(&self.content_type.0);
        self.compression_type.0.encode_to(&mut out[20..24]);
        self.content_size.encode_to(&mut out[24..32]);
        self.decompressed_size.encode_to(&mut out[32..40]);
    }

    fn decode_from(bytes: &[u8]) -> Self {
        let mut magic = [0u8; 8];
        magic.copy_from_slice(&bytes[0..8]);
        let mut content_type = [0u8; 8];
        content_type.copy_from_slice(&bytes[12..20]);
        ContainerHeader {
            magic,
            format_version: u32::decode_from(&bytes[8..12]),
            content_type: ContainerType(content_type),
            compression_type: CompressionType(u32::decode_from(&bytes[20..24])),
            content_size: u64::decode_from(&bytes[24..32]),
            decompressed_size: u64::decode_from(&bytes[32..40]),
        }
    }
}

/// Fails with `Unsupported` on big-endian hosts.
#[inline]
pub fn check_platform_endian() -> Result<()> {
    if cfg!(target_endian = "big") {
        return Err(Error::unsupported("big-endian platforms"));
    }
    Ok(())
}

/// Validates and decodes the container header at the start of `bytes`, with
/// the default size limits.
pub fn read_header(bytes: &[u8]) -> Result<ContainerHeader> {
    read_header_with_limits(bytes, &ContainerLimits::default())
}

/// Validates and decodes the container header at the start of `bytes`.
///
/// # Errors
///
/// * `Unsupported` on a big-endian host, whatever the input.
/// * `InvalidFormat` if `bytes` is shorter than the header or the magic word
///   does not match.
/// * `Unsupported` if the stored or decompressed content size exceeds
///   `limits`.
pub fn read_header_with_limits(bytes: &[u8], limits: &ContainerLimits) -> Result<ContainerHeader> {
    check_platform_endian()?;
    verify_data!("container header size", bytes.len() >= HEADER_SIZE);
    verify_data!("magic word", bytes[0..8] == EDC_MAGIC);
    let header = ContainerHeader::decode_from(&bytes[..HEADER_SIZE]);
    limits.check_size(header.content_size, "content")?;
    limits.check_size(header.decompressed_size, "decompressed content")?;
    log::debug!(
        "container header: version {}, type '{}', compression {}, {} content bytes",
        header.format_version,
        header.content_type,
        header.compression_type,
        header.content_size
    );
    Ok(header)
}

#[cfg(test)]
mod tests {
    use edc_common::error::ErrorKind;

    use super::*;

    fn sample_header() -> ContainerHeader {
        ContainerHeader::new(ContainerType::MESH, CompressionType::NONE, 129, 129)
    }

    #[test]
    fn test_header_layout() {
        let bytes = sample_header().to_bytes();
        assert_eq!(bytes.len(), 40);
        assert_eq!(&bytes[0..8], &[0x89, b'E', b'D', b'C', 0x0D, 0x0A, 0x1A, 0x0A]);
        assert_eq!(&bytes[8..12], &[1, 0, 0, 0]);
        assert_eq!(&bytes[12..20], b"mesh    ");
        assert_eq!(&bytes[20..24], &[0, 0, 0, 0]);
        assert_eq!(&bytes[24..32], &[129, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&bytes[32..40], &[129, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_read_header() {
        let mut bytes = sample_header().to_bytes().to_vec();
        bytes.extend_from_slice(&[0xAA; 129]);
        let header = read_header(&bytes).unwrap();
        assert_eq!(header, sample_header());
        assert_eq!(header.format_version, 1);
        assert_eq!(header.content_type, ContainerType::MESH);
        assert_eq!(header.content_type.name(), "mesh");
        assert_eq!(header.container_size(), Some(169));
    }

    #[test]
    fn test_short_header_rejected() {
        let bytes = sample_header().to_bytes();
        for len in 0..HEADER_SIZE {
            let e = read_header(&bytes[..len]).unwrap_err();
            assert!(e.is_format_error());
        }
    }

    #[test]
    fn test_magic_word_rejected() {
        let valid = sample_header().to_bytes();
        for i in 0..8 {
            for flip in [0x01u8, 0x20, 0x80, 0xFF] {
                let mut bytes = valid;
                bytes[i] ^= flip;
                let e = read_header(&bytes).unwrap_err();
                match e.kind() {
                    ErrorKind::InvalidFormat { element, .. } => assert_eq!(element, "magic word"),
                    other => panic!("unexpected kind {other:?}"),
                }
            }
        }

        let mut text = b"mesh file, plain text, not a container at all".to_vec();
        text.resize(64, b' ');
        assert!(read_header(&text).unwrap_err().is_format_error());
    }

    #[test]
    fn test_size_ceiling() {
        let header = ContainerHeader::new(
            ContainerType::MESH,
            CompressionType::NONE,
            i32::MAX as u64 + 1,
            16,
        );
        let e = read_header(&header.to_bytes()).unwrap_err();
        assert!(e.is_unsupported());

        let header = ContainerHeader::new(ContainerType::MESH, CompressionType::NONE, 16, u64::MAX);
        assert!(read_header(&header.to_bytes()).unwrap_err().is_unsupported());

        let header = ContainerHeader::new(
            ContainerType::MESH,
            CompressionType::NONE,
            i32::MAX as u64,
            i32::MAX as u64,
        );
        assert!(read_header(&header.to_bytes()).is_ok());

        let limits = ContainerLimits::new().with_max_content_size(64).unwrap();
        assert!(read_header_with_limits(&sample_header().to_bytes(), &limits).is_err());
        let limits = ContainerLimits::new().with_max_content_size(1 << 33).unwrap();
        let header =
            ContainerHeader::new(ContainerType::MESH, CompressionType::NONE, 1 << 32, 1 << 32);
        assert!(read_header_with_limits(&header.to_bytes(), &limits).is_ok());
    }

    #[test]
    fn test_unknown_tags_pass_header_validation() {
        let header = ContainerHeader::new(
            ContainerType(*b"image   "),
            CompressionType(9),
            0,
            0,
        );
        let decoded = read_header(&header.to_bytes()).unwrap();
        assert_eq!(decoded.content_type.to_string(), "image");
        assert_eq!(decoded.compression_type.to_string(), "unknown(9)");
        assert_eq!(CompressionType::DEFLATE.to_string(), "deflate");
    }
}
