/// Container signature: a non-ASCII lead byte, the format name and a
/// CR LF Ctrl-Z LF trailer that exposes text-mode transfer corruption.
pub const EDC_MAGIC: [u8; 8] = [0x89, b'E', b'D', b'C', 0x0D, 0x0A, 0x1A, 0x0A];

/// Current container format version.
pub const FORMAT_VERSION: u32 = 1;

/// Encoded size of [`ContainerHeader`](crate::ContainerHeader):
/// * magic:`[u8; 8]`
/// * format_version:`u32`
/// * content_type:`[u8; 8]`
/// * compression_type:`u32`
/// * content_size:`u64`
/// * decompressed_size:`u64`
pub const HEADER_SIZE: usize = 40;

/// Byte size of one mesh index record.
pub const MESH_INDEX_SIZE: u32 = 4;

/// Encoded size of the three `u32` counters opening mesh content
/// (vertex size, index size, field count).
pub const MESH_PREAMBLE_SIZE: usize = 12;

/// Size of a `u64` element count prefix.
pub const COUNT_PREFIX_SIZE: usize = 8;
