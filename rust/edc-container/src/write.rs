//! Mesh container write path.
//!
//! The container size is known up front, so the whole container is encoded
//! into one exactly sized allocation and flushed with a single positional write.

use edc_bytes::{FixedLayout, OwningBuffer, StreamWriter};
use edc_common::{Result, error::Error, verify_arg};
use edc_format::{
    CompressionType, ContainerHeader, ContainerType, VertexFieldInfo, VertexLayout, VertexType,
    defs::{COUNT_PREFIX_SIZE, HEADER_SIZE, MESH_INDEX_SIZE, MESH_PREAMBLE_SIZE},
    header::check_platform_endian,
};
use edc_io::WriteAt;

use crate::options::MeshWriteOptions;

/// Computes the mesh content size for the given section sizes.
pub fn mesh_content_size(
    field_count: usize,
    vertices_byte_len: usize,
    index_count: usize,
) -> Result<u64> {
    let overflow = || Error::capacity_overflow("mesh content size");
    let fields = (field_count as u64)
        .checked_mul(VertexFieldInfo::SIZE as u64)
        .ok_or_else(overflow)?;
    let indices = (index_count as u64)
        .checked_mul(MESH_INDEX_SIZE as u64)
        .ok_or_else(overflow)?;
    [
        fields,
        COUNT_PREFIX_SIZE as u64,
        vertices_byte_len as u64,
        COUNT_PREFIX_SIZE as u64,
        indices,
    ]
    .into_iter()
    .try_fold(MESH_PREAMBLE_SIZE as u64, |acc, n| acc.checked_add(n))
    .ok_or_else(overflow)
}

/// Encodes a complete mesh container (header and uncompressed content).
///
/// `vertices` holds the raw vertex records described by `layout`.
///
/// # Errors
///
/// * `InvalidArgument` if `vertices` is not a whole number of vertex records.
/// * `CapacityOverflow` if a size computation overflows.
/// * `Unsupported` if the container would exceed `options.limits`, or on a
///   big-endian host.
pub fn encode_mesh(
    layout: &VertexLayout,
    vertices: &[u8],
    indices: &[u32],
    options: &MeshWriteOptions,
) -> Result<OwningBuffer> {
    check_platform_endian()?;
    let vertex_size = layout.vertex_size();
    verify_arg!(vertex_size, vertex_size != 0);
    verify_arg!(vertices, vertices.len() % vertex_size as usize == 0);

    let field_count = layout.field_count();
    let content_size = mesh_content_size(field_count, vertices.len(), indices.len())?;
    let total_size = content_size
        .checked_add(HEADER_SIZE as u64)
        .ok_or_else(|| Error::capacity_overflow("mesh container size"))?;
    options.limits.check_size(total_size, "mesh container")?;

    let mut buf = OwningBuffer::allocate_zeroed(total_size as usize)?;
    let mut writer = StreamWriter::new(buf.as_bytes_mut());
    unsafe {
        writer.write_fixed(&ContainerHeader::new(
            ContainerType::MESH,
            CompressionType::NONE,
            content_size,
            content_size,
        ));
        writer.write_fixed(&vertex_size);
        writer.write_fixed(&MESH_INDEX_SIZE);
        writer.write_fixed(&(field_count as u32));
        for field in layout.fields() {
            writer.write_fixed(&field.info());
        }
        writer.write_fixed(&((vertices.len() / vertex_size as usize) as u64));
        writer.write_raw(vertices);
        writer.write_fixed(&(indices.len() as u64));
        // Little-endian host: the in-memory index array is the wire layout.
        writer.write_raw(bytemuck::cast_slice(indices));
    }
    debug_assert_eq!(writer.offset(), total_size);
    Ok(buf)
}

/// Encodes a mesh container and writes it at offset 0 of `sink`.
///
/// Returns the number of bytes written.
pub fn write_mesh(
    sink: &dyn WriteAt,
    layout: &VertexLayout,
    vertices: &[u8],
    indices: &[u32],
    options: &MeshWriteOptions,
) -> Result<u64> {
    let buf = encode_mesh(layout, vertices, indices, options)?;
    sink.write_at(0, buf.as_bytes())
        .map_err(|e| Error::io("mesh container", e))?;
    sink.flush().map_err(|e| Error::io("mesh container flush", e))?;
    log::debug!(
        "mesh container written: {} bytes, {} vertices, {} indices",
        buf.len(),
        vertices.len() / layout.vertex_size() as usize,
        indices.len()
    );
    Ok(buf.len() as u64)
}

/// Typed form of [`write_mesh`] using the registered layout of `V`.
pub fn write_vertices<V: VertexType>(
    sink: &dyn WriteAt,
    vertices: &[V],
    indices: &[u32],
    options: &MeshWriteOptions,
) -> Result<u64> {
    write_mesh(
        sink,
        V::layout(),
        bytemuck::cast_slice(vertices),
        indices,
        options,
    )
}
