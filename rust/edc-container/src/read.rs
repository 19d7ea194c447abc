//! Mesh container read path.
//!
//! Decoding is a straight pipeline with early exit: header checks, content
//! length check, decompression, then a single forward walk over the content.
//! Every size read from the stream is validated with
//! [`StreamReader::ensure_remaining`] before the unchecked cursor reads it.

use edc_bytes::{FixedLayout, OwningBuffer, StreamReader};
use edc_common::{
    Result,
    error::{Error, ErrorKind},
    verify_data,
};
use edc_format::{
    ContainerHeader, ContainerType, VertexFieldInfo,
    defs::{COUNT_PREFIX_SIZE, HEADER_SIZE, MESH_INDEX_SIZE, MESH_PREAMBLE_SIZE},
    header::check_platform_endian,
    read_header_with_limits,
};
use edc_io::{ReadAt, read_to_buffer};

use crate::{
    decompress::decompress,
    mesh::{MeshData, MeshSections},
    options::MeshReadOptions,
};

/// Decodes the content of a mesh container whose header was already read.
///
/// Takes ownership of `content`, which holds exactly the stored content bytes
/// following the header. The content buffer is released on every failure path.
/// On success it becomes (or is replaced by its decompressed form as) the
/// backing buffer of the returned [`MeshData`].
///
/// # Errors
///
/// * `Unsupported` on a big-endian host.
/// * `ContentTypeMismatch` if the header does not describe a mesh.
/// * `InvalidFormat` if the content length disagrees with the header, the
///   content is truncated, a size computation overflows, or a field
///   descriptor is invalid.
/// * `NotImplemented` / `UnsupportedCompression` from decompression.
pub fn read_mesh_content(
    header: &ContainerHeader,
    content: OwningBuffer,
    options: &MeshReadOptions,
) -> Result<MeshData> {
    check_platform_endian()?;
    if header.content_type != ContainerType::MESH {
        return Err(ErrorKind::ContentTypeMismatch {
            expected: ContainerType::MESH.name(),
            actual: header.content_type.name(),
        }
        .into());
    }
    if content.len() as u64 != header.content_size {
        return Err(Error::invalid_format(
            "content size",
            format!(
                "header declares {} content bytes, {} supplied",
                header.content_size,
                content.len()
            ),
        ));
    }

    let decompressed = decompress(header, content)?;
    let sections = parse_mesh_sections(decompressed.as_bytes(), options)?;
    log::debug!(
        "mesh content: {} fields, {} vertices of {} bytes, {} indices",
        sections.field_count,
        sections.vertices.len() / sections.vertex_size as usize,
        sections.vertex_size,
        sections.indices.len() / MESH_INDEX_SIZE as usize
    );
    Ok(MeshData::new(*header, decompressed, sections))
}

/// Reads a mesh container from a positional byte source.
///
/// The source must hold the 40-byte header followed by the content. Bytes
/// beyond the declared content are ignored.
pub fn read_mesh(source: &dyn ReadAt, options: &MeshReadOptions) -> Result<MeshData> {
    let size = source
        .size()
        .map_err(|e| Error::io("container source size", e))?;
    verify_data!("container header size", size >= HEADER_SIZE as u64);
    let header_bytes = read_to_buffer(source, 0, HEADER_SIZE, "container header")?;
    let header = read_header_with_limits(header_bytes.as_bytes(), &options.limits)?;

    let end = header
        .container_size()
        .ok_or_else(|| Error::invalid_format("content size", "container size overflows"))?;
    if size < end {
        return Err(Error::invalid_format(
            "content",
            format!("container declares {end} bytes, source holds {size} bytes"),
        ));
    }
    // The ceiling check bounds the content size to `isize::MAX`.
    let content = read_to_buffer(
        source,
        HEADER_SIZE as u64,
        header.content_size as usize,
        "content",
    )?;
    read_mesh_content(&header, content, options)
}

/// Reads a mesh container from an in-memory image.
pub fn read_mesh_from_bytes(bytes: &[u8], options: &MeshReadOptions) -> Result<MeshData> {
    let header = read_header_with_limits(bytes, &options.limits)?;
    let end = header
        .container_size()
        .filter(|&end| end <= bytes.len() as u64)
        .ok_or_else(|| {
            Error::invalid_format(
                "content",
                format!(
                    "container declares {} content bytes, {} available",
                    header.content_size,
                    bytes.len() - HEADER_SIZE
                ),
            )
        })?;
    let content = OwningBuffer::copy_from_slice(&bytes[HEADER_SIZE..end as usize])?;
    read_mesh_content(&header, content, options)
}

/// Walks the decompressed content and records where each section lies.
fn parse_mesh_sections(content: &[u8], options: &MeshReadOptions) -> Result<MeshSections> {
    let mut reader = StreamReader::new(content);

    reader.ensure_remaining(MESH_PREAMBLE_SIZE as u64, "mesh preamble")?;
    let (vertex_size, index_size, field_count) = unsafe {
        (
            reader.read_fixed::<u32>(),
            reader.read_fixed::<u32>(),
            reader.read_fixed::<u32>(),
        )
    };
    verify_data!("vertex size", vertex_size != 0);
    verify_data!("index size", index_size == MESH_INDEX_SIZE);

    let field_count = field_count as usize;
    let fields_len = field_count as u64 * VertexFieldInfo::SIZE as u64;
    reader.ensure_remaining(fields_len, "vertex fields")?;
    let fields_start = reader.offset() as usize;
    let fields = unsafe { reader.read_array::<VertexFieldInfo>(field_count) };
    for info in fields.iter() {
        info.validate(vertex_size)?;
    }
    let fields = fields_start..reader.offset() as usize;

    let vertices = read_counted_section(&mut reader, vertex_size, "vertices")?;
    let indices = read_counted_section(&mut reader, index_size, "indices")?;

    if options.require_exact_length && reader.remaining() != 0 {
        return Err(Error::invalid_format(
            "content",
            format!("{} trailing bytes after the index data", reader.remaining()),
        ));
    }

    Ok(MeshSections {
        vertex_size,
        index_size,
        fields,
        field_count,
        vertices,
        indices,
    })
}

/// Reads a `u64` element count followed by `count * element_size` bytes and
/// returns the byte range of the elements.
fn read_counted_section(
    reader: &mut StreamReader<'_>,
    element_size: u32,
    element: &str,
) -> Result<std::ops::Range<usize>> {
    reader.ensure_remaining(COUNT_PREFIX_SIZE as u64, element)?;
    let count = unsafe { reader.read_fixed::<u64>() };
    let byte_len = count.checked_mul(element_size as u64).ok_or_else(|| {
        Error::invalid_format(
            element,
            format!("{count} records of {element_size} bytes overflow"),
        )
    })?;
    reader.ensure_remaining(byte_len, element)?;
    let start = reader.offset() as usize;
    // `ensure_remaining` bounds `byte_len` by the content length.
    unsafe { reader.read_bytes(byte_len as usize) };
    Ok(start..reader.offset() as usize)
}
