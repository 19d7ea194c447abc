//! Decoded mesh content and the owned value that keeps it alive.

use std::ops::Range;

use edc_bytes::{ArrayView, FixedLayout, OwningBuffer, StreamReader};
use edc_common::{Result, error::Error};
use edc_format::{ContainerHeader, VertexFieldInfo, VertexLayout, VertexType, defs::MESH_INDEX_SIZE};

/// Borrowed view of decoded mesh content.
///
/// The view points into the buffer owned by [`MeshData`] and cannot outlive it.
#[derive(Debug, Clone, Copy)]
pub struct MeshContent<'a> {
    pub vertex_size: u32,
    pub index_size: u32,
    pub vertex_fields: ArrayView<'a, VertexFieldInfo>,
    pub vertices: &'a [u8],
    pub indices: &'a [u8],
}

impl MeshContent<'_> {
    #[inline]
    pub fn vertex_field_count(&self) -> usize {
        self.vertex_fields.len()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.vertex_size as usize
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len() / MESH_INDEX_SIZE as usize
    }

    /// Returns the index at position `i`, if in range.
    pub fn index(&self, i: usize) -> Option<u32> {
        let start = i.checked_mul(MESH_INDEX_SIZE as usize)?;
        let bytes = self.indices.get(start..start + MESH_INDEX_SIZE as usize)?;
        Some(u32::decode_from(bytes))
    }

    /// Returns the raw bytes of vertex `i`, if in range.
    pub fn vertex_bytes(&self, i: usize) -> Option<&[u8]> {
        let size = self.vertex_size as usize;
        let start = i.checked_mul(size)?;
        self.vertices.get(start..start + size)
    }
}

/// Location of each content section inside the decompressed buffer.
#[derive(Debug, Clone)]
pub(crate) struct MeshSections {
    pub vertex_size: u32,
    pub index_size: u32,
    pub fields: Range<usize>,
    pub field_count: usize,
    pub vertices: Range<usize>,
    pub indices: Range<usize>,
}

/// A decoded mesh container: the backing buffer together with the location of
/// each content section inside it.
pub struct MeshData {
    header: ContainerHeader,
    buffer: OwningBuffer,
    sections: MeshSections,
}

impl MeshData {
    pub(crate) fn new(
        header: ContainerHeader,
        buffer: OwningBuffer,
        sections: MeshSections,
    ) -> MeshData {
        debug_assert!(sections.fields.end <= sections.vertices.start);
        debug_assert!(sections.vertices.end <= sections.indices.start);
        debug_assert!(sections.indices.end <= buffer.len());
        debug_assert_eq!(
            sections.fields.len(),
            sections.field_count * VertexFieldInfo::SIZE
        );
        MeshData {
            header,
            buffer,
            sections,
        }
    }

    /// Header of the container this mesh was read from.
    pub fn header(&self) -> &ContainerHeader {
        &self.header
    }

    pub fn content(&self) -> MeshContent<'_> {
        let bytes = self.buffer.as_bytes();
        let mut reader = StreamReader::new(&bytes[self.sections.fields.clone()]);
        // The field range was validated to hold `field_count` records.
        let vertex_fields =
            unsafe { reader.read_array::<VertexFieldInfo>(self.sections.field_count) };
        MeshContent {
            vertex_size: self.sections.vertex_size,
            index_size: self.sections.index_size,
            vertex_fields,
            vertices: &bytes[self.sections.vertices.clone()],
            indices: &bytes[self.sections.indices.clone()],
        }
    }

    #[inline]
    pub fn vertex_size(&self) -> u32 {
        self.sections.vertex_size
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.sections.vertices.len() / self.sections.vertex_size as usize
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.sections.indices.len() / MESH_INDEX_SIZE as usize
    }

    pub fn field_infos(&self) -> Vec<VertexFieldInfo> {
        self.content().vertex_fields.to_vec()
    }

    /// Vertex layout described by the content's field descriptors.
    pub fn layout(&self) -> Result<VertexLayout> {
        VertexLayout::from_field_infos(self.vertex_size(), &self.field_infos())
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        &self.buffer.as_bytes()[self.sections.vertices.clone()]
    }

    pub fn index_bytes(&self) -> &[u8] {
        &self.buffer.as_bytes()[self.sections.indices.clone()]
    }

    /// Copies the vertices out as `V` records.
    ///
    /// Fails with a format error unless the content's vertex size and field
    /// descriptors match `V::layout()`.
    pub fn vertices_as<V: VertexType>(&self) -> Result<Vec<V>> {
        let layout = V::layout();
        let infos = self.field_infos();
        if layout.vertex_size() != self.vertex_size() || !layout.matches(&infos) {
            return Err(Error::invalid_format(
                "vertex layout",
                format!(
                    "content has {} fields / {} bytes, vertex type has {} fields / {} bytes",
                    infos.len(),
                    self.vertex_size(),
                    layout.field_count(),
                    layout.vertex_size()
                ),
            ));
        }
        Ok(self
            .vertex_bytes()
            .chunks_exact(size_of::<V>())
            .map(bytemuck::pod_read_unaligned)
            .collect())
    }

    /// Decodes the index array.
    pub fn indices(&self) -> Vec<u32> {
        self.index_bytes()
            .chunks_exact(MESH_INDEX_SIZE as usize)
            .map(u32::decode_from)
            .collect()
    }

    /// Releases the section bookkeeping and returns the backing buffer.
    pub fn into_buffer(self) -> OwningBuffer {
        self.buffer
    }
}

impl std::fmt::Debug for MeshData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshData")
            .field("vertex_size", &self.sections.vertex_size)
            .field("field_count", &self.sections.field_count)
            .field("vertex_count", &self.vertex_count())
            .field("index_count", &self.index_count())
            .finish_non_exhaustive()
    }
}
