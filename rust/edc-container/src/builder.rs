use edc_bytes::GrowableBuffer;
use edc_common::{Result, error::Error};
use edc_format::VertexType;
use edc_io::WriteAt;

use crate::{options::MeshWriteOptions, write::write_vertices};

/// Assembles a mesh from primitives of unknown final size, such as the parts
/// of an imported model, and serializes it as one container.
pub struct MeshBuilder<V> {
    vertices: GrowableBuffer<V>,
    indices: GrowableBuffer<u32>,
}

impl<V: VertexType> MeshBuilder<V> {
    pub fn new() -> MeshBuilder<V> {
        MeshBuilder {
            vertices: GrowableBuffer::new(),
            indices: GrowableBuffer::new(),
        }
    }

    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Result<MeshBuilder<V>> {
        Ok(MeshBuilder {
            vertices: GrowableBuffer::with_capacity(vertex_count)?,
            indices: GrowableBuffer::with_capacity(index_count)?,
        })
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn vertices(&self) -> &[V] {
        self.vertices.written()
    }

    pub fn indices(&self) -> &[u32] {
        self.indices.written()
    }

    pub fn push_vertex(&mut self, vertex: V) -> Result<()> {
        self.vertices.push(vertex)
    }

    pub fn push_index(&mut self, index: u32) -> Result<()> {
        self.indices.push(index)
    }

    /// Appends a primitive whose indices are relative to its own vertices.
    ///
    /// The indices are rebased by the current vertex count. Fails with
    /// `InvalidArgument` if a rebased index does not fit `u32` or a primitive
    /// index refers past the primitive's vertices, in which case nothing is
    /// appended.
    pub fn append_primitive(&mut self, vertices: &[V], indices: &[u32]) -> Result<()> {
        let base = u32::try_from(self.vertices.len())
            .map_err(|_| Error::invalid_arg("vertices", "vertex count exceeds u32 index range"))?;
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(Error::invalid_arg(
                "indices",
                format!("index {bad} refers past {} primitive vertices", vertices.len()),
            ));
        }
        u32::try_from(vertices.len())
            .ok()
            .and_then(|n| base.checked_add(n))
            .ok_or_else(|| {
                Error::invalid_arg("vertices", "rebased indices exceed u32 index range")
            })?;

        let span = self.indices.get_zeroed_span(indices.len())?;
        for (dst, &i) in span.iter_mut().zip(indices) {
            *dst = base + i;
        }
        self.vertices.extend_from_slice(vertices)?;
        // The span was filled above.
        unsafe { self.indices.advance(indices.len()) }
    }

    /// Appends `count` zero-initialized vertices, lets `fill` initialize them and
    /// commits them. Returns the index of the first reserved vertex.
    pub fn reserve_vertices<F>(&mut self, count: usize, fill: F) -> Result<usize>
    where
        F: FnOnce(&mut [V]),
    {
        let first = self.vertices.len();
        let span = self.vertices.get_zeroed_span(count)?;
        fill(span);
        // Zero-cleared, hence initialized even where `fill` wrote nothing.
        unsafe { self.vertices.advance(count)? };
        Ok(first)
    }

    /// Serializes the assembled mesh at offset 0 of `sink`.
    pub fn write_to(&self, sink: &dyn WriteAt, options: &MeshWriteOptions) -> Result<u64> {
        write_vertices(sink, self.vertices(), self.indices(), options)
    }

    /// Discards the assembled data and releases the buffers.
    pub fn clear(&mut self) {
        self.vertices.release();
        self.indices.release();
    }
}

impl<V: VertexType> Default for MeshBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}
