//! Mesh container encoding and decoding.
//!
//! [`write_mesh`] encodes a vertex layout, raw vertex records and a `u32`
//! index array into a single container. [`read_mesh`] validates a container
//! and returns a [`MeshData`] that owns the backing buffer and lends out a
//! [`MeshContent`] view of the sections.

pub mod builder;
pub mod decompress;
pub mod mesh;
pub mod options;
pub mod primitives;
pub mod read;
pub mod write;

#[cfg(test)]
mod tests;

pub use builder::MeshBuilder;
pub use decompress::decompress;
pub use mesh::{MeshContent, MeshData};
pub use options::{MeshReadOptions, MeshWriteOptions};
pub use primitives::PrimitiveMesh;
pub use read::{read_mesh, read_mesh_content, read_mesh_from_bytes};
pub use write::{encode_mesh, mesh_content_size, write_mesh, write_vertices};
