//! Engine data container format definitions: the fixed container header, content
//! and compression tags, size limits and the vertex field layout descriptors
//! carried by mesh content.

pub mod defs;
pub mod header;
pub mod layout;
pub mod limits;
pub mod vertex;

pub use header::{
    CompressionType, ContainerHeader, ContainerType, read_header, read_header_with_limits,
};
pub use layout::{
    SkinnedVertex, Vertex, VertexFieldData, VertexLayout, VertexLayoutBuilder, VertexPosOnly,
    VertexSlim, VertexType,
};
pub use limits::ContainerLimits;
pub use vertex::{VertexFieldInfo, VertexFieldMarshalType, VertexFieldSemantics};
