//! Inspect command implementation

use anyhow::Result;
use edc_container::MeshData;
use edc_format::{
    ContainerLimits, SkinnedVertex, Vertex, VertexLayout, VertexPosOnly, VertexSlim, VertexType,
};
use serde::Serialize;

use crate::{commands::open_mesh, utils::format_size};

#[derive(Serialize)]
struct InspectSummary {
    path: String,
    container_size: u64,
    container_size_text: String,
    header: HeaderInfo,
    mesh: MeshInfo,
}

#[derive(Serialize)]
struct HeaderInfo {
    format_version: u32,
    content_type: String,
    compression: String,
    content_size: u64,
    decompressed_size: u64,
}

#[derive(Serialize)]
struct MeshInfo {
    vertex_size: u32,
    index_size: u32,
    vertex_count: usize,
    index_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    vertex_type: Option<&'static str>,
    fields: Vec<FieldInfo>,
}

#[derive(Serialize)]
struct FieldInfo {
    name: String,
    semantics: String,
    offset: u32,
    marshal_type: String,
    marshal_count: u32,
    size: usize,
}

pub fn run(path: &str, limits: ContainerLimits) -> Result<()> {
    let mesh = open_mesh(path, limits)?;
    let summary = summarize(path, &mesh)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn summarize(path: &str, mesh: &MeshData) -> Result<InspectSummary> {
    let header = mesh.header();
    let content = mesh.content();
    let layout = mesh.layout()?;
    let container_size = header.container_size().unwrap_or(u64::MAX);
    Ok(InspectSummary {
        path: path.to_string(),
        container_size,
        container_size_text: format_size(container_size),
        header: HeaderInfo {
            format_version: header.format_version,
            content_type: header.content_type.name(),
            compression: header.compression_type.to_string(),
            content_size: header.content_size,
            decompressed_size: header.decompressed_size,
        },
        mesh: MeshInfo {
            vertex_size: content.vertex_size,
            index_size: content.index_size,
            vertex_count: content.vertex_count(),
            index_count: content.index_count(),
            vertex_type: known_vertex_type(&layout),
            fields: layout
                .fields()
                .iter()
                .map(|f| FieldInfo {
                    name: f.name().to_string(),
                    semantics: f.semantics().to_string(),
                    offset: f.byte_offset(),
                    marshal_type: f.marshal_type().to_string(),
                    marshal_count: f.marshal_count(),
                    size: f.size(),
                })
                .collect(),
        },
    })
}

fn known_vertex_type(layout: &VertexLayout) -> Option<&'static str> {
    fn is<V: VertexType>(layout: &VertexLayout) -> bool {
        V::layout().vertex_size() == layout.vertex_size()
            && V::layout().matches(&layout.field_infos())
    }
    if is::<VertexPosOnly>(layout) {
        Some("pos")
    } else if is::<VertexSlim>(layout) {
        Some("slim")
    } else if is::<Vertex>(layout) {
        Some("full")
    } else if is::<SkinnedVertex>(layout) {
        Some("skinned")
    } else {
        None
    }
}
