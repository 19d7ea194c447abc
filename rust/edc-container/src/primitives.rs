//! Primitive meshes for any registered vertex type.
//!
//! Positions, normals and texture coordinates are written through the vertex
//! layout, so any [`VertexType`] with a `Position` field can be produced. Fields
//! the layout lacks stay zero. Texture coordinates are left-top based.

use std::f32::consts::PI;

use edc_common::{Result, error::Error};
use edc_format::{VertexFieldSemantics, VertexType};
use edc_io::WriteAt;

use crate::{options::MeshWriteOptions, write::write_vertices};

/// Half extent of the unit primitives.
const A: f32 = 0.5;

/// Index pattern of one quad: `0-1-2`, `0-2-3`.
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveMesh<V> {
    pub vertices: Vec<V>,
    pub indices: Vec<u32>,
}

impl<V: VertexType> PrimitiveMesh<V> {
    pub fn write_to(&self, sink: &dyn WriteAt, options: &MeshWriteOptions) -> Result<u64> {
        write_vertices(sink, &self.vertices, &self.indices, options)
    }
}

/// Unit square in the XY plane facing +Z.
///
/// ```text
///   0 ----- 3
///   |  \    |
///   |    \  |
///   1 ----- 2
/// ```
pub fn plane<V: VertexType>() -> Result<PrimitiveMesh<V>> {
    let positions = [[-A, A, 0.0], [-A, -A, 0.0], [A, -A, 0.0], [A, A, 0.0]];
    let vertices = build_vertices::<V>(&positions, &[[0.0, 0.0, 1.0]; 4], &QUAD_UVS)?;
    Ok(PrimitiveMesh {
        vertices,
        indices: QUAD_INDICES.to_vec(),
    })
}

/// Unit cube centered at the origin: four vertices per face with a flat face normal.
pub fn cube<V: VertexType>() -> Result<PrimitiveMesh<V>> {
    // (normal, right, up): corner = normal * A + right * u + up * v, seen from outside.
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(24);
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity(24);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (face, (n, r, u)) in faces.iter().enumerate() {
        for (du, dv) in [(-A, A), (-A, -A), (A, -A), (A, A)] {
            positions.push(std::array::from_fn(|k| n[k] * A + r[k] * du + u[k] * dv));
            normals.push(*n);
        }
        uvs.extend_from_slice(&QUAD_UVS);
        let base = face as u32 * 4;
        indices.extend(QUAD_INDICES.iter().map(|i| base + i));
    }
    let vertices = build_vertices::<V>(&positions, &normals, &uvs)?;
    Ok(PrimitiveMesh { vertices, indices })
}

/// UV sphere of radius 0.5 with `segments` slices around the Y axis and
/// `rings` stacks from pole to pole.
pub fn sphere<V: VertexType>(segments: u32, rings: u32) -> Result<PrimitiveMesh<V>> {
    if segments < 3 || rings < 2 {
        return Err(Error::invalid_arg(
            "segments",
            format!("sphere needs at least 3 segments and 2 rings, got {segments} x {rings}"),
        ));
    }
    // Indices are u32, so the grid may hold at most 2^32 vertices.
    let vertex_count = (segments as u64 + 1)
        .checked_mul(rings as u64 + 1)
        .filter(|&n| n <= u32::MAX as u64 + 1)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            Error::invalid_arg(
                "segments",
                format!("{segments} x {rings} sphere exceeds the u32 index range"),
            )
        })?;
    let index_count = (segments as usize)
        .checked_mul(rings as usize)
        .and_then(|n| n.checked_mul(6))
        .filter(|n| n.checked_mul(size_of::<u32>()).is_some_and(|b| b <= isize::MAX as usize))
        .ok_or_else(|| {
            Error::invalid_arg(
                "rings",
                format!("{segments} x {rings} sphere index array size overflows"),
            )
        })?;
    let mut positions: Vec<[f32; 3]> = try_vec(vertex_count)?;
    let mut normals: Vec<[f32; 3]> = try_vec(vertex_count)?;
    let mut uvs: Vec<[f32; 2]> = try_vec(vertex_count)?;
    for y in 0..=rings {
        let phi = PI / 2.0 - PI / rings as f32 * y as f32;
        let (sin_phi, cos_phi) = phi.sin_cos();
        for x in 0..=segments {
            let theta = PI - 2.0 * PI / segments as f32 * x as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();
            let n = [cos_phi * cos_theta, sin_phi, cos_phi * sin_theta];
            positions.push(n.map(|c| c * A));
            normals.push(n);
            uvs.push([x as f32 / segments as f32, y as f32 / rings as f32]);
        }
    }
    let stride = segments + 1;
    let mut indices: Vec<u32> = try_vec(index_count)?;
    for y in 0..rings {
        for x in 0..segments {
            let lt = stride * y + x;
            let lb = stride * (y + 1) + x;
            let rb = lb + 1;
            let rt = lt + 1;
            indices.extend_from_slice(&[lt, lb, rb, lt, rb, rt]);
        }
    }
    let vertices = build_vertices::<V>(&positions, &normals, &uvs)?;
    Ok(PrimitiveMesh { vertices, indices })
}

const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]];

fn try_vec<T>(capacity: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(capacity)
        .map_err(|_| Error::out_of_memory(capacity.saturating_mul(size_of::<T>())))?;
    Ok(v)
}

fn build_vertices<V: VertexType>(
    positions: &[[f32; 3]],
    normals: &[[f32; 3]],
    uvs: &[[f32; 2]],
) -> Result<Vec<V>> {
    let layout = V::layout();
    let position = layout
        .field_by_semantics(VertexFieldSemantics::Position)
        .ok_or_else(|| Error::invalid_arg("vertex type", "layout has no position field"))?;
    let normal = layout.field_by_semantics(VertexFieldSemantics::Normal);
    let uv = layout.field_by_semantics(VertexFieldSemantics::UV);

    let mut vertices: Vec<V> = try_vec(positions.len())?;
    vertices.resize(positions.len(), <V as bytemuck::Zeroable>::zeroed());
    for (i, vertex) in vertices.iter_mut().enumerate() {
        let bytes = bytemuck::bytes_of_mut(vertex);
        position.write(bytes, &positions[i])?;
        if let Some(normal) = normal {
            normal.write(bytes, &normals[i])?;
        }
        if let Some(uv) = uv {
            uv.write(bytes, &uvs[i])?;
        }
    }
    Ok(vertices)
}
