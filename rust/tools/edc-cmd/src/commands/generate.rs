//! Generate command implementation

use anyhow::{Context, Result};
use edc_container::{MeshWriteOptions, PrimitiveMesh, primitives};
use edc_format::{ContainerLimits, SkinnedVertex, Vertex, VertexPosOnly, VertexSlim, VertexType};
use edc_io::FileWriter;

use crate::{Primitive, VertexKind, utils::format_size};

const SPHERE_SEGMENTS: u32 = 32;
const SPHERE_RINGS: u32 = 16;

pub fn run(
    primitive: Primitive,
    vertex: VertexKind,
    path: &str,
    force: bool,
    limits: ContainerLimits,
) -> Result<()> {
    let options = MeshWriteOptions::default().with_limits(limits);
    let (vertex_count, written) = match vertex {
        VertexKind::Pos => write_primitive::<VertexPosOnly>(primitive, path, force, &options)?,
        VertexKind::Slim => write_primitive::<VertexSlim>(primitive, path, force, &options)?,
        VertexKind::Full => write_primitive::<Vertex>(primitive, path, force, &options)?,
        VertexKind::Skinned => write_primitive::<SkinnedVertex>(primitive, path, force, &options)?,
    };
    println!("Wrote {path}: {vertex_count} vertices, {}", format_size(written));
    Ok(())
}

fn build<V: VertexType>(primitive: Primitive) -> Result<PrimitiveMesh<V>> {
    let mesh = match primitive {
        Primitive::Plane => primitives::plane::<V>()?,
        Primitive::Cube => primitives::cube::<V>()?,
        Primitive::Sphere => primitives::sphere::<V>(SPHERE_SEGMENTS, SPHERE_RINGS)?,
    };
    Ok(mesh)
}

fn write_primitive<V: VertexType>(
    primitive: Primitive,
    path: &str,
    force: bool,
    options: &MeshWriteOptions,
) -> Result<(usize, u64)> {
    let mesh = build::<V>(primitive)?;
    let writer = if force {
        FileWriter::create_or_truncate(path)
    } else {
        FileWriter::create(path)
    }
    .with_context(|| format!("Failed to create {path}"))?;
    let written = match mesh.write_to(&writer, options) {
        Ok(written) => written,
        Err(e) => {
            drop(writer);
            // Leave no truncated container behind.
            if let Err(remove) = std::fs::remove_file(path) {
                log::warn!("Failed to remove {path}: {remove}");
            }
            return Err(e).with_context(|| format!("Failed to write {path}"));
        }
    };
    Ok((mesh.vertices.len(), written))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::open_mesh;

    #[test]
    fn test_generate_all_primitives() {
        let dir = tempfile::tempdir().unwrap();
        for (primitive, vertices, indices) in [
            (Primitive::Plane, 4, 6),
            (Primitive::Cube, 24, 36),
            (Primitive::Sphere, 33 * 17, 32 * 16 * 6),
        ] {
            let path = dir.path().join("mesh.edc");
            let path = path.to_str().unwrap();
            run(primitive, VertexKind::Full, path, true, ContainerLimits::default()).unwrap();
            let mesh = open_mesh(path, ContainerLimits::default()).unwrap();
            assert_eq!(mesh.vertex_count(), vertices);
            assert_eq!(mesh.index_count(), indices);
            assert!(mesh.vertices_as::<Vertex>().is_ok());
        }
    }

    #[test]
    fn test_generate_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plane.edc");
        let path = path.to_str().unwrap();
        run(Primitive::Plane, VertexKind::Pos, path, false, ContainerLimits::default()).unwrap();
        let again = run(Primitive::Plane, VertexKind::Pos, path, false, ContainerLimits::default());
        assert!(again.is_err());
        run(Primitive::Cube, VertexKind::Skinned, path, true, ContainerLimits::default()).unwrap();
    }

    #[test]
    fn test_generate_removes_file_on_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.edc");
        let limits = ContainerLimits::new().with_max_content_size(16).unwrap();
        let e = run(Primitive::Cube, VertexKind::Full, path.to_str().unwrap(), false, limits);
        assert!(e.unwrap_err().to_string().contains("Failed to write"));
        assert!(!path.exists());
    }
}
