//! Verify command implementation

use anyhow::Result;
use edc_format::ContainerLimits;

use crate::{commands::open_mesh, utils::format_size};

pub fn run(paths: &[String], limits: ContainerLimits) -> Result<()> {
    let mut failed = 0usize;
    for path in paths {
        match verify_one(path, limits) {
            Ok(report) => println!("OK      {path}: {report}"),
            Err(e) => {
                failed += 1;
                println!("FAILED  {path}: {e:#}");
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {} containers failed verification", paths.len());
    }
    Ok(())
}

/// Decodes the container and checks that every index refers to a vertex.
fn verify_one(path: &str, limits: ContainerLimits) -> Result<String> {
    let mesh = open_mesh(path, limits)?;
    mesh.layout()?;
    let vertex_count = mesh.vertex_count();
    let content = mesh.content();
    let out_of_range = (0..content.index_count())
        .filter_map(|i| content.index(i))
        .filter(|&i| i as usize >= vertex_count)
        .count();
    if out_of_range > 0 {
        log::warn!("{path}: {out_of_range} indices refer past {vertex_count} vertices");
        anyhow::bail!("{out_of_range} indices out of range");
    }
    Ok(format!(
        "{} vertices, {} indices, {}",
        vertex_count,
        mesh.index_count(),
        format_size(mesh.header().container_size().unwrap_or(u64::MAX))
    ))
}
