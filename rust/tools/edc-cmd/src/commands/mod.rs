//! Command implementations for edc-cmd

use anyhow::{Context, Result};
use edc_container::{MeshData, MeshReadOptions, read_mesh};
use edc_format::ContainerLimits;
use edc_io::FileReader;

use crate::utils::validate_file_exists;

pub mod generate;
pub mod inspect;
pub mod verify;

/// Opens and fully decodes the mesh container at `path`.
pub fn open_mesh(path: &str, limits: ContainerLimits) -> Result<MeshData> {
    validate_file_exists(path)?;
    let reader = FileReader::open(path).with_context(|| format!("Failed to open {path}"))?;
    let options = MeshReadOptions::default().with_limits(limits);
    read_mesh(&reader, &options).with_context(|| format!("Failed to read mesh container {path}"))
}
