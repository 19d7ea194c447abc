//! Vertex layout registration.
//!
//! A [`VertexLayout`] describes the fields of one vertex record: where each field
//! sits, its semantic role and how it is marshalled. Vertex types expose their
//! layout through [`VertexType`]. The mesh write path uses it to emit field
//! descriptors, the read path to check decoded content against a typed view.

use std::{mem::offset_of, sync::OnceLock};

use edc_common::{Result, error::Error};

use crate::vertex::{VertexFieldInfo, VertexFieldMarshalType, VertexFieldSemantics};

/// A fixed-size vertex record type with a registered field layout.
pub trait VertexType: bytemuck::Pod {
    fn layout() -> &'static VertexLayout;
}

/// One field of a vertex layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexFieldData {
    name: String,
    semantics: VertexFieldSemantics,
    byte_offset: u32,
    marshal_type: VertexFieldMarshalType,
    marshal_count: u32,
}

impl VertexFieldData {
    pub fn new(
        name: impl Into<String>,
        semantics: VertexFieldSemantics,
        byte_offset: u32,
        marshal_type: VertexFieldMarshalType,
        marshal_count: u32,
    ) -> VertexFieldData {
        VertexFieldData {
            name: name.into(),
            semantics,
            byte_offset,
            marshal_type,
            marshal_count,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn semantics(&self) -> VertexFieldSemantics {
        self.semantics
    }

    #[inline]
    pub fn byte_offset(&self) -> u32 {
        self.byte_offset
    }

    #[inline]
    pub fn marshal_type(&self) -> VertexFieldMarshalType {
        self.marshal_type
    }

    #[inline]
    pub fn marshal_count(&self) -> u32 {
        self.marshal_count
    }

    /// Byte size of the field.
    pub fn size(&self) -> usize {
        self.marshal_count as usize * self.marshal_type.component_size()
    }

    /// Wire descriptor of the field.
    pub fn info(&self) -> VertexFieldInfo {
        VertexFieldInfo::new(
            self.semantics,
            self.byte_offset,
            self.marshal_type,
            self.marshal_count,
        )
    }

    /// Reads the field out of one vertex record.
    ///
    /// Fails with `InvalidArgument` if `F` does not have the size of the field
    /// or `vertex` is too short to contain it.
    pub fn read<F: bytemuck::AnyBitPattern>(&self, vertex: &[u8]) -> Result<F> {
        let range = self.access_range::<F>(vertex.len())?;
        Ok(bytemuck::pod_read_unaligned(&vertex[range]))
    }

    /// Writes the field into one vertex record.
    ///
    /// Fails with `InvalidArgument` if `F` does not have the size of the field
    /// or `vertex` is too short to contain it.
    pub fn write<F: bytemuck::NoUninit>(&self, vertex: &mut [u8], value: &F) -> Result<()> {
        let range = self.access_range::<F>(vertex.len())?;
        vertex[range].copy_from_slice(bytemuck::bytes_of(value));
        Ok(())
    }

    fn access_range<F>(&self, vertex_len: usize) -> Result<std::ops::Range<usize>> {
        if std::mem::size_of::<F>() != self.size() {
            return Err(Error::invalid_arg(
                self.name.as_str(),
                format!(
                    "accessor of {} bytes for a {}-byte field",
                    std::mem::size_of::<F>(),
                    self.size()
                ),
            ));
        }
        let start = self.byte_offset as usize;
        let end = start + self.size();
        if end > vertex_len {
            return Err(Error::invalid_arg(
                self.name.as_str(),
                format!("field ends at {end}, vertex has {vertex_len} bytes"),
            ));
        }
        Ok(start..end)
    }
}

/// Field layout of a vertex record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    vertex_size: u32,
    fields: Vec<VertexFieldData>,
}

impl VertexLayout {
    pub fn builder(vertex_size: u32) -> VertexLayoutBuilder {
        VertexLayoutBuilder {
            vertex_size,
            fields: Vec::new(),
        }
    }

    /// Rebuilds a layout from decoded wire descriptors.
    ///
    /// Field names are derived from the semantics (`field{i}` for `Unknown`).
    /// Invalid descriptors are reported as format errors.
    pub fn from_field_infos(vertex_size: u32, infos: &[VertexFieldInfo]) -> Result<VertexLayout> {
        if vertex_size == 0 {
            return Err(Error::invalid_format("vertex size", "vertex size is zero"));
        }
        let mut fields = Vec::with_capacity(infos.len());
        for (i, info) in infos.iter().enumerate() {
            info.validate(vertex_size)?;
            let semantics = info.semantics()?;
            let marshal_type = info.marshal_type()?;
            let size = info.marshal_count as usize * marshal_type.component_size();
            if let Some(expected) = required_size(semantics, size) {
                return Err(Error::invalid_format(
                    "vertex field",
                    format!("{semantics} field {i} of {size} bytes, expected {expected}"),
                ));
            }
            let name = match semantics {
                VertexFieldSemantics::Unknown => format!("field{i}"),
                s => s.name().to_string(),
            };
            fields.push(VertexFieldData::new(
                name,
                semantics,
                info.offset,
                marshal_type,
                info.marshal_count,
            ));
        }
        if let Some(s) = find_repeated_semantics(&fields) {
            return Err(Error::invalid_format(
                "vertex fields",
                format!("semantics '{s}' appears more than once"),
            ));
        }
        Ok(VertexLayout {
            vertex_size,
            fields,
        })
    }

    #[inline]
    pub fn vertex_size(&self) -> u32 {
        self.vertex_size
    }

    #[inline]
    pub fn fields(&self) -> &[VertexFieldData] {
        &self.fields
    }

    #[inline]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, name: &str) -> Option<&VertexFieldData> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_by_semantics(&self, semantics: VertexFieldSemantics) -> Option<&VertexFieldData> {
        self.fields.iter().find(|f| f.semantics == semantics)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn has_semantics(&self, semantics: VertexFieldSemantics) -> bool {
        self.field_by_semantics(semantics).is_some()
    }

    /// Wire descriptors of all fields, in declaration order.
    pub fn field_infos(&self) -> Vec<VertexFieldInfo> {
        self.fields.iter().map(VertexFieldData::info).collect()
    }

    /// Returns `true` if `infos` describe exactly this layout's fields, in order.
    pub fn matches(&self, infos: &[VertexFieldInfo]) -> bool {
        self.fields.len() == infos.len()
            && self.fields.iter().zip(infos).all(|(f, info)| f.info() == *info)
    }

    /// Layout of a built-in vertex type, assembled from known-valid fields.
    fn predefined(
        vertex_size: usize,
        fields: &[(&str, VertexFieldSemantics, usize, u32)],
    ) -> VertexLayout {
        VertexLayout {
            vertex_size: vertex_size as u32,
            fields: fields
                .iter()
                .map(|&(name, semantics, offset, count)| {
                    let marshal_type = match semantics {
                        VertexFieldSemantics::Bone | VertexFieldSemantics::TextureIndex => {
                            VertexFieldMarshalType::Int32
                        }
                        _ => VertexFieldMarshalType::Float,
                    };
                    VertexFieldData::new(name, semantics, offset as u32, marshal_type, count)
                })
                .collect(),
        }
    }
}

pub struct VertexLayoutBuilder {
    vertex_size: u32,
    fields: Vec<VertexFieldData>,
}

impl VertexLayoutBuilder {
    pub fn field(
        mut self,
        name: impl Into<String>,
        semantics: VertexFieldSemantics,
        byte_offset: u32,
        marshal_type: VertexFieldMarshalType,
        marshal_count: u32,
    ) -> Self {
        self.fields.push(VertexFieldData::new(
            name,
            semantics,
            byte_offset,
            marshal_type,
            marshal_count,
        ));
        self
    }

    /// Validates and returns the layout.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the vertex size is zero, a field has a zero marshal
    /// count, does not fit inside the vertex, or repeats a semantic other than
    /// `Unknown`.
    pub fn build(self) -> Result<VertexLayout> {
        if self.vertex_size == 0 {
            return Err(Error::invalid_arg("vertex_size", "must be non-zero"));
        }
        for field in &self.fields {
            if field.marshal_count == 0 {
                return Err(Error::invalid_arg(
                    field.name.as_str(),
                    "marshal count must be at least 1",
                ));
            }
            if field.byte_offset as u64 + field.size() as u64 > self.vertex_size as u64 {
                return Err(Error::invalid_arg(
                    field.name.as_str(),
                    format!(
                        "field at offset {} of {} bytes exceeds the {}-byte vertex",
                        field.byte_offset,
                        field.size(),
                        self.vertex_size
                    ),
                ));
            }
            if let Some(expected) = required_size(field.semantics, field.size()) {
                return Err(Error::invalid_arg(
                    field.name.as_str(),
                    format!(
                        "{} field of {} bytes, expected {expected}",
                        field.semantics,
                        field.size()
                    ),
                ));
            }
        }
        if let Some(s) = find_repeated_semantics(&self.fields) {
            return Err(Error::invalid_arg(
                "fields",
                format!("semantics '{s}' appears more than once"),
            ));
        }
        Ok(VertexLayout {
            vertex_size: self.vertex_size,
            fields: self.fields,
        })
    }
}

/// Returns the size a field of `semantics` must have when `size` differs from it.
fn required_size(semantics: VertexFieldSemantics, size: usize) -> Option<usize> {
    semantics.valid_size().filter(|&expected| expected != size)
}

fn find_repeated_semantics(fields: &[VertexFieldData]) -> Option<VertexFieldSemantics> {
    fields.iter().enumerate().find_map(|(i, f)| {
        (f.semantics != VertexFieldSemantics::Unknown
            && fields[..i].iter().any(|prev| prev.semantics == f.semantics))
        .then_some(f.semantics)
    })
}

/// Position only.
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct VertexPosOnly {
    pub position: [f32; 3],
}

/// Position and texture coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct VertexSlim {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Position, normal and texture coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Skinned vertex: up to four bone influences and a texture array index.
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct SkinnedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub bone: [i32; 4],
    pub weight: [f32; 4],
    pub texture_index: i32,
}

impl VertexType for VertexPosOnly {
    fn layout() -> &'static VertexLayout {
        static LAYOUT: OnceLock<VertexLayout> = OnceLock::new();
        LAYOUT.get_or_init(|| {
            VertexLayout::predefined(
                size_of::<Self>(),
                &[(
                    "position",
                    VertexFieldSemantics::Position,
                    offset_of!(Self, position),
                    3,
                )],
            )
        })
    }
}

impl VertexType for VertexSlim {
    fn layout() -> &'static VertexLayout {
        static LAYOUT: OnceLock<VertexLayout> = OnceLock::new();
        LAYOUT.get_or_init(|| {
            VertexLayout::predefined(
                size_of::<Self>(),
                &[
                    ("position", VertexFieldSemantics::Position, offset_of!(Self, position), 3),
                    ("uv", VertexFieldSemantics::UV, offset_of!(Self, uv), 2),
                ],
            )
        })
    }
}

impl VertexType for Vertex {
    fn layout() -> &'static VertexLayout {
        static LAYOUT: OnceLock<VertexLayout> = OnceLock::new();
        LAYOUT.get_or_init(|| {
            VertexLayout::predefined(
                size_of::<Self>(),
                &[
                    ("position", VertexFieldSemantics::Position, offset_of!(Self, position), 3),
                    ("normal", VertexFieldSemantics::Normal, offset_of!(Self, normal), 3),
                    ("uv", VertexFieldSemantics::UV, offset_of!(Self, uv), 2),
                ],
            )
        })
    }
}

impl VertexType for SkinnedVertex {
    fn layout() -> &'static VertexLayout {
        static LAYOUT: OnceLock<VertexLayout> = OnceLock::new();
        LAYOUT.get_or_init(|| {
            VertexLayout::predefined(
                size_of::<Self>(),
                &[
                    ("position", VertexFieldSemantics::Position, offset_of!(Self, position), 3),
                    ("normal", VertexFieldSemantics::Normal, offset_of!(Self, normal), 3),
                    ("uv", VertexFieldSemantics::UV, offset_of!(Self, uv), 2),
                    ("bone", VertexFieldSemantics::Bone, offset_of!(Self, bone), 4),
                    ("weight", VertexFieldSemantics::Weight, offset_of!(Self, weight), 4),
                    (
                        "texture_index",
                        VertexFieldSemantics::TextureIndex,
                        offset_of!(Self, texture_index),
                        1,
                    ),
                ],
            )
        })
    }
}
