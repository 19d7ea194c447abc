//! Vertex field descriptors: the semantic role of a field, its wire marshalling
//! type and the 13-byte record that describes it inside mesh content.

use edc_bytes::FixedLayout;
use edc_common::{Result, error::Error};

/// Semantic role of a vertex field. Encoded as one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VertexFieldSemantics {
    Unknown = 0,
    Position = 1,
    UV = 2,
    Normal = 3,
    Color = 4,
    TextureIndex = 5,
    Bone = 6,
    Weight = 7,
    Tangent = 8,
}

impl VertexFieldSemantics {
    pub const ALL: [VertexFieldSemantics; 9] = [
        Self::Unknown,
        Self::Position,
        Self::UV,
        Self::Normal,
        Self::Color,
        Self::TextureIndex,
        Self::Bone,
        Self::Weight,
        Self::Tangent,
    ];

    pub fn from_u8(value: u8) -> Option<VertexFieldSemantics> {
        Self::ALL.get(value as usize).copied()
    }

    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Byte size a field of this semantic must have, `None` for `Unknown`.
    pub fn valid_size(self) -> Option<usize> {
        match self {
            Self::Unknown => None,
            Self::Position => Some(12),
            Self::UV => Some(8),
            Self::Normal => Some(12),
            Self::Color => Some(16),
            Self::TextureIndex => Some(4),
            Self::Bone => Some(16),
            Self::Weight => Some(16),
            Self::Tangent => Some(12),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Position => "position",
            Self::UV => "uv",
            Self::Normal => "normal",
            Self::Color => "color",
            Self::TextureIndex => "texture_index",
            Self::Bone => "bone",
            Self::Weight => "weight",
            Self::Tangent => "tangent",
        }
    }
}

impl std::fmt::Display for VertexFieldSemantics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Component type used to marshal a vertex field to the GPU. Encoded as `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum VertexFieldMarshalType {
    Float = 0,
    HalfFloat = 1,
    Int8 = 2,
    UInt8 = 3,
    Int16 = 4,
    UInt16 = 5,
    Int32 = 6,
    UInt32 = 7,
}

impl VertexFieldMarshalType {
    pub const ALL: [VertexFieldMarshalType; 8] = [
        Self::Float,
        Self::HalfFloat,
        Self::Int8,
        Self::UInt8,
        Self::Int16,
        Self::UInt16,
        Self::Int32,
        Self::UInt32,
    ];

    pub fn from_u32(value: u32) -> Option<VertexFieldMarshalType> {
        Self::ALL.get(value as usize).copied()
    }

    #[inline]
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Byte size of one component.
    pub fn component_size(self) -> usize {
        match self {
            Self::Float | Self::Int32 | Self::UInt32 => 4,
            Self::HalfFloat | Self::Int16 | Self::UInt16 => 2,
            Self::Int8 | Self::UInt8 => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::HalfFloat => "half_float",
            Self::Int8 => "int8",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
        }
    }
}

impl std::fmt::Display for VertexFieldMarshalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Wire descriptor of one vertex field:
/// * kind:`u8`
/// * offset:`u32`
/// * marshal_type:`u32`
/// * marshal_count:`u32`
///
/// The tags are kept raw so that any record can be decoded. [`validate`](Self::validate)
/// checks them against the known semantics and marshal types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexFieldInfo {
    pub kind: u8,
    pub offset: u32,
    pub marshal_type: u32,
    pub marshal_count: u32,
}

impl VertexFieldInfo {
    pub fn new(
        semantics: VertexFieldSemantics,
        offset: u32,
        marshal_type: VertexFieldMarshalType,
        marshal_count: u32,
    ) -> VertexFieldInfo {
        VertexFieldInfo {
            kind: semantics.as_u8(),
            offset,
            marshal_type: marshal_type.as_u32(),
            marshal_count,
        }
    }

    pub fn semantics(&self) -> Result<VertexFieldSemantics> {
        VertexFieldSemantics::from_u8(self.kind).ok_or_else(|| {
            Error::invalid_format(
                "vertex field kind",
                format!("unknown semantics {}", self.kind),
            )
        })
    }

    pub fn marshal_type(&self) -> Result<VertexFieldMarshalType> {
        VertexFieldMarshalType::from_u32(self.marshal_type).ok_or_else(|| {
            Error::invalid_format(
                "vertex field marshal type",
                format!("unknown marshal type {}", self.marshal_type),
            )
        })
    }

    /// Checks the tags and that the field lies within a vertex of `vertex_size` bytes.
    pub fn validate(&self, vertex_size: u32) -> Result<()> {
        self.semantics()?;
        let marshal_type = self.marshal_type()?;
        let field_size = (self.marshal_count as u64) * marshal_type.component_size() as u64;
        if self.marshal_count == 0 || self.offset as u64 + field_size > vertex_size as u64 {
            return Err(Error::invalid_format(
                "vertex field",
                format!(
                    "field at offset {} ({} x {}) does not fit a {vertex_size}-byte vertex",
                    self.offset, self.marshal_count, marshal_type
                ),
            ));
        }
        Ok(())
    }
}

impl FixedLayout for VertexFieldInfo {
    const SIZE: usize = 13;

    fn encode_to(&self, out: &mut [u8]) {
        out[0] = self.kind;
        self.offset.encode_to(&mut out[1..5]);
        self.marshal_type.encode_to(&mut out[5..9]);
        self.marshal_count.encode_to(&mut out[9..13]);
    }

    fn decode_from(bytes: &[u8]) -> Self {
        VertexFieldInfo {
            kind: bytes[0],
            offset: u32::decode_from(&bytes[1..5]),
            marshal_type: u32::decode_from(&bytes[5..9]),
            marshal_count: u32::decode_from(&bytes[9..13]),
        }
    }
}

#[cfg(test)]
mod tests {
    use edc_bytes::FixedLayout;

    use super::*;

    #[test]
    fn test_field_info_wire_layout() {
        let info = VertexFieldInfo::new(
            VertexFieldSemantics::Normal,
            12,
            VertexFieldMarshalType::Float,
            3,
        );
        let mut out = [0u8; VertexFieldInfo::SIZE];
        info.encode_to(&mut out);
        assert_eq!(out, [3, 12, 0, 0, 0, 0, 0, 0, 0, 3, 0, 0, 0]);
        assert_eq!(VertexFieldInfo::decode_from(&out), info);
    }

    #[test]
    fn test_tag_conversions() {
        for s in VertexFieldSemantics::ALL {
            assert_eq!(VertexFieldSemantics::from_u8(s.as_u8()), Some(s));
        }
        assert_eq!(VertexFieldSemantics::from_u8(9), None);
        for m in VertexFieldMarshalType::ALL {
            assert_eq!(VertexFieldMarshalType::from_u32(m.as_u32()), Some(m));
        }
        assert_eq!(VertexFieldMarshalType::from_u32(8), None);
        assert_eq!(VertexFieldSemantics::Color.valid_size(), Some(16));
        assert_eq!(VertexFieldSemantics::Unknown.valid_size(), None);
        assert_eq!(VertexFieldMarshalType::HalfFloat.component_size(), 2);
    }

    #[test]
    fn test_validate() {
        let info = VertexFieldInfo::new(
            VertexFieldSemantics::Position,
            0,
            VertexFieldMarshalType::Float,
            3,
        );
        assert!(info.validate(12).is_ok());
        assert!(info.validate(11).unwrap_err().is_format_error());

        let bad_kind = VertexFieldInfo { kind: 42, ..info };
        assert!(bad_kind.validate(12).unwrap_err().is_format_error());

        let bad_marshal = VertexFieldInfo {
            marshal_type: 100,
            ..info
        };
        assert!(bad_marshal.validate(12).unwrap_err().is_format_error());

        let empty = VertexFieldInfo {
            marshal_count: 0,
            ..info
        };
        assert!(empty.validate(12).is_err());

        let far = VertexFieldInfo {
            offset: u32::MAX,
            ..info
        };
        assert!(far.validate(u32::MAX).is_err());
    }
}
