use edc_bytes::OwningBuffer;
use edc_common::error::ErrorKind;
use edc_format::{
    CompressionType, ContainerHeader, ContainerLimits, ContainerType, Vertex, read_header,
};

use crate::{
    MeshReadOptions, MeshWriteOptions, encode_mesh, read_mesh_content, read_mesh_from_bytes,
    tests::data_generator::{
        QUAD_INDICES, patch_content_size, position_layout, quad_container, quad_vertex_bytes,
    },
};

fn read(bytes: &[u8]) -> edc_common::Result<crate::MeshData> {
    read_mesh_from_bytes(bytes, &MeshReadOptions::default())
}

#[test]
fn test_magic_rejected() {
    let container = quad_container();
    for i in 0..8 {
        let mut corrupted = container.clone();
        corrupted[i] ^= 0x20;
        let e = read(&corrupted).unwrap_err();
        assert!(
            matches!(e.kind(), ErrorKind::InvalidFormat { element, .. } if element == "magic word"),
            "{e}"
        );
    }
}

#[test]
fn test_truncated_container() {
    let container = quad_container();
    for len in 0..container.len() {
        let e = read(&container[..len]).unwrap_err();
        assert!(e.is_format_error(), "length {len}: {e}");
    }
}

#[test]
fn test_truncated_content_with_consistent_header() {
    let container = quad_container();
    for len in 40..container.len() {
        let mut truncated = container[..len].to_vec();
        patch_content_size(&mut truncated, (len - 40) as u64);
        let e = read(&truncated).unwrap_err();
        assert!(e.is_format_error(), "length {len}: {e}");
    }
}

#[test]
fn test_trailing_bytes() {
    let mut container = quad_container();
    container.extend_from_slice(&[0xAB; 5]);
    // Bytes past the declared container are not part of it.
    read(&container).unwrap();

    let content_size = (container.len() - 40) as u64;
    patch_content_size(&mut container, content_size);
    let e = read(&container).unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::InvalidFormat { .. }));

    let lenient = MeshReadOptions::default().with_require_exact_length(false);
    let mesh = read_mesh_from_bytes(&container, &lenient).unwrap();
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.indices(), QUAD_INDICES);
}

#[test]
fn test_size_ceiling() {
    let mut container = quad_container();
    patch_content_size(&mut container, ContainerLimits::DEFAULT_MAX_CONTENT_SIZE + 1);
    let e = read(&container).unwrap_err();
    assert!(e.is_unsupported(), "{e}");

    let limits = ContainerLimits::default().with_max_content_size(100).unwrap();
    let e = read_mesh_from_bytes(
        &quad_container(),
        &MeshReadOptions::default().with_limits(limits),
    )
    .unwrap_err();
    assert!(e.is_unsupported());

    let e = encode_mesh(
        &position_layout(),
        &quad_vertex_bytes(),
        &QUAD_INDICES,
        &MeshWriteOptions::default().with_limits(limits),
    )
    .unwrap_err();
    assert!(e.is_unsupported());

    // 40 header bytes plus 113 content bytes fit exactly.
    let limits = ContainerLimits::default().with_max_content_size(153).unwrap();
    encode_mesh(
        &position_layout(),
        &quad_vertex_bytes(),
        &QUAD_INDICES,
        &MeshWriteOptions::default().with_limits(limits),
    )
    .unwrap();
}

#[test]
fn test_compression_tags() {
    let mut container = quad_container();
    container[20..24].copy_from_slice(&CompressionType::DEFLATE.0.to_le_bytes());
    let e = read(&container).unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::NotImplemented { .. }));

    container[20..24].copy_from_slice(&9u32.to_le_bytes());
    let e = read(&container).unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::UnsupportedCompression { tag: 9 }));
    assert!(e.is_format_error());
}

#[test]
fn test_decompressed_size_mismatch() {
    let mut container = quad_container();
    container[32..40].copy_from_slice(&200u64.to_le_bytes());
    let e = read(&container).unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::InvalidFormat { .. }));
}

#[test]
fn test_content_type_mismatch() {
    let mut container = quad_container();
    container[12..20].copy_from_slice(b"texture ");
    let e = read(&container).unwrap_err();
    match e.kind() {
        ErrorKind::ContentTypeMismatch { expected, actual } => {
            assert_eq!(expected, "mesh");
            assert_eq!(actual, "texture");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn test_read_mesh_content_length_check() {
    let container = quad_container();
    let header = read_header(&container).unwrap();
    let short = OwningBuffer::copy_from_slice(&container[40..container.len() - 1]).unwrap();
    let e = read_mesh_content(&header, short, &MeshReadOptions::default()).unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::InvalidFormat { .. }));

    let content = OwningBuffer::copy_from_slice(&container[40..]).unwrap();
    let mesh = read_mesh_content(&header, content, &MeshReadOptions::default()).unwrap();
    assert_eq!(mesh.index_count(), 6);

    let other = ContainerHeader::new(
        ContainerType(*b"texture "),
        CompressionType::NONE,
        header.content_size,
        header.content_size,
    );
    let content = OwningBuffer::copy_from_slice(&container[40..]).unwrap();
    let e = read_mesh_content(&other, content, &MeshReadOptions::default()).unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::ContentTypeMismatch { .. }));
}

#[test]
fn test_invalid_preamble_and_fields() {
    let container = quad_container();

    let mut zero_vertex_size = container.clone();
    zero_vertex_size[40..44].copy_from_slice(&0u32.to_le_bytes());
    assert!(read(&zero_vertex_size).unwrap_err().is_format_error());

    let mut wide_indices = container.clone();
    wide_indices[44..48].copy_from_slice(&2u32.to_le_bytes());
    assert!(read(&wide_indices).unwrap_err().is_format_error());

    // The single field descriptor starts at content offset 12.
    let mut bad_kind = container.clone();
    bad_kind[52] = 200;
    assert!(read(&bad_kind).unwrap_err().is_format_error());

    let mut bad_offset = container.clone();
    bad_offset[53..57].copy_from_slice(&4u32.to_le_bytes());
    assert!(read(&bad_offset).unwrap_err().is_format_error());

    let mut huge_count = container.clone();
    huge_count[65..73].copy_from_slice(&u64::MAX.to_le_bytes());
    assert!(read(&huge_count).unwrap_err().is_format_error());

    let mut huge_fields = container;
    huge_fields[48..52].copy_from_slice(&u32::MAX.to_le_bytes());
    assert!(read(&huge_fields).unwrap_err().is_format_error());
}

#[test]
fn test_encode_rejects_partial_vertex() {
    let layout = <Vertex as edc_format::VertexType>::layout();
    let e = encode_mesh(layout, &[0u8; 31], &[], &MeshWriteOptions::default()).unwrap_err();
    assert!(matches!(e.kind(), ErrorKind::InvalidArgument { .. }));
}
