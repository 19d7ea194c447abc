use edc_container::{
    MeshBuilder, MeshReadOptions, MeshWriteOptions, primitives, read_mesh, write_vertices,
};
use edc_format::{SkinnedVertex, Vertex, VertexSlim};
use edc_io::{FileReader, FileWriter, ReadAt};

#[test]
fn test_cube_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cube.edc");

    let cube = primitives::cube::<Vertex>().unwrap();
    let writer = FileWriter::create(&path).unwrap();
    let written = cube.write_to(&writer, &MeshWriteOptions::default()).unwrap();
    drop(writer);

    let reader = FileReader::open(&path).unwrap();
    assert_eq!(reader.size().unwrap(), written);
    let mesh = read_mesh(&reader, &MeshReadOptions::default()).unwrap();
    assert_eq!(mesh.vertices_as::<Vertex>().unwrap(), cube.vertices);
    assert_eq!(mesh.indices(), cube.indices);
}

#[test]
fn test_truncated_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plane.edc");

    let plane = primitives::plane::<VertexSlim>().unwrap();
    let writer = FileWriter::create(&path).unwrap();
    let written = write_vertices(
        &writer,
        &plane.vertices,
        &plane.indices,
        &MeshWriteOptions::default(),
    )
    .unwrap();
    drop(writer);

    let file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
    file.set_len(written - 1).unwrap();
    drop(file);

    let reader = FileReader::open(&path).unwrap();
    let e = read_mesh(&reader, &MeshReadOptions::default()).unwrap_err();
    assert!(e.is_format_error(), "{e}");
}

#[test]
fn test_builder_to_file() {
    fastrand::seed(77);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("assembled.edc");

    let mut builder = MeshBuilder::<SkinnedVertex>::new();
    let plane = primitives::plane::<SkinnedVertex>().unwrap();
    let cube = primitives::cube::<SkinnedVertex>().unwrap();
    for _ in 0..fastrand::usize(2..8) {
        builder.append_primitive(&plane.vertices, &plane.indices).unwrap();
        builder.append_primitive(&cube.vertices, &cube.indices).unwrap();
    }

    let writer = FileWriter::create_or_truncate(&path).unwrap();
    builder.write_to(&writer, &MeshWriteOptions::default()).unwrap();
    drop(writer);

    let mesh = read_mesh(&FileReader::open(&path).unwrap(), &MeshReadOptions::default()).unwrap();
    assert_eq!(mesh.vertex_count(), builder.vertex_count());
    assert_eq!(mesh.indices(), builder.indices());
    assert!(mesh.indices().iter().all(|&i| (i as usize) < mesh.vertex_count()));
    assert_eq!(mesh.vertices_as::<SkinnedVertex>().unwrap(), builder.vertices());
}
