use std::{
    fs::File,
    path::Path,
    sync::{Arc, OnceLock},
};

use crate::{ReadAt, WriteAt};

pub struct FileReader {
    file: Arc<File>,
    size: OnceLock<u64>,
}

impl FileReader {
    pub fn new(file: impl Into<Arc<File>>) -> FileReader {
        FileReader {
            file: file.into(),
            size: Default::default(),
        }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<FileReader> {
        Ok(FileReader::new(File::open(path)?))
    }
}

impl FileReader {
    fn get_size(&self) -> std::io::Result<u64> {
        if let Some(&size) = self.size.get() {
            Ok(size)
        } else {
            let size = self.file.metadata()?.len();
            let _ = self.size.set(size);
            Ok(size)
        }
    }
}

impl ReadAt for FileReader {
    fn size(&self) -> std::io::Result<u64> {
        self.get_size()
    }

    fn read_exact_at(&self, pos: u64, buf: &mut [u8]) -> std::io::Result<()> {
        if buf.is_empty() {
            return Ok(());
        }
        file_read_at_exact(&self.file, pos, buf)
    }
}

pub struct FileWriter {
    file: File,
}

impl FileWriter {
    pub fn new(file: File) -> FileWriter {
        FileWriter { file }
    }

    /// Creates a new file, failing if it already exists.
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<FileWriter> {
        Ok(FileWriter::new(File::create_new(path)?))
    }

    /// Creates a file, truncating an existing one.
    pub fn create_or_truncate<P: AsRef<Path>>(path: P) -> std::io::Result<FileWriter> {
        Ok(FileWriter::new(File::create(path)?))
    }
}

impl WriteAt for FileWriter {
    fn write_at(&self, pos: u64, buf: &[u8]) -> std::io::Result<()> {
        file_write_at(&self.file, pos, buf)
    }

    fn flush(&self) -> std::io::Result<()> {
        self.file.sync_all()
    }
}

#[cfg(unix)]
pub fn file_read_at_exact(file: &File, pos: u64, buf: &mut [u8]) -> std::io::Result<()> {
    use std::os::unix::fs::FileExt;

    file.read_exact_at(buf, pos)?;
    Ok(())
}

#[cfg(unix)]
pub fn file_write_at(file: &File, pos: u64, buf: &[u8]) -> std::io::Result<()> {
    use std::os::unix::fs::FileExt;

    file.write_all_at(buf, pos)
}

#[cfg(windows)]
pub fn file_read_at_exact(file: &File, mut pos: u64, mut buf: &mut [u8]) -> std::io::Result<()> {
    use std::os::windows::fs::FileExt;

    while !buf.is_empty() {
        match file.seek_read(buf, pos) {
            Ok(0) => break,
            Ok(n) => {
                buf = &mut buf[n..];
                pos += n as u64;
            }
            Err(e) => return Err(e),
        }
    }
    if !buf.is_empty() {
        return Err(std::io::ErrorKind::UnexpectedEof.into());
    }
    Ok(())
}

#[cfg(windows)]
pub fn file_write_at(file: &File, mut pos: u64, mut buf: &[u8]) -> std::io::Result<()> {
    use std::os::windows::fs::FileExt;

    while !buf.is_empty() {
        match file.seek_write(buf, pos) {
            Ok(0) => return Err(std::io::ErrorKind::WriteZero.into()),
            Ok(n) => {
                buf = &buf[n..];
                pos += n as u64;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{
        ReadAt, WriteAt,
        file::{FileReader, FileWriter},
    };

    #[test]
    fn test_file_reader_and_writer() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join("test.edc");
        let writer = FileWriter::create(&path).expect("create file");
        for i in 0..10u64 {
            writer.write_at(i * 8, b"abcdefgh").expect("write_at");
        }
        writer.flush().expect("flush");

        let reader = FileReader::open(&path).expect("open file");
        assert_eq!(reader.size().unwrap(), 80);
        for pos in (0..80).step_by(8) {
            let mut buf = [0u8; 4];
            reader.read_exact_at(pos, &mut buf).expect("read_exact_at");
            assert_eq!(&buf, b"abcd");
        }
    }

    #[test]
    fn test_file_short_read_fails() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join("short.edc");
        let writer = FileWriter::create(&path).unwrap();
        writer.write_at(0, b"0123456789").unwrap();

        let reader = FileReader::open(&path).unwrap();
        let mut buf = [0u8; 8];
        let e = reader.read_exact_at(6, &mut buf).unwrap_err();
        assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof);
        reader.read_exact_at(100, &mut []).unwrap();
    }

    #[test]
    fn test_create_does_not_overwrite() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join("exists.edc");
        FileWriter::create(&path).unwrap();
        assert!(FileWriter::create(&path).is_err());

        let writer = FileWriter::create_or_truncate(&path).unwrap();
        writer.write_at(4, b"xy").unwrap();
        let reader = FileReader::open(&path).unwrap();
        let mut buf = [0xffu8; 6];
        reader.read_exact_at(0, &mut buf).unwrap();
        assert_eq!(buf, [0, 0, 0, 0, b'x', b'y']);
    }
}
