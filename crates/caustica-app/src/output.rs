//! PNG output with sequential, never-overwriting file names.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use caustica_config::OutputConfig;
use image::{ImageFormat, RgbaImage};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::OutputError;

/// Attempts to claim a file name before giving up.
const MAX_NAME_ATTEMPTS: u32 = 16;

/// Writes images as `<prefix><n>.png` under a directory.
///
/// Each image is encoded into a temporary file in the target directory and
/// then moved into place without replacing an existing file, so a failed
/// write leaves nothing behind.
#[derive(Clone, Debug)]
pub struct OutputWriter {
    directory: PathBuf,
    prefix: String,
}

impl OutputWriter {
    pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.directory.clone(), config.file_prefix.clone())
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Index following the highest `<prefix><n>.png` already present, or 0.
    pub fn next_index(&self) -> Result<u64, OutputError> {
        let entries = match std::fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(self.io_error(e)),
        };

        let mut next = 0;
        for entry in entries {
            let entry = entry.map_err(|e| self.io_error(e))?;
            if let Some(index) = entry.file_name().to_str().and_then(|name| self.parse_index(name)) {
                next = next.max(index + 1);
            }
        }
        Ok(next)
    }

    /// Path of the image with sequence number `index`.
    pub fn path_for(&self, index: u64) -> PathBuf {
        self.directory.join(format!("{}{index}.png", self.prefix))
    }

    /// Encode `image` as PNG and store it under the next free name.
    ///
    /// Returns the path written.
    pub fn write(&self, image: &RgbaImage) -> Result<PathBuf, OutputError> {
        std::fs::create_dir_all(&self.directory).map_err(|e| self.io_error(e))?;

        let mut encoded = Cursor::new(Vec::new());
        image.write_to(&mut encoded, ImageFormat::Png)?;

        let mut index = self.next_index()?;
        for _ in 0..MAX_NAME_ATTEMPTS {
            let mut staged =
                NamedTempFile::new_in(&self.directory).map_err(|e| self.io_error(e))?;
            staged
                .write_all(encoded.get_ref())
                .and_then(|()| staged.flush())
                .map_err(|e| self.io_error(e))?;

            let path = self.path_for(index);
            match staged.persist_noclobber(&path) {
                Ok(_) => {
                    info!(
                        path = %path.display(),
                        width = image.width(),
                        height = image.height(),
                        "wrote caustic image"
                    );
                    return Ok(path);
                }
                Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "output name taken, trying next");
                    index += 1;
                }
                Err(e) => return Err(self.io_error(e.error)),
            }
        }

        Err(OutputError::NameExhausted {
            directory: self.directory.clone(),
        })
    }

    fn parse_index(&self, file_name: &str) -> Option<u64> {
        let digits = file_name
            .strip_prefix(self.prefix.as_str())?
            .strip_suffix(".png")?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    fn io_error(&self, source: std::io::Error) -> OutputError {
        OutputError::Io {
            directory: self.directory.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn tiny_image(value: u8) -> RgbaImage {
        RgbaImage::from_pixel(2, 2, Rgba([value, value, value, 255]))
    }

    #[test]
    fn test_writes_sequential_names() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path().join("gen-output"), "caustic");

        let first = writer.write(&tiny_image(10)).unwrap();
        let second = writer.write(&tiny_image(20)).unwrap();
        assert_eq!(first.file_name().unwrap(), "caustic0.png");
        assert_eq!(second.file_name().unwrap(), "caustic1.png");

        let decoded = image::open(&second).unwrap().to_rgba8();
        assert_eq!(decoded, tiny_image(20));
    }

    #[test]
    fn test_never_overwrites_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("caustic7.png"), b"keep me").unwrap();
        std::fs::write(dir.path().join("caustic_notes.png"), b"unrelated").unwrap();

        let writer = OutputWriter::new(dir.path(), "caustic");
        let path = writer.write(&tiny_image(1)).unwrap();
        assert_eq!(path.file_name().unwrap(), "caustic8.png");
        assert_eq!(std::fs::read(dir.path().join("caustic7.png")).unwrap(), b"keep me");
    }

    #[test]
    fn test_no_temporary_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path(), "img");
        writer.write(&tiny_image(5)).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("img0.png")]);
    }

    #[test]
    fn test_parse_index() {
        let writer = OutputWriter::new("out", "caustic");
        assert_eq!(writer.parse_index("caustic12.png"), Some(12));
        assert_eq!(writer.parse_index("caustic.png"), None);
        assert_eq!(writer.parse_index("caustic-1.png"), None);
        assert_eq!(writer.parse_index("caustic3.jpg"), None);
        assert_eq!(writer.parse_index("other3.png"), None);
    }

    #[test]
    fn test_unwritable_directory_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let writer = OutputWriter::new(blocker.join("gen-output"), "caustic");
        let result = writer.write(&tiny_image(0));
        assert!(matches!(result, Err(OutputError::Io { .. })));
    }
}
