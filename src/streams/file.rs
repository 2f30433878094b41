//! File stream implementation

use crate::core::{Result, Stream, StreamError};
use fs2::FileExt;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends each blob to a file, followed by a newline
///
/// The file is held under an exclusive advisory lock for the lifetime of the
/// stream so two processes never interleave blobs in it.
pub struct FileStream {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl FileStream {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        FileExt::try_lock_exclusive(&file).map_err(|e| {
            StreamError::writer(format!(
                "failed to acquire file lock on '{}': {}",
                path.display(),
                e
            ))
        })?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Stream for FileStream {
    fn write(&self, bytes: &[u8]) -> Result<usize> {
        let mut writer = self.writer.lock();
        writer.write_all(bytes)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(bytes.len())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileStream {
    fn drop(&mut self) {
        let writer = self.writer.get_mut();
        let _ = writer.flush();
        let _ = FileExt::unlock(writer.get_ref());
    }
}
