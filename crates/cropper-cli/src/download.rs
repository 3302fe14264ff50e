//! Download trigger that saves exports into a directory.

use std::fs;
use std::path::{Path, PathBuf};

use cropper_core::{BlobHandle, DownloadTrigger, ExportedBlob};
use log::{info, warn};

#[derive(Debug)]
pub struct DirectoryDownload {
    dir: PathBuf,
    last_written: Option<PathBuf>,
}

impl DirectoryDownload {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            last_written: None,
        }
    }

    /// Path of the most recent successful write.
    pub fn last_written(&self) -> Option<&Path> {
        self.last_written.as_deref()
    }

    fn write(&self, blob: &ExportedBlob, filename: &str) -> std::io::Result<PathBuf> {
        // keep only the final component so a filename cannot escape `dir`
        let name = Path::new(filename)
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("cropped"));
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        fs::write(&path, blob.bytes())?;
        Ok(path)
    }
}

impl DownloadTrigger for DirectoryDownload {
    fn trigger(&mut self, handle: &BlobHandle, blob: &ExportedBlob, filename: &str) {
        match self.write(blob, filename) {
            Ok(path) => {
                info!("saved {} to {}", handle, path.display());
                self.last_written = Some(path);
            }
            Err(e) => {
                warn!("could not save {} into {}: {}", filename, self.dir.display(), e);
                self.last_written = None;
            }
        }
    }
}
