use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{StarMapError, StarMapResult};

use super::ObjectUrl;

/// Everything a sink needs to save one artifact.
#[derive(Debug, Clone, Copy)]
pub struct DownloadRequest<'a> {
    pub url: &'a ObjectUrl,
    pub filename: &'a str,
    pub mime_type: &'a str,
    pub bytes: &'a [u8],
}

/// Destination of user-triggered downloads.
pub trait DownloadSink {
    fn save(&mut self, request: DownloadRequest<'_>) -> StarMapResult<()>;
}

/// Writes downloads into a directory.
#[derive(Debug, Clone)]
pub struct FileSystemSink {
    directory: PathBuf,
    written: Vec<PathBuf>,
}

impl FileSystemSink {
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            written: Vec::new(),
        }
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Paths written so far, oldest first.
    #[must_use]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl DownloadSink for FileSystemSink {
    fn save(&mut self, request: DownloadRequest<'_>) -> StarMapResult<()> {
        validate_filename(request.filename)?;
        let path = self.directory.join(request.filename);
        std::fs::write(&path, request.bytes)?;
        debug!(path = %path.display(), bytes = request.bytes.len(), "artifact written");
        self.written.push(path);
        Ok(())
    }
}

/// Rejects names that would escape the target directory.
pub fn validate_filename(filename: &str) -> StarMapResult<()> {
    if filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(['/', '\\', '\0'])
    {
        return Err(StarMapError::InvalidFilename(filename.to_owned()));
    }
    Ok(())
}
