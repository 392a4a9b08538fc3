//! File input/output for the batch pipeline
//!
//! This module separates file system access from the processing logic:
//! [`InputEnumerator`] finds the images to convert and [`OutputWriter`]
//! owns the output directory, which doubles as the record of what has
//! already been converted.

use crate::error::{ConvertError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Lists the files directly inside the input directory
#[derive(Debug, Clone)]
pub struct InputEnumerator {
    dir: PathBuf,
    pattern: Option<glob::Pattern>,
}

impl InputEnumerator {
    /// Create an enumerator, compiling the optional file name glob
    ///
    /// # Errors
    /// - `InvalidConfig` when the pattern is not a valid glob
    pub fn new<P: Into<PathBuf>>(dir: P, pattern: Option<&str>) -> Result<Self> {
        let pattern = pattern
            .map(|pat| {
                glob::Pattern::new(pat).map_err(|e| {
                    ConvertError::invalid_config(format!("Invalid file pattern '{}': {}", pat, e))
                })
            })
            .transpose()?;

        Ok(Self {
            dir: dir.into(),
            pattern,
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// List candidate input files, sorted by file name
    ///
    /// Sub-directories and other non-regular entries are ignored; the scan
    /// is not recursive.
    ///
    /// # Errors
    /// - The input directory cannot be read
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|e| ConvertError::file_io_error("read input directory", &self.dir, &e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|e| ConvertError::file_io_error("read input directory", &self.dir, &e))?;
            let path = entry.path();

            // Follows symlinks, so a link to a regular file counts as input
            if !path.is_file() {
                debug!(path = %path.display(), "Ignoring non-file entry");
                continue;
            }
            if !self.matches(&path) {
                debug!(path = %path.display(), "Ignoring file not matching pattern");
                continue;
            }
            files.push(path);
        }

        files.sort();
        Ok(files)
    }

    fn matches(&self, path: &Path) -> bool {
        match &self.pattern {
            Some(pattern) => path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name)),
            None => true,
        }
    }
}

/// Writes converted images into the output directory
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Full path for an output file name
    #[must_use]
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Whether an output with this name has already been written
    #[must_use]
    pub fn exists(&self, file_name: &str) -> bool {
        self.path_for(file_name).exists()
    }

    /// Write `data` to `file_name` inside the output directory
    ///
    /// Existing files are overwritten; callers decide beforehand whether a
    /// file should be skipped. The write is not atomic.
    ///
    /// # Errors
    /// - The file cannot be created or written
    pub async fn write(&self, file_name: &str, data: &[u8]) -> Result<PathBuf> {
        let path = self.path_for(file_name);
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| ConvertError::file_io_error("write output file", &path, &e))?;
        debug!(path = %path.display(), bytes = data.len(), "Wrote output");
        Ok(path)
    }
}

/// Read a whole input file into memory
///
/// # Errors
/// - The file cannot be opened or read
pub async fn read_input(path: &Path) -> Result<Vec<u8>> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| ConvertError::file_io_error("read input file", path, &e))?;
    if data.is_empty() {
        warn!(path = %path.display(), "Input file is empty");
    }
    Ok(data)
}
