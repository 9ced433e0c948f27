//! Artifact writing with per-artifact failure isolation.

use log::{error, info};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One artifact could not be produced or written. Other artifacts are unaffected.
#[derive(Error, Debug)]
#[error("Failed to write {artifact} to {}: {source:#}", .path.display())]
pub struct OutputWriteError {
    pub artifact: String,
    pub path: PathBuf,
    pub source: anyhow::Error,
}

/// Writes artifacts into one directory and remembers what happened to each.
#[derive(Debug)]
pub struct OutputWriter {
    directory: PathBuf,
    written: Vec<PathBuf>,
    failures: Vec<OutputWriteError>,
}

impl OutputWriter {
    pub fn new(directory: &Path) -> OutputWriter {
        OutputWriter {
            directory: directory.to_path_buf(),
            written: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Paths written so far, in write order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn failures(&self) -> &[OutputWriteError] {
        &self.failures
    }

    /// File names of the written artifacts, for listing in the report.
    pub fn written_names(&self) -> Vec<String> {
        self.written
            .iter()
            .filter_map(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect()
    }

    /// Render and write one artifact. A failure in `render` or in the write
    /// is logged and recorded; it never propagates.
    pub fn write<F, C>(&mut self, artifact: &str, file_name: &str, render: F) -> bool
    where
        F: FnOnce() -> anyhow::Result<C>,
        C: AsRef<[u8]>,
    {
        let path = self.directory.join(file_name);
        let outcome = render().and_then(|contents| {
            std::fs::create_dir_all(&self.directory)?;
            std::fs::write(&path, contents)?;
            Ok(())
        });
        match outcome {
            Ok(()) => {
                info!("Saved {}: {}", artifact, path.display());
                self.written.push(path);
                true
            }
            Err(source) => {
                let failure = OutputWriteError {
                    artifact: artifact.to_string(),
                    path,
                    source,
                };
                error!("{}", failure);
                self.failures.push(failure);
                false
            }
        }
    }
}
