use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The in-memory buffer for the artifact being patched.
///
/// Loaded once at the start of a run, mutated in place by the applicator,
/// and persisted only when the run coordinator signals success. No other
/// component touches the underlying storage during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: PathBuf,
    text: String,
}

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("failed to load {path}: {source}")]
    Load {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Document {
    /// Read the artifact at `path` whole into memory.
    ///
    /// Fails when the file is unreadable or not valid UTF-8.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, DocumentError> {
        let path = path.into();
        let text = fs::read_to_string(&path).map_err(|source| DocumentError::Load {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path, text })
    }

    /// Build a document from text already in hand, bypassing the filesystem.
    pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Swap in a fully rendered buffer. Mutation routes through the
    /// applicator, which calls this at most once per spec.
    pub(crate) fn set_text(&mut self, text: String) {
        self.text = text;
    }

    /// Persistence gate: write the buffer back to the document's path.
    ///
    /// Stages to a tempfile in the same directory, fsyncs, then renames
    /// over the target, so the on-disk artifact is never partially written.
    pub fn write(&self) -> Result<(), DocumentError> {
        atomic_write(&self.path, self.text.as_bytes()).map_err(|source| DocumentError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Atomic file write: tempfile + fsync + rename.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path has no parent directory",
        )
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
