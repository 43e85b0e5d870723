//! Scratch directory for intermediate files
//!
//! The workspace lives under the current directory rather than the system
//! temp dir: clang-format looks for `.clang-format` by walking up from each
//! file it formats, and the intermediates have to find the project's one.

use std::path::{Path, PathBuf};

use tempfile::{Builder, TempDir};
use tracing::{info, warn};

use crate::error::LogosFormatError;

/// Prefix of every workspace directory name
pub const WORKSPACE_PREFIX: &str = "logos-format-tmp-";

/// A uniquely-named directory owning all intermediate files of one run
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh workspace directory inside `base_dir`
    pub fn create(base_dir: &Path) -> Result<Self, LogosFormatError> {
        let dir = Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(base_dir)
            .map_err(|source| LogosFormatError::Workspace {
                path: base_dir.to_path_buf(),
                source,
            })?;
        info!("Created workspace '{}'", dir.path().display());
        Ok(Workspace { dir })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create an empty file named `<prefix>XXXXXX<suffix>` inside the workspace
    ///
    /// The file outlives this call; it goes away with the workspace.
    pub fn new_temp_file(&self, prefix: &str, suffix: &str) -> Result<PathBuf, LogosFormatError> {
        let file = Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(self.path())
            .map_err(|source| LogosFormatError::Workspace {
                path: self.path().to_path_buf(),
                source,
            })?;
        let (_, path) = file.keep().map_err(|e| LogosFormatError::Workspace {
            path: self.path().to_path_buf(),
            source: e.error,
        })?;
        Ok(path)
    }

    /// Delete the workspace unless `retain` is set
    ///
    /// Returns the directory path when it was kept. Failing to delete is
    /// logged and otherwise ignored.
    pub fn release(self, retain: bool) -> Option<PathBuf> {
        if retain {
            let path = self.dir.keep();
            info!("Keeping workspace '{}'", path.display());
            return Some(path);
        }
        let path = self.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => info!("Removed workspace '{}'", path.display()),
            Err(e) => warn!("Failed to remove workspace '{}': {e}", path.display()),
        }
        None
    }
}
