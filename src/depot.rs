//! The on-disk container depot.
//!
//! The depot is a plain directory with one subdirectory per container,
//! named by container id. The pool owns two files inside each entry: the
//! `rootfs-provider` tag written at create time, and the pre-pivot hook
//! script the bind-mount planner appends to. Everything else in an entry is
//! opaque, materialized and torn down by the shell helpers.
//!
//! The child named `tmp` is reserved scratch space and is never treated as
//! a container.

use crate::constants::{DEPOT_TMP_DIR, ROOTFS_PROVIDER_FILE};
use crate::error::Result;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Handle to the depot directory.
#[derive(Debug, Clone)]
pub struct Depot {
    path: PathBuf,
}

impl Depot {
    /// Creates a depot handle over an existing directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The depot directory itself.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The directory belonging to one container.
    pub fn container_path(&self, id: &str) -> PathBuf {
        self.path.join(id)
    }

    /// Records the rootfs provider scheme for a container, creating its
    /// depot directory in the process.
    pub fn write_provider(&self, id: &str, scheme: &str) -> Result<()> {
        let dir = self.container_path(id);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(ROOTFS_PROVIDER_FILE), scheme)?;
        Ok(())
    }

    /// Reads the rootfs provider scheme recorded for a container.
    ///
    /// Returns `None` when the file does not exist; a crash between
    /// directory creation and the provider write leaves exactly that state,
    /// and prune tolerates it by falling back to the default scheme.
    pub fn read_provider(&self, id: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.container_path(id).join(ROOTFS_PROVIDER_FILE)) {
            Ok(scheme) => Ok(Some(scheme)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Enumerates container ids present on disk, in directory-listing order.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();

        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }

            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(name) => {
                    warn!(entry = ?name, "skipping non-utf8 depot entry");
                    continue;
                }
            };

            if name == DEPOT_TMP_DIR {
                continue;
            }

            ids.push(name);
        }

        Ok(ids)
    }
}
