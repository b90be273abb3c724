//! Disk quota interface.
//!
//! Quota enforcement itself lives in the shell helpers; the pool only needs
//! to tell `setup.sh` where the depot's backing filesystem is mounted and
//! whether quotas are switched on.

use crate::error::Result;
use std::path::PathBuf;

/// Source of the depot quota configuration consumed by `setup.sh`.
pub trait QuotaManager: Send + Sync {
    /// Mount point of the filesystem backing the depot.
    fn mount_point(&self) -> Result<PathBuf>;

    /// Whether disk quotas are enabled on that filesystem.
    fn is_enabled(&self) -> bool;
}

/// Quota configuration for a fixed, quota-capable mount point.
pub struct DiskQuota {
    mount_point: PathBuf,
}

impl DiskQuota {
    /// Creates an enabled quota configuration over `mount_point`.
    pub fn new(mount_point: impl Into<PathBuf>) -> Self {
        Self {
            mount_point: mount_point.into(),
        }
    }
}

impl QuotaManager for DiskQuota {
    fn mount_point(&self) -> Result<PathBuf> {
        Ok(self.mount_point.clone())
    }

    fn is_enabled(&self) -> bool {
        true
    }
}
