//! Container creation requests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// A request to create a container.
///
/// Every field is optional; `ContainerSpec::default()` is a valid request
/// that yields a container with a generated id, the default rootfs provider,
/// and no bind mounts.
#[derive(Debug, Clone, Default)]
pub struct ContainerSpec {
    /// Human-friendly alias for the container; defaults to the generated id.
    pub handle: Option<String>,
    /// How long the container may sit idle before the owning backend reaps
    /// it. Defaults to zero (no grace period).
    pub grace_time: Option<Duration>,
    /// Rootfs URL, e.g. `docker:///busybox` or a bare host path. `None`
    /// selects the default provider (empty scheme).
    pub rootfs: Option<String>,
    /// Bind mounts to plumb into the container, applied in order.
    pub bind_mounts: Vec<BindMount>,
    /// Arbitrary key-value properties carried on the container handle.
    pub properties: HashMap<String, String>,
}

/// A declarative bind mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindMount {
    /// Source path, interpreted according to `origin`.
    pub src_path: PathBuf,
    /// Destination path inside the container.
    pub dst_path: PathBuf,
    /// Read-only or read-write.
    pub mode: BindMountMode,
    /// Whether the source is a host path or a path inside the container's
    /// own rootfs.
    pub origin: BindMountOrigin,
}

/// Bind mount access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindMountMode {
    /// Read-only.
    #[default]
    Ro,
    /// Read-write.
    Rw,
}

impl BindMountMode {
    /// The mount option string for the remount command.
    pub fn options(self) -> &'static str {
        match self {
            BindMountMode::Ro => "ro",
            BindMountMode::Rw => "rw",
        }
    }
}

/// Where a bind mount source lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindMountOrigin {
    /// The source is a host path, taken verbatim.
    #[default]
    Host,
    /// The source is relative to the container's materialized rootfs.
    Container,
}
