//! Constants for the container pool.
//!
//! Script names and depot file layout are shared between the pool and the
//! caller-supplied shell helpers; they are defined here once.

// =============================================================================
// Helper Scripts
// =============================================================================

/// One-shot host preparation script, run by `ContainerPool::setup`.
pub const SETUP_SCRIPT: &str = "setup.sh";

/// Container materialization script, run once per create.
pub const CREATE_SCRIPT: &str = "create.sh";

/// Container teardown script, run by destroy and prune.
pub const DESTROY_SCRIPT: &str = "destroy.sh";

// =============================================================================
// Depot Layout
// =============================================================================

/// Per-container file recording the rootfs provider scheme used at create
/// time. An empty file means the default provider.
pub const ROOTFS_PROVIDER_FILE: &str = "rootfs-provider";

/// Reserved depot child that is never treated as a container.
pub const DEPOT_TMP_DIR: &str = "tmp";

/// Hook script executed inside the new namespace before `pivot_root`,
/// relative to the container directory. Bind-mount commands are appended
/// here during create.
pub const PRE_PIVOT_HOOK: &str = "lib/hook-child-before-pivot.sh";

/// Bind-mount destination root inside the container directory.
pub const MOUNT_DIR: &str = "mnt";

/// Location of the materialized rootfs inside the container directory.
/// Container-origin bind-mount sources resolve under this path.
pub const CONTAINER_ROOTFS_DIR: &str = "tmp/rootfs";
