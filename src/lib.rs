//! # corral
//!
//! **Allocator and lifecycle manager for a pool of lightweight Linux
//! containers.**
//!
//! Each container is a namespaced process tree with its own root
//! filesystem, user-id range, virtual network, and quota envelope. This
//! crate is the single authority that assigns those scarce host resources,
//! materializes the on-disk container layout, invokes the external shell
//! helpers that perform namespace and cgroup setup, and reclaims everything
//! on teardown.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                           ContainerPool                             │
//! │      create / restore / destroy / prune / setup / max_containers    │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐ ┌──────────────┐ ┌────────────┐ ┌─────────────────┐ │
//! │  │  UidPool   │ │  SubnetPool  │ │  PortPool  │ │ProviderRegistry │ │
//! │  │ uid blocks │ │ /30 subnets  │ │ TCP ports  │ │ scheme → rootfs │ │
//! │  └────────────┘ └──────────────┘ └────────────┘ └─────────────────┘ │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │  ┌───────────────────────────┐  ┌───────────────────────────────┐   │
//! │  │          Depot            │  │         CommandRunner         │   │
//! │  │  <depot>/<id>/… on disk   │  │ setup.sh create.sh destroy.sh │   │
//! │  └───────────────────────────┘  └───────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # All-or-Nothing Creation
//!
//! `create` acquires a uid block, a /30 subnet, a root filesystem, and a
//! depot entry, then runs `create.sh` and appends bind-mount commands to
//! the container's pre-pivot hook. Any failure unwinds every earlier
//! acquisition in reverse order before the error is returned: the caller
//! never sees a half-created container, and no token leaks from a pool.
//! Restore from a snapshot follows the same compensating shape in the
//! other direction (claiming recorded tokens out of the pools).
//!
//! Destroy and prune deliberately do not unwind: they stop at the first
//! error with nothing released, so the world stays consistent for a retry.
//!
//! # Crash Recovery
//!
//! The pool persists exactly one fact per container — the rootfs provider
//! scheme, in `<depot>/<id>/rootfs-provider` — which is all it needs to
//! dispatch teardown for containers orphaned by a crash. `prune` sweeps
//! depot entries not covered by a keep-set; `restore` rebuilds live
//! containers from caller-persisted snapshots.
//!
//! # Example
//!
//! ```rust,ignore
//! use corral::{
//!     CidrSubnetPool, ContainerPool, ContainerSpec, ContiguousUidPool,
//!     DiskQuota, HostCommandRunner, PoolConfig, ProviderRegistry,
//!     SequentialPortPool, StaticRootfsProvider,
//! };
//! use std::sync::Arc;
//!
//! let mut providers = ProviderRegistry::new();
//! providers.register("", Arc::new(StaticRootfsProvider::new("/var/corral/rootfs")));
//!
//! let pool = ContainerPool::new(PoolConfig {
//!     script_dir: "/var/corral/scripts".into(),
//!     depot_path: "/var/corral/depot".into(),
//!     providers,
//!     uid_pool: Arc::new(ContiguousUidPool::new(10000, 256000, 1000)),
//!     subnet_pool: Arc::new(CidrSubnetPool::new("10.254.0.0/22".parse()?)),
//!     port_pool: Arc::new(SequentialPortPool::new(61000, 5000)),
//!     deny_networks: vec![],
//!     allow_networks: vec![],
//!     runner: Arc::new(HostCommandRunner::new()),
//!     quota: Arc::new(DiskQuota::new("/var/corral")),
//! });
//!
//! pool.setup()?;
//! let container = pool.create(ContainerSpec::default())?;
//! pool.destroy(&container)?;
//! ```

mod command;
mod constants;
mod container;
mod depot;
mod error;
mod hooks;
mod pool;
mod pools;
mod quota;
mod rootfs;
mod snapshot;
mod spec;

pub use command::{CommandRunner, CommandSpec, HostCommandRunner};
pub use constants::{
    CONTAINER_ROOTFS_DIR, CREATE_SCRIPT, DEPOT_TMP_DIR, DESTROY_SCRIPT, MOUNT_DIR, PRE_PIVOT_HOOK,
    ROOTFS_PROVIDER_FILE, SETUP_SCRIPT,
};
pub use container::{Container, Resources, State};
pub use depot::Depot;
pub use error::{Error, Result};
pub use pool::{ContainerPool, PoolConfig};
pub use pools::{
    container_ip, host_ip, CidrSubnetPool, ContiguousUidPool, PortPool, SequentialPortPool,
    SubnetPool, UidPool,
};
pub use quota::{DiskQuota, QuotaManager};
pub use rootfs::{ProviderRegistry, RootfsProvider, RootfsUrl, StaticRootfsProvider};
pub use snapshot::{ContainerSnapshot, ResourcesSnapshot};
pub use spec::{BindMount, BindMountMode, BindMountOrigin, ContainerSpec};
