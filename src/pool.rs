//! The container pool lifecycle controller.
//!
//! `ContainerPool` is the sole authority for the host's container
//! resources. Creating a container is a pipeline of acquisitions — uid
//! block, /30 subnet, root filesystem, depot entry, namespace setup via
//! `create.sh` — and every stage that can fail unwinds whatever the earlier
//! stages acquired, in reverse order, before the error reaches the caller:
//!
//! ```text
//!   acquire uid ── acquire subnet ── provide rootfs ── write depot entry
//!        │               │                │                   │
//!        ▼               ▼                ▼                   ▼
//!   release uid ◀── release subnet ◀── clean up ◀──────── destroy.sh
//!                      (unwound newest-first on any failure)
//! ```
//!
//! The pool either returns a [`Container`] owning all of its resources, or
//! an error with everything released and no depot entry left behind.
//!
//! Restore rebuilds a container from a snapshot by removing its recorded
//! tokens from the pools, with the same compensating shape. Destroy and
//! prune run the other direction and deliberately do *not* unwind: they
//! stop at the first error with nothing released, so the operator can
//! retry.

use crate::command::{CommandRunner, CommandSpec};
use crate::constants::{CREATE_SCRIPT, DESTROY_SCRIPT, SETUP_SCRIPT};
use crate::container::{Container, Resources};
use crate::depot::Depot;
use crate::error::{Error, Result};
use crate::hooks;
use crate::pools::{container_ip, host_ip, PortPool, SubnetPool, UidPool};
use crate::quota::QuotaManager;
use crate::rootfs::{ProviderRegistry, RootfsUrl};
use crate::snapshot::ContainerSnapshot;
use crate::spec::ContainerSpec;
use std::collections::HashSet;
use std::env;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

// =============================================================================
// Configuration
// =============================================================================

/// Everything a pool needs at construction.
pub struct PoolConfig {
    /// Directory holding `setup.sh`, `create.sh`, and `destroy.sh`.
    pub script_dir: PathBuf,
    /// Depot directory; one subdirectory per container.
    pub depot_path: PathBuf,
    /// Rootfs providers keyed by URL scheme; `""` is the default.
    pub providers: ProviderRegistry,
    /// Uid block pool.
    pub uid_pool: Arc<dyn UidPool>,
    /// /30 subnet pool.
    pub subnet_pool: Arc<dyn SubnetPool>,
    /// Port pool; drawn on by the container backend, drained by destroy.
    pub port_pool: Arc<dyn PortPool>,
    /// CIDRs containers may not reach, passed to `setup.sh`.
    pub deny_networks: Vec<String>,
    /// Exceptions to the deny list.
    pub allow_networks: Vec<String>,
    /// Executor for the shell helpers.
    pub runner: Arc<dyn CommandRunner>,
    /// Depot quota configuration for `setup.sh`.
    pub quota: Arc<dyn QuotaManager>,
}

// =============================================================================
// Pool
// =============================================================================

/// Allocator and lifecycle manager for a fleet of containers on one host.
///
/// All operations are safe to call concurrently: the resource pools are
/// internally synchronized, and per-container operations touch disjoint
/// depot subdirectories and disjoint tokens. The pool holds no other
/// cross-operation state and spawns no background work; external helpers
/// run synchronously on the caller's thread.
pub struct ContainerPool {
    script_dir: PathBuf,
    depot: Depot,
    providers: ProviderRegistry,
    uid_pool: Arc<dyn UidPool>,
    subnet_pool: Arc<dyn SubnetPool>,
    port_pool: Arc<dyn PortPool>,
    deny_networks: Vec<String>,
    allow_networks: Vec<String>,
    runner: Arc<dyn CommandRunner>,
    quota: Arc<dyn QuotaManager>,
}

impl ContainerPool {
    /// Creates a pool from its configuration.
    pub fn new(config: PoolConfig) -> Self {
        Self {
            script_dir: config.script_dir,
            depot: Depot::new(config.depot_path),
            providers: config.providers,
            uid_pool: config.uid_pool,
            subnet_pool: config.subnet_pool,
            port_pool: config.port_pool,
            deny_networks: config.deny_networks,
            allow_networks: config.allow_networks,
            runner: config.runner,
            quota: config.quota,
        }
    }

    /// The depot backing this pool.
    pub fn depot(&self) -> &Depot {
        &self.depot
    }

    /// Upper bound on simultaneously live containers: the smaller of the
    /// uid and subnet pool capacities. Ports do not cap containers.
    pub fn max_containers(&self) -> usize {
        self.uid_pool
            .initial_size()
            .min(self.subnet_pool.initial_size())
    }

    /// One-shot host preparation; runs `setup.sh` with the pool's network
    /// and quota configuration. Any non-zero exit is surfaced verbatim.
    pub fn setup(&self) -> Result<()> {
        let mount_point = self.quota.mount_point()?;

        let spec = CommandSpec::new(self.script(SETUP_SCRIPT), Vec::<String>::new()).with_env([
            ("POOL_NETWORK", self.subnet_pool.network().to_string()),
            ("DENY_NETWORKS", self.deny_networks.join(" ")),
            ("ALLOW_NETWORKS", self.allow_networks.join(" ")),
            (
                "CONTAINER_DEPOT_PATH",
                self.depot.path().display().to_string(),
            ),
            (
                "CONTAINER_DEPOT_MOUNT_POINT_PATH",
                mount_point.display().to_string(),
            ),
            ("DISK_QUOTA_ENABLED", self.quota.is_enabled().to_string()),
            ("PATH", inherited_path()),
        ]);

        self.runner.run(&spec)
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Creates a container.
    ///
    /// Either returns a container owning a uid block, a /30 subnet, a
    /// materialized rootfs, and a depot entry — or an error with all of
    /// them released and the depot entry torn down.
    pub fn create(&self, spec: ContainerSpec) -> Result<Container> {
        let id = generate_id();
        debug!(%id, "creating container");

        let mut unwind = Unwind::new();
        match self.create_stages(&id, spec, &mut unwind) {
            Ok(container) => {
                info!(
                    %id,
                    handle = container.handle(),
                    uid = container.resources().uid(),
                    subnet = %container.resources().subnet(),
                    "container created"
                );
                Ok(container)
            }
            Err(e) => {
                unwind.fire();
                Err(e)
            }
        }
    }

    fn create_stages(
        &self,
        id: &str,
        spec: ContainerSpec,
        unwind: &mut Unwind,
    ) -> Result<Container> {
        let uid = self.uid_pool.acquire()?;
        {
            let pool = Arc::clone(&self.uid_pool);
            unwind.push(move || pool.release(uid));
        }

        let subnet = self.subnet_pool.acquire()?;
        {
            let pool = Arc::clone(&self.subnet_pool);
            unwind.push(move || pool.release(subnet));
        }

        let url = RootfsUrl::parse(spec.rootfs.as_deref().unwrap_or(""));
        let provider = self
            .providers
            .get(&url.scheme)
            .ok_or(Error::UnknownRootfsProvider)?;

        let rootfs_path = provider.provide(id, &url)?;
        {
            let provider = Arc::clone(&provider);
            let id = id.to_string();
            unwind.push(move || {
                if let Err(e) = provider.clean_up(&id) {
                    warn!(%id, error = %e, "rootfs cleanup failed during unwind");
                }
            });
        }

        let container_path = self.depot.container_path(id);
        self.depot.write_provider(id, &url.scheme)?;
        {
            // From here the depot entry exists; destroy.sh owns its teardown.
            let runner = Arc::clone(&self.runner);
            let destroy = CommandSpec::new(
                self.script(DESTROY_SCRIPT),
                [container_path.display().to_string()],
            );
            let id = id.to_string();
            unwind.push(move || {
                if let Err(e) = runner.run(&destroy) {
                    warn!(%id, error = %e, "destroy script failed during unwind");
                }
            });
        }

        let create = CommandSpec::new(
            self.script(CREATE_SCRIPT),
            [container_path.display().to_string()],
        )
        .with_env([
            ("id", id.to_string()),
            ("rootfs_path", rootfs_path.display().to_string()),
            ("user_uid", uid.to_string()),
            ("network_host_ip", host_ip(subnet).to_string()),
            ("network_container_ip", container_ip(subnet).to_string()),
            ("PATH", inherited_path()),
        ]);
        self.runner.run(&create)?;

        hooks::append_bind_mounts(self.runner.as_ref(), &container_path, &spec.bind_mounts)?;

        let handle = spec.handle.unwrap_or_else(|| id.to_string());
        Ok(Container::new(
            id.to_string(),
            handle,
            spec.grace_time.unwrap_or_default(),
            spec.properties,
            Resources::new(uid, subnet),
        ))
    }

    // =========================================================================
    // Restore
    // =========================================================================

    /// Rebuilds a container from a snapshot written by a previous process,
    /// claiming its recorded uid, subnet, and ports out of the pools.
    ///
    /// A snapshot that fails to decode has no side effects. A pool that
    /// refuses a token triggers the compensating unwind: everything removed
    /// so far is released again.
    pub fn restore(&self, snapshot: impl Read) -> Result<Container> {
        let snapshot = ContainerSnapshot::read_from(snapshot)?;
        debug!(id = %snapshot.id, "restoring container");

        let mut unwind = Unwind::new();
        match self.restore_stages(snapshot, &mut unwind) {
            Ok(container) => {
                info!(id = container.id(), "container restored");
                Ok(container)
            }
            Err(e) => {
                unwind.fire();
                Err(e)
            }
        }
    }

    fn restore_stages(
        &self,
        snapshot: ContainerSnapshot,
        unwind: &mut Unwind,
    ) -> Result<Container> {
        let uid = snapshot.resources.uid;
        let subnet = snapshot.resources.network;
        let ports = snapshot.resources.ports.clone();

        self.uid_pool.remove(uid)?;
        {
            let pool = Arc::clone(&self.uid_pool);
            unwind.push(move || pool.release(uid));
        }

        self.subnet_pool.remove(subnet)?;
        {
            let pool = Arc::clone(&self.subnet_pool);
            unwind.push(move || pool.release(subnet));
        }

        {
            // The whole recorded list; release drops tokens a failed loop
            // never removed.
            let pool = Arc::clone(&self.port_pool);
            let ports = ports.clone();
            unwind.push(move || {
                for port in ports {
                    pool.release(port);
                }
            });
        }
        for &port in &ports {
            self.port_pool.remove(port)?;
        }

        Ok(Container::from_snapshot(snapshot))
    }

    // =========================================================================
    // Destroy
    // =========================================================================

    /// Destroys a container and releases its resources.
    ///
    /// Teardown runs front-to-back with no unwind: a failure from
    /// `destroy.sh` or the rootfs provider returns with *nothing* released,
    /// leaving a consistent world the operator can retry against.
    pub fn destroy(&self, container: &Container) -> Result<()> {
        let id = container.id();
        debug!(id, "destroying container");

        let container_path = self.depot.container_path(id);
        self.runner.run(&CommandSpec::new(
            self.script(DESTROY_SCRIPT),
            [container_path.display().to_string()],
        ))?;

        if let Some(scheme) = self.depot.read_provider(id)? {
            let provider = self
                .providers
                .get(&scheme)
                .ok_or(Error::UnknownRootfsProvider)?;
            provider.clean_up(id)?;
        }

        let resources = container.resources();
        for port in resources.ports() {
            self.port_pool.release(port);
        }
        self.uid_pool.release(resources.uid());
        self.subnet_pool.release(resources.subnet());

        info!(id, "container destroyed");
        Ok(())
    }

    // =========================================================================
    // Prune
    // =========================================================================

    /// Reclaims on-disk remnants of containers not in `keep`.
    ///
    /// Prune only touches the depot and the rootfs providers, never the
    /// resource pools: an orphan's tokens are out of the pools only if the
    /// caller restored it first, and a never-restored orphan's tokens were
    /// lost with the previous process. The first error aborts the sweep.
    pub fn prune(&self, keep: &HashSet<String>) -> Result<()> {
        for id in self.depot.list()? {
            if keep.contains(&id) {
                continue;
            }

            debug!(%id, "pruning container");
            self.runner.run(&CommandSpec::new(
                self.script(DESTROY_SCRIPT),
                [self.depot.container_path(&id).display().to_string()],
            ))?;

            let scheme = self.depot.read_provider(&id)?.unwrap_or_default();
            let provider = self
                .providers
                .get(&scheme)
                .ok_or(Error::UnknownRootfsProvider)?;
            provider.clean_up(&id)?;
        }

        Ok(())
    }

    fn script(&self, name: &str) -> String {
        self.script_dir.join(name).display().to_string()
    }
}

// =============================================================================
// Unwind
// =============================================================================

/// Reverse-order compensation stack.
///
/// Every successful acquisition pushes a releaser; on failure the stack is
/// drained newest-first. On success it is simply dropped, un-fired.
/// Releaser failures are logged by the releasers themselves and never mask
/// the primary error.
struct Unwind {
    releasers: Vec<Box<dyn FnOnce() + Send>>,
}

impl Unwind {
    fn new() -> Self {
        Self {
            releasers: Vec::new(),
        }
    }

    fn push(&mut self, releaser: impl FnOnce() + Send + 'static) {
        self.releasers.push(Box::new(releaser));
    }

    fn fire(mut self) {
        while let Some(releaser) = self.releasers.pop() {
            releaser();
        }
    }
}

/// Opaque container id: hyphen-free UUIDv4, unique per process and a legal
/// directory name.
fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn inherited_path() -> String {
    env::var("PATH").unwrap_or_default()
}
