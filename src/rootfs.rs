//! Root filesystem providers.
//!
//! A provider materializes a root filesystem for a container and reclaims
//! it on teardown. Providers are selected by the scheme of the spec's
//! rootfs URL; the empty scheme is the default used when no URL is given.
//! The scheme chosen at create time is persisted in the depot
//! (`rootfs-provider`) so destroy and prune can dispatch to the same
//! backend, including for containers orphaned by a crash.

use crate::error::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

// =============================================================================
// Rootfs URL
// =============================================================================

/// A parsed rootfs locator.
///
/// Recognizes `scheme://host/path`; anything else is a bare host path with
/// the empty scheme. Parsing never fails — only an unregistered scheme is
/// an error, raised by the pool at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RootfsUrl {
    /// URL scheme; empty for bare paths and empty specs.
    pub scheme: String,
    /// Host component; often empty (`fake:///x` has no host).
    pub host: String,
    /// Path component, provider-specific.
    pub path: String,
}

impl RootfsUrl {
    /// Parses a rootfs locator from a spec string.
    pub fn parse(s: &str) -> Self {
        match s.split_once("://") {
            Some((scheme, rest)) => {
                let (host, path) = match rest.find('/') {
                    Some(idx) => (&rest[..idx], &rest[idx..]),
                    None => (rest, ""),
                };
                Self {
                    scheme: scheme.to_string(),
                    host: host.to_string(),
                    path: path.to_string(),
                }
            }
            None => Self {
                scheme: String::new(),
                host: String::new(),
                path: s.to_string(),
            },
        }
    }
}

impl std::fmt::Display for RootfsUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.scheme.is_empty() {
            f.write_str(&self.path)
        } else {
            write!(f, "{}://{}{}", self.scheme, self.host, self.path)
        }
    }
}

// =============================================================================
// Provider Contract
// =============================================================================

/// Backend that materializes root filesystems.
///
/// Implementations must tolerate concurrent `provide`/`clean_up` calls for
/// distinct container ids, and `clean_up` must be idempotent: prune may ask
/// for a container whose filesystem was never fully materialized.
pub trait RootfsProvider: Send + Sync {
    /// Materializes a root filesystem for the container and returns the
    /// absolute path to bind-mount into it.
    fn provide(&self, id: &str, url: &RootfsUrl) -> Result<PathBuf>;

    /// Reclaims whatever `provide` created for the container.
    fn clean_up(&self, id: &str) -> Result<()>;
}

// =============================================================================
// Registry
// =============================================================================

/// Scheme-keyed provider dispatch table.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn RootfsProvider>>,
}

impl ProviderRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a provider for a scheme. The empty scheme is the default
    /// provider. A second registration for the same scheme replaces the
    /// first.
    pub fn register(&mut self, scheme: impl Into<String>, provider: Arc<dyn RootfsProvider>) {
        self.providers.insert(scheme.into(), provider);
    }

    /// Looks up the provider for a scheme.
    pub fn get(&self, scheme: &str) -> Option<Arc<dyn RootfsProvider>> {
        self.providers.get(scheme).cloned()
    }
}

// =============================================================================
// Static Provider
// =============================================================================

/// Provider that hands out a pre-materialized host directory.
///
/// Suitable as the default-scheme provider when every container starts from
/// one read-only base image that `create.sh` copies or overlays. A bare
/// path in the rootfs URL overrides the configured base. Cleanup is a no-op
/// since nothing is materialized per container.
pub struct StaticRootfsProvider {
    base: PathBuf,
}

impl StaticRootfsProvider {
    /// Creates a provider serving the given base directory.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl RootfsProvider for StaticRootfsProvider {
    fn provide(&self, _id: &str, url: &RootfsUrl) -> Result<PathBuf> {
        if url.path.is_empty() {
            Ok(self.base.clone())
        } else {
            Ok(PathBuf::from(&url.path))
        }
    }

    fn clean_up(&self, _id: &str) -> Result<()> {
        Ok(())
    }
}
