//! Error types for the container pool.

use ipnetwork::Ipv4Network;

/// Result type alias for pool operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while allocating, restoring, or reclaiming
/// containers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // =========================================================================
    // Provider Errors
    // =========================================================================
    /// The rootfs URL names a scheme with no registered provider.
    ///
    /// Returned by `create` for an unrecognized spec URL and by `prune` when
    /// a depot entry's `rootfs-provider` file names an unknown scheme.
    #[error("unknown rootfs provider")]
    UnknownRootfsProvider,

    // =========================================================================
    // Pool Errors
    // =========================================================================
    /// A resource pool has no free tokens left.
    #[error("{pool} pool is exhausted")]
    PoolExhausted { pool: &'static str },

    /// A specific uid was requested but is not free.
    #[error("uid {0} is already acquired")]
    UidTaken(u32),

    /// A specific subnet was requested but is not free.
    #[error("subnet {0} is already acquired")]
    SubnetTaken(Ipv4Network),

    /// A specific port was requested but is not free.
    #[error("port {0} is already acquired")]
    PortTaken(u16),

    // =========================================================================
    // External Command Errors
    // =========================================================================
    /// A helper script or shell command exited non-zero or failed to spawn.
    #[error("command '{program}' failed: {reason}")]
    CommandFailed { program: String, reason: String },

    // =========================================================================
    // Snapshot Errors
    // =========================================================================
    /// A container snapshot could not be decoded.
    #[error("failed to decode container snapshot: {0}")]
    SnapshotDecode(#[from] serde_json::Error),

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Depot or provider filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
