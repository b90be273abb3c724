//! Resource pools.
//!
//! Three independent pools hand out the scarce host resources a container
//! needs: a uid block, a /30 subnet, and TCP ports. Each pool is internally
//! synchronized and FIFO: released tokens go to the tail of the free list,
//! so reuse is maximally delayed.
//!
//! All three contracts share the same shape:
//!
//! - `acquire` returns the next free token, or [`Error::PoolExhausted`]
//!   when the pool is empty.
//! - `release` returns a token and never fails; tokens that are out of
//!   range, misaligned, or already free are silently dropped.
//! - `remove` claims a *specific* token, as restore does when rebuilding
//!   in-memory state from a snapshot; it fails with the pool's `*Taken`
//!   error when the token is not free.
//! - `initial_size` reports the capacity at construction; the pool uses it
//!   only to answer `max_containers`.
//!
//! [`Error::PoolExhausted`]: crate::error::Error::PoolExhausted

mod port;
mod subnet;
mod uid;

pub use port::SequentialPortPool;
pub use subnet::{container_ip, host_ip, CidrSubnetPool};
pub use uid::ContiguousUidPool;

use crate::error::Result;
use ipnetwork::Ipv4Network;

/// Pool of user-id blocks.
pub trait UidPool: Send + Sync {
    /// Acquires the next free uid block, returning its base uid.
    fn acquire(&self) -> Result<u32>;

    /// Returns a uid block to the pool.
    fn release(&self, uid: u32);

    /// Claims a specific uid block.
    fn remove(&self, uid: u32) -> Result<()>;

    /// Number of blocks at construction.
    fn initial_size(&self) -> usize;
}

/// Pool of /30 subnets.
pub trait SubnetPool: Send + Sync {
    /// The CIDR the pool carves subnets from; advertised to `setup.sh` as
    /// the pool network.
    fn network(&self) -> Ipv4Network;

    /// Acquires the next free /30 subnet.
    fn acquire(&self) -> Result<Ipv4Network>;

    /// Returns a subnet to the pool.
    fn release(&self, subnet: Ipv4Network);

    /// Claims a specific subnet.
    fn remove(&self, subnet: Ipv4Network) -> Result<()>;

    /// Number of subnets at construction.
    fn initial_size(&self) -> usize;
}

/// Pool of TCP ports.
pub trait PortPool: Send + Sync {
    /// Acquires the next free port.
    fn acquire(&self) -> Result<u16>;

    /// Returns a port to the pool.
    fn release(&self, port: u16);

    /// Claims a specific port.
    fn remove(&self, port: u16) -> Result<()>;

    /// Number of ports at construction.
    fn initial_size(&self) -> usize;
}
