//! /30 subnet allocation.

use super::SubnetPool;
use crate::error::{Error, Result};
use ipnetwork::Ipv4Network;
use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::sync::Mutex;

/// The host's address inside a container's /30 subnet.
pub fn host_ip(subnet: Ipv4Network) -> Ipv4Addr {
    subnet.nth(1).expect("a /30 subnet has four addresses")
}

/// The container's address inside its /30 subnet.
pub fn container_ip(subnet: Ipv4Network) -> Ipv4Addr {
    subnet.nth(2).expect("a /30 subnet has four addresses")
}

/// Hands out /30 subnets carved from a configured CIDR.
///
/// Each container gets a 4-address block: network address, host side
/// (`.1`), container side (`.2`), broadcast. A CIDR narrower than /30
/// yields an empty pool.
pub struct CidrSubnetPool {
    network: Ipv4Network,
    initial_size: usize,
    free: Mutex<VecDeque<Ipv4Network>>,
}

impl CidrSubnetPool {
    /// Creates a pool over every /30 inside `network`, in address order.
    pub fn new(network: Ipv4Network) -> Self {
        let base = u32::from(network.network());
        let count = if network.prefix() <= 30 {
            1u32 << (30 - network.prefix())
        } else {
            0
        };

        let free: VecDeque<Ipv4Network> = (0..count)
            .map(|i| {
                Ipv4Network::new(Ipv4Addr::from(base + i * 4), 30)
                    .expect("prefix 30 is a valid prefix")
            })
            .collect();

        Self {
            network,
            initial_size: free.len(),
            free: Mutex::new(free),
        }
    }

    fn in_range(&self, subnet: Ipv4Network) -> bool {
        let base = u32::from(self.network.network());
        let addr = u32::from(subnet.network());
        subnet.prefix() == 30
            && self.network.contains(subnet.network())
            && addr.wrapping_sub(base) % 4 == 0
    }
}

impl SubnetPool for CidrSubnetPool {
    fn network(&self) -> Ipv4Network {
        self.network
    }

    fn acquire(&self) -> Result<Ipv4Network> {
        self.free
            .lock()
            .expect("subnet pool lock poisoned")
            .pop_front()
            .ok_or(Error::PoolExhausted { pool: "subnet" })
    }

    fn release(&self, subnet: Ipv4Network) {
        if !self.in_range(subnet) {
            return;
        }

        // Canonical form, in case the caller's token carries host bits.
        let subnet =
            Ipv4Network::new(subnet.network(), 30).expect("prefix 30 is a valid prefix");

        let mut free = self.free.lock().expect("subnet pool lock poisoned");
        if !free.contains(&subnet) {
            free.push_back(subnet);
        }
    }

    fn remove(&self, subnet: Ipv4Network) -> Result<()> {
        let mut free = self.free.lock().expect("subnet pool lock poisoned");
        match free.iter().position(|&s| s == subnet) {
            Some(idx) => {
                free.remove(idx);
                Ok(())
            }
            None => Err(Error::SubnetTaken(subnet)),
        }
    }

    fn initial_size(&self) -> usize {
        self.initial_size
    }
}
