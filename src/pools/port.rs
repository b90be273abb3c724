//! TCP port allocation.

use super::PortPool;
use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Hands out consecutive ports from a configured starting value.
///
/// Ports do not cap container count; they are acquired lazily by the
/// container backend as port mappings are requested, and returned in bulk
/// when the container is destroyed.
pub struct SequentialPortPool {
    start: u16,
    end: u32,
    initial_size: usize,
    free: Mutex<VecDeque<u16>>,
}

impl SequentialPortPool {
    /// Creates a pool of `size` ports starting at `start`, clamped to the
    /// valid port range.
    pub fn new(start: u16, size: u32) -> Self {
        let end = (start as u32 + size).min(u16::MAX as u32 + 1);
        let free: VecDeque<u16> = (start as u32..end).map(|p| p as u16).collect();

        Self {
            start,
            end,
            initial_size: free.len(),
            free: Mutex::new(free),
        }
    }

    fn in_range(&self, port: u16) -> bool {
        port >= self.start && (port as u32) < self.end
    }
}

impl PortPool for SequentialPortPool {
    fn acquire(&self) -> Result<u16> {
        self.free
            .lock()
            .expect("port pool lock poisoned")
            .pop_front()
            .ok_or(Error::PoolExhausted { pool: "port" })
    }

    fn release(&self, port: u16) {
        if !self.in_range(port) {
            return;
        }

        let mut free = self.free.lock().expect("port pool lock poisoned");
        if !free.contains(&port) {
            free.push_back(port);
        }
    }

    fn remove(&self, port: u16) -> Result<()> {
        let mut free = self.free.lock().expect("port pool lock poisoned");
        match free.iter().position(|&p| p == port) {
            Some(idx) => {
                free.remove(idx);
                Ok(())
            }
            None => Err(Error::PortTaken(port)),
        }
    }

    fn initial_size(&self) -> usize {
        self.initial_size
    }
}
