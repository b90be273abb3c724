//! Uid block allocation.

use super::UidPool;
use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Hands out uid blocks from a contiguous range.
///
/// Blocks start at `start + i * block_size` for every block whose base lies
/// inside `[start, start + size)`. A container receives the base uid of its
/// block and owns the whole block; the block size is host policy (how many
/// uids each container's user namespace maps).
pub struct ContiguousUidPool {
    start: u32,
    size: u32,
    block_size: u32,
    initial_size: usize,
    free: Mutex<VecDeque<u32>>,
}

impl ContiguousUidPool {
    /// Creates a pool over `[start, start + size)` in `block_size` units.
    pub fn new(start: u32, size: u32, block_size: u32) -> Self {
        let block_size = block_size.max(1);
        let free: VecDeque<u32> = (start..start.saturating_add(size))
            .step_by(block_size as usize)
            .collect();

        Self {
            start,
            size,
            block_size,
            initial_size: free.len(),
            free: Mutex::new(free),
        }
    }

    fn in_range(&self, uid: u32) -> bool {
        uid >= self.start
            && uid < self.start.saturating_add(self.size)
            && (uid - self.start) % self.block_size == 0
    }
}

impl UidPool for ContiguousUidPool {
    fn acquire(&self) -> Result<u32> {
        self.free
            .lock()
            .expect("uid pool lock poisoned")
            .pop_front()
            .ok_or(Error::PoolExhausted { pool: "uid" })
    }

    fn release(&self, uid: u32) {
        if !self.in_range(uid) {
            return;
        }

        let mut free = self.free.lock().expect("uid pool lock poisoned");
        if !free.contains(&uid) {
            free.push_back(uid);
        }
    }

    fn remove(&self, uid: u32) -> Result<()> {
        let mut free = self.free.lock().expect("uid pool lock poisoned");
        match free.iter().position(|&u| u == uid) {
            Some(idx) => {
                free.remove(idx);
                Ok(())
            }
            None => Err(Error::UidTaken(uid)),
        }
    }

    fn initial_size(&self) -> usize {
        self.initial_size
    }
}
