//! Recycling arena for search nodes.
//!
//! Nodes are addressed by [`NodeHandle`] (slot index plus generation) instead
//! of references, so parent links survive the arena growing. Released slots
//! go to a free list and are handed out again on the next acquire; nothing is
//! deallocated between plans.

use crate::{GoapError, Result};

/// Handle to a live pool slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Slot<T> {
    value: T,
    generation: u32,
    in_use: bool,
}

#[derive(Debug)]
pub struct NodePool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    limit: usize,
    outstanding: usize,
}

impl<T: Default> NodePool<T> {
    /// Creates a pool handing out at most `limit` live values at once.
    pub fn new(limit: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            limit,
            outstanding: 0,
        }
    }

    /// Takes a slot reset to `T::default()`.
    ///
    /// Fails with [`GoapError::NodePoolExhausted`] when `limit` values are live.
    pub fn acquire(&mut self) -> Result<NodeHandle> {
        if self.outstanding >= self.limit {
            return Err(GoapError::NodePoolExhausted(self.limit));
        }

        let index = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.value = T::default();
                slot.in_use = true;
                index
            }
            None => {
                self.slots.push(Slot {
                    value: T::default(),
                    generation: 0,
                    in_use: true,
                });
                (self.slots.len() - 1) as u32
            }
        };

        self.outstanding += 1;
        Ok(NodeHandle {
            index,
            generation: self.slots[index as usize].generation,
        })
    }

    /// Returns a slot to the pool. Stale or double releases are ignored.
    pub fn release(&mut self, handle: NodeHandle) {
        match self.slots.get_mut(handle.index as usize) {
            Some(slot) if slot.in_use && slot.generation == handle.generation => {
                slot.in_use = false;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(handle.index);
                self.outstanding -= 1;
            }
            _ => log::warn!("Ignoring release of stale node handle {:?}", handle),
        }
    }

    pub fn get(&self, handle: NodeHandle) -> &T {
        let slot = &self.slots[handle.index as usize];
        debug_assert!(slot.in_use && slot.generation == handle.generation);
        &slot.value
    }

    pub fn get_mut(&mut self, handle: NodeHandle) -> &mut T {
        let slot = &mut self.slots[handle.index as usize];
        debug_assert!(slot.in_use && slot.generation == handle.generation);
        &mut slot.value
    }

    /// Number of values acquired and not yet released
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }
}
