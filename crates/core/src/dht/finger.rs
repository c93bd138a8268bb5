//! Finger table of a Chord node.
use serde::Deserialize;
use serde::Serialize;

use super::did::between;
use super::did::Did;
use super::peer::Addr;
use super::peer::NodeRef;

/// Routing cache with one slot per ring bit. Slot i, when filled, points
/// at a node responsible for (owner + 2^i) mod 2^160. Slots fill lazily,
/// one per stabilization tick, and are purged when a peer dies.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FingerTable {
    did: Did,
    size: usize,
    finger: Vec<Option<NodeRef>>,
    next_to_fix: usize,
}

impl FingerTable {
    /// builder
    pub fn new(did: Did, size: usize) -> Self {
        Self {
            did,
            size,
            finger: vec![None; size],
            next_to_fix: 0,
        }
    }

    /// is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get first filled entry from the table.
    pub fn first(&self) -> Option<NodeRef> {
        self.finger.iter().flatten().next().copied()
    }

    /// getter
    pub fn get(&self, index: usize) -> Option<NodeRef> {
        if index >= self.finger.len() {
            return None;
        }
        self.finger[index]
    }

    /// setter
    pub fn set(&mut self, index: usize, node: NodeRef) {
        tracing::debug!("set finger table index: {} node: {}", index, node);
        if index >= self.finger.len() {
            tracing::error!("set finger index out of range, index: {}", index);
            return;
        }
        if node.did == self.did {
            tracing::info!("set finger table with own did, ignore it");
            return;
        }
        self.finger[index] = Some(node);
    }

    /// Drop every entry referring to `did`.
    pub fn remove(&mut self, did: Did) {
        for entry in self.finger.iter_mut() {
            if entry.map(|n| n.did) == Some(did) {
                *entry = None;
            }
        }
    }

    /// Drop every entry delivered through `addr`.
    pub fn remove_addr(&mut self, addr: Addr) {
        for entry in self.finger.iter_mut() {
            if entry.map(|n| n.addr) == Some(addr) {
                *entry = None;
            }
        }
    }

    /// Check whether some node occupies any slot.
    pub fn contains(&self, did: Did) -> bool {
        self.finger.iter().flatten().any(|n| n.did == did)
    }

    /// Highest finger strictly preceding `key` on the arc walked clockwise
    /// from the owner. The scan starts at the widest slot so the first hit
    /// overshoots the least.
    pub fn closest_preceding(&self, key: Did) -> Option<NodeRef> {
        for entry in self.finger.iter().rev() {
            if let Some(node) = entry {
                if between(self.did, node.did, key) {
                    return Some(*node);
                }
            }
        }
        None
    }

    /// Advance the refresh cursor and return the slot index to fix next.
    pub fn advance(&mut self) -> usize {
        self.next_to_fix = (self.next_to_fix + 1) % self.size;
        self.next_to_fix
    }

    /// get length of filled slots
    pub fn len(&self) -> usize {
        self.finger.iter().flatten().count()
    }

    /// get finger list
    pub fn list(&self) -> &Vec<Option<NodeRef>> {
        &self.finger
    }
}
