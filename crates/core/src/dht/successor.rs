//! Successor list of a Chord node.
use serde::Deserialize;
use serde::Serialize;

use super::did::Did;
use super::peer::Addr;
use super::peer::NodeRef;

/// Ordered cache of the next nodes clockwise on the ring. The head is the
/// node's successor; the tail exists so a dead successor can be skipped
/// without falling off the ring. Entries are kept sorted by clockwise
/// distance from the owner and capped at a small fixed length.
///
/// An empty list means the node is (or believes it is) alone, in which
/// case it is its own successor.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SuccessorList {
    me: NodeRef,
    max: usize,
    succs: Vec<NodeRef>,
}

impl SuccessorList {
    /// builder
    pub fn new(me: NodeRef, max: usize) -> Self {
        Self {
            me,
            max,
            succs: vec![],
        }
    }

    /// The current successor: the list head, or the owner itself when the
    /// list is empty.
    pub fn successor(&self) -> NodeRef {
        *self.succs.first().unwrap_or(&self.me)
    }

    /// is empty
    pub fn is_empty(&self) -> bool {
        self.succs.is_empty()
    }

    /// is full
    pub fn is_full(&self) -> bool {
        self.succs.len() >= self.max
    }

    /// get length
    pub fn len(&self) -> usize {
        self.succs.len()
    }

    /// get the whole list
    pub fn list(&self) -> &[NodeRef] {
        &self.succs
    }

    /// Check membership by id.
    pub fn contains(&self, did: Did) -> bool {
        self.succs.iter().any(|n| n.did == did)
    }

    /// Offer a node for the list. It is inserted in clockwise order and
    /// dropped again if it lands past the cap. Self and known entries are
    /// ignored. Returns whether the node was kept.
    pub fn update(&mut self, node: NodeRef) -> bool {
        if node.did == self.me.did || self.contains(node.did) {
            return false;
        }
        self.succs.push(node);
        let me = self.me.did;
        self.succs.sort_by_key(|n| n.did - me);
        self.succs.truncate(self.max);
        self.contains(node.did)
    }

    /// Rebuild the list from a fresh topology observation: the confirmed
    /// successor plus the successors it reported, in order. Walking past
    /// the owner means the ring has wrapped, so the tail is cut there.
    /// The previous content is discarded entirely.
    pub fn refresh(&mut self, head: NodeRef, tail: &[NodeRef]) {
        self.succs.clear();
        if head.did == self.me.did {
            return;
        }
        self.succs.push(head);
        for node in tail {
            if node.did == self.me.did {
                break;
            }
            if self.is_full() {
                break;
            }
            if !self.contains(node.did) {
                self.succs.push(*node);
            }
        }
    }

    /// Drop a node by id.
    pub fn remove(&mut self, did: Did) {
        self.succs.retain(|n| n.did != did);
    }

    /// Drop a node by transport address.
    pub fn remove_addr(&mut self, addr: Addr) {
        self.succs.retain(|n| n.addr != addr);
    }
}
