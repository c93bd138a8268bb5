//! Chord algorithm implement.
use serde::Deserialize;
use serde::Serialize;

use super::did::between;
use super::did::Did;
use super::finger::FingerTable;
use super::peer::Addr;
use super::peer::NodeRef;
use super::successor::SuccessorList;
use super::types::Chord;
use super::types::ChordStore;
use crate::consts::RING_BITS;
use crate::storage::MemStore;

/// NodeRing is the per-node state of the Chord protocol: the node's own
/// position, its neighborhood pointers, the finger routing cache and the
/// local slice of the key-value mapping.
///
/// The state is owned by exactly one actor and mutated only from its
/// message handler, so none of it is wrapped in locks. Every operation
/// is a local state transition that may additionally return a
/// [RingAction] describing work that has to continue on another node.
#[derive(Clone, Debug)]
pub struct NodeRing {
    me: NodeRef,
    predecessor: Option<NodeRef>,
    successors: SuccessorList,
    finger: FingerTable,
    store: MemStore,
}

/// `NodeRing` uses this to describe the outcome of an operation. Sometimes
/// it's a direct result, sometimes an instruction to continue remotely.
#[derive(Clone, Debug, PartialEq)]
pub enum RingAction {
    /// Nothing left to do, the whole manipulation was local.
    None,
    /// The successor of the queried key is known.
    Found(NodeRef),
    /// A key-value operation resolved against the local store.
    LocalValue {
        /// The queried key.
        key: Did,
        /// The stored value, if any.
        value: Option<String>,
    },
    /// Ask another node to continue the operation.
    Remote(NodeRef, RemoteAction),
}

/// The remote half of a [RingAction::Remote]: what the named node is
/// being asked to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoteAction {
    /// Continue resolving the successor of a key.
    FindSuccessor(Did),
    /// Continue resolving the successor of a finger start; the slot index
    /// rides along so the eventual report lands in the right entry.
    FindSuccessorForFix {
        /// The finger start being resolved.
        key: Did,
        /// The finger slot to patch with the answer.
        slot: usize,
    },
    /// Ask the node for its predecessor and successor list.
    QueryTopoInfo,
    /// Tell the node we believe we are its predecessor.
    Notify,
    /// Hand a store operation to the next hop.
    StoreValue {
        /// The key being stored.
        key: Did,
        /// The value being stored.
        value: String,
    },
    /// Hand a fetch operation to the next hop.
    FetchValue {
        /// The key being read.
        key: Did,
    },
    /// Probe a node for liveness. Delivery failure is the signal; no
    /// reply is expected.
    Ping,
}

/// What a node reports about its own neighborhood when queried during
/// stabilization.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TopoInfo {
    /// The reporting node's predecessor, if it has one.
    pub predecessor: Option<NodeRef>,
    /// The reporting node's successor list, nearest first.
    pub successors: Vec<NodeRef>,
}

/// Where a key-value operation goes from here.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Route {
    /// This node's arc covers the key.
    Local,
    /// The operation must travel on.
    Forward(NodeRef),
}

impl NodeRing {
    /// Create the state of a fresh node. Until it joins a ring it is its
    /// own successor and has no predecessor.
    pub fn new(me: NodeRef, succ_list_len: usize) -> Self {
        Self {
            me,
            predecessor: None,
            successors: SuccessorList::new(me, succ_list_len),
            finger: FingerTable::new(me.did, RING_BITS),
            store: MemStore::new(),
        }
    }

    /// This node's own reference.
    pub fn me(&self) -> NodeRef {
        self.me
    }

    /// The current predecessor, if known.
    pub fn predecessor(&self) -> Option<NodeRef> {
        self.predecessor
    }

    /// The current successor. A lone node is its own successor.
    pub fn successor(&self) -> NodeRef {
        self.successors.successor()
    }

    /// The successor list, nearest first.
    pub fn successor_list(&self) -> &[NodeRef] {
        self.successors.list()
    }

    /// The finger table.
    pub fn finger(&self) -> &FingerTable {
        &self.finger
    }

    /// The local key-value store.
    pub fn store(&self) -> &MemStore {
        &self.store
    }

    /// Snapshot of this node's neighborhood for a topology query.
    pub fn topo_info(&self) -> TopoInfo {
        TopoInfo {
            predecessor: self.predecessor,
            successors: self.successors.list().to_vec(),
        }
    }

    /// True when this node's arc (predecessor, self] covers `key`. A node
    /// that knows no other ring member owns every key.
    pub fn is_responsible(&self, key: Did) -> bool {
        match self.predecessor {
            Some(p) => between(p.did, key, self.me.did),
            None => self.successors.is_empty(),
        }
    }

    /// Adopt a successor discovered outside of stabilization, e.g. from
    /// a join reply.
    pub fn adopt_successor(&mut self, node: NodeRef) {
        self.successors.update(node);
    }

    /// Record the answer to a finger refresh query. The answering node is
    /// also a successor candidate; small rings converge faster for it.
    pub fn finger_learned(&mut self, slot: usize, node: NodeRef) {
        self.finger.set(slot, node);
        self.successors.update(node);
    }

    /// A peer stopped answering: purge it everywhere. When it was the
    /// successor, the next list entry takes over; an exhausted list
    /// degrades this node to a singleton until some neighbor shows up
    /// again. The promoted entry is reconciled with on the next tick, not
    /// here, so a neighborhood still pointing at the corpse cannot feed
    /// it back to us within the same round.
    pub fn peer_failed(&mut self, addr: Addr) {
        let was_successor = !self.successors.is_empty() && self.successor().addr == addr;

        if self.predecessor.map(|p| p.addr) == Some(addr) {
            self.predecessor = None;
        }
        self.successors.remove_addr(addr);
        self.finger.remove_addr(addr);

        if !was_successor {
            return;
        }
        if self.successors.is_empty() {
            tracing::warn!(
                "{}: successor list exhausted, degrading to singleton",
                self.me
            );
            return;
        }
        tracing::info!(
            "{}: successor failed, promoted {}",
            self.me,
            self.successor()
        );
    }

    /// Decide where a key-value operation for `key` must run.
    fn route(&self, key: Did) -> Route {
        if self.is_responsible(key) {
            return Route::Local;
        }
        match self.find_successor(key) {
            RingAction::Found(n) if n.did == self.me.did => Route::Local,
            RingAction::Found(n) => Route::Forward(n),
            RingAction::Remote(n, _) => Route::Forward(n),
            _ => Route::Local,
        }
    }
}

impl Chord<RingAction> for NodeRing {
    /// Find the successor of `key`. If the key falls between this node
    /// and its successor the answer is local; otherwise the query belongs
    /// at the closest preceding finger, or at the successor itself when
    /// no finger qualifies. Only a node that knows no other ring member
    /// answers with itself.
    fn find_successor(&self, key: Did) -> RingAction {
        let successor = self.successors.successor();
        if self.successors.is_empty() || between(self.me.did, key, successor.did) {
            return RingAction::Found(successor);
        }
        match self.finger.closest_preceding(key) {
            Some(next) if next.did != self.me.did => {
                RingAction::Remote(next, RemoteAction::FindSuccessor(key))
            }
            _ => RingAction::Remote(successor, RemoteAction::FindSuccessor(key)),
        }
    }

    /// Handle a notification from a node that believes it is our
    /// predecessor. The claim is accepted when there is no predecessor
    /// yet, or when the claimant bisects the current predecessor arc.
    /// Any contact is also a successor-list candidate, which is how a
    /// bootstrap node links up with its first joiner.
    fn notify(&mut self, node: NodeRef) -> Option<NodeRef> {
        if node.did == self.me.did {
            return None;
        }
        self.successors.update(node);

        let accept = match self.predecessor {
            None => true,
            Some(p) => between(p.did, node.did, self.me.did),
        };
        if accept {
            self.predecessor = Some(node);
            return Some(node);
        }
        None
    }

    /// First half of a stabilization round: nothing to reconcile while
    /// alone, otherwise the successor gets asked for its topology.
    fn pre_stabilize(&self) -> RingAction {
        if self.successors.is_empty() {
            return RingAction::None;
        }
        RingAction::Remote(self.successor(), RemoteAction::QueryTopoInfo)
    }

    /// Second half of a stabilization round, fed with the successor's
    /// reply. If the successor already knows a predecessor that sits
    /// between us and it, that node is the better successor. The
    /// successor list is rebuilt from the reply rather than patched, so
    /// stale entries age out in a single round. The (possibly new) head
    /// is then notified about us.
    fn stabilize_with(&mut self, info: TopoInfo) -> RingAction {
        let mut head = self.successors.successor();
        if head.did == self.me.did {
            return RingAction::None;
        }
        if let Some(p) = info.predecessor {
            if p.did != self.me.did && between(self.me.did, p.did, head.did) {
                tracing::debug!("{}: adopting closer successor {}", self.me, p);
                head = p;
            }
        }
        self.successors.refresh(head, &info.successors);
        RingAction::Remote(self.successor(), RemoteAction::Notify)
    }

    /// Refresh the next finger slot. When the slot's start falls inside
    /// the arc to our successor the answer is already known; otherwise a
    /// lookup travels the ring and the report patches the slot later.
    fn fix_fingers(&mut self) -> RingAction {
        let slot = self.finger.advance();
        let key = self.me.did.finger_start(slot);
        match self.find_successor(key) {
            RingAction::Found(n) => {
                self.finger.set(slot, n);
                RingAction::None
            }
            RingAction::Remote(next, _) => {
                RingAction::Remote(next, RemoteAction::FindSuccessorForFix { key, slot })
            }
            _ => RingAction::None,
        }
    }

    /// Probe the predecessor. A dead predecessor answers nothing, but the
    /// transport reports the failed delivery and [NodeRing::peer_failed]
    /// clears the pointer, making room for the next notify.
    fn check_predecessor(&self) -> RingAction {
        match self.predecessor {
            Some(p) => RingAction::Remote(p, RemoteAction::Ping),
            None => RingAction::None,
        }
    }
}

impl ChordStore<RingAction> for NodeRing {
    /// Store `value` under `key`: write locally when this node's arc
    /// covers the key, otherwise pass the operation to the next hop.
    fn store_value(&mut self, key: Did, value: String) -> RingAction {
        match self.route(key) {
            Route::Local => {
                tracing::info!("{}: stored key {:?}", self.me, key);
                self.store.put(key, value);
                RingAction::None
            }
            Route::Forward(next) => RingAction::Remote(next, RemoteAction::StoreValue { key, value }),
        }
    }

    /// Read the value under `key`, resolving locally or naming the next
    /// hop. A miss at the responsible node is an answer, not an error.
    fn fetch_value(&self, key: Did) -> RingAction {
        match self.route(key) {
            Route::Local => RingAction::LocalValue {
                key,
                value: self.store.get(&key),
            },
            Route::Forward(next) => RingAction::Remote(next, RemoteAction::FetchValue { key }),
        }
    }
}
