//! Peer references: transport addresses and (id, address) pairs.
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use super::did::Did;

/// Opaque transport address of a node actor. Allocated by the transport,
/// meaningless outside of it. Two live actors never share an address.
#[derive(Copy, Clone, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Hash, Debug)]
pub struct Addr(u64);

impl From<u64> for Addr {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A routable reference to a node: its ring identifier plus the transport
/// address messages for it are delivered to.
///
/// Ring ordering always goes through [Did]; the address only matters for
/// delivery and for telling self apart from a same-id impostor.
#[derive(Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Hash, Debug)]
pub struct NodeRef {
    /// Position on the ring.
    pub did: Did,
    /// Delivery handle for the transport.
    pub addr: Addr,
}

impl NodeRef {
    /// Build a reference from its parts.
    pub fn new(did: Did, addr: Addr) -> Self {
        Self { did, addr }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}@{}", self.did, self.addr)
    }
}
