//! Wire message structures of the chordal protocol.
//!
//! Most messages follow a request/response pattern with a one-to-one
//! correspondence between them, such as xxxSend and xxxReport messages.
//! Queries that travel multiple hops carry the original requester's
//! address so the terminal hop can report back directly instead of
//! unwinding the forwarding path.
use serde::Deserialize;
use serde::Serialize;

use crate::dht::Addr;
use crate::dht::Did;
use crate::dht::NodeRef;
use crate::dht::TopoInfo;

/// Ask a fresh node to join the ring through a member known by address.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize, Clone)]
pub struct JoinRing {
    /// Address of any current ring member.
    pub known: Addr,
}

/// What the requester intends to do with a successor report.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize, Clone, Copy)]
pub enum FindSuccessorThen {
    /// Adopt the reported node as our successor after joining.
    Join,
    /// Patch the given finger slot with the reported node.
    FixFinger(usize),
}

/// Resolve the successor of a key somewhere on the ring.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize, Clone)]
pub struct FindSuccessorSend {
    /// The key whose successor is wanted.
    pub key: Did,
    /// Where the eventual report must be delivered.
    pub requester: Addr,
    /// What the requester will do with the report.
    pub then: FindSuccessorThen,
}

/// Terminal answer to [FindSuccessorSend], sent straight to the requester.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize, Clone)]
pub struct FindSuccessorReport {
    /// The resolved successor.
    pub successor: NodeRef,
    /// Echo of the request's intent.
    pub then: FindSuccessorThen,
}

/// Ask a node for its predecessor and successor list in one round-trip.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize, Clone)]
pub struct QueryForTopoInfoSend;

/// Reply to [QueryForTopoInfoSend].
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize, Clone)]
pub struct QueryForTopoInfoReport {
    /// The queried node's neighborhood.
    pub info: TopoInfo,
}

/// Tell a node we believe we are its predecessor.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize, Clone)]
pub struct NotifyPredecessorSend {
    /// The claiming node.
    pub node: NodeRef,
}

/// Periodic self-addressed tick driving stabilization and finger repair.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize, Clone)]
pub struct Stabilize;

/// Liveness probe. Receiving it means nothing; failing to deliver it is
/// the signal, surfaced to the sender by the transport.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize, Clone)]
pub struct Ping;

/// Store a value under a key; hops until it reaches the responsible node.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize, Clone)]
pub struct StoreValueSend {
    /// The key to store under.
    pub key: Did,
    /// The value to store.
    pub value: String,
}

/// Client-facing entry point of a read: asks the receiving node to find
/// the value, whoever holds it. The reply goes to the packet sender.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize, Clone)]
pub struct LookupValueSend {
    /// The key to read.
    pub key: Did,
}

/// Routed read; hops until it reaches the responsible node.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize, Clone)]
pub struct FetchValueSend {
    /// The key to read.
    pub key: Did,
    /// Where the report must be delivered.
    pub requester: Addr,
}

/// Answer to a read, delivered straight to the requester. A missing key
/// is a regular answer.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize, Clone)]
pub struct FetchValueReport {
    /// The queried key.
    pub key: Did,
    /// The stored value, if the key was present.
    pub value: Option<String>,
}

impl FetchValueReport {
    /// Whether the key was present at the responsible node.
    pub fn found(&self) -> bool {
        self.value.is_some()
    }
}

/// A collection of message types for unified management.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum Message {
    /// Local control message kicking off a join.
    JoinRing(JoinRing),
    /// Remote message of find successor.
    FindSuccessorSend(FindSuccessorSend),
    /// Response of FindSuccessorSend.
    FindSuccessorReport(FindSuccessorReport),
    /// Remote message querying a node's neighborhood.
    QueryForTopoInfoSend(QueryForTopoInfoSend),
    /// Response of QueryForTopoInfoSend.
    QueryForTopoInfoReport(QueryForTopoInfoReport),
    /// Remote message of notifying a node about its predecessor.
    NotifyPredecessorSend(NotifyPredecessorSend),
    /// Self-addressed stabilization tick.
    Stabilize(Stabilize),
    /// Liveness probe.
    Ping(Ping),
    /// Routed write.
    StoreValueSend(StoreValueSend),
    /// Client-facing read entry point.
    LookupValueSend(LookupValueSend),
    /// Routed read.
    FetchValueSend(FetchValueSend),
    /// Response of FetchValueSend / LookupValueSend.
    FetchValueReport(FetchValueReport),
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
