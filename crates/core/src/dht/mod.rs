//! Implementation of the Chord DHT,
//! ref: <https://pdos.csail.mit.edu/papers/ton:chord/paper-ton.pdf>
//!
//! With high probability, the number of nodes that must be contacted to
//! find a successor in an N-node ring is O(log N).
pub mod did;
pub use did::between;
pub use did::Did;
mod chord;
pub use chord::NodeRing;
pub use chord::RemoteAction;
pub use chord::RingAction;
pub use chord::TopoInfo;
/// Finger table for routing.
pub mod finger;
pub use finger::FingerTable;
/// Peer references.
pub mod peer;
pub use peer::Addr;
pub use peer::NodeRef;
/// Successor list for failover.
pub mod successor;
pub use successor::SuccessorList;
mod types;
pub use types::Chord;
pub use types::ChordStore;
