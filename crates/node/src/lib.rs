//! # chordal-node
//!
//! The in-process runtime of chordal: a switchboard transport that
//! routes packets between actor mailboxes, the node actor event loop
//! with its stabilization ticker, and the inspection plumbing that
//! drivers and tests use to observe a ring.

pub mod actor;
pub use actor::spawn;
pub use actor::NodeHandle;
pub mod config;
pub use config::NodeConfig;
pub mod hub;
pub use hub::Signal;
pub use hub::Switchboard;
pub mod inspect;
pub use inspect::NodeInspect;
pub mod logging;
