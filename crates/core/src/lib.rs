//! # chordal-core
//!
//! The protocol core of chordal, a Chord-style distributed hash table:
//! ring identifier arithmetic, the per-node ring state with its
//! successor list and finger table, the routing and stabilization
//! operations, and the message handlers that drive them.
//!
//! Everything here is transport-agnostic. Handlers return lists of
//! outbound events; moving those events between nodes is the runtime's
//! job (see the `chordal-node` crate).

pub mod consts;
pub mod dht;
pub mod error;
pub mod message;
pub mod storage;

pub use error::Error;
pub use error::Result;

#[cfg(test)]
pub mod tests;
