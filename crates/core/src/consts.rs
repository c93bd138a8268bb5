//! Constant variables.

/// Width of the ring identifier space in bits. Identifiers are SHA-1
/// digests, so the ring is R(2^160).
pub const RING_BITS: usize = 160;

/// Default capacity of the successor list.
pub const DEFAULT_SUCC_LIST_LEN: usize = 5;

/// Default stabilization period in milliseconds.
pub const DEFAULT_STABILIZE_INTERVAL_MS: u64 = 5000;

/// Hop budget for routed packets. A packet that has been forwarded this
/// many times without reaching its responsible node is dropped.
pub const DEFAULT_HOP_TTL: u8 = 64;
