//! Packet envelope carried by the transport.
use serde::Deserialize;
use serde::Serialize;

use super::types::Message;
use crate::consts::DEFAULT_HOP_TTL;
use crate::dht::Addr;
use crate::error::Error;
use crate::error::Result;

/// A message wrapped with delivery metadata: the sending hop's address,
/// a transaction id that survives forwarding, and a hop budget so a
/// routing loop on a churning ring dies out instead of circulating
/// forever.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Packet {
    /// Transaction id, preserved across hops.
    pub tx_id: uuid::Uuid,
    /// Address of the hop this packet was sent from.
    pub from: Addr,
    /// Remaining hop budget.
    pub ttl: u8,
    /// The wrapped message.
    pub data: Message,
}

impl Packet {
    /// Wrap a fresh message.
    pub fn new(from: Addr, data: Message) -> Self {
        Self {
            tx_id: uuid::Uuid::new_v4(),
            from,
            ttl: DEFAULT_HOP_TTL,
            data,
        }
    }

    /// Re-address this packet for its next hop, spending one unit of hop
    /// budget. Keeps the transaction id.
    pub fn next_hop(&self, from: Addr) -> Result<Packet> {
        let ttl = self
            .ttl
            .checked_sub(1)
            .filter(|ttl| *ttl > 0)
            .ok_or(Error::HopBudgetExhausted)?;
        Ok(Packet {
            tx_id: self.tx_id,
            from,
            ttl,
            data: self.data.clone(),
        })
    }

    /// Serialize for a byte-oriented transport.
    pub fn to_bincode(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(Error::BincodeSerialize)
    }

    /// Deserialize from a byte-oriented transport.
    pub fn from_bincode(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data).map_err(Error::BincodeDeserialize)
    }
}
