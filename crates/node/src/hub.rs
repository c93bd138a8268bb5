//! In-process transport: an addressable switchboard of actor mailboxes.
//!
//! Every spawned actor gets a mailbox and an opaque [Addr]. Delivery is
//! fire-and-forget; when a destination is gone the switchboard signals
//! the sender instead, which is all the failure detection the protocol
//! needs. The switchboard stands where a network transport would, and
//! nothing outside this module knows the difference.
use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::RwLock;

use async_channel::Receiver;
use async_channel::Sender;
use chordal_core::dht::Addr;
use chordal_core::error::Error;
use chordal_core::error::Result;
use chordal_core::message::Packet;
use tokio::sync::oneshot;

use crate::inspect::NodeInspect;

/// One item of an actor mailbox.
#[derive(Debug)]
pub enum Signal {
    /// An inbound protocol packet.
    Packet(Packet),
    /// Delivery to the given address failed persistently.
    PeerUnreachable(Addr),
    /// Snapshot request from a driver or test.
    Inspect(oneshot::Sender<NodeInspect>),
}

/// The routing table shared by all in-process actors. Cloning is shallow;
/// clones address the same set of mailboxes.
#[derive(Clone, Default)]
pub struct Switchboard {
    routes: Arc<RwLock<HashMap<Addr, Sender<Signal>>>>,
    next_addr: Arc<AtomicU64>,
}

impl Switchboard {
    /// Create an empty switchboard.
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&self) -> Addr {
        Addr::from(self.next_addr.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Allocate an address with a fresh mailbox and register it.
    pub fn register(&self) -> Result<(Addr, Receiver<Signal>)> {
        let addr = self.alloc();
        let (tx, rx) = async_channel::unbounded();
        self.routes
            .write()
            .map_err(|_| Error::ChannelSendFailed)?
            .insert(addr, tx);
        Ok((addr, rx))
    }

    /// Register a bare mailbox for a driver or test playing the client
    /// role: it can receive reports but runs no actor.
    pub fn client(&self) -> Result<(Addr, Receiver<Signal>)> {
        self.register()
    }

    /// Deliver a signal to a mailbox, without failure notification.
    pub fn post(&self, to: Addr, signal: Signal) -> Result<()> {
        let sender = {
            let routes = self.routes.read().map_err(|_| Error::ChannelSendFailed)?;
            routes.get(&to).cloned().ok_or(Error::UnknownAddress(to))?
        };
        sender
            .try_send(signal)
            .map_err(|_| Error::ChannelSendFailed)
    }

    /// Deliver a packet on behalf of `from`. A failed delivery is echoed
    /// back to the sender's mailbox as [Signal::PeerUnreachable].
    pub fn send(&self, from: Addr, to: Addr, pkt: Packet) {
        if self.post(to, Signal::Packet(pkt)).is_err() {
            tracing::debug!("delivery to {} failed, signalling {}", to, from);
            if self.post(from, Signal::PeerUnreachable(to)).is_err() {
                tracing::debug!("sender {} is gone too, dropping failure signal", from);
            }
        }
    }

    /// Terminate the actor behind `addr` by closing its mailbox.
    pub fn stop(&self, addr: Addr) {
        if let Ok(mut routes) = self.routes.write() {
            routes.remove(&addr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chordal_core::message::Message;
    use chordal_core::message::Ping;

    fn ping_packet(from: Addr) -> Packet {
        Packet::new(from, Message::Ping(Ping))
    }

    #[tokio::test]
    async fn test_register_and_post() {
        let hub = Switchboard::new();
        let (a, rx_a) = hub.register().unwrap();
        let (b, _rx_b) = hub.register().unwrap();
        assert_ne!(a, b);

        hub.post(a, Signal::Packet(ping_packet(b))).unwrap();
        match rx_a.recv().await.unwrap() {
            Signal::Packet(pkt) => assert_eq!(pkt.from, b),
            other => panic!("unexpected signal {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_to_dead_address_signals_sender() {
        let hub = Switchboard::new();
        let (a, rx_a) = hub.register().unwrap();
        let (b, _rx_b) = hub.register().unwrap();

        hub.stop(b);
        hub.send(a, b, ping_packet(a));
        match rx_a.recv().await.unwrap() {
            Signal::PeerUnreachable(addr) => assert_eq!(addr, b),
            other => panic!("unexpected signal {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stop_closes_mailbox() {
        let hub = Switchboard::new();
        let (a, rx_a) = hub.register().unwrap();
        hub.stop(a);
        assert!(rx_a.recv().await.is_err());
        assert!(hub.post(a, Signal::PeerUnreachable(a)).is_err());
    }
}
