//! The node actor: one mailbox, one owner of the ring state.
//!
//! The actor task is the only code that touches its [NodeRing]; handlers
//! run to completion per signal and the resulting outbound events are
//! performed afterwards. Periodic stabilization is a separate task that
//! does nothing but post a tick into the owner's mailbox, keeping the
//! state strictly single-consumer.
use std::time::Duration;

use async_channel::Receiver;
use chordal_core::dht::Addr;
use chordal_core::dht::Did;
use chordal_core::dht::NodeRef;
use chordal_core::dht::NodeRing;
use chordal_core::error::Error;
use chordal_core::error::Result;
use chordal_core::message::HandlerEvent;
use chordal_core::message::JoinRing;
use chordal_core::message::LookupValueSend;
use chordal_core::message::Message;
use chordal_core::message::MessageHandler;
use chordal_core::message::Packet;
use chordal_core::message::Stabilize;
use chordal_core::message::StoreValueSend;
use tokio::sync::oneshot;

use crate::config::NodeConfig;
use crate::hub::Signal;
use crate::hub::Switchboard;
use crate::inspect::NodeInspect;

/// A client-side handle to a spawned node actor. Cheap to clone; all
/// methods go through the switchboard, never at the state directly.
#[derive(Clone)]
pub struct NodeHandle {
    me: NodeRef,
    hub: Switchboard,
}

/// Spawn a node actor whose ring id is the digest of `name`. The actor
/// starts as a ring of one; send it a join to connect it to a ring.
pub fn spawn(hub: &Switchboard, name: &str, cfg: &NodeConfig) -> Result<NodeHandle> {
    let (addr, mailbox) = hub.register()?;
    let me = NodeRef::new(Did::digest(name), addr);
    let handler = MessageHandler::new(NodeRing::new(me, cfg.succ_list_len));

    tokio::spawn(run(handler, hub.clone(), mailbox));
    if let Some(period) = cfg.stabilize_interval {
        tokio::spawn(tick_loop(hub.clone(), addr, period));
    }

    tracing::info!("spawned node {} ({})", me, name);
    Ok(NodeHandle {
        me,
        hub: hub.clone(),
    })
}

impl NodeHandle {
    /// The node's reference.
    pub fn me(&self) -> NodeRef {
        self.me
    }

    /// Its transport address.
    pub fn addr(&self) -> Addr {
        self.me.addr
    }

    /// Ask the node to join the ring known to the member at `known`.
    pub fn join(&self, known: Addr) -> Result<()> {
        self.post(Packet::new(
            self.me.addr,
            Message::JoinRing(JoinRing { known }),
        ))
    }

    /// Store a value into the ring, entering at this node.
    pub fn store(&self, key: Did, value: &str) -> Result<()> {
        self.post(Packet::new(
            self.me.addr,
            Message::StoreValueSend(StoreValueSend {
                key,
                value: value.into(),
            }),
        ))
    }

    /// Look a key up, entering at this node. The report is delivered to
    /// `reply_to`, typically a client mailbox from [Switchboard::client].
    pub fn lookup(&self, key: Did, reply_to: Addr) -> Result<()> {
        self.post(Packet::new(
            reply_to,
            Message::LookupValueSend(LookupValueSend { key }),
        ))
    }

    /// Run one stabilization round now. Tests pace rounds with this
    /// instead of waiting for the ticker.
    pub fn tick(&self) -> Result<()> {
        self.post(Packet::new(self.me.addr, Message::Stabilize(Stabilize)))
    }

    /// Take a consistent snapshot of the node's state.
    pub async fn inspect(&self) -> Result<NodeInspect> {
        let (tx, rx) = oneshot::channel();
        self.hub.post(self.me.addr, Signal::Inspect(tx))?;
        rx.await.map_err(|_| Error::ChannelRecvFailed)
    }

    /// Terminate the actor, as unceremoniously as a crash.
    pub fn stop(&self) {
        self.hub.stop(self.me.addr);
    }

    fn post(&self, pkt: Packet) -> Result<()> {
        self.hub.post(self.me.addr, Signal::Packet(pkt))
    }
}

/// The actor event loop: drain the mailbox until it closes.
async fn run(mut handler: MessageHandler, hub: Switchboard, mailbox: Receiver<Signal>) {
    let me = handler.ring().me();
    while let Ok(signal) = mailbox.recv().await {
        let events = match signal {
            Signal::Packet(pkt) => match handler.handle_packet(&pkt) {
                Ok(events) => events,
                Err(e) => {
                    tracing::warn!("{}: dropped packet: {}", me, e);
                    vec![]
                }
            },
            Signal::PeerUnreachable(addr) => handler.peer_failed(addr),
            Signal::Inspect(reply) => {
                let _ = reply.send(NodeInspect::of(handler.ring()));
                vec![]
            }
        };
        for event in events {
            match event {
                HandlerEvent::Send { to, msg } => {
                    hub.send(me.addr, to, Packet::new(me.addr, msg))
                }
                HandlerEvent::Forward { to, pkt } => hub.send(me.addr, to, pkt),
            }
        }
    }
    tracing::debug!("{}: mailbox closed, actor exits", me);
}

/// Post a stabilize tick into the owner's mailbox every `period`, until
/// the mailbox is gone.
async fn tick_loop(hub: Switchboard, addr: Addr, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await;
    loop {
        interval.tick().await;
        let pkt = Packet::new(addr, Message::Stabilize(Stabilize));
        if hub.post(addr, Signal::Packet(pkt)).is_err() {
            break;
        }
    }
}
