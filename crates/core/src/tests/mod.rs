//! Test helpers: a deterministic in-memory message pump over a set of
//! node handlers, standing in for the real transport.
use std::collections::HashMap;
use std::collections::VecDeque;

use crate::consts::DEFAULT_SUCC_LIST_LEN;
use crate::dht::Addr;
use crate::dht::Did;
use crate::dht::NodeRef;
use crate::dht::NodeRing;
use crate::message::HandlerEvent;
use crate::message::Message;
use crate::message::MessageHandler;
use crate::message::Packet;
use crate::message::Stabilize;


/// A synchronous stand-in for the transport: a handler per address, a
/// FIFO delivery queue, and failure notification for dead addresses.
/// `run` drains the queue to quiescence, so each test step observes a
/// settled network.
pub struct TestNet {
    handlers: HashMap<Addr, MessageHandler>,
    inboxes: HashMap<Addr, Vec<Packet>>,
    queue: VecDeque<(Addr, Packet)>,
    next_addr: u64,
}

impl TestNet {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            inboxes: HashMap::new(),
            queue: VecDeque::new(),
            next_addr: 1,
        }
    }

    fn alloc(&mut self) -> Addr {
        let addr = Addr::from(self.next_addr);
        self.next_addr += 1;
        addr
    }

    /// Create a node whose id is the digest of `name`.
    pub fn spawn(&mut self, name: &str) -> NodeRef {
        let addr = self.alloc();
        let me = NodeRef::new(Did::digest(name), addr);
        let ring = NodeRing::new(me, DEFAULT_SUCC_LIST_LEN);
        self.handlers.insert(addr, MessageHandler::new(ring));
        me
    }

    /// Register a bare mailbox, playing the part of an external client.
    pub fn client(&mut self) -> Addr {
        let addr = self.alloc();
        self.inboxes.insert(addr, vec![]);
        addr
    }

    /// Queue a message without processing it.
    pub fn send(&mut self, from: Addr, to: Addr, msg: Message) {
        self.queue.push_back((to, Packet::new(from, msg)));
    }

    /// Drop a node, as if its process died.
    pub fn kill(&mut self, node: NodeRef) {
        self.handlers.remove(&node.addr);
    }

    /// Run one stabilization round at `node` and drain the fallout.
    pub fn tick(&mut self, node: NodeRef) {
        self.send(node.addr, node.addr, Message::Stabilize(Stabilize));
        self.run();
    }

    /// Run `rounds` stabilization rounds over all `nodes`, in order.
    pub fn stabilize(&mut self, nodes: &[NodeRef], rounds: usize) {
        for _ in 0..rounds {
            for node in nodes {
                self.tick(*node);
            }
        }
    }

    /// Deliver queued packets until the network is quiescent. Packets
    /// for a dead address turn into a failure notification handled by
    /// the sender, exactly like the real switchboard.
    pub fn run(&mut self) {
        while let Some((to, pkt)) = self.queue.pop_front() {
            let outcome = if let Some(handler) = self.handlers.get_mut(&to) {
                match handler.handle_packet(&pkt) {
                    Ok(events) => Some((to, events)),
                    Err(e) => {
                        tracing::warn!("handler at {} dropped packet: {}", to, e);
                        None
                    }
                }
            } else if let Some(inbox) = self.inboxes.get_mut(&to) {
                inbox.push(pkt);
                None
            } else if let Some(sender) = self.handlers.get_mut(&pkt.from) {
                Some((pkt.from, sender.peer_failed(to)))
            } else {
                None
            };

            if let Some((from, events)) = outcome {
                self.enqueue(from, events);
            }
        }
    }

    fn enqueue(&mut self, from: Addr, events: Vec<HandlerEvent>) {
        for event in events {
            match event {
                HandlerEvent::Send { to, msg } => {
                    self.queue.push_back((to, Packet::new(from, msg)))
                }
                HandlerEvent::Forward { to, pkt } => self.queue.push_back((to, pkt)),
            }
        }
    }

    /// The ring state of a live node.
    pub fn ring(&self, node: NodeRef) -> &NodeRing {
        self.handlers
            .get(&node.addr)
            .expect("node is not alive")
            .ring()
    }

    /// Drain a client mailbox.
    pub fn inbox(&mut self, addr: Addr) -> Vec<Packet> {
        self.inboxes
            .get_mut(&addr)
            .map(std::mem::take)
            .unwrap_or_default()
    }
}

/// The node that a converged ring of `nodes` makes responsible for
/// `key`: the first one clockwise of the key, inclusive.
pub fn responsible_of(nodes: &[NodeRef], key: Did) -> NodeRef {
    let mut sorted = nodes.to_vec();
    sorted.sort_by_key(|n| n.did);
    *sorted
        .iter()
        .find(|n| n.did >= key)
        .unwrap_or(&sorted[0])
}
