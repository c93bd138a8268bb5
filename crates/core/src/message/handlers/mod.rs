//! Message handling of a chordal node.
//!
//! The handler owns the node's [NodeRing] and is the only code that
//! mutates it. Handling a packet never touches the network directly:
//! each handler returns a list of [HandlerEvent]s that the surrounding
//! actor performs after the handler has run to completion.
use crate::dht::Addr;
use crate::dht::Chord;
use crate::dht::NodeRing;
use crate::dht::RemoteAction;
use crate::dht::RingAction;
use crate::error::Result;
use crate::message::packet::Packet;
use crate::message::types::FindSuccessorSend;
use crate::message::types::FindSuccessorThen;
use crate::message::types::Message;
use crate::message::types::NotifyPredecessorSend;
use crate::message::types::Ping;
use crate::message::types::QueryForTopoInfoSend;

/// Operator and Handler for ring topology: join, successor resolution,
/// stabilization and notify.
pub mod topology;

/// Operator and Handler for the key-value layer.
pub mod storage;

/// Outbound work produced by a handler, performed by the actor once the
/// handler has returned.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerEvent {
    /// Send a fresh message to a peer.
    Send {
        /// Delivery address.
        to: Addr,
        /// The message to wrap and send.
        msg: Message,
    },
    /// Pass a routed packet on to its next hop, hop budget already spent.
    Forward {
        /// Delivery address of the next hop.
        to: Addr,
        /// The re-addressed packet.
        pkt: Packet,
    },
}

/// Generic trait to handle a single message type, inspired by the
/// Actor-Model.
pub trait HandleMsg<T> {
    /// Message handler.
    fn handle(&mut self, ctx: &Packet, msg: &T) -> Result<Vec<HandlerEvent>>;
}

/// MessageHandler manages the ring state of one node.
#[derive(Debug)]
pub struct MessageHandler {
    ring: NodeRing,
}

impl MessageHandler {
    /// Create a new MessageHandler instance owning `ring`.
    pub fn new(ring: NodeRing) -> Self {
        Self { ring }
    }

    /// Read access to the ring state, for inspection.
    pub fn ring(&self) -> &NodeRing {
        &self.ring
    }

    /// Handle one inbound packet.
    pub fn handle_packet(&mut self, payload: &Packet) -> Result<Vec<HandlerEvent>> {
        tracing::debug!("{} got msg {}", self.ring.me(), &payload.data);

        match &payload.data {
            Message::JoinRing(msg) => self.handle(payload, msg),
            Message::FindSuccessorSend(msg) => self.handle(payload, msg),
            Message::FindSuccessorReport(msg) => self.handle(payload, msg),
            Message::QueryForTopoInfoSend(msg) => self.handle(payload, msg),
            Message::QueryForTopoInfoReport(msg) => self.handle(payload, msg),
            Message::NotifyPredecessorSend(msg) => self.handle(payload, msg),
            Message::Stabilize(_) => Ok(self.tick()),
            Message::Ping(_) => Ok(vec![]),
            Message::StoreValueSend(msg) => self.handle(payload, msg),
            Message::LookupValueSend(msg) => self.handle(payload, msg),
            Message::FetchValueSend(msg) => self.handle(payload, msg),
            Message::FetchValueReport(msg) => self.handle(payload, msg),
        }
    }

    /// Run one stabilization round: reconcile with the successor,
    /// refresh one finger slot, and probe the predecessor.
    pub fn tick(&mut self) -> Vec<HandlerEvent> {
        let mut events = self.perform(self.ring.pre_stabilize());
        let fix = self.ring.fix_fingers();
        events.extend(self.perform(fix));
        events.extend(self.perform(self.ring.check_predecessor()));
        events
    }

    /// React to a transport-level delivery failure for `addr`.
    pub fn peer_failed(&mut self, addr: Addr) -> Vec<HandlerEvent> {
        tracing::info!("{}: peer at {} unreachable", self.ring.me(), addr);
        self.ring.peer_failed(addr);
        vec![]
    }

    /// Translate a [RingAction] into outbound events. Only actions that
    /// stand on their own belong here; handlers with reply context
    /// translate their actions inline.
    fn perform(&mut self, action: RingAction) -> Vec<HandlerEvent> {
        match action {
            RingAction::None => vec![],
            RingAction::Remote(target, RemoteAction::QueryTopoInfo) => vec![HandlerEvent::Send {
                to: target.addr,
                msg: Message::QueryForTopoInfoSend(QueryForTopoInfoSend),
            }],
            RingAction::Remote(target, RemoteAction::Notify) => vec![HandlerEvent::Send {
                to: target.addr,
                msg: Message::NotifyPredecessorSend(NotifyPredecessorSend {
                    node: self.ring.me(),
                }),
            }],
            RingAction::Remote(target, RemoteAction::FindSuccessorForFix { key, slot }) => {
                vec![HandlerEvent::Send {
                    to: target.addr,
                    msg: Message::FindSuccessorSend(FindSuccessorSend {
                        key,
                        requester: self.ring.me().addr,
                        then: FindSuccessorThen::FixFinger(slot),
                    }),
                }]
            }
            RingAction::Remote(target, RemoteAction::Ping) => vec![HandlerEvent::Send {
                to: target.addr,
                msg: Message::Ping(Ping),
            }],
            other => {
                tracing::error!("{}: unexpected ring action {:?}", self.ring.me(), other);
                vec![]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dht::Did;
    use crate::dht::NodeRef;
    use crate::message::types::FindSuccessorReport;
    use crate::message::types::JoinRing;
    use crate::message::types::Stabilize;

    fn node(id: u32) -> NodeRef {
        NodeRef::new(Did::from(id), Addr::from(id as u64))
    }

    fn handler_of(id: u32) -> MessageHandler {
        MessageHandler::new(NodeRing::new(node(id), 3))
    }

    fn stabilize_packet(me: NodeRef) -> Packet {
        Packet::new(me.addr, Message::Stabilize(Stabilize))
    }

    #[test]
    fn test_tick_of_lone_node_is_quiet() {
        let mut handler = handler_of(0);
        let events = handler
            .handle_packet(&stabilize_packet(node(0)))
            .unwrap();
        assert_eq!(events, vec![]);
    }

    #[test]
    fn test_tick_queries_successor_and_probes_predecessor() {
        let mut handler = handler_of(0);
        handler.ring.adopt_successor(node(100));
        handler.ring.notify(node(200));

        let events = handler
            .handle_packet(&stabilize_packet(node(0)))
            .unwrap();
        assert_eq!(events, vec![
            HandlerEvent::Send {
                to: node(100).addr,
                msg: Message::QueryForTopoInfoSend(QueryForTopoInfoSend),
            },
            HandlerEvent::Send {
                to: node(200).addr,
                msg: Message::Ping(Ping),
            },
        ]);
    }

    #[test]
    fn test_join_asks_known_member() {
        let mut handler = handler_of(0);
        let me = handler.ring.me();
        let known = Addr::from(9u64);

        let pkt = Packet::new(me.addr, Message::JoinRing(JoinRing { known }));
        let events = handler.handle_packet(&pkt).unwrap();
        assert_eq!(events, vec![HandlerEvent::Send {
            to: known,
            msg: Message::FindSuccessorSend(FindSuccessorSend {
                key: me.did,
                requester: me.addr,
                then: FindSuccessorThen::Join,
            }),
        }]);
    }

    #[test]
    fn test_lone_member_answers_a_join_query_with_itself() {
        let mut handler = handler_of(0);
        let joiner = node(42);

        let pkt = Packet::new(
            joiner.addr,
            Message::FindSuccessorSend(FindSuccessorSend {
                key: joiner.did,
                requester: joiner.addr,
                then: FindSuccessorThen::Join,
            }),
        );
        let events = handler.handle_packet(&pkt).unwrap();
        assert_eq!(events, vec![HandlerEvent::Send {
            to: joiner.addr,
            msg: Message::FindSuccessorReport(FindSuccessorReport {
                successor: node(0),
                then: FindSuccessorThen::Join,
            }),
        }]);
    }

    #[test]
    fn test_peer_failure_is_absorbed() {
        let mut handler = handler_of(0);
        handler.ring.adopt_successor(node(100));
        let events = handler.peer_failed(node(100).addr);
        assert_eq!(events, vec![]);
        assert_eq!(handler.ring().successor(), node(0));
    }
}
