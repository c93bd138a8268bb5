//! Handlers for ring membership: join, successor resolution,
//! stabilization queries and predecessor notification.
use super::HandleMsg;
use super::HandlerEvent;
use super::MessageHandler;
use crate::dht::Chord;
use crate::dht::RingAction;
use crate::error::Result;
use crate::message::packet::Packet;
use crate::message::types::FindSuccessorReport;
use crate::message::types::FindSuccessorSend;
use crate::message::types::FindSuccessorThen;
use crate::message::types::JoinRing;
use crate::message::types::Message;
use crate::message::types::NotifyPredecessorSend;
use crate::message::types::QueryForTopoInfoReport;
use crate::message::types::QueryForTopoInfoSend;

impl HandleMsg<JoinRing> for MessageHandler {
    /// Kick off a join: ask the known member to resolve our own id. The
    /// report will arrive tagged [FindSuccessorThen::Join] and become our
    /// successor. Until then we stay a ring of one.
    fn handle(&mut self, _ctx: &Packet, msg: &JoinRing) -> Result<Vec<HandlerEvent>> {
        let me = self.ring.me();
        tracing::info!("{}: joining ring via {}", me, msg.known);
        Ok(vec![HandlerEvent::Send {
            to: msg.known,
            msg: Message::FindSuccessorSend(FindSuccessorSend {
                key: me.did,
                requester: me.addr,
                then: FindSuccessorThen::Join,
            }),
        }])
    }
}

impl HandleMsg<FindSuccessorSend> for MessageHandler {
    /// Resolve a successor query: answer the requester directly when the
    /// key lands on our successor arc, otherwise pass the whole packet to
    /// the closest preceding finger. The requester address rides in the
    /// message, so no forwarding state is kept here.
    fn handle(&mut self, ctx: &Packet, msg: &FindSuccessorSend) -> Result<Vec<HandlerEvent>> {
        match self.ring.find_successor(msg.key) {
            RingAction::Found(successor) => Ok(vec![HandlerEvent::Send {
                to: msg.requester,
                msg: Message::FindSuccessorReport(FindSuccessorReport {
                    successor,
                    then: msg.then,
                }),
            }]),
            RingAction::Remote(next, _) => Ok(vec![HandlerEvent::Forward {
                to: next.addr,
                pkt: ctx.next_hop(self.ring.me().addr)?,
            }]),
            action => {
                tracing::error!("{}: unexpected ring action {:?}", self.ring.me(), action);
                Ok(vec![])
            }
        }
    }
}

impl HandleMsg<FindSuccessorReport> for MessageHandler {
    /// A resolution came back: either the successor we join under, or a
    /// fresh entry for the finger slot that asked.
    fn handle(&mut self, _ctx: &Packet, msg: &FindSuccessorReport) -> Result<Vec<HandlerEvent>> {
        match msg.then {
            FindSuccessorThen::Join => {
                tracing::info!("{}: set successor to {}", self.ring.me(), msg.successor);
                self.ring.adopt_successor(msg.successor);
            }
            FindSuccessorThen::FixFinger(slot) => {
                self.ring.finger_learned(slot, msg.successor);
            }
        }
        Ok(vec![])
    }
}

impl HandleMsg<QueryForTopoInfoSend> for MessageHandler {
    /// Report our own neighborhood to whoever is stabilizing against us.
    fn handle(&mut self, ctx: &Packet, _msg: &QueryForTopoInfoSend) -> Result<Vec<HandlerEvent>> {
        Ok(vec![HandlerEvent::Send {
            to: ctx.from,
            msg: Message::QueryForTopoInfoReport(QueryForTopoInfoReport {
                info: self.ring.topo_info(),
            }),
        }])
    }
}

impl HandleMsg<QueryForTopoInfoReport> for MessageHandler {
    /// Our successor answered a stabilization query: reconcile pointers
    /// and notify the (possibly new) successor about us.
    fn handle(&mut self, _ctx: &Packet, msg: &QueryForTopoInfoReport) -> Result<Vec<HandlerEvent>> {
        let action = self.ring.stabilize_with(msg.info.clone());
        Ok(self.perform(action))
    }
}

impl HandleMsg<NotifyPredecessorSend> for MessageHandler {
    /// A node claims to be our predecessor.
    fn handle(&mut self, _ctx: &Packet, msg: &NotifyPredecessorSend) -> Result<Vec<HandlerEvent>> {
        if let Some(adopted) = self.ring.notify(msg.node) {
            tracing::debug!("{}: predecessor is now {}", self.ring.me(), adopted);
        }
        Ok(vec![])
    }
}
