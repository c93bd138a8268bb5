//! Handlers for the key-value layer.
use super::HandleMsg;
use super::HandlerEvent;
use super::MessageHandler;
use crate::dht::ChordStore;
use crate::dht::RingAction;
use crate::error::Result;
use crate::message::packet::Packet;
use crate::message::types::FetchValueReport;
use crate::message::types::FetchValueSend;
use crate::message::types::LookupValueSend;
use crate::message::types::Message;
use crate::message::types::StoreValueSend;

impl HandleMsg<StoreValueSend> for MessageHandler {
    /// Write a value: either our arc covers the key and the store is
    /// local, or the packet hops on toward the responsible node.
    fn handle(&mut self, ctx: &Packet, msg: &StoreValueSend) -> Result<Vec<HandlerEvent>> {
        match self.ring.store_value(msg.key, msg.value.clone()) {
            RingAction::None => Ok(vec![]),
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

impl HandleMsg<LookupValueSend> for MessageHandler {
    /// Entry point of a read: the packet sender is the one waiting for
    /// the answer. From here the query becomes a routed [FetchValueSend]
    /// carrying that address, unless we can answer on the spot.
    fn handle(&mut self, ctx: &Packet, msg: &LookupValueSend) -> Result<Vec<HandlerEvent>> {
        let requester = ctx.from;
        match self.ring.fetch_value(msg.key) {
            RingAction::LocalValue { key, value } => Ok(vec![HandlerEvent::Send {
                to: requester,
                msg: Message::FetchValueReport(FetchValueReport { key, value }),
            }]),
            RingAction::Remote(next, _) => Ok(vec![HandlerEvent::Send {
                to: next.addr,
                msg: Message::FetchValueSend(FetchValueSend {
                    key: msg.key,
                    requester,
                }),
            }]),
            action => {
                tracing::error!("{}: unexpected ring action {:?}", self.ring.me(), action);
                Ok(vec![])
            }
        }
    }
}

impl HandleMsg<FetchValueSend> for MessageHandler {
    /// A routed read: answer the requester directly when our arc covers
    /// the key, otherwise keep hopping.
    fn handle(&mut self, ctx: &Packet, msg: &FetchValueSend) -> Result<Vec<HandlerEvent>> {
        match self.ring.fetch_value(msg.key) {
            RingAction::LocalValue { key, value } => Ok(vec![HandlerEvent::Send {
                to: msg.requester,
                msg: Message::FetchValueReport(FetchValueReport { key, value }),
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

impl HandleMsg<FetchValueReport> for MessageHandler {
    /// Nodes can issue lookups themselves; a report landing here instead
    /// of at an external client is only worth a log line.
    fn handle(&mut self, _ctx: &Packet, msg: &FetchValueReport) -> Result<Vec<HandlerEvent>> {
        match &msg.value {
            Some(value) => {
                tracing::info!("{}: key {:?} has value {}", self.ring.me(), msg.key, value)
            }
            None => tracing::info!("{}: key {:?} not found", self.ring.me(), msg.key),
        }
        Ok(vec![])
    }
}
