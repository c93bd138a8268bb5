//! Message types, envelopes and handlers of the chordal protocol.
pub mod handlers;
pub use handlers::HandleMsg;
pub use handlers::HandlerEvent;
pub use handlers::MessageHandler;
mod packet;
pub use packet::Packet;
pub mod types;
pub use types::FetchValueReport;
pub use types::FetchValueSend;
pub use types::FindSuccessorReport;
pub use types::FindSuccessorSend;
pub use types::FindSuccessorThen;
pub use types::JoinRing;
pub use types::LookupValueSend;
pub use types::Message;
pub use types::NotifyPredecessorSend;
pub use types::Ping;
pub use types::QueryForTopoInfoReport;
pub use types::QueryForTopoInfoSend;
pub use types::Stabilize;
pub use types::StoreValueSend;
