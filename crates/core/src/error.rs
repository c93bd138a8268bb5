//! Error of chordal_core

/// A wrap `Result` contains custom errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors collections in chordal-core.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("Invalid hexadecimal ring identifier")]
    BadHexId(#[from] hex::FromHexError),

    #[error("Ring identifier must be {0} bytes")]
    BadIdLength(usize),

    #[error("Bincode serialization error")]
    BincodeSerialize(#[source] bincode::Error),

    #[error("Bincode deserialization error")]
    BincodeDeserialize(#[source] bincode::Error),

    #[error("Packet hop budget exhausted")]
    HopBudgetExhausted,

    #[error("Finger index {0} out of range")]
    FingerIndexOutOfRange(usize),

    #[error("Failed on sending message through channel")]
    ChannelSendFailed,

    #[error("Failed on receiving message through channel")]
    ChannelRecvFailed,

    #[error("No node registered at address {0}")]
    UnknownAddress(crate::dht::Addr),
}
