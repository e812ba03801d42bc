//! The process logic of protocol layers.
//!
//! ## Layering
//!
//! Each protocol layer is split into two parts; the packet logic contained in `wire` and the
//! processing part in this module. An endpoint represents the local state of a protocol. This
//! state can be used to process packets of that layer. The state is open to modifications as part
//! of a user program while processing does not take place.
//!
//! ## Receiving
//!
//! The layer below delivers the payload of each IP datagram together with its addresses to the
//! TCP endpoint. Everything else, from header parsing to the answer that a segment may require,
//! happens within the endpoint.
//!
//! ## Sending
//!
//! Sending happens in two places. Answers to inbound segments are emitted immediately while the
//! inbound segment is processed. All other segments are emitted from a periodic poll of the
//! endpoint, which must be driven by the owner. Both use the [`ip::Send`] trait to borrow an
//! outbound buffer from the IP layer and to hand the finished segment back.
//!
//! [`ip::Send`]: ip/trait.Send.html
use core::fmt;

use crate::wire;

pub mod ip;
pub mod tcp;

/// The result type of layer operations.
pub type Result<T> = core::result::Result<T, Error>;

/// The error type of layer operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Error {
    /// The operation was not permitted.
    ///
    /// Returned when the referenced connection slot does not exist, or when an inbound segment
    /// could not be understood at all.
    Illegal,

    /// Not enough space for the requested packet.
    ///
    /// Returned when a buffer handed to an operation is too small for the data that should be
    /// written into it. In contrast to `Illegal` this would signal that a larger buffer works.
    BadSize,

    /// The action could not be completed because there were not enough resources.
    ///
    /// The main difference towards `Illegal` is that implies that it would have been legal with
    /// more resources. Both an exhausted receive buffer pool and a full IP send queue end up here.
    Exhausted,

    /// The connection is closed.
    ///
    /// Returned when trying to queue outbound data on a connection slot that was never opened or
    /// was closed since.
    NotOpen,
}

impl From<wire::Error> for Error {
    fn from(_: wire::Error) -> Self {
        Error::Illegal
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Illegal => write!(f, "illegal operation"),
            Error::BadSize => write!(f, "buffer too small"),
            Error::Exhausted => write!(f, "resources exhausted"),
            Error::NotOpen => write!(f, "connection not open"),
        }
    }
}
