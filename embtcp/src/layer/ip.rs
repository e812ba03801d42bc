//! The seam towards the IPv4 layer.
//!
//! This crate does not route, fragment or otherwise handle IP datagrams. It expects an IP layer
//! to exist that can hand out a buffer for a datagram's payload and later send the payload that
//! was written into it.
use crate::wire::{Ipv4Address, IpProtocol};
use super::Result;

/// Describes a payload to the IP layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Descriptor {
    /// The protocol number of the payload.
    pub protocol: IpProtocol,

    /// Whether the datagram must not be fragmented.
    pub dont_fragment: bool,

    /// The source address of the datagram.
    pub src_addr: Ipv4Address,

    /// The destination address of the datagram.
    pub dst_addr: Ipv4Address,

    /// The number of valid payload bytes at the start of the buffer.
    pub payload_len: usize,
}

/// An IP layer that can send payloads.
///
/// The two methods are always called in pairs. First `buffer` to get space for constructing the
/// payload in place, then `send` with a descriptor of what was written to that buffer.
pub trait Send {
    /// Get the payload buffer of the next outbound datagram.
    ///
    /// Returns `None` if no buffer is available right now.
    fn buffer(&mut self) -> Option<&mut [u8]>;

    /// Send the payload that was last written into the buffer.
    ///
    /// Should return `Err(Error::Exhausted)` if the outbound queue is full. The payload is then
    /// considered lost and will be reconstructed on a later attempt.
    fn send(&mut self, descriptor: Descriptor) -> Result<()>;
}

impl<S: Send + ?Sized> Send for &'_ mut S {
    fn buffer(&mut self) -> Option<&mut [u8]> {
        (**self).buffer()
    }

    fn send(&mut self, descriptor: Descriptor) -> Result<()> {
        (**self).send(descriptor)
    }
}
