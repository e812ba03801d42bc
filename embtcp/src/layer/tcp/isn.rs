use crate::wire::TcpSeqNumber;

/// Generates initial sequence numbers for new connections.
///
/// A plain counter advanced by a fixed stride on every open, shared by all connections of an
/// endpoint. The numbers are predictable. This is acceptable for a client that only talks to
/// servers of its own choosing but offers no protection against off-path injection, see RFC 6528.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IsnGenerator {
    next: TcpSeqNumber,
    stride: u32,
}

impl IsnGenerator {
    /// Create a generator starting at `seed`.
    pub fn new(seed: TcpSeqNumber, stride: u32) -> Self {
        IsnGenerator {
            next: seed,
            stride,
        }
    }

    /// Get the initial sequence number for the next connection.
    pub fn get_isn(&mut self) -> TcpSeqNumber {
        let isn = self.next;
        self.next = TcpSeqNumber(isn.0.wrapping_add(self.stride));
        isn
    }
}
