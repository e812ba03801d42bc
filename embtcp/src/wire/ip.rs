//! IPv4 addressing and the Internet checksum.
//!
//! Only the parts of IPv4 the TCP layer needs are represented here: addresses, the protocol
//! number and the pseudo header that enters the checksum of every segment.
use core::fmt;

enum_with_unknown! {
    /// IP datagram encapsulated protocol.
    pub enum Protocol(u8) {
        /// Transmission control protocol.
        Tcp = 0x06,
    }
}

/// A four-octet IPv4 address.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Address(pub [u8; 4]);

impl Address {
    /// An unspecified address.
    ///
    /// As the local address of a connection it matches any destination of inbound segments.
    pub const UNSPECIFIED: Address = Address([0x00; 4]);

    /// The broadcast address.
    ///
    /// As the remote address of a connection it matches any source of inbound segments.
    pub const BROADCAST: Address = Address([0xff; 4]);

    /// Construct an IPv4 address from parts.
    pub const fn new(a0: u8, a1: u8, a2: u8, a3: u8) -> Address {
        Address([a0, a1, a2, a3])
    }

    /// Return an IPv4 address as a sequence of octets, in big-endian.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Query whether the address is exactly `0.0.0.0`.
    pub fn is_unspecified(&self) -> bool {
        *self == Address::UNSPECIFIED
    }

    /// Query whether the address is the broadcast address.
    pub fn is_broadcast(&self) -> bool {
        *self == Address::BROADCAST
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let bytes = self.0;
        write!(f, "{}.{}.{}.{}", bytes[0], bytes[1], bytes[2], bytes[3])
    }
}

/// The RFC 1071 Internet checksum.
///
/// All sums are computed over big-endian 16-bit words, independent of the host byte order. The
/// functions `data`, `pseudo_header` and `combine` return the folded ones-complement sum without
/// the final complement so that partial sums can be combined.
pub mod checksum {
    use byteorder::{ByteOrder, NetworkEndian};

    use super::{Address, Protocol};

    fn propagate_carries(word: u32) -> u16 {
        let mut sum = word;
        while sum >> 16 != 0 {
            sum = (sum >> 16) + (sum & 0xffff);
        }
        sum as u16
    }

    /// Compute an RFC 1071 compliant checksum (without the final complement).
    ///
    /// An odd trailing byte is padded with a zero low byte.
    pub fn data(mut data: &[u8]) -> u16 {
        let mut accum: u32 = 0;

        // Fold every 32-byte chunk so the accumulator can not overflow on long segments.
        const CHUNK_SIZE: usize = 32;
        while data.len() >= CHUNK_SIZE {
            let mut d = &data[..CHUNK_SIZE];
            while d.len() >= 2 {
                accum += u32::from(NetworkEndian::read_u16(d));
                d = &d[2..];
            }
            accum = u32::from(propagate_carries(accum));
            data = &data[CHUNK_SIZE..];
        }

        while data.len() >= 2 {
            accum += u32::from(NetworkEndian::read_u16(data));
            data = &data[2..];
        }

        if let Some(&value) = data.first() {
            accum += u32::from(value) << 8;
        }

        propagate_carries(accum)
    }

    /// Combine several RFC 1071 compliant checksums.
    pub fn combine(checksums: &[u16]) -> u16 {
        let mut accum: u32 = 0;
        for &word in checksums {
            accum += u32::from(word);
        }
        propagate_carries(accum)
    }

    /// Compute the IPv4 pseudo header sum.
    ///
    /// Consists of both addresses as two 16-bit halves each, the protocol number zero-extended to
    /// 16 bits and the length of the upper layer segment.
    pub fn pseudo_header(src_addr: &Address, dst_addr: &Address, protocol: Protocol, length: u16)
        -> u16
    {
        let mut proto_len = [0u8; 4];
        proto_len[1] = protocol.into();
        NetworkEndian::write_u16(&mut proto_len[2..4], length);

        combine(&[
            data(src_addr.as_bytes()),
            data(dst_addr.as_bytes()),
            data(&proto_len[..]),
        ])
    }

    /// The complete checksum of a segment, ready to be written into its checksum field.
    ///
    /// The segment's own checksum field must be zero while this is computed.
    pub fn segment(src_addr: &Address, dst_addr: &Address, protocol: Protocol, segment: &[u8])
        -> u16
    {
        !combine(&[
            pseudo_header(src_addr, dst_addr, protocol, segment.len() as u16),
            data(segment),
        ])
    }
}
