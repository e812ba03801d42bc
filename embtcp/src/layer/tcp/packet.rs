//! Segment encoding and decoding for a connection.
use crate::layer::{Error, Result};
use crate::wire::{self, tcp_packet, TcpFlags, TcpOption, TcpRepr};

use super::connection::Connection;
use super::endpoint::Config;

/// The kinds of segments a connection sends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Message {
    /// Open the connection, carries the maximum segment size option.
    Syn,
    /// A bare acknowledgement.
    Ack,
    /// Close our side.
    Fin,
    /// Abort the connection.
    Rst,
    /// A chunk of outbound data.
    Data,
}

/// A decoded inbound segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment<'a> {
    /// The header fields.
    pub repr: TcpRepr,

    /// The header length in 32-bit words.
    pub data_offset: u8,

    /// The payload following the header.
    pub payload: &'a [u8],
}

impl Message {
    /// The flags a segment of this kind carries.
    pub fn flags(self) -> TcpFlags {
        match self {
            Message::Syn => TcpFlags::SYN,
            Message::Ack => TcpFlags::ACK,
            Message::Fin => TcpFlags::FIN | TcpFlags::ACK,
            Message::Rst => TcpFlags::RST,
            Message::Data => TcpFlags::ACK | TcpFlags::PSH,
        }
    }
}

/// Encode a segment of the connection into `buffer`.
///
/// The sequence number is the first unacknowledged one, the acknowledgement number is the next
/// expected one. The payload is only used for `Message::Data`. Returns the length of the segment
/// at the start of the buffer, which includes its checksum over the IPv4 pseudo header.
pub fn encode(
    connection: &Connection,
    message: Message,
    payload: &[u8],
    config: &Config,
    buffer: &mut [u8],
) -> Result<usize> {
    let repr = TcpRepr {
        src_port: connection.tuple.local_port,
        dst_port: connection.tuple.remote_port,
        flags: message.flags(),
        seq_number: connection.send.seq,
        ack_number: connection.recv.next,
        window_len: config.window_len,
        max_seg_size: match message {
            Message::Syn => Some(config.max_seg_size),
            _ => None,
        },
        payload_len: match message {
            Message::Data => payload.len(),
            _ => 0,
        },
    };

    let len = repr.buffer_len();
    let buffer = buffer.get_mut(..len).ok_or(Error::BadSize)?;
    let packet = tcp_packet::new_unchecked_mut(buffer);
    repr.emit(packet);
    packet.payload_mut_slice().copy_from_slice(&payload[..repr.payload_len]);
    packet.fill_checksum(connection.tuple.local, connection.tuple.remote);

    net_trace!("tcp: {} emit {}", connection.tuple, repr);
    Ok(len)
}

/// Decode an inbound segment.
///
/// Only a buffer shorter than the fixed header or a data offset outside the buffer is rejected.
/// The checksum is not verified and options are read on a best effort basis, a malformed option
/// leaves the segment intact.
pub fn decode(bytes: &[u8]) -> wire::Result<Segment> {
    let packet = tcp_packet::new_checked(bytes)?;
    let repr = TcpRepr {
        src_port: packet.src_port(),
        dst_port: packet.dst_port(),
        flags: packet.flags(),
        seq_number: packet.seq_number(),
        ack_number: packet.ack_number(),
        window_len: packet.window_len(),
        max_seg_size: announced_mss(packet.options()),
        payload_len: packet.payload_slice().len(),
    };
    Ok(Segment {
        repr,
        data_offset: packet.data_offset(),
        payload: packet.payload_slice(),
    })
}

/// The maximum segment size option, if it precedes any malformed option.
fn announced_mss(mut options: &[u8]) -> Option<u16> {
    while let Ok((rest, option)) = TcpOption::parse(options) {
        match option {
            TcpOption::EndOfList => break,
            TcpOption::MaxSegmentSize(value) => return Some(value),
            _ => options = rest,
        }
    }
    None
}
