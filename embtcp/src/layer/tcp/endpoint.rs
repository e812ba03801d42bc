use core::fmt;

use crate::layer::{ip, Error, Result};
use crate::managed::{Pool, Slice};
use crate::wire::{Ipv4Address, IpProtocol, TcpSeqNumber};

use super::connection::{Connection, State};
use super::isn::IsnGenerator;
use super::packet::{decode, encode, Message};

/// The number of connection slots a typical endpoint is set up with.
pub const DEFAULT_CONNECTIONS: usize = 2;

/// Handles TCP connection states.
///
/// The connection table is a fixed list of slots provided by setup code. Nothing is allocated
/// after construction, receive buffers are split off the pool as slots are first opened.
pub struct Endpoint<'a> {
    slots: Slice<'a, Connection<'a>>,
    pool: Pool<'a>,
    isn: IsnGenerator,
    config: Config,
}

/// Parameters shared by all connections of an endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Config {
    /// The largest payload sent in one data segment.
    pub max_segment_len: usize,

    /// The receive window we advertise.
    pub window_len: u16,

    /// The maximum segment size announced in the SYN.
    pub max_seg_size: u16,

    /// Ask the ip layer not to fragment our segments.
    pub dont_fragment: bool,

    /// The first initial sequence number handed out.
    pub initial_seq: u32,

    /// The distance between successive initial sequence numbers.
    pub seq_stride: u32,
}

/// The addresses and ports identifying a connection, from our point of view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FourTuple {
    /// Our address, `UNSPECIFIED` matches any destination of inbound segments.
    pub local: Ipv4Address,
    /// The remote address, `BROADCAST` matches any source of inbound segments.
    pub remote: Ipv4Address,
    /// Our port.
    pub local_port: u16,
    /// The port of the remote.
    pub remote_port: u16,
}

/// The index of a connection.
///
/// Useful for storing in other structs to reference the connection at another point in time.
/// The key stays valid when the connection in its slot is closed and reopened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey {
    index: usize,
}

impl SlotKey {
    /// Refer to the slot at `index`.
    pub const fn new(index: usize) -> Self {
        SlotKey { index }
    }

    /// The index of the slot in the connection table.
    pub fn index(self) -> usize {
        self.index
    }
}

impl FourTuple {
    /// If an inbound segment belongs to this tuple.
    ///
    /// The source of the segment is our remote, its destination is our local side.
    pub fn matches(&self, src: Ipv4Address, dst: Ipv4Address, src_port: u16, dst_port: u16)
        -> bool
    {
        (self.local == dst || self.local.is_unspecified())
            && (self.remote == src || self.remote.is_broadcast())
            && self.local_port == dst_port
            && self.remote_port == src_port
    }
}

impl fmt::Display for FourTuple {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}-{}:{}", self.local, self.local_port, self.remote, self.remote_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_segment_len: 128,
            window_len: 512,
            max_seg_size: 1460,
            dont_fragment: false,
            initial_seq: 0x0027_0b6c,
            seq_stride: 0x200,
        }
    }
}

impl<'a> Endpoint<'a> {
    /// Create an endpoint with the default configuration.
    ///
    /// The table has one connection per element of `slots`, each receives a chunk of the `pool`
    /// as its receive buffer when first opened.
    pub fn new<S>(slots: S, pool: Pool<'a>) -> Self
        where S: Into<Slice<'a, Connection<'a>>>,
    {
        Endpoint::with_config(slots, pool, Config::default())
    }

    /// Create an endpoint with a custom configuration.
    pub fn with_config<S>(slots: S, pool: Pool<'a>, config: Config) -> Self
        where S: Into<Slice<'a, Connection<'a>>>,
    {
        Endpoint {
            slots: slots.into(),
            pool,
            isn: IsnGenerator::new(TcpSeqNumber(config.initial_seq), config.seq_stride),
            config,
        }
    }

    /// The configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The number of connection slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Replace the generator of initial sequence numbers.
    pub fn set_isn_generator(&mut self, isn: IsnGenerator) {
        self.isn = isn;
    }

    /// Inspect a connection.
    pub fn get(&self, key: SlotKey) -> Option<&Connection<'a>> {
        self.slots.get(key.index)
    }

    /// Mutably access a connection.
    pub fn get_mut(&mut self, key: SlotKey) -> Option<&mut Connection<'a>> {
        self.slots.get_mut(key.index)
    }

    /// The state of a connection.
    pub fn state(&self, key: SlotKey) -> Option<State> {
        self.get(key).map(Connection::state)
    }

    /// Open a connection in a slot.
    ///
    /// Any connection previously in the slot is forgotten. The SYN is sent by the next `poll`.
    /// Fails with `Exhausted` if the slot had no receive buffer yet and the pool is empty, in
    /// which case the slot is not modified.
    pub fn open(&mut self, key: SlotKey, tuple: FourTuple, keep_half_open: bool) -> Result<()> {
        let connection = self.slots.get_mut(key.index).ok_or(Error::Illegal)?;

        if !connection.has_buffer() {
            match self.pool.reserve() {
                Some(memory) => connection.attach_buffer(memory),
                None => {
                    net_debug!("tcp: no receive buffer left for slot {}", key.index);
                    return Err(Error::Exhausted);
                },
            }
        }

        let isn = self.isn.get_isn();
        connection.reset(tuple, isn, keep_half_open);
        net_trace!("tcp: slot {} opening {} isn {}", key.index, tuple, isn);
        Ok(())
    }

    /// Request a connection to be closed.
    ///
    /// Does nothing if it is closed or closing already.
    pub fn close(&mut self, key: SlotKey) -> Result<()> {
        self.get_mut(key).ok_or(Error::Illegal)?.close();
        Ok(())
    }

    /// Queue outbound data.
    ///
    /// The data stays borrowed until the remote acknowledged all of it. Queueing replaces any data
    /// that is not yet fully acknowledged.
    pub fn send(&mut self, key: SlotKey, data: &'a [u8]) -> Result<()> {
        self.get_mut(key).ok_or(Error::Illegal)?.queue(data)
    }

    /// Retrieve the data received since the last call.
    ///
    /// Returns `Ok(0)` if nothing new arrived. The buffer must be able to hold all received data,
    /// at most the chunk size of the pool.
    pub fn recv(&mut self, key: SlotKey, buffer: &mut [u8]) -> Result<usize> {
        self.get_mut(key).ok_or(Error::Illegal)?.take_received(buffer)
    }

    /// Find the open connection an inbound segment belongs to.
    ///
    /// Scans the table in order and returns the first slot that matches. Closed slots never
    /// match.
    pub fn lookup(&self, src: Ipv4Address, dst: Ipv4Address, src_port: u16, dst_port: u16)
        -> Option<SlotKey>
    {
        self.slots.iter()
            .position(|connection| connection.current != State::Closed
                && connection.tuple.matches(src, dst, src_port, dst_port))
            .map(SlotKey::new)
    }

    /// Advance all connections.
    ///
    /// Must be called at a regular cadence. Each connection emits at most one segment: its SYN,
    /// its FIN or the next chunk of outbound data.
    pub fn poll<S: ip::Send>(&mut self, mut ip: S) {
        let config = &self.config;
        for connection in self.slots.iter_mut() {
            let transmit = match connection.poll(config) {
                Some(transmit) => transmit,
                None => continue,
            };

            match emit(connection, transmit.message, transmit.payload, config, &mut ip) {
                Ok(()) => connection.transmitted(&transmit),
                Err(err) => {
                    net_debug!("tcp: {} could not send {:?}: {}",
                        connection.tuple, transmit.message, err);
                    connection.stalled(&transmit);
                },
            }
        }
    }

    /// Handle the payload of an inbound IP datagram.
    ///
    /// Returns the key of the connection the segment was dispatched to, if any. An answer the
    /// segment requires is sent immediately. Segments that can not be decoded or do not belong to
    /// any open connection are dropped.
    pub fn arrives<S: ip::Send>(&mut self, src: Ipv4Address, dst: Ipv4Address, bytes: &[u8], mut ip: S)
        -> Option<SlotKey>
    {
        let segment = match decode(bytes) {
            Ok(segment) => segment,
            Err(err) => {
                net_debug!("tcp: dropping segment from {}: {}", src, err);
                return None;
            },
        };

        let repr = segment.repr;
        let key = match self.lookup(src, dst, repr.src_port, repr.dst_port) {
            Some(key) => key,
            None => {
                net_trace!("tcp: no connection for {}:{} -> {}:{}",
                    src, repr.src_port, dst, repr.dst_port);
                return None;
            },
        };

        let config = &self.config;
        let connection = self.slots.get_mut(key.index)?;
        let signals = connection.arrives(&repr, segment.payload);

        if let Some(message) = signals.answer {
            if let Err(err) = emit(connection, message, &[], config, &mut ip) {
                net_debug!("tcp: {} could not answer {:?}: {}", connection.tuple, message, err);
            }
        }

        Some(key)
    }
}

/// Encode a segment into a buffer of the ip layer and send it.
fn emit<S: ip::Send>(
    connection: &Connection,
    message: Message,
    payload: &[u8],
    config: &Config,
    ip: &mut S,
) -> Result<()> {
    let buffer = ip.buffer().ok_or(Error::Exhausted)?;
    let payload_len = encode(connection, message, payload, config, buffer)?;
    ip.send(ip::Descriptor {
        protocol: IpProtocol::Tcp,
        dont_fragment: config.dont_fragment,
        src_addr: connection.tuple.local,
        dst_addr: connection.tuple.remote,
        payload_len,
    })
}
