use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::layer::{Error, Result};
use crate::managed::Partial;
use crate::wire::{TcpRepr, TcpSeqNumber};

use super::endpoint::{Config, FourTuple};
use super::packet::Message;

/// The state of a connection.
///
/// Includes current state machine state, the addressing that stays constant during a connection,
/// and the in- and out-buffers.
#[derive(Debug)]
pub struct Connection<'a> {
    /// The addresses and ports of both sides.
    pub tuple: FourTuple,

    /// The current state of the state machine.
    pub current: State,

    /// The sending state.
    pub send: Send<'a>,

    /// The receiving state.
    pub recv: Receive<'a>,

    /// The pending open or close request.
    pub command: Mailbox,

    /// Stay half open when the remote closes its side.
    ///
    /// Otherwise our own FIN is queued as soon as the remote FIN arrives.
    pub keep_half_open: bool,
}

/// The sending half of a connection.
#[derive(Clone, Copy, Debug, Default)]
pub struct Send<'a> {
    /// The first sequence number not yet acknowledged by the remote.
    pub seq: TcpSeqNumber,

    /// The sequence length of the one segment awaiting its acknowledgement.
    ///
    /// One for SYN and FIN, the payload length for data. Zero when nothing is outstanding.
    pub in_flight: usize,

    /// Outbound data not yet acknowledged, including the chunk currently in flight.
    pub pending: &'a [u8],
}

/// The receiving half of a connection.
#[derive(Debug, Default)]
pub struct Receive<'a> {
    /// The next expected sequence number, sent as our acknowledgement number.
    pub next: TcpSeqNumber,

    buffer: Option<RecvBuffer<'a>>,
}

#[derive(Debug)]
struct RecvBuffer<'a> {
    data: Partial<&'a mut [u8]>,
    /// Set by the receive path, cleared by the reader.
    ready: AtomicBool,
}

/// State enum of the statemachine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum State {
    /// Marker state for an unopened or finished connection.
    Closed,

    /// An open request whose SYN could not yet be handed to the ip layer.
    Opening,

    /// Sent our SYN, waiting for the answering SYN.
    WaitSynAck,

    /// An open connection.
    Established,

    /// An open connection with a data segment awaiting its acknowledgement.
    EstabWaitAck,

    /// Closed our side of the connection, waiting for the ACK of our FIN.
    WaitFinAck,

    /// The remote closed its side, we have not.
    HalfOpen,

    /// Half open with a data segment awaiting its acknowledgement.
    HalfOpenWaitAck,

    /// Our FIN was acknowledged, waiting for the remote FIN.
    HalfClosed,

    /// Closed our side after the remote closed its side, waiting for the final ACK.
    WaitLastAck,
}

/// A request to the periodic driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Nothing to do.
    None = 0,
    /// Send a SYN.
    Open = 1,
    /// Send a FIN once the connection is open.
    Close = 2,
}

/// A single-slot mailbox of commands.
///
/// Posting overwrites any command not yet serviced. The slot is a single atomic byte so that a
/// request may be posted from a different execution context than the one polling the endpoint.
#[derive(Debug, Default)]
pub struct Mailbox(AtomicU8);

/// Output signals of the model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Signals {
    /// Need to send some tcp answer.
    pub answer: Option<Message>,
}

/// A segment the periodic driver wants to emit.
///
/// The connection is only changed when the segment was actually handed to the ip layer, see
/// [`Connection::transmitted`] and [`Connection::stalled`].
///
/// [`Connection::transmitted`]: struct.Connection.html#method.transmitted
/// [`Connection::stalled`]: struct.Connection.html#method.stalled
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transmit<'a> {
    /// The kind of segment.
    pub message: Message,

    /// The payload, empty for anything but data.
    pub payload: &'a [u8],

    /// The state after a successful transmission.
    pub next: State,
}

impl State {
    /// If a segment of ours is outstanding in this state.
    ///
    /// Any acknowledgement that does not match the outstanding segment resets the connection.
    pub fn awaits_ack(self) -> bool {
        match self {
            State::WaitSynAck
            | State::EstabWaitAck
            | State::HalfOpenWaitAck
            | State::WaitFinAck
            | State::WaitLastAck => true,
            _ => false,
        }
    }

    /// If the remote may still send data in this state.
    pub fn accepts_data(self) -> bool {
        match self {
            State::Established
            | State::EstabWaitAck
            | State::WaitFinAck
            | State::HalfClosed => true,
            _ => false,
        }
    }
}

impl Default for State {
    fn default() -> Self {
        State::Closed
    }
}

impl Command {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Command::Open,
            2 => Command::Close,
            _ => Command::None,
        }
    }
}

impl Mailbox {
    /// Post a command, overwriting the previous one.
    pub fn post(&self, command: Command) {
        self.0.store(command as u8, Ordering::Release)
    }

    /// Look at the current command without removing it.
    pub fn peek(&self) -> Command {
        Command::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Remove the current command.
    pub fn clear(&self) {
        self.post(Command::None)
    }

    /// Remove the command only if it is still `command`.
    ///
    /// Returns whether it was removed. A command posted in the meantime stays in the mailbox.
    pub fn take(&self, command: Command) -> bool {
        self.0.compare_exchange(command as u8, Command::None as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl<'a> Connection<'a> {
    /// Return the current state.
    pub fn state(&self) -> State {
        self.current
    }

    /// If a receive buffer was already attached.
    pub fn has_buffer(&self) -> bool {
        self.recv.buffer.is_some()
    }

    /// Attach the receive buffer this connection keeps for its lifetime.
    pub fn attach_buffer(&mut self, memory: &'a mut [u8]) {
        self.recv.buffer = Some(RecvBuffer {
            data: Partial::new(memory),
            ready: AtomicBool::new(false),
        });
    }

    /// The number of bytes received but not yet read.
    pub fn received_len(&self) -> usize {
        self.recv.buffer.as_ref().map_or(0, |buffer| buffer.data.len())
    }

    /// Reinitialize the connection for a new active open.
    ///
    /// All sequence state and buffered data is discarded, the receive buffer memory stays. The
    /// SYN is sent by the next poll.
    pub fn reset(&mut self, tuple: FourTuple, isn: TcpSeqNumber, keep_half_open: bool) {
        self.tuple = tuple;
        self.current = State::Closed;
        self.send = Send {
            seq: isn,
            in_flight: 0,
            pending: &[],
        };
        self.recv.next = TcpSeqNumber(0);
        if let Some(buffer) = &mut self.recv.buffer {
            buffer.data.clear();
            buffer.ready.store(false, Ordering::Release);
        }
        self.keep_half_open = keep_half_open;
        self.command.post(Command::Open);
    }

    /// Request our side to be closed.
    ///
    /// Does nothing if the connection is closed or already closing. A close posted while an open
    /// request is still pending overwrites and thereby cancels it. A connection whose SYN was
    /// never handed to the ip layer is closed immediately.
    pub fn close(&mut self) {
        match self.current {
            State::Closed if self.command.peek() != Command::Open => (),
            State::Opening => {
                self.command.clear();
                self.change_state(State::Closed);
            },
            State::WaitFinAck | State::HalfClosed | State::WaitLastAck => (),
            _ => self.command.post(Command::Close),
        }
    }

    /// Queue outbound data, replacing whatever was queued before.
    pub fn queue(&mut self, data: &'a [u8]) -> Result<()> {
        if self.current == State::Closed {
            return Err(Error::NotOpen);
        }

        self.send.pending = data;
        Ok(())
    }

    /// Copy out all data received since the last call.
    ///
    /// Returns `Ok(0)` when nothing new arrived.
    pub fn take_received(&mut self, out: &mut [u8]) -> Result<usize> {
        let buffer = match &mut self.recv.buffer {
            Some(buffer) => buffer,
            None => return Ok(0),
        };

        if !buffer.ready.load(Ordering::Acquire) {
            return Ok(0);
        }

        let data = buffer.data.as_slice();
        let len = data.len();
        let out = out.get_mut(..len).ok_or(Error::BadSize)?;
        out.copy_from_slice(data);
        buffer.data.clear();
        buffer.ready.store(false, Ordering::Release);
        Ok(len)
    }

    /// Determine the segment the periodic driver should send next.
    ///
    /// Returns `None` while a segment is outstanding or there is nothing to do.
    pub fn poll(&self, config: &Config) -> Option<Transmit<'a>> {
        let syn = Transmit {
            message: Message::Syn,
            payload: &[],
            next: State::WaitSynAck,
        };

        match self.current {
            State::Closed if self.command.peek() == Command::Open => Some(syn),
            State::Opening => Some(syn),
            State::Established | State::HalfOpen => {
                let established = self.current == State::Established;
                let pending: &'a [u8] = self.send.pending;
                if self.command.peek() == Command::Close {
                    Some(Transmit {
                        message: Message::Fin,
                        payload: &[],
                        next: if established { State::WaitFinAck } else { State::WaitLastAck },
                    })
                } else if !pending.is_empty() {
                    let chunk = pending.len().min(config.max_segment_len);
                    Some(Transmit {
                        message: Message::Data,
                        payload: &pending[..chunk],
                        next: if established { State::EstabWaitAck } else { State::HalfOpenWaitAck },
                    })
                } else {
                    None
                }
            },
            _ => None,
        }
    }

    /// Record that a segment from `poll` was handed to the ip layer.
    pub fn transmitted(&mut self, transmit: &Transmit) {
        net_trace!("tcp: {} -> {:?} ({:?})", self.tuple, transmit.next, transmit.message);

        self.in_flight_for(transmit);
        self.current = transmit.next;
        match transmit.message {
            Message::Syn => { self.command.take(Command::Open); },
            Message::Fin => { self.command.take(Command::Close); },
            _ => (),
        }
    }

    /// Record that the ip layer refused a segment from `poll`.
    ///
    /// A refused SYN parks the connection in `Opening`, from where every poll retries it. Data
    /// and FIN are simply determined again on the next poll.
    pub fn stalled(&mut self, transmit: &Transmit) {
        if transmit.message == Message::Syn {
            net_trace!("tcp: {} -> {:?}", self.tuple, State::Opening);
            self.command.take(Command::Open);
            self.current = State::Opening;
        }
    }

    fn in_flight_for(&mut self, transmit: &Transmit) {
        self.send.in_flight = match transmit.message {
            Message::Syn | Message::Fin => 1,
            Message::Data => transmit.payload.len(),
            _ => 0,
        };
    }

    /// Handle an incoming segment.
    ///
    /// Only segments carrying an acknowledgement of exactly what we sent are considered. Any other
    /// acknowledgement resets the connection if we are waiting for one and is ignored otherwise.
    pub fn arrives(&mut self, segment: &TcpRepr, payload: &[u8]) -> Signals {
        let flags = segment.flags;

        if !flags.ack() {
            net_trace!("tcp: {} ignoring segment without ACK", self.tuple);
            return Signals::default();
        }

        let expected = self.send.seq + self.send.in_flight;
        if segment.ack_number != expected {
            if !self.current.awaits_ack() {
                net_trace!("tcp: {} ignoring ack {} in {:?}",
                    self.tuple, segment.ack_number, self.current);
                return Signals::default();
            }

            net_debug!("tcp: {} ack {} does not match {}, resetting",
                self.tuple, segment.ack_number, expected);
            self.change_state(State::Closed);
            return Signals { answer: Some(Message::Rst) };
        }

        if flags.rst() {
            self.change_state(State::Closed);
            Signals::default()
        } else if flags.syn() {
            self.arrives_syn(segment)
        } else if flags.fin() {
            self.arrives_fin(segment, payload)
        } else {
            self.arrives_ack(segment, payload)
        }
    }

    fn arrives_syn(&mut self, segment: &TcpRepr) -> Signals {
        if self.current != State::WaitSynAck {
            net_trace!("tcp: {} ignoring SYN in {:?}", self.tuple, self.current);
            return Signals::default();
        }

        self.confirm();
        self.recv.next = segment.seq_number + 1;
        self.change_state(State::Established);
        Signals { answer: Some(Message::Ack) }
    }

    fn arrives_fin(&mut self, segment: &TcpRepr, payload: &[u8]) -> Signals {
        match self.current {
            State::EstabWaitAck => {
                self.confirm_data();
                self.change_state(State::Established);
            },
            State::HalfOpenWaitAck => {
                self.confirm_data();
                self.change_state(State::HalfOpen);
            },
            _ => (),
        }

        if self.current.accepts_data() {
            self.deliver(payload);
        }

        match self.current {
            State::Established => {
                self.change_state(State::HalfOpen);
                if !self.keep_half_open {
                    self.command.post(Command::Close);
                }
            },
            State::WaitFinAck | State::HalfClosed => {
                self.confirm();
                self.change_state(State::Closed);
            },
            other => {
                net_trace!("tcp: {} unexpected FIN in {:?}", self.tuple, other);
            },
        }

        self.recv.next = segment.seq_number + payload.len() + 1;
        Signals { answer: Some(Message::Ack) }
    }

    fn arrives_ack(&mut self, segment: &TcpRepr, payload: &[u8]) -> Signals {
        match self.current {
            State::WaitSynAck => {
                net_trace!("tcp: {} ignoring ACK without SYN", self.tuple);
                return Signals::default();
            },
            State::WaitFinAck => {
                self.confirm();
                self.change_state(State::HalfClosed);
            },
            State::WaitLastAck => {
                self.confirm();
                self.change_state(State::Closed);
            },
            State::EstabWaitAck => {
                self.confirm_data();
                self.change_state(State::Established);
            },
            State::HalfOpenWaitAck => {
                self.confirm_data();
                self.change_state(State::HalfOpen);
            },
            _ => (),
        }

        if payload.is_empty() || !self.current.accepts_data() {
            return Signals::default();
        }

        self.deliver(payload);
        self.recv.next = segment.seq_number + payload.len();
        Signals { answer: Some(Message::Ack) }
    }

    /// Advance past the outstanding segment.
    fn confirm(&mut self) {
        self.send.seq += self.send.in_flight;
        self.send.in_flight = 0;
    }

    /// Advance past the outstanding data chunk and drop it from the pending data.
    fn confirm_data(&mut self) {
        let acked = self.send.in_flight;
        self.send.pending = self.send.pending.get(acked..).unwrap_or(&[]);
        self.confirm();
    }

    fn deliver(&mut self, payload: &[u8]) {
        if payload.is_empty() {
            return;
        }

        let buffer = match &mut self.recv.buffer {
            Some(buffer) => buffer,
            None => {
                net_debug!("tcp: {} dropping {} bytes, no receive buffer", self.tuple, payload.len());
                return;
            },
        };

        let taken = buffer.data.extend_truncated(payload);
        if taken < payload.len() {
            net_debug!("tcp: {} receive buffer full, dropped {} bytes",
                self.tuple, payload.len() - taken);
        }

        if taken > 0 {
            buffer.ready.store(true, Ordering::Release);
        }
    }

    fn change_state(&mut self, new: State) {
        net_trace!("tcp: {} {:?} -> {:?}", self.tuple, self.current, new);
        self.current = new;
    }
}

impl Default for Connection<'_> {
    fn default() -> Self {
        Connection {
            tuple: FourTuple::default(),
            current: State::Closed,
            send: Send::default(),
            recv: Receive::default(),
            command: Mailbox::default(),
            keep_half_open: false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::wire::{Ipv4Address, TcpFlags};

    fn tuple() -> FourTuple {
        FourTuple {
            local: Ipv4Address::new(10, 0, 0, 5),
            remote: Ipv4Address::new(10, 0, 0, 1),
            local_port: 40000,
            remote_port: 80,
        }
    }

    fn segment(flags: TcpFlags, seq: u32, ack: TcpSeqNumber, payload_len: usize) -> TcpRepr {
        TcpRepr {
            src_port: 80,
            dst_port: 40000,
            flags,
            seq_number: TcpSeqNumber(seq),
            ack_number: ack,
            window_len: 1024,
            max_seg_size: None,
            payload_len,
        }
    }

    fn established(memory: &mut [u8]) -> Connection {
        let mut conn = Connection::default();
        conn.attach_buffer(memory);
        conn.reset(tuple(), TcpSeqNumber(1000), false);
        let syn = conn.poll(&Config::default()).unwrap();
        conn.transmitted(&syn);
        let synack = segment(TcpFlags::SYN | TcpFlags::ACK, 5000, TcpSeqNumber(1001), 0);
        assert_eq!(conn.arrives(&synack, &[]).answer, Some(Message::Ack));
        assert_eq!(conn.state(), State::Established);
        conn
    }

    #[test]
    fn mailbox_overwrites() {
        let mailbox = Mailbox::default();
        assert_eq!(mailbox.peek(), Command::None);
        mailbox.post(Command::Open);
        mailbox.post(Command::Close);
        assert_eq!(mailbox.peek(), Command::Close);
        mailbox.clear();
        assert_eq!(mailbox.peek(), Command::None);
    }

    #[test]
    fn closed_does_nothing() {
        let conn = Connection::default();
        assert_eq!(conn.poll(&Config::default()), None);
    }

    #[test]
    fn handshake_sequence_numbers() {
        let mut memory = [0; 16];
        let conn = established(&mut memory);
        assert_eq!(conn.send.seq, TcpSeqNumber(1001));
        assert_eq!(conn.send.in_flight, 0);
        assert_eq!(conn.recv.next, TcpSeqNumber(5001));
    }

    #[test]
    fn data_is_chunked() {
        let mut memory = [0; 16];
        let data = [0x55u8; 300];
        let mut conn = established(&mut memory);
        conn.queue(&data).unwrap();

        let config = Config::default();
        let first = conn.poll(&config).unwrap();
        assert_eq!(first.message, Message::Data);
        assert_eq!(first.payload.len(), 128);
        conn.transmitted(&first);
        assert_eq!(conn.state(), State::EstabWaitAck);
        assert_eq!(conn.poll(&config), None);

        let ack = segment(TcpFlags::ACK, 5001, TcpSeqNumber(1001 + 128), 0);
        assert_eq!(conn.arrives(&ack, &[]).answer, None);
        assert_eq!(conn.state(), State::Established);
        assert_eq!(conn.send.pending.len(), 300 - 128);
        assert_eq!(conn.send.seq, TcpSeqNumber(1001 + 128));
    }

    #[test]
    fn refused_syn_parks_in_opening() {
        let mut conn = Connection::default();
        conn.reset(tuple(), TcpSeqNumber(7), false);
        let syn = conn.poll(&Config::default()).unwrap();
        conn.stalled(&syn);
        assert_eq!(conn.state(), State::Opening);
        assert_eq!(conn.command.peek(), Command::None);
        assert_eq!(conn.poll(&Config::default()).map(|t| t.message), Some(Message::Syn));
    }

    #[test]
    fn fin_payload_is_delivered_first() {
        let mut memory = [0; 16];
        let mut conn = established(&mut memory);
        let fin = segment(TcpFlags::FIN | TcpFlags::ACK, 5001, TcpSeqNumber(1001), 5);
        assert_eq!(conn.arrives(&fin, b"hello").answer, Some(Message::Ack));
        assert_eq!(conn.state(), State::HalfOpen);
        assert_eq!(conn.recv.next, TcpSeqNumber(5001 + 5 + 1));
        assert_eq!(conn.command.peek(), Command::Close);

        let mut out = [0; 16];
        assert_eq!(conn.take_received(&mut out), Ok(5));
        assert_eq!(&out[..5], b"hello");
    }

    #[test]
    fn data_is_truncated_but_fully_acknowledged() {
        let mut memory = [0; 4];
        let mut conn = established(&mut memory);
        let data = segment(TcpFlags::ACK | TcpFlags::PSH, 5001, TcpSeqNumber(1001), 6);
        assert_eq!(conn.arrives(&data, b"abcdef").answer, Some(Message::Ack));
        assert_eq!(conn.recv.next, TcpSeqNumber(5007));
        assert_eq!(conn.received_len(), 4);

        let mut small = [0; 2];
        assert_eq!(conn.take_received(&mut small), Err(Error::BadSize));
        let mut out = [0; 4];
        assert_eq!(conn.take_received(&mut out), Ok(4));
        assert_eq!(&out, b"abcd");
        assert_eq!(conn.take_received(&mut out), Ok(0));
    }

    #[test]
    fn rst_closes_silently() {
        let mut memory = [0; 16];
        let mut conn = established(&mut memory);
        let rst = segment(TcpFlags::RST | TcpFlags::ACK, 5001, TcpSeqNumber(1001), 0);
        assert_eq!(conn.arrives(&rst, &[]).answer, None);
        assert_eq!(conn.state(), State::Closed);
    }

    #[test]
    fn close_is_idempotent() {
        let mut memory = [0; 16];
        let mut conn = established(&mut memory);
        conn.close();
        let fin = conn.poll(&Config::default()).unwrap();
        assert_eq!(fin.message, Message::Fin);
        conn.transmitted(&fin);
        assert_eq!(conn.state(), State::WaitFinAck);
        conn.close();
        assert_eq!(conn.command.peek(), Command::None);
        assert_eq!(conn.poll(&Config::default()), None);
    }

    #[test]
    fn close_cancels_pending_open() {
        let mut conn = Connection::default();
        conn.reset(tuple(), TcpSeqNumber(7), false);
        conn.close();
        assert_eq!(conn.poll(&Config::default()), None);
        assert_eq!(conn.state(), State::Closed);
    }

    #[derive(Clone, Copy, Debug)]
    enum Inbound {
        SynAck,
        Ack,
        Data,
        Fin,
        Rst,
        WithoutAck,
        WrongAck,
    }

    const INBOUND: [Inbound; 7] = [
        Inbound::SynAck,
        Inbound::Ack,
        Inbound::Data,
        Inbound::Fin,
        Inbound::Rst,
        Inbound::WithoutAck,
        Inbound::WrongAck,
    ];

    /// A connection placed directly into `state`, its SYN or FIN or one data byte outstanding if
    /// it awaits an acknowledgement.
    fn in_state(state: State, memory: &mut [u8]) -> Connection {
        let mut conn = Connection::default();
        conn.attach_buffer(memory);
        conn.tuple = tuple();
        conn.current = state;
        conn.send.seq = TcpSeqNumber(100);
        conn.send.pending = b"x";
        if state.awaits_ack() {
            conn.send.in_flight = 1;
        }
        conn.recv.next = TcpSeqNumber(5000);
        conn
    }

    fn inbound(event: Inbound, conn: &Connection) -> (TcpRepr, &'static [u8]) {
        let matching = conn.send.seq + conn.send.in_flight;
        let (flags, ack, payload): (TcpFlags, TcpSeqNumber, &'static [u8]) = match event {
            Inbound::SynAck => (TcpFlags::SYN | TcpFlags::ACK, matching, &[][..]),
            Inbound::Ack => (TcpFlags::ACK, matching, &[][..]),
            Inbound::Data => (TcpFlags::ACK | TcpFlags::PSH, matching, &b"data"[..]),
            Inbound::Fin => (TcpFlags::FIN | TcpFlags::ACK, matching, &[][..]),
            Inbound::Rst => (TcpFlags::RST | TcpFlags::ACK, matching, &[][..]),
            Inbound::WithoutAck => (TcpFlags::SYN, TcpSeqNumber(0), &[][..]),
            Inbound::WrongAck => (TcpFlags::ACK, matching + 7, &[][..]),
        };
        (segment(flags, 5000, ack, payload.len()), payload)
    }

    #[test]
    fn every_state_and_segment() {
        use super::State::*;
        const ACK: Option<Message> = Some(Message::Ack);
        const RST: Option<Message> = Some(Message::Rst);

        // Columns follow `INBOUND`.
        let table: [(State, [(State, Option<Message>); 7]); 10] = [
            (Closed, [(Closed, None), (Closed, None), (Closed, None), (Closed, ACK),
                (Closed, None), (Closed, None), (Closed, None)]),
            (Opening, [(Opening, None), (Opening, None), (Opening, None), (Opening, ACK),
                (Closed, None), (Opening, None), (Opening, None)]),
            (WaitSynAck, [(Established, ACK), (WaitSynAck, None), (WaitSynAck, None),
                (WaitSynAck, ACK), (Closed, None), (WaitSynAck, None), (Closed, RST)]),
            (Established, [(Established, None), (Established, None), (Established, ACK),
                (HalfOpen, ACK), (Closed, None), (Established, None), (Established, None)]),
            (EstabWaitAck, [(EstabWaitAck, None), (Established, None), (Established, ACK),
                (HalfOpen, ACK), (Closed, None), (EstabWaitAck, None), (Closed, RST)]),
            (WaitFinAck, [(WaitFinAck, None), (HalfClosed, None), (HalfClosed, ACK),
                (Closed, ACK), (Closed, None), (WaitFinAck, None), (Closed, RST)]),
            (HalfOpen, [(HalfOpen, None), (HalfOpen, None), (HalfOpen, None), (HalfOpen, ACK),
                (Closed, None), (HalfOpen, None), (HalfOpen, None)]),
            (HalfOpenWaitAck, [(HalfOpenWaitAck, None), (HalfOpen, None), (HalfOpen, None),
                (HalfOpen, ACK), (Closed, None), (HalfOpenWaitAck, None), (Closed, RST)]),
            (HalfClosed, [(HalfClosed, None), (HalfClosed, None), (HalfClosed, ACK),
                (Closed, ACK), (Closed, None), (HalfClosed, None), (HalfClosed, None)]),
            (WaitLastAck, [(WaitLastAck, None), (Closed, None), (Closed, None),
                (WaitLastAck, ACK), (Closed, None), (WaitLastAck, None), (Closed, RST)]),
        ];

        for &(state, expected) in table.iter() {
            for (&event, &(next, answer)) in INBOUND.iter().zip(expected.iter()) {
                let mut memory = [0; 16];
                let mut conn = in_state(state, &mut memory);
                conn.keep_half_open = true;
                let (repr, payload) = inbound(event, &conn);
                let signals = conn.arrives(&repr, payload);
                assert_eq!((conn.state(), signals.answer), (next, answer),
                    "{:?} in {:?}", event, state);
            }
        }
    }

    #[test]
    fn every_state_and_command() {
        use super::State::*;
        let syn = Some((Message::Syn, WaitSynAck));

        // Columns are the mailbox holding `None`, `Open` and `Close`.
        let table: [(State, [Option<(Message, State)>; 3]); 10] = [
            (Closed, [None, syn, None]),
            (Opening, [syn, syn, syn]),
            (WaitSynAck, [None, None, None]),
            (Established, [
                Some((Message::Data, EstabWaitAck)),
                Some((Message::Data, EstabWaitAck)),
                Some((Message::Fin, WaitFinAck))]),
            (EstabWaitAck, [None, None, None]),
            (WaitFinAck, [None, None, None]),
            (HalfOpen, [
                Some((Message::Data, HalfOpenWaitAck)),
                Some((Message::Data, HalfOpenWaitAck)),
                Some((Message::Fin, WaitLastAck))]),
            (HalfOpenWaitAck, [None, None, None]),
            (HalfClosed, [None, None, None]),
            (WaitLastAck, [None, None, None]),
        ];

        let commands = [Command::None, Command::Open, Command::Close];
        for &(state, expected) in table.iter() {
            for (&command, &outcome) in commands.iter().zip(expected.iter()) {
                let mut memory = [0; 16];
                let conn = in_state(state, &mut memory);
                conn.command.post(command);
                let transmit = conn.poll(&Config::default());
                assert_eq!(transmit.map(|t| (t.message, t.next)), outcome,
                    "{:?} in {:?}", command, state);
                assert_eq!(conn.state(), state);
            }
        }
    }

    #[test]
    fn close_in_opening_closes() {
        let mut conn = Connection::default();
        conn.reset(tuple(), TcpSeqNumber(7), false);
        let syn = conn.poll(&Config::default()).unwrap();
        conn.stalled(&syn);
        assert_eq!(conn.state(), State::Opening);

        conn.close();
        assert_eq!(conn.state(), State::Closed);
        assert_eq!(conn.command.peek(), Command::None);
        assert_eq!(conn.poll(&Config::default()), None);
    }

    #[test]
    fn transmitted_keeps_a_newer_command() {
        let mut conn = Connection::default();
        conn.reset(tuple(), TcpSeqNumber(7), false);
        let syn = conn.poll(&Config::default()).unwrap();
        conn.command.post(Command::Close);
        conn.transmitted(&syn);
        assert_eq!(conn.state(), State::WaitSynAck);
        assert_eq!(conn.command.peek(), Command::Close);

        let mailbox = Mailbox::default();
        mailbox.post(Command::Open);
        assert!(!mailbox.take(Command::Close));
        assert!(mailbox.take(Command::Open));
        assert_eq!(mailbox.peek(), Command::None);
    }
}
