//! The TCP layer abstraction.
//!
//! Offers a small table of outbound connections on top of the ip layer. It is a client only:
//! there are no listening sockets, every connection is opened actively by the owner of the
//! [`Endpoint`].
//!
//! There are a number of simplifying assumptions compared to a full implementation of RFC793:
//! * At most one segment is unacknowledged per connection. The next chunk of outbound data is
//!   only sent after the previous one was acknowledged.
//! * There is no retransmission timer. A connection whose segment got lost stays in its waiting
//!   state until the owner reopens the slot.
//! * Inbound segments are expected in order. Their sequence numbers are not validated, only the
//!   acknowledgement number of every segment is checked against what we sent.
//! * The checksum of inbound segments is not verified.
//!
//! ## Structure
//!
//! The [`Endpoint`] stores a fixed array of [`Connection`]s which are referred to by a
//! [`SlotKey`]. Keys are chosen by the owner and stay valid across open and close cycles of the
//! connection in that slot. Each connection owns a receive buffer, reserved from a [`Pool`] the
//! first time its slot is opened.
//!
//! [`Endpoint`]: struct.Endpoint.html
//! [`Connection`]: struct.Connection.html
//! [`SlotKey`]: struct.SlotKey.html
//! [`Pool`]: ../../managed/struct.Pool.html
//!
//! Open and close requests are posted into a single-slot mailbox per connection. A second request
//! before the first was serviced overwrites it. The periodic [`Endpoint::poll`] services these
//! requests and pushes outbound data in chunks, while [`Endpoint::arrives`] feeds inbound segments
//! into the state machine and emits the answer they require.
//!
//! [`Endpoint::poll`]: struct.Endpoint.html#method.poll
//! [`Endpoint::arrives`]: struct.Endpoint.html#method.arrives
//!
//! ## Deviations
//!
//! A FIN received in the `Established` state moves the connection to `HalfOpen`. By default our
//! own FIN follows on the next poll but a connection opened with `keep_half_open` stays half open
//! until it is explicitly closed, while the peer may still acknowledge data we send.
mod connection;
mod endpoint;
mod isn;
mod packet;


pub use connection::{
    Command,
    Connection,
    Mailbox,
    Receive,
    Send,
    Signals,
    State,
    Transmit};

pub use endpoint::{
    Config,
    Endpoint,
    FourTuple,
    SlotKey,
    DEFAULT_CONNECTIONS};

pub use isn::IsnGenerator;

pub use packet::{
    decode,
    encode,
    Message,
    Segment};
