//! A small TCP client layer for microcontrollers that already have an IPv4 layer.
//!
//! ## Table of contents
//!
//! 1. [Design](#design)
//! 2. [The wire module](wire/index.html)
//! 3. [The tcp layer](layer/tcp/index.html)
//!    1. [Connection states](layer/tcp/enum.State.html)
//!    1. [The endpoint](layer/tcp/struct.Endpoint.html)
//! 4. Internals
//!    1. [The managed module](managed/index.html)
//!
//! ## Design
//!
//! The crate opens a fixed number of outbound TCP connections, pushes request bytes and collects
//! response bytes. It does not bring its own IP layer. Outbound segments are handed to an
//! implementation of [`ip::Send`] and inbound IP payloads are fed into
//! [`Endpoint::arrives`](layer/tcp/struct.Endpoint.html#method.arrives). Progress on the
//! outbound side happens only when the owner calls
//! [`Endpoint::poll`](layer/tcp/struct.Endpoint.html#method.poll) at a regular cadence.
//!
//! Nothing within `embtcp` dynamically allocates memory. The connection table and the receive
//! buffers are handed in by setup code as preallocated storage, and outbound data is borrowed
//! from the caller until the peer acknowledged it. There is no retransmission timer, no
//! congestion control and no listening socket.
//!
//! [`ip::Send`]: layer/ip/trait.Send.html
#![warn(missing_docs)]
#![warn(unreachable_pub)]

// tests should be able to use `std`
#![cfg_attr(all(
    not(feature = "std"),
    not(test)),
no_std)]

#[macro_use] mod macros;
pub mod layer;
pub mod managed;
pub mod wire;
