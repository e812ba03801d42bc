/*! Low-level segment access and construction.

The `wire` module deals with the packet *representation*. It provides two levels of
functionality.

 * First, it provides functions to extract fields from sequences of octets, and to insert fields
   into sequences of octets. This happens in the lowercase structure [`tcp_packet`].
 * Second, it provides a compact, high-level representation of header data that can be created
   from parsing and emitted into a sequence of octets. This happens through [`TcpRepr`].

The [`tcp_packet`] structure guarantees that, if its `check_len()` method returned `Ok(())`, then
no field accessor or setter method will panic as long as the data offset field is not changed.
The `new_checked` constructor performs that check. When parsing untrusted input it is
*necessary* to use it. When emitting output, use `new_unchecked_mut` on a buffer of exactly
`TcpRepr::buffer_len()` octets and call `TcpRepr::emit` before any other setter.

[`tcp_packet`]: struct.tcp_packet.html
[`TcpRepr`]: struct.TcpRepr.html

# Examples

To emit a TCP header into an octet buffer, and then parse it back:

```rust
use embtcp::wire::*;
let src_addr = Ipv4Address::new(10, 0, 0, 5);
let dst_addr = Ipv4Address::new(10, 0, 0, 1);
let repr = TcpRepr {
    src_port: 56068,
    dst_port: 80,
    flags: TcpFlags::SYN,
    seq_number: TcpSeqNumber(0x0027_0b6c),
    ack_number: TcpSeqNumber(0),
    window_len: 512,
    max_seg_size: Some(1460),
    payload_len: 0,
};
let mut buffer = vec![0; repr.buffer_len()];
{ // emission
    let packet = tcp_packet::new_unchecked_mut(&mut buffer);
    repr.emit(packet);
    packet.fill_checksum(src_addr, dst_addr);
}
{ // parsing
    let packet = tcp_packet::new_checked(&buffer)
        .expect("truncated segment");
    assert!(packet.verify_checksum(src_addr, dst_addr));
    let parsed = TcpRepr::parse(packet)
        .expect("malformed segment");
    assert_eq!(repr, parsed);
}
```
*/
// Copyright (C) 2016 whitequark@whitequark.org
//
// Field layout and checksum helpers in large parts from `smoltcp` originally distributed under
// 0-clause BSD.

mod field {
    pub(crate) type Field = ::core::ops::Range<usize>;
}

mod error;
pub mod ip;
mod tcp;

pub use self::error::{
    Error,
    Result};

pub use self::ip::{
    Address as Ipv4Address,
    Protocol as IpProtocol};

pub use self::tcp::{
    tcp as tcp_packet,
    Flags as TcpFlags,
    SeqNumber as TcpSeqNumber,
    TcpOption,
    Repr as TcpRepr,
    HEADER_LEN as TCP_HEADER_LEN};
