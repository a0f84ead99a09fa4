//! MDS stream packet decoding.
//!
//! Stream data travels in HID input report `0x06`. Each packet is one header
//! byte, whose low five bits carry a rolling sequence number, followed by at
//! most 63 payload bytes. The parser copies the payload into fixed storage
//! and rejects empty or oversized buffers; the sequence helpers validate
//! consecutive packets modulo 32.
//!
//! Byte offsets and limits live in `layout`, safe reads in `reader`.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod sequence;

pub use error::{STATUS_OK, StreamError, status_code};
pub use parser::{StreamPacket, parse_stream_packet, parse_stream_report};
pub use sequence::{
    SequenceCheck, SequenceTracker, extract_sequence, next_sequence, sequence_gap,
    validate_sequence,
};
