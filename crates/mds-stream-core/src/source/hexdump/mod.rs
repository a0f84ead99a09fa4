//! Hex dump capture source.
//!
//! Captures are plain text, one packet per line:
//!
//! ```text
//! # comment
//! 0.125 | 05 01 02 03
//! 0601aabb
//! ```
//!
//! The optional `<seconds> |` prefix carries the receive timestamp. Hex
//! bytes may be contiguous or separated by whitespace.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::HexDumpSource;
