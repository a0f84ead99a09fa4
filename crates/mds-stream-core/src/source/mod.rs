pub mod hexdump;

pub use hexdump::HexDumpSource;

use thiserror::Error;

/// Raw packet bytes as read from a capture.
#[derive(Debug, Clone)]
pub struct PacketEvent {
    pub ts: Option<f64>,
    /// 1-based line (or record) number in the capture.
    pub line: usize,
    pub data: Vec<u8>,
}

pub trait PacketSource {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("capture parse error at line {line}: {message}")]
    Hex { line: usize, message: String },
}
