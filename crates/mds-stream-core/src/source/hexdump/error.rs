use thiserror::Error;

#[derive(Debug, Error)]
pub enum HexDumpError {
    #[error("invalid timestamp '{value}'")]
    InvalidTimestamp { value: String },
    #[error("invalid hex bytes: {message}")]
    InvalidHex { message: String },
}
