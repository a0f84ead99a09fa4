use thiserror::Error;

/// Status code reported for a successful parse.
pub const STATUS_OK: i32 = 0;

/// Errors returned by stream packet parsing.
///
/// Each variant maps to a stable negative status code (`errno` style), so
/// callers that only carry integers across a boundary can still tell the
/// failure kinds apart.
///
/// # Examples
/// ```
/// use mds_stream_core::StreamError;
///
/// let err = StreamError::PayloadTooLarge { len: 64, capacity: 63 };
/// assert_eq!(err.code(), -90);
/// assert!(err.to_string().contains("payload too large"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("invalid argument: empty buffer")]
    InvalidArgument,
    #[error("packet too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("payload too large: {len} bytes exceeds capacity of {capacity}")]
    PayloadTooLarge { len: usize, capacity: usize },
}

impl StreamError {
    /// Negative status code for this error (`-EINVAL`, `-ENODATA`, `-EMSGSIZE`).
    pub const fn code(&self) -> i32 {
        match self {
            StreamError::InvalidArgument => -22,
            StreamError::TooShort { .. } => -61,
            StreamError::PayloadTooLarge { .. } => -90,
        }
    }

    /// Stable identifier used in analysis reports.
    pub const fn id(&self) -> &'static str {
        match self {
            StreamError::InvalidArgument => "MDS-INVALID-ARGUMENT",
            StreamError::TooShort { .. } => "MDS-TOO-SHORT",
            StreamError::PayloadTooLarge { .. } => "MDS-PAYLOAD-TOO-LARGE",
        }
    }
}

/// Collapse a parse result into its status code (`0` on success).
///
/// # Examples
/// ```
/// use mds_stream_core::{parse_stream_packet, status_code};
///
/// assert_eq!(status_code(&parse_stream_packet(&[0x01, 0xaa])), 0);
/// assert_eq!(status_code(&parse_stream_packet(&[])), -22);
/// ```
pub fn status_code<T>(result: &Result<T, StreamError>) -> i32 {
    match result {
        Ok(_) => STATUS_OK,
        Err(err) => err.code(),
    }
}
