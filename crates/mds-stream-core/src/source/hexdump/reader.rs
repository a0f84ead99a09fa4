use super::error::HexDumpError;
use super::layout;

/// One decoded capture line.
#[derive(Debug, Clone, PartialEq)]
pub struct HexLine {
    pub ts: Option<f64>,
    pub data: Vec<u8>,
}

/// Decode a single capture line.
///
/// Returns `Ok(None)` for blank lines and comments.
///
/// # Examples
/// This helper is part of an internal module, so the example is marked as
/// text example.
/// ```text
/// use mds_stream_core::source::hexdump::reader::parse_line;
///
/// let line = parse_line("1.5 | 05 01 02").unwrap().unwrap();
/// assert_eq!(line.ts, Some(1.5));
/// assert_eq!(line.data, vec![0x05, 0x01, 0x02]);
/// ```
pub fn parse_line(line: &str) -> Result<Option<HexLine>, HexDumpError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(layout::COMMENT_PREFIX) {
        return Ok(None);
    }

    let (ts, bytes) = match line.split_once(layout::TIMESTAMP_SEPARATOR) {
        Some((ts, bytes)) => (Some(parse_timestamp(ts.trim())?), bytes),
        None => (None, line),
    };

    let digits: String = bytes.split_whitespace().collect();
    let data = hex::decode(&digits).map_err(|e| HexDumpError::InvalidHex {
        message: e.to_string(),
    })?;
    Ok(Some(HexLine { ts, data }))
}

fn parse_timestamp(value: &str) -> Result<f64, HexDumpError> {
    match value.parse::<f64>() {
        Ok(ts) if ts.is_finite() && ts >= 0.0 => Ok(ts),
        _ => Err(HexDumpError::InvalidTimestamp {
            value: value.to_string(),
        }),
    }
}
