use super::error::StreamError;
use super::layout;
use super::reader::StreamReader;
use super::sequence::extract_sequence;

/// One decoded stream packet.
///
/// Payload bytes are stored left-aligned in fixed storage; bytes past
/// `payload_len()` are always zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamPacket {
    sequence: u8,
    data: [u8; layout::MAX_CHUNK_DATA_LEN],
    data_len: usize,
}

impl StreamPacket {
    pub const CAPACITY: usize = layout::MAX_CHUNK_DATA_LEN;

    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    pub fn payload(&self) -> &[u8] {
        &self.data[..self.data_len]
    }

    pub fn payload_len(&self) -> usize {
        self.data_len
    }

    /// Full fixed-size storage, including the zeroed tail.
    pub fn storage(&self) -> &[u8; layout::MAX_CHUNK_DATA_LEN] {
        &self.data
    }
}

/// Parse a stream packet (header byte followed by payload).
///
/// The buffer must not carry the HID report id; see [`parse_stream_report`]
/// for that framing.
///
/// # Examples
/// ```
/// use mds_stream_core::parse_stream_packet;
///
/// let packet = parse_stream_packet(&[0x05, 0x01, 0x02, 0x03, 0x04, 0x05])?;
/// assert_eq!(packet.sequence(), 5);
/// assert_eq!(packet.payload(), &[0x01, 0x02, 0x03, 0x04, 0x05]);
/// assert_eq!(packet.payload_len(), 5);
/// # Ok::<(), mds_stream_core::StreamError>(())
/// ```
///
/// # Errors
/// `InvalidArgument` for an empty buffer, `PayloadTooLarge` when more than
/// [`StreamPacket::CAPACITY`] payload bytes follow the header.
pub fn parse_stream_packet(buffer: &[u8]) -> Result<StreamPacket, StreamError> {
    if buffer.is_empty() {
        return Err(StreamError::InvalidArgument);
    }
    let reader = StreamReader::new(buffer);
    reader.require_len(layout::HEADER_LEN)?;

    let header = reader.read_u8(layout::HEADER_OFFSET)?;
    let payload = reader.read_tail(layout::PAYLOAD_OFFSET)?;
    if payload.len() > layout::MAX_CHUNK_DATA_LEN {
        return Err(StreamError::PayloadTooLarge {
            len: payload.len(),
            capacity: layout::MAX_CHUNK_DATA_LEN,
        });
    }

    let mut data = [0u8; layout::MAX_CHUNK_DATA_LEN];
    data[..payload.len()].copy_from_slice(payload);

    Ok(StreamPacket {
        sequence: extract_sequence(header),
        data,
        data_len: payload.len(),
    })
}

/// Parse a HID input report that still carries its report id.
///
/// Returns `Ok(None)` when the report is not a stream data report.
pub fn parse_stream_report(report: &[u8]) -> Result<Option<StreamPacket>, StreamError> {
    if report.is_empty() {
        return Err(StreamError::InvalidArgument);
    }
    let reader = StreamReader::new(report);

    let report_id = reader.read_u8(layout::REPORT_ID_OFFSET)?;
    if report_id != layout::STREAM_DATA_REPORT_ID {
        return Ok(None);
    }

    reader.require_len(layout::MIN_REPORT_LEN)?;
    let packet = reader.read_tail(layout::REPORT_ID_LEN)?;
    parse_stream_packet(packet).map(Some)
}
