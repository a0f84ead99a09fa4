pub const HEADER_OFFSET: usize = 0;
pub const HEADER_LEN: usize = 1;
pub const PAYLOAD_OFFSET: usize = HEADER_OFFSET + HEADER_LEN;

pub const SEQUENCE_MASK: u8 = 0x1F;

/// Payload capacity of a stream packet (64-byte HID report minus the header).
pub const MAX_CHUNK_DATA_LEN: usize = 63;
pub const MAX_PACKET_LEN: usize = HEADER_LEN + MAX_CHUNK_DATA_LEN;

pub const REPORT_ID_OFFSET: usize = 0;
pub const REPORT_ID_LEN: usize = 1;
pub const STREAM_DATA_REPORT_ID: u8 = 0x06;
pub const MIN_REPORT_LEN: usize = REPORT_ID_LEN + HEADER_LEN;
