//! Decoder core for the MDS (Memfault Diagnostic Service) stream transport.
//!
//! Diagnostic chunks leave a device as a stream of small packets: one header
//! byte carrying a 5-bit rolling sequence number, followed by up to 63 bytes
//! of payload. This crate provides the pure decoding primitives
//! (`extract_sequence`, `validate_sequence`, `parse_stream_packet`) and an
//! offline analysis pipeline that reads hex dump captures, tracks sequence
//! continuity and aggregates the results into a deterministic report.
//!
//! Parsing is byte-oriented and side-effect free; all I/O is isolated in
//! `source` modules.
//!
//! Invariants:
//! - A decoded packet never holds more than `MAX_CHUNK_DATA_LEN` payload bytes.
//! - Sequence numbers are always in `0..=31`.
//! - Report outputs are deterministic and stable across runs.
//!
//! # Examples
//! ```
//! use mds_stream_core::{parse_stream_packet, validate_sequence};
//!
//! let a = parse_stream_packet(&[0x1F, 0xde, 0xad])?;
//! let b = parse_stream_packet(&[0x20, 0xbe, 0xef])?;
//! assert!(validate_sequence(a.sequence(), b.sequence()));
//! # Ok::<(), mds_stream_core::StreamError>(())
//! ```

use serde::{Deserialize, Serialize};

mod analysis;
pub mod protocols;
mod source;

pub use analysis::{
    AnalysisError, AnalysisOptions, Framing, analyze_capture_file, analyze_source, decode_packet,
};
pub use protocols::stream::layout::{MAX_CHUNK_DATA_LEN, SEQUENCE_MASK};
pub use protocols::stream::{
    STATUS_OK, SequenceCheck, SequenceTracker, StreamError, StreamPacket, extract_sequence,
    next_sequence, parse_stream_packet, parse_stream_report, sequence_gap, status_code,
    validate_sequence,
};
pub use source::{HexDumpSource, PacketEvent, PacketSource, SourceError};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when no capture time is available.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Aggregated analysis report.
///
/// # Examples
/// ```
/// use mds_stream_core::make_stub_report;
///
/// let report = make_stub_report("capture.hex", 123);
/// assert_eq!(report.report_version, mds_stream_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    pub tool: ToolInfo,
    /// RFC3339 timestamp representing the report generation time.
    pub generated_at: String,
    pub input: InputInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_summary: Option<CaptureSummary>,
    /// Stream metrics; absent when no packet could be decoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<StreamSummary>,
    /// Violations sorted by severity and ID.
    pub violations: Vec<Violation>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Input capture metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the analyzer.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Basic capture summary (timestamps may be absent).
///
/// # Examples
/// ```
/// use mds_stream_core::CaptureSummary;
///
/// let summary = CaptureSummary {
///     packets_total: 10,
///     reports_skipped: 0,
///     time_start: None,
///     time_end: None,
/// };
/// assert_eq!(summary.packets_total, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSummary {
    /// Packets read from the capture, decodable or not.
    pub packets_total: u64,
    /// HID reports that did not carry stream data.
    pub reports_skipped: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

/// Sequence and throughput metrics of the decoded stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamSummary {
    /// Successfully decoded stream packets.
    pub packets: u64,
    pub payload_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_sequence: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sequence: Option<u8>,
    /// Sum of all sequence gaps.
    pub dropped_packets: u64,
    pub gap_count: u64,
    pub max_gap: u64,
    pub duplicate_packets: u64,
    /// `dropped / (decoded + dropped)`, when more than one packet was seen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loss_rate: Option<f64>,
    /// Packets per second over the timestamped interval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pps: Option<f64>,
}

/// Single violation record.
///
/// # Examples
/// ```
/// use mds_stream_core::Violation;
///
/// let violation = Violation {
///     id: "MDS-SEQUENCE-GAP".to_string(),
///     severity: "warning".to_string(),
///     message: "Sequence gap: packets were dropped".to_string(),
///     count: 1,
///     examples: vec!["line 4".to_string()],
/// };
/// assert_eq!(violation.count, 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Stable violation identifier (e.g., `MDS-PAYLOAD-TOO-LARGE`).
    pub id: String,
    /// Severity label (`error` or `warning`).
    pub severity: String,
    pub message: String,
    /// Number of occurrences aggregated into this violation.
    pub count: u64,
    /// At most three example contexts, formatted as `line N`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

/// JSON view of a single decoded packet.
///
/// # Examples
/// ```
/// use mds_stream_core::{PacketSummary, parse_stream_packet};
///
/// let packet = parse_stream_packet(&[0xE5, 0x01, 0xff])?;
/// let summary = PacketSummary::from(&packet);
/// assert_eq!(summary.sequence, 5);
/// assert_eq!(summary.payload, "01ff");
/// # Ok::<(), mds_stream_core::StreamError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketSummary {
    pub sequence: u8,
    /// Payload as lowercase hex.
    pub payload: String,
    pub payload_length: usize,
}

impl From<&StreamPacket> for PacketSummary {
    fn from(packet: &StreamPacket) -> Self {
        Self {
            sequence: packet.sequence(),
            payload: hex::encode(packet.payload()),
            payload_length: packet.payload_len(),
        }
    }
}

/// Build a stub report with base fields filled and empty aggregates.
///
/// # Examples
/// ```
/// use mds_stream_core::make_stub_report;
///
/// let report = make_stub_report("capture.hex", 123);
/// assert!(report.stream.is_none());
/// assert!(report.violations.is_empty());
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "mds-stream".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        capture_summary: None,
        stream: None,
        violations: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_omits_optional_fields_when_none() {
        let mut report = make_stub_report("capture.hex", 1);
        report.capture_summary = Some(CaptureSummary {
            packets_total: 1,
            reports_skipped: 0,
            time_start: None,
            time_end: None,
        });
        report.stream = Some(StreamSummary {
            packets: 1,
            payload_bytes: 5,
            first_sequence: None,
            last_sequence: Some(5),
            dropped_packets: 0,
            gap_count: 0,
            max_gap: 0,
            duplicate_packets: 0,
            loss_rate: None,
            pps: None,
        });

        let value = serde_json::to_value(&report).expect("report json");
        let capture = value.get("capture_summary").expect("capture_summary");
        assert!(capture.get("time_start").is_none());
        assert!(capture.get("time_end").is_none());

        let stream = &value["stream"];
        assert!(stream.get("first_sequence").is_none());
        assert_eq!(stream["last_sequence"], 5);
        assert!(stream.get("loss_rate").is_none());
        assert!(stream.get("pps").is_none());
    }

    #[test]
    fn stub_report_omits_stream() {
        let value = serde_json::to_value(make_stub_report("capture.hex", 0)).expect("json");
        assert!(value.get("stream").is_none());
        assert!(value.get("capture_summary").is_none());
        assert_eq!(value["tool"]["name"], "mds-stream");
    }

    #[test]
    fn packet_summary_serializes_hex_payload() {
        let packet = parse_stream_packet(&[0x05, 0x01, 0x02, 0x03, 0x04, 0x05]).unwrap();
        let value = serde_json::to_value(PacketSummary::from(&packet)).expect("json");
        assert_eq!(value["sequence"], 5);
        assert_eq!(value["payload"], "0102030405");
        assert_eq!(value["payload_length"], 5);
    }
}
