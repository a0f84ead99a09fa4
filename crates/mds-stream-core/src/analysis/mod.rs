use std::path::Path;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{debug, info, warn};

use crate::protocols::stream::{
    SequenceCheck, StreamError, StreamPacket, parse_stream_packet, parse_stream_report,
};
use crate::source::{HexDumpSource, PacketEvent, PacketSource, SourceError};
use crate::{CaptureSummary, DEFAULT_GENERATED_AT, Report, make_stub_report};

mod stream;
mod violations;

use stream::{StreamStats, update_ts_bounds};
use violations::{
    SEQUENCE_DUPLICATE_ID, SEQUENCE_GAP_ID, SEVERITY_ERROR, SEVERITY_WARNING, ViolationLog,
};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// How packets are framed in the capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Framing {
    /// Header byte followed by payload.
    #[default]
    Raw,
    /// HID report id prefix, then header and payload.
    HidReport,
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    pub framing: Framing,
}

/// Decode one packet according to `framing`.
///
/// Returns `Ok(None)` for HID reports that do not carry stream data.
pub fn decode_packet(framing: Framing, data: &[u8]) -> Result<Option<StreamPacket>, StreamError> {
    match framing {
        Framing::Raw => parse_stream_packet(data).map(Some),
        Framing::HidReport => parse_stream_report(data),
    }
}

pub fn analyze_capture_file(path: &Path, options: &AnalysisOptions) -> Result<Report, AnalysisError> {
    let source = HexDumpSource::open(path)?;
    analyze_source(path, source, options)
}

pub fn analyze_source<S: PacketSource>(
    path: &Path,
    mut source: S,
    options: &AnalysisOptions,
) -> Result<Report, AnalysisError> {
    let mut packets_total = 0u64;
    let mut reports_skipped = 0u64;
    let mut first_ts = None;
    let mut last_ts = None;
    let mut stats = StreamStats::new();
    let mut violations = ViolationLog::new();

    while let Some(PacketEvent { ts, line, data }) = source.next_packet()? {
        packets_total += 1;
        update_ts_bounds(&mut first_ts, &mut last_ts, ts);

        let packet = match decode_packet(options.framing, &data) {
            Ok(Some(packet)) => packet,
            Ok(None) => {
                reports_skipped += 1;
                debug!(line, "skipping non-stream report");
                continue;
            }
            Err(err) => {
                warn!(line, code = err.code(), "stream packet rejected: {err}");
                violations.record(err.id(), SEVERITY_ERROR, error_message(&err), line);
                continue;
            }
        };

        match stats.add_packet(&packet, ts, line) {
            SequenceCheck::Gap { .. } => violations.record(
                SEQUENCE_GAP_ID,
                SEVERITY_WARNING,
                "Sequence gap: packets were dropped",
                line,
            ),
            SequenceCheck::Duplicate => violations.record(
                SEQUENCE_DUPLICATE_ID,
                SEVERITY_WARNING,
                "Sequence did not advance: duplicate packet",
                line,
            ),
            SequenceCheck::First | SequenceCheck::InOrder => {}
        }
    }

    let mut report = make_stub_report(&path.display().to_string(), path.metadata()?.len());
    report.capture_summary = Some(CaptureSummary {
        packets_total,
        reports_skipped,
        time_start: ts_to_rfc3339(first_ts),
        time_end: ts_to_rfc3339(last_ts),
    });
    report.generated_at = report
        .capture_summary
        .as_ref()
        .and_then(|summary| summary.time_end.clone().or(summary.time_start.clone()))
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());
    report.stream = stats.build_summary();
    report.violations = violations.into_violations();

    info!(
        packets_total,
        decoded = stats.packets,
        dropped = stats.dropped,
        violations = report.violations.len(),
        "capture analysed"
    );
    Ok(report)
}

fn error_message(err: &StreamError) -> &'static str {
    match err {
        StreamError::InvalidArgument => "Empty packet",
        StreamError::TooShort { .. } => "Packet too short for stream header",
        StreamError::PayloadTooLarge { .. } => "Payload exceeds stream packet capacity",
    }
}

fn ts_to_rfc3339(ts: Option<f64>) -> Option<String> {
    let ts = ts?;
    let nanos = (ts * 1_000_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}
