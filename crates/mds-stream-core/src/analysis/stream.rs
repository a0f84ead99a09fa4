use tracing::{debug, warn};

use crate::StreamSummary;
use crate::protocols::stream::{SequenceCheck, SequenceTracker, StreamPacket};

#[derive(Debug, Default)]
pub(crate) struct StreamStats {
    pub packets: u64,
    pub payload_bytes: u64,
    pub first_sequence: Option<u8>,
    pub dropped: u64,
    pub gap_count: u64,
    pub max_gap: u64,
    pub duplicates: u64,
    pub first_ts: Option<f64>,
    pub last_ts: Option<f64>,
    tracker: SequenceTracker,
}

impl StreamStats {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Account for one decoded packet and classify its sequence number.
    pub(crate) fn add_packet(
        &mut self,
        packet: &StreamPacket,
        ts: Option<f64>,
        line: usize,
    ) -> SequenceCheck {
        self.packets += 1;
        self.payload_bytes += packet.payload_len() as u64;
        update_ts_bounds(&mut self.first_ts, &mut self.last_ts, ts);

        let check = self.tracker.observe(packet.sequence());
        match check {
            SequenceCheck::First => {
                self.first_sequence = Some(packet.sequence());
                debug!(line, sequence = packet.sequence(), "first stream packet");
            }
            SequenceCheck::InOrder => {
                debug!(line, sequence = packet.sequence(), len = packet.payload_len(), "stream packet");
            }
            SequenceCheck::Duplicate => {
                self.duplicates += 1;
                warn!(line, sequence = packet.sequence(), "duplicate stream packet");
            }
            SequenceCheck::Gap { expected, missed } => {
                let missed = u64::from(missed);
                self.dropped += missed;
                self.gap_count += 1;
                self.max_gap = self.max_gap.max(missed);
                warn!(
                    line,
                    expected,
                    received = packet.sequence(),
                    missed,
                    "sequence gap"
                );
            }
        }
        check
    }

    pub(crate) fn build_summary(&self) -> Option<StreamSummary> {
        if self.packets == 0 {
            return None;
        }
        let denom = self.packets + self.dropped;
        let loss_rate = if self.packets > 1 && denom > 0 {
            Some(self.dropped as f64 / denom as f64)
        } else {
            None
        };
        let pps = match (self.first_ts, self.last_ts) {
            (Some(start), Some(end)) if end > start => Some(self.packets as f64 / (end - start)),
            _ => None,
        };

        Some(StreamSummary {
            packets: self.packets,
            payload_bytes: self.payload_bytes,
            first_sequence: self.first_sequence,
            last_sequence: self.tracker.last_sequence(),
            dropped_packets: self.dropped,
            gap_count: self.gap_count,
            max_gap: self.max_gap,
            duplicate_packets: self.duplicates,
            loss_rate,
            pps,
        })
    }
}

pub(crate) fn update_ts_bounds(first: &mut Option<f64>, last: &mut Option<f64>, ts: Option<f64>) {
    let ts = match ts {
        Some(ts) => ts,
        None => return,
    };
    match first {
        None => *first = Some(ts),
        Some(existing) => {
            if ts < *existing {
                *first = Some(ts);
            }
        }
    }
    match last {
        None => *last = Some(ts),
        Some(existing) => {
            if ts > *existing {
                *last = Some(ts);
            }
        }
    }
}
