use super::layout;

/// Extract the 5-bit sequence number from a stream header byte.
///
/// Bits 5..=7 are reserved and ignored.
///
/// # Examples
/// ```
/// use mds_stream_core::extract_sequence;
///
/// assert_eq!(extract_sequence(0x05), 5);
/// assert_eq!(extract_sequence(0xE5), 5);
/// ```
pub const fn extract_sequence(header: u8) -> u8 {
    header & layout::SEQUENCE_MASK
}

/// Sequence number that must follow `sequence` (wraps 31 -> 0).
pub const fn next_sequence(sequence: u8) -> u8 {
    sequence.wrapping_add(1) & layout::SEQUENCE_MASK
}

/// Number of sequence numbers skipped between `expected` and `received`.
///
/// Returns 0 when `received` is the expected sequence.
pub const fn sequence_gap(expected: u8, received: u8) -> u8 {
    received.wrapping_sub(expected) & layout::SEQUENCE_MASK
}

/// Check that `current` is the immediate successor of `previous`.
///
/// Both values are reduced modulo 32 first; anything above 31 is treated as
/// its low five bits. A sequence must advance, so `previous == current` is
/// never valid.
///
/// # Examples
/// ```
/// use mds_stream_core::validate_sequence;
///
/// assert!(validate_sequence(0, 1));
/// assert!(validate_sequence(31, 0));
/// assert!(!validate_sequence(0, 2));
/// assert!(!validate_sequence(5, 5));
/// ```
pub const fn validate_sequence(previous: u8, current: u8) -> bool {
    extract_sequence(current) == next_sequence(previous)
}

/// Classification of a sequence number against the previously seen one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceCheck {
    /// No sequence was recorded yet.
    First,
    InOrder,
    /// Same sequence as the last packet.
    Duplicate,
    Gap { expected: u8, missed: u8 },
}

/// Tracks the last received sequence number of a stream.
///
/// The tracker only classifies; it never buffers or reorders packets.
///
/// # Examples
/// ```
/// use mds_stream_core::{SequenceCheck, SequenceTracker};
///
/// let mut tracker = SequenceTracker::new();
/// assert_eq!(tracker.observe(30), SequenceCheck::First);
/// assert_eq!(tracker.observe(31), SequenceCheck::InOrder);
/// assert_eq!(tracker.observe(2), SequenceCheck::Gap { expected: 0, missed: 2 });
/// assert_eq!(tracker.last_sequence(), Some(2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SequenceTracker {
    last: Option<u8>,
}

impl SequenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_sequence(&self) -> Option<u8> {
        self.last
    }

    /// Expected sequence of the next packet, if any packet was seen.
    pub fn expected(&self) -> Option<u8> {
        self.last.map(next_sequence)
    }

    pub fn update(&mut self, sequence: u8) {
        self.last = Some(extract_sequence(sequence));
    }

    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Classify `sequence` and record it as the last received one.
    pub fn observe(&mut self, sequence: u8) -> SequenceCheck {
        let sequence = extract_sequence(sequence);
        let check = match self.last {
            None => SequenceCheck::First,
            Some(last) if validate_sequence(last, sequence) => SequenceCheck::InOrder,
            Some(last) if last == sequence => SequenceCheck::Duplicate,
            Some(last) => {
                let expected = next_sequence(last);
                SequenceCheck::Gap {
                    expected,
                    missed: sequence_gap(expected, sequence),
                }
            }
        };
        self.last = Some(sequence);
        check
    }
}
