use std::collections::BTreeMap;

use crate::Violation;

const MAX_EXAMPLES: usize = 3;

pub(crate) const SEVERITY_ERROR: &str = "error";
pub(crate) const SEVERITY_WARNING: &str = "warning";

pub(crate) const SEQUENCE_GAP_ID: &str = "MDS-SEQUENCE-GAP";
pub(crate) const SEQUENCE_DUPLICATE_ID: &str = "MDS-SEQUENCE-DUPLICATE";

#[derive(Debug)]
struct Entry {
    severity: &'static str,
    message: String,
    count: u64,
    examples: Vec<String>,
}

/// Aggregates violations by id, keeping the first few example contexts.
#[derive(Debug, Default)]
pub(crate) struct ViolationLog {
    entries: BTreeMap<&'static str, Entry>,
}

impl ViolationLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(
        &mut self,
        id: &'static str,
        severity: &'static str,
        message: impl Into<String>,
        line: usize,
    ) {
        let entry = self.entries.entry(id).or_insert_with(|| Entry {
            severity,
            message: message.into(),
            count: 0,
            examples: Vec::new(),
        });
        entry.count += 1;
        if entry.examples.len() < MAX_EXAMPLES {
            entry.examples.push(format!("line {line}"));
        }
    }

    /// Violations sorted by severity (errors first), then id.
    pub(crate) fn into_violations(self) -> Vec<Violation> {
        let mut violations: Vec<Violation> = self
            .entries
            .into_iter()
            .map(|(id, entry)| Violation {
                id: id.to_string(),
                severity: entry.severity.to_string(),
                message: entry.message,
                count: entry.count,
                examples: entry.examples,
            })
            .collect();
        violations.sort_by(|a, b| {
            severity_rank(&a.severity)
                .cmp(&severity_rank(&b.severity))
                .then_with(|| a.id.cmp(&b.id))
        });
        violations
    }
}

fn severity_rank(severity: &str) -> u8 {
    match severity {
        SEVERITY_ERROR => 0,
        SEVERITY_WARNING => 1,
        _ => 2,
    }
}
