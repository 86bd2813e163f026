//! Sequenced combat log.
use std::fmt;

use chrono::{DateTime, Utc};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatLogEntry {
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl fmt::Display for CombatLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[#{}] {}", self.sequence, self.message)
    }
}

/// Append-only log; sequence numbers start at 1 and never repeat.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatLog {
    entries: Vec<CombatLogEntry>,
}

impl CombatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) -> u64 {
        let sequence = self.last_sequence() + 1;
        self.entries.push(CombatLogEntry {
            sequence,
            timestamp: Utc::now(),
            message: message.into(),
        });
        sequence
    }

    pub fn last_sequence(&self) -> u64 {
        self.entries.last().map_or(0, |e| e.sequence)
    }

    /// Entries strictly after `sequence`.
    pub fn since(&self, sequence: u64) -> &[CombatLogEntry] {
        let start = self.entries.partition_point(|e| e.sequence <= sequence);
        &self.entries[start..]
    }

    pub fn entries(&self) -> &[CombatLogEntry] {
        &self.entries
    }

    /// Rendered `[#seq] message` lines after `sequence`.
    pub fn render_since(&self, sequence: u64) -> Vec<String> {
        self.since(sequence).iter().map(ToString::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn since_returns_only_newer_entries() {
        let mut log = CombatLog::new();
        for msg in ["a", "b", "c"] {
            log.push(msg);
        }
        let newer: Vec<_> = log.since(1).iter().map(|e| e.message.as_str()).collect();
        assert_eq!(newer, vec!["b", "c"]);
        assert!(log.since(3).is_empty());
        assert_eq!(log.since(0).len(), 3);
    }

    #[test]
    fn renders_with_sequence_prefix() {
        let mut log = CombatLog::new();
        log.push("Aria's turn");
        assert_eq!(log.render_since(0), vec!["[#1] Aria's turn".to_string()]);
    }
}
