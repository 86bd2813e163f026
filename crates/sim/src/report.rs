//! JSON summary of a finished run.
use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use combat_core::{CombatLogEntry, CombatSnapshot};
use combat_runtime::{ActionOutcome, PlayerRecord, SettlementOutcome};

#[derive(Debug, Serialize)]
pub struct FightReport {
    pub seed: u64,
    pub commands_sent: usize,
    pub last_outcome: Option<ActionOutcome>,
    pub settlement: String,
    pub snapshot: Option<CombatSnapshot>,
    pub player: Option<PlayerRecord>,
    pub log: Vec<CombatLogEntry>,
}

impl FightReport {
    pub fn settled(&self) -> bool {
        self.settlement == SettlementOutcome::Settled.to_string()
            || self.settlement == SettlementOutcome::AlreadySettled.to_string()
    }
}

/// Writes the report as pretty JSON to `path`, or to `out` when no path is given.
pub fn write_report(report: &FightReport, path: Option<&Path>, out: &mut impl Write) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("serializing fight report")?;
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        }
        None => writeln!(out, "{json}").context("writing fight report")?,
    }
    Ok(())
}
