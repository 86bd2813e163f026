//! Engine timing configuration.
use std::env;
use std::time::Duration;

/// Timing windows shared by the engine, the coordinators and settlement.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long `wait_turn` blocks before reporting back.
    pub turn_wait: Duration,
    /// How long a player may hold the turn before it is skipped for them.
    /// Kept longer than `turn_wait` so an auto-waiting client is not raced.
    pub turn_timeout: Duration,
    /// How long a losing settlement caller waits for the winner to finish.
    pub settlement_wait: Duration,
    /// How long a finished settlement gate stays around for late callers.
    pub settlement_gate_grace: Duration,
    /// Fights older than this are called off.
    pub combat_time_limit: Duration,
    /// How long a concluded combat stays queryable.
    pub retention: Duration,
    pub event_buffer_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            turn_wait: Duration::from_secs(10),
            turn_timeout: Duration::from_secs(12),
            settlement_wait: Duration::from_millis(2_000),
            settlement_gate_grace: Duration::from_secs(5),
            combat_time_limit: Duration::from_secs(600),
            retention: Duration::from_secs(300),
            event_buffer_size: 100,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `COMBAT_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(secs) = read_env::<u64>("COMBAT_TURN_WAIT_SECS") {
            config.turn_wait = Duration::from_secs(secs.max(1));
        }
        if let Some(secs) = read_env::<u64>("COMBAT_TURN_TIMEOUT_SECS") {
            config.turn_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(ms) = read_env::<u64>("COMBAT_SETTLEMENT_WAIT_MS") {
            config.settlement_wait = Duration::from_millis(ms);
        }
        if let Some(secs) = read_env::<u64>("COMBAT_SETTLEMENT_GATE_GRACE_SECS") {
            config.settlement_gate_grace = Duration::from_secs(secs);
        }
        if let Some(secs) = read_env::<u64>("COMBAT_TIME_LIMIT_SECS") {
            config.combat_time_limit = Duration::from_secs(secs.max(1));
        }
        if let Some(secs) = read_env::<u64>("COMBAT_RETENTION_SECS") {
            config.retention = Duration::from_secs(secs);
        }
        if let Some(capacity) = read_env::<usize>("COMBAT_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
