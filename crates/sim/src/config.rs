//! Driver settings.
use std::env;
use std::path::PathBuf;

use combat_runtime::EngineConfig;

#[derive(Clone, Debug)]
pub struct SimConfig {
    pub engine: EngineConfig,
    /// Seed for the fight's random rolls.
    pub seed: u64,
    /// Directory for `combat-sim.log`. Logs only go to stderr when unset.
    pub log_dir: Option<PathBuf>,
    /// Where to write the JSON report. Printed to stdout when unset.
    pub report_path: Option<PathBuf>,
    /// Commands the scripted player sends before giving up.
    pub max_commands: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            seed: 7,
            log_dir: None,
            report_path: None,
            max_commands: 200,
        }
    }
}

impl SimConfig {
    /// Environment variables, on top of those read by [`EngineConfig::from_env`]:
    /// - `COMBAT_SEED` - RNG seed (default: 7)
    /// - `COMBAT_LOG_DIR` - log directory (default: none)
    /// - `COMBAT_REPORT_PATH` - report file (default: stdout)
    /// - `COMBAT_MAX_COMMANDS` - command budget for the scripted player (default: 200)
    pub fn from_env() -> Self {
        let mut config = Self {
            engine: EngineConfig::from_env(),
            ..Self::default()
        };

        if let Some(seed) = read_env::<u64>("COMBAT_SEED") {
            config.seed = seed;
        }
        config.log_dir = env::var_os("COMBAT_LOG_DIR").map(PathBuf::from);
        config.report_path = env::var_os("COMBAT_REPORT_PATH").map(PathBuf::from);
        if let Some(max) = read_env::<usize>("COMBAT_MAX_COMMANDS") {
            config.max_commands = max.max(1);
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
