//! Runtime configuration.
//!
//! Resolution order: built-in defaults, then an optional YAML file, then
//! `CLICKTEST_*` environment variables. Command-line flags are applied by the
//! binary on top of the result.

use crate::anticheat::{AntiCheatPolicy, DEFAULT_MAX_PLAUSIBLE_CPS, DEFAULT_TAMPER_TOLERANCE};
use crate::cps::Cps;
use crate::leaderboard::{LeaderboardQuery, DEFAULT_LEADERBOARD_DURATION_MS};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_DB: &str = "CLICKTEST_DB";
pub const ENV_TAMPER_TOLERANCE: &str = "CLICKTEST_TAMPER_TOLERANCE";
pub const ENV_MAX_CPS: &str = "CLICKTEST_MAX_CPS";

pub const DEFAULT_DB_PATH: &str = "clicktest.db";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to read config {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid value for {var}: {value:?} ({message})")]
    Env {
        var: &'static str,
        value: String,
        message: String,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AntiCheatSection {
    /// Allowed gap between reported and recomputed CPS.
    pub tamper_tolerance: Cps,
    /// Reported CPS above this is treated as impossible.
    pub max_plausible_cps: Cps,
}

impl Default for AntiCheatSection {
    fn default() -> Self {
        Self {
            tamper_tolerance: DEFAULT_TAMPER_TOLERANCE,
            max_plausible_cps: DEFAULT_MAX_PLAUSIBLE_CPS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LeaderboardSection {
    pub default_duration_ms: u64,
}

impl Default for LeaderboardSection {
    fn default() -> Self {
        Self {
            default_duration_ms: DEFAULT_LEADERBOARD_DURATION_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArenaConfig {
    pub db_path: PathBuf,
    pub anticheat: AntiCheatSection,
    pub leaderboard: LeaderboardSection,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            anticheat: AntiCheatSection::default(),
            leaderboard: LeaderboardSection::default(),
        }
    }
}

impl ArenaConfig {
    pub fn from_yaml(path: &Path, content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_yaml(path, &content)
    }

    /// Defaults (or `path`), overlaid with the environment, then checked.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(v) = env::var(ENV_DB) {
            if !v.trim().is_empty() {
                self.db_path = PathBuf::from(v);
            }
        }

        if let Some(cps) = cps_from_env(ENV_TAMPER_TOLERANCE)? {
            self.anticheat.tamper_tolerance = cps;
        }

        if let Some(cps) = cps_from_env(ENV_MAX_CPS)? {
            self.anticheat.max_plausible_cps = cps;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.anticheat.tamper_tolerance < Cps::ZERO {
            return Err(ConfigError::Invalid(format!(
                "anticheat.tamper_tolerance must not be negative (got {})",
                self.anticheat.tamper_tolerance
            )));
        }
        if self.anticheat.max_plausible_cps <= Cps::ZERO {
            return Err(ConfigError::Invalid(format!(
                "anticheat.max_plausible_cps must be positive (got {})",
                self.anticheat.max_plausible_cps
            )));
        }
        if self.leaderboard.default_duration_ms == 0 {
            return Err(ConfigError::Invalid(
                "leaderboard.default_duration_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn policy(&self) -> AntiCheatPolicy {
        AntiCheatPolicy {
            tamper_tolerance: self.anticheat.tamper_tolerance,
            max_plausible_cps: self.anticheat.max_plausible_cps,
        }
    }

    /// Leaderboard query using the configured default duration when none is given.
    pub fn leaderboard_query(&self, duration_ms: Option<u64>, limit: Option<u32>) -> LeaderboardQuery {
        let duration_ms = duration_ms
            .filter(|d| *d > 0)
            .unwrap_or(self.leaderboard.default_duration_ms);
        LeaderboardQuery::new(Some(duration_ms), limit)
    }
}

fn cps_from_env(var: &'static str) -> Result<Option<Cps>, ConfigError> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse::<Cps>()
            .map(Some)
            .map_err(|e| ConfigError::Env {
                var,
                value: v,
                message: e.to_string(),
            }),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        env::remove_var(ENV_DB);
        env::remove_var(ENV_TAMPER_TOLERANCE);
        env::remove_var(ENV_MAX_CPS);
    }

    #[test]
    fn test_defaults_match_policy_constants() {
        let cfg = ArenaConfig::default();
        assert_eq!(cfg.policy(), AntiCheatPolicy::default());
        assert_eq!(cfg.leaderboard.default_duration_ms, 10_000);
    }

    #[test]
    fn test_yaml_partial_override() {
        let yaml = "anticheat:\n  max_plausible_cps: 18.5\n";
        let cfg = ArenaConfig::from_yaml(Path::new("t.yaml"), yaml).unwrap();
        assert_eq!(cfg.anticheat.max_plausible_cps, Cps::from_parts(18, 50));
        assert_eq!(cfg.anticheat.tamper_tolerance, DEFAULT_TAMPER_TOLERANCE);
        assert_eq!(cfg.db_path, PathBuf::from(DEFAULT_DB_PATH));
    }

    #[test]
    fn test_yaml_rejects_unknown_keys() {
        let yaml = "anticheat:\n  max_cps: 18\n";
        assert!(matches!(
            ArenaConfig::from_yaml(Path::new("t.yaml"), yaml),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_negative_tolerance() {
        let mut cfg = ArenaConfig::default();
        cfg.anticheat.tamper_tolerance = Cps::from_hundredths(-1);
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_leaderboard_query_uses_configured_duration() {
        let mut cfg = ArenaConfig::default();
        cfg.leaderboard.default_duration_ms = 5_000;
        assert_eq!(cfg.leaderboard_query(None, None).duration_ms, 5_000);
        assert_eq!(cfg.leaderboard_query(Some(0), None).duration_ms, 5_000);
        assert_eq!(cfg.leaderboard_query(Some(30_000), Some(500)).limit, 100);
    }

    #[test]
    #[serial]
    fn test_env_overrides_file_values() {
        clear_env();
        env::set_var(ENV_DB, "/tmp/arena.db");
        env::set_var(ENV_MAX_CPS, "25");

        let mut cfg = ArenaConfig::default();
        cfg.apply_env().unwrap();
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/arena.db"));
        assert_eq!(cfg.anticheat.max_plausible_cps, Cps::from_parts(25, 0));
        assert_eq!(cfg.anticheat.tamper_tolerance, DEFAULT_TAMPER_TOLERANCE);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_rejects_garbage_threshold() {
        clear_env();
        env::set_var(ENV_TAMPER_TOLERANCE, "lots");

        let err = ArenaConfig::default().apply_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Env {
                var: ENV_TAMPER_TOLERANCE,
                ..
            }
        ));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_reads_file_then_env() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clicktest.yaml");
        std::fs::write(&path, "db_path: from-file.db\nanticheat:\n  tamper_tolerance: 1.0\n").unwrap();
        env::set_var(ENV_TAMPER_TOLERANCE, "0.25");

        let cfg = ArenaConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.db_path, PathBuf::from("from-file.db"));
        assert_eq!(cfg.anticheat.tamper_tolerance, Cps::from_parts(0, 25));

        clear_env();
    }
}
