use super::args::*;
use anyhow::Context;
use clicktest_core::{Arena, ArenaConfig, SqliteStore};
use serde::Serialize;
use std::path::Path;

pub(crate) mod history;
pub(crate) mod leaderboard;
pub(crate) mod repair;
pub(crate) mod stats;
pub(crate) mod submit;
pub(crate) mod user;

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let global = cli.global;
    match cli.cmd {
        Command::User(args) => user::run(&global, args),
        Command::Submit(args) => submit::run(&global, args),
        Command::Leaderboard(args) => leaderboard::run(&global, args),
        Command::Stats(args) => stats::run(&global, args),
        Command::History(args) => history::run(&global, args),
        Command::Repair => repair::run(&global),
    }
}

/// Config file, then environment, then `--db`.
pub(crate) fn load_config(global: &GlobalArgs) -> anyhow::Result<ArenaConfig> {
    let mut cfg = ArenaConfig::load(global.config.as_deref())?;
    if let Some(db) = &global.db {
        cfg.db_path = db.clone();
    }
    Ok(cfg)
}

pub(crate) fn open_arena(cfg: &ArenaConfig) -> anyhow::Result<Arena<SqliteStore>> {
    ensure_parent_dir(&cfg.db_path)?;
    let store = SqliteStore::open(&cfg.db_path)
        .with_context(|| format!("failed to open database {}", cfg.db_path.display()))?;
    tracing::debug!(db = %cfg.db_path.display(), "store opened");
    Ok(Arena::new(store, cfg.policy()))
}

pub(crate) fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Command results go to stdout as pretty JSON; logs stay on stderr.
pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
