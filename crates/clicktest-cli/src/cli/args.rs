use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "clicktest",
    version,
    about = "Click-speed trials: anti-cheat validation, per-user stats and leaderboards"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// SQLite database path (overrides config file and CLICKTEST_DB)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// YAML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage user records
    User(UserArgs),
    /// Submit one trial
    Submit(SubmitArgs),
    /// Show the leaderboard for one trial duration
    Leaderboard(LeaderboardArgs),
    /// Show a user's summary
    Stats(StatsArgs),
    /// Show a user's recent trials
    History(HistoryArgs),
    /// Recompute every user's summary from trial history
    Repair,
}

#[derive(Parser, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub cmd: UserSub,
}

#[derive(Subcommand, Debug, Clone)]
pub enum UserSub {
    Add { username: String },
    Ban { id: i64 },
    Unban { id: i64 },
}

#[derive(Parser, Debug, Clone, Default)]
pub struct SubmitArgs {
    #[arg(long)]
    pub user_id: i64,

    /// JSON payload file, or `-` for stdin. Individual flags fill in whatever
    /// the payload leaves out.
    #[arg(long)]
    pub file: Option<PathBuf>,

    #[arg(long)]
    pub duration_ms: Option<u64>,

    #[arg(long)]
    pub clicks: Option<u64>,

    /// Reported CPS, e.g. `15.00`
    #[arg(long)]
    pub cps: Option<String>,

    #[arg(long)]
    pub started_at: Option<DateTime<Utc>>,

    #[arg(long)]
    pub ended_at: Option<DateTime<Utc>>,

    #[arg(long)]
    pub device_type: Option<String>,

    #[arg(long)]
    pub browser: Option<String>,

    #[arg(long)]
    pub user_agent: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct LeaderboardArgs {
    /// Trial duration to rank (default from config, 10000)
    #[arg(long)]
    pub duration_ms: Option<u64>,

    /// Max entries (capped at 100)
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    #[arg(long)]
    pub user_id: i64,
}

#[derive(Parser, Debug, Clone)]
pub struct HistoryArgs {
    #[arg(long)]
    pub user_id: i64,

    /// Max entries (default 20, capped at 50)
    #[arg(long)]
    pub limit: Option<u32>,
}
