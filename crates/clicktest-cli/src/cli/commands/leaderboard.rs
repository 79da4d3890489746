use super::super::args::{GlobalArgs, LeaderboardArgs};
use crate::exit_codes::EXIT_SUCCESS;

pub(crate) fn run(global: &GlobalArgs, args: LeaderboardArgs) -> anyhow::Result<i32> {
    let cfg = super::load_config(global)?;
    let arena = super::open_arena(&cfg)?;

    let query = cfg.leaderboard_query(args.duration_ms, args.limit);
    let entries = arena.leaderboard(&query)?;
    super::print_json(&entries)?;
    Ok(EXIT_SUCCESS)
}
