use super::super::args::{GlobalArgs, StatsArgs};
use crate::exit_codes::EXIT_SUCCESS;

pub(crate) fn run(global: &GlobalArgs, args: StatsArgs) -> anyhow::Result<i32> {
    let cfg = super::load_config(global)?;
    let arena = super::open_arena(&cfg)?;

    let stats = arena.user_stats(args.user_id)?;
    super::print_json(&stats)?;
    Ok(EXIT_SUCCESS)
}
