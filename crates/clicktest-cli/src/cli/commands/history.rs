use super::super::args::{GlobalArgs, HistoryArgs};
use crate::exit_codes::EXIT_SUCCESS;

pub(crate) fn run(global: &GlobalArgs, args: HistoryArgs) -> anyhow::Result<i32> {
    let cfg = super::load_config(global)?;
    let arena = super::open_arena(&cfg)?;

    let rows = arena.history(args.user_id, args.limit)?;
    super::print_json(&rows)?;
    Ok(EXIT_SUCCESS)
}
