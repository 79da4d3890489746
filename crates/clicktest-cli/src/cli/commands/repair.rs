use super::super::args::GlobalArgs;
use crate::exit_codes::EXIT_SUCCESS;

pub(crate) fn run(global: &GlobalArgs) -> anyhow::Result<i32> {
    let cfg = super::load_config(global)?;
    let arena = super::open_arena(&cfg)?;

    let users = arena.repair_stats()?;
    super::print_json(&serde_json::json!({ "repaired_users": users }))?;
    Ok(EXIT_SUCCESS)
}
