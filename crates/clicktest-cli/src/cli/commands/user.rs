use super::super::args::{GlobalArgs, UserArgs, UserSub};
use crate::exit_codes::EXIT_SUCCESS;
use clicktest_core::{ArenaStore, StoreError};

pub(crate) fn run(global: &GlobalArgs, args: UserArgs) -> anyhow::Result<i32> {
    let cfg = super::load_config(global)?;
    let arena = super::open_arena(&cfg)?;
    let store = arena.store();

    let user = match args.cmd {
        UserSub::Add { username } => {
            let user = store.create_user(username.trim())?;
            tracing::info!(user_id = user.id, username = %user.username, "user created");
            user
        }
        UserSub::Ban { id } => set_banned(store, id, true)?,
        UserSub::Unban { id } => set_banned(store, id, false)?,
    };
    super::print_json(&user)?;
    Ok(EXIT_SUCCESS)
}

fn set_banned<S: ArenaStore>(
    store: &S,
    user_id: i64,
    banned: bool,
) -> Result<clicktest_core::User, StoreError> {
    store.set_banned(user_id, banned)?;
    tracing::info!(user_id, banned, "ban flag updated");
    store
        .find_user(user_id)?
        .ok_or(StoreError::UserNotFound { user_id })
}
