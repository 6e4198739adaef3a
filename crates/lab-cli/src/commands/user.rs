use crate::cli::GlobalFlags;
use crate::cli::subcommands::UserCommands;
use crate::commands::shared::limit::{effective_limit, truncate};
use crate::context::AppContext;
use crate::output::output;

/// Handle `lab user`.
pub async fn handle(action: &UserCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        UserCommands::Add { email, name } => {
            let user = ctx.service.create_user(email, name).await?;
            output(&user, flags.format)
        }
        UserCommands::List => {
            let limit = effective_limit(flags.limit, ctx.config.general.default_limit);
            let users = truncate(ctx.service.find_all_users().await?, limit);
            output(&users, flags.format)
        }
    }
}
