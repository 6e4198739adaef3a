mod create;
mod edit;
mod get;
mod transfer;

use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::StudyCommands;
use crate::commands::shared::limit::{effective_limit, truncate};
use crate::context::AppContext;
use crate::output::output;

/// Handle `lab study`.
pub async fn handle(action: &StudyCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let actor = ctx.actor(flags).await?;
    match action {
        StudyCommands::Create {
            title,
            description,
            json_data,
        } => create::run(&actor, title, description, json_data.as_deref(), ctx, flags).await,
        StudyCommands::Get { id } => get::run(&actor, id, ctx, flags).await,
        StudyCommands::List => {
            let limit = effective_limit(flags.limit, ctx.config.general.default_limit);
            let studies = ctx.service.find_studies_of_user(&actor.id).await?;
            output(&truncate(studies, limit), flags.format)
        }
        StudyCommands::Edit {
            id,
            title,
            description,
            json_data,
            clear_json_data,
        } => {
            edit::run(
                &actor,
                id,
                title.as_deref(),
                description.as_deref(),
                json_data.as_deref(),
                *clear_json_data,
                ctx,
                flags,
            )
            .await
        }
        StudyCommands::Lock { id } => {
            let locked = ctx.service.toggle_lock(&actor, id).await?;
            output(&json!({ "id": id, "locked": locked }), flags.format)
        }
        StudyCommands::Remove { id } => {
            let removed = ctx.service.remove_study(&actor, id).await?;
            output(&removed, flags.format)
        }
        StudyCommands::Clone { id } => {
            let clone = ctx.service.clone_study(&actor, id).await?;
            output(&clone, flags.format)
        }
        StudyCommands::Members { id, emails } => {
            let changed = ctx.service.change_members(&actor, id, emails).await?;
            output(&changed, flags.format)
        }
        StudyCommands::Export { id, out } => transfer::export(&actor, id, out, ctx, flags).await,
        StudyCommands::Import { path } => transfer::import(&actor, path, ctx, flags).await,
        StudyCommands::Try { id } => {
            let result = ctx.service.try_study(&actor, id).await?;
            output(&result, flags.format)
        }
        StudyCommands::DiscardResults { id } => {
            let removed = ctx.service.discard_results(&actor, id).await?;
            output(&json!({ "id": id, "removed": removed }), flags.format)
        }
        StudyCommands::Assets { id } => {
            let path = ctx.service.provision_assets(&actor, id).await?;
            output(&json!({ "id": id, "path": path }), flags.format)
        }
    }
}
