use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ResultCommands;
use crate::commands::shared::limit::{effective_limit, truncate};
use crate::context::AppContext;
use crate::output::output;

/// Handle `lab result`.
pub async fn handle(action: &ResultCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        ResultCommands::Start {
            study_id,
            worker_id,
        } => {
            let result = ctx.service.create_result(study_id, worker_id).await?;
            output(&result, flags.format)
        }
        ResultCommands::Record {
            study_result_id,
            component_id,
            data,
        } => {
            let produced = ctx
                .service
                .start_component(study_result_id, component_id, data.as_deref())
                .await?;
            output(&produced, flags.format)
        }
        ResultCommands::List { study_id, all } => {
            let exclude = !all && ctx.config.general.exclude_maintenance_results;
            let results = if exclude {
                ctx.service
                    .find_results_of_study_excluding_maintenance(study_id)
                    .await?
            } else {
                ctx.service.find_results_of_study(study_id).await?
            };
            let limit = effective_limit(flags.limit, ctx.config.general.default_limit);
            output(&truncate(results, limit), flags.format)
        }
        ResultCommands::Get { id } => {
            let result = ctx.service.get_study_result(id).await?;
            let component_results = ctx.service.find_component_results(id).await?;
            let group = ctx.service.find_group_of_result(id).await?;
            output(
                &json!({
                    "study_result": result,
                    "component_results": component_results,
                    "group_result": group,
                }),
                flags.format,
            )
        }
        ResultCommands::Count { study_id } => {
            let count = ctx.service.count_results_of_study(study_id).await?;
            output(&json!({ "study_id": study_id, "count": count }), flags.format)
        }
        ResultCommands::Remove { id } => {
            let actor_id = ctx.actor_id(flags).await?;
            let report = ctx.service.remove_result(&actor_id, id).await?;
            output(&report, flags.format)
        }
        ResultCommands::Group { study_id } => {
            let actor_id = ctx.actor_id(flags).await?;
            let group = ctx.service.create_group_result(&actor_id, study_id).await?;
            output(&group, flags.format)
        }
        ResultCommands::Groups { study_id } => {
            let groups = ctx.service.find_group_results_of_study(study_id).await?;
            output(&groups, flags.format)
        }
        ResultCommands::Join {
            group_result_id,
            study_result_id,
        } => {
            let actor_id = ctx.actor_id(flags).await?;
            ctx.service
                .join_group(&actor_id, group_result_id, study_result_id)
                .await?;
            let group = ctx.service.get_group_result(group_result_id).await?;
            let members = ctx.service.find_group_members(group_result_id).await?;
            output(&json!({ "group_result": group, "members": members }), flags.format)
        }
    }
}
