use lab_core::enums::WorkerType;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::WorkerCommands;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `lab worker`.
pub async fn handle(action: &WorkerCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        WorkerCommands::Create { worker_type } => {
            let worker_type = parse_enum::<WorkerType>(worker_type, "worker type")?;
            let owner = if worker_type.is_maintenance() || flags.actor.is_some() {
                Some(ctx.actor(flags).await?)
            } else {
                None
            };
            let worker = ctx.service.create_worker(worker_type, owner.as_ref()).await?;
            output(&worker, flags.format)
        }
        WorkerCommands::List => {
            let user = ctx.actor(flags).await?;
            let workers = ctx.service.find_workers_of_user(&user.id).await?;
            output(&workers, flags.format)
        }
        WorkerCommands::Get { id } => {
            let worker = ctx.service.get_worker(id).await?;
            let results = ctx.service.find_results_of_worker(id).await?;
            output(&json!({ "worker": worker, "results": results }), flags.format)
        }
    }
}
