use lab_core::draft::ComponentDraft;
use lab_core::enums::Direction;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ComponentCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `lab component`.
pub async fn handle(
    action: &ComponentCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let actor = ctx.actor(flags).await?;
    match action {
        ComponentCommands::Add {
            study_id,
            title,
            html_file_path,
            json_data,
            reloadable,
            inactive,
        } => {
            let mut draft = ComponentDraft::new(title).reloadable(*reloadable);
            draft.html_file_path.clone_from(html_file_path);
            draft.json_data.clone_from(json_data);
            draft.active = !inactive;
            let component = ctx.service.add_component(&actor, study_id, draft).await?;
            output(&component, flags.format)
        }
        ComponentCommands::Move {
            study_id,
            component_id,
            direction,
        } => {
            let components = ctx
                .service
                .change_component_order(&actor, study_id, component_id, Direction::from(*direction))
                .await?;
            output(&components, flags.format)
        }
        ComponentCommands::Remove {
            study_id,
            component_id,
        } => {
            let remaining = ctx
                .service
                .remove_component(&actor, study_id, component_id)
                .await?;
            output(&remaining, flags.format)
        }
        ComponentCommands::Get {
            study_id,
            component_id,
        } => {
            ctx.service.member_study(&actor, study_id).await?;
            let component = ctx.service.get_component(component_id).await?;
            anyhow::ensure!(
                component.study_id == *study_id,
                "component {component_id} does not belong to study {study_id}"
            );
            output(&component, flags.format)
        }
        ComponentCommands::List { study_id } => {
            ctx.service.member_study(&actor, study_id).await?;
            let components = ctx.service.find_components(study_id).await?;
            output(&components, flags.format)
        }
    }
}
