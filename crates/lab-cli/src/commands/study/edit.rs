use lab_core::entities::User;
use lab_db::updates::study::{StudyUpdate, StudyUpdateBuilder};

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    actor: &User,
    id: &str,
    title: Option<&str>,
    description: Option<&str>,
    json_data: Option<&str>,
    clear_json_data: bool,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let update = build_update(title, description, json_data, clear_json_data);
    let study = ctx.service.edit_study(actor, id, &update).await?;
    output(&study, flags.format)
}

fn build_update(
    title: Option<&str>,
    description: Option<&str>,
    json_data: Option<&str>,
    clear_json_data: bool,
) -> StudyUpdate {
    let mut builder = StudyUpdateBuilder::new();
    if let Some(title) = title {
        builder = builder.title(title);
    }
    if let Some(description) = description {
        builder = builder.description(description);
    }
    if clear_json_data {
        builder = builder.json_data(None);
    } else if let Some(json_data) = json_data {
        builder = builder.json_data(Some(json_data.to_string()));
    }
    builder.build()
}
