use lab_core::draft::StudyDraft;
use lab_core::entities::User;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    owner: &User,
    title: &str,
    description: &str,
    json_data: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut draft = StudyDraft::new(title).description(description);
    if let Some(json_data) = json_data {
        draft = draft.json_data(json_data);
    }
    let study = ctx.service.create_study(owner, draft).await?;
    output(&study, flags.format)
}
