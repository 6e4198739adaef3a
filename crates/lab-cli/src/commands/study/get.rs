use lab_core::entities::{Component, Study, User};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct StudyDetailResponse {
    study: Study,
    components: Vec<Component>,
    members: Vec<User>,
    results: u64,
}

pub async fn run(actor: &User, id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let study = ctx.service.member_study(actor, id).await?;
    let components = ctx.service.find_components(id).await?;
    let members = ctx.service.find_members(id).await?;
    let results = ctx.service.count_results_of_study(id).await?;
    output(
        &StudyDetailResponse {
            study,
            components,
            members,
            results,
        },
        flags.format,
    )
}
