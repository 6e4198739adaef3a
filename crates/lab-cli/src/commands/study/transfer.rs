use std::path::Path;

use anyhow::Context;
use lab_core::entities::User;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn export(
    actor: &User,
    id: &str,
    out: &Path,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let archive = ctx.service.export_study(actor, id).await?;
    std::fs::create_dir_all(out).with_context(|| format!("failed to create {}", out.display()))?;
    let path = out.join(&archive.file_name);
    std::fs::write(&path, &archive.bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(study_id = id, path = %path.display(), "study: archive written");
    output(
        &json!({ "file": archive.file_name, "path": path, "size": archive.bytes.len() }),
        flags.format,
    )
}

pub async fn import(actor: &User, path: &Path, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let archive_name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
    let study = ctx.service.import_study(actor, &archive_name, &bytes).await?;
    output(&study, flags.format)
}
