//! Study export and import.
//!
//! An export archive holds `<title>.study` (the exchange document) at its
//! root and the asset directory `study_<id>/` next to it. Import is a
//! structural clone: new ids, the importer as sole member, no results.

use std::path::{Path, PathBuf};

use chrono::Utc;
use lab_assets::AssetError;
use lab_assets::naming::{archive_file_name, definition_file_name};
use lab_core::audit_detail::OriginDetail;
use lab_core::entities::{Study, User};
use lab_core::enums::{AuditAction, EntityType};
use lab_core::exchange::{STUDY_FILE_SUFFIX, StudyExchange, from_exchange_format, to_exchange_format};
use lab_core::ids::{PREFIX_COMPONENT, PREFIX_STUDY, STUDY_DIR_PREFIX};
use serde::Serialize;

use super::LifecycleError;
use crate::helpers::to_json;
use crate::repos::component::insert_component_in;
use crate::repos::study::{add_member_in, insert_study_in};
use crate::service::{Change, Journal, LabService};

/// An exported study, ready to be written or sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudyArchive {
    /// `<sanitized title>.zip`
    pub file_name: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl LabService {
    /// Package a study's definition and asset directory into a zip archive.
    ///
    /// # Errors
    ///
    /// `NotMember`, or `Asset` if the directory or archive cannot be read or
    /// written.
    pub async fn export_study(&self, actor: &User, study_id: &str) -> Result<StudyArchive, LifecycleError> {
        let study = self.member_study(actor, study_id).await?;
        let components = self.find_components(study_id).await?;
        let document = to_exchange_format(&study, &components)?;

        let scratch = tempfile::Builder::new()
            .prefix("lab-export-")
            .tempdir()
            .map_err(|e| AssetError::from_io(&std::env::temp_dir(), e))?;
        let definition = scratch.path().join(definition_file_name(&study.title));
        std::fs::write(&definition, &document)
            .map_err(|e| AssetError::from_io(&definition, e))?;

        let study_dir = self.assets().study_dir(study_id);
        if !study_dir.is_dir() {
            // Exported archives always carry the directory, even when empty.
            self.assets().create_dir(study_id)?;
        }
        let bytes = self.archiver().zip(&study_dir, &definition)?;

        let tx = self.begin().await?;
        let mut journal = Journal::default();
        let step = self
            .record(
                &tx,
                &mut journal,
                Change::new(&actor.id, EntityType::Study, study_id, AuditAction::Exported)
                    .detail(serde_json::json!({ "size": bytes.len() })),
            )
            .await;
        self.finish(tx, journal, step).await?;

        let archive = StudyArchive {
            file_name: archive_file_name(&study.title),
            bytes,
        };
        tracing::info!(study_id, file = %archive.file_name, size = archive.bytes.len(), "study: exported");
        Ok(archive)
    }

    /// Rebuild a study from an export archive with `importer` as its only
    /// member, then move the archive's asset directory into place.
    ///
    /// # Errors
    ///
    /// `Validation` for an unreadable archive or study file (nothing
    /// persisted). `PartialImport` if the study was committed but its assets
    /// could not be moved.
    pub async fn import_study(
        &self,
        importer: &User,
        archive_name: &str,
        bytes: &[u8],
    ) -> Result<Study, LifecycleError> {
        let extracted = self.archiver().unzip(bytes).map_err(|e| match e {
            AssetError::Archive(msg) => LifecycleError::Validation(msg),
            other => other.into(),
        })?;
        let root = extracted.path();
        let definition =
            self.single_entry(root, "", &format!(".{STUDY_FILE_SUFFIX}"), false, "study file")?;
        let asset_dir = self.single_entry(root, STUDY_DIR_PREFIX, "", true, "asset directory")?;
        let document = std::fs::read(&definition)
            .map_err(|e| AssetError::from_io(&definition, e))?;
        let exchange = from_exchange_format(&document)?;

        let study = self.persist_import(importer, archive_name, &exchange).await?;
        tracing::info!(study_id = %study.id, archive = archive_name, "study: imported");

        if let Err(source) = self.assets().move_dir(&asset_dir, &study.id) {
            let path = self.assets().study_dir(&study.id);
            tracing::warn!(study_id = %study.id, path = %path.display(), error = %source, "study: imported assets not moved");
            return Err(LifecycleError::PartialImport {
                study_id: study.id,
                path,
                source,
            });
        }
        Ok(study)
    }

    async fn persist_import(
        &self,
        importer: &User,
        archive_name: &str,
        exchange: &StudyExchange,
    ) -> Result<Study, LifecycleError> {
        crate::store::get::<User>(self.db().conn(), &importer.id).await?;
        let study_id = self.db().generate_id(PREFIX_STUDY).await?;
        let mut component_ids = Vec::with_capacity(exchange.components.len());
        for _ in &exchange.components {
            component_ids.push(self.db().generate_id(PREFIX_COMPONENT).await?);
        }

        let tx = self.begin().await?;
        let mut journal = Journal::default();
        let step = async {
            let now = Utc::now();
            let study = insert_study_in(&tx, study_id, &exchange.study_draft(), now).await?;
            add_member_in(&tx, &study.id, &importer.id).await?;
            for (position, (draft, id)) in exchange.components.iter().zip(component_ids).enumerate() {
                let position = u32::try_from(position).unwrap_or(u32::MAX);
                insert_component_in(&tx, id, &study.id, position, draft, now).await?;
            }
            let origin = OriginDetail {
                source: archive_name.to_string(),
                components: u32::try_from(exchange.components.len()).unwrap_or(u32::MAX),
            };
            self.record(
                &tx,
                &mut journal,
                Change::new(&importer.id, EntityType::Study, &study.id, AuditAction::Imported)
                    .detail(to_json(&origin)?)
                    .data(to_json(&study)?),
            )
            .await?;
            Ok::<_, LifecycleError>(study)
        }
        .await;
        self.finish(tx, journal, step).await
    }

    /// The one file (or directory, with `dir`) of `root` matching `prefix`/`suffix`.
    fn single_entry(
        &self,
        root: &Path,
        prefix: &str,
        suffix: &str,
        dir: bool,
        what: &str,
    ) -> Result<PathBuf, LifecycleError> {
        let mut found = self.assets().find_files(root, prefix, suffix)?;
        found.retain(|path| path.is_dir() == dir);
        match found.len() {
            1 => Ok(found.remove(0)),
            0 => Err(LifecycleError::Validation(format!("archive contains no {what}"))),
            n => Err(LifecycleError::Validation(format!(
                "archive contains {n} entries that look like a {what}, expected one"
            ))),
        }
    }
}
