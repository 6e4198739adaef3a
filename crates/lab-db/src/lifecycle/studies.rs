//! Study lifecycle: create, edit, lock, clone, remove, members, components.

use std::path::PathBuf;

use chrono::Utc;
use lab_assets::AssetError;
use lab_core::audit_detail::{
    MembersChangedDetail, OriginDetail, ReorderedDetail, StudyRemovedDetail,
};
use lab_core::draft::{ComponentDraft, StudyDraft};
use lab_core::entities::{Component, GroupResult, Study, User};
use lab_core::enums::{AuditAction, Direction, EntityType};
use lab_core::ids::{PREFIX_COMPONENT, PREFIX_STUDY};

use super::LifecycleError;
use crate::error::DatabaseError;
use crate::helpers::to_json;
use crate::repos::component::{
    components_of_in, insert_component_in, normalize_positions_in, set_position_in,
};
use crate::repos::component_result::delete_component_results_of_component_in;
use crate::repos::group_result::empty_groups_of_study_in;
use crate::repos::study::{
    add_member_in, clear_members_in, insert_study_in, set_locked_in, update_study_in,
};
use crate::repos::study_result::result_ids_of_study_in;
use crate::service::{Change, Journal, LabService};
use crate::store;
use crate::updates::study::StudyUpdate;

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn ensure_unlocked(study: &Study) -> Result<(), LifecycleError> {
    if study.locked {
        return Err(LifecycleError::Locked {
            study_id: study.id.clone(),
        });
    }
    Ok(())
}

impl LabService {
    /// Fetch a study on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown study, `NotMember` if `actor` is not a member.
    pub async fn member_study(&self, actor: &User, study_id: &str) -> Result<Study, LifecycleError> {
        let study = store::get::<Study>(self.db().conn(), study_id).await?;
        if !self.is_member(study_id, &actor.id).await? {
            return Err(LifecycleError::NotMember {
                study_id: study_id.to_string(),
                user_id: actor.id.clone(),
            });
        }
        Ok(study)
    }

    /// Create a study with `owner` as its only member, then its empty asset
    /// directory.
    ///
    /// # Errors
    ///
    /// `Validation` for a bad draft (nothing persisted). `PartialCreate` if
    /// the study was committed but its directory could not be created; retry
    /// with [`LabService::provision_assets`].
    pub async fn create_study(&self, owner: &User, draft: StudyDraft) -> Result<Study, LifecycleError> {
        draft.validate()?;
        store::get::<User>(self.db().conn(), &owner.id).await?;
        let id = self.db().generate_id(PREFIX_STUDY).await?;

        let tx = self.begin().await?;
        let mut journal = Journal::default();
        let step = async {
            let study = insert_study_in(&tx, id, &draft, Utc::now()).await?;
            add_member_in(&tx, &study.id, &owner.id).await?;
            self.record(
                &tx,
                &mut journal,
                Change::new(&owner.id, EntityType::Study, &study.id, AuditAction::Created)
                    .data(to_json(&study)?),
            )
            .await?;
            Ok::<_, LifecycleError>(study)
        }
        .await;
        let study = self.finish(tx, journal, step).await?;
        tracing::info!(study_id = %study.id, owner = %owner.id, "study: created");

        self.assets()
            .create_dir(&study.id)
            .map_err(|source| self.partial_create(&study.id, source))?;
        Ok(study)
    }

    /// (Re)create a study's asset directory. An existing directory is kept.
    ///
    /// # Errors
    ///
    /// `NotMember`, or `Asset` if the directory cannot be created.
    pub async fn provision_assets(&self, actor: &User, study_id: &str) -> Result<PathBuf, LifecycleError> {
        self.member_study(actor, study_id).await?;
        match self.assets().create_dir(study_id) {
            Ok(path) => {
                tracing::info!(study_id, path = %path.display(), "study: assets provisioned");
                Ok(path)
            }
            Err(AssetError::AlreadyExists { path }) => Ok(path),
            Err(error) => Err(error.into()),
        }
    }

    /// Edit title, description or configuration.
    ///
    /// # Errors
    ///
    /// `Locked` on a locked study, `Validation` if the edited study would be
    /// invalid. Nothing changes on error.
    pub async fn edit_study(
        &self,
        actor: &User,
        study_id: &str,
        update: &StudyUpdate,
    ) -> Result<Study, LifecycleError> {
        let study = self.member_study(actor, study_id).await?;
        ensure_unlocked(&study)?;
        if update.is_empty() {
            return Ok(study);
        }
        update.apply_to(&study).validate()?;

        let tx = self.begin().await?;
        let mut journal = Journal::default();
        let step = async {
            update_study_in(&tx, study_id, update).await?;
            self.record(
                &tx,
                &mut journal,
                Change::new(&actor.id, EntityType::Study, study_id, AuditAction::Updated)
                    .detail(to_json(update)?),
            )
            .await
        }
        .await;
        self.finish(tx, journal, step).await?;

        tracing::info!(study_id, "study: edited");
        Ok(store::refresh(self.db().conn(), &study).await?)
    }

    /// Flip the lock flag and return the new state. Allowed in either state.
    ///
    /// # Errors
    ///
    /// `NotMember`, `Store`.
    pub async fn toggle_lock(&self, actor: &User, study_id: &str) -> Result<bool, LifecycleError> {
        let study = self.member_study(actor, study_id).await?;
        let locked = !study.locked;
        let action = if locked {
            AuditAction::Locked
        } else {
            AuditAction::Unlocked
        };

        let tx = self.begin().await?;
        let mut journal = Journal::default();
        let step = async {
            set_locked_in(&tx, study_id, locked).await?;
            self.record(
                &tx,
                &mut journal,
                Change::new(&actor.id, EntityType::Study, study_id, action),
            )
            .await
        }
        .await;
        self.finish(tx, journal, step).await?;

        tracing::info!(study_id, locked, "study: lock toggled");
        Ok(locked)
    }

    /// Remove a study with all its results, groups, components and members in
    /// one transaction, then delete its asset directory.
    ///
    /// # Errors
    ///
    /// `Locked` on a locked study. `Cascade` if a result could not be removed
    /// (nothing is committed). `PartialRemoval` if the database is clean but
    /// the directory remains.
    pub async fn remove_study(
        &self,
        actor: &User,
        study_id: &str,
    ) -> Result<StudyRemovedDetail, LifecycleError> {
        let study = self.member_study(actor, study_id).await?;
        ensure_unlocked(&study)?;

        let tx = self.begin().await?;
        let mut journal = Journal::default();
        let step = async {
            let result_ids = result_ids_of_study_in(&tx, study_id).await?;
            for id in &result_ids {
                self.remove_result_in(&tx, &mut journal, &actor.id, id).await?;
            }
            for group_id in empty_groups_of_study_in(&tx, study_id).await? {
                store::delete::<GroupResult>(&tx, &group_id).await?;
            }
            let components = components_of_in(&tx, study_id).await?;
            for component in &components {
                delete_component_results_of_component_in(&tx, &component.id).await?;
                store::delete::<Component>(&tx, &component.id).await?;
            }
            clear_members_in(&tx, study_id).await?;
            store::delete::<Study>(&tx, study_id).await?;

            let detail = StudyRemovedDetail {
                study_results: count(result_ids.len()),
                components: count(components.len()),
            };
            self.record(
                &tx,
                &mut journal,
                Change::new(&actor.id, EntityType::Study, study_id, AuditAction::Deleted)
                    .detail(to_json(&detail)?),
            )
            .await?;
            Ok::<_, LifecycleError>(detail)
        }
        .await;
        let detail = self.finish(tx, journal, step).await?;
        tracing::info!(
            study_id,
            study_results = detail.study_results,
            components = detail.components,
            "study: removed"
        );

        match self.assets().remove_dir(study_id) {
            Ok(()) | Err(AssetError::NotFound { .. }) => Ok(detail),
            Err(source) => {
                let path = self.assets().study_dir(study_id);
                tracing::warn!(
                    study_id,
                    path = %path.display(),
                    retryable = source.is_retryable(),
                    error = %source,
                    "study: asset directory left behind"
                );
                Err(LifecycleError::PartialRemoval {
                    study_id: study_id.to_string(),
                    path,
                    source,
                })
            }
        }
    }

    /// Copy a study's definition and components (not its results) under a
    /// new id with `actor` as the only member, then copy its asset directory.
    ///
    /// # Errors
    ///
    /// `NotMember`, `Store`, or `PartialCreate` if the copy was committed but
    /// its directory was not.
    pub async fn clone_study(&self, actor: &User, study_id: &str) -> Result<Study, LifecycleError> {
        let source = self.member_study(actor, study_id).await?;
        let components = self.find_components(study_id).await?;
        let clone_id = self.db().generate_id(PREFIX_STUDY).await?;
        let mut component_ids = Vec::with_capacity(components.len());
        for _ in &components {
            component_ids.push(self.db().generate_id(PREFIX_COMPONENT).await?);
        }

        let draft = StudyDraft {
            title: source.title.clone(),
            description: source.description.clone(),
            json_data: source.json_data.clone(),
        };
        let tx = self.begin().await?;
        let mut journal = Journal::default();
        let step = async {
            let now = Utc::now();
            let clone = insert_study_in(&tx, clone_id, &draft, now).await?;
            add_member_in(&tx, &clone.id, &actor.id).await?;
            for (position, (component, id)) in components.iter().zip(component_ids).enumerate() {
                insert_component_in(
                    &tx,
                    id,
                    &clone.id,
                    count(position),
                    &component_draft(component),
                    now,
                )
                .await?;
            }
            let origin = OriginDetail {
                source: source.id.clone(),
                components: count(components.len()),
            };
            self.record(
                &tx,
                &mut journal,
                Change::new(&actor.id, EntityType::Study, &clone.id, AuditAction::Cloned)
                    .detail(to_json(&origin)?)
                    .data(to_json(&clone)?),
            )
            .await?;
            Ok::<_, LifecycleError>(clone)
        }
        .await;
        let clone = self.finish(tx, journal, step).await?;
        tracing::info!(study_id, clone_id = %clone.id, "study: cloned");

        let copied = match self.assets().copy_dir(study_id, &clone.id) {
            Err(AssetError::NotFound { .. }) => self.assets().create_dir(&clone.id),
            other => other,
        };
        copied.map_err(|source| self.partial_create(&clone.id, source))?;
        Ok(clone)
    }

    /// Swap a component with its neighbour in `direction`. Moving past either
    /// end is a no-op. Returns the components in their new order.
    ///
    /// # Errors
    ///
    /// `Locked` on a locked study, `NotFound` if the component is not part of
    /// the study.
    pub async fn change_component_order(
        &self,
        actor: &User,
        study_id: &str,
        component_id: &str,
        direction: Direction,
    ) -> Result<Vec<Component>, LifecycleError> {
        let study = self.member_study(actor, study_id).await?;
        ensure_unlocked(&study)?;
        let components = self.find_components(study_id).await?;
        let Some(index) = components.iter().position(|c| c.id == component_id) else {
            return Err(component_not_found(component_id));
        };
        if direction.neighbour(index, components.len()).is_none() {
            tracing::debug!(study_id, component_id, %direction, "study: reorder at boundary");
            return Ok(components);
        }

        let tx = self.begin().await?;
        let mut journal = Journal::default();
        let step = async {
            let ordered = normalize_positions_in(&tx, study_id).await?;
            let Some(index) = ordered.iter().position(|c| c.id == component_id) else {
                return Err(component_not_found(component_id));
            };
            let Some(neighbour) = direction.neighbour(index, ordered.len()) else {
                return Ok(ordered);
            };
            let other = ordered.get(neighbour).ok_or_else(|| {
                DatabaseError::InvalidState(format!("no component at position {neighbour} of study {study_id}"))
            })?;
            set_position_in(&tx, component_id, neighbour).await?;
            set_position_in(&tx, &other.id, index).await?;
            let reordered = normalize_positions_in(&tx, study_id).await?;
            let detail = ReorderedDetail {
                component_id: component_id.to_string(),
                direction,
                from: count(index),
                to: count(neighbour),
            };
            self.record(
                &tx,
                &mut journal,
                Change::new(&actor.id, EntityType::Study, study_id, AuditAction::Reordered)
                    .detail(to_json(&detail)?),
            )
            .await?;
            Ok::<_, LifecycleError>(reordered)
        }
        .await;
        let reordered = self.finish(tx, journal, step).await?;

        tracing::info!(study_id, component_id, %direction, "study: component moved");
        Ok(reordered)
    }

    /// Replace the member list with the users behind `emails`.
    ///
    /// Emails without a registered user are skipped and listed in the
    /// returned detail, even when that leaves no member. Allowed on locked
    /// studies.
    ///
    /// # Errors
    ///
    /// `InvalidMembership` if `emails` is empty or blank; the member list is
    /// unchanged.
    pub async fn change_members(
        &self,
        actor: &User,
        study_id: &str,
        emails: &[String],
    ) -> Result<MembersChangedDetail, LifecycleError> {
        self.member_study(actor, study_id).await?;
        let submitted: Vec<&str> = emails
            .iter()
            .map(|e| e.trim())
            .filter(|e| !e.is_empty())
            .collect();
        if submitted.is_empty() {
            return Err(LifecycleError::InvalidMembership(
                "a study must keep at least one member".into(),
            ));
        }

        let mut members: Vec<String> = Vec::new();
        let mut skipped = Vec::new();
        for email in submitted {
            match self.find_user_by_email(email).await? {
                Some(user) if !members.contains(&user.id) => members.push(user.id),
                Some(_) => {}
                None => skipped.push(email.to_string()),
            }
        }
        let detail = MembersChangedDetail { members, skipped };

        let tx = self.begin().await?;
        let mut journal = Journal::default();
        let step = async {
            clear_members_in(&tx, study_id).await?;
            for user_id in &detail.members {
                add_member_in(&tx, study_id, user_id).await?;
            }
            self.record(
                &tx,
                &mut journal,
                Change::new(&actor.id, EntityType::Study, study_id, AuditAction::MembersChanged)
                    .detail(to_json(&detail)?),
            )
            .await
        }
        .await;
        self.finish(tx, journal, step).await?;

        if !detail.skipped.is_empty() {
            tracing::debug!(study_id, skipped = ?detail.skipped, "study: unknown member emails skipped");
        }
        tracing::info!(study_id, members = detail.members.len(), "study: members changed");
        Ok(detail)
    }

    /// Append a component at the end of the study.
    ///
    /// # Errors
    ///
    /// `Locked`, `Validation` for a bad draft.
    pub async fn add_component(
        &self,
        actor: &User,
        study_id: &str,
        draft: ComponentDraft,
    ) -> Result<Component, LifecycleError> {
        let study = self.member_study(actor, study_id).await?;
        ensure_unlocked(&study)?;
        draft.validate()?;
        let id = self.db().generate_id(PREFIX_COMPONENT).await?;

        let tx = self.begin().await?;
        let mut journal = Journal::default();
        let step = async {
            let existing = normalize_positions_in(&tx, study_id).await?;
            let component =
                insert_component_in(&tx, id, study_id, count(existing.len()), &draft, Utc::now())
                    .await?;
            self.record(
                &tx,
                &mut journal,
                Change::new(&actor.id, EntityType::Component, &component.id, AuditAction::Created)
                    .data(to_json(&component)?),
            )
            .await?;
            Ok::<_, LifecycleError>(component)
        }
        .await;
        let component = self.finish(tx, journal, step).await?;

        tracing::info!(study_id, component_id = %component.id, position = component.position, "study: component added");
        Ok(component)
    }

    /// Remove a component and the component results produced from it, then
    /// close the gap in the order.
    ///
    /// # Errors
    ///
    /// `Locked`, `NotFound` if the component is not part of the study.
    pub async fn remove_component(
        &self,
        actor: &User,
        study_id: &str,
        component_id: &str,
    ) -> Result<Vec<Component>, LifecycleError> {
        let study = self.member_study(actor, study_id).await?;
        ensure_unlocked(&study)?;
        match store::find::<Component>(self.db().conn(), component_id).await? {
            Some(component) if component.study_id == study_id => {}
            _ => return Err(component_not_found(component_id)),
        }

        let tx = self.begin().await?;
        let mut journal = Journal::default();
        let step = async {
            let results = delete_component_results_of_component_in(&tx, component_id).await?;
            store::delete::<Component>(&tx, component_id).await?;
            let remaining = normalize_positions_in(&tx, study_id).await?;
            self.record(
                &tx,
                &mut journal,
                Change::new(&actor.id, EntityType::Component, component_id, AuditAction::Deleted)
                    .detail(serde_json::json!({ "component_results": results })),
            )
            .await?;
            Ok::<_, LifecycleError>(remaining)
        }
        .await;
        let remaining = self.finish(tx, journal, step).await?;

        tracing::info!(study_id, component_id, "study: component removed");
        Ok(remaining)
    }

    /// Remove every result of a study, keeping the study.
    ///
    /// # Errors
    ///
    /// `Locked` on a locked study; otherwise as
    /// [`LabService::remove_all_results_of_study`].
    pub async fn discard_results(&self, actor: &User, study_id: &str) -> Result<u64, LifecycleError> {
        let study = self.member_study(actor, study_id).await?;
        ensure_unlocked(&study)?;
        self.remove_all_results_of_study(&actor.id, study_id).await
    }

    fn partial_create(&self, study_id: &str, source: AssetError) -> LifecycleError {
        let path = self.assets().study_dir(study_id);
        tracing::warn!(
            study_id,
            path = %path.display(),
            retryable = source.is_retryable(),
            error = %source,
            "study: asset directory not created"
        );
        LifecycleError::PartialCreate {
            study_id: study_id.to_string(),
            path,
            source,
        }
    }
}

fn component_draft(component: &Component) -> ComponentDraft {
    ComponentDraft {
        title: component.title.clone(),
        html_file_path: component.html_file_path.clone(),
        json_data: component.json_data.clone(),
        reloadable: component.reloadable,
        active: component.active,
    }
}

fn component_not_found(component_id: &str) -> LifecycleError {
    DatabaseError::NotFound {
        entity_type: EntityType::Component,
        id: component_id.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use lab_core::enums::WorkerType;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_support::helpers::{
        AssetOp, test_service, test_service_denying, test_service_with_trail, test_study, test_user,
    };
    use crate::updates::study::StudyUpdateBuilder;

    fn titles(components: &[Component]) -> Vec<&str> {
        components.iter().map(|c| c.title.as_str()).collect()
    }

    #[tokio::test]
    async fn create_provisions_directory_and_sole_member() {
        let (svc, _tmp) = test_service().await;
        let owner = test_user(&svc, "ada@example.org").await;
        let study = svc
            .create_study(&owner, StudyDraft::new("Stroop").json_data(r#"{"trials": 40}"#))
            .await
            .unwrap();

        assert!(!study.locked);
        assert!(svc.assets().study_dir(&study.id).is_dir());
        assert_eq!(svc.find_members(&study.id).await.unwrap(), vec![owner]);
    }

    #[tokio::test]
    async fn invalid_draft_persists_nothing() {
        let (svc, _tmp) = test_service().await;
        let owner = test_user(&svc, "ada@example.org").await;
        let err = svc
            .create_study(&owner, StudyDraft::new("ok").json_data("{broken"))
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));
        assert!(svc.find_studies_of_user(&owner.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn provision_repairs_missing_directory() {
        let (svc, _tmp) = test_service().await;
        let owner = test_user(&svc, "ada@example.org").await;
        let study = test_study(&svc, &owner, &[]).await;
        svc.assets().remove_dir(&study.id).unwrap();

        // Directory gone: provisioning repairs it, twice is harmless.
        let path = svc.provision_assets(&owner, &study.id).await.unwrap();
        assert!(path.is_dir());
        assert_eq!(svc.provision_assets(&owner, &study.id).await.unwrap(), path);
    }

    #[tokio::test]
    async fn non_member_is_rejected() {
        let (svc, _tmp) = test_service().await;
        let owner = test_user(&svc, "ada@example.org").await;
        let stranger = test_user(&svc, "eve@example.org").await;
        let study = test_study(&svc, &owner, &[]).await;

        let err = svc.toggle_lock(&stranger, &study.id).await.unwrap_err();
        assert!(matches!(err, LifecycleError::NotMember { .. }));
        assert!(!svc.get_study(&study.id).await.unwrap().locked);
    }

    #[tokio::test]
    async fn edit_updates_fields() {
        let (svc, _tmp) = test_service().await;
        let owner = test_user(&svc, "ada@example.org").await;
        let study = test_study(&svc, &owner, &[]).await;
        let update = StudyUpdateBuilder::new()
            .title("Stroop v2")
            .json_data(None)
            .build();
        let edited = svc.edit_study(&owner, &study.id, &update).await.unwrap();
        assert_eq!(edited.title, "Stroop v2");
        assert_eq!(edited.description, study.description);
    }

    #[tokio::test]
    async fn locked_study_rejects_structural_edits() {
        let (svc, _tmp) = test_service().await;
        let owner = test_user(&svc, "ada@example.org").await;
        let study = test_study(&svc, &owner, &["intro", "task"]).await;
        assert!(svc.toggle_lock(&owner, &study.id).await.unwrap());
        let before = svc.get_study(&study.id).await.unwrap();
        let components = svc.find_components(&study.id).await.unwrap();

        let update = StudyUpdateBuilder::new().title("changed").build();
        let edit = svc.edit_study(&owner, &study.id, &update).await.unwrap_err();
        let reorder = svc
            .change_component_order(&owner, &study.id, &components[1].id, Direction::Up)
            .await
            .unwrap_err();
        let add = svc
            .add_component(&owner, &study.id, ComponentDraft::new("outro"))
            .await
            .unwrap_err();
        let remove = svc.remove_study(&owner, &study.id).await.unwrap_err();
        for err in [edit, reorder, add, remove] {
            assert!(matches!(err, LifecycleError::Locked { .. }), "{err}");
        }

        assert_eq!(svc.get_study(&study.id).await.unwrap(), before);
        assert_eq!(svc.find_components(&study.id).await.unwrap(), components);
        assert!(!svc.toggle_lock(&owner, &study.id).await.unwrap());
    }

    #[tokio::test]
    async fn reorder_swaps_neighbours_and_ignores_boundaries() {
        let (svc, _tmp) = test_service().await;
        let owner = test_user(&svc, "ada@example.org").await;
        let study = test_study(&svc, &owner, &["a", "b", "c"]).await;
        let components = svc.find_components(&study.id).await.unwrap();

        let moved = svc
            .change_component_order(&owner, &study.id, &components[2].id, Direction::Up)
            .await
            .unwrap();
        assert_eq!(titles(&moved), vec!["a", "c", "b"]);

        let unchanged = svc
            .change_component_order(&owner, &study.id, &components[0].id, Direction::Up)
            .await
            .unwrap();
        assert_eq!(titles(&unchanged), vec!["a", "c", "b"]);
        let positions: Vec<u32> = unchanged.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn reorder_unknown_component_is_not_found() {
        let (svc, _tmp) = test_service().await;
        let owner = test_user(&svc, "ada@example.org").await;
        let study = test_study(&svc, &owner, &["a"]).await;
        let err = svc
            .change_component_order(&owner, &study.id, "cmp-missing", Direction::Down)
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound { entity_type: EntityType::Component, .. }));
    }

    #[tokio::test]
    async fn members_change_skips_unknown_emails() {
        let (svc, _tmp) = test_service().await;
        let owner = test_user(&svc, "ada@example.org").await;
        let bob = test_user(&svc, "bob@example.org").await;
        let study = test_study(&svc, &owner, &[]).await;
        svc.toggle_lock(&owner, &study.id).await.unwrap();

        let detail = svc
            .change_members(
                &owner,
                &study.id,
                &["BOB@example.org".into(), "nobody@example.org".into()],
            )
            .await
            .unwrap();
        assert_eq!(detail.members, vec![bob.id.clone()]);
        assert_eq!(detail.skipped, vec!["nobody@example.org".to_string()]);
        assert_eq!(svc.find_members(&study.id).await.unwrap(), vec![bob]);
    }

    #[tokio::test]
    async fn empty_member_list_is_rejected() {
        let (svc, _tmp) = test_service().await;
        let owner = test_user(&svc, "ada@example.org").await;
        let study = test_study(&svc, &owner, &[]).await;

        for emails in [vec![], vec!["  ".to_string()], vec![String::new(), " \t".to_string()]] {
            let err = svc.change_members(&owner, &study.id, &emails).await.unwrap_err();
            assert!(matches!(err, LifecycleError::InvalidMembership(_)));
        }
        assert_eq!(svc.find_members(&study.id).await.unwrap(), vec![owner]);
    }

    #[tokio::test]
    async fn unresolvable_member_list_leaves_study_without_members() {
        let (svc, _tmp) = test_service().await;
        let owner = test_user(&svc, "ada@example.org").await;
        let study = test_study(&svc, &owner, &[]).await;

        let detail = svc
            .change_members(&owner, &study.id, &["ghost@example.org".into()])
            .await
            .unwrap();
        assert!(detail.members.is_empty());
        assert_eq!(detail.skipped, vec!["ghost@example.org".to_string()]);
        assert!(svc.find_members(&study.id).await.unwrap().is_empty());

        let err = svc.toggle_lock(&owner, &study.id).await.unwrap_err();
        assert!(matches!(err, LifecycleError::NotMember { .. }));
    }

    #[tokio::test]
    async fn reorder_at_either_end_keeps_order() {
        let (svc, _tmp) = test_service().await;
        let owner = test_user(&svc, "ada@example.org").await;
        let study = test_study(&svc, &owner, &["a", "b"]).await;
        let components = svc.find_components(&study.id).await.unwrap();

        let down = svc
            .change_component_order(&owner, &study.id, &components[1].id, Direction::Down)
            .await
            .unwrap();
        assert_eq!(titles(&down), vec!["a", "b"]);
        let moved = svc
            .change_component_order(&owner, &study.id, &components[0].id, Direction::Down)
            .await
            .unwrap();
        assert_eq!(titles(&moved), vec!["b", "a"]);
        assert_eq!(moved.iter().map(|c| c.position).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[tokio::test]
    async fn clone_copies_structure_not_results() {
        let (svc, _tmp) = test_service().await;
        let owner = test_user(&svc, "ada@example.org").await;
        let requester = test_user(&svc, "bob@example.org").await;
        let study = test_study(&svc, &owner, &["intro", "task"]).await;
        svc.change_members(&owner, &study.id, &[owner.email.clone(), requester.email.clone()])
            .await
            .unwrap();
        std::fs::write(svc.assets().study_dir(&study.id).join("intro.html"), "<p>hi</p>").unwrap();
        let worker = svc.create_worker(WorkerType::Plain, None).await.unwrap();
        svc.create_result(&study.id, &worker.id).await.unwrap();

        let clone = svc.clone_study(&requester, &study.id).await.unwrap();
        assert_ne!(clone.id, study.id);
        assert_eq!(
            (&clone.title, &clone.description, &clone.json_data),
            (&study.title, &study.description, &study.json_data)
        );
        assert_eq!(svc.find_members(&clone.id).await.unwrap(), vec![requester]);
        assert_eq!(svc.count_results_of_study(&clone.id).await.unwrap(), 0);

        let original = svc.find_components(&study.id).await.unwrap();
        let copied = svc.find_components(&clone.id).await.unwrap();
        assert_eq!(titles(&copied), titles(&original));
        assert!(copied.iter().all(|c| original.iter().all(|o| o.id != c.id)));
        assert!(svc.assets().study_dir(&clone.id).join("intro.html").is_file());
    }

    #[tokio::test]
    async fn remove_component_closes_gap() {
        let (svc, _tmp) = test_service().await;
        let owner = test_user(&svc, "ada@example.org").await;
        let study = test_study(&svc, &owner, &["a", "b", "c"]).await;
        let components = svc.find_components(&study.id).await.unwrap();
        let worker = svc.create_worker(WorkerType::Plain, None).await.unwrap();
        let result = svc.create_result(&study.id, &worker.id).await.unwrap();
        svc.start_component(&result.id, &components[1].id, None).await.unwrap();

        let remaining = svc
            .remove_component(&owner, &study.id, &components[1].id)
            .await
            .unwrap();
        assert_eq!(titles(&remaining), vec!["a", "c"]);
        assert_eq!(remaining.iter().map(|c| c.position).collect::<Vec<_>>(), vec![0, 1]);
        assert!(svc.find_component_results(&result.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_study_clears_everything() {
        let (svc, _tmp) = test_service().await;
        let owner = test_user(&svc, "ada@example.org").await;
        let study = test_study(&svc, &owner, &["intro"]).await;
        let component = &svc.find_components(&study.id).await.unwrap()[0];
        let worker = svc.create_worker(WorkerType::Group, None).await.unwrap();
        let result = svc.create_result(&study.id, &worker.id).await.unwrap();
        svc.start_component(&result.id, &component.id, None).await.unwrap();
        let group = svc.create_group_result(&owner.id, &study.id).await.unwrap();
        svc.join_group(&owner.id, &group.id, &result.id).await.unwrap();
        let idle_group = svc.create_group_result(&owner.id, &study.id).await.unwrap();

        let detail = svc.remove_study(&owner, &study.id).await.unwrap();
        assert_eq!(detail, StudyRemovedDetail { study_results: 1, components: 1 });

        let conn = svc.db().conn();
        assert!(!store::exists::<Study>(conn, &study.id).await.unwrap());
        assert!(!store::exists::<lab_core::entities::GroupResult>(conn, &group.id).await.unwrap());
        assert!(!store::exists::<lab_core::entities::GroupResult>(conn, &idle_group.id).await.unwrap());
        assert!(svc.find_results_of_worker(&worker.id).await.unwrap().is_empty());
        assert!(!svc.assets().study_dir(&study.id).exists());
        assert!(svc.find_studies_of_user(&owner.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn denied_directory_on_create_keeps_committed_study() {
        let (svc, _tmp) = test_service_denying(AssetOp::Create).await;
        let owner = test_user(&svc, "ada@example.org").await;

        let err = svc
            .create_study(&owner, StudyDraft::new("Stroop"))
            .await
            .unwrap_err();
        assert!(err.is_partial());
        let LifecycleError::PartialCreate { study_id, path, source } = err else {
            panic!("expected PartialCreate");
        };
        assert_eq!(path, svc.assets().study_dir(&study_id));
        assert!(matches!(source, AssetError::PermissionDenied { .. }));
        assert!(!path.exists());

        let study = svc.get_study(&study_id).await.unwrap();
        assert_eq!(study.title, "Stroop");
        assert_eq!(svc.find_members(&study_id).await.unwrap(), vec![owner]);
    }

    #[tokio::test]
    async fn denied_directory_on_clone_keeps_committed_copy() {
        let (svc, _tmp) = test_service_denying(AssetOp::Copy).await;
        let owner = test_user(&svc, "ada@example.org").await;
        let study = test_study(&svc, &owner, &["intro"]).await;

        let err = svc.clone_study(&owner, &study.id).await.unwrap_err();
        let LifecycleError::PartialCreate { study_id, path, .. } = err else {
            panic!("expected PartialCreate");
        };
        assert_ne!(study_id, study.id);
        assert_eq!(path, svc.assets().study_dir(&study_id));
        assert_eq!(titles(&svc.find_components(&study_id).await.unwrap()), vec!["intro"]);
        assert_eq!(svc.find_studies_of_user(&owner.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn denied_directory_on_remove_keeps_database_removal() {
        let (svc, _tmp) = test_service_denying(AssetOp::Remove).await;
        let owner = test_user(&svc, "ada@example.org").await;
        let study = test_study(&svc, &owner, &["intro"]).await;
        let worker = svc.create_worker(WorkerType::Plain, None).await.unwrap();
        svc.create_result(&study.id, &worker.id).await.unwrap();

        let err = svc.remove_study(&owner, &study.id).await.unwrap_err();
        assert!(err.is_partial());
        let LifecycleError::PartialRemoval { study_id, path, source } = err else {
            panic!("expected PartialRemoval");
        };
        assert_eq!(study_id, study.id);
        assert_eq!(path, svc.assets().study_dir(&study.id));
        assert!(matches!(source, AssetError::PermissionDenied { .. }));
        assert!(path.is_dir());

        assert!(!store::exists::<Study>(svc.db().conn(), &study.id).await.unwrap());
        assert!(svc.find_results_of_worker(&worker.id).await.unwrap().is_empty());
        assert!(svc.find_studies_of_user(&owner.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn discard_results_keeps_study() {
        let (svc, _tmp) = test_service().await;
        let owner = test_user(&svc, "ada@example.org").await;
        let study = test_study(&svc, &owner, &[]).await;
        let worker = svc.create_worker(WorkerType::Plain, None).await.unwrap();
        svc.create_result(&study.id, &worker.id).await.unwrap();
        svc.create_result(&study.id, &worker.id).await.unwrap();

        assert_eq!(svc.discard_results(&owner, &study.id).await.unwrap(), 2);
        assert!(store::exists::<Study>(svc.db().conn(), &study.id).await.unwrap());

        svc.toggle_lock(&owner, &study.id).await.unwrap();
        let err = svc.discard_results(&owner, &study.id).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Locked { .. }));
    }

    #[tokio::test]
    async fn mutations_reach_the_trail() {
        let (svc, _tmp) = test_service_with_trail().await;
        let owner = test_user(&svc, "ada@example.org").await;
        let study = test_study(&svc, &owner, &["intro"]).await;
        svc.toggle_lock(&owner, &study.id).await.unwrap();

        let ops: Vec<String> = svc
            .trail()
            .read(&owner.id)
            .unwrap()
            .into_iter()
            .map(|op| format!("{}:{}", op.op, op.entity))
            .collect();
        assert_eq!(
            ops,
            vec![
                "create:user",
                "create:study",
                "create:component",
                "lock:study"
            ]
        );
    }
}
