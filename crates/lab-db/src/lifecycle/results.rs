//! Result production and removal.

use chrono::Utc;
use lab_core::entities::{
    Component, ComponentResult, GroupResult, Study, StudyResult, User, Worker,
};
use lab_core::enums::{AuditAction, EntityType, WorkerType};
use lab_core::ids::{PREFIX_COMPONENT_RESULT, PREFIX_GROUP_RESULT, PREFIX_STUDY_RESULT};

use super::{LifecycleError, RemovalReport};
use crate::helpers::to_json;
use crate::repos::component_result::insert_component_result_in;
use crate::repos::group_result::{add_group_member_in, group_of_result_in, insert_group_result_in};
use crate::repos::study_result::{insert_study_result_in, result_ids_of_study_in};
use crate::repos::worker::touch_worker_in;
use crate::service::{Change, Journal, LabService};
use crate::store;

impl LabService {
    /// Start a run of `study_id` by `worker_id`.
    ///
    /// The result joins the worker's result collection. Locked studies still
    /// accept new results.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown study or worker, `Store` on persistence failure.
    pub async fn create_result(
        &self,
        study_id: &str,
        worker_id: &str,
    ) -> Result<StudyResult, LifecycleError> {
        store::get::<Study>(self.db().conn(), study_id).await?;
        store::get::<Worker>(self.db().conn(), worker_id).await?;
        let id = self.db().generate_id(PREFIX_STUDY_RESULT).await?;

        let tx = self.begin().await?;
        let mut journal = Journal::default();
        let step = async {
            let result = insert_study_result_in(&tx, id, study_id, worker_id, Utc::now()).await?;
            touch_worker_in(&tx, worker_id).await?;
            self.record(
                &tx,
                &mut journal,
                Change::new(worker_id, EntityType::StudyResult, &result.id, AuditAction::Created)
                    .data(to_json(&result)?),
            )
            .await?;
            Ok::<_, LifecycleError>(result)
        }
        .await;
        let result = self.finish(tx, journal, step).await?;

        tracing::info!(study_result_id = %result.id, study_id, worker_id, "result: created");
        Ok(result)
    }

    /// Start a trial run of `study_id` by a member, under the member's
    /// maintenance worker. The worker is created on first use and reused
    /// afterwards. Locked studies can be tried like any other.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown study, `NotMember` if `actor` is not a member.
    pub async fn try_study(&self, actor: &User, study_id: &str) -> Result<StudyResult, LifecycleError> {
        self.member_study(actor, study_id).await?;
        let existing = self
            .find_workers_of_user(&actor.id)
            .await?
            .into_iter()
            .find(|w| w.worker_type.is_maintenance());
        let worker = match existing {
            Some(worker) => worker,
            None => self.create_worker(WorkerType::Maintenance, Some(actor)).await?,
        };
        tracing::debug!(study_id, user_id = %actor.id, worker_id = %worker.id, "result: trial run");
        self.create_result(study_id, &worker.id).await
    }

    /// Record the run of one component inside a study result.
    ///
    /// # Errors
    ///
    /// `Validation` if the component belongs to another study, `NotFound`
    /// for unknown ids.
    pub async fn start_component(
        &self,
        study_result_id: &str,
        component_id: &str,
        data: Option<&str>,
    ) -> Result<ComponentResult, LifecycleError> {
        let result = store::get::<StudyResult>(self.db().conn(), study_result_id).await?;
        let component = store::get::<Component>(self.db().conn(), component_id).await?;
        if component.study_id != result.study_id {
            return Err(LifecycleError::Validation(format!(
                "component {component_id} does not belong to study {}",
                result.study_id
            )));
        }
        let actor = result.worker_id.clone().unwrap_or_else(|| result.id.clone());
        let id = self.db().generate_id(PREFIX_COMPONENT_RESULT).await?;

        let tx = self.begin().await?;
        let mut journal = Journal::default();
        let step = async {
            let produced =
                insert_component_result_in(&tx, id, &result.id, &component.id, data, Utc::now())
                    .await?;
            self.record(
                &tx,
                &mut journal,
                Change::new(&actor, EntityType::ComponentResult, &produced.id, AuditAction::Created)
                    .data(to_json(&produced)?),
            )
            .await?;
            Ok::<_, LifecycleError>(produced)
        }
        .await;
        let produced = self.finish(tx, journal, step).await?;

        tracing::debug!(component_result_id = %produced.id, study_result_id, component_id, "result: component started");
        Ok(produced)
    }

    /// Open a group session for a study.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown study.
    pub async fn create_group_result(
        &self,
        actor_id: &str,
        study_id: &str,
    ) -> Result<GroupResult, LifecycleError> {
        store::get::<Study>(self.db().conn(), study_id).await?;
        let id = self.db().generate_id(PREFIX_GROUP_RESULT).await?;

        let tx = self.begin().await?;
        let mut journal = Journal::default();
        let step = async {
            let group = insert_group_result_in(&tx, id, study_id, Utc::now()).await?;
            self.record(
                &tx,
                &mut journal,
                Change::new(actor_id, EntityType::GroupResult, &group.id, AuditAction::Created)
                    .data(to_json(&group)?),
            )
            .await?;
            Ok::<_, LifecycleError>(group)
        }
        .await;
        let group = self.finish(tx, journal, step).await?;

        tracing::info!(group_result_id = %group.id, study_id, "result: group created");
        Ok(group)
    }

    /// Add a study result to a group of the same study.
    ///
    /// # Errors
    ///
    /// `Validation` if the result is already grouped or belongs to another
    /// study, `NotFound` for unknown ids.
    pub async fn join_group(
        &self,
        actor_id: &str,
        group_result_id: &str,
        study_result_id: &str,
    ) -> Result<(), LifecycleError> {
        let group = store::get::<GroupResult>(self.db().conn(), group_result_id).await?;
        let result = store::get::<StudyResult>(self.db().conn(), study_result_id).await?;
        if group.study_id != result.study_id {
            return Err(LifecycleError::Validation(format!(
                "study result {study_result_id} belongs to study {}, group {group_result_id} to study {}",
                result.study_id, group.study_id
            )));
        }
        if let Some(current) = group_of_result_in(self.db().conn(), study_result_id).await? {
            return Err(LifecycleError::Validation(format!(
                "study result {study_result_id} already belongs to group {current}"
            )));
        }

        let tx = self.begin().await?;
        let mut journal = Journal::default();
        let step = async {
            add_group_member_in(&tx, group_result_id, study_result_id).await?;
            self.record(
                &tx,
                &mut journal,
                Change::new(actor_id, EntityType::GroupResult, group_result_id, AuditAction::Updated)
                    .detail(serde_json::json!({ "joined": study_result_id })),
            )
            .await?;
            Ok::<_, LifecycleError>(())
        }
        .await;
        self.finish(tx, journal, step).await?;

        tracing::debug!(group_result_id, study_result_id, "result: joined group");
        Ok(())
    }

    /// Remove one study result: its component results, its place in the
    /// worker's collection and in its group (an emptied group goes too), then
    /// the result itself. One transaction.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id; `Cascade` naming the last completed step
    /// if a step fails (the transaction is rolled back).
    pub async fn remove_result(
        &self,
        actor_id: &str,
        study_result_id: &str,
    ) -> Result<RemovalReport, LifecycleError> {
        store::get::<StudyResult>(self.db().conn(), study_result_id).await?;

        let tx = self.begin().await?;
        let mut journal = Journal::default();
        let step = self
            .remove_result_in(&tx, &mut journal, actor_id, study_result_id)
            .await;
        let report = self.finish(tx, journal, step).await?;

        tracing::info!(
            study_result_id,
            component_results = report.component_results,
            group_removed = report.group_removed,
            "result: removed"
        );
        Ok(report)
    }

    /// Remove every result of a study, each in its own transaction.
    ///
    /// Stops at the first failure and returns it; results removed before the
    /// failure stay removed. Returns the number of results removed.
    ///
    /// # Errors
    ///
    /// The first `remove_result` failure.
    pub async fn remove_all_results_of_study(
        &self,
        actor_id: &str,
        study_id: &str,
    ) -> Result<u64, LifecycleError> {
        let ids = result_ids_of_study_in(self.db().conn(), study_id).await?;
        let mut removed = 0_u64;
        for id in &ids {
            if let Err(error) = self.remove_result(actor_id, id).await {
                tracing::warn!(study_id, study_result_id = %id, removed, %error, "result: bulk removal stopped");
                return Err(error);
            }
            removed += 1;
        }
        tracing::info!(study_id, removed, "result: all results of study removed");
        Ok(removed)
    }
}
