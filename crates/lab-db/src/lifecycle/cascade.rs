//! Removal cascade of a single study result.
//!
//! Removal runs as a fixed sequence of steps. Each step is idempotent, so a
//! cascade that stopped can be run again from the start; the error names the
//! last step that completed.
//!
//! ```text
//! Pending -> ChildrenRemoved -> DetachedFromWorker -> DetachedFromGroup -> Removed
//! ```

use std::fmt;

use lab_core::audit_detail::DetachedDetail;
use lab_core::entities::{GroupResult, StudyResult};
use lab_core::enums::{AuditAction, EntityType};
use libsql::Connection;
use serde::Serialize;

use super::LifecycleError;
use crate::error::DatabaseError;
use crate::helpers::to_json;
use crate::repos::component_result::delete_component_results_of_in;
use crate::repos::group_result::{group_of_result_in, remove_group_member_in, touch_group_in};
use crate::repos::worker::touch_worker_in;
use crate::service::{Change, Journal, LabService};
use crate::store;

/// Progress of one study result removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalStage {
    Pending,
    /// Component results are gone.
    ChildrenRemoved,
    /// The owning worker no longer lists the result.
    DetachedFromWorker,
    /// The result left its group; an emptied group is gone too.
    DetachedFromGroup,
    Removed,
}

impl RemovalStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::ChildrenRemoved => "children_removed",
            Self::DetachedFromWorker => "detached_from_worker",
            Self::DetachedFromGroup => "detached_from_group",
            Self::Removed => "removed",
        }
    }

    /// The step after this one, `None` once removed.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::ChildrenRemoved),
            Self::ChildrenRemoved => Some(Self::DetachedFromWorker),
            Self::DetachedFromWorker => Some(Self::DetachedFromGroup),
            Self::DetachedFromGroup => Some(Self::Removed),
            Self::Removed => None,
        }
    }
}

impl fmt::Display for RemovalStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a completed cascade touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemovalReport {
    pub study_result_id: String,
    pub component_results: u64,
    /// Worker the result was detached from.
    pub worker_id: Option<String>,
    /// Group the result was detached from.
    pub group_result_id: Option<String>,
    /// Whether that group was left empty and removed.
    pub group_removed: bool,
}

impl LabService {
    /// Run the cascade for one study result on `conn`.
    ///
    /// Does not open a transaction: callers decide the boundary.
    pub(crate) async fn remove_result_in(
        &self,
        conn: &Connection,
        journal: &mut Journal,
        actor_id: &str,
        study_result_id: &str,
    ) -> Result<RemovalReport, LifecycleError> {
        let mut report = RemovalReport {
            study_result_id: study_result_id.to_string(),
            ..RemovalReport::default()
        };
        let mut stage = RemovalStage::Pending;

        while let Some(next) = stage.next() {
            let outcome = self
                .run_step(conn, journal, actor_id, next, &mut report)
                .await;
            if let Err(source) = outcome {
                tracing::warn!(
                    study_result_id,
                    stage = %stage,
                    failed = %next,
                    error = %source,
                    "cascade: step failed"
                );
                return Err(LifecycleError::Cascade {
                    study_result_id: study_result_id.to_string(),
                    stage,
                    source,
                });
            }
            tracing::debug!(study_result_id, stage = %next, "cascade: step done");
            stage = next;
        }
        Ok(report)
    }

    async fn run_step(
        &self,
        conn: &Connection,
        journal: &mut Journal,
        actor_id: &str,
        stage: RemovalStage,
        report: &mut RemovalReport,
    ) -> Result<(), DatabaseError> {
        let id = report.study_result_id.clone();
        match stage {
            RemovalStage::Pending => {}
            RemovalStage::ChildrenRemoved => {
                report.component_results += delete_component_results_of_in(conn, &id).await?;
            }
            RemovalStage::DetachedFromWorker => {
                let Some(result) = store::find::<StudyResult>(conn, &id).await? else {
                    return Ok(());
                };
                if let Some(worker_id) = result.worker_id {
                    conn.execute(
                        "UPDATE study_results SET worker_id = NULL WHERE id = ?1",
                        [id.as_str()],
                    )
                    .await?;
                    touch_worker_in(conn, &worker_id).await?;
                    report.worker_id = Some(worker_id);
                }
            }
            RemovalStage::DetachedFromGroup => {
                let Some(group_id) = group_of_result_in(conn, &id).await? else {
                    return Ok(());
                };
                let remaining = remove_group_member_in(conn, &group_id, &id).await?;
                let group_removed = remaining == 0;
                let detail = DetachedDetail {
                    study_result_id: id.clone(),
                    group_removed,
                };
                self.record(
                    conn,
                    journal,
                    Change::new(actor_id, EntityType::GroupResult, &group_id, AuditAction::Detached)
                        .detail(to_json(&detail)?),
                )
                .await?;
                if group_removed {
                    store::delete::<GroupResult>(conn, &group_id).await?;
                    self.record(
                        conn,
                        journal,
                        Change::new(actor_id, EntityType::GroupResult, &group_id, AuditAction::Deleted),
                    )
                    .await?;
                } else {
                    touch_group_in(conn, &group_id).await?;
                }
                report.group_result_id = Some(group_id);
                report.group_removed = group_removed;
            }
            RemovalStage::Removed => {
                if store::delete::<StudyResult>(conn, &id).await? {
                    self.record(
                        conn,
                        journal,
                        Change::new(actor_id, EntityType::StudyResult, &id, AuditAction::Deleted)
                            .detail(to_json(&*report)?),
                    )
                    .await?;
                }
            }
        }
        Ok(())
    }
}
