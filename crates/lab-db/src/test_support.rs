//! Shared test utilities for lab-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use lab_assets::{AssetError, AssetStore, LocalAssetStore, ZipArchiver};
    use lab_core::draft::{ComponentDraft, StudyDraft};
    use lab_core::entities::{Study, User};
    use tempfile::TempDir;

    use crate::LabDb;
    use crate::service::LabService;
    use crate::trail::writer::TrailWriter;

    /// In-memory service with trail disabled and assets in a temp dir.
    ///
    /// Keep the `TempDir` alive for the duration of the test.
    pub async fn test_service() -> (LabService, TempDir) {
        let tmp = TempDir::new().unwrap();
        let db = LabDb::open_local(":memory:").await.unwrap();
        let assets = LocalAssetStore::new(tmp.path().join("assets")).unwrap();
        let svc = LabService::from_parts(
            db,
            TrailWriter::disabled(),
            Arc::new(assets),
            Arc::new(ZipArchiver),
        );
        (svc, tmp)
    }

    /// Same as [`test_service`] with the trail written under the temp dir.
    pub async fn test_service_with_trail() -> (LabService, TempDir) {
        let tmp = TempDir::new().unwrap();
        let db = LabDb::open_local(":memory:").await.unwrap();
        let assets = LocalAssetStore::new(tmp.path().join("assets")).unwrap();
        let trail = TrailWriter::new(tmp.path().join("trail")).unwrap();
        let svc = LabService::from_parts(db, trail, Arc::new(assets), Arc::new(ZipArchiver));
        (svc, tmp)
    }

    pub async fn test_user(svc: &LabService, email: &str) -> User {
        let name = email.split('@').next().unwrap_or(email);
        svc.create_user(email, name).await.unwrap()
    }

    /// A study owned by `owner` with components titled after `components`.
    pub async fn test_study(svc: &LabService, owner: &User, components: &[&str]) -> Study {
        let study = svc
            .create_study(owner, StudyDraft::new("Stroop").description("colour naming"))
            .await
            .unwrap();
        for title in components {
            svc.add_component(owner, &study.id, ComponentDraft::new(*title))
                .await
                .unwrap();
        }
        svc.get_study(&study.id).await.unwrap()
    }

    /// Asset store operation that [`DeniedAssets`] refuses.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum AssetOp {
        Create,
        Remove,
        Copy,
        Move,
    }

    /// Local store that answers one operation with `PermissionDenied`.
    pub struct DeniedAssets {
        inner: LocalAssetStore,
        denied: AssetOp,
    }

    impl DeniedAssets {
        fn check(&self, op: AssetOp, study_id: &str) -> Result<(), AssetError> {
            if op == self.denied {
                return Err(AssetError::PermissionDenied {
                    path: self.inner.study_dir(study_id),
                });
            }
            Ok(())
        }
    }

    impl AssetStore for DeniedAssets {
        fn root(&self) -> &Path {
            self.inner.root()
        }

        fn create_dir(&self, study_id: &str) -> Result<PathBuf, AssetError> {
            self.check(AssetOp::Create, study_id)?;
            self.inner.create_dir(study_id)
        }

        fn remove_dir(&self, study_id: &str) -> Result<(), AssetError> {
            self.check(AssetOp::Remove, study_id)?;
            self.inner.remove_dir(study_id)
        }

        fn copy_dir(&self, src_study_id: &str, dst_study_id: &str) -> Result<PathBuf, AssetError> {
            self.check(AssetOp::Copy, dst_study_id)?;
            self.inner.copy_dir(src_study_id, dst_study_id)
        }

        fn move_dir(&self, src: &Path, study_id: &str) -> Result<PathBuf, AssetError> {
            self.check(AssetOp::Move, study_id)?;
            self.inner.move_dir(src, study_id)
        }
    }

    /// Same as [`test_service`] with `denied` failing on every call.
    pub async fn test_service_denying(denied: AssetOp) -> (LabService, TempDir) {
        let tmp = TempDir::new().unwrap();
        let db = LabDb::open_local(":memory:").await.unwrap();
        let inner = LocalAssetStore::new(tmp.path().join("assets")).unwrap();
        let assets = DeniedAssets { inner, denied };
        let svc = LabService::from_parts(
            db,
            TrailWriter::disabled(),
            Arc::new(assets),
            Arc::new(ZipArchiver),
        );
        (svc, tmp)
    }
}
