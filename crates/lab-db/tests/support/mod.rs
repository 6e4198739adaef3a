use std::sync::Arc;

use lab_assets::{LocalAssetStore, ZipArchiver};
use lab_core::draft::{ComponentDraft, StudyDraft};
use lab_core::entities::{Study, User};
use lab_db::service::LabService;
use tempfile::TempDir;

pub async fn service() -> (LabService, TempDir) {
    let tmp = TempDir::new().unwrap();
    let assets = LocalAssetStore::new(tmp.path().join("assets")).unwrap();
    let svc = LabService::new_local(":memory:", None, Arc::new(assets), Arc::new(ZipArchiver))
        .await
        .unwrap();
    (svc, tmp)
}

pub async fn user(svc: &LabService, email: &str) -> User {
    svc.create_user(email, "Researcher").await.unwrap()
}

pub async fn study(svc: &LabService, owner: &User, title: &str, components: &[&str]) -> Study {
    let study = svc
        .create_study(
            owner,
            StudyDraft::new(title)
                .description("integration fixture")
                .json_data(r#"{"blocks": 2}"#),
        )
        .await
        .unwrap();
    for title in components {
        svc.add_component(owner, &study.id, ComponentDraft::new(*title))
            .await
            .unwrap();
    }
    study
}
