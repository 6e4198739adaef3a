//! Serde roundtrip and JsonSchema validation tests for all entity types.

use chrono::Utc;
use schemars::schema_for;
use lab_core::audit_detail::{MembersChangedDetail, ReorderedDetail};
use lab_core::draft::{ComponentDraft, StudyDraft};
use lab_core::entities::{
    AuditEntry, Component, ComponentResult, GroupResult, Study, StudyResult, User, Worker,
};
use lab_core::enums::{AuditAction, Direction, EntityType, TrailOp, WorkerType};
use lab_core::exchange::StudyExchange;
use lab_core::trail::TrailOperation;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

roundtrip_and_validate!(
    user_roundtrip,
    User,
    User {
        id: "usr-a3f8b2c1".into(),
        email: "ada@example.org".into(),
        name: "Ada".into(),
        created_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    study_roundtrip,
    Study,
    Study {
        id: "stu-a3f8b2c1".into(),
        title: "Stroop".into(),
        description: "colour naming task".into(),
        json_data: Some(r#"{"trials": 40}"#.into()),
        locked: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    component_roundtrip,
    Component,
    Component {
        id: "cmp-a3f8b2c1".into(),
        study_id: "stu-a3f8b2c1".into(),
        position: 2,
        title: "debrief".into(),
        html_file_path: Some("debrief.html".into()),
        json_data: None,
        reloadable: true,
        active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    worker_roundtrip,
    Worker,
    Worker {
        id: "wrk-a3f8b2c1".into(),
        worker_type: WorkerType::Maintenance,
        user_id: Some("usr-a3f8b2c1".into()),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    study_result_roundtrip,
    StudyResult,
    StudyResult {
        id: "srs-a3f8b2c1".into(),
        study_id: "stu-a3f8b2c1".into(),
        worker_id: Some("wrk-a3f8b2c1".into()),
        created_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    component_result_roundtrip,
    ComponentResult,
    ComponentResult {
        id: "crs-a3f8b2c1".into(),
        study_result_id: "srs-a3f8b2c1".into(),
        component_id: "cmp-a3f8b2c1".into(),
        data: Some("rt=512".into()),
        created_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    group_result_roundtrip,
    GroupResult,
    GroupResult {
        id: "grp-a3f8b2c1".into(),
        study_id: "stu-a3f8b2c1".into(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    audit_roundtrip,
    AuditEntry,
    AuditEntry {
        id: "aud-a3f8b2c1".into(),
        actor_id: Some("usr-a3f8b2c1".into()),
        entity_type: EntityType::Study,
        entity_id: "stu-a3f8b2c1".into(),
        action: AuditAction::Reordered,
        detail: Some(
            serde_json::to_value(ReorderedDetail {
                component_id: "cmp-a3f8b2c1".into(),
                direction: Direction::Down,
                from: 0,
                to: 1,
            })
            .unwrap()
        ),
        created_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    members_detail_roundtrip,
    MembersChangedDetail,
    MembersChangedDetail {
        members: vec!["usr-a3f8b2c1".into()],
        skipped: vec!["ghost@example.org".into()],
    }
);

roundtrip_and_validate!(
    trail_roundtrip,
    TrailOperation,
    TrailOperation {
        v: 1,
        ts: Utc::now().to_rfc3339(),
        actor: "usr-a3f8b2c1".into(),
        op: TrailOp::Members,
        entity: EntityType::Study,
        id: "stu-a3f8b2c1".into(),
        data: serde_json::json!({"members": ["usr-a3f8b2c1"]}),
    }
);

roundtrip_and_validate!(
    exchange_roundtrip,
    StudyExchange,
    StudyExchange {
        version: 1,
        title: "Stroop".into(),
        description: String::new(),
        json_data: None,
        components: vec![
            ComponentDraft::new("intro").html_file_path("intro.html"),
            ComponentDraft::new("task").json_data(r#"{"n": 3}"#).reloadable(true),
        ],
    }
);

#[test]
fn study_draft_roundtrip_keeps_defaults() {
    let draft: StudyDraft = serde_json::from_str(r#"{"title": "t"}"#).unwrap();
    assert_eq!(draft, StudyDraft::new("t"));
}
