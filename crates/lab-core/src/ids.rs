//! ID prefixes for every stored entity.
//!
//! IDs are generated by the database as `{prefix}-{8 hex chars}`.

pub const PREFIX_STUDY: &str = "stu";
pub const PREFIX_COMPONENT: &str = "cmp";
pub const PREFIX_USER: &str = "usr";
pub const PREFIX_WORKER: &str = "wrk";
pub const PREFIX_STUDY_RESULT: &str = "srs";
pub const PREFIX_COMPONENT_RESULT: &str = "crs";
pub const PREFIX_GROUP_RESULT: &str = "grp";
pub const PREFIX_AUDIT: &str = "aud";

/// All prefixes, in schema dependency order.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_USER,
    PREFIX_STUDY,
    PREFIX_COMPONENT,
    PREFIX_WORKER,
    PREFIX_STUDY_RESULT,
    PREFIX_COMPONENT_RESULT,
    PREFIX_GROUP_RESULT,
    PREFIX_AUDIT,
];

/// Name of the asset directory that belongs to a study.
///
/// The same prefix marks the asset directory inside an exported archive.
#[must_use]
pub fn study_dir_name(study_id: &str) -> String {
    format!("{STUDY_DIR_PREFIX}{study_id}")
}

/// Prefix of every study asset directory name.
pub const STUDY_DIR_PREFIX: &str = "study_";
