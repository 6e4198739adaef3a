//! Filesystem-safe names derived from study titles.

use lab_core::exchange::STUDY_FILE_SUFFIX;

/// Suffix of exported study archives.
pub const ARCHIVE_SUFFIX: &str = "zip";

const MAX_NAME_LEN: usize = 100;

/// Reduce a title to `[A-Za-z0-9_-]`, trimmed of `_`, never empty.
#[must_use]
pub fn sanitize_file_name(title: &str) -> String {
    let filtered: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_NAME_LEN)
        .collect();

    let trimmed = filtered.trim_matches('_');
    if trimmed.is_empty() {
        "study".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `<sanitized title>.zip`
#[must_use]
pub fn archive_file_name(title: &str) -> String {
    format!("{}.{ARCHIVE_SUFFIX}", sanitize_file_name(title))
}

/// `<sanitized title>.study`
#[must_use]
pub fn definition_file_name(title: &str) -> String {
    format!("{}.{STUDY_FILE_SUFFIX}", sanitize_file_name(title))
}
