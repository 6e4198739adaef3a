//! JSONL trail writer.
//!
//! Appends `TrailOperation` records to per-actor `{trail_dir}/{actor}.jsonl`
//! files. Uses `serde_jsonlines::append_json_lines` for atomic per-line appends.

use std::path::{Path, PathBuf};

use lab_core::trail::TrailOperation;

use crate::error::DatabaseError;

/// Appends trail operations to per-actor JSONL files.
///
/// `LabService` buffers the operations of one mutation and appends them
/// after the transaction commits, so rolled-back work never reaches the trail.
pub struct TrailWriter {
    trail_dir: PathBuf,
    enabled: bool,
}

impl TrailWriter {
    /// Create a new `TrailWriter` pointing at the given directory.
    ///
    /// Creates the directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the directory cannot be created.
    pub fn new(trail_dir: PathBuf) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(&trail_dir).map_err(|e| DatabaseError::Other(e.into()))?;
        Ok(Self {
            trail_dir,
            enabled: true,
        })
    }

    /// Create a disabled writer (for testing or when trail is not needed).
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            trail_dir: PathBuf::new(),
            enabled: false,
        }
    }

    /// Whether trail writing is currently enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append operations, each to its actor's JSONL file.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a file write fails.
    pub fn append_all(&self, ops: &[TrailOperation]) -> Result<(), DatabaseError> {
        if !self.enabled {
            return Ok(());
        }
        for op in ops {
            serde_jsonlines::append_json_lines(self.path_for(&op.actor), [op])
                .map_err(|e| DatabaseError::Other(e.into()))?;
        }
        Ok(())
    }

    /// Read back every operation recorded for one actor, oldest first.
    ///
    /// A missing file means the actor has no recorded operations.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the file exists but cannot be parsed.
    pub fn read(&self, actor: &str) -> Result<Vec<TrailOperation>, DatabaseError> {
        let path = self.path_for(actor);
        if !self.enabled || !path.exists() {
            return Ok(Vec::new());
        }
        serde_jsonlines::json_lines(&path)
            .map_err(|e| DatabaseError::Other(e.into()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DatabaseError::Other(e.into()))
    }

    /// The directory where trail files are stored.
    #[must_use]
    pub fn trail_dir(&self) -> &Path {
        &self.trail_dir
    }

    fn path_for(&self, actor: &str) -> PathBuf {
        self.trail_dir.join(format!("{actor}.jsonl"))
    }
}

#[cfg(test)]
mod tests {
    use lab_core::enums::{EntityType, TrailOp};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn op(actor: &str, id: &str) -> TrailOperation {
        TrailOperation {
            v: 1,
            ts: "2026-03-01T10:00:00+00:00".into(),
            actor: actor.into(),
            op: TrailOp::Create,
            entity: EntityType::Study,
            id: id.into(),
            data: serde_json::json!({"title": "t"}),
        }
    }

    #[test]
    fn appends_per_actor_files() {
        let tmp = TempDir::new().unwrap();
        let writer = TrailWriter::new(tmp.path().join("trail")).unwrap();

        writer
            .append_all(&[op("usr-a", "stu-1"), op("usr-b", "stu-2"), op("usr-a", "stu-3")])
            .unwrap();

        let a: Vec<String> = writer.read("usr-a").unwrap().into_iter().map(|o| o.id).collect();
        assert_eq!(a, vec!["stu-1", "stu-3"]);
        assert_eq!(writer.read("usr-b").unwrap().len(), 1);
        assert!(writer.read("usr-c").unwrap().is_empty());
    }

    #[test]
    fn disabled_writer_is_silent() {
        let writer = TrailWriter::disabled();
        assert!(!writer.is_enabled());
        writer.append_all(&[op("usr-a", "stu-1")]).unwrap();
        assert!(writer.read("usr-a").unwrap().is_empty());
    }
}
