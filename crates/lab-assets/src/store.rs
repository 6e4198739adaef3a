//! Per-study asset directories.

use std::fs;
use std::path::{Path, PathBuf};

use lab_core::ids::study_dir_name;

use crate::error::AssetError;

/// Filesystem service for study asset directories.
///
/// Every study owns one directory, `study_<id>`, directly under the store root.
pub trait AssetStore: Send + Sync {
    /// Root under which study directories live.
    fn root(&self) -> &Path;

    /// Canonical directory of a study. Does not touch the filesystem.
    fn study_dir(&self, study_id: &str) -> PathBuf {
        self.root().join(study_dir_name(study_id))
    }

    /// Create an empty directory for a new study.
    ///
    /// # Errors
    ///
    /// `AlreadyExists` if the directory is already there.
    fn create_dir(&self, study_id: &str) -> Result<PathBuf, AssetError>;

    /// Delete a study's directory and everything in it.
    ///
    /// # Errors
    ///
    /// `NotFound` if there is no such directory.
    fn remove_dir(&self, study_id: &str) -> Result<(), AssetError>;

    /// Duplicate one study's directory under another study's id.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing source, `AlreadyExists` for an existing target.
    fn copy_dir(&self, src_study_id: &str, dst_study_id: &str) -> Result<PathBuf, AssetError>;

    /// Move an arbitrary directory (e.g. from an extracted archive) into the
    /// canonical location of `study_id`.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing source, `AlreadyExists` for an existing target.
    fn move_dir(&self, src: &Path, study_id: &str) -> Result<PathBuf, AssetError>;

    /// Entries directly inside `dir` whose name starts with `prefix` and ends
    /// with `suffix`, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `AssetError` if `dir` cannot be read.
    fn find_files(&self, dir: &Path, prefix: &str, suffix: &str) -> Result<Vec<PathBuf>, AssetError> {
        find_files(dir, prefix, suffix)
    }
}

/// Directory listing filtered by name prefix and suffix, sorted.
///
/// # Errors
///
/// Returns `AssetError` if `dir` cannot be read.
pub fn find_files(dir: &Path, prefix: &str, suffix: &str) -> Result<Vec<PathBuf>, AssetError> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| AssetError::from_io(dir, e))? {
        let entry = entry.map_err(|e| AssetError::from_io(dir, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.starts_with(prefix) && name.ends_with(suffix) {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

/// `AssetStore` backed by a local directory tree.
#[derive(Debug, Clone)]
pub struct LocalAssetStore {
    root: PathBuf,
}

impl LocalAssetStore {
    /// Open a store rooted at `root`, creating the root if needed.
    ///
    /// # Errors
    ///
    /// Returns `AssetError` if the root cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, AssetError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| AssetError::from_io(&root, e))?;
        Ok(Self { root })
    }
}

impl AssetStore for LocalAssetStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn create_dir(&self, study_id: &str) -> Result<PathBuf, AssetError> {
        let dir = self.study_dir(study_id);
        fs::create_dir(&dir).map_err(|e| AssetError::from_io(&dir, e))?;
        tracing::debug!(study_id, path = %dir.display(), "assets: created study directory");
        Ok(dir)
    }

    fn remove_dir(&self, study_id: &str) -> Result<(), AssetError> {
        let dir = self.study_dir(study_id);
        fs::remove_dir_all(&dir).map_err(|e| AssetError::from_io(&dir, e))?;
        tracing::debug!(study_id, path = %dir.display(), "assets: removed study directory");
        Ok(())
    }

    fn copy_dir(&self, src_study_id: &str, dst_study_id: &str) -> Result<PathBuf, AssetError> {
        let src = self.study_dir(src_study_id);
        let dst = self.study_dir(dst_study_id);
        if !src.is_dir() {
            return Err(AssetError::NotFound { path: src });
        }
        if dst.exists() {
            return Err(AssetError::AlreadyExists { path: dst });
        }
        copy_tree(&src, &dst)?;
        tracing::debug!(
            src = %src.display(),
            dst = %dst.display(),
            "assets: copied study directory"
        );
        Ok(dst)
    }

    fn move_dir(&self, src: &Path, study_id: &str) -> Result<PathBuf, AssetError> {
        let dst = self.study_dir(study_id);
        if !src.is_dir() {
            return Err(AssetError::NotFound {
                path: src.to_path_buf(),
            });
        }
        if dst.exists() {
            return Err(AssetError::AlreadyExists { path: dst });
        }
        if let Err(error) = fs::rename(src, &dst) {
            // rename cannot cross filesystems (scratch dirs usually live in /tmp)
            tracing::debug!(%error, "assets: rename failed, copying instead");
            copy_tree(src, &dst)?;
            fs::remove_dir_all(src).map_err(|e| AssetError::from_io(src, e))?;
        }
        tracing::debug!(
            src = %src.display(),
            dst = %dst.display(),
            "assets: moved directory into study location"
        );
        Ok(dst)
    }
}

/// Recursive copy of `src` into a new directory `dst`.
fn copy_tree(src: &Path, dst: &Path) -> Result<(), AssetError> {
    fs::create_dir(dst).map_err(|e| AssetError::from_io(dst, e))?;
    for entry in fs::read_dir(src).map_err(|e| AssetError::from_io(src, e))? {
        let entry = entry.map_err(|e| AssetError::from_io(src, e))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| AssetError::from_io(&from, e))?;
        if file_type.is_dir() {
            copy_tree(&from, &to)?;
        } else {
            fs::copy(&from, &to).map_err(|e| AssetError::from_io(&from, e))?;
        }
    }
    Ok(())
}
