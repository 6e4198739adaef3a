//! Zip packaging for study export and import.

use std::fs;
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::AssetError;

/// Packs a directory plus one loose file into an archive and back.
pub trait Archiver: Send + Sync {
    /// Archive `dir` (under its own name) and `extra_file` (at the top level).
    ///
    /// # Errors
    ///
    /// Returns `AssetError` if a file cannot be read or the archive cannot be written.
    fn zip(&self, dir: &Path, extra_file: &Path) -> Result<Vec<u8>, AssetError>;

    /// Extract an archive into a fresh scratch directory.
    ///
    /// The directory is deleted when the returned `TempDir` is dropped.
    ///
    /// # Errors
    ///
    /// `AssetError::Archive` for unreadable archives or entries that would
    /// land outside the scratch directory.
    fn unzip(&self, bytes: &[u8]) -> Result<TempDir, AssetError>;
}

/// Deflate-compressed zip archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiver;

impl Archiver for ZipArchiver {
    fn zip(&self, dir: &Path, extra_file: &Path) -> Result<Vec<u8>, AssetError> {
        let dir_name = file_name_of(dir)?;
        let extra_name = file_name_of(extra_file)?;

        let mut entries = Vec::new();
        collect(dir, Path::new(&dir_name), &mut entries)?;
        entries.sort();

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = ZipWriter::new(&mut cursor);
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

            writer
                .add_directory(dir_name.as_str(), options)
                .map_err(|e| AssetError::Archive(format!("add directory {dir_name}: {e}")))?;

            for (rel, is_dir) in &entries {
                let name = entry_name(rel);
                if *is_dir {
                    writer
                        .add_directory(name.as_str(), options)
                        .map_err(|e| AssetError::Archive(format!("add directory {name}: {e}")))?;
                    continue;
                }
                // rel starts with dir_name, so strip it to get back to the source
                let source = dir.join(rel.strip_prefix(&dir_name).unwrap_or(rel));
                let bytes = fs::read(&source).map_err(|e| AssetError::from_io(&source, e))?;
                writer
                    .start_file(name.as_str(), options)
                    .map_err(|e| AssetError::Archive(format!("start entry {name}: {e}")))?;
                writer
                    .write_all(&bytes)
                    .map_err(|e| AssetError::Archive(format!("write entry {name}: {e}")))?;
            }

            let bytes = fs::read(extra_file).map_err(|e| AssetError::from_io(extra_file, e))?;
            writer
                .start_file(extra_name.as_str(), options)
                .map_err(|e| AssetError::Archive(format!("start entry {extra_name}: {e}")))?;
            writer
                .write_all(&bytes)
                .map_err(|e| AssetError::Archive(format!("write entry {extra_name}: {e}")))?;

            writer
                .finish()
                .map_err(|e| AssetError::Archive(format!("finalize archive: {e}")))?;
        }

        let bytes = cursor.into_inner();
        tracing::debug!(
            dir = %dir.display(),
            entries = entries.len() + 2,
            size = bytes.len(),
            "assets: archive written"
        );
        Ok(bytes)
    }

    fn unzip(&self, bytes: &[u8]) -> Result<TempDir, AssetError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| AssetError::Archive(format!("failed to read archive: {e}")))?;

        let scratch = tempfile::Builder::new()
            .prefix("lab-import-")
            .tempdir()
            .map_err(|e| AssetError::from_io(&std::env::temp_dir(), e))?;

        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| AssetError::Archive(format!("failed to read archive entry: {e}")))?;

            let Some(rel) = entry.enclosed_name() else {
                return Err(AssetError::Archive(format!(
                    "unsafe path in archive: {}",
                    entry.name()
                )));
            };
            let out = scratch.path().join(rel);

            if entry.is_dir() {
                fs::create_dir_all(&out).map_err(|e| AssetError::from_io(&out, e))?;
                continue;
            }
            if let Some(parent) = out.parent() {
                fs::create_dir_all(parent).map_err(|e| AssetError::from_io(parent, e))?;
            }
            let mut file = fs::File::create(&out).map_err(|e| AssetError::from_io(&out, e))?;
            io::copy(&mut entry, &mut file).map_err(|e| AssetError::from_io(&out, e))?;
        }

        tracing::debug!(
            entries = archive.len(),
            path = %scratch.path().display(),
            "assets: archive extracted"
        );
        Ok(scratch)
    }
}

fn file_name_of(path: &Path) -> Result<String, AssetError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
        .ok_or_else(|| AssetError::Archive(format!("no usable file name: {}", path.display())))
}

/// Archive entry names always use `/`.
fn entry_name(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}

/// Walk `dir`, recording `(prefix/relative, is_dir)` for every entry below it.
fn collect(dir: &Path, prefix: &Path, out: &mut Vec<(PathBuf, bool)>) -> Result<(), AssetError> {
    for entry in fs::read_dir(dir).map_err(|e| AssetError::from_io(dir, e))? {
        let entry = entry.map_err(|e| AssetError::from_io(dir, e))?;
        let path = entry.path();
        let rel = prefix.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| AssetError::from_io(&path, e))?;
        if file_type.is_dir() {
            out.push((rel.clone(), true));
            collect(&path, &rel, out)?;
        } else {
            out.push((rel, false));
        }
    }
    Ok(())
}
