//! # lab-assets
//!
//! Filesystem collaborators of the study lifecycle:
//! - [`AssetStore`]: per-study asset directories (`study_<id>`) under one root
//! - [`Archiver`]: zip packaging of an asset directory plus a definition file
//! - [`naming`]: filesystem-safe names derived from study titles
//!
//! Directory and archive operations are not transactional with the database.
//! Errors keep "not found", "permission denied" and "already exists" apart so
//! callers can decide between retrying and giving up.

mod archive;
mod error;
pub mod naming;
mod store;

pub use archive::{Archiver, ZipArchiver};
pub use error::AssetError;
pub use store::{AssetStore, LocalAssetStore, find_files};
