//! Study and result lifecycle.
//!
//! - [`cascade`]: ordered, resumable removal of one study result
//! - `results`: result production and removal
//! - `studies`: create, edit, lock, clone, remove, members, component order
//! - `transfer`: archive export and import
//!
//! Study-level operations take the acting user explicitly and require them to
//! be a member of the study (except create and import). Precondition checks
//! run before the transaction opens; concurrent writers are last-writer-wins.

pub mod cascade;
mod error;
mod results;
mod studies;
mod transfer;

pub use cascade::{RemovalReport, RemovalStage};
pub use error::LifecycleError;
pub use transfer::StudyArchive;
