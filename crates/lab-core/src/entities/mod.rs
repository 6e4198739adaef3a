//! Entity structs for all stored domain objects.
//!
//! Each entity maps to a table in the libSQL database. All structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema` for JSON output and schema
//! validation.
//!
//! Relationships are stored as ids, never as nested objects: a worker's
//! result collection and a group's member list are derived by indexed lookups.

mod audit;
mod component;
mod component_result;
mod group_result;
mod study;
mod study_result;
mod user;
mod worker;

pub use audit::AuditEntry;
pub use component::Component;
pub use component_result::ComponentResult;
pub use group_result::GroupResult;
pub use study::Study;
pub use study_result::StudyResult;
pub use user::User;
pub use worker::Worker;
