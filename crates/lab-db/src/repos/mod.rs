//! Repository modules: inserts, lookups and row mappings per entity.
//!
//! Each module adds methods to `LabService` via `impl LabService` blocks.
//! Public methods are reads on the service connection. Crate-internal `*_in`
//! helpers take the connection of an open transaction and are composed by
//! the lifecycle layer.

pub mod audit;
pub mod component;
pub mod component_result;
pub mod group_result;
pub mod study;
pub mod study_result;
pub mod user;
pub mod worker;
