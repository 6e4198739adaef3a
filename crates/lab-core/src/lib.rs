//! # lab-core
//!
//! Core types, ID prefixes, and error types for study lifecycle management.
//!
//! This crate provides the foundational types shared across all `lab` crates:
//! - Entity structs for studies, components, users, workers and results
//! - Enums for worker types, reorder directions, audit actions and trail ops
//! - ID prefix constants
//! - Draft validation for user-submitted study and component data
//! - The structural exchange format used by study export/import
//! - Trail operation envelope for JSONL persistence
//! - Audit detail sub-types

pub mod audit_detail;
pub mod draft;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod exchange;
pub mod ids;
pub mod trail;
