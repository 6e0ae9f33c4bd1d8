//! # Service Planner Core
//!
//! Pure domain logic for planning church services: the rehearsal slot grid,
//! normalization of stored task responses, the availability aggregators and
//! the resequencer that keeps service items contiguously ordered.
//!
//! Nothing in this crate performs I/O. Callers fetch rows through a
//! persistence collaborator and hand them over as plain values; the same
//! inputs always produce the same outputs.

/// Aggregation of task responses into reports
pub mod aggregate;
/// Error types shared across the workspace
pub mod errors;
/// Domain models
pub mod models;
/// Canonicalization of raw response payloads
pub mod normalize;
/// Reordering of sequenced collections
pub mod resequence;
/// Start offsets for the items of a service plan
pub mod run_sheet;
/// Rehearsal slot grid generation
pub mod slots;
