//! # ag-partitioner
//!
//! Deterministic windowing of annotation-graph timelines.
//!
//! The partitioner answers one question:
//!
//! > Given a layer of scopes and a window size, where do the windows go?
//!
//! ## Core Contract
//!
//! 1. Divide each scope (a boundary annotation, or the whole graph) into
//!    contiguous fixed-size windows, counted in units of a token layer or
//!    in offset distance
//! 2. Place the windows by alignment (start, middle, end) under an optional
//!    cap, keeping partial edge windows only on request
//! 3. Write each window to the destination layer, splitting it across
//!    structural boundaries or copying unit labels where the destination
//!    layer calls for it
//!
//! ## Architecture
//!
//! ```text
//! TaskParameters → PartitionerConfig → Partitioner
//!                                          ↓
//!    ExclusionRule → Scopes → Axis → plan_windows → Projector
//!                                          ↓
//!                               GraphStore (in-memory or custom)
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same graph + same parameters → identical windows and labels
//! - Scopes and units are visited in canonical timeline order
//!   (start, end, ordinal, id)
//! - The configuration fingerprint quantizes floats before hashing

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod config;
pub mod store;
pub mod scope;
pub mod axis;
pub mod planner;
pub mod exclusion;
pub mod projector;
pub mod partitioner;
pub mod canonical;

// Re-exports
pub use types::{
    Alignment, Annotation, AnnotationId, Layer, LayerType, Measure, NewAnnotation,
    PartitionReport, PlannedWindow, Schema, ScopePlan, Window, WindowKind,
};
pub use config::{
    ConfigError, Destination, DestinationKind, LabelMode, Measurement, PartitionerConfig,
    Provision, TaskParameters,
};
pub use store::{GraphDocument, GraphStore, InMemoryError, InMemoryGraphStore};
pub use scope::{resolve_scopes, Scope, ScopeSource};
pub use axis::{Axis, Layout};
pub use planner::{plan_windows, PlanSpec, WindowAlignment};
pub use exclusion::ExclusionRule;
pub use projector::{Projector, SerialCounter};
pub use partitioner::{PartitionError, Partitioner};
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex};

/// Version of the configuration fingerprint format.
/// Increment on changes to what `params_hash` covers.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
