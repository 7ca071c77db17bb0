//! Core types for the partitioner.

pub mod annotation;
pub mod layer;
pub mod schema;
pub mod window;
pub mod report;

pub use annotation::{Annotation, AnnotationId, NewAnnotation};
pub use layer::{Alignment, Layer, LayerType};
pub use schema::{Schema, DEFAULT_ROOT_LAYER_ID};
pub use window::{Measure, Window, WindowKind, OFFSET_EPSILON};
pub use report::{PartitionReport, PlannedWindow, ScopePlan};
