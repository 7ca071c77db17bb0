//! Annotation types for the annotation graph.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an annotation in the graph.
///
/// Ordered lexically so that ties in offset ordering break deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(String);

impl AnnotationId {
    /// Create an id from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(format!("a{}", Uuid::new_v4().simple()))
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AnnotationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AnnotationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A labelled interval on one layer of the graph.
///
/// `parent_id == None` means the annotation hangs directly off the graph
/// itself (the whole-graph root).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Annotation identifier.
    pub id: AnnotationId,
    /// Layer this annotation belongs to.
    pub layer_id: String,
    /// Label (free text).
    pub label: String,
    /// Start offset.
    pub start: f64,
    /// End offset.
    pub end: f64,
    /// Parent annotation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<AnnotationId>,
    /// Position among siblings on the same layer (1-based).
    #[serde(default)]
    pub ordinal: u32,
}

impl Annotation {
    /// Duration of the annotation.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether this annotation lies within `[start, end]`.
    pub fn is_within(&self, start: f64, end: f64) -> bool {
        self.start >= start && self.end <= end
    }

    /// Whether this annotation overlaps the half-open range `[start, end)`.
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        self.start < end && self.end > start
    }

    /// Canonical timeline ordering: start, end, ordinal, id.
    pub fn offset_order(a: &Annotation, b: &Annotation) -> Ordering {
        a.start
            .total_cmp(&b.start)
            .then_with(|| a.end.total_cmp(&b.end))
            .then_with(|| a.ordinal.cmp(&b.ordinal))
            .then_with(|| a.id.cmp(&b.id))
    }
}

/// An annotation to be created in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAnnotation {
    /// Target layer.
    pub layer_id: String,
    /// Label.
    pub label: String,
    /// Start offset.
    pub start: f64,
    /// End offset.
    pub end: f64,
    /// Parent annotation (`None` for the graph root).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<AnnotationId>,
    /// Requested position among siblings; 0 lets the store pick the next one.
    #[serde(default)]
    pub ordinal: u32,
}

impl NewAnnotation {
    /// Create a new annotation request.
    pub fn new(
        layer_id: impl Into<String>,
        label: impl Into<String>,
        start: f64,
        end: f64,
        parent_id: Option<AnnotationId>,
    ) -> Self {
        Self {
            layer_id: layer_id.into(),
            label: label.into(),
            start,
            end,
            parent_id,
            ordinal: 0,
        }
    }

    /// Request an explicit ordinal.
    pub fn with_ordinal(mut self, ordinal: u32) -> Self {
        self.ordinal = ordinal;
        self
    }
}
