//! Planning and run reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::annotation::AnnotationId;
use super::window::WindowKind;

/// A planned window mapped back onto graph offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedWindow {
    /// Position within the scope (1-based, timeline order).
    pub ordinal: usize,
    /// Full or leftover.
    pub kind: WindowKind,
    /// Literal size label.
    pub label: String,
    /// Start offset in the graph.
    pub start: f64,
    /// End offset in the graph.
    pub end: f64,
    /// Half-open range of axis unit indices, for discrete axes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<(usize, usize)>,
}

impl PlannedWindow {
    /// Number of units covered, for discrete axes.
    pub fn unit_count(&self) -> Option<usize> {
        self.units.map(|(from, to)| to - from)
    }
}

/// The windows planned for one scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopePlan {
    /// Boundary annotation, or `None` for the whole-graph scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_id: Option<AnnotationId>,
    /// Scope start offset.
    pub start: f64,
    /// Scope end offset.
    pub end: f64,
    /// Number of counting units, for discrete axes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_count: Option<usize>,
    /// Planned windows in timeline order.
    pub windows: Vec<PlannedWindow>,
}

/// Outcome of partitioning one graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionReport {
    /// Graph that was partitioned.
    pub graph_id: String,
    /// Fingerprint of the configuration used.
    pub config_hash: String,
    /// Attribute value that caused the graph to be skipped, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded: Option<String>,
    /// Scopes fully projected.
    pub scopes_processed: usize,
    /// Logical windows planned across processed scopes.
    pub windows_planned: usize,
    /// Annotations written to the destination layer.
    pub created: Vec<AnnotationId>,
    /// Whether the run stopped early on cancellation.
    pub cancelled: bool,
    /// Run start.
    pub started_at: DateTime<Utc>,
    /// Run end.
    pub finished_at: DateTime<Utc>,
}

impl PartitionReport {
    pub(crate) fn begin(graph_id: impl Into<String>, config_hash: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            graph_id: graph_id.into(),
            config_hash: config_hash.into(),
            excluded: None,
            scopes_processed: 0,
            windows_planned: 0,
            created: Vec::new(),
            cancelled: false,
            started_at: now,
            finished_at: now,
        }
    }

    pub(crate) fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    /// Number of annotations created.
    pub fn annotations_created(&self) -> usize {
        self.created.len()
    }
}
