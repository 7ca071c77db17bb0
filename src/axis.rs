//! Measurement axis construction.
//!
//! Turns a scope into the quantity the planner windows: either the ordered
//! counting-layer units inside it, or its duration.

use std::num::NonZeroUsize;

use crate::config::Measurement;
use crate::partitioner::PartitionError;
use crate::planner::{plan_windows, PlanSpec, WindowAlignment};
use crate::scope::{Scope, ScopeSource};
use crate::store::GraphStore;
use crate::types::{Annotation, PlannedWindow};

/// The measurable quantity of one scope.
#[derive(Debug, Clone, PartialEq)]
pub enum Axis {
    /// Ordered counting units.
    Units(Vec<Annotation>),
    /// Continuous offsets.
    Duration {
        /// Scope start.
        start: f64,
        /// Scope end.
        end: f64,
    },
}

/// Planner settings independent of the axis kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    /// Placement of full windows.
    pub alignment: WindowAlignment,
    /// Cap on windows.
    pub max_windows: Option<NonZeroUsize>,
    /// Whether leftovers are kept.
    pub leftovers: bool,
}

impl Axis {
    /// Build the axis for a scope.
    ///
    /// Units are taken from the counting layer as follows:
    /// - whole graph, counting layer under turns: turn by turn, in turn order
    /// - whole graph otherwise: all counting units
    /// - scope layer is an ancestor of the counting layer: the scope's descendants
    /// - otherwise: counting units lying within the scope's bounds
    pub fn build<S: GraphStore>(store: &S, scope: &Scope, measurement: &Measurement) -> Result<Self, PartitionError> {
        let layer_id = match measurement {
            Measurement::Duration { .. } => {
                return Ok(Self::Duration {
                    start: scope.start,
                    end: scope.end,
                })
            }
            Measurement::Units { layer_id, .. } => layer_id.as_str(),
        };

        let schema = store.schema();
        let units = match &scope.source {
            ScopeSource::WholeGraph => match schema.turn_layer_id.as_deref() {
                Some(turn) if schema.has_ancestor(layer_id, turn) => {
                    let mut units = Vec::new();
                    for turn in store.annotations(turn).map_err(PartitionError::from_store)? {
                        units.extend(store.descendants(&turn, layer_id).map_err(PartitionError::from_store)?);
                    }
                    units
                }
                _ => store.annotations(layer_id).map_err(PartitionError::from_store)?,
            },
            ScopeSource::Annotation(boundary) if schema.has_ancestor(layer_id, &boundary.layer_id) => store
                .descendants(boundary, layer_id)
                .map_err(PartitionError::from_store)?,
            ScopeSource::Annotation(boundary) => store
                .annotations_within(layer_id, boundary.start, boundary.end)
                .map_err(PartitionError::from_store)?,
        };
        Ok(Self::Units(units))
    }

    /// Axis length: unit count, or duration.
    pub fn len(&self) -> f64 {
        match self {
            Self::Units(units) => units.len() as f64,
            Self::Duration { start, end } => end - start,
        }
    }

    /// Whether there is nothing to window.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Units(units) => units.is_empty(),
            Self::Duration { start, end } => end <= start,
        }
    }

    /// Counting units, for discrete axes.
    pub fn units(&self) -> &[Annotation] {
        match self {
            Self::Units(units) => units,
            Self::Duration { .. } => &[],
        }
    }

    /// Plan windows and map them back onto graph offsets.
    pub fn plan(&self, measurement: &Measurement, layout: Layout) -> Vec<PlannedWindow> {
        match (self, measurement) {
            (Self::Units(units), Measurement::Units { size, .. }) => {
                let spec = PlanSpec::new(*size)
                    .aligned(layout.alignment)
                    .capped(layout.max_windows)
                    .with_leftovers(layout.leftovers);
                plan_windows(units.len(), &spec)
                    .into_iter()
                    .map(|w| PlannedWindow {
                        ordinal: w.ordinal,
                        kind: w.kind,
                        label: w.label(),
                        start: units[w.start].start,
                        end: units[w.end - 1].end,
                        units: Some((w.start, w.end)),
                    })
                    .collect()
            }
            (Self::Duration { start, end }, Measurement::Duration { size }) => {
                let spec = PlanSpec::new(*size)
                    .aligned(layout.alignment)
                    .capped(layout.max_windows)
                    .with_leftovers(layout.leftovers);
                let length = end - start;
                plan_windows(length, &spec)
                    .into_iter()
                    .map(|w| PlannedWindow {
                        ordinal: w.ordinal,
                        kind: w.kind,
                        label: w.label(),
                        start: start + w.start,
                        end: if w.end >= length { *end } else { start + w.end },
                        units: None,
                    })
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}
