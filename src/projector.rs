//! Annotation projection.
//!
//! Turns planned windows into annotations on the destination layer:
//!
//! ```text
//! Interval  window ──▶ one annotation under the scope's ancestor
//! Split     window ──▶ one fragment per structural instance it touches
//! CopyTag   window ──▶ one tag per unit, copying the unit's label
//! ```
//!
//! Fragments of one window share its ordinal and label; the label is the
//! window's nominal size, never the fragment's own extent.

use crate::axis::Axis;
use crate::config::{Destination, DestinationKind, LabelMode};
use crate::partitioner::PartitionError;
use crate::scope::Scope;
use crate::store::GraphStore;
use crate::types::{Annotation, NewAnnotation, PlannedWindow, WindowKind};

/// Running window number for serial labels, shared across a graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerialCounter(u64);

impl SerialCounter {
    fn advance(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    /// Number of windows labelled so far.
    pub fn count(&self) -> u64 {
        self.0
    }
}

/// Materializes windows for one destination.
#[derive(Debug, Clone, Copy)]
pub struct Projector<'a> {
    destination: &'a Destination,
    label_mode: LabelMode,
}

impl<'a> Projector<'a> {
    /// Create a projector.
    pub fn new(destination: &'a Destination, label_mode: LabelMode) -> Self {
        Self { destination, label_mode }
    }

    /// Project one scope's windows. Nothing is written.
    pub fn project<S: GraphStore>(
        &self,
        store: &S,
        scope: &Scope,
        axis: &Axis,
        windows: &[PlannedWindow],
        serial: &mut SerialCounter,
    ) -> Result<Vec<NewAnnotation>, PartitionError> {
        match &self.destination.kind {
            DestinationKind::Interval { parent_layer_id } => {
                let parent_id = match parent_layer_id {
                    None => None,
                    Some(layer_id) => {
                        let owner = match scope.annotation() {
                            Some(boundary) => store.ancestor_on(boundary, layer_id).map_err(PartitionError::from_store)?,
                            None => None,
                        };
                        let owner = owner.ok_or_else(|| PartitionError::MissingAncestor {
                            scope: scope.id().map(|id| id.to_string()).unwrap_or_else(|| store.graph_id().to_string()),
                            layer_id: layer_id.clone(),
                        })?;
                        Some(owner.id)
                    }
                };
                Ok(windows
                    .iter()
                    .map(|window| {
                        NewAnnotation::new(
                            self.destination.layer_id.as_str(),
                            self.label(window, serial),
                            window.start,
                            window.end,
                            parent_id.clone(),
                        )
                        .with_ordinal(ordinal(window))
                    })
                    .collect())
            }
            DestinationKind::Split { structure_layer_id } => match axis {
                Axis::Units(units) => self.split_units(store, units, windows, structure_layer_id, serial),
                Axis::Duration { .. } => self.split_offsets(store, windows, structure_layer_id, serial),
            },
            DestinationKind::CopyTag => {
                let units = axis.units();
                let mut tags = Vec::new();
                for window in windows.iter().filter(|w| w.kind == WindowKind::Full) {
                    let Some((from, to)) = window.units else { continue };
                    tags.extend(units[from..to].iter().map(|unit| {
                        NewAnnotation::new(
                            self.destination.layer_id.as_str(),
                            unit.label.as_str(),
                            unit.start,
                            unit.end,
                            Some(unit.id.clone()),
                        )
                        .with_ordinal(ordinal(window))
                    }));
                }
                Ok(tags)
            }
        }
    }

    fn label(&self, window: &PlannedWindow, serial: &mut SerialCounter) -> String {
        match self.label_mode {
            LabelMode::Size => window.label.clone(),
            LabelMode::Serial => serial.advance().to_string(),
        }
    }

    /// Group each window's units by their structural owner.
    ///
    /// A fragment that includes its owner's first (last) unit on the axis is
    /// widened to the owner's start (end).
    fn split_units<S: GraphStore>(
        &self,
        store: &S,
        units: &[Annotation],
        windows: &[PlannedWindow],
        structure_layer_id: &str,
        serial: &mut SerialCounter,
    ) -> Result<Vec<NewAnnotation>, PartitionError> {
        let owners = units
            .iter()
            .map(|unit| store.ancestor_on(unit, structure_layer_id))
            .collect::<Result<Vec<_>, _>>()
            .map_err(PartitionError::from_store)?;
        let owner_id = |i: usize| owners.get(i).and_then(|o| o.as_ref()).map(|o| &o.id);

        let mut fragments = Vec::new();
        for window in windows {
            let Some((from, to)) = window.units else { continue };
            let label = self.label(window, serial);
            let mut i = from;
            while i < to {
                let mut j = i + 1;
                while j < to && owner_id(j) == owner_id(i) {
                    j += 1;
                }
                match &owners[i] {
                    Some(owner) => {
                        let starts_owner = i == 0 || owner_id(i - 1) != Some(&owner.id);
                        let ends_owner = owner_id(j) != Some(&owner.id);
                        fragments.push(NewAnnotation::new(
                            self.destination.layer_id.as_str(),
                            label.as_str(),
                            if starts_owner { owner.start } else { units[i].start },
                            if ends_owner { owner.end } else { units[j - 1].end },
                            Some(owner.id.clone()),
                        )
                        .with_ordinal(ordinal(window)));
                    }
                    None => {
                        tracing::debug!(unit = %units[i].id, layer = structure_layer_id, "Unit has no structural owner, skipping");
                    }
                }
                i = j;
            }
        }
        Ok(fragments)
    }

    /// Clip each window to the structural instances it overlaps.
    fn split_offsets<S: GraphStore>(
        &self,
        store: &S,
        windows: &[PlannedWindow],
        structure_layer_id: &str,
        serial: &mut SerialCounter,
    ) -> Result<Vec<NewAnnotation>, PartitionError> {
        let instances = store
            .annotations(structure_layer_id)
            .map_err(PartitionError::from_store)?;
        let mut fragments = Vec::new();
        for window in windows {
            let label = self.label(window, serial);
            for instance in instances.iter().filter(|a| a.overlaps(window.start, window.end)) {
                fragments.push(NewAnnotation::new(
                    self.destination.layer_id.as_str(),
                    label.as_str(),
                    instance.start.max(window.start),
                    instance.end.min(window.end),
                    Some(instance.id.clone()),
                )
                .with_ordinal(ordinal(window)));
            }
        }
        Ok(fragments)
    }
}

/// Persisted ordinal of a window's annotations.
fn ordinal(window: &PlannedWindow) -> u32 {
    u32::try_from(window.ordinal).unwrap_or(u32::MAX)
}
