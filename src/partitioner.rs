//! Partitioner orchestration.
//!
//! Runs the pipeline for one graph:
//!
//! ```text
//! exclusion check → scopes → (axis → plan → project → write) per scope
//! ```
//!
//! Each scope is projected in full before anything is written, so a
//! cancelled run never leaves a scope half-materialized.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::axis::{Axis, Layout};
use crate::config::{ConfigError, PartitionerConfig, TaskParameters};
use crate::projector::{Projector, SerialCounter};
use crate::scope::resolve_scopes;
use crate::store::GraphStore;
use crate::types::{PartitionReport, Schema, ScopePlan};

/// Error type for partitioning runs.
#[derive(Debug, thiserror::Error)]
pub enum PartitionError {
    /// Configuration is invalid for this graph.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Store error.
    #[error("Store error: {0}")]
    Store(String),
    /// Destination layer missing from the graph being partitioned.
    #[error("Destination layer {0} is not defined in the graph schema")]
    MissingDestination(String),
    /// A scope has no ancestor on the destination's parent layer.
    #[error("Scope {scope} has no ancestor on layer {layer_id}")]
    MissingAncestor {
        /// Scope boundary (or graph id).
        scope: String,
        /// Layer searched.
        layer_id: String,
    },
}

impl PartitionError {
    /// Create a store error from any error type.
    pub fn from_store<E: std::error::Error>(e: E) -> Self {
        Self::Store(e.to_string())
    }
}

/// A configured partitioner, ready to run against graphs.
#[derive(Debug, Clone)]
pub struct Partitioner {
    config: PartitionerConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl Partitioner {
    /// Validate parameters and provision the destination layer.
    pub fn configure(params: &TaskParameters, schema: &mut Schema) -> Result<Self, ConfigError> {
        let config = PartitionerConfig::validate(params, schema)?;
        config.provision(schema);
        info!(
            config_hash = %config.params_hash(),
            destination = %config.destination.layer_id,
            "{}",
            config.describe()
        );
        Ok(Self::new(config))
    }

    /// Wrap an already validated and provisioned configuration.
    pub fn new(config: PartitionerConfig) -> Self {
        Self { config, cancel: None }
    }

    /// Stop between scopes once `flag` is set.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// The validated configuration.
    pub fn config(&self) -> &PartitionerConfig {
        &self.config
    }

    /// Layers that must be populated before this partitioner runs.
    pub fn required_layers(&self) -> Vec<String> {
        self.config.required_layers()
    }

    /// Layers this partitioner writes to.
    pub fn output_layers(&self) -> Vec<String> {
        self.config.output_layers()
    }

    /// The attribute value that excludes this graph, if any.
    pub fn check_exclusion<S: GraphStore>(&self, store: &S) -> Result<Option<String>, PartitionError> {
        match &self.config.exclusion {
            None => Ok(None),
            Some(rule) => rule.matches(store).map_err(PartitionError::from_store),
        }
    }

    /// Plan every scope without writing anything.
    ///
    /// An excluded graph yields no plans.
    pub fn plan<S: GraphStore>(&self, store: &S) -> Result<Vec<ScopePlan>, PartitionError> {
        self.ensure_schema(store.schema())?;
        if let Some(value) = self.check_exclusion(store)? {
            info!(graph_id = %store.graph_id(), value = %value, "Excluded graph, nothing to plan");
            return Ok(Vec::new());
        }
        let measurement = &self.config.measurement;
        let mut plans = Vec::new();
        for scope in resolve_scopes(store, &self.config.boundary_layer_id)? {
            let axis = Axis::build(store, &scope, measurement)?;
            let windows = axis.plan(measurement, self.layout());
            plans.push(ScopePlan {
                scope_id: scope.id().cloned(),
                start: scope.start,
                end: scope.end,
                unit_count: match &axis {
                    Axis::Units(units) => Some(units.len()),
                    Axis::Duration { .. } => None,
                },
                windows,
            });
        }
        Ok(plans)
    }

    /// Partition one graph, writing the results to the destination layer.
    pub fn transform<S: GraphStore>(&self, store: &mut S) -> Result<PartitionReport, PartitionError> {
        let mut report = PartitionReport::begin(store.graph_id(), self.config.params_hash());
        self.ensure_schema(store.schema())?;

        if let Some(value) = self.check_exclusion(&*store)? {
            info!(graph_id = %store.graph_id(), value = %value, "Skipping excluded graph");
            report.excluded = Some(value);
            return Ok(report.finish());
        }

        let measurement = &self.config.measurement;
        let projector = Projector::new(&self.config.destination, self.config.label_mode);
        let mut serial = SerialCounter::default();
        let scopes = resolve_scopes(&*store, &self.config.boundary_layer_id)?;

        for scope in &scopes {
            if self.is_cancelled() {
                warn!(
                    graph_id = %store.graph_id(),
                    processed = report.scopes_processed,
                    remaining = scopes.len() - report.scopes_processed,
                    "Cancelled"
                );
                report.cancelled = true;
                break;
            }

            let axis = Axis::build(&*store, scope, measurement)?;
            let windows = axis.plan(measurement, self.layout());
            debug!(
                scope = ?scope.id(),
                start = scope.start,
                end = scope.end,
                axis_length = axis.len(),
                windows = windows.len(),
                "Planned scope"
            );

            let annotations = projector.project(&*store, scope, &axis, &windows, &mut serial)?;
            for annotation in annotations {
                trace!(start = annotation.start, end = annotation.end, label = %annotation.label, "Creating partition");
                let id = store
                    .create_annotation(annotation)
                    .map_err(PartitionError::from_store)?;
                report.created.push(id);
            }
            report.scopes_processed += 1;
            report.windows_planned += windows.len();
        }

        info!(
            graph_id = %report.graph_id,
            scopes = report.scopes_processed,
            windows = report.windows_planned,
            created = report.annotations_created(),
            "Partitioning complete"
        );
        Ok(report.finish())
    }

    fn layout(&self) -> Layout {
        Layout {
            alignment: self.config.alignment,
            max_windows: self.config.max_partitions,
            leftovers: self.config.leftovers,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    /// The graph's schema must still have every configured layer.
    fn ensure_schema(&self, schema: &Schema) -> Result<(), PartitionError> {
        if !schema.contains(&self.config.boundary_layer_id) {
            return Err(ConfigError::UnknownLayer {
                parameter: "boundaryLayerId",
                layer_id: self.config.boundary_layer_id.clone(),
            }
            .into());
        }
        if let Some(token) = self.config.token_layer_id() {
            if schema.layer(token).is_none() {
                return Err(ConfigError::UnknownLayer {
                    parameter: "tokenLayerId",
                    layer_id: token.to_string(),
                }
                .into());
            }
        }
        if schema.layer(&self.config.destination.layer_id).is_none() {
            return Err(PartitionError::MissingDestination(
                self.config.destination.layer_id.clone(),
            ));
        }
        Ok(())
    }
}
