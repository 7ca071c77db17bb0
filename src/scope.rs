//! Scope resolution.
//!
//! A scope is an independently-partitioned region of the timeline: either
//! one annotation on the boundary layer, or the whole graph when the
//! boundary is the root layer.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::partitioner::PartitionError;
use crate::store::GraphStore;
use crate::types::{Annotation, AnnotationId};

/// What a scope is bounded by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ScopeSource {
    /// The whole graph.
    WholeGraph,
    /// A boundary annotation.
    Annotation(Annotation),
}

/// A bounded region of the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    /// Start offset.
    pub start: f64,
    /// End offset.
    pub end: f64,
    /// Boundary.
    pub source: ScopeSource,
}

impl Scope {
    /// Boundary annotation, if this is not the whole-graph scope.
    pub fn annotation(&self) -> Option<&Annotation> {
        match &self.source {
            ScopeSource::WholeGraph => None,
            ScopeSource::Annotation(annotation) => Some(annotation),
        }
    }

    /// Boundary annotation id, if any.
    pub fn id(&self) -> Option<&AnnotationId> {
        self.annotation().map(|a| &a.id)
    }

    /// Length of the scope in offset units.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Enumerate the scopes for a boundary layer, in timeline order.
pub fn resolve_scopes<S: GraphStore>(store: &S, boundary_layer_id: &str) -> Result<Vec<Scope>, PartitionError> {
    let schema = store.schema();
    if schema.is_root(boundary_layer_id) {
        let span = store.graph_span().map_err(PartitionError::from_store)?;
        return Ok(span
            .map(|(start, end)| Scope {
                start,
                end,
                source: ScopeSource::WholeGraph,
            })
            .into_iter()
            .collect());
    }
    if schema.layer(boundary_layer_id).is_none() {
        return Err(ConfigError::UnknownLayer {
            parameter: "boundaryLayerId",
            layer_id: boundary_layer_id.to_string(),
        }
        .into());
    }
    let boundaries = store
        .annotations(boundary_layer_id)
        .map_err(PartitionError::from_store)?;
    Ok(boundaries
        .into_iter()
        .map(|annotation| Scope {
            start: annotation.start,
            end: annotation.end,
            source: ScopeSource::Annotation(annotation),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryGraphStore;
    use crate::types::{Layer, Schema};

    fn make_store() -> InMemoryGraphStore {
        let schema = Schema::new().with_layer(Layer::new("topic", "Topics"));
        let mut store = InMemoryGraphStore::new("g", schema);
        for (id, start, end) in [("t2", 75.0, 100.0), ("t1", 25.0, 50.0)] {
            store
                .add_annotation(Annotation {
                    id: AnnotationId::new(id),
                    layer_id: "topic".to_string(),
                    label: id.to_string(),
                    start,
                    end,
                    parent_id: None,
                    ordinal: 0,
                })
                .unwrap();
        }
        store
    }

    #[test]
    fn test_whole_graph_scope() {
        let mut store = make_store();
        store.set_span(0.0, 100.0);
        let scopes = resolve_scopes(&store, "transcript").unwrap();
        assert_eq!(scopes.len(), 1);
        assert_eq!((scopes[0].start, scopes[0].end), (0.0, 100.0));
        assert!(scopes[0].id().is_none());
    }

    #[test]
    fn test_empty_graph_has_no_scope() {
        let store = InMemoryGraphStore::new("empty", Schema::new());
        assert!(resolve_scopes(&store, "transcript").unwrap().is_empty());
    }

    #[test]
    fn test_layer_scopes_in_timeline_order() {
        let store = make_store();
        let scopes = resolve_scopes(&store, "topic").unwrap();
        let ids: Vec<_> = scopes.iter().filter_map(|s| s.id()).map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
    }

    #[test]
    fn test_unknown_boundary_is_config_error() {
        let store = make_store();
        assert!(matches!(
            resolve_scopes(&store, "nope"),
            Err(PartitionError::Config(ConfigError::UnknownLayer { .. }))
        ));
    }
}
