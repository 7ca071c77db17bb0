//! In-memory graph store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Annotation, AnnotationId, NewAnnotation, Schema};
use super::GraphStore;

/// Error type for in-memory store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InMemoryError {
    /// Layer is not defined in the schema (or is the root).
    #[error("Unknown layer: {0}")]
    UnknownLayer(String),
    /// Parent annotation not found.
    #[error("Annotation {id} references unknown parent {parent}")]
    UnknownParent {
        /// Annotation being added.
        id: AnnotationId,
        /// Missing parent.
        parent: AnnotationId,
    },
    /// Parent annotation is on the wrong layer.
    #[error("Annotation {id} must have a parent on {expected}, found {found}")]
    ParentLayerMismatch {
        /// Annotation being added.
        id: AnnotationId,
        /// Layer the schema requires.
        expected: String,
        /// Layer of the given parent.
        found: String,
    },
    /// End precedes start.
    #[error("Annotation {id} ends ({end}) before it starts ({start})")]
    InvertedInterval {
        /// Annotation being added.
        id: AnnotationId,
        /// Start offset.
        start: f64,
        /// End offset.
        end: f64,
    },
    /// Id already in use.
    #[error("Duplicate annotation id: {0}")]
    DuplicateId(AnnotationId),
}

/// Serializable form of a whole graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Graph identifier.
    pub id: String,
    /// Layer schema.
    pub schema: Schema,
    /// Explicit `[start, end]` of the graph timeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<(f64, f64)>,
    /// All annotations.
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

/// In-memory annotation graph.
///
/// Uses BTreeMap for deterministic iteration order.
#[derive(Debug, Clone)]
pub struct InMemoryGraphStore {
    graph_id: String,
    schema: Schema,
    /// Explicit timeline span; computed from annotations when unset.
    span: Option<(f64, f64)>,
    annotations: BTreeMap<AnnotationId, Annotation>,
    /// Layer -> annotation ids.
    by_layer: BTreeMap<String, Vec<AnnotationId>>,
    /// (layer, parent) -> highest sibling ordinal so far.
    last_ordinal: BTreeMap<(String, Option<AnnotationId>), u32>,
}

impl InMemoryGraphStore {
    /// Create an empty graph.
    pub fn new(graph_id: impl Into<String>, schema: Schema) -> Self {
        Self {
            graph_id: graph_id.into(),
            schema,
            span: None,
            annotations: BTreeMap::new(),
            by_layer: BTreeMap::new(),
            last_ordinal: BTreeMap::new(),
        }
    }

    /// Load a graph from its serialized form.
    ///
    /// Annotations may appear in any order; parents are inserted first.
    pub fn from_document(document: GraphDocument) -> Result<Self, InMemoryError> {
        let GraphDocument { id, schema, span, mut annotations } = document;
        let mut store = Self::new(id, schema);
        store.span = span;
        annotations.sort_by_cached_key(|a| store.schema.ancestors(&a.layer_id).len());
        for annotation in annotations {
            store.add_annotation(annotation)?;
        }
        Ok(store)
    }

    /// Serialize the whole graph.
    pub fn to_document(&self) -> GraphDocument {
        let mut annotations: Vec<Annotation> = self.annotations.values().cloned().collect();
        annotations.sort_by(|a, b| {
            a.layer_id.cmp(&b.layer_id).then_with(|| Annotation::offset_order(a, b))
        });
        GraphDocument {
            id: self.graph_id.clone(),
            schema: self.schema.clone(),
            span: self.span,
            annotations,
        }
    }

    /// Set the timeline span explicitly.
    pub fn set_span(&mut self, start: f64, end: f64) {
        self.span = Some((start, end));
    }

    /// Mutable access to the schema (for layer provisioning).
    pub fn schema_mut(&mut self) -> &mut Schema {
        &mut self.schema
    }

    /// Add a fully-formed annotation.
    ///
    /// An `ordinal` of 0 is replaced with one past the highest ordinal among
    /// siblings; any other value is kept.
    pub fn add_annotation(&mut self, mut annotation: Annotation) -> Result<AnnotationId, InMemoryError> {
        if self.annotations.contains_key(&annotation.id) {
            return Err(InMemoryError::DuplicateId(annotation.id));
        }
        let layer = self
            .schema
            .layer(&annotation.layer_id)
            .ok_or_else(|| InMemoryError::UnknownLayer(annotation.layer_id.clone()))?;
        if annotation.end < annotation.start {
            return Err(InMemoryError::InvertedInterval {
                id: annotation.id,
                start: annotation.start,
                end: annotation.end,
            });
        }

        let expected_parent_layer = layer.parent_id.clone();
        match (&annotation.parent_id, expected_parent_layer) {
            (Some(parent_id), expected) => {
                let parent = self.annotations.get(parent_id).ok_or_else(|| InMemoryError::UnknownParent {
                    id: annotation.id.clone(),
                    parent: parent_id.clone(),
                })?;
                let expected = expected.unwrap_or_else(|| self.schema.root_layer_id.clone());
                if parent.layer_id != expected {
                    return Err(InMemoryError::ParentLayerMismatch {
                        id: annotation.id.clone(),
                        expected,
                        found: parent.layer_id.clone(),
                    });
                }
            }
            (None, Some(expected)) => {
                return Err(InMemoryError::ParentLayerMismatch {
                    id: annotation.id.clone(),
                    expected,
                    found: self.schema.root_layer_id.clone(),
                });
            }
            (None, None) => {}
        }

        let last = self
            .last_ordinal
            .entry((annotation.layer_id.clone(), annotation.parent_id.clone()))
            .or_default();
        if annotation.ordinal == 0 {
            annotation.ordinal = last.saturating_add(1);
        }
        *last = (*last).max(annotation.ordinal);

        let id = annotation.id.clone();
        self.by_layer
            .entry(annotation.layer_id.clone())
            .or_default()
            .push(id.clone());
        self.annotations.insert(id.clone(), annotation);
        Ok(id)
    }

    /// Number of annotations in the graph.
    pub fn num_annotations(&self) -> usize {
        self.annotations.len()
    }

    fn layer_annotations(&self, layer_id: &str) -> impl Iterator<Item = &Annotation> {
        self.by_layer
            .get(layer_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.annotations.get(id))
    }

    fn sorted<'a>(iter: impl Iterator<Item = &'a Annotation>) -> Vec<Annotation> {
        let mut list: Vec<Annotation> = iter.cloned().collect();
        list.sort_by(Annotation::offset_order);
        list
    }
}

impl GraphStore for InMemoryGraphStore {
    type Error = InMemoryError;

    fn graph_id(&self) -> &str {
        &self.graph_id
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn graph_span(&self) -> Result<Option<(f64, f64)>, Self::Error> {
        if self.span.is_some() {
            return Ok(self.span);
        }
        let span = self.annotations.values().fold(None, |acc: Option<(f64, f64)>, a| match acc {
            None => Some((a.start, a.end)),
            Some((start, end)) => Some((start.min(a.start), end.max(a.end))),
        });
        Ok(span)
    }

    fn annotation(&self, id: &AnnotationId) -> Result<Option<Annotation>, Self::Error> {
        Ok(self.annotations.get(id).cloned())
    }

    fn annotations(&self, layer_id: &str) -> Result<Vec<Annotation>, Self::Error> {
        Ok(Self::sorted(self.layer_annotations(layer_id)))
    }

    fn annotations_within(
        &self,
        layer_id: &str,
        start: f64,
        end: f64,
    ) -> Result<Vec<Annotation>, Self::Error> {
        Ok(Self::sorted(
            self.layer_annotations(layer_id).filter(|a| a.is_within(start, end)),
        ))
    }

    fn children(&self, parent: &AnnotationId, layer_id: &str) -> Result<Vec<Annotation>, Self::Error> {
        Ok(Self::sorted(
            self.layer_annotations(layer_id)
                .filter(|a| a.parent_id.as_ref() == Some(parent)),
        ))
    }

    fn create_annotation(&mut self, annotation: NewAnnotation) -> Result<AnnotationId, Self::Error> {
        let NewAnnotation { layer_id, label, start, end, parent_id, ordinal } = annotation;
        self.add_annotation(Annotation {
            id: AnnotationId::generate(),
            layer_id,
            label,
            start,
            end,
            parent_id,
            ordinal,
        })
    }
}
