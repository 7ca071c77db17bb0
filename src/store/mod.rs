//! Annotation graph storage backends.

pub mod memory;

use crate::types::{Annotation, AnnotationId, NewAnnotation, Schema};

/// Trait for annotation graph storage backends.
///
/// Implementations must return annotations in canonical timeline order
/// (see [`Annotation::offset_order`]). All calls are synchronous.
pub trait GraphStore {
    /// Error type for store operations.
    type Error: std::error::Error + Send + Sync;

    /// Identifier of the graph.
    fn graph_id(&self) -> &str;

    /// Layer schema of the graph.
    fn schema(&self) -> &Schema;

    /// Overall `(start, end)` span of the graph, if it has any extent.
    fn graph_span(&self) -> Result<Option<(f64, f64)>, Self::Error>;

    /// Fetch an annotation by id.
    fn annotation(&self, id: &AnnotationId) -> Result<Option<Annotation>, Self::Error>;

    /// All annotations on a layer.
    fn annotations(&self, layer_id: &str) -> Result<Vec<Annotation>, Self::Error>;

    /// Annotations on a layer lying within `[start, end]`.
    fn annotations_within(
        &self,
        layer_id: &str,
        start: f64,
        end: f64,
    ) -> Result<Vec<Annotation>, Self::Error>;

    /// Direct children of `parent` on a layer.
    fn children(&self, parent: &AnnotationId, layer_id: &str) -> Result<Vec<Annotation>, Self::Error>;

    /// Persist a new annotation, returning its id.
    fn create_annotation(&mut self, annotation: NewAnnotation) -> Result<AnnotationId, Self::Error>;

    /// Descendants of `ancestor` on `layer_id`, following the schema path.
    ///
    /// Returns an empty list when the ancestor's layer is not an ancestor
    /// of `layer_id`.
    fn descendants(&self, ancestor: &Annotation, layer_id: &str) -> Result<Vec<Annotation>, Self::Error> {
        if ancestor.layer_id == layer_id {
            return Ok(vec![ancestor.clone()]);
        }
        let Some(path) = self.schema().path_from(&ancestor.layer_id, layer_id) else {
            return Ok(Vec::new());
        };
        let mut frontier = vec![ancestor.clone()];
        for layer in &path {
            let mut next = Vec::new();
            for parent in &frontier {
                next.extend(self.children(&parent.id, layer)?);
            }
            frontier = next;
        }
        frontier.sort_by(Annotation::offset_order);
        Ok(frontier)
    }

    /// The annotation itself or its nearest ancestor on `layer_id`.
    fn ancestor_on(&self, annotation: &Annotation, layer_id: &str) -> Result<Option<Annotation>, Self::Error> {
        let mut current = annotation.clone();
        // bounded by schema depth
        for _ in 0..=self.schema().layers.len() {
            if current.layer_id == layer_id {
                return Ok(Some(current));
            }
            let Some(parent_id) = current.parent_id.clone() else {
                return Ok(None);
            };
            match self.annotation(&parent_id)? {
                Some(parent) => current = parent,
                None => return Ok(None),
            }
        }
        Ok(None)
    }
}

pub use memory::{GraphDocument, InMemoryError, InMemoryGraphStore};
