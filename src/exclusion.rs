//! Whole-graph exclusion by attribute value.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::store::GraphStore;

/// Skip a graph when one of its attribute labels is in `values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRule {
    /// Attribute layer to inspect.
    pub attribute_layer_id: String,
    /// Labels that cause the graph to be skipped.
    pub values: BTreeSet<String>,
}

impl ExclusionRule {
    /// Build a rule from a comma-separated value list.
    ///
    /// Values are matched literally (no trimming). Returns `None` when the
    /// list holds no values, in which case nothing is excluded.
    pub fn parse(attribute_layer_id: impl Into<String>, values: &str) -> Option<Self> {
        let values: BTreeSet<String> = values
            .split(',')
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        if values.is_empty() {
            return None;
        }
        Some(Self {
            attribute_layer_id: attribute_layer_id.into(),
            values,
        })
    }

    /// The first matching attribute label, if the graph is excluded.
    pub fn matches<S: GraphStore>(&self, store: &S) -> Result<Option<String>, S::Error> {
        let attributes = store.annotations(&self.attribute_layer_id)?;
        Ok(attributes
            .into_iter()
            .map(|a| a.label)
            .find(|label| self.values.contains(label)))
    }
}
