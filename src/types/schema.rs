//! Layer schema of an annotation graph.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::layer::Layer;

/// Default id of the whole-graph root layer.
pub const DEFAULT_ROOT_LAYER_ID: &str = "transcript";

/// The layer hierarchy of a graph.
///
/// The root layer is implicit: it represents the graph itself and is never
/// stored in `layers`. Layers whose `parent_id` is `None` are its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Id of the whole-graph root layer.
    #[serde(default = "default_root")]
    pub root_layer_id: String,
    /// Participant layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_layer_id: Option<String>,
    /// Speaker turn layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_layer_id: Option<String>,
    /// Utterance layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utterance_layer_id: Option<String>,
    /// Word layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_layer_id: Option<String>,
    /// Layers by id.
    #[serde(default)]
    pub layers: BTreeMap<String, Layer>,
}

fn default_root() -> String {
    DEFAULT_ROOT_LAYER_ID.to_string()
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            root_layer_id: default_root(),
            participant_layer_id: None,
            turn_layer_id: None,
            utterance_layer_id: None,
            word_layer_id: None,
            layers: BTreeMap::new(),
        }
    }
}

impl Schema {
    /// Create an empty schema with the default root layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Designate the structural layers.
    pub fn with_structure(
        mut self,
        participant: impl Into<String>,
        turn: impl Into<String>,
        utterance: impl Into<String>,
        word: impl Into<String>,
    ) -> Self {
        self.participant_layer_id = Some(participant.into());
        self.turn_layer_id = Some(turn.into());
        self.utterance_layer_id = Some(utterance.into());
        self.word_layer_id = Some(word.into());
        self
    }

    /// Add (or replace) a layer.
    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.insert(layer.id.clone(), layer);
    }

    /// Builder form of [`Schema::add_layer`].
    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.add_layer(layer);
        self
    }

    /// Whether `id` names the whole-graph root layer.
    pub fn is_root(&self, id: &str) -> bool {
        id == self.root_layer_id
    }

    /// Look up a (non-root) layer.
    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.get(id)
    }

    /// Mutable lookup of a (non-root) layer.
    pub fn layer_mut(&mut self, id: &str) -> Option<&mut Layer> {
        self.layers.get_mut(id)
    }

    /// Whether `id` is the root or a defined layer.
    pub fn contains(&self, id: &str) -> bool {
        self.is_root(id) || self.layers.contains_key(id)
    }

    /// Effective parent of a layer: the root for top-level layers,
    /// `None` for the root itself or unknown layers.
    pub fn parent_of(&self, id: &str) -> Option<&str> {
        if self.is_root(id) {
            return None;
        }
        self.layers
            .get(id)
            .map(|l| l.parent_id.as_deref().unwrap_or(self.root_layer_id.as_str()))
    }

    /// Ancestors of a layer, nearest first, ending with the root.
    pub fn ancestors(&self, id: &str) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            // guard against malformed cyclic schemas
            if chain.contains(&parent) || chain.len() > self.layers.len() {
                break;
            }
            chain.push(parent);
            current = self.parent_of(parent);
        }
        chain
    }

    /// Whether `ancestor` is a strict ancestor of `id`.
    pub fn has_ancestor(&self, id: &str, ancestor: &str) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// Layers on the path from `ancestor` (exclusive) down to `id` (inclusive).
    ///
    /// Returns `None` if `ancestor` is not a strict ancestor of `id`.
    pub fn path_from(&self, ancestor: &str, id: &str) -> Option<Vec<String>> {
        let ancestors = self.ancestors(id);
        let position = ancestors.iter().position(|a| *a == ancestor)?;
        let mut path: Vec<String> = ancestors[..position]
            .iter()
            .rev()
            .map(|s| s.to_string())
            .collect();
        path.push(id.to_string());
        Some(path)
    }

    /// Structural layers that may never be used as an output layer.
    pub fn protected_layer_ids(&self) -> Vec<&str> {
        [
            &self.participant_layer_id,
            &self.turn_layer_id,
            &self.utterance_layer_id,
            &self.word_layer_id,
        ]
        .into_iter()
        .filter_map(|id| id.as_deref())
        .collect()
    }

    /// Whether `id` is a protected structural layer.
    pub fn is_protected(&self, id: &str) -> bool {
        self.protected_layer_ids().contains(&id)
    }
}
