//! Layer definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How annotations on a layer are anchored to the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Tag: bounds are inherited from the parent.
    None,
    /// Point in time.
    Instant,
    /// Independent start and end offsets.
    Interval,
}

impl Alignment {
    /// Parse alignment from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" | "0" => Some(Self::None),
            "instant" | "1" => Some(Self::Instant),
            "interval" | "2" => Some(Self::Interval),
            _ => None,
        }
    }
}

impl Default for Alignment {
    fn default() -> Self {
        Self::Interval
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Instant => write!(f, "instant"),
            Self::Interval => write!(f, "interval"),
        }
    }
}

/// Value type of labels on a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    /// Free text.
    String,
    /// Numeric.
    Number,
    /// Boolean.
    Boolean,
}

impl Default for LayerType {
    fn default() -> Self {
        Self::String
    }
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Boolean => write!(f, "boolean"),
        }
    }
}

/// A layer of the annotation graph schema.
///
/// `parent_id == None` means the layer hangs directly off the graph root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    /// Layer identifier.
    pub id: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Parent layer (`None` for children of the graph root).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Anchoring of annotations on this layer.
    #[serde(default)]
    pub alignment: Alignment,
    /// Whether a parent may have more than one child on this layer.
    #[serde(default)]
    pub peers: bool,
    /// Whether peers may overlap.
    #[serde(default)]
    pub peers_overlap: bool,
    /// Whether children cover the parent without gaps.
    #[serde(default)]
    pub saturated: bool,
    /// Whether children lie within their parent.
    #[serde(default = "default_true")]
    pub parent_includes: bool,
    /// Value type of labels.
    #[serde(default, rename = "type")]
    pub layer_type: LayerType,
}

fn default_true() -> bool {
    true
}

impl Layer {
    /// Create a layer with default properties.
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            parent_id: None,
            alignment: Alignment::Interval,
            peers: false,
            peers_overlap: false,
            saturated: false,
            parent_includes: true,
            layer_type: LayerType::String,
        }
    }

    /// Set the parent layer.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Set the alignment.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Set peers and peer overlap.
    pub fn with_peers(mut self, peers: bool, peers_overlap: bool) -> Self {
        self.peers = peers;
        self.peers_overlap = peers_overlap;
        self
    }

    /// Set saturation.
    pub fn with_saturated(mut self, saturated: bool) -> Self {
        self.saturated = saturated;
        self
    }

    /// Set the label value type.
    pub fn with_type(mut self, layer_type: LayerType) -> Self {
        self.layer_type = layer_type;
        self
    }
}
