//! Validation of task parameters against a schema.
//!
//! ## Float Normalization for Deterministic Hashing
//!
//! The partition size is quantized (x 1e6, rounded to i64) before the
//! configuration fingerprint is computed.

use std::collections::BTreeSet;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_hash_hex;
use crate::exclusion::ExclusionRule;
use crate::planner::WindowAlignment;
use crate::types::{Alignment, Layer, LayerType, Schema};
use crate::CONFIG_SCHEMA_VERSION;

use super::{ConfigError, TaskParameters};

/// Quantization factor for float normalization.
const FLOAT_QUANTIZATION_FACTOR: f64 = 1_000_000.0;

/// What is being counted along each scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Measurement {
    /// Count annotations on a layer.
    Units {
        /// Counting layer.
        layer_id: String,
        /// Units per window.
        size: usize,
    },
    /// Measure offset distance.
    Duration {
        /// Offset units per window.
        size: f64,
    },
}

impl Measurement {
    /// Counting layer, if any.
    pub fn token_layer_id(&self) -> Option<&str> {
        match self {
            Self::Units { layer_id, .. } => Some(layer_id),
            Self::Duration { .. } => None,
        }
    }
}

/// How windows are materialized on the destination layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DestinationKind {
    /// One interval per window, parented on the scope's ancestor on
    /// `parent_layer_id` (`None` for the graph root).
    Interval {
        /// Destination's parent layer.
        parent_layer_id: Option<String>,
    },
    /// One interval per structural instance a window overlaps.
    Split {
        /// Layer whose instances clip the window.
        structure_layer_id: String,
    },
    /// One tag per counted unit, copying the unit's label.
    #[serde(rename = "copy")]
    CopyTag,
}

impl DestinationKind {
    fn name(&self) -> &'static str {
        match self {
            Self::Interval { .. } => "interval",
            Self::Split { .. } => "split",
            Self::CopyTag => "copy",
        }
    }
}

/// Labelling of size-labelled windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelMode {
    /// The window's literal size.
    Size,
    /// A graph-wide running number.
    Serial,
}

impl LabelMode {
    /// Parse label mode from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "size" => Some(Self::Size),
            "serial" => Some(Self::Serial),
            _ => None,
        }
    }
}

impl Default for LabelMode {
    fn default() -> Self {
        Self::Size
    }
}

/// Schema change needed for the destination layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Provision {
    /// Layer exists and is usable as is.
    Existing,
    /// Layer exists but must become interval-aligned.
    SetInterval,
    /// Layer must be created.
    Create(Layer),
}

/// The validated output layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    /// Output layer id.
    pub layer_id: String,
    /// Projection mode.
    pub kind: DestinationKind,
    /// Schema change to apply before running.
    pub provision: Provision,
}

/// Validated partitioner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionerConfig {
    /// Scope layer (or the root layer for the whole graph).
    pub boundary_layer_id: String,
    /// Counting mode and window size.
    pub measurement: Measurement,
    /// Window size as configured.
    pub partition_size: f64,
    /// Cap on windows per scope.
    pub max_partitions: Option<NonZeroUsize>,
    /// Placement of full windows.
    pub alignment: WindowAlignment,
    /// Whether edge leftovers are kept.
    pub leftovers: bool,
    /// Whole-graph exclusion rule.
    pub exclusion: Option<ExclusionRule>,
    /// Output layer.
    pub destination: Destination,
    /// Labelling of windows.
    pub label_mode: LabelMode,
    /// Soft fallbacks applied during validation.
    pub warnings: Vec<String>,
}

/// Quantized configuration for deterministic hashing.
#[derive(Serialize)]
struct QuantizedConfig<'a> {
    version: &'a str,
    boundary_layer_id: &'a str,
    token_layer_id: Option<&'a str>,
    partition_size: i64,
    max_partitions: Option<usize>,
    alignment: WindowAlignment,
    leftovers: bool,
    exclusion: Option<(&'a str, Vec<&'a str>)>,
    destination_layer_id: &'a str,
    destination_kind: &'a str,
    label_mode: LabelMode,
}

impl PartitionerConfig {
    /// Validate raw parameters against a schema.
    ///
    /// Checks run in a fixed order so that the first reported error is
    /// stable for a given parameter set.
    pub fn validate(params: &TaskParameters, schema: &Schema) -> Result<Self, ConfigError> {
        let mut warnings = Vec::new();

        let boundary = params
            .boundary_layer_id
            .clone()
            .ok_or(ConfigError::MissingParameter("boundaryLayerId"))?;
        if !schema.contains(&boundary) {
            return Err(ConfigError::UnknownLayer {
                parameter: "boundaryLayerId",
                layer_id: boundary,
            });
        }

        let alignment = match params.alignment.as_deref() {
            None => WindowAlignment::Start,
            Some(raw) => WindowAlignment::from_str(raw).unwrap_or_else(|| {
                tracing::warn!(alignment = raw, "Unrecognised alignment, using start");
                warnings.push(format!("Invalid alignment \"{}\", using start", raw));
                WindowAlignment::Start
            }),
        };

        let token = params.token_layer_id.clone();
        if let Some(token) = &token {
            if schema.layer(token).is_none() {
                return Err(ConfigError::UnknownLayer {
                    parameter: "tokenLayerId",
                    layer_id: token.clone(),
                });
            }
            if *token == boundary {
                return Err(ConfigError::TokenIsBoundary(token.clone()));
            }
        }

        let raw_size = params
            .partition_size
            .as_deref()
            .ok_or(ConfigError::MissingParameter("partitionSize"))?;
        let invalid_size = |reason| ConfigError::InvalidPartitionSize {
            value: raw_size.to_string(),
            reason,
        };
        let partition_size: f64 = raw_size.trim().parse().map_err(|_| invalid_size("not a number"))?;
        if !partition_size.is_finite() || partition_size <= 0.0 {
            return Err(invalid_size("must be a positive number"));
        }
        let measurement = match &token {
            Some(layer_id) => {
                let size = partition_size.floor() as usize;
                if size == 0 {
                    return Err(invalid_size("must be at least one token"));
                }
                Measurement::Units {
                    layer_id: layer_id.clone(),
                    size,
                }
            }
            None => Measurement::Duration { size: partition_size },
        };

        let mut max_partitions = match params.max_partitions.as_deref() {
            None => None,
            Some(raw) => match raw.trim().parse::<i64>() {
                Err(_) => {
                    tracing::warn!(max_partitions = raw, "Non-numeric maxPartitions, ignoring");
                    warnings.push(format!("Invalid maxPartitions \"{}\", ignoring", raw));
                    None
                }
                Ok(n) if n <= 0 => return Err(ConfigError::NonPositiveMaxPartitions(n)),
                Ok(n) => NonZeroUsize::new(usize::try_from(n).unwrap_or(usize::MAX)),
            },
        };

        let exclusion = match &params.exclude_on_attribute {
            None => None,
            Some(layer_id) => {
                if schema.layer(layer_id).is_none() {
                    return Err(ConfigError::UnknownLayer {
                        parameter: "excludeOnAttribute",
                        layer_id: layer_id.clone(),
                    });
                }
                params
                    .exclude_on_attribute_values
                    .as_deref()
                    .and_then(|values| ExclusionRule::parse(layer_id.clone(), values))
            }
        };

        let destination_id = params
            .destination_layer_id
            .clone()
            .ok_or(ConfigError::MissingParameter("destinationLayerId"))?;
        if destination_id == boundary {
            return Err(ConfigError::DestinationIsBoundary(destination_id));
        }
        if token.as_deref() == Some(destination_id.as_str()) {
            return Err(ConfigError::DestinationIsToken(destination_id));
        }
        if schema.is_root(&destination_id) || schema.is_protected(&destination_id) {
            return Err(ConfigError::ProtectedDestination(destination_id));
        }

        let existing = schema.layer(&destination_id);
        if let Some(layer) = existing {
            if layer.alignment == Alignment::None {
                match schema.parent_of(&destination_id) {
                    Some(parent) if schema.is_root(parent) => {
                        return Err(ConfigError::TranscriptAttribute(destination_id));
                    }
                    Some(parent) if schema.participant_layer_id.as_deref() == Some(parent) => {
                        return Err(ConfigError::ParticipantAttribute(destination_id));
                    }
                    _ => {}
                }
            }
        }

        let parent: String = match existing {
            Some(_) => schema.parent_of(&destination_id),
            None if schema.is_root(&boundary) || schema.turn_layer_id.as_deref() == Some(boundary.as_str()) => {
                Some(boundary.as_str())
            }
            None => schema.parent_of(&boundary),
        }
        .unwrap_or(schema.root_layer_id.as_str())
        .to_string();

        let copy_mode = token.as_deref() == Some(parent.as_str())
            && existing.map_or(true, |layer| layer.alignment == Alignment::None);

        let kind = if copy_mode {
            DestinationKind::CopyTag
        } else if schema.is_root(&parent) {
            DestinationKind::Interval { parent_layer_id: None }
        } else if parent == boundary || schema.has_ancestor(&boundary, &parent) {
            DestinationKind::Interval { parent_layer_id: Some(parent.clone()) }
        } else if schema.is_root(&boundary) {
            DestinationKind::Split { structure_layer_id: parent.clone() }
        } else {
            return Err(ConfigError::IncompatibleDestination {
                destination: destination_id,
                parent,
                boundary,
            });
        };

        let mut leftovers = params.leftovers_requested();
        match &kind {
            DestinationKind::Split { .. } => {
                match max_partitions.map(NonZeroUsize::get) {
                    Some(max) if max > 1 => {
                        return Err(ConfigError::CrossingMaxPartitions {
                            destination: destination_id,
                            max,
                        });
                    }
                    Some(_) => {}
                    None => max_partitions = NonZeroUsize::new(1),
                }
                if alignment != WindowAlignment::Start {
                    return Err(ConfigError::CrossingAlignment {
                        destination: destination_id,
                        alignment: alignment.to_string(),
                    });
                }
                if leftovers {
                    return Err(ConfigError::CrossingLeftovers(destination_id));
                }
            }
            DestinationKind::CopyTag if leftovers => {
                tracing::warn!(destination = %destination_id, "Leftovers are never copied, ignoring leftOvers");
                warnings.push("Leftovers are not copied into tag layers".to_string());
                leftovers = false;
            }
            _ => {}
        }
        let provision = match existing {
            Some(layer) if kind != DestinationKind::CopyTag && layer.alignment != Alignment::Interval => {
                Provision::SetInterval
            }
            Some(_) => Provision::Existing,
            None => {
                let mut layer = Layer::new(destination_id.clone(), "Partitions")
                    .with_peers(false, false);
                if !schema.is_root(&parent) {
                    layer = layer.with_parent(parent.clone());
                }
                layer = if kind == DestinationKind::CopyTag {
                    layer
                        .with_alignment(Alignment::None)
                        .with_type(LayerType::String)
                } else {
                    layer
                        .with_alignment(Alignment::Interval)
                        .with_type(LayerType::Number)
                };
                Provision::Create(layer)
            }
        };

        let label_mode = match params.label.as_deref() {
            None => LabelMode::Size,
            Some(raw) => LabelMode::from_str(raw).unwrap_or_else(|| {
                tracing::warn!(label = raw, "Unrecognised label mode, using size");
                warnings.push(format!("Invalid label \"{}\", using size", raw));
                LabelMode::Size
            }),
        };

        Ok(Self {
            boundary_layer_id: boundary,
            measurement,
            partition_size,
            max_partitions,
            alignment,
            leftovers,
            exclusion,
            destination: Destination {
                layer_id: destination_id,
                kind,
                provision,
            },
            label_mode,
            warnings,
        })
    }

    /// Counting layer, if any.
    pub fn token_layer_id(&self) -> Option<&str> {
        self.measurement.token_layer_id()
    }

    /// Layers that must be populated before this configuration runs.
    pub fn required_layers(&self) -> Vec<String> {
        let mut layers = BTreeSet::new();
        layers.insert(self.boundary_layer_id.clone());
        if let Some(token) = self.token_layer_id() {
            layers.insert(token.to_string());
        }
        if let Some(rule) = &self.exclusion {
            layers.insert(rule.attribute_layer_id.clone());
        }
        layers.into_iter().collect()
    }

    /// Layers this configuration writes to.
    pub fn output_layers(&self) -> Vec<String> {
        vec![self.destination.layer_id.clone()]
    }

    /// Apply the destination layer change to a schema.
    ///
    /// Idempotent: provisioning twice leaves the schema unchanged.
    pub fn provision(&self, schema: &mut Schema) {
        match &self.destination.provision {
            Provision::Existing => {}
            Provision::SetInterval => {
                if let Some(layer) = schema.layer_mut(&self.destination.layer_id) {
                    tracing::info!(layer = %layer.id, "Setting destination layer alignment to interval");
                    layer.alignment = Alignment::Interval;
                }
            }
            Provision::Create(layer) => {
                if schema.layer(&layer.id).is_none() {
                    tracing::info!(layer = %layer.id, parent = ?layer.parent_id, "Creating destination layer");
                    schema.add_layer(layer.clone());
                }
            }
        }
    }

    /// Compute a hash of the configuration.
    ///
    /// Uses quantized float representation to ensure cross-platform consistency.
    pub fn params_hash(&self) -> String {
        let quantized = QuantizedConfig {
            version: CONFIG_SCHEMA_VERSION,
            boundary_layer_id: &self.boundary_layer_id,
            token_layer_id: self.token_layer_id(),
            partition_size: quantize_float(self.partition_size),
            max_partitions: self.max_partitions.map(NonZeroUsize::get),
            alignment: self.alignment,
            leftovers: self.leftovers,
            exclusion: self.exclusion.as_ref().map(|rule| {
                (
                    rule.attribute_layer_id.as_str(),
                    rule.values.iter().map(String::as_str).collect(),
                )
            }),
            destination_layer_id: &self.destination.layer_id,
            destination_kind: self.destination.kind.name(),
            label_mode: self.label_mode,
        };
        canonical_hash_hex(&quantized)
    }

    /// One-line description of the configuration.
    pub fn describe(&self) -> String {
        let max = self
            .max_partitions
            .map(|m| format!("up to {} partitions", m))
            .unwrap_or_else(|| "partitions".to_string());
        let unit = self.token_layer_id().unwrap_or("offset units");
        format!(
            "{} of {} by every {} {}{} alignment: {}",
            max,
            self.boundary_layer_id,
            self.partition_size,
            unit,
            if self.leftovers { " (+leftovers)" } else { "" },
            self.alignment,
        )
    }
}

/// Quantize a float to an i64 for deterministic hashing.
fn quantize_float(value: f64) -> i64 {
    (value * FLOAT_QUANTIZATION_FACTOR).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Layer;

    fn make_schema() -> Schema {
        Schema::new()
            .with_structure("participant", "turn", "utterance", "word")
            .with_layer(Layer::new("transcript_type", "Type").with_alignment(Alignment::None))
            .with_layer(Layer::new("topic", "Topic"))
            .with_layer(Layer::new("participant", "Participants").with_alignment(Alignment::None))
            .with_layer(Layer::new("participant_age", "Age").with_parent("participant").with_alignment(Alignment::None))
            .with_layer(Layer::new("turn", "Turns").with_parent("participant"))
            .with_layer(Layer::new("phrase", "Phrases").with_parent("turn"))
            .with_layer(Layer::new("utterance", "Utterances").with_parent("turn"))
            .with_layer(Layer::new("word", "Words").with_parent("turn"))
            .with_layer(Layer::new("wordTag", "Tags").with_parent("word").with_alignment(Alignment::None))
            .with_layer(Layer::new("morpheme", "Morphemes").with_parent("word"))
    }

    fn make_params(query: &str) -> TaskParameters {
        TaskParameters::from_query_string(query)
    }

    fn validate(query: &str) -> Result<PartitionerConfig, ConfigError> {
        PartitionerConfig::validate(&make_params(query), &make_schema())
    }

    #[test]
    fn test_missing_parameters() {
        assert_eq!(
            validate("tokenLayerId=word&partitionSize=5&destinationLayerId=p").unwrap_err(),
            ConfigError::MissingParameter("boundaryLayerId")
        );
        assert_eq!(
            validate("boundaryLayerId=turn&destinationLayerId=p").unwrap_err(),
            ConfigError::MissingParameter("partitionSize")
        );
        assert_eq!(
            validate("boundaryLayerId=turn&partitionSize=5").unwrap_err(),
            ConfigError::MissingParameter("destinationLayerId")
        );
    }

    #[test]
    fn test_unknown_layers() {
        assert!(matches!(
            validate("boundaryLayerId=nope&partitionSize=5&destinationLayerId=p"),
            Err(ConfigError::UnknownLayer { parameter: "boundaryLayerId", .. })
        ));
        assert!(matches!(
            validate("boundaryLayerId=turn&tokenLayerId=nope&partitionSize=5&destinationLayerId=p"),
            Err(ConfigError::UnknownLayer { parameter: "tokenLayerId", .. })
        ));
        assert!(matches!(
            validate("boundaryLayerId=turn&partitionSize=5&excludeOnAttribute=nope&destinationLayerId=p"),
            Err(ConfigError::UnknownLayer { parameter: "excludeOnAttribute", .. })
        ));
    }

    #[test]
    fn test_partition_size() {
        assert!(matches!(
            validate("boundaryLayerId=turn&partitionSize=five&destinationLayerId=p"),
            Err(ConfigError::InvalidPartitionSize { .. })
        ));
        assert!(matches!(
            validate("boundaryLayerId=turn&partitionSize=-1&destinationLayerId=p"),
            Err(ConfigError::InvalidPartitionSize { .. })
        ));
        assert!(matches!(
            validate("boundaryLayerId=turn&tokenLayerId=word&partitionSize=0.5&destinationLayerId=p"),
            Err(ConfigError::InvalidPartitionSize { .. })
        ));
        let config = validate("boundaryLayerId=turn&tokenLayerId=word&partitionSize=5.9&destinationLayerId=p").unwrap();
        assert_eq!(config.measurement, Measurement::Units { layer_id: "word".to_string(), size: 5 });
        let config = validate("boundaryLayerId=turn&partitionSize=0.5&destinationLayerId=p").unwrap();
        assert_eq!(config.measurement, Measurement::Duration { size: 0.5 });
    }

    #[test]
    fn test_max_partitions_asymmetry() {
        let config = validate("boundaryLayerId=turn&partitionSize=5&maxPartitions=many&destinationLayerId=p").unwrap();
        assert_eq!(config.max_partitions, None);
        assert_eq!(config.warnings.len(), 1);
        assert_eq!(
            validate("boundaryLayerId=turn&partitionSize=5&maxPartitions=0&destinationLayerId=p").unwrap_err(),
            ConfigError::NonPositiveMaxPartitions(0)
        );
        assert_eq!(
            validate("boundaryLayerId=turn&partitionSize=5&maxPartitions=-2&destinationLayerId=p").unwrap_err(),
            ConfigError::NonPositiveMaxPartitions(-2)
        );
    }

    #[test]
    fn test_alignment_fallback() {
        let config = validate("boundaryLayerId=turn&partitionSize=5&alignment=left&destinationLayerId=p").unwrap();
        assert_eq!(config.alignment, WindowAlignment::Start);
        assert!(!config.warnings.is_empty());
    }

    #[test]
    fn test_destination_aliasing() {
        assert_eq!(
            validate("boundaryLayerId=turn&partitionSize=5&destinationLayerId=turn").unwrap_err(),
            ConfigError::DestinationIsBoundary("turn".to_string())
        );
        assert_eq!(
            validate("boundaryLayerId=turn&tokenLayerId=morpheme&partitionSize=5&destinationLayerId=morpheme").unwrap_err(),
            ConfigError::DestinationIsToken("morpheme".to_string())
        );
        for protected in ["participant", "utterance", "word", "transcript"] {
            assert_eq!(
                validate(&format!("boundaryLayerId=turn&partitionSize=5&destinationLayerId={}", protected)).unwrap_err(),
                ConfigError::ProtectedDestination(protected.to_string())
            );
        }
    }

    #[test]
    fn test_attribute_destinations() {
        assert_eq!(
            validate("boundaryLayerId=turn&partitionSize=5&destinationLayerId=transcript_type").unwrap_err(),
            ConfigError::TranscriptAttribute("transcript_type".to_string())
        );
        assert_eq!(
            validate("boundaryLayerId=turn&partitionSize=5&destinationLayerId=participant_age").unwrap_err(),
            ConfigError::ParticipantAttribute("participant_age".to_string())
        );
    }

    #[test]
    fn test_new_layer_parent_inference() {
        let under_turn = validate("boundaryLayerId=turn&partitionSize=5&destinationLayerId=p").unwrap();
        assert_eq!(
            under_turn.destination.kind,
            DestinationKind::Interval { parent_layer_id: Some("turn".to_string()) }
        );
        match &under_turn.destination.provision {
            Provision::Create(layer) => {
                assert_eq!(layer.parent_id.as_deref(), Some("turn"));
                assert_eq!(layer.alignment, Alignment::Interval);
                assert_eq!(layer.layer_type, LayerType::Number);
                assert!(!layer.peers);
            }
            other => panic!("expected a new layer, got {:?}", other),
        }

        let under_root = validate("boundaryLayerId=topic&partitionSize=5&destinationLayerId=p").unwrap();
        assert_eq!(under_root.destination.kind, DestinationKind::Interval { parent_layer_id: None });

        let under_turn_again = validate("boundaryLayerId=utterance&partitionSize=5&destinationLayerId=p").unwrap();
        assert_eq!(
            under_turn_again.destination.kind,
            DestinationKind::Interval { parent_layer_id: Some("turn".to_string()) }
        );
    }

    #[test]
    fn test_incompatible_scope() {
        assert!(matches!(
            validate("boundaryLayerId=topic&tokenLayerId=word&partitionSize=5&destinationLayerId=phrase"),
            Err(ConfigError::IncompatibleDestination { .. })
        ));
    }

    #[test]
    fn test_crossing_rules() {
        let base = "boundaryLayerId=transcript&tokenLayerId=word&partitionSize=5&destinationLayerId=phrase";
        let config = validate(base).unwrap();
        assert_eq!(
            config.destination.kind,
            DestinationKind::Split { structure_layer_id: "turn".to_string() }
        );
        assert_eq!(config.max_partitions, NonZeroUsize::new(1));

        assert!(matches!(
            validate(&format!("{}&maxPartitions=2", base)),
            Err(ConfigError::CrossingMaxPartitions { max: 2, .. })
        ));
        assert!(matches!(
            validate(&format!("{}&alignment=middle", base)),
            Err(ConfigError::CrossingAlignment { .. })
        ));
        assert!(matches!(
            validate(&format!("{}&leftOvers=on", base)),
            Err(ConfigError::CrossingLeftovers(_))
        ));
        // an unrecognised alignment falls back to start, which is allowed
        assert!(validate(&format!("{}&maxPartitions=1&alignment=left", base)).is_ok());
    }

    #[test]
    fn test_copy_mode() {
        let config = validate(
            "boundaryLayerId=turn&tokenLayerId=word&partitionSize=30&destinationLayerId=wordTag&leftOvers=on",
        )
        .unwrap();
        assert_eq!(config.destination.kind, DestinationKind::CopyTag);
        assert_eq!(config.destination.provision, Provision::Existing);
        assert!(!config.leftovers);
    }

    #[test]
    fn test_existing_tag_layer_becomes_interval() {
        let config = validate(
            "boundaryLayerId=transcript&tokenLayerId=morpheme&partitionSize=5&destinationLayerId=wordTag",
        )
        .unwrap();
        assert_eq!(config.destination.provision, Provision::SetInterval);

        let mut schema = make_schema();
        config.provision(&mut schema);
        assert_eq!(schema.layer("wordTag").unwrap().alignment, Alignment::Interval);
    }

    #[test]
    fn test_provision_is_idempotent() {
        let config = validate("boundaryLayerId=turn&partitionSize=5&destinationLayerId=p").unwrap();
        let mut schema = make_schema();
        config.provision(&mut schema);
        let once = schema.clone();
        config.provision(&mut schema);
        assert_eq!(schema, once);
        assert!(schema.layer("p").is_some());
    }

    #[test]
    fn test_required_and_output_layers() {
        let config = validate(
            "boundaryLayerId=turn&tokenLayerId=word&partitionSize=5&excludeOnAttribute=transcript_type\
             &excludeOnAttributeValues=wordlist&destinationLayerId=p",
        )
        .unwrap();
        assert_eq!(config.required_layers(), vec!["transcript_type", "turn", "word"]);
        assert_eq!(config.output_layers(), vec!["p"]);
    }

    #[test]
    fn test_params_hash() {
        let a = validate("boundaryLayerId=turn&partitionSize=5&destinationLayerId=p").unwrap();
        let b = validate("boundaryLayerId=turn&partitionSize=5.0&destinationLayerId=p").unwrap();
        let c = validate("boundaryLayerId=turn&partitionSize=5.5&destinationLayerId=p").unwrap();
        assert_eq!(a.params_hash(), b.params_hash());
        assert_ne!(a.params_hash(), c.params_hash());
        assert_eq!(a.params_hash().len(), 16);
    }

    #[test]
    fn test_label_mode() {
        let config = validate("boundaryLayerId=turn&partitionSize=5&destinationLayerId=p&label=serial").unwrap();
        assert_eq!(config.label_mode, LabelMode::Serial);
        let config = validate("boundaryLayerId=turn&partitionSize=5&destinationLayerId=p&label=colour").unwrap();
        assert_eq!(config.label_mode, LabelMode::Size);
    }
}
