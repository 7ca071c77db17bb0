//! Partitioner configuration.
//!
//! ```text
//! TaskParameters ──validate──▶ PartitionerConfig ──provision──▶ Partitioner
//!  (Unconfigured)                 (Validated)                     (Ready)
//! ```
//!
//! Validation never touches the graph; provisioning only touches the schema.

pub mod params;
pub mod validate;

pub use params::TaskParameters;
pub use validate::{
    Destination, DestinationKind, LabelMode, Measurement, PartitionerConfig, Provision,
};

/// Fatal configuration errors. Each names the offending parameter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A required parameter is missing or empty.
    #[error("No {0} parameter supplied")]
    MissingParameter(&'static str),
    /// A layer parameter names a layer the schema does not have.
    #[error("Invalid {parameter}: layer not found: {layer_id}")]
    UnknownLayer {
        /// Parameter name.
        parameter: &'static str,
        /// Offending layer id.
        layer_id: String,
    },
    /// Counting layer and boundary layer are the same.
    #[error("Invalid tokenLayerId: cannot be the same as boundaryLayerId: {0}")]
    TokenIsBoundary(String),
    /// Partition size is not a usable number.
    #[error("Invalid partitionSize \"{value}\": {reason}")]
    InvalidPartitionSize {
        /// Raw value.
        value: String,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// `maxPartitions` is zero or negative.
    #[error("Invalid maxPartitions: must be greater than zero, got {0}")]
    NonPositiveMaxPartitions(i64),
    /// Destination aliases the boundary layer.
    #[error("Invalid destinationLayerId: cannot be the same as boundaryLayerId: {0}")]
    DestinationIsBoundary(String),
    /// Destination aliases the counting layer.
    #[error("Invalid destinationLayerId: cannot be the same as tokenLayerId: {0}")]
    DestinationIsToken(String),
    /// Destination is a structural layer of the graph.
    #[error("Invalid destinationLayerId: cannot be a structural layer: {0}")]
    ProtectedDestination(String),
    /// Destination is a whole-graph attribute layer.
    #[error("Invalid destinationLayerId: cannot be a transcript attribute: {0}")]
    TranscriptAttribute(String),
    /// Destination is a participant attribute layer.
    #[error("Invalid destinationLayerId: cannot be a participant attribute: {0}")]
    ParticipantAttribute(String),
    /// Destination's structural parent is unrelated to the boundary.
    #[error(
        "Invalid destinationLayerId: {destination} (child of {parent}) is not in the same scope as boundaryLayerId {boundary}"
    )]
    IncompatibleDestination {
        /// Destination layer.
        destination: String,
        /// Destination's parent layer.
        parent: String,
        /// Boundary layer.
        boundary: String,
    },
    /// A structurally-crossing destination with more than one window.
    #[error("Invalid maxPartitions: partitioning the whole graph into {destination} allows at most 1 partition, got {max}")]
    CrossingMaxPartitions {
        /// Destination layer.
        destination: String,
        /// Requested cap.
        max: usize,
    },
    /// A structurally-crossing destination with non-start alignment.
    #[error("Invalid alignment: partitioning the whole graph into {destination} requires start alignment, got {alignment}")]
    CrossingAlignment {
        /// Destination layer.
        destination: String,
        /// Requested alignment.
        alignment: String,
    },
    /// A structurally-crossing destination with leftovers.
    #[error("Invalid leftOvers: partitioning the whole graph into {0} cannot include leftovers")]
    CrossingLeftovers(String),
}
