//! # Connectivity Model
//!
//! Plain data types shared by the connection sources and the analysis
//! pipeline: bodies, their proofreading status, `ConnectsTo` edges and the
//! flat query rows the pipeline consumes.
//!
//! Design rule: no I/O, no state, no async in this module.

pub mod neuron;
pub mod connection;

pub use neuron::{BodyId, Neuron, NeuronStatus};
pub use connection::{ConnectionRow, Direction, Synapse};
