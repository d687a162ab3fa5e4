//! Error types for the growth and evolution core.
//!
//! Only invariant violations are errors. A growth tick that simply does not
//! grow anything is reported through [`super::growth::GrowthOutcome`] instead.

use thiserror::Error;

use super::body::NodeId;

/// Structural violations of a body graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BodyError {
    #[error("body graph has no core node")]
    MissingCore,

    #[error("body graph may contain only one core node")]
    SecondCore,

    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("the core node cannot be removed")]
    CoreRemoval,

    #[error("edge {parent} -> {child} references missing node {missing}")]
    DanglingEdge {
        parent: NodeId,
        child: NodeId,
        missing: NodeId,
    },

    #[error("edge length must be positive and finite, got {0}")]
    InvalidLength(f32),
}

/// A genome that cannot be interpreted by the growth engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenomeError {
    #[error("genome has no growth rules")]
    NoRules,

    #[error("rule {0} has an empty template")]
    EmptyTemplate(usize),

    #[error("rule {0} tries to bud a second core")]
    CoreBud(usize),

    #[error("rule {index} has invalid cost {cost}")]
    InvalidCost { index: usize, cost: f32 },

    #[error("rule {index} has invalid bud length {length}")]
    InvalidLength { index: usize, length: f32 },
}

/// Hard failures of a growth tick.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GrowthError {
    #[error("malformed genome: {0}")]
    Genome(#[from] GenomeError),

    #[error("rule index {index} out of range for genome with {len} rules")]
    RuleOutOfRange { index: usize, len: usize },

    #[error("malformed body: {0}")]
    Body(#[from] BodyError),
}

/// Failures of the generational loop.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvolutionError {
    #[error("individual {index} has not been evaluated")]
    Unevaluated { index: usize },

    #[error("individual {index} has non-finite fitness {fitness}")]
    NonFiniteFitness { index: usize, fitness: f32 },

    #[error("population is empty")]
    EmptyPopulation,

    #[error("selection kept no survivors")]
    NoSurvivors,

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("fitness vector has {got} entries for {expected} individuals")]
    FitnessCount { expected: usize, got: usize },

    #[error("growth failed for individual {index}: {source}")]
    Growth {
        index: usize,
        #[source]
        source: GrowthError,
    },
}

/// Errors reading or writing JSON snapshots.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
