//! # Morphogen - Grown Organisms Under Generational Selection
//!
//! Organisms start as a single core node and grow a 2D body from a genome of
//! heritable growth rules. A small neural controller is wired to the actuator
//! and sensor nodes the body ends up with. Populations improve through
//! discrete generational selection; there is no gradient-based learning.
//!
//! ## Features
//!
//! - Growth rules with triggers, anchors, node templates, costs and cooldowns
//! - Deterministic, replayable rule scheduling
//! - Pluggable anchor and scheduling strategies
//! - Stable fitness ranking with index tie-breaks
//! - Brain and genome mutation, crossover and elitist refill
//! - Parallel per-organism evaluation
//! - Save/load populations and parameters as JSON
//!
//! ## Core Modules
//!
//! - [`simulation::body`] - Body graph of nodes and edges
//! - [`simulation::genome`] - Growth rules and the starter genome
//! - [`simulation::growth`] - The growth engine
//! - [`simulation::organism`] - Organism state and energy pool
//! - [`simulation::evolution`] - Generational loop

/// Core simulation logic and data structures.
pub mod simulation {
    /// Anchor resolution strategies.
    pub mod anchor;
    /// Body graph: nodes, edges and ports.
    pub mod body;
    /// Brain topology and body binding.
    pub mod brain;
    /// Error types.
    pub mod error;
    /// Generational loop.
    pub mod evolution;
    /// Genome and growth rules.
    pub mod genome;
    /// Growth engine.
    pub mod growth;
    /// Genome/brain pair with fitness.
    pub mod individual;
    /// Mutation and crossover operators.
    pub mod mutation;
    /// Organism state and lifecycle.
    pub mod organism;
    /// Simulation parameters.
    pub mod params;
    /// A generation of individuals.
    pub mod population;
    /// Building the next generation.
    pub mod reproduction;
    /// Rule scheduling and cooldown bookkeeping.
    pub mod schedule;
    /// Fitness ranking and survivor selection.
    pub mod selection;
    /// Per-generation statistics.
    pub mod stats;
}
