//! # Neuroevo - Weight Neuroevolution for Small Feed-Forward Networks
//!
//! Evolves the connection weights of a fixed-topology neural network with a
//! generational genetic algorithm. Fitness comes from an external
//! simulation that drives the network once per tick.
//!
//! ## Features
//!
//! - Named-node feed-forward networks over any acyclic topology
//! - Sigmoid activation with configurable threshold and steepness
//! - Chromosome encoding of connection weights with a plain-text dump format
//! - Ranked or roulette parent selection, uniform crossover, elitism
//! - Seedable randomness injected everywhere for reproducible runs
//! - A trainer loop that scores every member in a [`neuro::trainer::Simulation`]
//!
//! ## Core Modules
//!
//! - [`neuro::network`] - Network graph and forward pass
//! - [`neuro::chromosome`] - Genes, chromosomes, crossover, mutation
//! - [`neuro::pool`] - Population and generational replacement
//! - [`neuro::trainer`] - Host loop tying a simulation to the pool

/// Network evaluation and genetic population management.
pub mod neuro {
    /// Genetic encoding of connection weights and its text format.
    pub mod chromosome;
    /// Error type shared by every module.
    pub mod error;
    /// Feed-forward network graph.
    pub mod network;
    /// Network, pool and trainer parameters.
    pub mod params;
    /// Fixed-size population evolved by selection, crossover and mutation.
    pub mod pool;
    /// Per-generation fitness summaries.
    pub mod stats;
    /// Host loop that scores pool members in a simulation.
    pub mod trainer;
}

pub use neuro::chromosome::{Chromosome, Gene};
pub use neuro::error::{EvoError, Result};
pub use neuro::network::{Network, NodeId, NodeRole};
pub use neuro::params::{EliteSchedule, NetworkParams, Params, PoolParams, TrainerParams};
pub use neuro::pool::{Member, Pool, Selection};
pub use neuro::trainer::{Simulation, TickOutcome, Trainer};
