//! Host loop that scores every member of a pool in a simulation.
//!
//! Each tick the trainer resets the network, feeds it the simulation's
//! observations, evaluates it and hands the outputs back. When the current
//! individual dies its fitness is written into the pool and the next
//! chromosome is applied; after the last member the pool evolves.

use rand::Rng;
use tracing::{debug, info};

use super::chromosome::Chromosome;
use super::error::Result;
use super::network::Network;
use super::params::TrainerParams;
use super::pool::{Member, Pool};
use super::stats::{FitnessHistory, GenerationStats};

/// Environment an individual lives in.
pub trait Simulation {
    /// Starts a fresh life for the next individual.
    fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R);

    /// Observations for this tick, in input node order.
    fn observe(&self) -> Vec<f32>;

    /// Advances the simulation using the network outputs, in output node order.
    fn act(&mut self, outputs: &[f32]);

    /// Whether the current individual is still alive.
    fn is_alive(&self) -> bool;

    /// Score of the current individual so far.
    fn fitness(&self) -> f32;
}

/// What happened during a [`Trainer::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The current individual is still alive.
    Alive,
    /// An individual finished and the next member of the generation took over.
    MemberFinished {
        /// Index of the member that finished.
        member: usize,
        /// Fitness written into the pool.
        fitness: f32,
    },
    /// The last member finished and the pool produced a new generation.
    GenerationFinished(GenerationStats),
}

/// Drives a [`Simulation`] with the chromosomes of a [`Pool`].
pub struct Trainer<S, R> {
    network: Network,
    pool: Pool,
    simulation: S,
    rng: R,
    params: TrainerParams,
    member: usize,
    ticks: usize,
    history: FitnessHistory,
    best: Option<Member>,
}

impl<S: Simulation, R: Rng> Trainer<S, R> {
    /// Creates a trainer and applies member 0's chromosome to the network.
    pub fn new(
        mut network: Network,
        pool: Pool,
        mut simulation: S,
        mut rng: R,
        params: TrainerParams,
    ) -> Result<Self> {
        params.validate()?;
        network.reset();
        network.apply_chromosome(&pool.members()[0].chromosome)?;
        simulation.reset(&mut rng);

        Ok(Self {
            network,
            pool,
            simulation,
            rng,
            params,
            member: 0,
            ticks: 0,
            history: FitnessHistory::default(),
            best: None,
        })
    }

    /// Runs one simulation tick for the current individual.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        self.network.reset();
        let inputs = self.simulation.observe();
        self.network.set_inputs(&inputs)?;
        self.network.evaluate();
        let outputs = self.network.outputs();
        self.simulation.act(&outputs);
        self.ticks += 1;

        let expired = self.params.max_ticks > 0 && self.ticks >= self.params.max_ticks;
        if self.simulation.is_alive() && !expired {
            return Ok(TickOutcome::Alive);
        }
        self.finish_member()
    }

    fn finish_member(&mut self) -> Result<TickOutcome> {
        let fitness = self.simulation.fitness();
        let member = self.member;
        let scored = &mut self.pool.members_mut()[member];
        scored.fitness = fitness;

        if self.best.as_ref().is_none_or(|best| fitness > best.fitness) {
            self.best = Some(scored.clone());
        }
        debug!(member, fitness, ticks = self.ticks, "member finished");

        self.ticks = 0;
        self.member += 1;

        let outcome = if self.member < self.pool.len() {
            TickOutcome::MemberFinished { member, fitness }
        } else {
            let stats = self.pool.fitness_summary();
            self.history.record(stats);
            info!(
                generation = stats.generation,
                best = stats.best,
                mean = stats.mean,
                worst = stats.worst,
                "generation finished"
            );

            let elite_count = self.params.elitism.elite_count(self.pool.generation());
            self.pool.run_generation(elite_count, &mut self.rng)?;
            self.member = 0;
            TickOutcome::GenerationFinished(stats)
        };

        self.network.reset();
        self.network
            .apply_chromosome(&self.pool.members()[self.member].chromosome)?;
        self.simulation.reset(&mut self.rng);
        Ok(outcome)
    }

    /// Ticks until the current generation has been scored and evolved.
    ///
    /// Never returns if an individual can live forever and `max_ticks` is zero.
    pub fn run_generation(&mut self) -> Result<GenerationStats> {
        loop {
            if let TickOutcome::GenerationFinished(stats) = self.tick()? {
                return Ok(stats);
            }
        }
    }

    /// Runs the configured number of generations.
    pub fn run(&mut self) -> Result<&FitnessHistory> {
        for _ in 0..self.params.generations {
            self.run_generation()?;
        }
        Ok(&self.history)
    }

    /// Highest scoring chromosome seen so far.
    pub fn best_chromosome(&self) -> Option<&Chromosome> {
        self.best.as_ref().map(|member| &member.chromosome)
    }

    /// Fitness of [`Trainer::best_chromosome`].
    pub fn best_fitness(&self) -> Option<f32> {
        self.best.as_ref().map(|member| member.fitness)
    }

    /// Index of the member currently being evaluated.
    pub fn current_member(&self) -> usize {
        self.member
    }

    /// Ticks lived by the current individual.
    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Number of generations evolved so far.
    pub fn generation(&self) -> usize {
        self.pool.generation()
    }

    /// The network carrying the current member's weights.
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// The population.
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// The simulation.
    pub fn simulation(&self) -> &S {
        &self.simulation
    }

    /// Per-generation fitness summaries.
    pub fn history(&self) -> &FitnessHistory {
        &self.history
    }
}
