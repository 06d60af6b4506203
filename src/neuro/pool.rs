//! Generational genetic algorithm over chromosomes of fixed topology.
//!
//! The pool owns one generation of [`Member`]s. The trainer scores them
//! through [`Pool::members_mut`], then calls [`Pool::run_generation`] to
//! replace the whole population with the next one.

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::chromosome::Chromosome;
use super::error::Result;
use super::params::PoolParams;
use super::stats::GenerationStats;

/// Parent selection scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    /// Probability proportional to `size - rank`.
    Rank,
    /// Probability proportional to fitness (negative fitness counts as zero).
    Roulette,
}

/// A chromosome and the fitness it earned this generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// Connection weights of this individual.
    pub chromosome: Chromosome,
    /// Score written by the trainer. `0.0` means never evaluated.
    pub fitness: f32,
}

impl Member {
    /// Creates an unscored member.
    pub fn new(chromosome: Chromosome) -> Self {
        Self {
            chromosome,
            fitness: 0.0,
        }
    }
}

/// Fixed-size population evolved one generation at a time.
#[derive(Debug, Clone)]
pub struct Pool {
    members: Vec<Member>,
    params: PoolParams,
    generation: usize,
}

impl Pool {
    /// Creates the first generation from a seed chromosome.
    ///
    /// Member 0 carries the seed unchanged. Every other member is a copy of
    /// the seed with each weight redrawn with probability `mutation_rate`.
    pub fn new<R: Rng + ?Sized>(seed: Chromosome, params: PoolParams, rng: &mut R) -> Result<Self> {
        params.validate()?;

        let mut members = Vec::with_capacity(params.size);
        for _ in 1..params.size {
            let mut chromosome = seed.clone();
            chromosome.mutate(params.mutation_rate, params.weight_min, params.weight_max, rng);
            members.push(Member::new(chromosome));
        }
        members.insert(0, Member::new(seed));

        debug!(
            size = params.size,
            genes = members[0].chromosome.len(),
            "created pool"
        );

        Ok(Self {
            members,
            params,
            generation: 0,
        })
    }

    /// Current population.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Mutable access to the population, used to write fitness.
    pub fn members_mut(&mut self) -> &mut [Member] {
        &mut self.members
    }

    /// Population size.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always `false`: a pool holds at least one member.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Pool parameters.
    pub fn params(&self) -> &PoolParams {
        &self.params
    }

    /// Number of completed [`Pool::run_generation`] calls.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Member with the highest fitness; the earliest one wins ties.
    pub fn best(&self) -> &Member {
        &self.members[self.ranking()[0]]
    }

    /// Fitness summary of the current generation.
    pub fn fitness_summary(&self) -> GenerationStats {
        GenerationStats::from_members(self.generation, &self.members)
    }

    /// Member indices sorted by descending fitness.
    ///
    /// The sort is stable, so equal fitness keeps population order. NaN ranks last.
    pub fn ranking(&self) -> Vec<usize> {
        let mut ranked: Vec<usize> = (0..self.members.len()).collect();
        ranked.sort_by(|&a, &b| {
            rank_key(self.members[b].fitness).total_cmp(&rank_key(self.members[a].fitness))
        });
        ranked
    }

    /// Replaces the population with the next generation.
    ///
    /// The top `elite_count` chromosomes are carried over unchanged in rank
    /// order. The remaining slots are filled with mutated uniform-crossover
    /// children of selected parents. Every fitness is reset to zero.
    pub fn run_generation<R: Rng + ?Sized>(&mut self, elite_count: usize, rng: &mut R) -> Result<()> {
        if self.members.iter().all(|member| member.fitness.abs() <= f32::EPSILON) {
            warn!(
                generation = self.generation,
                "running generation with no scored members"
            );
        }

        let size = self.members.len();
        let ranked = self.ranking();
        let elite_count = elite_count.min(size);
        let selector = Selector::new(self.params.selection, &ranked, &self.members);

        let mut next = Vec::with_capacity(size);
        for &index in &ranked[..elite_count] {
            next.push(Member::new(self.members[index].chromosome.clone()));
        }

        let mut redrawn = 0;
        while next.len() < size {
            let parent_1 = selector.pick(rng);
            let mut parent_2 = selector.pick(rng);
            // Roulette with a single scored member can only ever pick that member.
            for _ in 0..MAX_PARENT_RETRIES {
                if parent_2 != parent_1 || size == 1 {
                    break;
                }
                parent_2 = selector.pick(rng);
            }

            let mut child = Chromosome::crossover(
                &self.members[parent_1].chromosome,
                &self.members[parent_2].chromosome,
                rng,
            )?;
            redrawn += child.mutate(
                self.params.mutation_rate,
                self.params.weight_min,
                self.params.weight_max,
                rng,
            );
            next.push(Member::new(child));
        }

        debug!(
            generation = self.generation,
            elites = elite_count,
            children = size - elite_count,
            mutated_genes = redrawn,
            "produced next generation"
        );

        self.members = next;
        self.generation += 1;
        Ok(())
    }
}

const MAX_PARENT_RETRIES: usize = 8;

fn rank_key(fitness: f32) -> f32 {
    if fitness.is_nan() {
        f32::NEG_INFINITY
    } else {
        fitness
    }
}

/// Draws member indices according to a selection scheme.
struct Selector<'a> {
    ranked: &'a [usize],
    weights: Option<WeightedIndex<f32>>,
}

impl<'a> Selector<'a> {
    fn new(selection: Selection, ranked: &'a [usize], members: &[Member]) -> Self {
        let n = ranked.len();
        let weights: Vec<f32> = match selection {
            Selection::Rank => (0..n).map(|rank| (n - rank) as f32).collect(),
            Selection::Roulette => ranked
                .iter()
                .map(|&i| {
                    let fitness = members[i].fitness;
                    if fitness.is_finite() { fitness.max(0.0) } else { 0.0 }
                })
                .collect(),
        };

        // All-zero weights (nobody scored) fall back to uniform selection.
        Self {
            ranked,
            weights: WeightedIndex::new(&weights).ok(),
        }
    }

    fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let rank = match &self.weights {
            Some(weights) => weights.sample(rng),
            None => rng.random_range(0..self.ranked.len()),
        };
        self.ranked[rank]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neuro::chromosome::Gene;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn members_with_fitness(fitness: &[f32]) -> Vec<Member> {
        fitness
            .iter()
            .map(|&f| {
                let mut chromosome = Chromosome::new();
                chromosome.add_gene(Gene::new("a", "b", f));
                Member {
                    chromosome,
                    fitness: f,
                }
            })
            .collect()
    }

    #[test]
    fn test_rank_selection_prefers_top_ranks() {
        let members = members_with_fitness(&[1.0, 5.0, 3.0, 2.0]);
        let ranked = vec![1, 2, 3, 0];
        let selector = Selector::new(Selection::Rank, &ranked, &members);
        let mut rng = StdRng::seed_from_u64(7);

        let mut counts = [0usize; 4];
        for _ in 0..10_000 {
            counts[selector.pick(&mut rng)] += 1;
        }
        // weights 4:3:2:1 for members 1, 2, 3, 0
        assert!(counts[1] > counts[2]);
        assert!(counts[2] > counts[3]);
        assert!(counts[3] > counts[0]);
    }

    #[test]
    fn test_roulette_never_picks_zero_fitness_when_others_scored() {
        let members = members_with_fitness(&[0.0, 4.0, -2.0]);
        let ranked = vec![1, 0, 2];
        let selector = Selector::new(Selection::Roulette, &ranked, &members);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..1000 {
            assert_eq!(selector.pick(&mut rng), 1);
        }
    }

    #[test]
    fn test_roulette_falls_back_to_uniform() {
        let members = members_with_fitness(&[0.0, 0.0, 0.0]);
        let ranked = vec![0, 1, 2];
        let selector = Selector::new(Selection::Roulette, &ranked, &members);
        assert!(selector.weights.is_none());

        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = [false; 3];
        for _ in 0..300 {
            seen[selector.pick(&mut rng)] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_rank_key_sends_nan_last() {
        assert_eq!(rank_key(f32::NAN), f32::NEG_INFINITY);
        assert_eq!(rank_key(2.5), 2.5);
    }
}
