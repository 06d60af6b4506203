//! Genetic encoding of a network's connection weights.
//!
//! A [`Chromosome`] is a flat, ordered list of [`Gene`]s, one per connection,
//! in the order the connections were created. It is a plain value: the pool
//! and the network copy it back and forth freely.
//!
//! The text form is one gene per line, `from,to,weight`, with no header.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::{EvoError, Result};

/// One connection weight, detached from any live network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    /// Name of the source node.
    pub from: String,
    /// Name of the target node.
    pub to: String,
    /// Connection weight.
    pub weight: f32,
}

impl Gene {
    /// Creates a gene for the edge `from -> to`.
    pub fn new(from: impl Into<String>, to: impl Into<String>, weight: f32) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            weight,
        }
    }

    /// Returns `true` if both genes describe the same edge, whatever their weights.
    pub fn same_edge(&self, other: &Gene) -> bool {
        self.from == other.from && self.to == other.to
    }
}

/// Ordered list of genes encoding one network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chromosome {
    genes: Vec<Gene>,
}

impl Chromosome {
    /// Creates an empty chromosome.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a gene. No validation or deduplication happens here.
    pub fn add_gene(&mut self, gene: Gene) {
        self.genes.push(gene);
    }

    /// Genes in connection-creation order.
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// Mutable access to the genes.
    pub fn genes_mut(&mut self) -> &mut [Gene] {
        &mut self.genes
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Returns `true` if the chromosome holds no genes.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Iterator over the weights only.
    pub fn weights(&self) -> impl Iterator<Item = f32> + '_ {
        self.genes.iter().map(|gene| gene.weight)
    }

    /// Returns `true` if both chromosomes describe the same edges in the same order.
    pub fn same_topology(&self, other: &Chromosome) -> bool {
        self.genes.len() == other.genes.len()
            && self
                .genes
                .iter()
                .zip(&other.genes)
                .all(|(a, b)| a.same_edge(b))
    }

    /// Uniform crossover: every gene index comes from `parent1` or `parent2`
    /// with equal probability.
    ///
    /// Edges are taken from `parent1`; both parents must share one topology.
    pub fn crossover<R: Rng + ?Sized>(
        parent1: &Chromosome,
        parent2: &Chromosome,
        rng: &mut R,
    ) -> Result<Chromosome> {
        if parent1.len() != parent2.len() {
            return Err(EvoError::TopologyMismatch {
                genes: parent2.len(),
                connections: parent1.len(),
            });
        }

        let genes = parent1
            .genes
            .iter()
            .zip(&parent2.genes)
            .map(|(a, b)| if rng.random_bool(0.5) { a.clone() } else { b.clone() })
            .collect();

        Ok(Chromosome { genes })
    }

    /// Replaces each weight with probability `mutation_rate` by a uniform draw
    /// in `[weight_min, weight_max]`.
    ///
    /// Returns the number of genes that were redrawn.
    pub fn mutate<R: Rng + ?Sized>(
        &mut self,
        mutation_rate: f32,
        weight_min: f32,
        weight_max: f32,
        rng: &mut R,
    ) -> usize {
        let rate = f64::from(mutation_rate.clamp(0.0, 1.0));
        let mut redrawn = 0;
        for gene in &mut self.genes {
            if rng.random_bool(rate) {
                gene.weight = random_weight(rng, weight_min, weight_max);
                redrawn += 1;
            }
        }
        redrawn
    }

    /// Appends the text form to `path`, creating the file if needed.
    ///
    /// Existing content is kept; callers that want a fresh dump must truncate
    /// the file themselves.
    pub fn save_to_text_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        write!(file, "{self}")?;
        file.flush()?;
        Ok(())
    }

    /// Loads a chromosome from its text form.
    ///
    /// Any malformed line fails the whole load; no partial chromosome is returned.
    pub fn load_from_text_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        text.parse()
    }
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `{}` on f32 is the shortest representation that parses back exactly.
        for gene in &self.genes {
            writeln!(f, "{},{},{}", gene.from, gene.to, gene.weight)?;
        }
        Ok(())
    }
}

impl FromStr for Chromosome {
    type Err = EvoError;

    fn from_str(s: &str) -> Result<Self> {
        let mut chromosome = Chromosome::new();

        for (index, raw) in s.lines().enumerate() {
            let line = raw.trim_end();
            if line.is_empty() {
                continue;
            }
            chromosome.add_gene(parse_gene(line, index + 1)?);
        }

        Ok(chromosome)
    }
}

fn parse_gene(line: &str, line_no: usize) -> Result<Gene> {
    let parse_error = |reason: String| EvoError::Parse {
        line: line_no,
        reason,
    };

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let [from, to, weight] = fields.as_slice() else {
        return Err(parse_error(format!(
            "expected 3 fields, found {}",
            fields.len()
        )));
    };

    if from.is_empty() || to.is_empty() {
        return Err(parse_error("empty node name".to_string()));
    }

    let weight: f32 = weight
        .parse()
        .map_err(|_| parse_error(format!("invalid weight `{weight}`")))?;
    if !weight.is_finite() {
        return Err(parse_error(format!("non-finite weight `{weight}`")));
    }

    Ok(Gene::new(*from, *to, weight))
}

/// Uniform weight in `[min, max]`.
pub(crate) fn random_weight<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if min >= max {
        return min;
    }
    rng.random_range(min..=max)
}
