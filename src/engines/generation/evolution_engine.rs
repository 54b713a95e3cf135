use crate::config::{ConfigSection, EvolutionConfig};
use crate::data::checkpoint::{self, CheckpointStore};
use crate::engines::evaluation::{is_valid, simulate};
use crate::engines::generation::{
    gene::Gene,
    mutation::smart_mutate,
    operators::crossover,
    progress::SilentProgress,
    synthesis::synthesize,
};
use crate::error::{Result, SchedulerError};
use crate::graph::Graph;
use crate::sequence::Sequence;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

const STREAM_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Lifecycle of a population. `Converged` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvolutionState {
    Initialized,
    Evolving,
    Converged,
}

pub trait ProgressCallback {
    fn on_generation_start(&mut self, generation: usize);
    fn on_generation_complete(&mut self, generation: usize, best_fitness: usize, avg_fitness: f64);
}

/// Genetic search for a minimal-peak-memory schedule of one graph.
///
/// The random stream is never serialized. It is keyed by the seed and the generation
/// counter, so a population restored from a checkpoint continues bit-for-bit once
/// [`GeneticOptimizer::synchronize_rng`] has been called.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneticOptimizer {
    genes: Vec<Gene>,
    best_fitness: usize,
    best_gene: Gene,
    avg_fitness: f64,
    generations: usize,
    stale_generations: usize,
    state: EvolutionState,
    config: EvolutionConfig,
    #[serde(skip)]
    rng: Option<StdRng>,
}

/// Stream consumed by generation `generation` (0-based).
fn generation_rng(seed: u64, generation: usize) -> StdRng {
    let offset = (generation as u64).wrapping_add(1).wrapping_mul(STREAM_STRIDE);
    StdRng::seed_from_u64(seed.wrapping_add(offset))
}

impl GeneticOptimizer {
    /// Seed a population of random valid schedules and score it.
    pub fn new(graph: &Graph, config: EvolutionConfig) -> Result<Self> {
        config.validate()?;

        let mut init_rng = StdRng::seed_from_u64(config.seed);
        let seeds: Vec<u64> = (0..config.population_size)
            .map(|_| init_rng.gen())
            .collect();

        let genes = seeds
            .par_iter()
            .map(|&seed| -> Result<Gene> {
                let sequence = synthesize(graph, seed);
                let fitness = simulate(graph, &sequence).map_err(|e| {
                    SchedulerError::InvariantViolation(format!(
                        "synthesized sequence (seed {}) failed to simulate: {}",
                        seed, e
                    ))
                })?;
                Ok(Gene::new(sequence, fitness))
            })
            .collect::<Result<Vec<_>>>()?;

        let best_gene = genes
            .iter()
            .min_by_key(|g| g.fitness)
            .cloned()
            .unwrap_or_default();

        let mut optimizer = Self {
            best_fitness: best_gene.fitness,
            best_gene,
            genes,
            avg_fitness: 0.0,
            generations: 0,
            stale_generations: 0,
            state: EvolutionState::Initialized,
            rng: Some(generation_rng(config.seed, 0)),
            config,
        };
        optimizer.calculate_stats();

        log::info!(
            "Initialized population of {} (seed {}), best fitness {}, avg {:.3}",
            optimizer.genes.len(),
            optimizer.config.seed,
            optimizer.best_fitness,
            optimizer.avg_fitness
        );
        Ok(optimizer)
    }

    /// Restore a population from a checkpoint file. The random stream is left unset;
    /// [`evolve`](Self::evolve) rebuilds it, [`next_generation`](Self::next_generation)
    /// requires [`synchronize_rng`](Self::synchronize_rng) first.
    pub fn load_checkpoint<P: AsRef<Path>>(path: P) -> Result<Self> {
        let optimizer: Self = checkpoint::load(path.as_ref())?;
        optimizer.config.validate()?;
        log::info!(
            "Loaded checkpoint {} at generation {}",
            path.as_ref().display(),
            optimizer.generations
        );
        Ok(optimizer)
    }

    pub fn save_checkpoint<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        checkpoint::save(path.as_ref(), self)
    }

    /// Rebuild the random stream from the stored seed and generation counter.
    /// Must be called after loading a checkpoint and before evolving further.
    pub fn synchronize_rng(&mut self) {
        self.rng = Some(generation_rng(self.config.seed, self.generations));
    }

    pub fn evolve(&mut self, graph: &Graph) -> Result<()> {
        self.evolve_with(graph, &mut SilentProgress)
    }

    /// Run generations until `epsilon` consecutive ones bring no strict improvement.
    pub fn evolve_with<C: ProgressCallback>(&mut self, graph: &Graph, callback: &mut C) -> Result<()> {
        if self.state == EvolutionState::Converged {
            log::info!("Population already converged at generation {}", self.generations);
            return Ok(());
        }
        if self.rng.is_none() {
            self.synchronize_rng();
        }

        let store = self.checkpoint_store()?;
        if let Some(store) = &store {
            store.save(self)?;
        }

        while self.stale_generations < self.config.epsilon {
            callback.on_generation_start(self.generations);

            let previous_best = self.best_fitness;
            self.next_generation(graph)?;

            if self.best_fitness < previous_best {
                self.stale_generations = 0;
            } else {
                self.stale_generations += 1;
            }

            if let Some(store) = &store {
                if self.generations % self.config.checkpoint_frequency == 0 {
                    store.save(self)?;
                }
            }

            callback.on_generation_complete(self.generations, self.best_fitness, self.avg_fitness);
        }

        self.state = EvolutionState::Converged;
        log::info!(
            "Converged after {} generations, best fitness {}",
            self.generations,
            self.best_fitness
        );
        Ok(())
    }

    fn checkpoint_store(&self) -> Result<Option<CheckpointStore>> {
        if self.config.checkpoint_frequency == 0 {
            return Ok(None);
        }
        let store = CheckpointStore::new(&self.config.checkpoint_path);
        store.ensure_dir()?;
        Ok(Some(store))
    }

    /// Evaluate, select, cross over and mutate once.
    pub fn next_generation(&mut self, graph: &Graph) -> Result<()> {
        if self.state == EvolutionState::Converged {
            return Err(SchedulerError::InvariantViolation(
                "next_generation called on a converged population".to_string(),
            ));
        }
        let mut rng = self.rng.take().ok_or_else(|| {
            SchedulerError::InvariantViolation(
                "random stream not synchronized; call synchronize_rng after loading a checkpoint"
                    .to_string(),
            )
        })?;
        self.state = EvolutionState::Evolving;

        self.evaluation(graph)?;
        self.selection();
        self.crossover(&mut rng);
        self.mutation(graph, &mut rng)?;

        self.generations += 1;
        self.synchronize_rng();
        Ok(())
    }

    fn evaluation(&mut self, graph: &Graph) -> Result<()> {
        self.genes.par_iter_mut().try_for_each(|gene| -> Result<()> {
            gene.fitness = simulate(graph, &gene.sequence).map_err(|e| {
                SchedulerError::InvariantViolation(format!("gene failed evaluation: {}", e))
            })?;
            Ok(())
        })
    }

    // Keep the best quarter, ties in their current order.
    fn selection(&mut self) {
        self.calculate_stats();
        self.genes.sort_by_key(|g| g.fitness);

        if let Some(leader) = self.genes.first() {
            if self.best_fitness == 0 || leader.fitness < self.best_fitness {
                self.best_fitness = leader.fitness;
                self.best_gene = leader.clone();
            }
        }

        self.genes.truncate((self.config.population_size / 4).max(1));
        log::debug!(
            "Generation {}: {} survivors, leader fitness {}",
            self.generations,
            self.genes.len(),
            self.genes.first().map(|g| g.fitness).unwrap_or(0)
        );
    }

    // Sequential on purpose: every draw comes from the shared stream.
    fn crossover(&mut self, rng: &mut StdRng) {
        let target = self.config.population_size;
        let survivors = self.genes.len();

        while self.genes.len() < target {
            let (first, second) = crossover(&self.genes[..survivors], rng);
            self.genes.push(first);
            self.genes.push(second);
        }
        self.genes.truncate(target);
    }

    fn mutation(&mut self, graph: &Graph, rng: &mut StdRng) -> Result<()> {
        // drawn in gene order so results don't depend on worker scheduling
        let seeds: Vec<u64> = self.genes.iter().map(|_| rng.gen()).collect();
        let rate = self.config.mutation_rate;
        let selected: Vec<bool> = if rate < 1.0 {
            seeds.iter().map(|_| rng.gen::<f64>() < rate).collect()
        } else {
            vec![true; seeds.len()]
        };

        self.genes
            .par_iter_mut()
            .zip(seeds.into_par_iter().zip(selected.into_par_iter()))
            .try_for_each(|(gene, (seed, selected))| -> Result<()> {
                if !selected {
                    return Ok(());
                }
                match smart_mutate(graph, &gene.sequence, seed) {
                    Ok(sequence) => {
                        *gene = Gene::unscored(sequence);
                        Ok(())
                    }
                    Err(e) if e.is_recoverable() => {
                        log::debug!("Skipping mutation: {}", e);
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            })
    }

    fn calculate_stats(&mut self) {
        let total: usize = self.genes.iter().map(|g| g.fitness).sum();
        self.avg_fitness = total as f64 / self.config.population_size as f64;
    }

    /// Re-score every gene and return the best valid one.
    ///
    /// Unscored or invalid genes never win. If nothing qualifies the result is
    /// `(0, best sequence seen so far)`.
    pub fn get_best(&mut self, graph: &Graph) -> (usize, Sequence) {
        self.genes.par_iter_mut().for_each(|gene| {
            gene.fitness = simulate(graph, &gene.sequence).unwrap_or(0);
        });
        self.genes.sort_by_key(|g| (g.fitness == 0, g.fitness));

        let winner = self
            .genes
            .iter()
            .find(|g| g.is_scored() && is_valid(graph, &g.sequence))
            .cloned();

        match winner {
            Some(gene) => {
                self.best_fitness = gene.fitness;
                self.best_gene = gene.clone();
                (gene.fitness, gene.sequence)
            }
            None => {
                log::warn!("No valid scored gene in population; returning best seen sequence");
                (0, self.best_gene.sequence.clone())
            }
        }
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    pub fn best_fitness(&self) -> usize {
        self.best_fitness
    }

    pub fn best_gene(&self) -> &Gene {
        &self.best_gene
    }

    pub fn avg_fitness(&self) -> f64 {
        self.avg_fitness
    }

    pub fn generations(&self) -> usize {
        self.generations
    }

    pub fn stale_generations(&self) -> usize {
        self.stale_generations
    }

    pub fn state(&self) -> EvolutionState {
        self.state
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.config.seed
    }

    pub fn is_synchronized(&self) -> bool {
        self.rng.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(population_size: usize) -> EvolutionConfig {
        EvolutionConfig {
            population_size,
            epsilon: 2,
            seed: 42,
            ..Default::default()
        }
    }

    fn layered() -> Graph {
        let ids: Vec<u32> = (1..=16).collect();
        let edges: Vec<(u32, u32)> = (5..=16).flat_map(|n| [(n - 4, n), (n - 3, n)]).collect();
        Graph::from_edges(&ids, &edges).unwrap()
    }

    #[test]
    fn test_mutation_reaches_every_gene() {
        let g = layered();
        let mut optimizer = GeneticOptimizer::new(&g, config(16)).unwrap();
        let before = optimizer.genes.clone();

        let mut rng = generation_rng(7, 3);
        let seeds: Vec<u64> = {
            let mut replay = rng.clone();
            before.iter().map(|_| replay.gen()).collect()
        };
        optimizer.mutation(&g, &mut rng).unwrap();

        for ((old, new), seed) in before.iter().zip(&optimizer.genes).zip(seeds) {
            match smart_mutate(&g, &old.sequence, seed) {
                Ok(expected) => {
                    assert_ne!(expected, old.sequence);
                    assert_eq!(new.sequence, expected);
                    assert!(!new.is_scored());
                }
                Err(e) => {
                    assert!(e.is_recoverable());
                    assert_eq!(new, old);
                }
            }
        }
    }

    #[test]
    fn test_zero_rate_leaves_genes_alone() {
        let g = layered();
        let mut cfg = config(8);
        cfg.mutation_rate = 0.0;
        let mut optimizer = GeneticOptimizer::new(&g, cfg).unwrap();
        let before = optimizer.genes.clone();

        optimizer.mutation(&g, &mut generation_rng(7, 0)).unwrap();
        assert_eq!(optimizer.genes, before);
    }
}
