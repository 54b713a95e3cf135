//! Entry points behind the command-line verbs.

use crate::config::{ConfigManager, ConfigSection, EvolutionConfig};
use crate::engines::evaluation::{is_valid, simulate};
use crate::engines::generation::{synthesize, GeneticOptimizer, LoggingProgress};
use crate::error::{Result, SchedulerError};
use crate::graph::Graph;
use crate::sequence::Sequence;
use std::path::Path;

/// Outcome of a finished search.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub seed: u64,
    pub fitness: usize,
    pub generations: usize,
    pub sequence: Sequence,
}

/// Load a graph in the plain text format. Netlists must be converted beforehand.
pub fn load_graph<P: AsRef<Path>>(path: P) -> Result<Graph> {
    let path = path.as_ref();
    if path.extension().map_or(false, |ext| ext == "blif") {
        return Err(SchedulerError::MalformedGraph(format!(
            "{} is a BLIF netlist; convert it to the graph text format first",
            path.display()
        )));
    }
    Graph::from_file(path)
}

pub fn verify<P: AsRef<Path>, Q: AsRef<Path>>(graph_path: P, sequence_path: Q) -> Result<bool> {
    let graph = load_graph(graph_path)?;
    let sequence = Sequence::from_file(sequence_path)?;
    Ok(is_valid(&graph, &sequence))
}

/// Peak memory utilization of a stored sequence.
pub fn memory<P: AsRef<Path>, Q: AsRef<Path>>(graph_path: P, sequence_path: Q) -> Result<usize> {
    let graph = load_graph(graph_path)?;
    let sequence = Sequence::from_file(sequence_path)?;
    simulate(&graph, &sequence)
}

/// Write one random valid, unoptimized sequence.
pub fn execution<P: AsRef<Path>, Q: AsRef<Path>>(graph_path: P, out: Q, seed: u64) -> Result<Sequence> {
    let graph = load_graph(graph_path)?;
    let sequence = synthesize(&graph, seed);
    sequence.write_to_file(out)?;
    Ok(sequence)
}

/// Run a full search and write the winning sequence to `out`.
///
/// A seed of `0` is replaced by a random one, reported in the summary.
pub fn minimize<P: AsRef<Path>, Q: AsRef<Path>>(
    graph_path: P,
    out: Q,
    mut config: EvolutionConfig,
) -> Result<RunSummary> {
    if config.seed == 0 {
        config.seed = rand::random::<u64>().max(1);
        log::info!("Using random seed {}", config.seed);
    }
    config.validate()?;

    let graph = load_graph(graph_path)?;
    let mut optimizer = GeneticOptimizer::new(&graph, config)?;
    optimizer.evolve_with(&graph, &mut LoggingProgress)?;
    finish(&graph, optimizer, out)
}

/// Continue a search from a checkpoint file.
pub fn resume<P, G, Q>(checkpoint_path: P, graph_path: G, out: Q) -> Result<RunSummary>
where
    P: AsRef<Path>,
    G: AsRef<Path>,
    Q: AsRef<Path>,
{
    let mut optimizer = GeneticOptimizer::load_checkpoint(checkpoint_path)?;
    optimizer.synchronize_rng();

    let graph = load_graph(graph_path)?;
    optimizer.evolve_with(&graph, &mut LoggingProgress)?;
    finish(&graph, optimizer, out)
}

/// Run every job of a configuration file in order.
pub fn run_jobs<P: AsRef<Path>>(config_path: P) -> Result<Vec<(String, RunSummary)>> {
    let manager = ConfigManager::new();
    manager.load_from_file(config_path)?;
    let batch = manager.get().batch;

    let mut results = Vec::with_capacity(batch.jobs.len());
    for job in &batch.jobs {
        let profile = batch.profile(&job.population).ok_or_else(|| {
            SchedulerError::Configuration(format!("invalid population name: {}", job.population))
        })?;

        log::info!("Job {}: {} with population {}", job.name, job.graph.display(), profile.name);
        let summary = minimize(&job.graph, &job.out, profile.evolution.clone())?;
        results.push((job.name.clone(), summary));
    }
    Ok(results)
}

fn finish<Q: AsRef<Path>>(graph: &Graph, mut optimizer: GeneticOptimizer, out: Q) -> Result<RunSummary> {
    let (fitness, sequence) = optimizer.get_best(graph);
    sequence.write_to_file(out)?;

    Ok(RunSummary {
        seed: optimizer.seed(),
        fitness,
        generations: optimizer.generations(),
        sequence,
    })
}
