mod common;

use common::{scratch_dir, SCENARIO};
use memsched::config::{ConfigManager, EvolutionConfig};
use memsched::{drivers, is_valid, simulate, Graph, Sequence};
use std::path::{Path, PathBuf};

fn write_config(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("memsched.toml");
    std::fs::write(&path, body).unwrap();
    path
}

fn write_scenario(dir: &Path) -> PathBuf {
    let path = dir.join("scenario.txt");
    std::fs::write(&path, SCENARIO).unwrap();
    path
}

fn small_config(seed: u64) -> EvolutionConfig {
    EvolutionConfig {
        population_size: 8,
        epsilon: 2,
        mutation_rate: 0.5,
        seed,
        ..Default::default()
    }
}

#[test]
fn test_load_evolution_section_and_jobs() {
    let dir = scratch_dir("load");
    let path = write_config(
        &dir,
        r#"
[evolution]
population_size = 40
epsilon = 10
mutation_rate = 0.3
seed = 9

[[populations]]
name = "small"
population_size = 8
epsilon = 2
mutation_rate = 0.5
seed = 3

[[jobs]]
name = "scenario"
graph = "scenario.txt"
out = "scenario.seq"
population = "small"
"#,
    );

    let manager = ConfigManager::new();
    manager.load_from_file(&path).unwrap();
    let config = manager.get();

    assert_eq!(config.evolution.population_size, 40);
    assert_eq!(config.evolution.epsilon, 10);
    assert_eq!(config.evolution.seed, 9);
    assert_eq!(config.evolution.checkpoint_frequency, 0);

    let profile = config.batch.profile("small").unwrap();
    assert_eq!(profile.evolution.population_size, 8);
    assert_eq!(profile.evolution.seed, 3);
    assert_eq!(config.batch.jobs.len(), 1);
    assert_eq!(config.batch.jobs[0].population, "small");
}

#[test]
fn test_missing_sections_fall_back_to_defaults() {
    let dir = scratch_dir("defaults");
    let path = write_config(&dir, "[evolution]\nseed = 5\n");

    let manager = ConfigManager::new();
    manager.load_from_file(&path).unwrap();
    let config = manager.get();

    assert_eq!(config.evolution.seed, 5);
    assert_eq!(config.evolution.population_size, EvolutionConfig::default().population_size);
    assert!(config.batch.jobs.is_empty());
}

#[test]
fn test_rejects_bad_mutation_rate() {
    let dir = scratch_dir("bad-rate");
    let path = write_config(&dir, "[evolution]\nmutation_rate = 1.5\n");

    let manager = ConfigManager::new();
    assert!(manager.load_from_file(&path).is_err());
    assert_eq!(manager.get().evolution, EvolutionConfig::default());
}

#[test]
fn test_rejects_duplicate_population_names() {
    let dir = scratch_dir("dup");
    let path = write_config(
        &dir,
        r#"
[[populations]]
name = "p"
population_size = 8

[[populations]]
name = "p"
population_size = 16
"#,
    );

    assert!(ConfigManager::new().load_from_file(&path).is_err());
}

#[test]
fn test_rejects_job_with_unknown_population() {
    let dir = scratch_dir("unknown-pop");
    let path = write_config(
        &dir,
        r#"
[[populations]]
name = "p"
population_size = 8

[[jobs]]
name = "j"
graph = "g.txt"
out = "g.seq"
population = "missing"
"#,
    );

    assert!(ConfigManager::new().load_from_file(&path).is_err());
}

#[test]
fn test_update_validates_before_applying() {
    let manager = ConfigManager::new();
    assert!(manager.update(|c| c.evolution.population_size = 1).is_err());
    assert_eq!(manager.get().evolution.population_size, 400);

    manager.update(|c| c.evolution.epsilon = 7).unwrap();
    assert_eq!(manager.get().evolution.epsilon, 7);
}

#[test]
fn test_saved_config_loads_back() {
    let dir = scratch_dir("save");
    let path = dir.join("saved.toml");

    let manager = ConfigManager::new();
    manager
        .update(|c| {
            c.evolution.seed = 77;
            c.evolution.mutation_rate = 0.25;
        })
        .unwrap();
    manager.save_to_file(&path).unwrap();

    let reloaded = ConfigManager::new();
    reloaded.load_from_file(&path).unwrap();
    assert_eq!(reloaded.get(), manager.get());
}

#[test]
fn test_verify_and_memory_drivers() {
    let dir = scratch_dir("verify");
    let graph = write_scenario(&dir);
    let good = dir.join("good.seq");
    let bad = dir.join("bad.seq");
    Sequence::new(vec![5, 6, 7, 4]).write_to_file(&good).unwrap();
    Sequence::new(vec![7, 5, 6, 4]).write_to_file(&bad).unwrap();

    assert!(drivers::verify(&graph, &good).unwrap());
    assert!(!drivers::verify(&graph, &bad).unwrap());
    assert_eq!(drivers::memory(&graph, &good).unwrap(), 4);
    assert!(drivers::memory(&graph, &bad).is_err());
}

#[test]
fn test_execution_writes_valid_sequence() {
    let dir = scratch_dir("execution");
    let graph_path = write_scenario(&dir);
    let out = dir.join("random.seq");

    let written = drivers::execution(&graph_path, &out, 12).unwrap();
    let reread = Sequence::from_file(&out).unwrap();
    assert_eq!(written, reread);

    let graph = Graph::from_file(&graph_path).unwrap();
    assert!(is_valid(&graph, &reread));
}

#[test]
fn test_netlist_input_is_refused() {
    let dir = scratch_dir("blif");
    let path = dir.join("circuit.blif");
    std::fs::write(&path, ".model top\n").unwrap();
    assert!(drivers::load_graph(&path).is_err());
}

#[test]
fn test_minimize_writes_optimal_sequence() {
    let dir = scratch_dir("minimize");
    let graph_path = write_scenario(&dir);
    let out = dir.join("best.seq");

    let summary = drivers::minimize(&graph_path, &out, small_config(4)).unwrap();
    assert_eq!(summary.seed, 4);
    assert_eq!(summary.fitness, 4);
    assert!(summary.generations >= 2);

    let graph = Graph::from_file(&graph_path).unwrap();
    let written = Sequence::from_file(&out).unwrap();
    assert_eq!(written, summary.sequence);
    assert_eq!(simulate(&graph, &written).unwrap(), 4);
}

#[test]
fn test_minimize_picks_random_seed_for_zero() {
    let dir = scratch_dir("zero-seed");
    let graph_path = write_scenario(&dir);
    let summary = drivers::minimize(&graph_path, dir.join("best.seq"), small_config(0)).unwrap();
    assert_ne!(summary.seed, 0);
}

#[test]
fn test_resume_continues_from_checkpoint() {
    let dir = scratch_dir("resume-driver");
    let graph_path = write_scenario(&dir);
    let checkpoints = dir.join("checkpoints");

    let mut config = small_config(6);
    config.checkpoint_frequency = 1;
    config.checkpoint_path = checkpoints.clone();
    let first = drivers::minimize(&graph_path, dir.join("first.seq"), config).unwrap();

    let start = checkpoints.join("0.json");
    assert!(start.exists());
    let resumed = drivers::resume(&start, &graph_path, dir.join("resumed.seq")).unwrap();

    assert_eq!(resumed.seed, 6);
    assert_eq!(resumed.fitness, first.fitness);
    assert_eq!(resumed.generations, first.generations);
}

#[test]
fn test_run_jobs_in_order() {
    let dir = scratch_dir("jobs");
    let graph = write_scenario(&dir);
    let config = write_config(
        &dir,
        &format!(
            r#"
[[populations]]
name = "tiny"
population_size = 8
epsilon = 2
mutation_rate = 0.5
seed = 2

[[jobs]]
name = "first"
graph = "{graph}"
out = "{first}"
population = "tiny"

[[jobs]]
name = "second"
graph = "{graph}"
out = "{second}"
population = "tiny"
"#,
            graph = graph.display(),
            first = dir.join("first.seq").display(),
            second = dir.join("second.seq").display(),
        ),
    );

    let results = drivers::run_jobs(&config).unwrap();
    let names: Vec<&str> = results.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, ["first", "second"]);
    assert!(results.iter().all(|(_, summary)| summary.fitness == 4));
    assert!(dir.join("first.seq").exists());
    assert!(dir.join("second.seq").exists());
}
