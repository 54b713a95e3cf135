use anyhow::{bail, Context, Result};
use memsched::config::{ConfigManager, EvolutionConfig};
use memsched::drivers;
use memsched::SchedulerError;
use std::env;

const USAGE: &str = "\
Usage:
  memsched verify    <graph> <sequence>
  memsched memory    <graph> <sequence>
  memsched execution <graph> <out> [seed]
  memsched minimize  <graph> <out> [config.toml|config.json]
  memsched resume    <checkpoint> <graph> <out>
  memsched jobs      <config.toml|config.json>

Set RUST_LOG=info (or debug) for progress output.";

// EX_SOFTWARE, so internal bugs are distinguishable from bad input
const EXIT_INVARIANT: i32 = 70;

fn main() {
    env_logger::init();

    if let Err(err) = run(env::args().skip(1).collect()) {
        eprintln!("error: {:#}", err);
        let invariant = err
            .downcast_ref::<SchedulerError>()
            .map_or(false, SchedulerError::is_invariant_violation);
        std::process::exit(if invariant { EXIT_INVARIANT } else { 1 });
    }
}

fn run(args: Vec<String>) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("verify") => {
            let graph = required(&args, 1, "graph")?;
            if drivers::verify(graph, required(&args, 2, "sequence")?)? {
                println!("The execution sequence is valid!");
            } else {
                println!("The execution sequence is invalid!");
            }
        }
        Some("memory") => {
            let graph = required(&args, 1, "graph")?;
            let peak = drivers::memory(graph, required(&args, 2, "sequence")?)?;
            println!("Maximum memory footprint: {}", peak);
        }
        Some("execution") => {
            let seed = match args.get(3) {
                Some(s) => s.parse::<u64>().with_context(|| format!("invalid seed '{}'", s))?,
                None => 1,
            };
            let out = required(&args, 2, "out")?;
            drivers::execution(required(&args, 1, "graph")?, out, seed)?;
            println!("Non minimized execution synthesized to file {}", out);
        }
        Some("minimize") => {
            let config = match args.get(3) {
                Some(path) => {
                    let manager = ConfigManager::new();
                    manager.load_from_file(path)?;
                    manager.get().evolution
                }
                None => EvolutionConfig::default(),
            };
            let graph = required(&args, 1, "graph")?;
            let summary = drivers::minimize(graph, required(&args, 2, "out")?, config)?;
            println!("seed={}", summary.seed);
            println!("Best fitness: {}", summary.fitness);
        }
        Some("resume") => {
            let summary = drivers::resume(
                required(&args, 1, "checkpoint")?,
                required(&args, 2, "graph")?,
                required(&args, 3, "out")?,
            )?;
            println!("seed={}", summary.seed);
            println!("Best fitness: {}", summary.fitness);
        }
        Some("jobs") => {
            for (name, summary) in drivers::run_jobs(required(&args, 1, "config")?)? {
                println!("{}: seed={} best fitness {}", name, summary.seed, summary.fitness);
            }
        }
        Some("help") | Some("-h") | Some("--help") => println!("{}", USAGE),
        Some(other) => bail!("unknown command '{}'\n\n{}", other, USAGE),
        None => bail!("no command given\n\n{}", USAGE),
    }

    Ok(())
}

fn required<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .with_context(|| format!("missing <{}>\n\n{}", name, USAGE))
}
