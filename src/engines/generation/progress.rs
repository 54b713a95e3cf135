use super::evolution_engine::ProgressCallback;

/// Reports each generation through the `log` facade.
pub struct LoggingProgress;

impl ProgressCallback for LoggingProgress {
    fn on_generation_start(&mut self, generation: usize) {
        log::debug!("Generation {} starting", generation + 1);
    }

    fn on_generation_complete(&mut self, generation: usize, best_fitness: usize, avg_fitness: f64) {
        log::info!(
            "Epoch {}: Best fitness: {} Avg fitness: {:.3}",
            generation,
            best_fitness,
            avg_fitness
        );
    }
}

/// Discards progress events.
pub struct SilentProgress;

impl ProgressCallback for SilentProgress {
    fn on_generation_start(&mut self, _generation: usize) {}

    fn on_generation_complete(&mut self, _generation: usize, _best_fitness: usize, _avg_fitness: f64) {}
}

/// Records the best fitness after every generation.
#[derive(Debug, Default)]
pub struct FitnessTrace {
    pub best: Vec<usize>,
    pub average: Vec<f64>,
}

impl ProgressCallback for FitnessTrace {
    fn on_generation_start(&mut self, _generation: usize) {}

    fn on_generation_complete(&mut self, _generation: usize, best_fitness: usize, avg_fitness: f64) {
        self.best.push(best_fitness);
        self.average.push(avg_fitness);
    }
}
