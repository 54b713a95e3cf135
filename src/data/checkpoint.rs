use crate::engines::generation::GeneticOptimizer;
use crate::error::{Result, SchedulerError};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

// Serializes every checkpoint read and write in the process.
static CHECKPOINT_LOCK: Mutex<()> = Mutex::new(());

#[derive(Serialize)]
struct SnapshotRef<'a, T> {
    saved_at: DateTime<Utc>,
    state: &'a T,
}

#[derive(Deserialize)]
struct Snapshot<T> {
    #[allow(dead_code)]
    saved_at: DateTime<Utc>,
    state: T,
}

/// Write `state` to `path` as pretty-printed JSON, replacing any existing file.
pub fn save<T: Serialize>(path: &Path, state: &T) -> Result<()> {
    let _guard = CHECKPOINT_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    let file = File::create(path).map_err(|e| checkpoint_error("create", path, e))?;
    let mut writer = BufWriter::new(file);
    let snapshot = SnapshotRef {
        saved_at: Utc::now(),
        state,
    };
    serde_json::to_writer_pretty(&mut writer, &snapshot)
        .map_err(|e| checkpoint_error("write", path, e))?;
    writer.flush().map_err(|e| checkpoint_error("flush", path, e))?;

    log::debug!("Saved checkpoint {}", path.display());
    Ok(())
}

pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let _guard = CHECKPOINT_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    let file = File::open(path).map_err(|e| checkpoint_error("open", path, e))?;
    let snapshot: Snapshot<T> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| checkpoint_error("decode", path, e))?;
    Ok(snapshot.state)
}

fn checkpoint_error<E: std::fmt::Display>(action: &str, path: &Path, err: E) -> SchedulerError {
    SchedulerError::Checkpoint(format!("failed to {} {}: {}", action, path.display(), err))
}

/// A directory of per-generation checkpoints named `<generation>.json`.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| checkpoint_error("create", &self.dir, e))
    }

    pub fn path_for(&self, generation: usize) -> PathBuf {
        self.dir.join(format!("{}.json", generation))
    }

    pub fn save(&self, optimizer: &GeneticOptimizer) -> Result<PathBuf> {
        let path = self.path_for(optimizer.generations());
        save(&path, optimizer)?;
        Ok(path)
    }

    /// The checkpoint with the highest generation number, if any.
    pub fn latest(&self) -> Result<Option<PathBuf>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(checkpoint_error("list", &self.dir, e)),
        };

        let mut best: Option<(usize, PathBuf)> = None;
        for entry in entries {
            let path = entry?.path();
            let generation = path
                .file_stem()
                .and_then(|s| s.to_str())
                .filter(|_| path.extension().map_or(false, |ext| ext == "json"))
                .and_then(|s| s.parse::<usize>().ok());

            if let Some(generation) = generation {
                if best.as_ref().map_or(true, |(g, _)| generation > *g) {
                    best = Some((generation, path));
                }
            }
        }

        Ok(best.map(|(_, path)| path))
    }
}
