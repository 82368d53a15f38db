//! File-backed checkpoint store and progress log.
//!
//! Checkpoints are written to `<dir>/evo_snake-<slot>.json`, one JSON
//! document per slot. Progress records are appended to `<dir>/evo_log.txt`:
//!
//! ```text
//! Best of Gen 100: 12 187
//! Best of Gen 100: 11 240
//! --------------------------------------
//! ```

use std::{
    fs::OpenOptions,
    io::{self, BufWriter},
    path::{Path, PathBuf},
};

use evosnake_policy::{episode::Individual, weights::LayerSchedule};
use evosnake_training::{
    checkpoint::{CheckpointError, CheckpointSlot, CheckpointStore, ProgressLog, ProgressRecord},
    config::FitnessWeights,
};

use crate::{schema::checkpoint::CheckpointFile, util};

pub const CHECKPOINT_PREFIX: &str = "evo_snake-";
pub const PROGRESS_LOG_NAME: &str = "evo_log.txt";
const SEPARATOR: &str = "--------------------------------------";

#[must_use]
pub fn checkpoint_path(dir: &Path, slot: CheckpointSlot) -> PathBuf {
    dir.join(format!("{CHECKPOINT_PREFIX}{slot}.json"))
}

/// Reads a checkpoint file and validates its weight sets.
pub fn read_checkpoint(path: &Path) -> io::Result<Vec<Individual>> {
    let file: CheckpointFile = util::read_json(path)?;
    file.into_individuals()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[derive(Debug)]
pub struct JsonCheckpointStore {
    dir: PathBuf,
    layers: LayerSchedule,
    fitness: FitnessWeights,
}

impl JsonCheckpointStore {
    #[must_use]
    pub fn new(dir: PathBuf, layers: LayerSchedule, fitness: FitnessWeights) -> Self {
        Self {
            dir,
            layers,
            fitness,
        }
    }
}

impl CheckpointStore for JsonCheckpointStore {
    fn save(&mut self, slot: CheckpointSlot, entries: &[Individual]) -> Result<(), CheckpointError> {
        let file = CheckpointFile::new(self.layers.clone(), entries, &self.fitness);
        util::write_json(&checkpoint_path(&self.dir, slot), &file)
            .map_err(|source| CheckpointError::new(slot, source))
    }

    fn load(&self, slot: CheckpointSlot) -> Result<Vec<Individual>, CheckpointError> {
        read_checkpoint(&checkpoint_path(&self.dir, slot))
            .map_err(|source| CheckpointError::new(slot, source))
    }
}

#[derive(Debug)]
pub struct FileProgressLog {
    path: PathBuf,
}

impl FileProgressLog {
    #[must_use]
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(PROGRESS_LOG_NAME),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressLog for FileProgressLog {
    fn append(&mut self, record: &ProgressRecord) -> io::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        write_record(BufWriter::new(file), record)
    }
}

fn write_record<W>(mut writer: W, record: &ProgressRecord) -> io::Result<()>
where
    W: io::Write,
{
    for (score, steps) in &record.leaders {
        writeln!(writer, "Best of Gen {}: {score} {steps}", record.generation)?;
    }
    writeln!(writer, "{SEPARATOR}")?;
    writer.flush()
}

/// Creates `dir` (and its parents) if it does not exist yet.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dir)
}

#[cfg(test)]
mod tests {
    use std::{fs, process};

    use evosnake_policy::weights::WeightSampler;
    use rand::{SeedableRng as _, rngs::StdRng};

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("evosnake-{name}-{}", process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn entries(layers: &LayerSchedule) -> Vec<Individual> {
        let sampler = WeightSampler::new(3.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        [(9, 40), (3, 80), (3, 10)]
            .into_iter()
            .map(|(score, steps)| Individual {
                weights: sampler.random_weights(layers, &mut rng),
                score,
                steps,
            })
            .collect()
    }

    #[test]
    fn test_checkpoint_path() {
        let dir = Path::new("runs");
        assert_eq!(
            checkpoint_path(dir, CheckpointSlot::Generation(0)),
            Path::new("runs/evo_snake-0.json")
        );
        assert_eq!(
            checkpoint_path(dir, CheckpointSlot::Final),
            Path::new("runs/evo_snake-final.json")
        );
    }

    #[test]
    fn test_store_round_trip() {
        let dir = scratch_dir("store");
        let layers = LayerSchedule::new(vec![5, 8, 4]).unwrap();
        let entries = entries(&layers);
        let mut store =
            JsonCheckpointStore::new(dir.clone(), layers.clone(), FitnessWeights::default());

        store.save(CheckpointSlot::Generation(100), &entries).unwrap();
        let loaded = store.load(CheckpointSlot::Generation(100)).unwrap();
        assert_eq!(loaded.len(), entries.len());
        assert_eq!(loaded, entries);

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.join("evo_snake-100.json")).unwrap())
                .unwrap();
        assert_eq!(raw["entries"][0]["fitness"], 220.0);
        assert_eq!(raw["layers"], serde_json::json!([5, 8, 4]));
        assert!(raw["saved_at"].is_string());

        let err = store.load(CheckpointSlot::Final).unwrap_err();
        assert_eq!(err.slot, CheckpointSlot::Final);
        assert_eq!(err.source.kind(), io::ErrorKind::NotFound);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_saved_weights_are_bit_exact() {
        let dir = scratch_dir("exact");
        let layers = LayerSchedule::new(vec![5, 8, 4]).unwrap();
        let sampler = WeightSampler::new(3.0).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let entries = (0..200)
            .map(|score| Individual {
                weights: sampler.random_weights(&layers, &mut rng),
                score,
                steps: 0,
            })
            .collect::<Vec<_>>();
        let mut store =
            JsonCheckpointStore::new(dir.clone(), layers.clone(), FitnessWeights::default());
        store.save(CheckpointSlot::Final, &entries).unwrap();
        let loaded = store.load(CheckpointSlot::Final).unwrap();

        let changed = loaded
            .iter()
            .zip(&entries)
            .flat_map(|(a, b)| {
                let a = layers.encode(&a.weights).unwrap();
                let b = layers.encode(&b.weights).unwrap();
                a.genes()
                    .iter()
                    .zip(b.genes())
                    .map(|(x, y)| x.to_bits() != y.to_bits())
                    .collect::<Vec<_>>()
            })
            .filter(|changed| *changed)
            .count();
        assert_eq!(changed, 0);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_mismatched_weights_are_rejected() {
        let dir = scratch_dir("mismatch");
        let layers = LayerSchedule::new(vec![5, 8, 4]).unwrap();
        let mut store = JsonCheckpointStore::new(
            dir.clone(),
            LayerSchedule::new(vec![5, 6, 4]).unwrap(),
            FitnessWeights::default(),
        );
        store.save(CheckpointSlot::Final, &entries(&layers)).unwrap();
        let err = store.load(CheckpointSlot::Final).unwrap_err();
        assert_eq!(err.source.kind(), io::ErrorKind::InvalidData);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_progress_lines() {
        let record = ProgressRecord {
            generation: 100,
            leaders: vec![(12, 187), (11, 240)],
        };
        let mut out = vec![];
        write_record(&mut out, &record).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Best of Gen 100: 12 187\nBest of Gen 100: 11 240\n--------------------------------------\n"
        );
    }

    #[test]
    fn test_progress_log_appends() {
        let dir = scratch_dir("progress");
        let mut log = FileProgressLog::new(&dir);
        for generation in [0, 100] {
            log.append(&ProgressRecord {
                generation,
                leaders: vec![(1, 2)],
            })
            .unwrap();
        }
        let text = fs::read_to_string(log.path()).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert!(text.starts_with("Best of Gen 0: 1 2\n"));

        fs::remove_dir_all(dir).unwrap();
    }
}
