//! Durable records of training progress.
//!
//! The evolution loop only talks to the [`CheckpointStore`] and
//! [`ProgressLog`] traits. The in-memory implementations here are used by
//! tests; the command line tool provides file-backed ones.

use std::{collections::BTreeMap, fmt, io};

use evosnake_policy::episode::Individual;

/// Key under which a checkpoint is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckpointSlot {
    Generation(usize),
    /// The best individuals of the last generation of a run.
    Final,
}

impl fmt::Display for CheckpointSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generation(generation) => write!(f, "{generation}"),
            Self::Final => f.write_str("final"),
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("checkpoint {slot} is not accessible")]
pub struct CheckpointError {
    pub slot: CheckpointSlot,
    pub source: io::Error,
}

impl CheckpointError {
    #[must_use]
    pub fn new(slot: CheckpointSlot, source: io::Error) -> Self {
        Self { slot, source }
    }
}

pub trait CheckpointStore {
    /// Stores `entries` (best first) under `slot`, replacing what was there.
    fn save(&mut self, slot: CheckpointSlot, entries: &[Individual]) -> Result<(), CheckpointError>;

    /// Returns the entries of `slot` in the order they were saved.
    fn load(&self, slot: CheckpointSlot) -> Result<Vec<Individual>, CheckpointError>;
}

impl<S> CheckpointStore for &mut S
where
    S: CheckpointStore + ?Sized,
{
    fn save(&mut self, slot: CheckpointSlot, entries: &[Individual]) -> Result<(), CheckpointError> {
        (**self).save(slot, entries)
    }

    fn load(&self, slot: CheckpointSlot) -> Result<Vec<Individual>, CheckpointError> {
        (**self).load(slot)
    }
}

/// Leaders of one checkpointed generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    pub generation: usize,
    /// `(score, steps)` of the best individuals, best first.
    pub leaders: Vec<(usize, usize)>,
}

impl ProgressRecord {
    #[must_use]
    pub fn from_ranked(generation: usize, ranked: &[Individual], top: usize) -> Self {
        Self {
            generation,
            leaders: ranked.iter().take(top).map(|i| (i.score, i.steps)).collect(),
        }
    }
}

/// Append-only sink of progress records.
pub trait ProgressLog {
    fn append(&mut self, record: &ProgressRecord) -> io::Result<()>;
}

impl<L> ProgressLog for &mut L
where
    L: ProgressLog + ?Sized,
{
    fn append(&mut self, record: &ProgressRecord) -> io::Result<()> {
        (**self).append(record)
    }
}

#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    slots: BTreeMap<CheckpointSlot, Vec<Individual>>,
}

impl MemoryCheckpointStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Saved slots in ascending order (`Final` last).
    pub fn slots(&self) -> impl Iterator<Item = CheckpointSlot> + '_ {
        self.slots.keys().copied()
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn save(&mut self, slot: CheckpointSlot, entries: &[Individual]) -> Result<(), CheckpointError> {
        self.slots.insert(slot, entries.to_vec());
        Ok(())
    }

    fn load(&self, slot: CheckpointSlot) -> Result<Vec<Individual>, CheckpointError> {
        self.slots.get(&slot).cloned().ok_or_else(|| {
            CheckpointError::new(
                slot,
                io::Error::new(io::ErrorKind::NotFound, "no such checkpoint"),
            )
        })
    }
}

#[derive(Debug, Default)]
pub struct MemoryProgressLog {
    records: Vec<ProgressRecord>,
}

impl MemoryProgressLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> &[ProgressRecord] {
        &self.records
    }
}

impl ProgressLog for MemoryProgressLog {
    fn append(&mut self, record: &ProgressRecord) -> io::Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use evosnake_policy::weights::{Tensor, WeightSet};

    use super::*;

    fn individual(value: f64, score: usize, steps: usize) -> Individual {
        Individual {
            weights: WeightSet::new(vec![Tensor::from_values(1, 1, vec![value]).unwrap()]),
            score,
            steps,
        }
    }

    #[test]
    fn test_slot_display_and_order() {
        assert_eq!(CheckpointSlot::Generation(300).to_string(), "300");
        assert_eq!(CheckpointSlot::Final.to_string(), "final");
        assert!(CheckpointSlot::Generation(10_000) < CheckpointSlot::Final);
    }

    #[test]
    fn test_memory_store_preserves_order_and_count() {
        let mut store = MemoryCheckpointStore::new();
        let entries = vec![
            individual(1.0, 9, 40),
            individual(2.0, 3, 80),
            individual(3.0, 3, 10),
        ];
        store.save(CheckpointSlot::Generation(0), &entries).unwrap();
        assert_eq!(store.load(CheckpointSlot::Generation(0)).unwrap(), entries);

        store
            .save(CheckpointSlot::Generation(0), &entries[..1])
            .unwrap();
        assert_eq!(store.load(CheckpointSlot::Generation(0)).unwrap().len(), 1);
    }

    #[test]
    fn test_memory_store_missing_slot() {
        let store = MemoryCheckpointStore::new();
        let err = store.load(CheckpointSlot::Final).unwrap_err();
        assert_eq!(err.slot, CheckpointSlot::Final);
        assert_eq!(err.source.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_progress_record_takes_top_entries() {
        let ranked = vec![
            individual(1.0, 9, 40),
            individual(2.0, 3, 80),
            individual(3.0, 3, 10),
        ];
        let record = ProgressRecord::from_ranked(100, &ranked, 2);
        assert_eq!(record.generation, 100);
        assert_eq!(record.leaders, [(9, 40), (3, 80)]);

        let mut log = MemoryProgressLog::new();
        log.append(&record).unwrap();
        assert_eq!(log.records(), [record]);
    }
}
