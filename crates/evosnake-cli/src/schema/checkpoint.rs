use chrono::{DateTime, Utc};
use evosnake_policy::{
    episode::Individual,
    weights::{LayerSchedule, ShapeError, WeightSet},
};
use evosnake_training::config::FitnessWeights;
use serde::{Deserialize, Serialize};

/// On-disk form of a checkpoint slot.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckpointFile {
    pub saved_at: DateTime<Utc>,
    pub layers: LayerSchedule,
    /// Best first.
    pub entries: Vec<CheckpointEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckpointEntry {
    pub weights: WeightSet,
    pub score: usize,
    pub steps: usize,
    pub fitness: f64,
}

impl CheckpointFile {
    #[must_use]
    pub fn new(layers: LayerSchedule, entries: &[Individual], fitness: &FitnessWeights) -> Self {
        let entries = entries
            .iter()
            .map(|individual| CheckpointEntry {
                weights: individual.weights.clone(),
                score: individual.score,
                steps: individual.steps,
                fitness: fitness.fitness(individual.score, individual.steps),
            })
            .collect();
        Self {
            saved_at: Utc::now(),
            layers,
            entries,
        }
    }

    /// Converts the entries back, checking every weight set against `layers`.
    pub fn into_individuals(self) -> Result<Vec<Individual>, ShapeError> {
        let Self {
            layers, entries, ..
        } = self;
        entries
            .into_iter()
            .map(|entry| {
                layers.check(&entry.weights).map(|()| Individual {
                    weights: entry.weights,
                    score: entry.score,
                    steps: entry.steps,
                })
            })
            .collect()
    }
}
