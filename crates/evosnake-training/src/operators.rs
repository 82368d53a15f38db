//! Genetic operators on flat genomes.
//!
//! These are the building blocks used by
//! [`PopulationEvolver`](crate::genetic::PopulationEvolver):
//!
//! - **Crossover**: [`uniform_crossover`] picks every gene independently from
//!   one of two parents
//! - **Mutation**: [`mutate`] replaces genes with fresh random values
//! - **Spawning**: [`spawn_random`] creates new weight sets,
//!   [`spawn_from`] turns genomes back into weight sets
//!
//! Crossover and mutation never look at tensor shapes. The bridge between the
//! ragged [`WeightSet`] and the flat [`Genome`] is
//! [`LayerSchedule::encode`]/[`LayerSchedule::decode`].
//!
//! # Uniform Crossover
//!
//! Each gene of the child comes from parent A with probability 0.5 and from
//! parent B otherwise. There are no crossover points, so genes of the same
//! tensor are not kept together.
//!
//! # Replacement Mutation
//!
//! A mutated gene is overwritten with a value drawn uniformly from
//! `[-spread, spread]`, regardless of its previous value. With the default
//! rate of 0.001 a child of the default network (72 genes) is mutated at all
//! in roughly 7% of the cases.

use evosnake_policy::weights::{Genome, LayerSchedule, ShapeError, WeightSampler, WeightSet};
use rand::Rng;
use rand_distr::{Bernoulli, Distribution as _};

/// Combines two parent genomes gene by gene.
///
/// # Panics
///
/// Panics if the parents have different lengths.
pub fn uniform_crossover<R>(mum: &Genome, dad: &Genome, rng: &mut R) -> Genome
where
    R: Rng + ?Sized,
{
    assert_eq!(mum.len(), dad.len());
    mum.genes()
        .iter()
        .zip(dad.genes())
        .map(|(m, d)| if rng.random_bool(0.5) { *m } else { *d })
        .collect()
}

/// Replaces each gene with probability `mutation` by a value from `sampler`.
///
/// Returns the number of replaced genes.
pub fn mutate<R>(
    genome: &mut Genome,
    mutation: Bernoulli,
    sampler: &WeightSampler,
    rng: &mut R,
) -> usize
where
    R: Rng + ?Sized,
{
    let mut mutated = 0;
    for gene in genome.genes_mut() {
        if mutation.sample(rng) {
            *gene = sampler.sample(rng);
            mutated += 1;
        }
    }
    mutated
}

/// Creates `count` weight sets with every element drawn from `sampler`.
pub fn spawn_random<R>(
    count: usize,
    schedule: &LayerSchedule,
    sampler: &WeightSampler,
    rng: &mut R,
) -> Vec<WeightSet>
where
    R: Rng + ?Sized,
{
    (0..count)
        .map(|_| sampler.random_weights(schedule, rng))
        .collect()
}

/// Reshapes flat genomes into weight sets of `schedule`.
pub fn spawn_from<I>(genomes: I, schedule: &LayerSchedule) -> Result<Vec<WeightSet>, ShapeError>
where
    I: IntoIterator<Item = Genome>,
{
    genomes
        .into_iter()
        .map(|genome| schedule.decode(genome))
        .collect()
}
