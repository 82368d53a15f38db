//! Truncation selection and generation replacement.
//!
//! Each generation is built from the previous one's evaluation results:
//!
//! 1. rank all individuals by fitness, best first
//! 2. keep the top `elite_count` weight sets unchanged
//! 3. add one mutated child per unordered pair of elites
//! 4. fill the rest of the population with fresh random weight sets
//!
//! With a validated [`GaConfig`] the new population always has exactly
//! `population_size` members.

use evosnake_policy::{
    episode::Individual,
    weights::{LayerSchedule, ShapeError, WeightSampler, WeightSet},
};
use rand::Rng;
use rand_distr::Bernoulli;

use crate::{
    config::{ConfigError, FitnessWeights, GaConfig, offspring_count},
    operators,
};

/// The weight sets awaiting evaluation in one generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Population {
    members: Vec<WeightSet>,
}

impl Population {
    #[must_use]
    pub fn new(members: Vec<WeightSet>) -> Self {
        Self { members }
    }

    #[must_use]
    pub fn members(&self) -> &[WeightSet] {
        &self.members
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn into_members(self) -> Vec<WeightSet> {
        self.members
    }
}

/// Sorts `individuals` by descending fitness.
///
/// The sort is stable: individuals with equal fitness keep their evaluation
/// order.
#[must_use]
pub fn rank(mut individuals: Vec<Individual>, fitness: &FitnessWeights) -> Vec<Individual> {
    individuals.sort_by(|a, b| {
        let fa = fitness.fitness(a.score, a.steps);
        let fb = fitness.fitness(b.score, b.steps);
        fb.total_cmp(&fa)
    });
    individuals
}

/// The first `count` weight sets of a ranked list (or all, if there are fewer).
#[must_use]
pub fn select_elites(ranked: &[Individual], count: usize) -> Vec<WeightSet> {
    ranked
        .iter()
        .take(count)
        .map(|individual| individual.weights.clone())
        .collect()
}

#[derive(Debug, Clone)]
pub struct PopulationEvolver {
    schedule: LayerSchedule,
    population_size: usize,
    elite_count: usize,
    mutation: Bernoulli,
    sampler: WeightSampler,
    fitness: FitnessWeights,
}

impl PopulationEvolver {
    pub fn from_config(config: &GaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mutation = Bernoulli::new(config.mutation_rate).map_err(|_| {
            ConfigError::MutationRate {
                rate: config.mutation_rate,
            }
        })?;
        Ok(Self {
            schedule: config.layers.clone(),
            population_size: config.population_size,
            elite_count: config.elite_count,
            mutation,
            sampler: config.weight_sampler()?,
            fitness: config.fitness,
        })
    }

    #[must_use]
    pub fn schedule(&self) -> &LayerSchedule {
        &self.schedule
    }

    #[must_use]
    pub fn fitness(&self) -> &FitnessWeights {
        &self.fitness
    }

    /// Generation 0: `population_size` random weight sets.
    #[must_use]
    pub fn initial_population<R>(&self, rng: &mut R) -> Population
    where
        R: Rng + ?Sized,
    {
        Population::new(operators::spawn_random(
            self.population_size,
            &self.schedule,
            &self.sampler,
            rng,
        ))
    }

    /// Builds the next population from individuals ranked best first.
    pub fn next_generation<R>(
        &self,
        ranked: &[Individual],
        rng: &mut R,
    ) -> Result<Population, ShapeError>
    where
        R: Rng + ?Sized,
    {
        let elites = select_elites(ranked, self.elite_count);
        let children = self.offspring(&elites, rng)?;
        let random_count = self
            .population_size
            .saturating_sub(elites.len() + children.len());
        tracing::debug!(
            elites = elites.len(),
            offspring = children.len(),
            random = random_count,
            "building next generation"
        );

        let mut members = elites;
        members.extend(children);
        members.extend(operators::spawn_random(
            random_count,
            &self.schedule,
            &self.sampler,
            rng,
        ));
        Ok(Population::new(members))
    }

    /// Ranks `results` and builds the next population from them.
    ///
    /// Returns the ranked results alongside the new population.
    pub fn build_next_generation<R>(
        &self,
        results: Vec<Individual>,
        rng: &mut R,
    ) -> Result<(Vec<Individual>, Population), ShapeError>
    where
        R: Rng + ?Sized,
    {
        let ranked = rank(results, &self.fitness);
        let population = self.next_generation(&ranked, rng)?;
        Ok((ranked, population))
    }

    /// One child per unordered pair `(i, j)`, `i < j`, in pair order.
    fn offspring<R>(&self, elites: &[WeightSet], rng: &mut R) -> Result<Vec<WeightSet>, ShapeError>
    where
        R: Rng + ?Sized,
    {
        let genomes = elites
            .iter()
            .map(|weights| self.schedule.encode(weights))
            .collect::<Result<Vec<_>, _>>()?;

        let mut children = Vec::with_capacity(offspring_count(genomes.len()));
        for (i, mum) in genomes.iter().enumerate() {
            for dad in &genomes[i + 1..] {
                let mut child = operators::uniform_crossover(mum, dad, rng);
                operators::mutate(&mut child, self.mutation, &self.sampler, rng);
                children.push(child);
            }
        }
        operators::spawn_from(children, &self.schedule)
    }
}
