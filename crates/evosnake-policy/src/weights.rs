//! Weight sets and their flat genome encoding.
//!
//! A [`WeightSet`] holds one [`Tensor`] per layer transition. Tensor `i` has
//! shape `(layers[i], layers[i + 1])` for a fixed [`LayerSchedule`], so the
//! set is "ragged": every tensor has a different shape.
//!
//! Crossover and mutation work on a [`Genome`] instead, the concatenation of
//! all tensor values. The traversal order is fixed (tensor by tensor, each in
//! row-major order), which makes [`LayerSchedule::encode`] and
//! [`LayerSchedule::decode`] an exact bijection between weight sets of the
//! schedule and genomes of length [`LayerSchedule::genome_len`].
//!
//! # Example
//!
//! ```
//! use evosnake_policy::weights::{LayerSchedule, WeightSampler};
//!
//! let schedule = LayerSchedule::new(vec![5, 8, 4]).unwrap();
//! let weights = WeightSampler::new(3.0)
//!     .unwrap()
//!     .random_weights(&schedule, &mut rand::rng());
//!
//! let genome = schedule.encode(&weights).unwrap();
//! assert_eq!(genome.len(), 5 * 8 + 8 * 4);
//! assert_eq!(schedule.decode(genome).unwrap(), weights);
//! ```

use rand::Rng;
use rand_distr::{Distribution as _, Uniform};
use serde::{Deserialize, Serialize};

/// Shape precondition violations.
///
/// These indicate a programming error (mismatched configuration or corrupted
/// data) and are never coerced into a valid shape.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ShapeError {
    #[display("layer schedule needs at least 2 sizes, got {len}")]
    ScheduleTooShort { len: usize },
    #[display("layer {index} of the schedule has size 0")]
    EmptyLayer { index: usize },
    #[display("observation has {actual} values, expected {expected}")]
    Observation { expected: usize, actual: usize },
    #[display("genome has {actual} genes, expected {expected}")]
    Genome { expected: usize, actual: usize },
    #[display("weight set has {actual} tensors, expected {expected}")]
    TensorCount { expected: usize, actual: usize },
    #[display("tensor {index} has shape {actual:?}, expected {expected:?}")]
    TensorShape {
        index: usize,
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[display("tensor {index} holds {actual} values, expected {expected}")]
    TensorValues {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

/// A dense `rows x cols` matrix stored in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl Tensor {
    /// Creates a tensor by calling `f(row, col)` for every element in row-major order.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut values = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                values.push(f(r, c));
            }
        }
        Self { rows, cols, values }
    }

    /// Creates a tensor from row-major values.
    pub fn from_values(rows: usize, cols: usize, values: Vec<f64>) -> Result<Self, ShapeError> {
        if values.len() != rows * cols {
            return Err(ShapeError::TensorValues {
                index: 0,
                expected: rows * cols,
                actual: values.len(),
            });
        }
        Ok(Self { rows, cols, values })
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Row-major element values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.rows && col < self.cols);
        self.values[row * self.cols + col]
    }

    /// Computes the row vector product `input · self`.
    ///
    /// # Panics
    ///
    /// Panics if `input.len() != self.rows()`.
    #[must_use]
    pub fn left_mul(&self, input: &[f64]) -> Vec<f64> {
        assert_eq!(input.len(), self.rows);
        let mut output = vec![0.0; self.cols];
        for (x, row) in input.iter().zip(self.values.chunks_exact(self.cols)) {
            for (o, w) in output.iter_mut().zip(row) {
                *o += x * w;
            }
        }
        output
    }
}

/// An ordered sequence of tensors, one per layer transition.
///
/// Used both as the genome of an individual and as the parameters of its
/// [`Controller`](crate::controller::Controller).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightSet {
    tensors: Vec<Tensor>,
}

impl WeightSet {
    #[must_use]
    pub fn new(tensors: Vec<Tensor>) -> Self {
        Self { tensors }
    }

    #[must_use]
    pub fn tensors(&self) -> &[Tensor] {
        &self.tensors
    }

    /// Number of scalar weights across all tensors.
    #[must_use]
    pub fn gene_count(&self) -> usize {
        self.tensors.iter().map(|t| t.values.len()).sum()
    }

    /// Derives the layer schedule implied by the tensor shapes.
    ///
    /// Fails if consecutive tensors do not chain (`cols` of tensor `i` must
    /// equal `rows` of tensor `i + 1`) or a tensor's values do not match its shape.
    pub fn schedule(&self) -> Result<LayerSchedule, ShapeError> {
        let Some(first) = self.tensors.first() else {
            return Err(ShapeError::ScheduleTooShort { len: 0 });
        };
        let mut sizes = vec![first.rows];
        for (index, tensor) in self.tensors.iter().enumerate() {
            let expected = (sizes[index], tensor.cols);
            if tensor.shape() != expected {
                return Err(ShapeError::TensorShape {
                    index,
                    expected,
                    actual: tensor.shape(),
                });
            }
            sizes.push(tensor.cols);
        }
        let schedule = LayerSchedule::new(sizes)?;
        schedule.check(self)?;
        Ok(schedule)
    }
}

/// A flat encoding of a [`WeightSet`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Genome(Vec<f64>);

impl Genome {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn genes(&self) -> &[f64] {
        &self.0
    }

    pub fn genes_mut(&mut self) -> &mut [f64] {
        &mut self.0
    }
}

impl From<Vec<f64>> for Genome {
    fn from(genes: Vec<f64>) -> Self {
        Self(genes)
    }
}

impl FromIterator<f64> for Genome {
    fn from_iter<T: IntoIterator<Item = f64>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Layer sizes `[input_dim, hidden..., output_dim]` of a network.
///
/// Fixed for the lifetime of a run, so every individual's weight set and
/// genome have the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct LayerSchedule {
    sizes: Vec<usize>,
}

impl LayerSchedule {
    pub fn new(sizes: Vec<usize>) -> Result<Self, ShapeError> {
        if sizes.len() < 2 {
            return Err(ShapeError::ScheduleTooShort { len: sizes.len() });
        }
        if let Some(index) = sizes.iter().position(|s| *s == 0) {
            return Err(ShapeError::EmptyLayer { index });
        }
        Ok(Self { sizes })
    }

    #[must_use]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    #[must_use]
    pub fn input_dim(&self) -> usize {
        self.sizes[0]
    }

    #[must_use]
    pub fn output_dim(&self) -> usize {
        self.sizes[self.sizes.len() - 1]
    }

    /// Shapes `(layers[i], layers[i + 1])` of the tensors, in order.
    pub fn tensor_shapes(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.sizes.windows(2).map(|w| (w[0], w[1]))
    }

    /// Length of the flat genome of any weight set with this schedule.
    #[must_use]
    pub fn genome_len(&self) -> usize {
        self.tensor_shapes().map(|(r, c)| r * c).sum()
    }

    /// Verifies that `weights` has exactly the shapes of this schedule.
    pub fn check(&self, weights: &WeightSet) -> Result<(), ShapeError> {
        let expected = self.sizes.len() - 1;
        if weights.tensors.len() != expected {
            return Err(ShapeError::TensorCount {
                expected,
                actual: weights.tensors.len(),
            });
        }
        let shapes = weights.tensors.iter().zip(self.tensor_shapes());
        for (index, (tensor, expected)) in shapes.enumerate() {
            if tensor.shape() != expected {
                return Err(ShapeError::TensorShape {
                    index,
                    expected,
                    actual: tensor.shape(),
                });
            }
            let (rows, cols) = expected;
            if tensor.values.len() != rows * cols {
                return Err(ShapeError::TensorValues {
                    index,
                    expected: rows * cols,
                    actual: tensor.values.len(),
                });
            }
        }
        Ok(())
    }

    /// Flattens `weights` into a genome: tensor by tensor, row-major.
    pub fn encode(&self, weights: &WeightSet) -> Result<Genome, ShapeError> {
        self.check(weights)?;
        Ok(weights
            .tensors
            .iter()
            .flat_map(|t| t.values.iter().copied())
            .collect())
    }

    /// Rebuilds a weight set from a genome, consuming it in the order used by [`Self::encode`].
    pub fn decode(&self, genome: Genome) -> Result<WeightSet, ShapeError> {
        let expected = self.genome_len();
        if genome.len() != expected {
            return Err(ShapeError::Genome {
                expected,
                actual: genome.len(),
            });
        }
        let mut genes = genome.0.into_iter();
        let tensors = self
            .tensor_shapes()
            .map(|(rows, cols)| Tensor {
                rows,
                cols,
                values: genes.by_ref().take(rows * cols).collect(),
            })
            .collect();
        Ok(WeightSet { tensors })
    }
}

impl TryFrom<Vec<usize>> for LayerSchedule {
    type Error = ShapeError;

    fn try_from(sizes: Vec<usize>) -> Result<Self, Self::Error> {
        Self::new(sizes)
    }
}

impl From<LayerSchedule> for Vec<usize> {
    fn from(schedule: LayerSchedule) -> Self {
        schedule.sizes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
#[display("weight spread must be positive and finite, got {spread}")]
pub struct InvalidSpreadError {
    pub spread: f64,
}

/// Draws weights uniformly from `[-spread, spread]`.
#[derive(Debug, Clone)]
pub struct WeightSampler {
    spread: f64,
    distribution: Uniform<f64>,
}

impl WeightSampler {
    pub fn new(spread: f64) -> Result<Self, InvalidSpreadError> {
        if !(spread.is_finite() && spread > 0.0) {
            return Err(InvalidSpreadError { spread });
        }
        let distribution =
            Uniform::new_inclusive(-spread, spread).map_err(|_| InvalidSpreadError { spread })?;
        Ok(Self {
            spread,
            distribution,
        })
    }

    #[must_use]
    pub fn spread(&self) -> f64 {
        self.spread
    }

    pub fn sample<R>(&self, rng: &mut R) -> f64
    where
        R: Rng + ?Sized,
    {
        self.distribution.sample(rng)
    }

    /// Creates a weight set for `schedule` with every element drawn independently.
    pub fn random_weights<R>(&self, schedule: &LayerSchedule, rng: &mut R) -> WeightSet
    where
        R: Rng + ?Sized,
    {
        let tensors = schedule
            .tensor_shapes()
            .map(|(rows, cols)| Tensor::from_fn(rows, cols, |_, _| self.sample(rng)))
            .collect();
        WeightSet { tensors }
    }
}
