//! Inference: from an observation to a discrete action.
//!
//! The [`Controller`] applies every tensor of its [`WeightSet`] as a dense
//! layer without bias followed by `tanh`:
//!
//! ```text
//! h = tanh(observation · W_0)
//! o = tanh(h · W_1)
//! action = argmax(softmax(o))
//! ```
//!
//! Softmax is monotonic, so the action is computed as `argmax(o)` directly.
//! Ties go to the lowest index. The pass is a pure function of the weights and
//! the observation: there is no hidden state and no randomness.

use crate::weights::{LayerSchedule, ShapeError, WeightSet};

/// Index of a discrete action, in `0..output_dim`.
pub type ActionIndex = usize;

/// A feed-forward policy over a fixed [`WeightSet`].
#[derive(Debug, Clone)]
pub struct Controller {
    schedule: LayerSchedule,
    weights: WeightSet,
}

impl Controller {
    /// Creates a controller, checking that the tensors chain into a valid network.
    pub fn new(weights: WeightSet) -> Result<Self, ShapeError> {
        let schedule = weights.schedule()?;
        Ok(Self { schedule, weights })
    }

    #[must_use]
    pub fn schedule(&self) -> &LayerSchedule {
        &self.schedule
    }

    #[must_use]
    pub fn weights(&self) -> &WeightSet {
        &self.weights
    }

    #[must_use]
    pub fn into_weights(self) -> WeightSet {
        self.weights
    }

    /// Computes the output layer activations for `observation`.
    ///
    /// The observation must have exactly `layers[0]` values.
    pub fn forward(&self, observation: &[f64]) -> Result<Vec<f64>, ShapeError> {
        let expected = self.schedule.input_dim();
        if observation.len() != expected {
            return Err(ShapeError::Observation {
                expected,
                actual: observation.len(),
            });
        }
        let mut activation = observation.to_vec();
        for tensor in self.weights.tensors() {
            activation = tensor.left_mul(&activation);
            for a in &mut activation {
                *a = a.tanh();
            }
        }
        Ok(activation)
    }

    /// Chooses the action for `observation`.
    pub fn decide(&self, observation: &[f64]) -> Result<ActionIndex, ShapeError> {
        let output = self.forward(observation)?;
        Ok(argmax(&output))
    }
}

/// Index of the largest value, preferring the lowest index on ties.
///
/// Returns 0 for an empty slice or when no value compares greater (all NaN).
#[must_use]
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

/// Normalized exponentials of `values`.
#[must_use]
pub fn softmax(values: &[f64]) -> Vec<f64> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps = values.iter().map(|v| (v - max).exp()).collect::<Vec<_>>();
    let sum = exps.iter().sum::<f64>();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;
    use crate::weights::{Tensor, WeightSampler};

    fn random_controller(seed: u64) -> Controller {
        let schedule = LayerSchedule::new(vec![5, 8, 4]).unwrap();
        let weights = WeightSampler::new(3.0)
            .unwrap()
            .random_weights(&schedule, &mut Pcg64::seed_from_u64(seed));
        Controller::new(weights).unwrap()
    }

    #[test]
    fn test_argmax_prefers_lowest_index() {
        assert_eq!(argmax(&[0.1, 0.5, 0.5, 0.2]), 1);
        assert_eq!(argmax(&[0.3, 0.3]), 0);
        assert_eq!(argmax(&[-1.0, -0.5]), 1);
        assert_eq!(argmax(&[]), 0);
    }

    #[test]
    fn test_softmax_preserves_argmax() {
        let values = [0.2, -0.7, 0.9, 0.1];
        let probs = softmax(&values);
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(argmax(&probs), argmax(&values));
    }

    #[test]
    fn test_decide_is_deterministic() {
        let controller = random_controller(10);
        let observation = [0.0, -1.0, 1.0, 0.0, 3.0];
        let first = controller.decide(&observation).unwrap();
        for _ in 0..10 {
            assert_eq!(controller.decide(&observation).unwrap(), first);
        }
        assert!(first < 4);
    }

    #[test]
    fn test_forward_matches_manual_computation() {
        let w0 = Tensor::from_values(2, 2, vec![1.0, 0.0, 0.0, -1.0]).unwrap();
        let w1 = Tensor::from_values(2, 3, vec![1.0, 0.0, 2.0, 0.0, 1.0, 0.0]).unwrap();
        let controller = Controller::new(WeightSet::new(vec![w0, w1])).unwrap();

        let output = controller.forward(&[0.5, 0.25]).unwrap();
        let h = [0.5_f64.tanh(), (-0.25_f64).tanh()];
        let expected = [h[0].tanh(), h[1].tanh(), (2.0 * h[0]).tanh()];
        for (o, e) in output.iter().zip(expected) {
            assert!((o - e).abs() < 1e-12);
        }
        assert_eq!(controller.decide(&[0.5, 0.25]).unwrap(), 2);
    }

    #[test]
    fn test_tied_outputs_choose_lowest_index() {
        let w0 = Tensor::from_values(1, 1, vec![1.0]).unwrap();
        let w1 = Tensor::from_values(1, 3, vec![0.5, 0.5, 0.5]).unwrap();
        let controller = Controller::new(WeightSet::new(vec![w0, w1])).unwrap();
        assert_eq!(controller.decide(&[1.0]).unwrap(), 0);
    }

    #[test]
    fn test_observation_length_mismatch() {
        let controller = random_controller(11);
        assert_eq!(
            controller.decide(&[0.0; 4]),
            Err(ShapeError::Observation {
                expected: 5,
                actual: 4
            })
        );
        assert!(controller.decide(&[0.0; 6]).is_err());
    }

    #[test]
    fn test_new_rejects_unchained_tensors() {
        let w0 = Tensor::from_values(2, 3, vec![0.0; 6]).unwrap();
        let w1 = Tensor::from_values(2, 2, vec![0.0; 4]).unwrap();
        assert!(matches!(
            Controller::new(WeightSet::new(vec![w0, w1])),
            Err(ShapeError::TensorShape { index: 1, .. })
        ));
    }
}
