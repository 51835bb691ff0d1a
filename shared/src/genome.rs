use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of sensory inputs fed to the controller each decision
pub const INPUT_COUNT: usize = 6;

/// Number of action outputs produced by the controller
pub const OUTPUT_COUNT: usize = 6;

/// Total weights in a genome: one per input/output pair
pub const WEIGHT_COUNT: usize = INPUT_COUNT * OUTPUT_COUNT;

#[derive(Debug, Error, PartialEq)]
pub enum GenomeError {
    #[error("genome must have {expected} weights, got {actual}")]
    WrongLength { expected: usize, actual: usize },
}

/// A genome is the flat weight matrix of a single-layer feed-forward network.
///
/// Weights are laid out output-major: the weights feeding output `o` occupy
/// `o * INPUT_COUNT .. (o + 1) * INPUT_COUNT`.
///
/// Genomes driving live ants are shared behind an `Arc` and never mutated;
/// mutation only happens on a fresh copy while building the next population.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Genome {
    weights: Vec<f32>,
}

impl Genome {
    /// Create a new random genome with weights uniform in [-1, 1)
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let weights = (0..WEIGHT_COUNT).map(|_| rng.gen_range(-1.0..1.0)).collect();
        Self { weights }
    }

    /// Build a genome from explicit weights
    pub fn from_weights(weights: Vec<f32>) -> Result<Self, GenomeError> {
        if weights.len() != WEIGHT_COUNT {
            return Err(GenomeError::WrongLength {
                expected: WEIGHT_COUNT,
                actual: weights.len(),
            });
        }
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Run the network: `out[o] = tanh(sum_i inputs[i] * w[o * n + i])`.
    ///
    /// Panics if `inputs` is empty or its width does not divide the weight
    /// count. Callers always pass `INPUT_COUNT` values, so a mismatch is a bug.
    pub fn evaluate(&self, inputs: &[f32]) -> Vec<f32> {
        assert!(
            !inputs.is_empty() && self.weights.len() % inputs.len() == 0,
            "input width {} does not fit a genome of {} weights",
            inputs.len(),
            self.weights.len()
        );

        self.weights
            .chunks_exact(inputs.len())
            .map(|row| {
                let sum: f32 = row.iter().zip(inputs).map(|(w, x)| w * x).sum();
                sum.tanh()
            })
            .collect()
    }

    /// Single-point crossover at a random cut in `[0, len)`
    pub fn crossover<R: Rng + ?Sized>(&self, other: &Genome, rng: &mut R) -> Genome {
        let cut = rng.gen_range(0..self.weights.len().max(1));
        self.crossover_at(other, cut)
    }

    /// Child takes `self` before `cut` and `other` from `cut` on
    pub fn crossover_at(&self, other: &Genome, cut: usize) -> Genome {
        assert_eq!(
            self.weights.len(),
            other.weights.len(),
            "crossover parents must have equal length"
        );
        let cut = cut.min(self.weights.len());

        let mut weights = Vec::with_capacity(self.weights.len());
        weights.extend_from_slice(&self.weights[..cut]);
        weights.extend_from_slice(&other.weights[cut..]);
        Genome { weights }
    }

    /// Perturb each weight with probability `rate` by a uniform offset in
    /// `[-strength, strength]`
    pub fn mutate<R: Rng + ?Sized>(&mut self, rate: f32, strength: f32, rng: &mut R) {
        for weight in &mut self.weights {
            if rng.gen::<f32>() < rate {
                *weight += rng.gen_range(-strength..=strength);
            }
        }
    }

    /// Copy this genome and mutate the copy
    pub fn mutated<R: Rng + ?Sized>(&self, rate: f32, strength: f32, rng: &mut R) -> Genome {
        let mut child = self.clone();
        child.mutate(rate, strength, rng);
        child
    }
}
