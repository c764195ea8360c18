mod accumulator;
mod activation;

pub use accumulator::Accumulator;
pub use activation::Activation;

use crate::{inputs::Features, rng::Rand, util::sigmoid, INPUT_SIZE};

/// All trainable parameters in a single flat arena, laid out as
/// `W1 (INPUT_SIZE x hidden, row per feature) | b1 | W2 | b2`.
///
/// Gradients and optimiser moments reuse the same layout.
#[derive(Clone, Debug, PartialEq)]
pub struct Network {
    hidden: usize,
    weights: Vec<f32>,
}

impl std::ops::Deref for Network {
    type Target = [f32];
    fn deref(&self) -> &Self::Target {
        &self.weights
    }
}

impl std::ops::DerefMut for Network {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.weights
    }
}

impl Network {
    pub fn size_for(hidden: usize) -> usize {
        (INPUT_SIZE + 2) * hidden + 1
    }

    pub fn new(hidden: usize) -> Box<Self> {
        Box::new(Self { hidden, weights: vec![0.0; Self::size_for(hidden)] })
    }

    /// Weights uniform in `±sqrt(2 / INPUT_SIZE)`, biases zero.
    pub fn random(hidden: usize, rand: &mut Rand) -> Box<Self> {
        let mut params = Self::new(hidden);
        let scale = (2.0 / INPUT_SIZE as f32).sqrt();

        rand.fill(params.feature_weights_mut(), scale);
        rand.fill(params.output_weights_mut(), scale);

        params
    }

    pub fn hidden(&self) -> usize {
        self.hidden
    }

    fn feature_bias(&self) -> usize {
        INPUT_SIZE * self.hidden
    }

    fn output_weights(&self) -> usize {
        (INPUT_SIZE + 1) * self.hidden
    }

    fn output_bias_idx(&self) -> usize {
        (INPUT_SIZE + 2) * self.hidden
    }

    pub fn feature_weights(&self) -> &[f32] {
        &self.weights[..self.feature_bias()]
    }

    pub fn feature_weights_mut(&mut self) -> &mut [f32] {
        let end = self.feature_bias();
        &mut self.weights[..end]
    }

    pub fn feature_weights_row(&self, feature: usize) -> &[f32] {
        let start = feature * self.hidden;
        &self.weights[start..start + self.hidden]
    }

    pub fn feature_weights_row_mut(&mut self, feature: usize) -> &mut [f32] {
        let start = feature * self.hidden;
        let hidden = self.hidden;
        &mut self.weights[start..start + hidden]
    }

    pub fn feature_biases(&self) -> &[f32] {
        &self.weights[self.feature_bias()..self.output_weights()]
    }

    pub fn feature_biases_mut(&mut self) -> &mut [f32] {
        let (start, end) = (self.feature_bias(), self.output_weights());
        &mut self.weights[start..end]
    }

    pub fn output_weights_slice(&self) -> &[f32] {
        &self.weights[self.output_weights()..self.output_bias_idx()]
    }

    pub fn output_weights_mut(&mut self) -> &mut [f32] {
        let (start, end) = (self.output_weights(), self.output_bias_idx());
        &mut self.weights[start..end]
    }

    pub fn output_bias(&self) -> f32 {
        self.weights[self.output_bias_idx()]
    }

    pub fn output_bias_mut(&mut self) -> &mut f32 {
        let idx = self.output_bias_idx();
        &mut self.weights[idx]
    }

    /// Runs a batch of positions through the network. Only the weight rows of
    /// active features are read.
    pub fn forward(&self, inputs: &[Features], activation: Activation, scale: f32) -> ForwardPass {
        let hidden = self.hidden;
        let mut pass = ForwardPass::new(inputs.len(), hidden);

        let rows = pass.z1.chunks_exact_mut(hidden).zip(pass.a1.chunks_exact_mut(hidden));

        for (i, ((z1, a1), features)) in rows.zip(inputs).enumerate() {
            let mut acc = Accumulator::load_biases(z1, self);

            for &feat in features {
                acc.add_feature(feat, self);
            }

            let mut z2 = self.output_bias();

            for ((a, &z), &w) in a1.iter_mut().zip(acc.iter()).zip(self.output_weights_slice()) {
                *a = activation.activate(z);
                z2 += *a * w;
            }

            pass.z2[i] = z2;
            pass.a2[i] = sigmoid(z2, scale);
        }

        pass
    }

    /// Output for a single position, in the same probability domain as the labels.
    pub fn evaluate(&self, features: &Features, activation: Activation, scale: f32) -> f32 {
        self.forward(std::slice::from_ref(features), activation, scale).a2[0]
    }
}

/// Intermediate values of a forward pass, kept for backpropagation.
/// `z1` and `a1` are row-major `batch x hidden`.
#[derive(Clone, Debug, PartialEq)]
pub struct ForwardPass {
    pub z1: Vec<f32>,
    pub a1: Vec<f32>,
    pub z2: Vec<f32>,
    pub a2: Vec<f32>,
}

impl ForwardPass {
    fn new(batch_size: usize, hidden: usize) -> Self {
        Self {
            z1: vec![0.0; batch_size * hidden],
            a1: vec![0.0; batch_size * hidden],
            z2: vec![0.0; batch_size],
            a2: vec![0.0; batch_size],
        }
    }

    pub fn batch_size(&self) -> usize {
        self.a2.len()
    }

    /// Mean squared error of the outputs against `targets`.
    pub fn loss(&self, targets: &[f32]) -> f32 {
        assert_eq!(self.a2.len(), targets.len());

        if targets.is_empty() {
            return 0.0;
        }

        let total = self.a2.iter().zip(targets).map(|(pred, target)| (pred - target).powi(2)).sum::<f32>();
        total / targets.len() as f32
    }
}
