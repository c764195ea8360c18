use std::{fmt, str::FromStr};

use super::TrainingSettings;
use crate::network::Network;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OptimiserType {
    #[default]
    Adam,
    AdamW,
}

impl OptimiserType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Adam => "adam",
            Self::AdamW => "adamw",
        }
    }
}

impl fmt::Display for OptimiserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for OptimiserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "adam" => Ok(Self::Adam),
            "adamw" => Ok(Self::AdamW),
            _ => Err(format!("unknown optimiser '{s}', expected adam or adamw")),
        }
    }
}

pub trait Optimiser {
    const TYPE: OptimiserType;

    fn new(hidden: usize, settings: &TrainingSettings) -> Self;

    /// Updates every parameter, including those with zero gradient.
    /// `step` is the 1-indexed number of this update within the run.
    fn update_weights(&mut self, nnue: &mut Network, grads: &Network, step: usize, rate: f32);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdamParams {
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    /// L2 factor, subtracted from the step as `factor * param`.
    pub l2: Option<f32>,
}

impl From<&TrainingSettings> for AdamParams {
    fn from(settings: &TrainingSettings) -> Self {
        Self { beta1: settings.beta1, beta2: settings.beta2, epsilon: settings.epsilon, l2: settings.l2() }
    }
}

pub struct Adam {
    momentum: Box<Network>,
    velocity: Box<Network>,
    params: AdamParams,
}

impl Adam {
    pub fn with_params(hidden: usize, params: AdamParams) -> Self {
        Self { momentum: Network::new(hidden), velocity: Network::new(hidden), params }
    }

    /// First moment estimates.
    pub fn momentum(&self) -> &Network {
        &self.momentum
    }

    /// Second moment estimates.
    pub fn velocity(&self) -> &Network {
        &self.velocity
    }

    fn bias_corrections(&self, step: usize) -> (f32, f32) {
        debug_assert!(step > 0, "adam steps are 1-indexed");
        let t = i32::try_from(step).unwrap_or(i32::MAX);
        (1. - self.params.beta1.powi(t), 1. - self.params.beta2.powi(t))
    }

    /// Advances the moments of parameter `i` and returns the amount to
    /// subtract from it.
    fn step_size(&mut self, i: usize, param: f32, grad: f32, corrections: (f32, f32), rate: f32) -> f32 {
        let AdamParams { beta1, beta2, epsilon, l2 } = self.params;

        self.momentum[i] = beta1 * self.momentum[i] + (1. - beta1) * grad;
        self.velocity[i] = beta2 * self.velocity[i] + (1. - beta2) * grad * grad;

        let momentum = self.momentum[i] / corrections.0;
        let velocity = self.velocity[i] / corrections.1;

        let mut update = rate * momentum / (velocity.sqrt() + epsilon);

        if let Some(factor) = l2 {
            update -= factor * param;
        }

        update
    }
}

impl Optimiser for Adam {
    const TYPE: OptimiserType = OptimiserType::Adam;

    fn new(hidden: usize, settings: &TrainingSettings) -> Self {
        Self::with_params(hidden, settings.into())
    }

    fn update_weights(&mut self, nnue: &mut Network, grads: &Network, step: usize, rate: f32) {
        let corrections = self.bias_corrections(step);
        for (i, (param, &grad)) in nnue.iter_mut().zip(grads.iter()).enumerate() {
            *param -= self.step_size(i, *param, grad, corrections, rate);
        }
    }
}

/// Adam with weight decay applied directly to the parameters.
pub struct AdamW {
    adam: Adam,
    decay: f32,
}

impl AdamW {
    pub fn with_params(hidden: usize, params: AdamParams, decay: f32) -> Self {
        Self { adam: Adam::with_params(hidden, params), decay }
    }

    pub fn adam(&self) -> &Adam {
        &self.adam
    }
}

impl Optimiser for AdamW {
    const TYPE: OptimiserType = OptimiserType::AdamW;

    fn new(hidden: usize, settings: &TrainingSettings) -> Self {
        Self::with_params(hidden, settings.into(), settings.weight_decay)
    }

    fn update_weights(&mut self, nnue: &mut Network, grads: &Network, step: usize, rate: f32) {
        let corrections = self.adam.bias_corrections(step);
        let decay = rate * self.decay;
        for (i, (param, &grad)) in nnue.iter_mut().zip(grads.iter()).enumerate() {
            let update = self.adam.step_size(i, *param, grad, corrections, rate);
            *param -= decay * *param;
            *param -= update;
        }
    }
}
