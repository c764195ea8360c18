pub mod gradient;
pub mod logger;
pub mod optimiser;
mod run;
mod settings;

pub use run::{run, train, RunSummary};
pub use settings::TrainingSettings;

use std::path::PathBuf;

use crate::{
    checkpoint::{Checkpoint, CheckpointMeta},
    loader::{Batch, TextDataLoader},
    network::Network,
    rng::Rand,
    Error, Result,
};
use optimiser::Optimiser;

/// Mutable state of a training run: parameters, optimiser moments and
/// the step counter used for bias correction.
pub struct Trainer<O> {
    settings: TrainingSettings,
    network: Box<Network>,
    optimiser: O,
    step: usize,
    num_batches: usize,
    min_loss: Option<f32>,
}

impl<O: Optimiser> Trainer<O> {
    pub fn new(settings: TrainingSettings) -> Self {
        let mut rand = settings.seed.map_or_else(Rand::from_time, Rand::new);
        let network = Network::random(settings.hidden_size, &mut rand);
        Self::build(settings, network)
    }

    /// Resumes from existing parameters, which must have the configured
    /// hidden size.
    pub fn with_network(settings: TrainingSettings, network: Box<Network>) -> Result<Self> {
        if settings.hidden_size != network.hidden() {
            return Err(Error::Settings(format!(
                "network has hidden size {}, settings expect {}",
                network.hidden(),
                settings.hidden_size
            )));
        }

        Ok(Self::build(settings, network))
    }

    fn build(settings: TrainingSettings, network: Box<Network>) -> Self {
        let optimiser = O::new(network.hidden(), &settings);
        Self { settings, network, optimiser, step: 0, num_batches: 0, min_loss: None }
    }

    pub fn settings(&self) -> &TrainingSettings {
        &self.settings
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn optimiser(&self) -> &O {
        &self.optimiser
    }

    /// Number of optimiser updates made so far.
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn num_batches(&self) -> usize {
        self.num_batches
    }

    pub fn set_num_batches(&mut self, num_batches: usize) {
        self.num_batches = num_batches;
    }

    /// Lowest full-dataset loss seen so far.
    pub fn min_loss(&self) -> Option<f32> {
        self.min_loss
    }

    /// One forward/backward/update cycle, returning the batch loss measured
    /// before the update.
    pub fn train_on_batch(&mut self, batch: &Batch) -> f32 {
        let activation = self.settings.activation;
        let inputs = batch.inputs();
        let targets = batch.targets();

        let fwd = self.network.forward(inputs, activation, self.settings.eval_scale);
        let grads = gradient::gradients(inputs, targets, &self.network, &fwd, activation);

        self.step += 1;
        self.optimiser.update_weights(&mut self.network, &grads, self.step, self.settings.learning_rate);

        fwd.loss(targets)
    }

    /// Mean squared error over every trainable sample, evaluated one position
    /// at a time. Also re-derives the number of batches per epoch.
    pub fn dataset_loss(&mut self, loader: &TextDataLoader) -> Result<f32> {
        let decoder = self.settings.decoder();
        let TrainingSettings { activation, eval_scale, .. } = self.settings;
        let network = &self.network;
        let mut total = 0.0f64;

        let count = loader.for_each_sample(&decoder, |features, target| {
            let pred = network.evaluate(&features, activation, eval_scale);
            total += f64::from(pred - target).powi(2);
        })?;

        self.num_batches = count / self.settings.batch_size;

        if count == 0 {
            return Ok(0.0);
        }

        Ok((total / count as f64) as f32)
    }

    /// Records a full-dataset loss, returning whether it is a new minimum.
    pub fn record_loss(&mut self, loss: f32) -> bool {
        let best = self.min_loss.map_or(true, |min| loss < min);
        if best {
            self.min_loss = Some(loss);
        }
        best
    }

    pub fn checkpoint(&self, epoch: usize, loss: f32) -> Checkpoint {
        let settings = &self.settings;

        Checkpoint {
            meta: CheckpointMeta {
                hidden_size: self.network.hidden(),
                learning_rate: settings.learning_rate,
                activation: settings.activation,
                eval_scale: settings.eval_scale,
                interp: settings.interp,
                batch_size: settings.batch_size,
                num_batches: self.num_batches,
                optimiser: O::TYPE,
                shuffle: settings.shuffle,
                l2_reg: settings.l2_reg,
                epoch,
                loss,
            },
            network: self.network.clone(),
        }
    }

    pub fn save(&self, epoch: usize, loss: f32) -> Result<PathBuf> {
        let settings = &self.settings;
        let path = self.checkpoint(epoch, loss).save(
            &settings.output_directory,
            &settings.net_id(),
            settings.binary_export,
        )?;

        log::info!("saved checkpoint [{}]", path.display());
        Ok(path)
    }
}
