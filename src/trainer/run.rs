use std::{path::PathBuf, time::Instant};

use super::{
    logger::{ansi, report_batch_progress, report_dataset_loss, report_epoch_finished},
    optimiser::{Adam, AdamW, Optimiser, OptimiserType},
    Trainer, TrainingSettings,
};
use crate::{
    loader::{shuffle_files, Batch, TextDataLoader},
    rng::Rand,
    Error, Result,
};

/// Outcome of a completed run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub epochs: usize,
    pub steps: usize,
    /// Loss recorded in the last checkpoint.
    pub final_loss: f32,
    pub min_dataset_loss: Option<f32>,
    pub last_checkpoint: PathBuf,
}

/// Initialises a fresh network and trains it with the configured optimiser.
pub fn train(settings: TrainingSettings) -> Result<RunSummary> {
    let loader = TextDataLoader::new(&settings.data_files);

    match settings.optimiser {
        OptimiserType::Adam => run(&mut Trainer::<Adam>::new(settings), &loader),
        OptimiserType::AdamW => run(&mut Trainer::<AdamW>::new(settings), &loader),
    }
}

/// Drives `trainer` for the configured number of epochs, writing a checkpoint
/// at start-up and after every epoch. Invalid settings are rejected before
/// any data is read.
pub fn run<O: Optimiser>(trainer: &mut Trainer<O>, loader: &TextDataLoader) -> Result<RunSummary> {
    let settings = trainer.settings().clone();
    settings.validate().map_err(Error::Settings)?;

    let net_id = settings.net_id();
    let mut shuffle_seeds = settings.seed.map(|seed| Rand::new(!seed));

    println!("{}", ansi("Beginning Training", "34;1"));
    settings.display();

    let eligible = loader.count_eligible()?;
    trainer.set_num_batches(eligible / settings.batch_size);
    log::debug!("{eligible} eligible samples, {} batches per epoch", trainer.num_batches());

    println!("Positions              : {}", ansi(eligible, 31));
    println!("Batches / Epoch        : {}", ansi(trainer.num_batches(), 31));

    let mut last_checkpoint = trainer.save(0, 0.0)?;
    let mut final_loss = 0.0;
    let timer = Instant::now();

    for epoch in 1..=settings.epochs {
        let epoch_timer = Instant::now();
        let running_loss = train_epoch(trainer, loader, &net_id, epoch, &epoch_timer)?;
        report_epoch_finished(&net_id, epoch, running_loss, &epoch_timer, &timer);

        let loss = if epoch % settings.loss_rate == 0 {
            let loss = trainer.dataset_loss(loader)?;
            let new_best = trainer.record_loss(loss);
            report_dataset_loss(&net_id, epoch, loss, new_best);
            loss
        } else {
            running_loss
        };

        last_checkpoint = trainer.save(epoch, loss)?;
        final_loss = loss;

        if settings.shuffle && epoch < settings.epochs {
            let seed = shuffle_seeds.as_mut().map(Rand::rng);
            shuffle_files(loader.file_paths(), &settings.shuffler, seed)?;
            log::info!("shuffled {} data files", loader.file_paths().len());
        }
    }

    Ok(RunSummary {
        epochs: settings.epochs,
        steps: trainer.step(),
        final_loss,
        min_dataset_loss: trainer.min_loss(),
        last_checkpoint,
    })
}

/// One pass over the dataset, returning the mean loss of the full batches
/// trained on. A trailing partial batch is dropped.
fn train_epoch<O: Optimiser>(
    trainer: &mut Trainer<O>,
    loader: &TextDataLoader,
    net_id: &str,
    epoch: usize,
    epoch_timer: &Instant,
) -> Result<f32> {
    let decoder = trainer.settings().decoder();
    let batch_size = trainer.settings().batch_size;
    let report_rate = trainer.settings().report_rate;
    let num_batches = trainer.num_batches();

    let mut batch = Batch::with_capacity(batch_size);
    let mut total_loss = 0.0f64;
    let mut finished = 0;

    loader.for_each_sample(&decoder, |features, target| {
        batch.push(features, target);

        if !batch.is_full(batch_size) {
            return;
        }

        total_loss += f64::from(trainer.train_on_batch(&batch));
        batch.clear();
        finished += 1;

        if finished % report_rate == 0 {
            let running = (total_loss / finished as f64) as f32;
            report_batch_progress(net_id, epoch, finished, num_batches, running, epoch_timer, batch_size);
        }
    })?;

    if !batch.is_empty() {
        log::debug!("epoch {epoch}: dropped {} samples in partial batch", batch.len());
    }

    if finished == 0 {
        return Ok(0.0);
    }

    Ok((total_loss / finished as f64) as f32)
}
