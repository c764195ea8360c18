use std::path::PathBuf;

use anyhow::Context;
use nnue_trainer::{Activation, BoardPolicy, OptimiserType, Shuffler, TrainingSettings};
use structopt::StructOpt;

/// Trains a single hidden layer chess evaluation network on text datasets.
#[derive(StructOpt)]
#[structopt(name = "trainer")]
struct Options {
    /// Dataset files, read in the given order every epoch.
    #[structopt(short, long)]
    data: Vec<PathBuf>,
    #[structopt(short, long)]
    output: Option<PathBuf>,
    #[structopt(long)]
    id_suffix: Option<String>,
    /// relu, crelu, srelu or screlu.
    #[structopt(short, long)]
    activation: Option<Activation>,
    #[structopt(long)]
    hidden: Option<usize>,
    #[structopt(long)]
    interp: Option<f32>,
    #[structopt(long)]
    no_shuffle: bool,
    /// Shuffle between epochs with `<command> <file>` instead of in process.
    #[structopt(long)]
    shuffle_command: Option<String>,
    #[structopt(short, long)]
    batch_size: Option<usize>,
    #[structopt(long)]
    lr: Option<f32>,
    #[structopt(long)]
    scale: Option<f32>,
    /// adam or adamw.
    #[structopt(long)]
    optimiser: Option<OptimiserType>,
    #[structopt(long)]
    l2: bool,
    #[structopt(short, long)]
    epochs: Option<usize>,
    #[structopt(long)]
    report_rate: Option<usize>,
    #[structopt(long)]
    loss_rate: Option<usize>,
    #[structopt(long)]
    seed: Option<u64>,
    /// Warn about and skip unreadable boards instead of aborting.
    #[structopt(long)]
    skip_invalid_boards: bool,
    /// Also write a little-endian `.bin` next to every checkpoint.
    #[structopt(long)]
    binary: bool,
}

impl Options {
    fn into_settings(self) -> TrainingSettings {
        let mut settings = TrainingSettings::default();

        if !self.data.is_empty() {
            settings.data_files = self.data;
        }

        macro_rules! set {
            ($($opt:ident => $field:ident),* $(,)?) => {
                $(if let Some(value) = self.$opt {
                    settings.$field = value;
                })*
            };
        }

        set! {
            output => output_directory,
            id_suffix => id_suffix,
            activation => activation,
            hidden => hidden_size,
            interp => interp,
            batch_size => batch_size,
            lr => learning_rate,
            scale => eval_scale,
            optimiser => optimiser,
            epochs => epochs,
            report_rate => report_rate,
            loss_rate => loss_rate,
        }

        if let Some(command) = self.shuffle_command {
            settings.shuffler = Shuffler::External(command);
        }

        settings.shuffle &= !self.no_shuffle;
        settings.l2_reg |= self.l2;
        settings.seed = self.seed;
        settings.binary_export = self.binary;

        if self.skip_invalid_boards {
            settings.board_policy = BoardPolicy::Skip;
        }

        settings
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Options::from_args().into_settings();
    let summary = nnue_trainer::train(settings).with_context(|| "Training failed.")?;

    log::info!(
        "finished {} epochs ({} steps), final loss {:.6}, last checkpoint [{}]",
        summary.epochs,
        summary.steps,
        summary.final_loss,
        summary.last_checkpoint.display()
    );

    Ok(())
}
