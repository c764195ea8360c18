use std::path::PathBuf;

use super::{logger::ansi, optimiser::OptimiserType};
use crate::{
    inputs::BoardPolicy,
    loader::{SampleDecoder, Shuffler},
    network::Activation,
};

/// Everything that is fixed for the duration of a training run.
#[derive(Clone, Debug)]
pub struct TrainingSettings {
    /// Dataset files, read in this order every epoch.
    pub data_files: Vec<PathBuf>,
    /// Directory that checkpoints are written to.
    pub output_directory: PathBuf,
    /// Appended to the run identifier.
    pub id_suffix: String,
    pub activation: Activation,
    pub hidden_size: usize,
    /// Weight of the game outcome in the label, `0.0` trains purely on score.
    pub interp: f32,
    /// Reshuffle the data files between epochs.
    pub shuffle: bool,
    pub shuffler: Shuffler,
    pub batch_size: usize,
    pub learning_rate: f32,
    /// Divisor mapping centipawn scores into the sigmoid, `K`.
    pub eval_scale: f32,
    pub optimiser: OptimiserType,
    pub l2_reg: bool,
    pub l2_factor: f32,
    pub weight_decay: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    /// Report running loss every this many batches.
    pub report_rate: usize,
    /// Evaluate loss on the whole dataset every this many epochs.
    pub loss_rate: usize,
    pub epochs: usize,
    pub board_policy: BoardPolicy,
    /// Explicit seed for initialisation and in-process reshuffles, otherwise
    /// weights are seeded from the time of day and shuffles from entropy.
    pub seed: Option<u64>,
    /// Also write the little-endian binary export for every checkpoint.
    pub binary_export: bool,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            data_files: vec![PathBuf::from("data/data1.shuf"), PathBuf::from("data/data2.shuf")],
            output_directory: PathBuf::from("data"),
            id_suffix: String::new(),
            activation: Activation::ReLU,
            hidden_size: 75,
            interp: 0.5,
            shuffle: true,
            shuffler: Shuffler::InProcess,
            batch_size: 500,
            learning_rate: 0.001,
            eval_scale: 100.0,
            optimiser: OptimiserType::Adam,
            l2_reg: false,
            l2_factor: 0.001,
            weight_decay: 0.01,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
            report_rate: 50,
            loss_rate: 50,
            epochs: 10_000,
            board_policy: BoardPolicy::Abort,
            seed: None,
            binary_export: false,
        }
    }
}

impl TrainingSettings {
    /// `<activation>_<hidden>_<interp decile><suffix>`, e.g. `relu_75_5`.
    pub fn net_id(&self) -> String {
        let decile = (self.interp * 10.0).trunc() as i32;
        format!("{}_{}_{}{}", self.activation, self.hidden_size, decile, self.id_suffix)
    }

    pub fn decoder(&self) -> SampleDecoder {
        SampleDecoder { interp: self.interp, eval_scale: self.eval_scale, board_policy: self.board_policy }
    }

    pub fn l2(&self) -> Option<f32> {
        self.l2_reg.then_some(self.l2_factor)
    }

    /// Rejects settings that would make training meaningless or panic.
    pub fn validate(&self) -> Result<(), String> {
        if self.data_files.is_empty() {
            return Err("no data files given".to_string());
        }

        for (name, value) in [
            ("hidden size", self.hidden_size),
            ("batch size", self.batch_size),
            ("report rate", self.report_rate),
            ("loss rate", self.loss_rate),
        ] {
            if value == 0 {
                return Err(format!("{name} must be positive"));
            }
        }

        if !(0.0..=1.0).contains(&self.interp) {
            return Err(format!("interpolation factor {} is outside [0, 1]", self.interp));
        }

        if self.eval_scale <= 0.0 {
            return Err(format!("eval scale {} must be positive", self.eval_scale));
        }

        Ok(())
    }

    pub fn display(&self) {
        let files = self.data_files.iter().map(|path| path.display().to_string()).collect::<Vec<_>>().join(", ");

        println!("Net Name               : {}", ansi(self.net_id(), "32;1"));
        println!("Data Files             : {}", ansi(files, "32;1"));
        println!("Output Path            : {}", ansi(self.output_directory.display(), "32;1"));
        println!("Hidden Size            : {}", ansi(self.hidden_size, 31));
        println!("Activation             : {}", ansi(self.activation, 31));
        println!("Optimiser              : {}", ansi(self.optimiser, 31));
        println!("Learning Rate          : {}", ansi(self.learning_rate, 31));
        println!("Scale                  : {}", ansi(self.eval_scale, 31));
        println!("Interpolation          : {}", ansi(self.interp, 31));
        println!("Batch Size             : {}", ansi(self.batch_size, 31));
        println!("Epochs                 : {}", ansi(self.epochs, 31));
        println!("Shuffle                : {}", ansi(self.shuffle, 31));
        println!("L2 Regularisation      : {}", ansi(self.l2_reg, 31));
    }
}
