use std::{path::PathBuf, time::Instant};

use anyhow::Context;
use nnue_trainer::{loader::shuffle_files, Shuffler};
use structopt::StructOpt;

#[derive(StructOpt)]
pub struct ShuffleOptions {
    /// Text dataset files, each shuffled in place.
    #[structopt(required = true, short, long)]
    pub input: Vec<PathBuf>,
    /// Run `<command> <file>` for every file instead of shuffling in process.
    #[structopt(short, long)]
    pub command: Option<String>,
    /// Fixes the in-process permutation of every file.
    #[structopt(short, long)]
    pub seed: Option<u64>,
}

impl ShuffleOptions {
    pub fn run(&self) -> anyhow::Result<()> {
        let shuffler = self.command.clone().map_or(Shuffler::InProcess, Shuffler::External);

        log::info!("shuffling {} files with {shuffler:?}", self.input.len());
        let timer = Instant::now();

        shuffle_files(&self.input, &shuffler, self.seed).with_context(|| "Failed to shuffle data.")?;

        log::info!("shuffled {} files in {:.2} seconds", self.input.len(), timer.elapsed().as_secs_f32());
        Ok(())
    }
}
