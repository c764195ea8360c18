use std::path::PathBuf;

use anyhow::Context;
use nnue_trainer::{checkpoint::write_bin, Checkpoint};
use structopt::StructOpt;

/// Converts a text checkpoint into the little-endian binary export.
#[derive(StructOpt)]
pub struct ConvertOptions {
    #[structopt(required = true, short, long)]
    input: PathBuf,
    #[structopt(required = true, short, long)]
    output: PathBuf,
}

impl ConvertOptions {
    pub fn run(&self) -> anyhow::Result<()> {
        let checkpoint = Checkpoint::load(&self.input)
            .with_context(|| format!("Failed to read checkpoint [{}].", self.input.display()))?;

        write_bin(&checkpoint.network, &self.output)
            .with_context(|| format!("Failed to write [{}].", self.output.display()))?;

        let meta = &checkpoint.meta;
        log::info!(
            "converted {} network (hidden {}, epoch {}, loss {}) to [{}]",
            meta.activation,
            meta.hidden_size,
            meta.epoch,
            meta.loss,
            self.output.display()
        );

        Ok(())
    }
}
