mod binary;
mod text;

pub use binary::{read_bin, write_bin};

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::{network::Activation, trainer::optimiser::OptimiserType, Network, Result};

/// Run description stored alongside the weights.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckpointMeta {
    pub hidden_size: usize,
    pub learning_rate: f32,
    pub activation: Activation,
    pub eval_scale: f32,
    pub interp: f32,
    pub batch_size: usize,
    pub num_batches: usize,
    pub optimiser: OptimiserType,
    pub shuffle: bool,
    pub l2_reg: bool,
    pub epoch: usize,
    pub loss: f32,
}

impl CheckpointMeta {
    pub fn positions(&self) -> usize {
        self.num_batches * self.batch_size
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Checkpoint {
    pub meta: CheckpointMeta,
    pub network: Box<Network>,
}

impl Checkpoint {
    pub fn file_stem(net_id: &str, epoch: usize) -> String {
        format!("weights_{net_id}_{epoch}")
    }

    /// Writes `weights_<net_id>_<epoch>.js` into `out_dir`, plus the `.bin`
    /// export if asked, replacing any earlier files of the same name.
    pub fn save(&self, out_dir: &Path, net_id: &str, binary: bool) -> Result<PathBuf> {
        fs::create_dir_all(out_dir)?;

        let stem = Self::file_stem(net_id, self.meta.epoch);
        let path = out_dir.join(format!("{stem}.js"));

        let mut writer = BufWriter::new(File::create(&path)?);
        self.write_text(&mut writer)?;
        writer.flush()?;

        if binary {
            write_bin(&self.network, &out_dir.join(format!("{stem}.bin")))?;
        }

        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::parse(&fs::read_to_string(path)?)
    }
}
