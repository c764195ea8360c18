pub mod checkpoint;
mod error;
pub mod inputs;
pub mod loader;
pub mod network;
pub mod position;
pub mod rng;
pub mod trainer;
pub mod util;

pub use checkpoint::{Checkpoint, CheckpointMeta};
pub use error::{Error, Result};
pub use inputs::{BoardPolicy, Chess768, Features};
pub use loader::{Batch, Shuffler, TextDataLoader};
pub use network::{Activation, ForwardPass, Network};
pub use position::{PositionRecord, SkipReason};
pub use trainer::{
    optimiser::{Adam, AdamW, Optimiser, OptimiserType},
    run, train, RunSummary, Trainer, TrainingSettings,
};

/// Number of (colour, piece, square) input features.
pub const INPUT_SIZE: usize = 768;

/// Number of network outputs.
pub const OUTPUT_SIZE: usize = 1;

/// Upper bound on pieces, and therefore active features, in a position.
pub const MAX_ACTIVE_FEATURES: usize = 32;
