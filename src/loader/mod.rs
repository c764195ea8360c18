mod shuffle;

pub use shuffle::{shuffle_files, Shuffler};

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::{
    inputs::{BoardPolicy, Chess768, Features},
    position::PositionRecord,
    Error, Result,
};

/// Sequential reader over one or more text dataset files, read in the order
/// given. Every call to [`TextDataLoader::lines`] starts again from the
/// first line of the first file.
#[derive(Clone, Debug)]
pub struct TextDataLoader {
    file_paths: Vec<PathBuf>,
}

impl TextDataLoader {
    pub fn new<P: AsRef<Path>>(file_paths: &[P]) -> Self {
        Self { file_paths: file_paths.iter().map(|path| path.as_ref().to_path_buf()).collect() }
    }

    pub fn file_paths(&self) -> &[PathBuf] {
        &self.file_paths
    }

    pub fn lines(&self) -> Lines {
        Lines { files: self.file_paths.clone().into_iter(), current: None }
    }

    /// Parses every record in the dataset, failing on the first malformed one.
    pub fn map_positions<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(PositionRecord) -> Result<()>,
    {
        for line in self.lines() {
            let line = line?;
            f(PositionRecord::parse(&line)?)?;
        }

        Ok(())
    }

    /// Number of records that pass the sample filter. Boards are not decoded.
    pub fn count_eligible(&self) -> Result<usize> {
        let mut count = 0;

        self.map_positions(|pos| {
            if !pos.should_skip() {
                count += 1;
            }
            Ok(())
        })?;

        Ok(count)
    }

    /// Decodes every trainable sample in dataset order, returning how many
    /// were passed to `f`.
    pub fn for_each_sample<F>(&self, decoder: &SampleDecoder, mut f: F) -> Result<usize>
    where
        F: FnMut(Features, f32),
    {
        let mut count = 0;

        for line in self.lines() {
            if let Some((features, target)) = decoder.decode(&line?)? {
                f(features, target);
                count += 1;
            }
        }

        Ok(count)
    }
}

pub struct Lines {
    files: std::vec::IntoIter<PathBuf>,
    current: Option<io::Lines<BufReader<File>>>,
}

impl Iterator for Lines {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.current.as_mut().and_then(Iterator::next) {
                return Some(line);
            }

            let path = self.files.next()?;

            match File::open(&path) {
                Ok(file) => self.current = Some(BufReader::new(file).lines()),
                Err(err) => {
                    self.current = None;
                    let msg = format!("failed to open [{}]: {err}", path.display());
                    return Some(Err(io::Error::new(err.kind(), msg)));
                }
            }
        }
    }
}

/// Turns a dataset line into a training sample.
#[derive(Clone, Copy, Debug)]
pub struct SampleDecoder {
    pub interp: f32,
    pub eval_scale: f32,
    pub board_policy: BoardPolicy,
}

impl SampleDecoder {
    /// `Ok(None)` for records that should not be trained on.
    pub fn decode(&self, line: &str) -> Result<Option<(Features, f32)>> {
        let pos = PositionRecord::parse(line)?;

        if pos.should_skip() {
            return Ok(None);
        }

        let features = match Chess768::encode(pos.board) {
            Ok(features) => features,
            Err(err @ Error::InvalidBoard { .. }) if self.board_policy == BoardPolicy::Skip => {
                log::warn!("skipping record: {err}");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        if features.is_empty() {
            return Ok(None);
        }

        Ok(Some((features, pos.target(self.interp, self.eval_scale))))
    }
}

/// Positions and labels waiting to be trained on together.
#[derive(Clone, Debug, Default)]
pub struct Batch {
    inputs: Vec<Features>,
    targets: Vec<f32>,
}

impl Batch {
    pub fn with_capacity(batch_size: usize) -> Self {
        Self { inputs: Vec::with_capacity(batch_size), targets: Vec::with_capacity(batch_size) }
    }

    pub fn push(&mut self, features: Features, target: f32) {
        self.inputs.push(features);
        self.targets.push(target);
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn is_full(&self, batch_size: usize) -> bool {
        self.len() >= batch_size
    }

    pub fn inputs(&self) -> &[Features] {
        &self.inputs
    }

    pub fn targets(&self) -> &[f32] {
        &self.targets
    }

    pub fn clear(&mut self) {
        self.inputs.clear();
        self.targets.clear();
    }
}
