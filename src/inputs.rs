use crate::{Error, Result, INPUT_SIZE, MAX_ACTIVE_FEATURES};

/// What to do with a record whose board string cannot be decoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoardPolicy {
    /// Fail the run.
    #[default]
    Abort,
    /// Drop the record as if it had been filtered.
    Skip,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Features {
    features: [usize; MAX_ACTIVE_FEATURES],
    len: usize,
}

impl Features {
    /// # Panics
    /// If the list is already full.
    pub fn push(&mut self, feat: usize) {
        self.features[self.len] = feat;
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == MAX_ACTIVE_FEATURES
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.features[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, usize> {
        self.as_slice().iter()
    }
}

impl<'a> IntoIterator for &'a Features {
    type Item = &'a usize;
    type IntoIter = std::slice::Iter<'a, usize>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// 2 colours x 6 pieces x 64 squares, white at offset 0 and black at 384.
pub struct Chess768;

impl Chess768 {
    pub const SIZE: usize = INPUT_SIZE;

    const BLACK_OFFSET: usize = 384;

    /// Decodes a rank-major board string, `a8` first.
    pub fn encode(board: &str) -> Result<Features> {
        let mut features = Features::default();
        let mut sq = 0;

        for ch in board.chars() {
            if ch == '/' {
                continue;
            }

            if let Some(empty) = ch.to_digit(10).filter(|n| (1..=8).contains(n)) {
                sq += empty as usize;
                continue;
            }

            let (colour, piece) = Self::piece(ch)
                .ok_or_else(|| Error::invalid_board(board, format!("unknown character '{ch}'")))?;

            if sq >= 64 {
                return Err(Error::invalid_board(board, "more than 64 squares"));
            }

            if features.is_full() {
                return Err(Error::invalid_board(board, "more than 32 pieces"));
            }

            features.push(colour * Self::BLACK_OFFSET + piece * 64 + sq);
            sq += 1;
        }

        Ok(features)
    }

    fn piece(ch: char) -> Option<(usize, usize)> {
        let piece = match ch.to_ascii_lowercase() {
            'p' => 0,
            'n' => 1,
            'b' => 2,
            'r' => 3,
            'q' => 4,
            'k' => 5,
            _ => return None,
        };

        Some((usize::from(ch.is_ascii_lowercase()), piece))
    }
}
